//! Follower train
//!
//! Collected followers don't simulate physics. They replay the player's
//! recent path: a bounded history (newest first) sampled only after the
//! player has moved far enough, indexed at a fixed spacing per follower.

use std::collections::VecDeque;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::Entity;
use super::player::{Player, Support};
use crate::tuning::MAX_HISTORY_CAPACITY;

/// One recorded player position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistorySample {
    pub pos: Vec2,
    pub direction: f32,
}

/// Distance-gated ring buffer of player positions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionHistory {
    samples: VecDeque<HistorySample>,
    capacity: usize,
    min_distance: f32,
}

impl PositionHistory {
    pub fn new(capacity: usize, min_distance: f32) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity.min(MAX_HISTORY_CAPACITY)),
            capacity,
            min_distance,
        }
    }

    /// Record the player if they moved far enough since the newest sample
    pub fn record(&mut self, pos: Vec2, direction: f32) {
        let far_enough = self
            .samples
            .front()
            .is_none_or(|last| last.pos.distance(pos) > self.min_distance);
        if far_enough {
            self.samples.push_front(HistorySample { pos, direction });
            if self.samples.len() > self.capacity {
                self.samples.pop_back();
            }
        }
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Sample `index` steps back, clamped to the oldest one available
    pub fn sample_clamped(&self, index: usize) -> Option<HistorySample> {
        let last = self.samples.len().checked_sub(1)?;
        self.samples.get(index.min(last)).copied()
    }
}

/// Place every collected follower along the recorded path
pub fn place_followers(
    entities: &mut [Entity],
    history: &PositionHistory,
    player: &Player,
    spacing: usize,
) {
    let idle_on_ground = player.support() == Support::Grounded && player.vel.x.abs() < 0.5;

    let followers = entities
        .iter_mut()
        .filter(|e| !e.dead && !e.knocked_out && e.kind.is_follower());

    for (rank, follower) in followers.enumerate() {
        match history.sample_clamped((rank + 1).saturating_mul(spacing)) {
            Some(sample) => {
                follower.pos = sample.pos;
                follower.direction = sample.direction;
                // Don't leave the train hovering when the player stops on a floor
                if idle_on_ground && follower.pos.y < player.pos.y {
                    follower.pos.y = player.pos.y;
                }
            }
            None => follower.pos = player.pos,
        }

        if follower.taunt_timer > 0 {
            follower.taunt_timer -= 1;
            follower.pos.y -= 2.0;
        }
    }
}
