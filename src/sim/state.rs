//! Simulation state
//!
//! One owned [`SimulationState`] holds everything a tick reads or writes.
//! Presentation only ever sees a [`super::Snapshot`] built from it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::entity::Entity;
use super::follower::PositionHistory;
use super::player::{Move, Player};
use super::progress::{Lap, MatchResult, Progress};
use crate::audio::SoundEffect;
use crate::consts::*;
use crate::error::LevelError;
use crate::level::Level;
use crate::tuning::Tuning;

/// Something that happened during a tick, drained by the driver
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Sound(SoundEffect),
    /// Screen shake impulse (keeps the stronger of current and new)
    Shake(f32),
    EscapeStarted,
    LapStarted(Lap),
    ChaserReleased,
    MatchEnded(MatchResult),
}

/// Overtime pursuer, released once the escape timer runs out
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chaser {
    pub pos: Vec2,
    pub size: Vec2,
    pub spawned: bool,
}

impl Chaser {
    pub fn new(size: f32) -> Self {
        Self {
            pos: Vec2::ZERO,
            size: Vec2::splat(size),
            spawned: false,
        }
    }

    #[inline]
    pub fn rect(&self) -> Aabb {
        Aabb {
            pos: self.pos,
            size: self.size,
        }
    }

    /// Close a fixed fraction of the gap each tick
    pub fn pursue(&mut self, target: Vec2, factor: f32) {
        self.pos += (target - self.pos) * factor;
    }
}

/// Smoothed follow camera (top-left of the view)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub pos: Vec2,
    pub viewport: Vec2,
}

impl Camera {
    const FOLLOW: f32 = 0.1;
    const SUPER_JUMP_FOLLOW: f32 = 0.2;
    const LOOK_AHEAD: f32 = 20.0;

    /// Starts a third of a screen left of the spawn
    pub fn new(spawn: Vec2, viewport: Vec2) -> Self {
        Self {
            pos: Vec2::new((spawn.x - viewport.x / 3.0).max(0.0), 0.0),
            viewport,
        }
    }

    pub fn follow(&mut self, player: &Player) {
        let target_x = player.pos.x - self.viewport.x / 2.0 + player.vel.x * Self::LOOK_AHEAD;
        self.pos.x += (target_x - self.pos.x) * Self::FOLLOW;

        let centered_y = player.pos.y - self.viewport.y / 2.0;
        if player.action() == Move::SuperJump {
            self.pos.y += (centered_y - self.pos.y) * Self::SUPER_JUMP_FOLLOW;
        } else {
            let target_y = centered_y.min(CAMERA_GROUND_ROW * TILE_SIZE);
            self.pos.y += (target_y - self.pos.y) * Self::FOLLOW;
        }
    }
}

/// Complete simulation state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationState {
    pub tuning: Tuning,
    pub player: Player,
    /// Level entities in generation order
    pub entities: Vec<Entity>,
    pub progress: Progress,
    pub history: PositionHistory,
    pub chaser: Chaser,
    pub camera: Camera,
    /// Respawn point after a pit fall
    pub checkpoint: Vec2,
    /// Overlapping the exit door during the escape
    pub show_exit_prompt: bool,
    pub screen_shake: f32,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Pending events for this tick (not serialized)
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl SimulationState {
    pub fn new(level: Level, tuning: Tuning) -> Result<Self, LevelError> {
        let spawn = level.spawn_point()?;
        let viewport = Vec2::new(tuning.viewport_width, tuning.viewport_height);

        Ok(Self {
            player: Player::new(spawn),
            entities: level.into_entities(),
            progress: Progress::new(tuning.combo_timer_max),
            history: PositionHistory::new(tuning.history_capacity, tuning.history_min_distance),
            chaser: Chaser::new(tuning.chaser_size),
            camera: Camera::new(spawn, viewport),
            checkpoint: spawn,
            show_exit_prompt: false,
            screen_shake: 0.0,
            time_ticks: 0,
            events: Vec::new(),
            tuning,
        })
    }

    #[inline]
    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    #[inline]
    pub fn sound(&mut self, effect: SoundEffect) {
        self.events.push(GameEvent::Sound(effect));
    }

    #[inline]
    pub fn shake(&mut self, amount: f32) {
        self.events.push(GameEvent::Shake(amount));
    }

    /// Take this tick's events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
