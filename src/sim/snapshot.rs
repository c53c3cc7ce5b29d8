//! Read-only view of the simulation for presentation

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::entity::{Entity, EntityKind};
use super::player::{Move, Support};
use super::progress::{Progress, Rank, Status};
use super::state::SimulationState;
use crate::audio::{Theme, mach_tier};

/// Player fields needed to pick an animation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    pub pos: Vec2,
    pub size: Vec2,
    pub vel: Vec2,
    pub direction: f32,
    pub support: Support,
    pub action: Move,
    pub taunting: bool,
    pub breakdance_timer: u32,
}

/// A renderable entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityView {
    pub id: u32,
    pub kind: EntityKind,
    pub pos: Vec2,
    pub size: Vec2,
    pub direction: f32,
    pub knocked_out: bool,
    pub taunt_timer: u32,
}

impl From<&Entity> for EntityView {
    fn from(e: &Entity) -> Self {
        Self {
            id: e.id,
            kind: e.kind,
            pos: e.pos,
            size: e.size,
            direction: e.direction,
            knocked_out: e.knocked_out,
            taunt_timer: e.taunt_timer,
        }
    }
}

/// Everything a frame needs, copied out of the state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub tick: u64,
    pub progress: Progress,
    pub rank: Rank,
    pub total_score: f32,
    pub player: PlayerView,
    pub entities: Vec<EntityView>,
    /// Present once released
    pub chaser: Option<Aabb>,
    pub camera: Vec2,
    pub show_exit_prompt: bool,
    pub mach_tier: u8,
    pub theme: Theme,
    pub screen_shake: f32,
}

impl Snapshot {
    pub fn capture(state: &SimulationState) -> Self {
        let p = &state.player;
        let progress = &state.progress;
        let escaping = progress.status == Status::Escape;

        let entities = state
            .entities
            .iter()
            .filter(|e| !e.dead && (escaping || !e.escape_only))
            .map(EntityView::from)
            .collect();

        Self {
            tick: state.time_ticks,
            progress: progress.clone(),
            rank: progress.rank(),
            total_score: progress.total_score(),
            player: PlayerView {
                pos: p.pos,
                size: p.size,
                vel: p.vel,
                direction: p.direction,
                support: p.support(),
                action: p.action(),
                taunting: p.taunt_timer > 0,
                breakdance_timer: p.breakdance_timer,
            },
            entities,
            chaser: state.chaser.spawned.then(|| state.chaser.rect()),
            camera: state.camera.pos,
            show_exit_prompt: state.show_exit_prompt,
            mach_tier: mach_tier(p.vel.x, p.on_ground()),
            theme: Theme::select(progress.status, progress.lap2, progress.lap3),
            screen_shake: state.screen_shake,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::Level;
    use crate::tuning::Tuning;

    fn state() -> SimulationState {
        let entities = vec![
            Entity::new(1, EntityKind::ExitDoor, 0.0, 356.0, 48.0, 144.0),
            Entity::new(2, EntityKind::Collectible { value: 50 }, 500.0, 0.0, 20.0, 20.0)
                .escape_only(),
            Entity::new(3, EntityKind::Collectible { value: 10 }, 600.0, 0.0, 20.0, 20.0),
        ];
        SimulationState::new(Level::new(entities).unwrap(), Tuning::default()).unwrap()
    }

    fn ids(snapshot: &Snapshot) -> Vec<u32> {
        snapshot.entities.iter().map(|e| e.id).collect()
    }

    #[test]
    fn test_escape_only_hidden_until_escape() {
        let mut state = state();
        assert_eq!(ids(&Snapshot::capture(&state)), vec![1, 3]);

        state.progress.begin_escape(120.0);
        let snapshot = Snapshot::capture(&state);
        assert_eq!(ids(&snapshot), vec![1, 2, 3]);
        assert_eq!(snapshot.theme, Theme::Escape);
    }

    #[test]
    fn test_dead_entities_dropped() {
        let mut state = state();
        state.entities[2].dead = true;
        assert_eq!(ids(&Snapshot::capture(&state)), vec![1]);
    }

    #[test]
    fn test_chaser_only_after_release() {
        let mut state = state();
        assert!(Snapshot::capture(&state).chaser.is_none());
        state.chaser.spawned = true;
        assert!(Snapshot::capture(&state).chaser.is_some());
    }

    #[test]
    fn test_snapshot_serializes() {
        let json = serde_json::to_string(&Snapshot::capture(&state())).unwrap();
        assert!(json.contains("\"rank\":\"D\""));
    }
}
