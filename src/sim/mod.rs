//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - No randomness
//! - Stable iteration order (level order, which is entity ID order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod driver;
pub mod enemy;
pub mod entity;
pub mod follower;
pub mod input;
pub mod interact;
pub mod player;
pub mod progress;
pub mod snapshot;
pub mod state;
pub mod tick;

pub use collision::{Aabb, Side, overlaps, resolve};
pub use driver::Simulation;
pub use entity::{DamageMode, Enemy, EnemyKind, Entity, EntityKind, ToppinKind};
pub use follower::PositionHistory;
pub use input::{Action, InputQueue, Key, Keys, TickInput};
pub use player::{Move, Player, Support};
pub use progress::{Lap, MatchResult, Progress, Rank, Status};
pub use snapshot::{EntityView, PlayerView, Snapshot};
pub use state::{Camera, Chaser, GameEvent, SimulationState};
pub use tick::tick;
