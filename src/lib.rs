//! Pizza Sprint - a tile-based 2D platformer simulation core
//!
//! Core modules:
//! - `sim`: Deterministic per-frame simulation (movement, collisions, enemies, scoring)
//! - `level`: Level container, validation and the default level factory
//! - `audio`: Audio boundary (named cues, mach tier, music theme)
//! - `tuning`: Data-driven game balance
//! - `error`: Errors for the few fallible entry points

pub mod audio;
pub mod error;
pub mod level;
pub mod sim;
pub mod tuning;

pub use error::{LevelError, TuningError};
pub use level::Level;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation rate (one tick per animation frame)
    pub const TICK_RATE: f32 = 60.0;
    pub const SIM_DT: f32 = 1.0 / TICK_RATE;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// World gravity (px/tick²)
    pub const GRAVITY: f32 = 0.6;
    pub const GROUND_FRICTION: f32 = 0.85;
    pub const AIR_FRICTION: f32 = 0.95;
    /// Horizontal friction applied to knocked-out bodies
    pub const KNOCKOUT_AIR_FRICTION: f32 = 0.99;

    /// Movement (px/tick)
    pub const WALK_ACCEL: f32 = 0.5;
    pub const SPRINT_ACCEL: f32 = 0.8;
    pub const RUN_SPEED_CAP: f32 = 7.0;
    /// Decay applied when above the walking cap without sprint held
    pub const OVERSPEED_DECAY: f32 = 0.98;
    pub const MACH_1_SPEED: f32 = 8.0;
    pub const MACH_2_SPEED: f32 = 12.0;
    pub const MACH_3_SPEED: f32 = 16.0;
    pub const DASH_SPEED: f32 = 15.0;
    pub const DASH_HOP: f32 = -2.0;
    pub const CROUCH_SPEED: f32 = 3.0;

    /// Vertical impulses (negative is up)
    pub const JUMP_FORCE: f32 = -14.0;
    pub const CROUCH_JUMP_FORCE: f32 = -9.0;
    pub const SUPER_JUMP_FORCE: f32 = -22.0;
    pub const UPPERCUT_FORCE: f32 = -16.0;
    pub const WALL_CLIMB_FORCE: f32 = -10.0;
    pub const KILL_HOP: f32 = -8.0;

    /// Air dive adds this much per tick until falling at `DIVE_FALL_CAP`
    pub const DIVE_FALL_BOOST: f32 = 3.0;
    pub const DIVE_FALL_CAP: f32 = 12.0;
    pub const GROUND_POUND_ACCEL: f32 = 1.5;
    /// Fraction of gravity applied during a super-jump cancel
    pub const SUPER_JUMP_CANCEL_GRAVITY: f32 = 0.3;

    /// Action durations (ticks)
    pub const ATTACK_TICKS: u32 = 39;
    pub const TURN_TICKS: u32 = 15;
    pub const TURN_DECEL: f32 = 0.92;
    pub const PARRY_TICKS: u32 = 20;
    pub const FOLLOWER_TAUNT_TICKS: u32 = 30;

    /// Rail snapping
    pub const RAIL_MIN_SPEED: f32 = 10.0;
    pub const RAIL_BAND_BELOW: f32 = 20.0;
    pub const RAIL_BAND_ABOVE: f32 = 10.0;
    pub const RAIL_SINK: f32 = 8.0;

    /// Level extent
    pub const TILE_SIZE: f32 = 48.0;
    pub const LEVEL_WIDTH_TILES: u32 = 150;
    pub const LEVEL_HEIGHT_TILES: u32 = 60;
    pub const LEVEL_HEIGHT: f32 = LEVEL_HEIGHT_TILES as f32 * TILE_SIZE;
    /// Player falls below `LEVEL_HEIGHT + PIT_MARGIN` respawn at the checkpoint
    pub const PIT_MARGIN: f32 = 400.0;
    /// Knocked-out bodies below `LEVEL_HEIGHT + KNOCKOUT_MARGIN` are removed
    pub const KNOCKOUT_MARGIN: f32 = 500.0;

    /// Player body
    pub const PLAYER_SIZE: f32 = 40.0;

    /// Where lap portals send the player (boss arena)
    pub const LAP_ARENA_TILE: (f32, f32) = (240.0, 28.0);
    /// Camera vertical focus never drops below this row
    pub const CAMERA_GROUND_ROW: f32 = 28.0;

    /// Score rewards
    pub const KILL_SCORE: u64 = 100;
    pub const BREAK_SCORE: u64 = 50;
    pub const TAUNT_SCORE: u64 = 50;
    pub const SECRET_SCORE: u64 = 500;
    pub const TREASURE_SCORE: u64 = 3000;
    pub const GERRY_SCORE: u64 = 1000;
    pub const CAGE_SCORE: u64 = 1000;
    pub const LAP2_SCORE: u64 = 3000;
    pub const LAP3_SCORE: u64 = 5000;
    pub const MAX_SECRETS: u8 = 3;
}
