//! Error types for the fallible entry points (level intake and tuning load).
//!
//! The per-tick simulation path has no error surface.

use thiserror::Error;

/// A generated level that the simulation cannot start from.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LevelError {
    /// No exit door to derive the player's spawn point from.
    #[error("level has no exit door to spawn the player next to")]
    MissingSpawnReference,

    /// The simulation owns the only player; generators must not emit one.
    #[error("level entity {id} is a player; the simulation spawns its own")]
    PlayerInLevel {
        /// Offending entity id.
        id: u32,
    },

    /// Zero, negative or non-finite extent.
    #[error("level entity {id} has an invalid size {w}x{h}")]
    InvalidSize {
        /// Offending entity id.
        id: u32,
        /// Width in pixels.
        w: f32,
        /// Height in pixels.
        h: f32,
    },
}

/// Tuning data that failed to load.
#[derive(Error, Debug)]
pub enum TuningError {
    /// Malformed JSON.
    #[error("tuning parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value outside its usable range.
    #[error("tuning value {field} = {value} is out of range")]
    OutOfRange {
        /// Field name as it appears in the JSON.
        field: &'static str,
        /// Rejected value.
        value: f32,
    },
}
