//! Data-driven game balance
//!
//! Fixed physics lives in [`crate::consts`]; everything here can be loaded
//! from JSON so balance passes don't need a rebuild.

use serde::{Deserialize, Serialize};

use crate::error::TuningError;

/// Upper bound on recorded follower history samples
pub const MAX_HISTORY_CAPACITY: usize = 10_000;

/// Balance knobs read by the simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Escape ===
    /// Escape countdown length in seconds
    pub escape_time_secs: f32,
    /// Escape timer value forced by the lap 3 portal
    pub lap3_escape_time_secs: f32,
    /// Fraction of the offset the overtime chaser closes each tick
    pub chaser_pursuit: f32,
    /// Overtime chaser spawns this far above the camera's top edge
    pub chaser_spawn_offset: f32,
    /// Overtime chaser box edge
    pub chaser_size: f32,

    // === Combo / score ===
    /// Combo timer value after a refresh
    pub combo_timer_max: f32,
    /// Combo timer decay per tick (100 / 360 = six seconds at 60 Hz)
    pub combo_decay: f32,
    /// Score removed by a damage event (floored at 0)
    pub damage_penalty: u64,

    // === Simulation ===
    /// Entities further than this horizontally are not checked against the player
    pub cull_range: f32,
    /// Ticks between presentation snapshots
    pub snapshot_interval: u32,
    /// Viewport used for camera framing and chaser spawn
    pub viewport_width: f32,
    pub viewport_height: f32,

    // === Followers ===
    /// Minimum player travel (px) between recorded history samples
    pub history_min_distance: f32,
    /// Maximum recorded history samples
    pub history_capacity: usize,
    /// History samples between consecutive followers
    pub follower_spacing: usize,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            escape_time_secs: 120.0,
            lap3_escape_time_secs: 0.1,
            chaser_pursuit: 0.04,
            chaser_spawn_offset: 150.0,
            chaser_size: 120.0,

            combo_timer_max: 100.0,
            combo_decay: 0.278,
            damage_penalty: 50,

            cull_range: 2000.0,
            snapshot_interval: 10,
            viewport_width: 1280.0,
            viewport_height: 720.0,

            history_min_distance: 5.0,
            history_capacity: 600,
            follower_spacing: 8,
        }
    }
}

impl Tuning {
    /// Parse and validate tuning JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Serialize to pretty JSON (for dumping the active balance)
    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the simulation can't run with
    pub fn validate(&self) -> Result<(), TuningError> {
        let positive = [
            ("escape_time_secs", self.escape_time_secs),
            ("lap3_escape_time_secs", self.lap3_escape_time_secs),
            ("chaser_size", self.chaser_size),
            ("combo_timer_max", self.combo_timer_max),
            ("combo_decay", self.combo_decay),
            ("cull_range", self.cull_range),
            ("viewport_width", self.viewport_width),
            ("viewport_height", self.viewport_height),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(reject(field, value));
            }
        }
        if !(self.chaser_pursuit > 0.0 && self.chaser_pursuit <= 1.0) {
            return Err(reject("chaser_pursuit", self.chaser_pursuit));
        }
        if self.snapshot_interval == 0 {
            return Err(reject("snapshot_interval", 0.0));
        }
        if self.history_capacity == 0 || self.history_capacity > MAX_HISTORY_CAPACITY {
            return Err(reject("history_capacity", self.history_capacity as f32));
        }
        // Followers index the history at multiples of the spacing
        if self.follower_spacing > self.history_capacity {
            return Err(reject("follower_spacing", self.follower_spacing as f32));
        }
        Ok(())
    }
}

fn reject(field: &'static str, value: f32) -> TuningError {
    log::warn!("Rejecting tuning: {} = {}", field, value);
    TuningError::OutOfRange { field, value }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let tuning = Tuning::from_json(r#"{ "escape_time_secs": 90.0 }"#).unwrap();
        assert_eq!(tuning.escape_time_secs, 90.0);
        assert_eq!(tuning.combo_timer_max, 100.0);
        assert_eq!(tuning.follower_spacing, 8);
    }

    #[test]
    fn test_json_round_trip() {
        let mut tuning = Tuning::default();
        tuning.cull_range = 1500.0;
        let json = tuning.to_json().unwrap();
        assert_eq!(Tuning::from_json(&json).unwrap(), tuning);
    }

    #[test]
    fn test_rejects_out_of_range() {
        let err = Tuning::from_json(r#"{ "combo_decay": -1.0 }"#).unwrap_err();
        assert!(matches!(
            err,
            TuningError::OutOfRange {
                field: "combo_decay",
                ..
            }
        ));

        let err = Tuning::from_json(r#"{ "snapshot_interval": 0 }"#).unwrap_err();
        assert!(matches!(err, TuningError::OutOfRange { .. }));
    }

    #[test]
    fn test_rejects_oversized_history() {
        let err = Tuning::from_json(r#"{ "history_capacity": 1000000000000000000 }"#).unwrap_err();
        assert!(matches!(
            err,
            TuningError::OutOfRange {
                field: "history_capacity",
                ..
            }
        ));

        let at_limit = format!(r#"{{ "history_capacity": {} }}"#, MAX_HISTORY_CAPACITY);
        assert!(Tuning::from_json(&at_limit).is_ok());
    }

    #[test]
    fn test_rejects_spacing_past_history() {
        let err = Tuning::from_json(r#"{ "history_capacity": 16, "follower_spacing": 17 }"#)
            .unwrap_err();
        assert!(matches!(
            err,
            TuningError::OutOfRange {
                field: "follower_spacing",
                ..
            }
        ));
        assert!(Tuning::from_json(r#"{ "history_capacity": 16, "follower_spacing": 16 }"#).is_ok());
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            Tuning::from_json("{ not json"),
            Err(TuningError::Parse(_))
        ));
    }
}
