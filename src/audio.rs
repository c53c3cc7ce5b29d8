//! Audio boundary
//!
//! The simulation never synthesizes or waits on sound. It names discrete cues
//! and two continuous signals (mach tier, music theme); whatever implements
//! [`AudioSink`] decides what they sound like.

use serde::{Deserialize, Serialize};

use crate::consts::{MACH_1_SPEED, MACH_2_SPEED, MACH_3_SPEED};
use crate::sim::Status;

/// One-shot sound cues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundEffect {
    Jump,
    /// Touching down from a fall faster than one tick of gravity
    Land,
    /// Dash start, rail grab
    Dash,
    /// Breakable or cage destroyed
    Break,
    /// Pickup, checkpoint, parry
    Collect,
    Kill,
    Hurt,
    Taunt,
    /// Secret or treasure found
    Secret,
    /// Escape sequence started, chaser released
    Escape,
    SuperJump,
    /// Head bump, ground-pound impact
    Bump,
}

/// Background music selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Theme {
    Level,
    Escape,
    Lap2,
    Lap3,
    /// Match over
    Silent,
}

impl Theme {
    /// Theme for the given match status and lap latches
    pub fn select(status: Status, lap2: bool, lap3: bool) -> Self {
        match status {
            Status::Playing => Theme::Level,
            Status::Escape if lap3 => Theme::Lap3,
            Status::Escape if lap2 => Theme::Lap2,
            Status::Escape => Theme::Escape,
            Status::GameOver | Status::Victory => Theme::Silent,
        }
    }
}

/// Mach loop tier (0 = off, 1..=3)
///
/// Only sounds while the player has footing (ground or rail).
pub fn mach_tier(speed: f32, has_footing: bool) -> u8 {
    let speed = speed.abs();
    if !has_footing || speed < MACH_1_SPEED {
        0
    } else if speed >= MACH_3_SPEED {
        3
    } else if speed >= MACH_2_SPEED {
        2
    } else {
        1
    }
}

/// Receiver for audio signals
///
/// Calls are fire-and-forget; implementations must not block the tick.
pub trait AudioSink {
    fn play(&mut self, effect: SoundEffect);

    /// Mach loop tier changed
    fn set_mach(&mut self, tier: u8);

    /// Music theme changed
    fn set_theme(&mut self, theme: Theme);
}

/// Sink that drops everything
#[derive(Debug, Default)]
pub struct SilentSink;

impl AudioSink for SilentSink {
    fn play(&mut self, _effect: SoundEffect) {}
    fn set_mach(&mut self, _tier: u8) {}
    fn set_theme(&mut self, _theme: Theme) {}
}

/// Sink that traces cues through the `log` facade
#[derive(Debug, Default)]
pub struct LogSink;

impl AudioSink for LogSink {
    fn play(&mut self, effect: SoundEffect) {
        log::trace!("sfx {:?}", effect);
    }

    fn set_mach(&mut self, tier: u8) {
        log::trace!("mach loop tier {}", tier);
    }

    fn set_theme(&mut self, theme: Theme) {
        log::debug!("theme {:?}", theme);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mach_tiers() {
        assert_eq!(mach_tier(5.0, true), 0);
        assert_eq!(mach_tier(MACH_1_SPEED, true), 1);
        assert_eq!(mach_tier(-13.0, true), 2);
        assert_eq!(mach_tier(MACH_3_SPEED, true), 3);
        assert_eq!(mach_tier(20.0, false), 0);
    }

    #[test]
    fn test_theme_selection() {
        assert_eq!(Theme::select(Status::Playing, false, false), Theme::Level);
        assert_eq!(Theme::select(Status::Escape, false, false), Theme::Escape);
        assert_eq!(Theme::select(Status::Escape, true, false), Theme::Lap2);
        assert_eq!(Theme::select(Status::Escape, true, true), Theme::Lap3);
        assert_eq!(Theme::select(Status::Victory, true, true), Theme::Silent);
    }
}
