//! Progression state machine: score, combo, rank latches, laps and status
//!
//! Status only moves forward: `Playing -> Escape -> {Victory | GameOver}`.
//! Once terminal, nothing here changes again.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::MAX_SECRETS;

/// Overall match status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Playing,
    Escape,
    GameOver,
    Victory,
}

impl Status {
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::GameOver | Status::Victory)
    }

    /// Forward-only transition table
    fn can_advance_to(self, next: Status) -> bool {
        matches!(
            (self, next),
            (Status::Playing, Status::Escape)
                | (Status::Escape, Status::Victory)
                | (Status::Escape, Status::GameOver)
        )
    }
}

/// Final letter grade, ordered worst to best
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rank {
    D,
    C,
    B,
    A,
    S,
    P,
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Rank::D => "D",
            Rank::C => "C",
            Rank::B => "B",
            Rank::A => "A",
            Rank::S => "S",
            Rank::P => "P",
        };
        f.write_str(s)
    }
}

/// Total-score thresholds (exclusive) for each rank
pub const RANK_S_THRESHOLD: f32 = 10_000.0;
pub const RANK_A_THRESHOLD: f32 = 7_000.0;
pub const RANK_B_THRESHOLD: f32 = 4_000.0;
pub const RANK_C_THRESHOLD: f32 = 1_000.0;

/// Which lap a portal just started
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lap {
    Two,
    Three,
}

/// Handed to the end-of-match callback
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub final_score: u64,
    pub rank: Rank,
    pub won: bool,
    pub lap3: bool,
}

/// Score, combo and rank bookkeeping for one match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub score: u64,
    pub combo: u32,
    pub combo_timer: f32,
    pub combo_timer_max: f32,
    pub gerry_collected: bool,
    pub treasure_collected: bool,
    pub secrets_found: u8,
    /// One-way latch, blocks P rank
    pub combo_dropped: bool,
    pub lap2: bool,
    pub lap3: bool,
    /// Seconds left; counts down only during the escape
    pub escape_timer: f32,
    pub status: Status,
}

impl Progress {
    pub fn new(combo_timer_max: f32) -> Self {
        Self {
            score: 0,
            combo: 0,
            combo_timer: 0.0,
            combo_timer_max,
            gerry_collected: false,
            treasure_collected: false,
            secrets_found: 0,
            combo_dropped: false,
            lap2: false,
            lap3: false,
            escape_timer: 0.0,
            status: Status::Playing,
        }
    }

    pub fn add_score(&mut self, points: u64) {
        self.score = self.score.saturating_add(points);
    }

    /// Combo +1 with a full timer
    pub fn bump_combo(&mut self) {
        self.combo += 1;
        self.combo_timer = self.combo_timer_max;
    }

    /// Refill the timer of a running combo
    pub fn refresh_combo(&mut self) {
        if self.combo > 0 {
            self.combo_timer = self.combo_timer_max;
        }
    }

    /// Per-tick decay; dropping a running combo trips the latch
    pub fn decay_combo(&mut self, decay: f32) {
        if self.combo == 0 {
            return;
        }
        self.combo_timer -= decay;
        if self.combo_timer <= 0.0 {
            self.combo_timer = 0.0;
            self.drop_combo();
        }
    }

    fn drop_combo(&mut self) {
        self.combo = 0;
        self.combo_dropped = true;
    }

    /// Damage: score penalty floored at zero, combo cost depends on `full`
    pub fn take_damage(&mut self, penalty: u64, full: bool) {
        self.score = self.score.saturating_sub(penalty);
        if full {
            self.drop_combo();
        } else {
            self.combo_timer /= 2.0;
        }
    }

    pub fn find_secret(&mut self) {
        self.secrets_found = (self.secrets_found + 1).min(MAX_SECRETS);
    }

    /// `Playing -> Escape` with the timer armed; false if not playing
    pub fn begin_escape(&mut self, escape_time: f32) -> bool {
        if !self.advance(Status::Escape) {
            return false;
        }
        self.escape_timer = escape_time;
        true
    }

    /// Count the escape timer down; returns true while in overtime
    pub fn tick_escape(&mut self, dt: f32) -> bool {
        self.escape_timer -= dt;
        if self.escape_timer <= 0.0 {
            self.escape_timer = 0.0;
            return true;
        }
        false
    }

    /// Latch the next lap; `None` once lap 3 is reached or outside the escape
    pub fn enter_lap(&mut self) -> Option<Lap> {
        if self.status != Status::Escape {
            return None;
        }
        if !self.lap2 {
            self.lap2 = true;
            Some(Lap::Two)
        } else if !self.lap3 {
            self.lap3 = true;
            Some(Lap::Three)
        } else {
            None
        }
    }

    /// Move to a terminal status, producing the match result exactly once
    pub fn finish(&mut self, won: bool) -> Option<MatchResult> {
        let next = if won { Status::Victory } else { Status::GameOver };
        if !self.advance(next) {
            return None;
        }
        Some(MatchResult {
            final_score: self.score,
            rank: self.rank(),
            won,
            lap3: self.lap3,
        })
    }

    fn advance(&mut self, next: Status) -> bool {
        if !self.status.can_advance_to(next) {
            return false;
        }
        self.status = next;
        true
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Base score plus the remaining-time bonus
    pub fn total_score(&self) -> f32 {
        let bonus = if self.escape_timer > 0.0 {
            self.escape_timer * 10.0
        } else {
            0.0
        };
        self.score as f32 + bonus
    }

    pub fn p_rank_eligible(&self) -> bool {
        self.lap2
            && self.secrets_found >= MAX_SECRETS
            && self.treasure_collected
            && !self.combo_dropped
    }

    /// Live rank
    pub fn rank(&self) -> Rank {
        let total = self.total_score();
        if self.p_rank_eligible() && total > RANK_S_THRESHOLD {
            Rank::P
        } else if total > RANK_S_THRESHOLD {
            Rank::S
        } else if total > RANK_A_THRESHOLD {
            Rank::A
        } else if total > RANK_B_THRESHOLD {
            Rank::B
        } else if total > RANK_C_THRESHOLD {
            Rank::C
        } else {
            Rank::D
        }
    }
}
