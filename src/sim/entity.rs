//! Level entities
//!
//! Every non-player object in the level is an [`Entity`]: a box with a
//! velocity and a closed [`EntityKind`] tag carrying its kind-specific data.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;

/// Enemy behaviors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Walks between patrol bounds, turns at ledges, hurts from the front
    Patrol,
    /// Slow drifting hazard, defeated by any contact with the player
    Hazard,
    /// Inert until the escape, then chases the player
    Chase,
}

/// How an enemy hurts the player on contact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageMode {
    /// Combo reset and the combo-dropped latch set
    Full,
    /// Combo timer halved, combo kept
    Soft,
}

impl EnemyKind {
    /// Contact damage dealt through the regular interaction path
    ///
    /// `None` means touching it always defeats it instead.
    pub fn contact_damage(self) -> Option<DamageMode> {
        match self {
            EnemyKind::Patrol | EnemyKind::Chase => Some(DamageMode::Soft),
            EnemyKind::Hazard => None,
        }
    }
}

/// Follower flavors (cosmetic)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToppinKind {
    Nugget,
    Burger,
    Pizza,
    Hotdog,
    Slushy,
}

/// Patrolling enemy state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub kind: EnemyKind,
    /// Horizontal patrol range (left, right), if any
    pub patrol: Option<(f32, f32)>,
}

/// Closed set of entity kinds with their kind-specific data
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EntityKind {
    /// Only used in snapshots; the level never contains one
    Player,
    Block,
    Platform,
    Enemy(Enemy),
    Collectible { value: u64 },
    EscapeTrigger { triggered: bool },
    ExitDoor,
    Breakable,
    Rail,
    Checkpoint { active: bool },
    LapPortal,
    ToppinCage { toppin: ToppinKind },
    Toppin { toppin: ToppinKind },
    Gerry { collected: bool },
    JanitorDoor,
    Treasure,
    Secret,
}

impl EntityKind {
    /// Terrain that enemies stand on and ledge probes look for
    #[inline]
    pub fn is_terrain(&self) -> bool {
        matches!(
            self,
            EntityKind::Block | EntityKind::Platform | EntityKind::Breakable
        )
    }

    /// Position-driven followers trailing the player
    #[inline]
    pub fn is_follower(&self) -> bool {
        matches!(
            self,
            EntityKind::Toppin { .. } | EntityKind::Gerry { collected: true }
        )
    }

    #[inline]
    pub fn enemy_kind(&self) -> Option<EnemyKind> {
        match self {
            EntityKind::Enemy(enemy) => Some(enemy.kind),
            _ => None,
        }
    }
}

/// A simulated level object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: u32,
    pub kind: EntityKind,
    pub pos: Vec2,
    pub size: Vec2,
    pub vel: Vec2,
    /// Facing, -1.0 or 1.0
    pub direction: f32,
    /// Removed from simulation and rendering
    pub dead: bool,
    /// Defeated; flies ballistically until it leaves the world
    pub knocked_out: bool,
    /// Only present during the escape
    pub escape_only: bool,
    /// Standing on terrain after the last terrain pass
    pub grounded: bool,
    /// Follower taunt animation (ticks)
    pub taunt_timer: u32,
    /// Position at generation time, used by lap resets
    pub spawn: Vec2,
}

impl Entity {
    pub fn new(id: u32, kind: EntityKind, x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            id,
            kind,
            pos: Vec2::new(x, y),
            size: Vec2::new(w, h),
            vel: Vec2::ZERO,
            direction: 1.0,
            dead: false,
            knocked_out: false,
            escape_only: false,
            grounded: false,
            taunt_timer: 0,
            spawn: Vec2::new(x, y),
        }
    }

    pub fn with_direction(mut self, direction: f32) -> Self {
        self.direction = direction;
        self
    }

    pub fn escape_only(mut self) -> Self {
        self.escape_only = true;
        self
    }

    #[inline]
    pub fn rect(&self) -> Aabb {
        Aabb {
            pos: self.pos,
            size: self.size,
        }
    }

    /// Alive and not defeated
    #[inline]
    pub fn is_active(&self) -> bool {
        !self.dead && !self.knocked_out
    }

    /// Defeat with a ballistic launch away from `from_x`
    pub fn knock_out(&mut self, from_x: f32) {
        self.knocked_out = true;
        self.dead = false;
        let away = if self.pos.x - from_x > 0.0 { 1.0 } else { -1.0 };
        self.vel = Vec2::new(away * 15.0, -20.0);
    }

    /// Restore position and liveness to generation state
    pub fn reset_to_spawn(&mut self) {
        self.pos = self.spawn;
        self.vel = Vec2::ZERO;
        self.dead = false;
        self.knocked_out = false;
        self.grounded = false;
    }
}
