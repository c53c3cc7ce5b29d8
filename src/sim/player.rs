//! Player movement state machine
//!
//! The player's substrate ([`Support`]) and its overriding action ([`Move`])
//! are separate sum types. Entering a move replaces the previous one, so two
//! contradictory actions can never be active together.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Aabb, Side};
use super::input::Keys;
use super::state::GameEvent;
use crate::audio::SoundEffect;
use crate::consts::*;

/// What the player is standing on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Support {
    Grounded,
    Airborne,
    OnRail,
}

/// Mutually exclusive action states
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Move {
    Idle,
    Crouch,
    /// Ground slide or air dive
    Dive,
    /// Dash/grab, ends when the timer runs out
    Attack { timer: u32 },
    Uppercut,
    /// Armed super jump; held in place until Up is released
    SuperJumpPrep,
    SuperJump,
    /// Shoulder bash out of a super jump; lasts until landing
    SuperJumpCancel,
    /// Mach turn: decelerate, then reverse at the stored speed
    Turn { timer: u32, stored_speed: f32 },
    GroundPound,
}

/// The player character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub size: Vec2,
    pub vel: Vec2,
    /// Facing, -1.0 or 1.0
    pub direction: f32,
    support: Support,
    action: Move,
    /// Parry window (ticks)
    pub taunt_timer: u32,
    /// Ticks the taunt key has been held on the ground
    pub breakdance_timer: u32,
}

impl Player {
    pub fn new(spawn: Vec2) -> Self {
        Self {
            pos: spawn,
            size: Vec2::splat(PLAYER_SIZE),
            vel: Vec2::ZERO,
            direction: 1.0,
            support: Support::Airborne,
            action: Move::Idle,
            taunt_timer: 0,
            breakdance_timer: 0,
        }
    }

    #[inline]
    pub fn rect(&self) -> Aabb {
        Aabb {
            pos: self.pos,
            size: self.size,
        }
    }

    #[inline]
    pub fn action(&self) -> Move {
        self.action
    }

    /// Switch action; whatever was active before is dropped
    #[inline]
    pub fn enter(&mut self, next: Move) {
        self.action = next;
    }

    #[inline]
    pub fn support(&self) -> Support {
        self.support
    }

    #[inline]
    pub fn set_support(&mut self, support: Support) {
        self.support = support;
    }

    /// Grounded or riding a rail
    #[inline]
    pub fn on_ground(&self) -> bool {
        matches!(self.support, Support::Grounded | Support::OnRail)
    }

    #[inline]
    pub fn is_crouching(&self) -> bool {
        self.action == Move::Crouch
    }

    #[inline]
    pub fn is_diving(&self) -> bool {
        self.action == Move::Dive
    }

    /// Dash or super-jump cancel
    #[inline]
    pub fn is_attacking(&self) -> bool {
        matches!(self.action, Move::Attack { .. } | Move::SuperJumpCancel)
    }

    #[inline]
    pub fn is_uppercutting(&self) -> bool {
        self.action == Move::Uppercut
    }

    #[inline]
    pub fn is_turning(&self) -> bool {
        matches!(self.action, Move::Turn { .. })
    }

    /// Defeats enemies and breaks terrain on contact
    pub fn is_aggressive(&self) -> bool {
        self.vel.x.abs() > MACH_1_SPEED
            || self.is_attacking()
            || matches!(
                self.action,
                Move::GroundPound | Move::Dive | Move::SuperJump | Move::Uppercut
            )
    }

    /// Actions with their own vertical motion that a kill hop must not override
    fn has_vertical_action(&self) -> bool {
        matches!(
            self.action,
            Move::GroundPound
                | Move::SuperJump
                | Move::Dive
                | Move::Uppercut
                | Move::SuperJumpCancel
        )
    }

    // === Edge actions ===

    pub fn jump(&mut self, held: Keys, events: &mut Vec<GameEvent>) {
        if self.is_turning() {
            return;
        }
        self.breakdance_timer = 0;

        if self.on_ground() {
            events.push(GameEvent::Sound(SoundEffect::Jump));
            if self.action == Move::SuperJumpPrep {
                self.enter(Move::Idle);
            }
            self.vel.y = if self.is_crouching() {
                CROUCH_JUMP_FORCE
            } else {
                JUMP_FORCE
            };
            self.support = Support::Airborne;
        } else if held.contains(Keys::DOWN)
            && matches!(self.action, Move::Idle | Move::Dive | Move::Attack { .. })
        {
            self.enter(Move::GroundPound);
            self.vel = Vec2::new(0.0, self.vel.y.max(0.0));
            events.push(GameEvent::Shake(3.0));
        }
    }

    pub fn attack(&mut self, held: Keys, events: &mut Vec<GameEvent>) {
        if matches!(
            self.action,
            Move::GroundPound | Move::SuperJumpPrep | Move::Turn { .. }
        ) {
            return;
        }
        self.breakdance_timer = 0;

        if held.contains(Keys::UP)
            && !matches!(
                self.action,
                Move::Dive | Move::Crouch | Move::Uppercut | Move::SuperJump
            )
        {
            self.enter(Move::Uppercut);
            self.vel = Vec2::new(0.0, UPPERCUT_FORCE);
            self.support = Support::Airborne;
            events.push(GameEvent::Sound(SoundEffect::Jump));
            events.push(GameEvent::Shake(5.0));
            return;
        }

        if self.action == Move::SuperJump {
            self.enter(Move::SuperJumpCancel);
            self.vel = Vec2::new(self.direction * MACH_3_SPEED, 0.0);
            events.push(GameEvent::Sound(SoundEffect::Dash));
            events.push(GameEvent::Shake(8.0));
            return;
        }

        if !matches!(self.action, Move::Crouch | Move::Uppercut) && !self.is_attacking() {
            self.enter(Move::Attack {
                timer: ATTACK_TICKS,
            });
            self.vel = Vec2::new(self.direction * DASH_SPEED, DASH_HOP);
            events.push(GameEvent::Sound(SoundEffect::Dash));
            events.push(GameEvent::Shake(5.0));
        }
    }

    /// Opens the parry window; returns false when the taunt is refused
    pub fn taunt(&mut self, events: &mut Vec<GameEvent>) -> bool {
        if matches!(
            self.action,
            Move::Crouch | Move::Uppercut | Move::Turn { .. }
        ) {
            return false;
        }
        self.taunt_timer = PARRY_TICKS;
        events.push(GameEvent::Sound(SoundEffect::Taunt));
        true
    }

    /// Up released: fire an armed super jump
    pub fn release_super_jump(&mut self, events: &mut Vec<GameEvent>) {
        if self.action == Move::SuperJumpPrep {
            self.enter(Move::SuperJump);
            self.vel.y = SUPER_JUMP_FORCE;
            events.push(GameEvent::Sound(SoundEffect::SuperJump));
            events.push(GameEvent::Shake(10.0));
        }
    }

    // === Per-tick ===

    pub fn tick_timers(&mut self) {
        self.taunt_timer = self.taunt_timer.saturating_sub(1);
        if let Move::Attack { timer } = self.action {
            let timer = timer.saturating_sub(1);
            self.action = if timer == 0 {
                Move::Idle
            } else {
                Move::Attack { timer }
            };
        }
    }

    pub fn update_breakdance(&mut self, held: Keys) {
        if held.contains(Keys::TAUNT) {
            if self.support == Support::Grounded {
                self.breakdance_timer += 1;
            }
        } else {
            self.breakdance_timer = 0;
        }
    }

    /// Horizontal control: turns, super-jump arming, crouch/dive, run
    pub fn update_movement(&mut self, held: Keys, events: &mut Vec<GameEvent>) {
        match self.action {
            Move::Turn {
                timer,
                stored_speed,
            } => {
                self.vel.x *= TURN_DECEL;
                let timer = timer.saturating_sub(1);
                if timer == 0 {
                    self.direction = -self.direction;
                    self.vel.x = self.direction * stored_speed;
                    self.enter(Move::Idle);
                } else {
                    self.action = Move::Turn {
                        timer,
                        stored_speed,
                    };
                }
                return;
            }
            Move::SuperJumpPrep => {
                self.vel.x = 0.0;
                if !held.contains(Keys::UP) {
                    self.enter(Move::Idle);
                }
                return;
            }
            _ => {}
        }

        let speed = self.vel.x.abs();
        let sprinting = held.contains(Keys::SPRINT);

        if !matches!(
            self.action,
            Move::SuperJump | Move::GroundPound | Move::Uppercut
        ) && speed >= MACH_2_SPEED
            && held.contains(Keys::UP)
            && self.support == Support::Grounded
        {
            self.enter(Move::SuperJumpPrep);
            return;
        }

        if held.contains(Keys::DOWN) {
            if !matches!(
                self.action,
                Move::SuperJump | Move::Uppercut | Move::SuperJumpCancel | Move::GroundPound
            ) {
                if self.on_ground() {
                    if sprinting || speed >= MACH_1_SPEED || self.is_diving() {
                        if !self.is_diving() {
                            self.enter(Move::Dive);
                            self.vel.x = self.direction * speed.max(MACH_2_SPEED);
                        }
                    } else {
                        self.enter(Move::Crouch);
                    }
                } else {
                    self.enter(Move::Dive);
                    if self.vel.y < DIVE_FALL_CAP {
                        self.vel.y += DIVE_FALL_BOOST;
                    }
                }
            }
        } else if matches!(self.action, Move::Crouch | Move::Dive) {
            self.enter(Move::Idle);
        }

        if matches!(self.action, Move::GroundPound | Move::SuperJump) {
            return;
        }

        let speed = self.vel.x.abs();
        if self.on_ground() && speed >= MACH_2_SPEED {
            let reversing = (held.contains(Keys::LEFT) && self.direction > 0.0)
                || (held.contains(Keys::RIGHT) && self.direction < 0.0);
            if reversing {
                self.enter(Move::Turn {
                    timer: TURN_TICKS,
                    stored_speed: speed,
                });
                events.push(GameEvent::Shake(3.0));
                return;
            }
        }

        let max_speed = if sprinting {
            MACH_3_SPEED
        } else {
            RUN_SPEED_CAP
        };
        let accel = if sprinting { SPRINT_ACCEL } else { WALK_ACCEL };

        let sign = if held.contains(Keys::RIGHT) {
            1.0
        } else if held.contains(Keys::LEFT) {
            -1.0
        } else {
            let friction = if self.vel.y.abs() < 0.2 {
                GROUND_FRICTION
            } else {
                AIR_FRICTION
            };
            self.vel.x *= friction;
            return;
        };

        if !self.is_crouching() {
            self.direction = sign;
            let forward = self.vel.x * sign;
            if forward < max_speed {
                self.vel.x += sign * accel;
            } else if !sprinting && forward > max_speed {
                self.vel.x *= OVERSPEED_DECAY;
            }
        } else if self.on_ground() {
            self.direction = sign;
            self.vel.x = sign * CROUCH_SPEED;
        }
    }

    /// Vertical forces, then position
    pub fn integrate(&mut self) {
        match self.action {
            Move::SuperJump => {
                self.vel = Vec2::new(0.0, SUPER_JUMP_FORCE);
            }
            Move::SuperJumpPrep => self.vel.x = 0.0,
            Move::GroundPound => {
                self.vel.x = 0.0;
                self.vel.y += GROUND_POUND_ACCEL;
            }
            Move::Dive => self.vel.y += GRAVITY,
            _ if self.support == Support::OnRail => {}
            Move::SuperJumpCancel => self.vel.y += GRAVITY * SUPER_JUMP_CANCEL_GRAVITY,
            _ => self.vel.y += GRAVITY,
        }
        self.pos += self.vel;
    }

    // === Contact responses ===

    /// Landed on a solid top face
    pub fn land_on(&mut self, top: f32, events: &mut Vec<GameEvent>) {
        // Standing still re-lands every tick with one tick of gravity
        if self.vel.y > GRAVITY {
            events.push(GameEvent::Sound(SoundEffect::Land));
        }
        self.pos.y = top - self.size.y;
        self.vel.y = 0.0;
        if self.support != Support::OnRail {
            self.support = Support::Grounded;
        }
        match self.action {
            Move::GroundPound => {
                self.enter(Move::Idle);
                events.push(GameEvent::Sound(SoundEffect::Bump));
                events.push(GameEvent::Shake(10.0));
            }
            Move::Uppercut | Move::SuperJumpCancel => self.enter(Move::Idle),
            _ => {}
        }
    }

    /// Hit a solid bottom face from below
    pub fn bump_head(&mut self, bottom: f32, events: &mut Vec<GameEvent>) {
        self.pos.y = bottom;
        self.vel.y = 0.0;
        if self.action == Move::SuperJump {
            self.enter(Move::Idle);
            events.push(GameEvent::Sound(SoundEffect::Bump));
            events.push(GameEvent::Shake(15.0));
        }
    }

    /// Ran into a wall; dives and dashes bounce off, sprint into it climbs
    pub fn hit_wall(&mut self, side: Side, wall: &Aabb, held: Keys, events: &mut Vec<GameEvent>) {
        let (x, away, toward) = match side {
            Side::Left => (wall.left() - self.size.x, -1.0, Keys::RIGHT),
            Side::Right => (wall.right(), 1.0, Keys::LEFT),
            _ => return,
        };
        self.pos.x = x;

        if self.is_diving() || self.is_attacking() {
            self.enter(Move::Idle);
            self.vel = Vec2::new(away * 5.0, -4.0);
            events.push(GameEvent::Sound(SoundEffect::Bump));
            events.push(GameEvent::Shake(5.0));
        } else if held.contains(Keys::SPRINT | toward) {
            self.vel = Vec2::new(0.0, WALL_CLIMB_FORCE);
        } else {
            self.vel.x = 0.0;
        }
    }

    /// Whether a rail under the player can catch them this tick
    pub fn can_grab_rail(&self) -> bool {
        !(self.vel.y < 0.0
            || matches!(
                self.action,
                Move::GroundPound | Move::SuperJump | Move::SuperJumpPrep | Move::Uppercut
            ))
    }

    /// Foot within the catch band around the rail surface
    pub fn foot_near_rail(&self, rail: &Aabb) -> bool {
        let foot = self.pos.y + self.size.y;
        foot <= rail.bottom() + RAIL_BAND_BELOW && foot >= rail.top() - RAIL_BAND_ABOVE
    }

    pub fn snap_to_rail(&mut self, rail: &Aabb) {
        self.vel.y = 0.0;
        self.pos.y = rail.top() - self.size.y + RAIL_SINK;
        if self.vel.x.abs() < RAIL_MIN_SPEED {
            self.vel.x = self.direction * RAIL_MIN_SPEED;
        }
        self.support = Support::OnRail;
        if matches!(self.action, Move::Dive | Move::Crouch) {
            self.enter(Move::Idle);
        }
    }

    /// Small hop after defeating an enemy
    pub fn kill_hop(&mut self) {
        if !self.has_vertical_action() {
            self.vel.y = KILL_HOP;
        }
    }

    /// Knockback from damage; drops every action
    pub fn knock_back(&mut self) {
        self.breakdance_timer = 0;
        self.vel = Vec2::new(-self.direction * 10.0, -5.0);
        self.enter(Move::Idle);
    }

    /// Put back at a respawn point with a clean slate
    pub fn respawn(&mut self, at: Vec2) {
        self.pos = at;
        self.vel = Vec2::ZERO;
        self.enter(Move::Idle);
        self.support = Support::Grounded;
        self.breakdance_timer = 0;
    }

    /// Teleport with velocity cleared, keeping the current action
    pub fn teleport(&mut self, to: Vec2) {
        self.pos = to;
        self.vel = Vec2::ZERO;
    }
}
