//! Interaction resolver
//!
//! Runs once per tick after the player has moved. Every live entity that
//! overlaps the player is dispatched by kind, in level order. Triggers
//! (pickups, doors, portals...) consume the contact; terrain, locked doors,
//! unbroken breakables and missed rails fall through to solid resolution.

use glam::Vec2;

use super::collision::{Side, overlaps, resolve};
use super::entity::{DamageMode, Enemy, EnemyKind, Entity, EntityKind};
use super::input::Keys;
use super::player::Support;
use super::progress::{Lap, Status};
use super::state::{GameEvent, SimulationState};
use crate::audio::SoundEffect;
use crate::consts::*;

/// What a contact did
enum Contact {
    /// Effect applied, no physical response
    Consumed,
    /// Push the player out like terrain
    Solid,
    /// The match just ended
    Finished,
}

/// Resolve all player contacts for this tick; returns true if the match ended
pub fn resolve_interactions(state: &mut SimulationState, held: Keys) -> bool {
    // Evaluated once, before any contact changes the player's state
    let aggressive = state.player.is_aggressive();
    let speed = state.player.vel.x.abs();
    let cull = state.tuning.cull_range;

    state.player.set_support(Support::Airborne);

    for i in 0..state.entities.len() {
        let e = &state.entities[i];
        if !e.is_active() || e.kind.is_follower() {
            continue;
        }
        if e.escape_only && state.progress.status != Status::Escape {
            continue;
        }
        let px = state.player.pos.x;
        if e.pos.x > px + cull || e.pos.x + e.size.x < px - cull {
            continue;
        }
        if !overlaps(&state.player.rect(), &e.rect()) {
            continue;
        }

        match contact(state, i, held, aggressive, speed) {
            Contact::Consumed => {}
            Contact::Solid => collide_solid(state, i, held),
            Contact::Finished => return true,
        }
    }
    false
}

fn contact(
    state: &mut SimulationState,
    i: usize,
    held: Keys,
    aggressive: bool,
    speed: f32,
) -> Contact {
    let smashing = aggressive || state.player.is_uppercutting();

    let kind = state.entities[i].kind;
    match kind {
        EntityKind::Checkpoint { active: false } => {
            let e = &mut state.entities[i];
            e.kind = EntityKind::Checkpoint { active: true };
            log::debug!("checkpoint {} activated", e.id);
            state.checkpoint = Vec2::new(e.pos.x, e.pos.y - 20.0);
            state.sound(SoundEffect::Collect);
            Contact::Consumed
        }
        EntityKind::Gerry { collected: false } => {
            state.entities[i].kind = EntityKind::Gerry { collected: true };
            let progress = &mut state.progress;
            progress.gerry_collected = true;
            progress.refresh_combo();
            progress.add_score(GERRY_SCORE);
            state.sound(SoundEffect::Collect);
            state.shake(5.0);
            Contact::Consumed
        }
        EntityKind::Secret => {
            state.entities[i].dead = true;
            state.progress.find_secret();
            state.progress.add_score(SECRET_SCORE);
            state.progress.bump_combo();
            state.sound(SoundEffect::Secret);
            state.shake(5.0);
            Contact::Consumed
        }
        EntityKind::Treasure => {
            state.entities[i].dead = true;
            state.progress.treasure_collected = true;
            state.progress.add_score(TREASURE_SCORE);
            state.progress.bump_combo();
            state.sound(SoundEffect::Secret);
            state.shake(30.0);
            Contact::Consumed
        }
        EntityKind::ToppinCage { toppin } => {
            // Never solid, broken or not
            if smashing {
                let e = &mut state.entities[i];
                e.kind = EntityKind::Toppin { toppin };
                e.size = Vec2::splat(30.0);
                e.taunt_timer = 0;
                state.progress.add_score(CAGE_SCORE);
                state.progress.bump_combo();
                state.sound(SoundEffect::Break);
                state.sound(SoundEffect::Collect);
                state.shake(10.0);
            }
            Contact::Consumed
        }
        EntityKind::JanitorDoor => {
            if !state.progress.gerry_collected {
                return Contact::Solid;
            }
            state.entities[i].dead = true;
            state.sound(SoundEffect::Break);
            state.shake(5.0);
            Contact::Consumed
        }
        EntityKind::Collectible { value } => {
            state.entities[i].dead = true;
            state.progress.add_score(value);
            state.progress.bump_combo();
            state.sound(SoundEffect::Collect);
            Contact::Consumed
        }
        EntityKind::EscapeTrigger { .. } => {
            if state.progress.begin_escape(state.tuning.escape_time_secs) {
                let e = &mut state.entities[i];
                e.kind = EntityKind::EscapeTrigger { triggered: true };
                e.knocked_out = true;
                e.vel = Vec2::new(15.0, -25.0);
                state.sound(SoundEffect::Escape);
                state.shake(20.0);
                state.emit(GameEvent::EscapeStarted);
                log::info!(
                    "escape started: {:.0}s on the clock",
                    state.progress.escape_timer
                );
            }
            Contact::Consumed
        }
        EntityKind::ExitDoor => {
            if state.progress.status == Status::Escape {
                state.show_exit_prompt = true;
                if held.contains(Keys::UP) {
                    if let Some(result) = state.progress.finish(true) {
                        log::info!(
                            "victory: score {} rank {} lap3 {}",
                            result.final_score,
                            result.rank,
                            result.lap3
                        );
                        state.emit(GameEvent::MatchEnded(result));
                        return Contact::Finished;
                    }
                }
            }
            Contact::Consumed
        }
        EntityKind::LapPortal => {
            if let Some(lap) = state.progress.enter_lap() {
                start_lap(state, lap);
            }
            Contact::Consumed
        }
        EntityKind::Breakable => {
            if !smashing {
                return Contact::Solid;
            }
            state.entities[i].dead = true;
            state.progress.add_score(BREAK_SCORE);
            state.sound(SoundEffect::Break);
            state.shake(2.0);
            Contact::Consumed
        }
        EntityKind::Rail => {
            if !state.player.can_grab_rail() {
                return Contact::Consumed;
            }
            let rail = state.entities[i].rect();
            if !state.player.foot_near_rail(&rail) {
                return Contact::Solid;
            }
            state.player.snap_to_rail(&rail);
            state.sound(SoundEffect::Dash);
            Contact::Consumed
        }
        EntityKind::Enemy(enemy) => {
            fight(state, i, enemy, aggressive, speed);
            Contact::Consumed
        }
        EntityKind::Block | EntityKind::Platform => Contact::Solid,
        // Active checkpoints and collected gerry are inert
        EntityKind::Checkpoint { active: true }
        | EntityKind::Gerry { collected: true }
        | EntityKind::Toppin { .. }
        | EntityKind::Player => Contact::Consumed,
    }
}

/// Enemy contact: parry, stomp, bash or get hurt
fn fight(state: &mut SimulationState, i: usize, enemy: Enemy, aggressive: bool, speed: f32) {
    if state.player.taunt_timer > 0 {
        defeat(state, i);
        state.player.taunt_timer = 0;
        state.sound(SoundEffect::Collect);
        state.shake(15.0);
        return;
    }

    let p = &state.player;
    let e = &state.entities[i];
    let falling = p.vel.y > 0.0 && p.pos.y + p.size.y < e.pos.y + e.size.y / 2.0;
    let uppercut = p.is_uppercutting();

    let wins = match enemy.kind {
        EnemyKind::Patrol => {
            let hit_front = (e.direction > 0.0 && p.pos.x > e.pos.x)
                || (e.direction < 0.0 && p.pos.x < e.pos.x);
            falling
                || uppercut
                || (!hit_front && aggressive)
                || (hit_front && speed >= MACH_2_SPEED)
        }
        EnemyKind::Chase => falling || aggressive || uppercut,
        EnemyKind::Hazard => true,
    };

    if wins {
        defeat(state, i);
    } else if let Some(mode) = enemy.kind.contact_damage() {
        hurt(state, mode);
    }
}

/// Knock an enemy out and pay the player for it
pub(crate) fn defeat(state: &mut SimulationState, i: usize) {
    let px = state.player.pos.x;
    state.entities[i].knock_out(px);
    state.progress.add_score(KILL_SCORE);
    state.progress.bump_combo();
    state.player.kill_hop();
    state.sound(SoundEffect::Kill);
    state.shake(5.0);
}

/// Damage the player: knockback, score penalty, combo cost
pub(crate) fn hurt(state: &mut SimulationState, mode: DamageMode) {
    state.player.knock_back();
    state
        .progress
        .take_damage(state.tuning.damage_penalty, mode == DamageMode::Full);
    state.sound(SoundEffect::Hurt);
    state.shake(10.0);
}

/// Teleport to the arena and restore escape content
fn start_lap(state: &mut SimulationState, lap: Lap) {
    let (bonus, shake) = match lap {
        Lap::Two => (LAP2_SCORE, 30.0),
        Lap::Three => (LAP3_SCORE, 50.0),
    };
    let progress = &mut state.progress;
    progress.add_score(bonus);
    progress.combo_timer = progress.combo_timer_max;
    if lap == Lap::Three {
        progress.escape_timer = state.tuning.lap3_escape_time_secs;
    }

    let (tx, ty) = LAP_ARENA_TILE;
    state
        .player
        .teleport(Vec2::new(tx * TILE_SIZE, ty * TILE_SIZE));

    for e in state.entities.iter_mut() {
        restore_for_lap(e);
    }

    state.sound(SoundEffect::Escape);
    state.shake(shake);
    state.emit(GameEvent::LapStarted(lap));
    log::info!("lap {:?} started, score {}", lap, state.progress.score);
}

fn restore_for_lap(e: &mut Entity) {
    match e.kind {
        EntityKind::Collectible { .. } if e.escape_only => e.dead = false,
        EntityKind::Enemy(Enemy {
            kind: EnemyKind::Chase,
            ..
        }) => e.reset_to_spawn(),
        EntityKind::EscapeTrigger { .. } => {
            e.reset_to_spawn();
            e.kind = EntityKind::EscapeTrigger { triggered: false };
        }
        _ => {}
    }
}

/// Four-side push-out against a solid entity
fn collide_solid(state: &mut SimulationState, i: usize, held: Keys) {
    let solid = state.entities[i].rect();
    let player = &mut state.player;
    match resolve(&player.rect(), &solid) {
        Side::Top => player.land_on(solid.top(), &mut state.events),
        Side::Bottom => player.bump_head(solid.bottom(), &mut state.events),
        side @ (Side::Left | Side::Right) => {
            player.hit_wall(side, &solid, held, &mut state.events)
        }
        Side::None => {}
    }
}
