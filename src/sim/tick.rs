//! Fixed timestep simulation tick
//!
//! Core game loop that advances the simulation deterministically. The order
//! below is fixed; every stage sees the results of the stages before it.
//!
//! 1. queued edge actions
//! 2. escape timer and overtime chaser
//! 3. breakdance, follower history, timers, combo decay
//! 4. pit recovery
//! 5. knocked-out bodies, enemies, followers
//! 6. player movement and integration
//! 7. interactions
//! 8. camera and screen shake

use glam::Vec2;

use super::collision::overlaps;
use super::enemy::{terrain_boxes, update_enemy, update_knocked_out};
use super::entity::DamageMode;
use super::follower::place_followers;
use super::input::{Action, Keys, TickInput};
use super::interact::{hurt, resolve_interactions};
use super::progress::Status;
use super::state::{GameEvent, SimulationState};
use crate::audio::SoundEffect;
use crate::consts::*;

/// Screen shake lost per tick
const SHAKE_DECAY: f32 = 1.0;

/// Advance the simulation by one fixed timestep
///
/// A no-op once the match is over.
pub fn tick(state: &mut SimulationState, input: &TickInput) {
    if state.progress.is_terminal() {
        return;
    }
    let first_event = state.events.len();
    state.time_ticks += 1;

    advance(state, input);

    // Fold this tick's shake impulses into the decayed intensity
    let mut shake = (state.screen_shake - SHAKE_DECAY).max(0.0);
    for event in &state.events[first_event..] {
        if let GameEvent::Shake(amount) = event {
            shake = shake.max(*amount);
        }
    }
    state.screen_shake = shake;
}

fn advance(state: &mut SimulationState, input: &TickInput) {
    let held = input.held;
    state.show_exit_prompt = false;

    for &action in &input.actions {
        apply_action(state, action, held);
    }

    if state.progress.status == Status::Escape && update_overtime(state) {
        return;
    }

    state.player.update_breakdance(held);
    state.history.record(state.player.pos, state.player.direction);
    state.player.tick_timers();
    state.progress.decay_combo(state.tuning.combo_decay);

    if state.player.pos.y > LEVEL_HEIGHT + PIT_MARGIN {
        recover_from_pit(state);
    }

    update_entities(state);

    state.player.update_movement(held, &mut state.events);
    state.player.integrate();

    if resolve_interactions(state, held) {
        return;
    }

    state.camera.follow(&state.player);
}

fn apply_action(state: &mut SimulationState, action: Action, held: Keys) {
    let events = &mut state.events;
    match action {
        Action::Jump => state.player.jump(held, events),
        Action::Attack => state.player.attack(held, events),
        Action::Taunt => {
            if state.player.taunt(events) {
                for e in state.entities.iter_mut() {
                    if e.is_active() && e.kind.is_follower() {
                        e.taunt_timer = FOLLOWER_TAUNT_TICKS;
                    }
                }
                if state.progress.combo > 0 {
                    state.progress.add_score(TAUNT_SCORE);
                }
            }
        }
        Action::SuperJumpRelease => state.player.release_super_jump(events),
    }
}

/// Escape countdown; once it runs out the chaser hunts the player
///
/// Returns true if the chaser ended the match.
fn update_overtime(state: &mut SimulationState) -> bool {
    if !state.progress.tick_escape(SIM_DT) {
        return false;
    }

    if !state.chaser.spawned {
        state.chaser.spawned = true;
        state.chaser.pos = Vec2::new(
            state.player.pos.x,
            state.camera.pos.y - state.tuning.chaser_spawn_offset,
        );
        state.sound(SoundEffect::Escape);
        state.emit(GameEvent::ChaserReleased);
        log::info!("overtime: chaser released at {:?}", state.chaser.pos);
    }

    state
        .chaser
        .pursue(state.player.pos, state.tuning.chaser_pursuit);

    if !overlaps(&state.player.rect(), &state.chaser.rect()) {
        return false;
    }
    hurt(state, DamageMode::Full);
    if let Some(result) = state.progress.finish(false) {
        log::info!(
            "caught by the chaser: score {} rank {}",
            result.final_score,
            result.rank
        );
        state.emit(GameEvent::MatchEnded(result));
    }
    true
}

fn recover_from_pit(state: &mut SimulationState) {
    log::debug!(
        "pit fall at {:?}, respawning at {:?}",
        state.player.pos,
        state.checkpoint
    );
    state.player.respawn(state.checkpoint);
    state.history.clear();
    state.sound(SoundEffect::Hurt);
    state.shake(10.0);
}

fn update_entities(state: &mut SimulationState) {
    let terrain = terrain_boxes(&state.entities);
    let status = state.progress.status;
    let player_pos = state.player.pos;

    for e in state.entities.iter_mut() {
        if e.dead {
            continue;
        }
        if e.knocked_out {
            update_knocked_out(e);
        } else if e.kind.enemy_kind().is_some() {
            update_enemy(e, &terrain, player_pos, status);
        }
    }

    place_followers(
        &mut state.entities,
        &state.history,
        &state.player,
        state.tuning.follower_spacing,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::{self, Level};
    use crate::sim::entity::{Entity, EntityKind, ToppinKind};
    use crate::sim::player::Move;
    use crate::tuning::Tuning;
    use proptest::prelude::*;

    /// Flat floor, exit door on the left; spawn at (108, 400)
    fn flat_state(mut extra: Vec<Entity>) -> SimulationState {
        let mut entities = vec![
            Entity::new(1, EntityKind::ExitDoor, 0.0, 356.0, 48.0, 144.0),
            Entity::new(2, EntityKind::Block, -2000.0, 440.0, 20_000.0, 48.0),
        ];
        entities.append(&mut extra);
        SimulationState::new(Level::new(entities).unwrap(), Tuning::default()).unwrap()
    }

    fn idle() -> TickInput {
        TickInput::default()
    }

    #[test]
    fn test_player_settles_on_floor() {
        let mut state = flat_state(vec![]);
        for _ in 0..10 {
            tick(&mut state, &idle());
        }
        assert_eq!(state.player.pos.y, 400.0);
        assert!(state.player.on_ground());
    }

    #[test]
    fn test_jump_action_consumed_next_tick() {
        let mut state = flat_state(vec![]);
        for _ in 0..5 {
            tick(&mut state, &idle());
        }
        tick(&mut state, &TickInput::held(Keys::JUMP).with_action(Action::Jump));
        assert!(state.player.vel.y < 0.0);
        assert!(state.player.pos.y < 400.0);
        assert!(
            state
                .drain_events()
                .contains(&GameEvent::Sound(SoundEffect::Jump))
        );
    }

    #[test]
    fn test_mach_turn_keeps_speed() {
        let mut state = flat_state(vec![]);
        for _ in 0..5 {
            tick(&mut state, &idle());
        }
        state.player.vel.x = 14.0;
        state.player.direction = 1.0;

        tick(&mut state, &TickInput::held(Keys::LEFT));
        assert!(state.player.is_turning());
        for _ in 0..TURN_TICKS {
            tick(&mut state, &TickInput::held(Keys::LEFT));
        }
        assert!(!state.player.is_turning());
        assert_eq!(state.player.direction, -1.0);
        assert!(state.player.vel.x <= -13.0, "vx = {}", state.player.vel.x);
    }

    #[test]
    fn test_escape_trigger_via_tick() {
        let trigger = Entity::new(
            3,
            EntityKind::EscapeTrigger { triggered: false },
            140.0,
            300.0,
            144.0,
            140.0,
        );
        let mut state = flat_state(vec![trigger]);
        for _ in 0..60 {
            tick(&mut state, &TickInput::held(Keys::RIGHT));
            if state.progress.status == Status::Escape {
                break;
            }
        }
        assert_eq!(state.progress.status, Status::Escape);
        assert!(state.entities[2].knocked_out);
        assert!(state.progress.escape_timer > 119.0);
    }

    #[test]
    fn test_chaser_spawns_once_and_ends_match() {
        let mut state = flat_state(vec![]);
        state.progress.begin_escape(0.02);

        let mut released = 0;
        let mut ended = Vec::new();
        for _ in 0..300 {
            tick(&mut state, &idle());
            for event in state.drain_events() {
                match event {
                    GameEvent::ChaserReleased => released += 1,
                    GameEvent::MatchEnded(result) => ended.push(result),
                    _ => {}
                }
            }
        }
        assert_eq!(released, 1);
        assert_eq!(ended.len(), 1);
        assert!(!ended[0].won);
        assert_eq!(state.progress.status, Status::GameOver);
        assert!(state.progress.combo_dropped);
    }

    #[test]
    fn test_terminal_state_is_frozen() {
        let mut state = flat_state(vec![]);
        state.progress.begin_escape(120.0);
        state.progress.finish(true);
        let ticks = state.time_ticks;
        let pos = state.player.pos;
        tick(&mut state, &TickInput::held(Keys::RIGHT).with_action(Action::Jump));
        assert_eq!(state.time_ticks, ticks);
        assert_eq!(state.player.pos, pos);
        assert!(state.events.is_empty());
    }

    #[test]
    fn test_pit_fall_respawns_at_checkpoint() {
        let mut state = flat_state(vec![]);
        state.player.pos = Vec2::new(500.0, LEVEL_HEIGHT + PIT_MARGIN + 10.0);
        state.player.enter(Move::Dive);
        tick(&mut state, &idle());
        assert!(state.player.pos.distance(state.checkpoint) < 1.0);
        assert_eq!(state.player.action(), Move::Idle);
        assert!(state.history.sample_clamped(0).is_none());
        assert!(
            state
                .events
                .contains(&GameEvent::Sound(SoundEffect::Hurt))
        );
    }

    #[test]
    fn test_taunt_opens_parry_and_pays_combo() {
        let mut state = flat_state(vec![Entity::new(
            3,
            EntityKind::Toppin {
                toppin: ToppinKind::Pizza,
            },
            0.0,
            0.0,
            30.0,
            30.0,
        )]);
        state.progress.bump_combo();
        tick(&mut state, &idle().with_action(Action::Taunt));
        assert_eq!(state.player.taunt_timer, PARRY_TICKS - 1);
        assert_eq!(state.progress.score, TAUNT_SCORE);
        assert_eq!(state.entities[2].taunt_timer, FOLLOWER_TAUNT_TICKS - 1);
    }

    #[test]
    fn test_screen_shake_decays() {
        let mut state = flat_state(vec![]);
        state.shake(4.0);
        state.screen_shake = 0.0;
        tick(&mut state, &idle());
        // Events queued outside a tick are not folded in
        assert_eq!(state.screen_shake, 0.0);

        state.screen_shake = 3.0;
        tick(&mut state, &idle());
        assert_eq!(state.screen_shake, 2.0);
    }

    /// Cross-field rules the state machine keeps after every tick
    fn check_player(state: &SimulationState, held: Keys) -> Result<(), TestCaseError> {
        let p = &state.player;
        match p.action() {
            Move::Attack { timer } => prop_assert!((1..=ATTACK_TICKS).contains(&timer)),
            Move::Turn {
                timer,
                stored_speed,
            } => {
                prop_assert!((1..=TURN_TICKS).contains(&timer));
                prop_assert!(stored_speed >= MACH_2_SPEED);
            }
            // Armed super jump holds the player in place
            Move::SuperJumpPrep => prop_assert_eq!(p.vel.x, 0.0),
            _ => {}
        }
        prop_assert!(p.taunt_timer <= PARRY_TICKS);
        if !held.contains(Keys::TAUNT) {
            prop_assert_eq!(p.breakdance_timer, 0);
        }
        Ok(())
    }

    fn key_strategy() -> impl Strategy<Value = (u8, u8)> {
        (any::<u8>(), 0u8..5)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_player_state_stays_consistent(frames in proptest::collection::vec(key_strategy(), 1..400)) {
            let mut state = SimulationState::new(
                level::factory().unwrap(),
                Tuning::default(),
            )
            .unwrap();

            for (bits, edge) in frames {
                let held = Keys::from_bits_truncate(bits);
                let mut input = TickInput::held(held);
                match edge {
                    1 => input = input.with_action(Action::Jump),
                    2 => input = input.with_action(Action::Attack),
                    3 => input = input.with_action(Action::Taunt),
                    4 => input = input.with_action(Action::SuperJumpRelease),
                    _ => {}
                }
                tick(&mut state, &input);
                state.drain_events();

                if !state.progress.is_terminal() {
                    check_player(&state, held)?;
                }
                prop_assert!(state.player.pos.is_finite());
                prop_assert!(state.progress.combo_timer >= 0.0);
                if state.progress.combo_timer == 0.0 {
                    prop_assert_eq!(state.progress.combo, 0);
                }
            }
        }
    }
}
