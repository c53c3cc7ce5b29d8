//! Simulation driver
//!
//! Owns the state and feeds it one tick per fixed timestep. Key events land in
//! an [`InputQueue`] and become visible on the next tick. Cues and the end of
//! the match go out through the audio sink and the registered callbacks.

use super::input::{InputQueue, Key};
use super::progress::MatchResult;
use super::snapshot::Snapshot;
use super::state::{GameEvent, SimulationState};
use super::tick::tick;
use crate::audio::{AudioSink, SilentSink, Theme, mach_tier};
use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::error::LevelError;
use crate::level::Level;
use crate::tuning::Tuning;

type MatchEndFn = Box<dyn FnMut(&MatchResult)>;
type SnapshotFn = Box<dyn FnMut(&Snapshot)>;

pub struct Simulation {
    state: SimulationState,
    input: InputQueue,
    accumulator: f32,
    audio: Box<dyn AudioSink>,
    mach: u8,
    theme: Theme,
    on_match_end: Option<MatchEndFn>,
    on_snapshot: Option<SnapshotFn>,
    result: Option<MatchResult>,
}

impl Simulation {
    pub fn new(level: Level, tuning: Tuning) -> Result<Self, LevelError> {
        let state = SimulationState::new(level, tuning)?;
        Ok(Self {
            state,
            input: InputQueue::default(),
            accumulator: 0.0,
            audio: Box::new(SilentSink),
            mach: 0,
            theme: Theme::Level,
            on_match_end: None,
            on_snapshot: None,
            result: None,
        })
    }

    /// Replace the audio sink; the current theme is pushed immediately
    pub fn set_audio(&mut self, mut audio: Box<dyn AudioSink>) {
        audio.set_theme(self.theme);
        audio.set_mach(self.mach);
        self.audio = audio;
    }

    pub fn on_match_end(&mut self, callback: impl FnMut(&MatchResult) + 'static) {
        self.on_match_end = Some(Box::new(callback));
    }

    pub fn on_snapshot(&mut self, callback: impl FnMut(&Snapshot) + 'static) {
        self.on_snapshot = Some(Box::new(callback));
    }

    pub fn key_down(&mut self, key: Key) {
        self.input.key_down(key);
    }

    pub fn key_up(&mut self, key: Key) {
        self.input.key_up(key);
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.state)
    }

    /// Final result, once the match is over
    pub fn result(&self) -> Option<MatchResult> {
        self.result
    }

    pub fn is_over(&self) -> bool {
        self.state.progress.is_terminal()
    }

    /// Run exactly one tick. Returns false once the match is over.
    pub fn step(&mut self) -> bool {
        if self.is_over() {
            return false;
        }

        let input = self.input.take();
        tick(&mut self.state, &input);

        for event in self.state.drain_events() {
            match event {
                GameEvent::Sound(effect) => self.audio.play(effect),
                GameEvent::MatchEnded(result) => self.end_match(result),
                _ => {}
            }
        }

        self.sync_audio();

        let interval = u64::from(self.state.tuning.snapshot_interval.max(1));
        if self.is_over() || self.state.time_ticks % interval == 0 {
            if let Some(callback) = self.on_snapshot.as_mut() {
                callback(&Snapshot::capture(&self.state));
            }
        }
        true
    }

    /// Run as many fixed ticks as `dt` seconds cover. Returns the tick count.
    pub fn advance(&mut self, dt: f32) -> u32 {
        // Clamp dt to prevent spiral of death
        let dt = dt.min(0.1);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            if !self.step() {
                self.accumulator = 0.0;
                break;
            }
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        substeps
    }

    fn end_match(&mut self, result: MatchResult) {
        if self.result.is_some() {
            return;
        }
        self.result = Some(result);
        if let Some(callback) = self.on_match_end.as_mut() {
            callback(&result);
        }
    }

    fn sync_audio(&mut self) {
        let p = &self.state.player;
        let mach = mach_tier(p.vel.x, p.on_ground());
        if mach != self.mach {
            self.mach = mach;
            self.audio.set_mach(mach);
        }

        let progress = &self.state.progress;
        let theme = Theme::select(progress.status, progress.lap2, progress.lap3);
        if theme != self.theme {
            self.theme = theme;
            self.audio.set_theme(theme);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use glam::Vec2;

    use super::*;
    use crate::audio::SoundEffect;
    use crate::sim::entity::{Entity, EntityKind};
    use crate::sim::progress::Status;

    fn flat_sim() -> Simulation {
        let entities = vec![
            Entity::new(1, EntityKind::ExitDoor, 0.0, 356.0, 48.0, 144.0),
            Entity::new(2, EntityKind::Block, -2000.0, 440.0, 20_000.0, 48.0),
        ];
        Simulation::new(Level::new(entities).unwrap(), Tuning::default()).unwrap()
    }

    /// Escape running with the player parked in the exit doorway
    fn at_open_door() -> Simulation {
        let mut sim = flat_sim();
        sim.state.progress.begin_escape(120.0);
        sim.state.player.teleport(Vec2::new(4.0, 400.0));
        sim
    }

    #[derive(Default)]
    struct Recorder {
        sounds: Rc<RefCell<Vec<SoundEffect>>>,
        themes: Rc<RefCell<Vec<Theme>>>,
    }

    impl AudioSink for Recorder {
        fn play(&mut self, effect: SoundEffect) {
            self.sounds.borrow_mut().push(effect);
        }
        fn set_mach(&mut self, _tier: u8) {}
        fn set_theme(&mut self, theme: Theme) {
            self.themes.borrow_mut().push(theme);
        }
    }

    #[test]
    fn test_advance_runs_fixed_ticks() {
        let mut sim = flat_sim();
        assert_eq!(sim.advance(SIM_DT * 3.5), 3);
        assert_eq!(sim.state().time_ticks, 3);
        // Leftover half tick carries over
        assert_eq!(sim.advance(SIM_DT * 0.6), 1);
    }

    #[test]
    fn test_advance_clamps_long_frames() {
        let mut sim = flat_sim();
        // 0.1s at most, six ticks
        assert!(sim.advance(5.0) <= 6);

        let mut sim = flat_sim();
        sim.accumulator = 1.0;
        assert_eq!(sim.advance(0.0), MAX_SUBSTEPS);
        assert_eq!(sim.state().time_ticks, u64::from(MAX_SUBSTEPS));
    }

    #[test]
    fn test_match_end_fires_once_and_freezes() {
        let mut sim = at_open_door();
        let calls = Rc::new(Cell::new(0));
        let seen = Rc::clone(&calls);
        sim.on_match_end(move |result| {
            assert!(result.won);
            seen.set(seen.get() + 1);
        });

        sim.key_down(Key::Up);
        assert!(sim.step());
        assert_eq!(sim.state().progress.status, Status::Victory);
        assert!(sim.result().is_some_and(|r| r.won));

        let ticks = sim.state().time_ticks;
        assert!(!sim.step());
        assert_eq!(sim.advance(0.1), 0);
        assert_eq!(sim.state().time_ticks, ticks);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_snapshot_cadence() {
        let mut sim = flat_sim();
        let ticks = Rc::new(RefCell::new(Vec::new()));
        let seen = Rc::clone(&ticks);
        sim.on_snapshot(move |snapshot| seen.borrow_mut().push(snapshot.tick));

        for _ in 0..25 {
            sim.step();
        }
        assert_eq!(*ticks.borrow(), vec![10, 20]);
    }

    #[test]
    fn test_terminal_tick_always_snapshots() {
        let mut sim = at_open_door();
        let ticks = Rc::new(RefCell::new(Vec::new()));
        let seen = Rc::clone(&ticks);
        sim.on_snapshot(move |snapshot| seen.borrow_mut().push(snapshot.progress.status));

        sim.key_down(Key::Up);
        sim.step();
        assert_eq!(*ticks.borrow(), vec![Status::Victory]);
    }

    #[test]
    fn test_audio_sink_gets_cues_and_theme() {
        let mut sim = flat_sim();
        let recorder = Recorder::default();
        let sounds = Rc::clone(&recorder.sounds);
        let themes = Rc::clone(&recorder.themes);
        sim.set_audio(Box::new(recorder));
        assert_eq!(*themes.borrow(), vec![Theme::Level]);

        for _ in 0..5 {
            sim.step();
        }
        sim.key_down(Key::Jump);
        sim.step();
        assert!(sounds.borrow().contains(&SoundEffect::Jump));

        sim.state.progress.begin_escape(120.0);
        sim.step();
        assert_eq!(*themes.borrow(), vec![Theme::Level, Theme::Escape]);
    }
}
