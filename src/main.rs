//! Pizza Sprint headless runner
//!
//! Plays the default level with a seeded autopilot and prints the outcome as
//! JSON. Usage: `pizza-sprint [seed] [tuning.json]`. Set `RUST_LOG=debug` to
//! follow the match.

#[cfg(not(target_arch = "wasm32"))]
use pizza_sprint::{
    Tuning,
    audio::LogSink,
    consts::TICK_RATE,
    level,
    sim::{Key, Simulation},
};
#[cfg(not(target_arch = "wasm32"))]
use rand::{Rng, SeedableRng};
#[cfg(not(target_arch = "wasm32"))]
use rand_pcg::Pcg32;

/// Give up after ten minutes of game time
#[cfg(not(target_arch = "wasm32"))]
const MAX_TICKS: u64 = 10 * 60 * TICK_RATE as u64;

/// Seeded input source: runs right at full sprint, mashing the odd button
#[cfg(not(target_arch = "wasm32"))]
struct Autopilot {
    rng: Pcg32,
    tapped: Vec<Key>,
    up_ticks: u32,
    down_ticks: u32,
}

#[cfg(not(target_arch = "wasm32"))]
impl Autopilot {
    fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            tapped: Vec::new(),
            up_ticks: 0,
            down_ticks: 0,
        }
    }

    fn drive(&mut self, sim: &mut Simulation) {
        for key in self.tapped.drain(..) {
            sim.key_up(key);
        }
        sim.key_down(Key::Right);
        sim.key_down(Key::Sprint);

        for (key, chance) in [(Key::Jump, 0.04), (Key::Attack, 0.02), (Key::Taunt, 0.005)] {
            if self.rng.random_bool(chance) {
                sim.key_down(key);
                self.tapped.push(key);
            }
        }

        self.up_ticks = hold(sim, Key::Up, self.up_ticks, || {
            self.rng.random_bool(0.01).then(|| self.rng.random_range(10..60))
        });
        self.down_ticks = hold(sim, Key::Down, self.down_ticks, || {
            self.rng.random_bool(0.01).then(|| self.rng.random_range(5..30))
        });
    }
}

/// Count down a held key, releasing it at zero; `start` may begin a new hold
#[cfg(not(target_arch = "wasm32"))]
fn hold(
    sim: &mut Simulation,
    key: Key,
    remaining: u32,
    mut start: impl FnMut() -> Option<u32>,
) -> u32 {
    match remaining {
        0 => match start() {
            Some(ticks) => {
                sim.key_down(key);
                ticks
            }
            None => 0,
        },
        1 => {
            sim.key_up(key);
            0
        }
        n => n - 1,
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let seed = match args.next() {
        Some(arg) => arg.parse::<u64>()?,
        None => 1,
    };
    let tuning = match args.next() {
        Some(path) => Tuning::from_json(&std::fs::read_to_string(&path)?)?,
        None => Tuning::default(),
    };

    let mut sim = Simulation::new(level::factory()?, tuning)?;
    sim.set_audio(Box::new(LogSink));
    sim.on_match_end(|result| {
        log::info!("match over: rank {} at {} points", result.rank, result.final_score);
    });
    log::info!("Pizza Sprint starting with seed: {}", seed);

    let mut pilot = Autopilot::new(seed);
    while !sim.is_over() && sim.state().time_ticks < MAX_TICKS {
        pilot.drive(&mut sim);
        sim.step();
    }

    match sim.result() {
        Some(result) => println!("{}", serde_json::to_string_pretty(&result)?),
        None => {
            log::warn!("no result after {} ticks", MAX_TICKS);
            println!("{}", serde_json::to_string_pretty(&sim.snapshot())?);
        }
    }
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Headless runner is native only
}
