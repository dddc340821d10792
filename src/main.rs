//! Framestack headless driver
//!
//! Runs the simulation with scripted input and logs every event. Useful for
//! checking level content and tuning changes without a renderer.
//!
//! Usage: framestack [--levels PATH] [--tuning PATH] [--seed N] [--ticks N]

use std::path::PathBuf;
use std::process::ExitCode;

use glam::IVec2;

use framestack::levels::{self, LevelPack};
use framestack::sim::{GameEvent, GamePhase, GameState, TickInput, tick};
use framestack::{LoadError, Tuning};

struct Args {
    levels: Option<PathBuf>,
    tuning: Option<PathBuf>,
    seed: u64,
    ticks: u64,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            levels: None,
            tuning: None,
            seed: 0,
            ticks: 60 * 60,
        }
    }
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args::default();
    let mut iter = std::env::args().skip(1);

    while let Some(flag) = iter.next() {
        let mut value = || iter.next().ok_or_else(|| format!("missing value for {flag}"));
        match flag.as_str() {
            "--levels" => args.levels = Some(value()?.into()),
            "--tuning" => args.tuning = Some(value()?.into()),
            "--seed" => args.seed = value()?.parse().map_err(|e| format!("bad --seed: {e}"))?,
            "--ticks" => args.ticks = value()?.parse().map_err(|e| format!("bad --ticks: {e}"))?,
            other => return Err(format!("unknown argument: {other}")),
        }
    }

    Ok(args)
}

fn load(args: &Args) -> Result<GameState, LoadError> {
    let tuning = match &args.tuning {
        Some(path) => Tuning::load(path)?,
        None => Tuning::default(),
    };
    let levels = match &args.levels {
        Some(path) => LevelPack::load(path)?.build()?,
        None => levels::builtin()?,
    };
    GameState::new(levels, tuning, args.seed)
}

/// Scripted input: nudge the topmost frame once per level, then walk right and hop
struct Autoplay {
    input: TickInput,
    level_ticks: u64,
    grab: IVec2,
}

impl Autoplay {
    fn new() -> Self {
        Self {
            input: TickInput::default(),
            level_ticks: 0,
            grab: IVec2::ZERO,
        }
    }

    fn next(&mut self, state: &GameState) -> &TickInput {
        if state.phase() == GamePhase::Editing && self.level_ticks == 0 {
            self.grab = state.frames.last().map(|f| f.pos).unwrap_or_default();
        }
        self.level_ticks += 1;

        let t = self.level_ticks;
        let dragging = (5..20).contains(&t);
        let mouse_pos = if dragging {
            self.grab + IVec2::new(0, (t as i32 - 5) / 5)
        } else {
            IVec2::new(-200, -120)
        };
        let walking = t > 30;
        let jumping = walking && t % 45 < 20;

        self.input
            .advance(false, walking, jumping, false, dragging, mouse_pos);
        &self.input
    }

    fn reset(&mut self) {
        self.level_ticks = 0;
    }
}

fn main() -> ExitCode {
    #[cfg(not(target_arch = "wasm32"))]
    env_logger::init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let mut state = match load(&args) {
        Ok(state) => state,
        Err(err) => {
            log::error!("Failed to load: {err}");
            return ExitCode::FAILURE;
        }
    };
    log::info!(
        "Framestack starting: {} levels, seed {}",
        state.level_count(),
        args.seed
    );

    let mut autoplay = Autoplay::new();

    for _ in 0..args.ticks {
        let input = autoplay.next(&state).clone();
        tick(&mut state, &input);

        for event in state.drain_events() {
            match event {
                GameEvent::Sound { .. } => log::trace!("{event:?}"),
                GameEvent::LevelLoaded { .. } | GameEvent::LevelRestarted { .. } => {
                    autoplay.reset();
                    log::info!("{event:?}");
                }
                GameEvent::AllLevelsComplete => {
                    log::info!("All levels complete after {} ticks", state.time_ticks);
                    return ExitCode::SUCCESS;
                }
                _ => log::info!("{event:?}"),
            }
        }
    }

    log::info!(
        "Stopped after {} ticks on level {} ({:?})",
        state.time_ticks,
        state.level_index + 1,
        state.phase()
    );
    ExitCode::SUCCESS
}
