//! Game state and core simulation types
//!
//! One [`GameState`] owns everything a level session mutates: the frame list,
//! the player, level flow flags, cosmetic particles and the RNG.

use glam::{IVec2, Vec2, Vec4};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::frame::Frame;
use super::player::Player;
use crate::error::LoadError;
use crate::levels::Level;
use crate::tuning::Tuning;

/// Level flow state, derived from the session flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Before any movement input; frames can be arranged freely
    Editing,
    /// Player physics active
    Moving,
    /// Player gone, waiting to restart the level
    Dying,
    /// Exit reached, fading out to the next level
    Winning,
    /// Last level completed
    Finished,
}

/// Sounds the audio collaborator may play
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundId {
    StartMoving,
    Landing,
    Jump,
    Death,
    Respawn,
    Win,
    Key,
}

impl SoundId {
    pub fn name(&self) -> &'static str {
        match self {
            SoundId::StartMoving => "start_moving",
            SoundId::Landing => "landing",
            SoundId::Jump => "jump",
            SoundId::Death => "death",
            SoundId::Respawn => "respawn",
            SoundId::Win => "win",
            SoundId::Key => "key",
        }
    }
}

/// Why the player died
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathCause {
    /// Left the play field to the sides or below
    OutOfBounds,
    /// Reset key or reset button
    Reset,
    /// Clicked a frame while moving
    FrameClick,
}

/// Side effects requested from collaborators outside the simulation
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// Play a sound at a world position with a random detune
    Sound { sound: SoundId, pos: IVec2, pitch: f32 },
    Landed { pos: IVec2 },
    Jumped { pos: IVec2 },
    Died { cause: DeathCause, pos: IVec2 },
    KeyCollected { pos: IVec2, remaining: usize },
    Won { pos: IVec2 },
    LevelLoaded { index: usize },
    LevelRestarted { index: usize },
    AllLevelsComplete,
}

/// A particle for visual effects
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub acc: Vec2,
    /// Fraction of velocity lost per tick
    pub damp: f32,
    pub color: Vec4,
    /// Size at full life; shrinks linearly
    pub size: f32,
    pub total_life: u32,
    pub remaining_life: u32,
}

impl Particle {
    pub fn update(&mut self) {
        self.pos += self.vel;
        self.vel += self.acc;
        self.vel *= 1.0 - self.damp;
        self.remaining_life = self.remaining_life.saturating_sub(1);
    }

    pub fn current_size(&self) -> f32 {
        if self.total_life == 0 {
            return 0.0;
        }
        self.size * self.remaining_life as f32 / self.total_life as f32
    }
}

/// Maximum particles
pub const MAX_PARTICLES: usize = 512;

/// Tutorial hint state. Survives restarts and level changes.
#[derive(Debug, Clone, PartialEq)]
pub struct Tutorial {
    pub explaining_drag: bool,
    pub explaining_move: bool,
    pub explaining_reset: bool,
    pub drag_timer: f32,
    pub move_timer: f32,
    pub reset_timer: f32,
    pub dragged_at_least_once: bool,
}

impl Default for Tutorial {
    fn default() -> Self {
        Self {
            explaining_drag: true,
            explaining_move: true,
            explaining_reset: true,
            drag_timer: 0.0,
            move_timer: 0.0,
            reset_timer: 0.0,
            dragged_at_least_once: false,
        }
    }
}

/// The reset button in the bottom right corner of the play field
#[derive(Debug, Clone, PartialEq)]
pub struct ResetButton {
    pub pos: IVec2,
    pub size: IVec2,
    pub hovered: bool,
    /// Visibility, 0 to 1
    pub vis_timer: f32,
}

impl ResetButton {
    pub fn new(edge: i32) -> Self {
        let size = IVec2::splat(edge);
        Self {
            pos: crate::half_screen() - size,
            size,
            hovered: false,
            vis_timer: 0.0,
        }
    }

    pub fn contains(&self, point: IVec2) -> bool {
        crate::rect_contains(self.pos, self.size, point)
    }
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed for reproducibility
    pub seed: u64,
    rng: Pcg32,
    pub tuning: Tuning,
    levels: Vec<Level>,

    pub level_index: usize,
    pub background: usize,
    /// Z-ordered frames, last is topmost
    pub frames: Vec<Frame>,
    pub player: Player,

    /// 0 is clear, 1 is opaque
    pub fade: f32,
    /// Set by the first horizontal or jump input after a (re)load
    pub movement_started: bool,
    pub winning: bool,
    pub finished: bool,
    /// Frames still holding at least one uncollected key
    pub remaining_keys: usize,

    /// Ticks since movement started, reset with the level
    pub movement_ticks: u32,
    /// Background scroll, advances while moving
    pub background_ticks: u32,
    /// Simulation tick counter
    pub time_ticks: u64,

    pub reset_button: ResetButton,
    pub tutorial: Tutorial,

    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
    /// Events from the most recent tick
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Start a session at the first level
    pub fn new(levels: Vec<Level>, tuning: Tuning, seed: u64) -> Result<Self, LoadError> {
        if levels.is_empty() {
            return Err(LoadError::NoLevels);
        }

        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            reset_button: ResetButton::new(tuning.reset_button_size),
            tuning,
            levels,
            level_index: 0,
            background: 0,
            frames: Vec::new(),
            player: Player::default(),
            fade: 1.0,
            movement_started: false,
            winning: false,
            finished: false,
            remaining_keys: 0,
            movement_ticks: 0,
            background_ticks: 0,
            time_ticks: 0,
            tutorial: Tutorial::default(),
            particles: Vec::new(),
            events: Vec::new(),
        };
        state.load_level(0)?;
        Ok(state)
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn phase(&self) -> GamePhase {
        if self.finished {
            GamePhase::Finished
        } else if self.winning {
            GamePhase::Winning
        } else if !self.player.exists {
            GamePhase::Dying
        } else if self.movement_started {
            GamePhase::Moving
        } else {
            GamePhase::Editing
        }
    }

    /// Replace the session with a fresh copy of level `index`, fading in
    pub fn load_level(&mut self, index: usize) -> Result<(), LoadError> {
        let count = self.levels.len();
        let level = self
            .levels
            .get(index)
            .ok_or(LoadError::LevelOutOfRange { index, count })?;

        self.frames = level.frames.clone();
        self.background = level.background;
        self.level_index = index;
        self.reset_session();
        self.fade = 1.0;
        self.winning = false;

        log::info!("Level {} loaded ({} frames)", index + 1, self.frames.len());
        self.events.push(GameEvent::LevelLoaded { index });
        Ok(())
    }

    /// Reload the current level's layout without fading
    pub fn restart_level(&mut self) {
        self.frames = self.levels[self.level_index].frames.clone();
        self.reset_session();

        log::info!("Level {} restarted", self.level_index + 1);
        self.events.push(GameEvent::LevelRestarted {
            index: self.level_index,
        });
    }

    fn reset_session(&mut self) {
        self.movement_started = false;
        self.movement_ticks = 0;
        self.spawn_player();
        self.recount_keys();
    }

    /// Place the player at its spawn frame's marker
    pub fn spawn_player(&mut self) {
        self.player = self
            .frames
            .iter()
            .filter_map(Frame::player_spawn_world)
            .last()
            .map(Player::spawned_at)
            .unwrap_or_default();
    }

    /// Re-derive the dragged frame's entities at its new position
    pub fn follow_dragged_frame(&mut self) {
        let Some(frame) = self.frames.last_mut() else {
            return;
        };
        frame.reset_entities();
        if let Some(spawn) = frame.player_spawn_world() {
            self.player.pos = spawn;
        }
        self.recount_keys();
    }

    pub fn recount_keys(&mut self) {
        self.remaining_keys = self.frames.iter().filter(|f| !f.keys.is_empty()).count();
    }

    /// Remove the player. No effect while winning or already gone.
    pub fn kill_player(&mut self, cause: DeathCause) {
        if !self.player.exists || self.winning {
            return;
        }

        let pos = self.player.pos;
        self.player.exists = false;
        self.tutorial.explaining_reset = false;

        log::info!("Player died at {pos}: {cause:?}");
        self.events.push(GameEvent::Died { cause, pos });
        self.play_sound(SoundId::Death, pos, 0.1);
        self.spawn_death_burst(pos);
    }

    /// Drain events produced by the last tick
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    // === Randomness (cosmetic only) ===

    fn rand01(&mut self) -> f32 {
        self.rng.random::<f32>()
    }

    fn rand11(&mut self) -> f32 {
        self.rng.random_range(-1.0..1.0)
    }

    fn rand_sign(&mut self) -> f32 {
        if self.rng.random_bool(0.5) { 1.0 } else { -1.0 }
    }

    fn rand_dir(&mut self) -> Vec2 {
        Vec2::from_angle(self.rng.random_range(-std::f32::consts::PI..std::f32::consts::PI))
    }

    pub(crate) fn play_sound(&mut self, sound: SoundId, pos: IVec2, detune: f32) {
        let pitch = self.rand11() * detune;
        self.events.push(GameEvent::Sound { sound, pos, pitch });
    }

    // === Particles ===

    fn push_particle(&mut self, particle: Particle) {
        if self.particles.len() < MAX_PARTICLES {
            self.particles.push(particle);
        }
    }

    fn grey(&mut self, base: f32, spread: f32, alpha: f32) -> Vec4 {
        let v = base + self.rand01() * spread;
        Vec4::new(v, v, v, alpha)
    }

    /// Dust kicked up when landing
    pub(crate) fn spawn_landing_dust(&mut self, pos: IVec2) {
        for _ in 0..8 {
            let offset = Vec2::new(self.rand_sign() * (2.0 + 1.2 * self.rand01()), self.rand11());
            let vel = Vec2::new(self.rand11() * 0.7, self.rand01() * -0.14);
            let color = self.grey(0.7, 0.2, 0.7);
            self.push_particle(Particle {
                pos: (pos + IVec2::new(0, 8)).as_vec2() + offset,
                vel,
                acc: Vec2::new(0.0, -0.01),
                damp: 0.01,
                color,
                size: 3.0,
                total_life: 30,
                remaining_life: 30,
            });
        }
    }

    /// Dust kicked up by a jump
    pub(crate) fn spawn_jump_dust(&mut self, pos: IVec2) {
        for _ in 0..4 {
            let offset = Vec2::new(self.rand11() * 4.0, self.rand01());
            let vel = Vec2::new(self.rand11() * 0.2, self.rand01() * -0.48);
            let color = self.grey(0.7, 0.2, 0.7);
            self.push_particle(Particle {
                pos: (pos + IVec2::new(0, 7)).as_vec2() + offset,
                vel,
                acc: Vec2::new(0.0, -0.01),
                damp: 0.01,
                color,
                size: 3.0,
                total_life: 30,
                remaining_life: 30,
            });
        }
    }

    fn spawn_death_burst(&mut self, pos: IVec2) {
        for _ in 0..64 {
            let offset = self.rand_dir() * (self.rand01() * 6.0);
            let vel = self.rand_dir() * (self.rand01() * 2.0);
            let alpha = 0.5 + self.rand01() * 0.5;
            let color = self.grey(0.6, 0.4, alpha);
            self.push_particle(Particle {
                pos: pos.as_vec2() + offset,
                vel,
                acc: Vec2::ZERO,
                damp: 0.01,
                color,
                size: 4.0,
                total_life: 90,
                remaining_life: 90,
            });
        }
    }

    pub(crate) fn spawn_respawn_ring(&mut self, pos: IVec2) {
        for _ in 0..16 {
            let dir = self.rand_dir();
            let dist = 3.0 + self.rand01();
            let color = self.grey(0.7, 0.2, 1.0);
            self.push_particle(Particle {
                pos: pos.as_vec2() + dir * dist,
                vel: dir,
                acc: Vec2::ZERO,
                damp: 0.05,
                color,
                size: 3.0,
                total_life: 20,
                remaining_life: 20,
            });
        }
    }

    pub(crate) fn spawn_key_sparkle(&mut self, pos: IVec2) {
        for _ in 0..12 {
            let dir = self.rand_dir();
            let speed = 0.5 + self.rand01();
            self.push_particle(Particle {
                pos: pos.as_vec2(),
                vel: dir * speed,
                acc: Vec2::ZERO,
                damp: 0.04,
                color: Vec4::new(1.0, 0.85, 0.3, 1.0),
                size: 3.0,
                total_life: 40,
                remaining_life: 40,
            });
        }
    }

    /// Age particles and drop dead ones
    pub(crate) fn update_particles(&mut self) {
        self.particles.retain(|p| p.remaining_life > 0);
        for particle in &mut self.particles {
            particle.update();
        }
    }
}
