//! Read-only access for the renderer
//!
//! The renderer implements [`RenderVisitor`] and calls [`GameState::visit`].
//! Nothing here mutates the simulation.

use glam::IVec2;

use super::frame::Frame;
use super::player::Player;
use super::state::{GameState, Particle, ResetButton, Tutorial};

/// Player sprite selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimState {
    Idle,
    /// Walk cycle frame, 0 to 3
    Walk(u32),
    /// Airborne frame, 0 (rising fast) to 4 (falling)
    Air(u32),
}

/// Vertical velocity thresholds between the airborne frames
const AIR_THRESHOLDS: [f32; 4] = [-1.0, -0.5, 0.0, 0.5];

impl AnimState {
    pub fn of(player: &Player) -> Self {
        if !player.on_ground {
            let frame = AIR_THRESHOLDS.iter().filter(|&&t| player.vel.y >= t).count();
            AnimState::Air(frame as u32)
        } else if player.movement_timer > 0 {
            AnimState::Walk(player.movement_timer / 3 % 4)
        } else {
            AnimState::Idle
        }
    }
}

/// Everything the renderer needs to draw the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerSprite {
    pub pos: IVec2,
    pub anim: AnimState,
    pub facing_left: bool,
}

/// Full screen overlays drawn after the world
#[derive(Debug, Clone, Copy)]
pub struct Overlay<'a> {
    /// 0 is clear, 1 is opaque
    pub fade: f32,
    pub reset_button: &'a ResetButton,
    pub tutorial: &'a Tutorial,
}

/// Receives draw calls in back to front order
pub trait RenderVisitor {
    /// Background index and scroll timer
    fn background(&mut self, index: usize, scroll_ticks: u32);

    /// A frame's tiles and entities, plus the movement tick count for animations
    fn frame(&mut self, frame: &Frame, movement_ticks: u32);

    fn player(&mut self, sprite: PlayerSprite);

    fn particle(&mut self, particle: &Particle);

    fn overlay(&mut self, overlay: Overlay<'_>);
}

impl GameState {
    /// Index of the first frame drawn above the player
    pub fn player_layer(&self) -> usize {
        self.frames
            .iter()
            .position(|f| f.under_player_frame)
            .unwrap_or(self.frames.len())
    }

    /// Walk the state back to front
    pub fn visit(&self, visitor: &mut impl RenderVisitor) {
        visitor.background(self.background, self.background_ticks);

        let (below, above) = self.frames.split_at(self.player_layer());
        for frame in below {
            visitor.frame(frame, self.movement_ticks);
        }

        if self.player.exists {
            visitor.player(PlayerSprite {
                pos: self.player.pos,
                anim: AnimState::of(&self.player),
                facing_left: self.player.facing_left,
            });
        }

        for frame in above {
            visitor.frame(frame, self.movement_ticks);
        }

        for particle in &self.particles {
            visitor.particle(particle);
        }

        visitor.overlay(Overlay {
            fade: self.fade,
            reset_button: &self.reset_button,
            tutorial: &self.tutorial,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    use crate::levels;
    use crate::tuning::Tuning;

    #[derive(Debug, PartialEq)]
    enum Draw {
        Background(usize),
        Frame(IVec2),
        Player(IVec2),
        Particle,
        Overlay,
    }

    #[derive(Default)]
    struct Recorder(Vec<Draw>);

    impl RenderVisitor for Recorder {
        fn background(&mut self, index: usize, _scroll_ticks: u32) {
            self.0.push(Draw::Background(index));
        }

        fn frame(&mut self, frame: &Frame, _movement_ticks: u32) {
            self.0.push(Draw::Frame(frame.pos));
        }

        fn player(&mut self, sprite: PlayerSprite) {
            self.0.push(Draw::Player(sprite.pos));
        }

        fn particle(&mut self, _particle: &Particle) {
            self.0.push(Draw::Particle);
        }

        fn overlay(&mut self, _overlay: Overlay<'_>) {
            self.0.push(Draw::Overlay);
        }
    }

    fn state() -> GameState {
        GameState::new(levels::builtin().unwrap(), Tuning::default(), 3).unwrap()
    }

    #[test]
    fn test_player_drawn_above_all_frames_by_default() {
        let state = state();
        let mut recorder = Recorder::default();
        state.visit(&mut recorder);
        assert_eq!(
            recorder.0,
            vec![
                Draw::Background(0),
                Draw::Frame(IVec2::new(-50, 20)),
                Draw::Frame(IVec2::new(70, -20)),
                Draw::Player(IVec2::new(-50, 28)),
                Draw::Overlay,
            ]
        );
    }

    #[test]
    fn test_frames_from_first_under_frame_cover_the_player() {
        let mut state = state();
        state.frames[1].under_player_frame = true;
        let mut recorder = Recorder::default();
        state.visit(&mut recorder);
        assert_eq!(recorder.0[2], Draw::Player(IVec2::new(-50, 28)));
        assert_eq!(recorder.0[3], Draw::Frame(IVec2::new(70, -20)));
    }

    #[test]
    fn test_dead_player_is_not_drawn() {
        let mut state = state();
        state.player.exists = false;
        let mut recorder = Recorder::default();
        state.visit(&mut recorder);
        assert!(!recorder.0.iter().any(|d| matches!(d, Draw::Player(_))));
    }

    #[test]
    fn test_anim_selection() {
        let mut player = Player::spawned_at(IVec2::ZERO);
        player.on_ground = true;
        assert_eq!(AnimState::of(&player), AnimState::Idle);

        player.movement_timer = 7;
        assert_eq!(AnimState::of(&player), AnimState::Walk(2));
        player.movement_timer = 12;
        assert_eq!(AnimState::of(&player), AnimState::Walk(0));

        player.on_ground = false;
        player.vel = Vec2::new(0.0, -3.0);
        assert_eq!(AnimState::of(&player), AnimState::Air(0));
        player.vel.y = -0.7;
        assert_eq!(AnimState::of(&player), AnimState::Air(1));
        player.vel.y = 0.2;
        assert_eq!(AnimState::of(&player), AnimState::Air(3));
        player.vel.y = 4.0;
        assert_eq!(AnimState::of(&player), AnimState::Air(4));
    }
}
