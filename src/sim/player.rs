//! Player state and fixed-step physics
//!
//! Velocity is in pixels per tick. Position is integer; the fractional part of
//! each tick's motion is carried in `remainder` and damped, and the integer
//! part is applied one pixel at a time so every pixel is collision-checked.

use glam::{IVec2, Vec2};

use super::collision::{Sweep, solid_at_offset};
use super::frame::Frame;
use super::input::TickInput;
use crate::tuning::Tuning;

/// The player character
#[derive(Debug, Clone, Default)]
pub struct Player {
    /// False while dead or before a level spawns the player
    pub exists: bool,
    pub pos: IVec2,
    pub vel: Vec2,
    /// Sub-pixel motion not yet applied to `pos`
    pub remainder: Vec2,
    pub on_ground: bool,
    pub on_ground_prev: bool,
    pub facing_left: bool,
    /// Ticks of continuous horizontal motion
    pub movement_timer: u32,
    /// Jump held since take-off while rising (selects the lower gravity)
    pub holding_jump: bool,
    /// Ticks since the player stopped existing
    pub death_timer: u32,
}

/// Control input as seen by the physics step
#[derive(Debug, Clone, Copy, Default)]
pub struct Control {
    /// -1, 0 or 1
    pub horizontal: i32,
    pub jump_pressed: bool,
    pub jump_held: bool,
    /// Movement already started before this tick
    pub movement_started: bool,
}

impl Control {
    pub fn from_input(input: &TickInput, movement_started: bool) -> Self {
        Self {
            horizontal: input.horizontal(),
            jump_pressed: input.jump.pressed(),
            jump_held: input.jump.is_down,
            movement_started,
        }
    }

    /// Control that ignores all movement keys
    pub fn idle(movement_started: bool) -> Self {
        Self {
            movement_started,
            ..Default::default()
        }
    }
}

/// What happened during one physics step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Horizontal input started movement this tick
    pub started_by_walking: bool,
    /// A jump started movement this tick
    pub started_by_jumping: bool,
    pub landed: bool,
    pub jumped: bool,
    /// At least one horizontal pixel was committed
    pub moved_x: bool,
}

impl StepReport {
    pub fn started_moving(&self) -> bool {
        self.started_by_walking || self.started_by_jumping
    }
}

impl Player {
    /// A living player standing at `pos`
    pub fn spawned_at(pos: IVec2) -> Self {
        Self {
            exists: true,
            pos,
            ..Default::default()
        }
    }

    /// Advance one tick. `topmost_touched` comes from this tick's occlusion pass.
    pub fn step(
        &mut self,
        frames: &mut [Frame],
        control: Control,
        tuning: &Tuning,
        topmost_touched: Option<usize>,
    ) -> StepReport {
        let mut report = StepReport::default();
        let mut started = control.movement_started;

        // Horizontal control
        if control.horizontal != 0 {
            if !started {
                report.started_by_walking = true;
            }
            started = true;

            self.facing_left = control.horizontal < 0;
            self.vel.x = (self.vel.x + control.horizontal as f32 * tuning.walk_acc)
                .clamp(-tuning.walk_speed, tuning.walk_speed);
        } else {
            let speed = (self.vel.x.abs() - tuning.walk_dec).max(0.0);
            self.vel.x = speed.copysign(self.vel.x);
        }

        // Ground check
        self.on_ground_prev = self.on_ground;
        self.on_ground = solid_at_offset(frames, self.pos, IVec2::Y, Sweep::Check);
        report.landed = self.on_ground && !self.on_ground_prev && started;

        // Jumping and gravity
        if self.on_ground {
            if control.jump_pressed {
                report.started_by_jumping = !started;
                report.jumped = true;

                self.holding_jump = true;
                self.vel.y = tuning.jump_velocity;
                self.remainder.y = 0.0;
            } else {
                self.holding_jump = false;
                if self.vel.y > 0.0 {
                    self.vel.y = 0.0;
                    self.remainder.y = self.remainder.y.min(0.0);
                }
            }
        } else {
            if !control.jump_held || self.vel.y > 0.0 {
                self.holding_jump = false;
            }

            if started {
                let gravity = if self.holding_jump {
                    tuning.gravity
                } else {
                    tuning.gravity_lowjump
                };
                self.vel.y = (self.vel.y + gravity).min(tuning.max_fall_speed);
            }
        }

        report.moved_x = self.integrate(frames, tuning, Sweep::Move { topmost_touched });

        if report.moved_x {
            self.movement_timer += 1;
        } else {
            self.movement_timer = 0;
        }

        report
    }

    /// Apply velocity plus carried remainder, one validated pixel at a time.
    /// Returns whether any horizontal pixel was committed.
    pub fn integrate(&mut self, frames: &mut [Frame], tuning: &Tuning, sweep: Sweep) -> bool {
        let total = self.vel + self.remainder;
        let mut steps = total.round().as_ivec2();
        self.remainder = (total - steps.as_vec2()) * tuning.remainder_damping;

        let mut moved_x = false;

        while steps != IVec2::ZERO {
            for axis in 0..2 {
                if steps[axis] == 0 {
                    continue;
                }

                let mut offset = IVec2::ZERO;
                offset[axis] = steps[axis].signum();

                if solid_at_offset(frames, self.pos, offset, sweep) {
                    let dir = offset[axis] as f32;
                    if dir * self.vel[axis] > 0.0 {
                        self.vel[axis] = 0.0;
                        if dir * self.remainder[axis] > 0.0 {
                            self.remainder[axis] = 0.0;
                        }
                    }
                    steps[axis] = 0;
                } else {
                    steps -= offset;
                    self.pos += offset;
                    if axis == 0 {
                        moved_x = true;
                    }
                }
            }
        }

        moved_x
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use proptest::prelude::*;

    use crate::sim::collision::{hitbox_perimeter, query_solid, PointQuery};
    use crate::sim::template::FrameTemplate;

    /// 10x6 tile frame centered at the origin with a floor and two pillars
    fn arena() -> Vec<Frame> {
        let template = FrameTemplate::new(
            "arena",
            IVec2::ZERO,
            &[
                "----------",
                "----------",
                "-#------#-",
                "-#--##--#-",
                "-#------#-",
                "##########",
            ],
        )
        .unwrap();
        vec![Frame::new(Arc::new(template), IVec2::ZERO, vec![]).unwrap()]
    }

    // The floor row starts at y = -48 + 5 * 16 = 32. Feet (hitbox bottom) at
    // y = pos.y + 7, so a player at y = 24 stands on it.
    const STANDING_Y: i32 = 24;

    fn moving() -> Control {
        Control::idle(true)
    }

    fn overlaps_solid(frames: &[Frame], pos: IVec2) -> bool {
        hitbox_perimeter().any(|p| matches!(query_solid(frames, pos + p), PointQuery::Solid { .. }))
    }

    #[test]
    fn test_landing_on_solid_tile() {
        let mut frames = arena();
        let tuning = Tuning::default();
        let mut player = Player::spawned_at(IVec2::new(-40, STANDING_Y));
        player.vel.y = 2.0;

        let report = player.step(&mut frames, moving(), &tuning, Some(0));

        assert!(player.on_ground);
        assert!(report.landed);
        assert_eq!(player.vel.y, 0.0);
        assert_eq!(player.pos.y, STANDING_Y);

        // Standing still does not land again
        let report = player.step(&mut frames, moving(), &tuning, Some(0));
        assert!(!report.landed);
        assert!(player.on_ground);
    }

    #[test]
    fn test_no_gravity_before_movement_starts() {
        let mut frames = arena();
        let tuning = Tuning::default();
        let mut player = Player::spawned_at(IVec2::new(-40, -30));

        for _ in 0..10 {
            player.step(&mut frames, Control::idle(false), &tuning, Some(0));
        }
        assert_eq!(player.pos.y, -30);
        assert_eq!(player.vel.y, 0.0);
    }

    #[test]
    fn test_walking_accelerates_to_walk_speed() {
        let mut frames = arena();
        let tuning = Tuning::default();
        let mut player = Player::spawned_at(IVec2::new(-40, STANDING_Y));
        let right = Control {
            horizontal: 1,
            ..Control::idle(false)
        };

        let report = player.step(&mut frames, right, &tuning, Some(0));
        assert!(report.started_by_walking);
        assert!((player.vel.x - 0.4).abs() < 1e-6);

        for _ in 0..5 {
            player.step(&mut frames, Control { movement_started: true, ..right }, &tuning, Some(0));
        }
        assert_eq!(player.vel.x, tuning.walk_speed);
        assert!(player.movement_timer > 0);
        assert!(!player.facing_left);
    }

    #[test]
    fn test_deceleration_stops_at_zero() {
        let mut frames = arena();
        let tuning = Tuning::default();
        let mut player = Player::spawned_at(IVec2::new(-40, STANDING_Y));
        player.vel.x = -0.5;

        player.step(&mut frames, moving(), &tuning, Some(0));
        assert!((player.vel.x + 0.1).abs() < 1e-6);
        player.step(&mut frames, moving(), &tuning, Some(0));
        assert_eq!(player.vel.x, 0.0);
    }

    #[test]
    fn test_wall_stops_horizontal_motion() {
        let mut frames = arena();
        let tuning = Tuning::default();
        // Right pillar spans x in [48, 64); hitbox right edge is pos.x + 3
        let mut player = Player::spawned_at(IVec2::new(44, STANDING_Y));
        player.vel.x = 1.5;
        player.remainder.x = -0.3;
        let right = Control {
            horizontal: 1,
            ..moving()
        };

        let report = player.step(&mut frames, right, &tuning, Some(0));
        assert_eq!(player.pos.x, 44);
        assert_eq!(player.vel.x, 0.0);
        assert_eq!(player.remainder.x, 0.0);
        assert!(!report.moved_x);
        assert_eq!(player.movement_timer, 0);
    }

    #[test]
    fn test_jump_then_variable_height() {
        let tuning = Tuning::default();
        let jump = Control {
            jump_pressed: true,
            jump_held: true,
            movement_started: true,
            ..Default::default()
        };
        let hold = Control {
            jump_held: true,
            movement_started: true,
            ..Default::default()
        };

        let apex = |held: bool| {
            let mut frames = arena();
            let mut player = Player::spawned_at(IVec2::new(-40, STANDING_Y));
            player.step(&mut frames, moving(), &tuning, Some(0));
            let report = player.step(&mut frames, jump, &tuning, Some(0));
            assert!(report.jumped);
            let mut top = player.pos.y;
            for _ in 0..60 {
                player.step(&mut frames, if held { hold } else { moving() }, &tuning, Some(0));
                top = top.min(player.pos.y);
            }
            top
        };

        // Holding jump goes higher (smaller y)
        assert!(apex(true) < apex(false));
    }

    #[test]
    fn test_first_jump_starts_movement() {
        let mut frames = arena();
        let tuning = Tuning::default();
        let mut player = Player::spawned_at(IVec2::new(-40, STANDING_Y));
        let jump = Control {
            jump_pressed: true,
            jump_held: true,
            ..Control::idle(false)
        };

        let report = player.step(&mut frames, jump, &tuning, Some(0));
        assert!(report.jumped);
        assert!(report.started_by_jumping);
        assert!(report.started_moving());

        // Jumping again once moving reports no new start
        let mut player = Player::spawned_at(IVec2::new(-40, STANDING_Y));
        let moving_jump = Control {
            movement_started: true,
            ..jump
        };
        let report = player.step(&mut frames, moving_jump, &tuning, Some(0));
        assert!(report.jumped);
        assert!(!report.started_by_jumping);
    }

    #[test]
    fn test_lower_frame_is_fallen_through() {
        let mut frames = arena();
        let template = FrameTemplate::new("box", IVec2::ZERO, &["---", "---"]).unwrap();
        frames.push(Frame::new(Arc::new(template), IVec2::new(-100, 0), vec![]).unwrap());
        let tuning = Tuning::default();

        // Feet at y = -3, just above the middle block whose top is y = 0.
        // The player's frame is index 1, so the arena (index 0) is below it.
        let mut player = Player::spawned_at(IVec2::new(0, -10));
        player.vel.y = 4.0;
        player.step(&mut frames, moving(), &tuning, Some(1));

        assert!(frames[0].under_player_frame);
        assert_eq!(player.pos.y, -6);
        assert_eq!(player.vel.y, 4.0);
    }

    proptest! {
        #[test]
        fn prop_remainder_stays_below_one_pixel(
            velocities in proptest::collection::vec((-4.0f32..4.0, -4.0f32..4.0), 1..50)
        ) {
            let tuning = Tuning::default();
            let mut player = Player::spawned_at(IVec2::ZERO);
            for (vx, vy) in velocities {
                player.vel = Vec2::new(vx, vy);
                let before = player.vel + player.remainder;
                let start = player.pos;
                player.integrate(&mut [], &tuning, Sweep::Check);
                let moved = player.pos - start;
                // Unobstructed: exactly the rounded step is applied
                prop_assert_eq!(moved, before.round().as_ivec2());
                prop_assert!(player.remainder.x.abs() < 1.0);
                prop_assert!(player.remainder.y.abs() < 1.0);
            }
        }

        #[test]
        fn prop_sweep_never_ends_inside_solid(
            x in -70i32..70,
            y in -45i32..30,
            vx in -1.5f32..1.5,
            vy in -4.0f32..4.0,
            rx in -0.49f32..0.49,
            ry in -0.49f32..0.49,
            blocks in proptest::collection::vec((-80i32..80, -50i32..50), 0..4),
            threshold in proptest::option::of(0usize..6),
        ) {
            // Solid blocks stacked over the arena in random places
            let mut frames = arena();
            let block = Arc::new(FrameTemplate::new("block", IVec2::ZERO, &["##", "##"]).unwrap());
            for (bx, by) in blocks {
                frames.push(Frame::new(block.clone(), IVec2::new(bx, by), vec![]).unwrap());
            }
            let tuning = Tuning::default();
            let start = IVec2::new(x, y);
            prop_assume!(!overlaps_solid(&frames, start));

            let mut player = Player::spawned_at(start);
            player.vel = Vec2::new(vx, vy);
            player.remainder = Vec2::new(rx, ry);
            player.integrate(&mut frames, &tuning, Sweep::Move { topmost_touched: threshold });

            prop_assert!((player.pos - start).abs().max_element() <= tuning.max_step());
            prop_assert!(!overlaps_solid(&frames, player.pos));
        }
    }
}
