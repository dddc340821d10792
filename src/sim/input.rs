//! Per-tick input snapshot
//!
//! Raw device polling happens outside the simulation. The caller keeps one
//! [`TickInput`] alive across ticks and calls [`TickInput::advance`] before
//! writing the new held states, which gives every button "just pressed"
//! semantics without any global state.

use glam::IVec2;

/// A debounced button: current and previous tick held state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Button {
    pub is_down: bool,
    pub was_down: bool,
}

impl Button {
    /// Button held this tick but not the previous one
    pub fn pressed(&self) -> bool {
        self.is_down && !self.was_down
    }

    /// Button released this tick
    pub fn released(&self) -> bool {
        !self.is_down && self.was_down
    }

    /// Shift the current state into the previous slot and store a new one
    pub fn update(&mut self, is_down: bool) {
        self.was_down = self.is_down;
        self.is_down = is_down;
    }

    /// A button that went down on this very tick
    pub fn just_pressed() -> Self {
        Self {
            is_down: true,
            was_down: false,
        }
    }

    /// A button that has been down for more than one tick
    pub fn held() -> Self {
        Self {
            is_down: true,
            was_down: true,
        }
    }
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub left: Button,
    pub right: Button,
    pub jump: Button,
    pub reset: Button,
    /// Primary mouse button
    pub mouse: Button,
    /// Mouse position in centered world pixels
    pub mouse_pos: IVec2,
}

impl TickInput {
    /// Horizontal control axis: -1, 0 or 1
    pub fn horizontal(&self) -> i32 {
        self.right.is_down as i32 - self.left.is_down as i32
    }

    /// Feed the next tick's raw held states
    pub fn advance(
        &mut self,
        left: bool,
        right: bool,
        jump: bool,
        reset: bool,
        mouse: bool,
        mouse_pos: IVec2,
    ) {
        self.left.update(left);
        self.right.update(right);
        self.jump.update(jump);
        self.reset.update(reset);
        self.mouse.update(mouse);
        self.mouse_pos = mouse_pos;
    }
}
