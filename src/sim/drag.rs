//! Frame hover, drag and z-order promotion
//!
//! The frame list order is the z-order. Starting a drag rotates the frame to
//! the end of the list, so a dragged frame is always the last one.

use glam::IVec2;

use super::frame::Frame;
use super::input::TickInput;
use crate::half_screen;
use crate::tuning::Tuning;

/// Session state the controller depends on
#[derive(Debug, Clone, Copy, Default)]
pub struct DragContext {
    pub movement_started: bool,
    pub player_alive: bool,
    pub winning: bool,
    /// Mouse is over the reset button
    pub reset_hovered: bool,
}

/// What the controller did this tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DragOutcome {
    /// A fresh click landed on a frame while the player was moving
    pub click_death: bool,
    pub drag_started: bool,
    pub drag_ended: bool,
    /// The dragged (last) frame followed the mouse this tick
    pub dragged_frame_moved: bool,
}

/// Topmost frame containing `point`
pub fn topmost_at(frames: &[Frame], point: IVec2) -> Option<usize> {
    frames.iter().rposition(|f| f.contains(point))
}

/// Mark at most one frame hovered, scanning topmost first
pub fn resolve_hover(frames: &mut [Frame], mouse_pos: IVec2, ctx: &DragContext) -> Option<usize> {
    let mut hovered = None;

    for (index, frame) in frames.iter_mut().enumerate().rev() {
        let under_mouse = !ctx.reset_hovered && frame.contains(mouse_pos);
        let candidate = !ctx.winning && (frame.dragged || under_mouse);
        frame.hovered = hovered.is_none() && candidate;
        if frame.hovered {
            hovered = Some(index);
        }
    }

    hovered
}

/// Ease each frame's hover animation value toward its target
pub fn update_hover_timers(frames: &mut [Frame], tuning: &Tuning) {
    for frame in frames {
        let target = match (frame.hovered, frame.dragged) {
            (true, true) => tuning.hover_cap_dragged,
            (true, false) => tuning.hover_cap,
            (false, _) => 0.0,
        };
        frame.hover_time = crate::approach(frame.hover_time, target, tuning.hover_step);
    }
}

/// Move the frame at `index` to the top, keeping the others in order.
/// Returns its new index.
pub fn promote_to_top(frames: &mut [Frame], index: usize) -> usize {
    frames[index..].rotate_left(1);
    frames.len() - 1
}

/// Keep a frame's rectangle inside the play field with a margin.
///
/// Not `clamp`: a frame larger than the field has a negative bound. Such a
/// frame snaps to `-bound` when left of it and to `bound` otherwise.
pub fn clamp_to_field(frame: &mut Frame, margin: i32) {
    let bound = half_screen() - frame.pixel_size() / 2 - margin;
    for axis in 0..2 {
        if frame.pos[axis] < -bound[axis] {
            frame.pos[axis] = -bound[axis];
        } else if frame.pos[axis] > bound[axis] {
            frame.pos[axis] = bound[axis];
        }
    }
}

/// Run hover, the frame-click death rule and dragging for one tick
pub fn update(
    frames: &mut [Frame],
    input: &TickInput,
    ctx: &DragContext,
    tuning: &Tuning,
) -> DragOutcome {
    let mut outcome = DragOutcome::default();
    let mouse_pos = input.mouse_pos;

    let hovered = resolve_hover(frames, mouse_pos, ctx);
    update_hover_timers(frames, tuning);

    let mut press = input.mouse.pressed();

    // Touching a frame while moving resets the level. The click is consumed.
    if press && ctx.movement_started && ctx.player_alive && !ctx.winning && !ctx.reset_hovered {
        if let Some(index) = topmost_at(frames, mouse_pos) {
            log::info!("Frame {index} clicked while moving");
            outcome.click_death = true;
            press = false;
        }
    }

    // Start drag
    if press && !ctx.winning {
        if let Some(index) = hovered {
            let top = promote_to_top(frames, index);
            let frame = &mut frames[top];
            frame.dragged = true;
            frame.drag_offset = frame.pos - mouse_pos;
            outcome.drag_started = true;
            log::debug!("Drag started on '{}' (was index {index})", frame.template().name());
        }
    }

    let Some(frame) = frames.last_mut() else {
        return outcome;
    };

    // Finish drag
    let player_blocks_drag = ctx.movement_started && ctx.player_alive && !outcome.click_death;
    if frame.dragged && (!input.mouse.is_down || player_blocks_drag || ctx.winning) {
        frame.dragged = false;
        outcome.drag_ended = true;
        log::debug!("Drag ended on '{}' at {}", frame.template().name(), frame.pos);
    }

    // Continue drag
    if frame.dragged {
        let before = frame.pos;
        frame.pos = mouse_pos + frame.drag_offset;
        clamp_to_field(frame, tuning.drag_margin);
        outcome.dragged_frame_moved = frame.pos != before;
    }

    outcome
}
