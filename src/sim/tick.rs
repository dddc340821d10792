//! Fixed timestep simulation tick
//!
//! Core game loop that advances one level session deterministically.

use glam::IVec2;

use super::collision::occlusion_pass;
use super::drag::{self, DragContext};
use super::input::TickInput;
use super::player::Control;
use super::state::{DeathCause, GameEvent, GameState, SoundId};
use crate::{approach, half_screen};

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput) {
    state.events.clear();

    if state.finished {
        return;
    }

    state.time_ticks += 1;
    state.update_particles();

    update_reset_button(state, input);
    update_frames(state, input);

    let topmost_touched =
        occlusion_pass(&mut state.frames, state.player.pos, state.movement_started);

    // Entities are touched before the player moves
    if state.movement_started && state.player.exists {
        collect_keys(state);
        check_exit(state);
    }

    if state.player.exists {
        update_player(state, input, topmost_touched);
    }

    if state.player.exists && out_of_bounds(state.player.pos) {
        state.kill_player(DeathCause::OutOfBounds);
    }

    update_death_timer(state);
    if state.finished {
        return;
    }

    let fade_target = if state.winning { 1.0 } else { 0.0 };
    state.fade = approach(state.fade, fade_target, state.tuning.fade_step);

    update_tutorial(state, input);

    if state.movement_started {
        state.movement_ticks += 1;
        state.background_ticks += 1;
    }
}

/// Falling below the field or walking off either side kills. Jumping above is allowed.
fn out_of_bounds(pos: IVec2) -> bool {
    let bound = half_screen();
    pos.x <= -bound.x || pos.x > bound.x || pos.y > bound.y
}

fn update_reset_button(state: &mut GameState, input: &TickInput) {
    let target = if state.movement_started { 1.0 } else { 0.0 };
    let button = &mut state.reset_button;
    button.vis_timer = approach(button.vis_timer, target, state.tuning.reset_button_vis_step);

    if !state.movement_started {
        button.hovered = false;
        return;
    }

    button.hovered = button.contains(input.mouse_pos);
    if (button.hovered && input.mouse.pressed()) || input.reset.pressed() {
        state.kill_player(DeathCause::Reset);
    }
}

fn update_frames(state: &mut GameState, input: &TickInput) {
    let ctx = DragContext {
        movement_started: state.movement_started,
        player_alive: state.player.exists,
        winning: state.winning,
        reset_hovered: state.reset_button.hovered,
    };

    let outcome = drag::update(&mut state.frames, input, &ctx, &state.tuning);

    if outcome.click_death {
        state.kill_player(DeathCause::FrameClick);
    }
    if outcome.drag_started {
        state.tutorial.dragged_at_least_once = true;
    }

    // Entities travel with their frame until the player starts moving
    if outcome.dragged_frame_moved && !state.movement_started {
        state.follow_dragged_frame();
    }
}

fn collect_keys(state: &mut GameState) {
    let reach = state.tuning.key_half_extent;
    let player_pos = state.player.pos;
    let mut collected = Vec::new();

    for frame in state.frames.iter_mut().filter(|f| !f.under_player_frame) {
        let frame_pos = frame.pos;
        frame.keys.retain(|&offset| {
            let key_pos = frame_pos + offset;
            let dist = (key_pos - player_pos).abs();
            let touched = dist.x < reach && dist.y < reach;
            if touched {
                collected.push(key_pos);
            }
            !touched
        });
    }

    if collected.is_empty() {
        return;
    }

    state.recount_keys();
    for pos in collected {
        log::info!("Key collected at {pos}, {} frames left", state.remaining_keys);
        state.events.push(GameEvent::KeyCollected {
            pos,
            remaining: state.remaining_keys,
        });
        state.play_sound(SoundId::Key, pos, 0.2);
        state.spawn_key_sparkle(pos);
    }
}

fn check_exit(state: &mut GameState) {
    let reach = state.tuning.exit_half_extent;
    let player_pos = state.player.pos;

    // Locked until every key is collected
    if state.remaining_keys > 0 {
        return;
    }

    let reached = state
        .frames
        .iter_mut()
        .filter(|f| !f.under_player_frame)
        .find_map(|frame| {
            let exit_pos = frame.exit_world()?;
            let dist = (exit_pos - player_pos).abs();
            (dist.x < reach && dist.y < reach).then(|| {
                frame.exit = None;
                exit_pos
            })
        });

    if let Some(pos) = reached {
        state.player.exists = false;
        state.winning = true;

        log::info!("Level {} complete", state.level_index + 1);
        state.events.push(GameEvent::Won { pos });
        state.play_sound(SoundId::Win, pos, 0.2);
    }
}

fn update_player(state: &mut GameState, input: &TickInput, topmost_touched: Option<usize>) {
    let gated = state.tuning.require_drag_to_start && !state.tutorial.dragged_at_least_once;
    let control = if gated && !state.movement_started {
        Control::idle(false)
    } else {
        Control::from_input(input, state.movement_started)
    };

    let report = state
        .player
        .step(&mut state.frames, control, &state.tuning, topmost_touched);
    let pos = state.player.pos;

    if report.started_by_walking {
        log::info!("Movement started on level {}", state.level_index + 1);
        state.play_sound(SoundId::StartMoving, pos, 0.2);
    }
    if report.started_moving() {
        state.movement_started = true;
    }

    if report.landed {
        state.events.push(GameEvent::Landed { pos });
        state.play_sound(SoundId::Landing, pos, 0.3);
        state.spawn_landing_dust(pos);
    }
    if report.jumped {
        state.events.push(GameEvent::Jumped { pos });
        state.play_sound(SoundId::Jump, pos, 0.3);
        state.spawn_jump_dust(pos);
    }

    if state.movement_started {
        state.tutorial.explaining_move = false;
        state.tutorial.explaining_drag = false;
    }
}

/// Count ticks without a player, then restart the level or advance past a win
fn update_death_timer(state: &mut GameState) {
    if state.player.exists {
        return;
    }

    state.player.death_timer += 1;
    if state.player.death_timer <= state.tuning.respawn_delay_ticks {
        return;
    }

    if state.winning {
        advance_level(state);
    } else {
        let pos = state.player.pos;
        state.restart_level();
        state.play_sound(SoundId::Respawn, pos, 0.2);
        let spawn = state.player.pos;
        state.spawn_respawn_ring(spawn);
    }
}

fn advance_level(state: &mut GameState) {
    let next = state.level_index + 1;
    if next >= state.level_count() {
        log::info!("All {} levels complete", state.level_count());
        state.finished = true;
        state.events.push(GameEvent::AllLevelsComplete);
        return;
    }

    if let Err(err) = state.load_level(next) {
        // Levels are validated when the pack is built
        log::warn!("Failed to load level {}: {err}", next + 1);
        state.finished = true;
        state.events.push(GameEvent::AllLevelsComplete);
    }
}

fn update_tutorial(state: &mut GameState, input: &TickInput) {
    let step = state.tuning.tutorial_step;
    let tut = &mut state.tutorial;

    let target = |shown: bool| if shown { 1.0 } else { 0.0 };
    tut.drag_timer = approach(tut.drag_timer, target(tut.explaining_drag), step);
    tut.move_timer = approach(
        tut.move_timer,
        target(tut.explaining_move && tut.dragged_at_least_once),
        step,
    );
    tut.reset_timer = approach(
        tut.reset_timer,
        target(tut.explaining_reset && state.movement_started),
        step,
    );

    // Clicking around after starting to move brings the reset hint back
    if state.movement_started && !state.reset_button.hovered && input.mouse.pressed() {
        tut.explaining_reset = true;
    }
}
