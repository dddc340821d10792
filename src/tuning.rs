//! Gameplay tuning
//!
//! All per-tick constants in one serializable struct so a level designer can
//! override any subset from JSON. Values assume [`crate::consts::TICKS_PER_SECOND`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::LoadError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Walking ===
    /// Top horizontal speed (pixels/tick)
    pub walk_speed: f32,
    /// Horizontal acceleration while a direction is held
    pub walk_acc: f32,
    /// Horizontal deceleration with no direction held
    pub walk_dec: f32,

    // === Jumping ===
    /// Vertical velocity set on jump (negative is up)
    pub jump_velocity: f32,
    /// Gravity while jump is held and the player is rising
    pub gravity: f32,
    /// Gravity otherwise (short hop / falling)
    pub gravity_lowjump: f32,
    /// Terminal downward velocity
    pub max_fall_speed: f32,

    /// Multiplicative decay applied to the sub-pixel remainder each tick
    pub remainder_damping: f32,

    // === Frames ===
    /// Hover animation rate
    pub hover_step: f32,
    /// Hover animation target for a hovered frame
    pub hover_cap: f32,
    /// Hover animation target for a dragged frame
    pub hover_cap_dragged: f32,
    /// Distance a dragged frame keeps from the play field edge
    pub drag_margin: i32,

    // === Entities ===
    /// Half extent of the exit's trigger box
    pub exit_half_extent: i32,
    /// Half extent of a key's trigger box
    pub key_half_extent: i32,

    // === Level flow ===
    /// Ticks after death/win before the level restarts or advances
    pub respawn_delay_ticks: u32,
    /// Fade change per tick
    pub fade_step: f32,
    /// Edge length of the reset button in the bottom right corner
    pub reset_button_size: i32,
    /// Reset button visibility change per tick
    pub reset_button_vis_step: f32,
    /// Tutorial text visibility change per tick
    pub tutorial_step: f32,
    /// Ignore movement input until a frame has been dragged at least once
    pub require_drag_to_start: bool,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            walk_speed: 1.5,
            walk_acc: 0.4,
            walk_dec: 0.4,

            jump_velocity: -3.0,
            gravity: 0.14,
            gravity_lowjump: 0.24,
            max_fall_speed: 4.0,

            remainder_damping: 0.98,

            hover_step: 0.15,
            hover_cap: 1.0,
            hover_cap_dragged: 1.7,
            drag_margin: 8,

            exit_half_extent: 4,
            key_half_extent: 6,

            respawn_delay_ticks: 45,
            fade_step: 0.03,
            reset_button_size: 32,
            reset_button_vis_step: 0.05,
            tutorial_step: 0.005,
            require_drag_to_start: true,
        }
    }
}

impl Tuning {
    /// Parse tuning from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let tuning = serde_json::from_str(json)?;
        log::info!("Loaded tuning overrides");
        Ok(tuning)
    }

    /// Read tuning overrides from a JSON file
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let json = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Largest per-tick pixel step the player can take on either axis
    pub fn max_step(&self) -> i32 {
        self.walk_speed.max(self.max_fall_speed).max(self.jump_velocity.abs()).ceil() as i32 + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "walk_speed": 2.0, "require_drag_to_start": false }"#)
            .unwrap();
        assert_eq!(tuning.walk_speed, 2.0);
        assert!(!tuning.require_drag_to_start);
        assert_eq!(tuning.gravity, Tuning::default().gravity);
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(matches!(
            Tuning::from_json("{ walk_speed: }"),
            Err(LoadError::Parse(_))
        ));
    }

    #[test]
    fn test_roundtrip_through_json() {
        let tuning = Tuning::default();
        let json = serde_json::to_string(&tuning).unwrap();
        assert_eq!(Tuning::from_json(&json).unwrap(), tuning);
    }
}
