//! Framestack - simulation core of a frame-stacking puzzle platformer
//!
//! Core modules:
//! - `sim`: Deterministic simulation (player physics, frame occlusion, dragging, level flow)
//! - `levels`: Built-in frame templates and level layouts
//! - `tuning`: Data-driven physics and gameplay constants
//! - `error`: Content/load errors
//!
//! Rendering, audio and window input live outside this crate. The simulation
//! consumes a [`sim::TickInput`] per tick and produces [`sim::GameEvent`]s plus
//! read-only state for a [`sim::RenderVisitor`].

pub mod error;
pub mod levels;
pub mod sim;
pub mod tuning;

pub use error::LoadError;
pub use tuning::Tuning;

use glam::IVec2;

/// Game configuration constants
pub mod consts {
    use glam::IVec2;

    /// Fixed simulation rate. Physics constants are per-tick and assume this rate.
    pub const TICKS_PER_SECOND: u32 = 60;

    /// Edge length of one tile in pixels
    pub const TILE_SIZE: i32 = 16;

    /// Play field size in pixels. World coordinates are centered: (0, 0) is the middle.
    pub const SCREEN_SIZE: IVec2 = IVec2::new(1920 / 4, 1080 / 4);

    /// Tile character that blocks movement
    pub const SOLID_TILE: u8 = b'#';
}

/// Half of the play field, i.e. the world bounds around the origin
#[inline]
pub fn half_screen() -> IVec2 {
    consts::SCREEN_SIZE / 2
}

/// Whether `point` lies inside the half-open rectangle `[corner, corner + size)`
#[inline]
pub fn rect_contains(corner: IVec2, size: IVec2, point: IVec2) -> bool {
    point.x >= corner.x
        && point.y >= corner.y
        && point.x < corner.x + size.x
        && point.y < corner.y + size.y
}

/// Move `value` toward `target` by at most `step`, never overshooting
#[inline]
pub fn approach(value: f32, target: f32, step: f32) -> f32 {
    if value < target {
        (value + step).min(target)
    } else {
        (value - step).max(target)
    }
}
