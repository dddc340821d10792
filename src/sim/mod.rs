//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (frame list order is the z-order)
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod drag;
pub mod frame;
pub mod input;
pub mod player;
pub mod state;
pub mod template;
pub mod tick;
pub mod view;

pub use collision::{PointQuery, Sweep, occlusion_pass, query_solid, solid_at_offset};
pub use drag::{DragContext, DragOutcome};
pub use frame::{EntityKind, Frame, ResolvedMarkers, TileQuery};
pub use input::{Button, TickInput};
pub use player::{Control, Player, StepReport};
pub use state::{
    DeathCause, GameEvent, GamePhase, GameState, MAX_PARTICLES, Particle, ResetButton, SoundId,
    Tutorial,
};
pub use template::FrameTemplate;
pub use tick::tick;
pub use view::{AnimState, Overlay, PlayerSprite, RenderVisitor};
