//! Occlusion-aware collision against the frame stack
//!
//! Frames are scanned topmost first (end of the list). Only the highest frame
//! whose rectangle contains a point, ignoring frames flagged
//! `under_player_frame`, decides whether that point is solid.
//!
//! Two hitbox sample sets are used: the four corners for rectangle overlap
//! bookkeeping, and every perimeter pixel for blocking so the player cannot
//! slip through one-pixel gaps between diagonal tiles.

use glam::IVec2;

use super::frame::{Frame, TileQuery};

/// Top-left pixel of the player hitbox relative to the player position
pub const HITBOX_MIN: IVec2 = IVec2::new(-4, -3);
/// Bottom-right pixel of the player hitbox (inclusive)
pub const HITBOX_MAX: IVec2 = IVec2::new(3, 7);

/// Coarse sample set: the four hitbox corners
pub const HITBOX_CORNERS: [IVec2; 4] = [
    HITBOX_MIN,
    IVec2::new(HITBOX_MAX.x, HITBOX_MIN.y),
    IVec2::new(HITBOX_MIN.x, HITBOX_MAX.y),
    HITBOX_MAX,
];

/// Dense sample set: every pixel on the hitbox perimeter, each once
pub fn hitbox_perimeter() -> impl Iterator<Item = IVec2> {
    let horizontal = (HITBOX_MIN.x..=HITBOX_MAX.x)
        .flat_map(|x| [IVec2::new(x, HITBOX_MIN.y), IVec2::new(x, HITBOX_MAX.y)]);
    let vertical = (HITBOX_MIN.y + 1..HITBOX_MAX.y)
        .flat_map(|y| [IVec2::new(HITBOX_MIN.x, y), IVec2::new(HITBOX_MAX.x, y)]);
    horizontal.chain(vertical)
}

/// Result of querying a point against the whole frame stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointQuery {
    /// No frame that still collides contains the point
    OutOfAllBounds,
    /// The deciding frame has an empty tile here
    Empty { frame: usize },
    /// The deciding frame has a solid tile here
    Solid { frame: usize },
}

/// How a sweep treats solid hits below the player's frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sweep {
    /// Read-only ground check
    Check,
    /// Movement validation. Solid frames with an index below `topmost_touched`
    /// are flagged `under_player_frame` instead of blocking.
    Move { topmost_touched: Option<usize> },
}

/// Query a world point, topmost frame first
pub fn query_solid(frames: &[Frame], point: IVec2) -> PointQuery {
    for (index, frame) in frames.iter().enumerate().rev() {
        if frame.under_player_frame {
            continue;
        }
        match frame.query(point) {
            TileQuery::OutOfBounds => continue,
            TileQuery::Empty => return PointQuery::Empty { frame: index },
            TileQuery::Solid => return PointQuery::Solid { frame: index },
        }
    }
    PointQuery::OutOfAllBounds
}

/// Whether the player at `pos + offset` is blocked by any perimeter sample
///
/// With [`Sweep::Move`] a solid hit below the threshold flags that frame
/// `under_player_frame`. Flagging can expose a frame beneath it, so samples
/// are rescanned until no new frame is flagged. A blocked step keeps none of
/// the flags it set, so the committed position always matches the flags.
pub fn solid_at_offset(
    frames: &mut [Frame],
    pos: IVec2,
    offset: IVec2,
    sweep: Sweep,
) -> bool {
    let threshold = match sweep {
        Sweep::Move { topmost_touched } => topmost_touched,
        Sweep::Check => None,
    };
    let mut flagged = Vec::new();

    let blocked = loop {
        let mut blocked = false;
        let mut newly_flagged = false;

        for point in hitbox_perimeter() {
            let PointQuery::Solid { frame } = query_solid(frames, pos + point + offset) else {
                continue;
            };

            if threshold.is_some_and(|t| frame < t) {
                frames[frame].under_player_frame = true;
                flagged.push(frame);
                newly_flagged = true;
            } else {
                blocked = true;
            }
        }

        if blocked || !newly_flagged {
            break blocked;
        }
    };

    for &frame in &flagged {
        if blocked {
            frames[frame].under_player_frame = false;
        } else {
            log::debug!("Player got under frame {frame}");
        }
    }

    blocked
}

/// Whether any corner of the player hitbox at `pos` is inside `frame`
pub fn hitbox_overlaps(frame: &Frame, pos: IVec2) -> bool {
    HITBOX_CORNERS.iter().any(|&corner| frame.contains(pos + corner))
}

/// Refresh per-frame overlap flags and find the player's lowest touched frame.
///
/// Must run before any movement sweep in a tick, since sweeps read the flags
/// it writes.
///
/// After it returns:
/// - `aabb_overlaps_player` is true exactly for frames the coarse hitbox touches
/// - `under_player_frame` is false for every frame not touched
/// - before movement starts, `under_player_frame` is recomputed from scratch:
///   touched frames stacked above the player's spawn frame are walked under
/// - the result is the lowest index among touched frames not flagged
///   `under_player_frame`, or `None`
pub fn occlusion_pass(
    frames: &mut [Frame],
    player_pos: IVec2,
    movement_started: bool,
) -> Option<usize> {
    let mut above_spawn_frame = false;
    let mut topmost_touched = None;

    for (index, frame) in frames.iter_mut().enumerate() {
        frame.aabb_overlaps_player = hitbox_overlaps(frame, player_pos);

        if !movement_started {
            frame.under_player_frame = frame.aabb_overlaps_player && above_spawn_frame;
            if frame.spawns_player() {
                above_spawn_frame = true;
            }
        }

        if !frame.aabb_overlaps_player {
            if frame.under_player_frame {
                log::debug!("Frame {index} no longer overlaps the player, collision restored");
            }
            frame.under_player_frame = false;
        }

        if frame.aabb_overlaps_player && !frame.under_player_frame && topmost_touched.is_none() {
            topmost_touched = Some(index);
        }
    }

    topmost_touched
}
