//! Placed frames and entity-marker resolution

use std::sync::Arc;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::template::FrameTemplate;
use crate::consts::TILE_SIZE;
use crate::error::LoadError;
use crate::rect_contains;

/// Entities a frame can spawn from its numbered markers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Player,
    Exit,
    Key,
}

/// Result of querying one pixel against one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileQuery {
    OutOfBounds,
    Empty,
    Solid,
}

/// Marker offsets found in a frame, relative to the frame position
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedMarkers {
    pub player_spawn: Option<IVec2>,
    pub exit: Option<IVec2>,
    pub keys: Vec<IVec2>,
}

/// What a resolved marker of a given kind writes
type MarkerEffect = fn(&mut ResolvedMarkers, IVec2);

fn set_player_spawn(markers: &mut ResolvedMarkers, offset: IVec2) {
    markers.player_spawn = Some(offset);
}

fn set_exit(markers: &mut ResolvedMarkers, offset: IVec2) {
    markers.exit = Some(offset);
}

fn add_key(markers: &mut ResolvedMarkers, offset: IVec2) {
    markers.keys.push(offset);
}

/// Kind to effect table. New entity kinds only need a row here.
const MARKER_EFFECTS: &[(EntityKind, MarkerEffect)] = &[
    (EntityKind::Player, set_player_spawn),
    (EntityKind::Exit, set_exit),
    (EntityKind::Key, add_key),
];

fn marker_effect(kind: EntityKind) -> MarkerEffect {
    MARKER_EFFECTS
        .iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, effect)| *effect)
        .unwrap_or_else(|| unreachable!("no marker effect for {kind:?}"))
}

/// Marker character for the `index`-th requested entity: '1', '2', ...
fn marker_char(index: usize) -> Option<u8> {
    (index < 9).then(|| b'1' + index as u8)
}

/// A placed, draggable instance of a [`FrameTemplate`]
#[derive(Debug, Clone)]
pub struct Frame {
    template: Arc<FrameTemplate>,
    /// Center of the frame in world pixels
    pub pos: IVec2,

    pub hovered: bool,
    /// Cosmetic hover animation value (0 to 1, up to 1.7 while dragged)
    pub hover_time: f32,

    pub dragged: bool,
    /// `pos - mouse_pos` captured when the drag started
    pub drag_offset: IVec2,

    /// Entities to spawn, in marker order ('1' is the first entry)
    spawns: Vec<EntityKind>,
    /// Full marker resolution, computed once when the frame is built
    markers: ResolvedMarkers,
    /// Exit offset, cleared once the exit is used
    pub exit: Option<IVec2>,
    /// Uncollected key offsets
    pub keys: Vec<IVec2>,

    /// The player's coarse hitbox touches this frame's rectangle
    pub aabb_overlaps_player: bool,
    /// Ignored for collision because the player got under this frame
    pub under_player_frame: bool,
}

impl Frame {
    /// Place a frame and resolve its markers. Fails if a requested marker is missing.
    pub fn new(
        template: Arc<FrameTemplate>,
        pos: IVec2,
        spawns: Vec<EntityKind>,
    ) -> Result<Self, LoadError> {
        let mut frame = Self {
            template,
            pos,
            hovered: false,
            hover_time: 0.0,
            dragged: false,
            drag_offset: IVec2::ZERO,
            spawns,
            markers: ResolvedMarkers::default(),
            exit: None,
            keys: Vec::new(),
            aabb_overlaps_player: false,
            under_player_frame: false,
        };
        frame.markers = frame.resolve_markers()?;
        frame.reset_entities();
        Ok(frame)
    }

    pub fn template(&self) -> &FrameTemplate {
        &self.template
    }

    pub fn top_left(&self) -> IVec2 {
        self.template.top_left(self.pos)
    }

    pub fn pixel_size(&self) -> IVec2 {
        self.template.pixel_size()
    }

    /// Whether a world pixel is inside this frame's rectangle
    pub fn contains(&self, pixel: IVec2) -> bool {
        rect_contains(self.top_left(), self.pixel_size(), pixel)
    }

    /// Query a world pixel against this frame's tiles
    pub fn query(&self, pixel: IVec2) -> TileQuery {
        if !self.contains(pixel) {
            return TileQuery::OutOfBounds;
        }

        let coord = (pixel - self.top_left()).div_euclid(IVec2::splat(TILE_SIZE));
        match self.template.tile(coord) {
            Some(_) if self.template.is_solid(coord) => TileQuery::Solid,
            Some(_) => TileQuery::Empty,
            None => {
                debug_assert!(
                    false,
                    "pixel {pixel} passed the bounds check but maps to tile {coord}"
                );
                TileQuery::OutOfBounds
            }
        }
    }

    /// Locate every requested marker. Offsets do not depend on `pos`.
    pub fn resolve_markers(&self) -> Result<ResolvedMarkers, LoadError> {
        let mut resolved = ResolvedMarkers::default();

        for (index, &kind) in self.spawns.iter().enumerate() {
            let marker = marker_char(index).ok_or_else(|| LoadError::TooManyMarkers {
                template: self.template.name().to_string(),
                requested: self.spawns.len(),
            })?;

            let coord = self
                .template
                .find_marker(marker)
                .ok_or_else(|| LoadError::MissingMarker {
                    template: self.template.name().to_string(),
                    marker: marker as char,
                })?;

            let offset = self.top_left() + coord * TILE_SIZE + TILE_SIZE / 2 - self.pos;
            marker_effect(kind)(&mut resolved, offset);
        }

        Ok(resolved)
    }

    /// Restore the exit and the full key list from the resolved markers.
    ///
    /// Marker offsets are relative to `pos`, so after a move this re-derives
    /// every entity anchor at the frame's new position.
    pub fn reset_entities(&mut self) {
        self.exit = self.markers.exit;
        self.keys = self.markers.keys.clone();
    }

    pub fn spawns(&self) -> &[EntityKind] {
        &self.spawns
    }

    pub fn spawns_player(&self) -> bool {
        self.markers.player_spawn.is_some()
    }

    /// Player spawn point in world pixels
    pub fn player_spawn_world(&self) -> Option<IVec2> {
        self.markers.player_spawn.map(|o| self.pos + o)
    }

    /// Exit point in world pixels
    pub fn exit_world(&self) -> Option<IVec2> {
        self.exit.map(|o| self.pos + o)
    }

    /// Uncollected keys in world pixels
    pub fn keys_world(&self) -> impl Iterator<Item = IVec2> + '_ {
        self.keys.iter().map(move |&o| self.pos + o)
    }
}
