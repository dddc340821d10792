//! Frame templates
//!
//! A template is the immutable tile grid behind one or more placed frames.
//! `#` is solid, digits are entity markers, anything else is empty.

use glam::IVec2;
use serde::Deserialize;

use crate::consts::{SOLID_TILE, TILE_SIZE};
use crate::error::LoadError;

/// Immutable tile grid shared by every frame placed from it
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "TemplateDef")]
pub struct FrameTemplate {
    name: String,
    /// Atlas position of the frame image, in tiles. Only the renderer reads this.
    tex_pos: IVec2,
    /// Row-major tiles, every row the same length
    rows: Vec<Vec<u8>>,
}

/// Unvalidated template as it appears in level data
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateDef {
    pub name: String,
    #[serde(default)]
    pub tex_pos: IVec2,
    pub tiles: Vec<String>,
}

impl TryFrom<TemplateDef> for FrameTemplate {
    type Error = LoadError;

    fn try_from(def: TemplateDef) -> Result<Self, Self::Error> {
        let rows: Vec<&str> = def.tiles.iter().map(String::as_str).collect();
        FrameTemplate::new(def.name, def.tex_pos, &rows)
    }
}

impl FrameTemplate {
    /// Build a template, rejecting empty or ragged grids
    pub fn new(name: impl Into<String>, tex_pos: IVec2, rows: &[&str]) -> Result<Self, LoadError> {
        let name = name.into();
        let width = match rows.first() {
            Some(first) if !first.is_empty() => first.len(),
            _ => return Err(LoadError::EmptyTemplate(name)),
        };

        for (row, line) in rows.iter().enumerate() {
            if line.len() != width {
                return Err(LoadError::RaggedTemplate {
                    template: name,
                    row,
                    expected: width,
                    found: line.len(),
                });
            }
        }

        Ok(Self {
            name,
            tex_pos,
            rows: rows.iter().map(|r| r.as_bytes().to_vec()).collect(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tex_pos(&self) -> IVec2 {
        self.tex_pos
    }

    /// Grid size in tiles
    pub fn tile_size(&self) -> IVec2 {
        IVec2::new(self.rows[0].len() as i32, self.rows.len() as i32)
    }

    /// Grid size in pixels
    pub fn pixel_size(&self) -> IVec2 {
        self.tile_size() * TILE_SIZE
    }

    /// Top-left pixel of a frame of this template centered on `pos`
    pub fn top_left(&self, pos: IVec2) -> IVec2 {
        pos - self.pixel_size() / 2
    }

    /// Tile character at a tile coordinate, `None` outside the grid
    pub fn tile(&self, coord: IVec2) -> Option<u8> {
        if coord.x < 0 || coord.y < 0 {
            return None;
        }
        self.rows
            .get(coord.y as usize)
            .and_then(|row| row.get(coord.x as usize))
            .copied()
    }

    pub fn is_solid(&self, coord: IVec2) -> bool {
        self.tile(coord) == Some(SOLID_TILE)
    }

    /// First tile holding `marker`, scanning rows top to bottom
    pub fn find_marker(&self, marker: u8) -> Option<IVec2> {
        self.rows.iter().enumerate().find_map(|(y, row)| {
            row.iter()
                .position(|&c| c == marker)
                .map(|x| IVec2::new(x as i32, y as i32))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn island() -> FrameTemplate {
        FrameTemplate::new(
            "island",
            IVec2::ZERO,
            &["-----", "--1--", "-###-", "-----"],
        )
        .unwrap()
    }

    #[test]
    fn test_sizes() {
        let t = island();
        assert_eq!(t.tile_size(), IVec2::new(5, 4));
        assert_eq!(t.pixel_size(), IVec2::new(80, 64));
        assert_eq!(t.top_left(IVec2::new(10, 10)), IVec2::new(-30, -22));
    }

    #[test]
    fn test_tile_lookup() {
        let t = island();
        assert!(t.is_solid(IVec2::new(1, 2)));
        assert!(!t.is_solid(IVec2::new(0, 2)));
        assert_eq!(t.tile(IVec2::new(5, 0)), None);
        assert_eq!(t.tile(IVec2::new(-1, 0)), None);
    }

    #[test]
    fn test_find_marker() {
        let t = island();
        assert_eq!(t.find_marker(b'1'), Some(IVec2::new(2, 1)));
        assert_eq!(t.find_marker(b'2'), None);
    }

    #[test]
    fn test_rejects_bad_grids() {
        assert!(matches!(
            FrameTemplate::new("empty", IVec2::ZERO, &[]),
            Err(LoadError::EmptyTemplate(_))
        ));
        assert!(matches!(
            FrameTemplate::new("ragged", IVec2::ZERO, &["---", "--"]),
            Err(LoadError::RaggedTemplate { row: 1, expected: 3, found: 2, .. })
        ));
    }
}
