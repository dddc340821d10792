//! Level content
//!
//! Levels are static, read-only layouts: an ordered frame list (the initial
//! z-order) plus a background index. A pack is loaded from JSON and built into
//! [`Level`]s up front, so a broken marker surfaces at startup rather than when
//! the level is reached.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use glam::IVec2;
use serde::Deserialize;

use crate::error::LoadError;
use crate::sim::{EntityKind, Frame, FrameTemplate};

/// Levels shipped with the crate
const BUILTIN_PACK: &str = include_str!("../assets/levels.json");

/// One frame placement in a level definition
#[derive(Debug, Clone, Deserialize)]
pub struct FrameDef {
    pub template: String,
    pub pos: IVec2,
    /// Entities to spawn from markers '1', '2', ... in this order
    #[serde(default)]
    pub spawns: Vec<EntityKind>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LevelDef {
    #[serde(default)]
    pub background: usize,
    pub frames: Vec<FrameDef>,
}

/// Templates and the levels that place them
#[derive(Debug, Clone, Deserialize)]
pub struct LevelPack {
    pub templates: Vec<FrameTemplate>,
    pub levels: Vec<LevelDef>,
}

/// A validated level, ready to be copied into a session
#[derive(Debug, Clone)]
pub struct Level {
    pub background: usize,
    pub frames: Vec<Frame>,
}

impl LevelPack {
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let json = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Resolve template names and every entity marker
    pub fn build(&self) -> Result<Vec<Level>, LoadError> {
        if self.levels.is_empty() {
            return Err(LoadError::NoLevels);
        }

        let templates: HashMap<&str, Arc<FrameTemplate>> = self
            .templates
            .iter()
            .map(|t| (t.name(), Arc::new(t.clone())))
            .collect();

        let levels = self
            .levels
            .iter()
            .enumerate()
            .map(|(index, def)| build_level(index, def, &templates))
            .collect::<Result<Vec<_>, _>>()?;

        log::info!(
            "Built {} levels from {} templates",
            levels.len(),
            templates.len()
        );
        Ok(levels)
    }
}

fn build_level(
    index: usize,
    def: &LevelDef,
    templates: &HashMap<&str, Arc<FrameTemplate>>,
) -> Result<Level, LoadError> {
    let frames = def
        .frames
        .iter()
        .map(|f| {
            let template = templates
                .get(f.template.as_str())
                .ok_or_else(|| LoadError::UnknownTemplate(f.template.clone()))?;
            Frame::new(template.clone(), f.pos, f.spawns.clone())
        })
        .collect::<Result<Vec<_>, _>>()?;

    if !frames.iter().any(Frame::spawns_player) {
        return Err(LoadError::NoPlayerSpawn { level: index });
    }

    Ok(Level {
        background: def.background,
        frames,
    })
}

/// Build the levels shipped with the crate
pub fn builtin() -> Result<Vec<Level>, LoadError> {
    LevelPack::from_json(BUILTIN_PACK)?.build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_levels_build() {
        let levels = builtin().unwrap();
        assert_eq!(levels.len(), 3);
        assert_eq!(levels[1].background, 1);

        // Level 1: player stands on the island's middle tiles
        let spawn = levels[0].frames[0].player_spawn_world().unwrap();
        assert_eq!(spawn, IVec2::new(-50, 28));
        assert_eq!(levels[0].frames[1].exit_world(), Some(IVec2::new(70, -12)));
    }

    #[test]
    fn test_unknown_template() {
        let json = r#"{
            "templates": [],
            "levels": [{ "frames": [{ "template": "nope", "pos": [0, 0] }] }]
        }"#;
        let result = LevelPack::from_json(json).unwrap().build();
        assert!(matches!(result, Err(LoadError::UnknownTemplate(name)) if name == "nope"));
    }

    #[test]
    fn test_missing_marker_fails_the_level() {
        let json = r####"{
            "templates": [{ "name": "plain", "tiles": ["---", "###"] }],
            "levels": [{ "frames": [{ "template": "plain", "pos": [0, 0], "spawns": ["player"] }] }]
        }"####;
        let result = LevelPack::from_json(json).unwrap().build();
        assert!(matches!(result, Err(LoadError::MissingMarker { marker: '1', .. })));
    }

    #[test]
    fn test_level_without_player_is_rejected() {
        let json = r####"{
            "templates": [{ "name": "plain", "tiles": ["-1-", "###"] }],
            "levels": [{ "frames": [{ "template": "plain", "pos": [0, 0], "spawns": ["exit"] }] }]
        }"####;
        let result = LevelPack::from_json(json).unwrap().build();
        assert!(matches!(result, Err(LoadError::NoPlayerSpawn { level: 0 })));
    }

    #[test]
    fn test_ragged_template_is_a_parse_error() {
        let json = r#"{ "templates": [{ "name": "bad", "tiles": ["---", "-"] }], "levels": [] }"#;
        assert!(matches!(LevelPack::from_json(json), Err(LoadError::Parse(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = LevelPack::load(Path::new("/nonexistent/levels.json"));
        assert!(matches!(result, Err(LoadError::Io { .. })));
    }

    #[test]
    fn test_empty_pack() {
        let json = r#"{ "templates": [], "levels": [] }"#;
        assert!(matches!(
            LevelPack::from_json(json).unwrap().build(),
            Err(LoadError::NoLevels)
        ));
    }
}
