//! Content errors
//!
//! Everything here is fatal at load time: a level that fails to build is
//! reported to the caller and never recovered mid-tick.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("frame template '{template}' has no marker '{marker}' for a requested entity")]
    MissingMarker { template: String, marker: char },

    #[error("frame template '{0}' has no tiles")]
    EmptyTemplate(String),

    #[error("frame template '{template}' row {row} has {found} tiles, expected {expected}")]
    RaggedTemplate {
        template: String,
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("frame template '{template}' requests {requested} markers, only 1-9 are supported")]
    TooManyMarkers { template: String, requested: usize },

    #[error("unknown frame template '{0}'")]
    UnknownTemplate(String),

    #[error("level {level} has no frame that spawns the player")]
    NoPlayerSpawn { level: usize },

    #[error("level {index} does not exist ({count} levels loaded)")]
    LevelOutOfRange { index: usize, count: usize },

    #[error("level pack contains no levels")]
    NoLevels,

    #[error("failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Parse(#[from] serde_json::Error),
}
