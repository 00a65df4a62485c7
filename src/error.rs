use thiserror::Error;

/// Errors surfaced by repertoire, navigation, preference and persistence operations.
#[derive(Error, Debug)]
pub enum TrainerError {
    #[error("{what} not found: {id}")]
    NotFound { what: &'static str, id: String },
    #[error("Position {0} is not part of the selected repertoire")]
    InvalidPosition(String),
    #[error("Move {uci} is already recorded from position {node_id}")]
    DuplicateMove { node_id: String, uci: String },
    #[error("Theme \"{0}\" not found")]
    ThemeNotFound(String),
    #[error("Import failed: {0}")]
    Import(String),
    #[error("Stored state is corrupt: {0}")]
    StorageCorrupt(String),
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TrainerError {
    pub(crate) fn repertoire_not_found(id: &str) -> Self {
        TrainerError::NotFound {
            what: "Repertoire",
            id: id.to_string(),
        }
    }

    pub(crate) fn position_not_found(id: &str) -> Self {
        TrainerError::NotFound {
            what: "Position",
            id: id.to_string(),
        }
    }
}

pub type Result<T, E = TrainerError> = std::result::Result<T, E>;
