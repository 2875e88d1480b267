//! Error type for the verification engine.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::Handle;

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not read options file: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("could not write options file: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// A record points at a person that is not in the database.
    #[error("person not found: {0}")]
    MissingPerson(Handle),

    #[error("family not found: {0}")]
    MissingFamily(Handle),

    #[error("event not found: {0}")]
    MissingEvent(Handle),

    #[error("invalid option: {0}")]
    Config(String),

    #[error("unsupported database file: {}", .0.display())]
    UnsupportedDatabase(PathBuf),

    #[error("could not determine data directory")]
    NoDataDir,
}

impl VerifyError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// True for errors caused by a single broken record rather than by the
    /// storage layer as a whole.
    pub fn is_data_integrity(&self) -> bool {
        matches!(
            self,
            Self::MissingPerson(_) | Self::MissingFamily(_) | Self::MissingEvent(_) | Self::Json(_)
        )
    }
}

pub type Result<T, E = VerifyError> = std::result::Result<T, E>;
