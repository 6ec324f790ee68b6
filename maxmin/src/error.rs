//! Errors that abort a picking run.
//!
//! Malformed records are not errors at this level, they surface as
//! [`crate::data::Entry::Invalid`] and only get counted.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("could not open input store {path:?}: {source}")]
    OpenInput {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not open output store {path:?}: {source}")]
    OpenOutput {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not parse config: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("record index {index} is out of range for a corpus of {len} records")]
    IndexOutOfRange { index: usize, len: usize },
}
