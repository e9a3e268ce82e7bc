// Crate-wide error type.
//
// Only the loaders and the analyzer can fail. Every ratio in the
// calculation engine resolves degenerate denominators locally instead of
// surfacing an error.
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no consumption data: the billing history is empty")]
    NoData,

    #[error("invalid config: {reason}")]
    InvalidConfig { reason: &'static str },

    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON")]
    Json(#[from] serde_json::Error),

    #[error("malformed CSV")]
    Csv(#[from] csv::Error),

    #[error("invalid consumption record #{index}: {reason}")]
    InvalidRecord { index: usize, reason: &'static str },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
