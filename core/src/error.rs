use std::path::PathBuf;
use thiserror::Error;

/// Failures from the persisted vocabulary/link-graph stores.
///
/// An absent store file is not an error: loads return the empty value for
/// that case. `Corrupt` is kept distinct so a damaged store never silently
/// degrades into an empty index masking data loss.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("store {path} exists but cannot be deserialized: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: bincode::Error,
    },

    #[error("meta encode error: {0}")]
    Meta(#[from] serde_json::Error),
}

impl StoreError {
    pub fn is_corrupt(&self) -> bool {
        matches!(self, StoreError::Corrupt { .. })
    }
}
