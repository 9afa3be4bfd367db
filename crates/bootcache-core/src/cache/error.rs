//! Cache error type.

use std::io;

/// Error returned by [`ArtifactCache`](super::ArtifactCache) operations.
///
/// A failed populate never leaves anything at the entry's final path, so every
/// variant leaves the slot absent and a later call retries from scratch.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Filename or fingerprint is not usable as a single path component.
    #[error("invalid {kind} {value:?}: must be a single non-empty path component")]
    InvalidKey { kind: &'static str, value: String },

    /// The caller-supplied downloader failed.
    #[error("failed to download {filename}")]
    Download {
        filename: String,
        #[source]
        source: anyhow::Error,
    },

    /// The downloaded file could not be read back for hashing.
    #[error("failed to compute hash of {filename}")]
    Hash {
        filename: String,
        #[source]
        source: anyhow::Error,
    },

    /// Downloaded bytes do not match the expected fingerprint.
    #[error("invalid hash for {filename}: expected {expected}, got {actual}")]
    InvalidHash {
        filename: String,
        expected: String,
        actual: String,
    },

    /// Creating directories, temp files or the final placement failed.
    #[error("{context}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },
}

impl CacheError {
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        CacheError::Io {
            context: context.into(),
            source,
        }
    }
}
