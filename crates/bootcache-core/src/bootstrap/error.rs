//! Errors surfaced by bootstrap resolution.

use crate::cache::CacheError;
use crate::transport::TransportError;

/// Any failure aborts the whole bootstrap; there is no partial-success mode.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// The index endpoint could not be reached or answered with an error.
    #[error("cannot retrieve bootstrap index from server")]
    IndexUnavailable(#[source] TransportError),

    /// The index body is not a list of `filename|fingerprint` lines.
    #[error("malformed bootstrap index (line {line}), index was:\n{raw}")]
    MalformedIndex { line: usize, raw: String },

    /// One artifact could not be downloaded, verified or stored.
    #[error(transparent)]
    Artifact(#[from] CacheError),
}
