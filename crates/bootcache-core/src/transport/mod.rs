//! Server transport used by the bootstrap protocol.
//!
//! The bootstrap code only depends on [`ServerConnection`]; [`CurlConnection`]
//! is the libcurl implementation used by the CLI.

mod http;

pub use http::{CurlConnection, CurlOptions};

use std::path::{Path, PathBuf};

/// Failure talking to the server. Never retried by this crate.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("invalid server URL {url:?}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("request to {url} failed")]
    Curl {
        url: String,
        #[source]
        source: curl::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Http { url: String, status: u32 },

    #[error("response from {url} is not valid UTF-8")]
    Encoding {
        url: String,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("failed to read response body from {url}")]
    Body {
        url: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Minimal view of the server: fetch text, or stream a file to disk.
///
/// `path` is relative to the server base URL and may carry a query string,
/// e.g. `/batch/file?name=cpd.jar`.
pub trait ServerConnection: Send + Sync {
    fn download_string(&self, path: &str) -> Result<String, TransportError>;

    fn download_file(&self, path: &str, dest: &Path) -> Result<(), TransportError>;
}

impl<C: ServerConnection + ?Sized> ServerConnection for &C {
    fn download_string(&self, path: &str) -> Result<String, TransportError> {
        (**self).download_string(path)
    }

    fn download_file(&self, path: &str, dest: &Path) -> Result<(), TransportError> {
        (**self).download_file(path, dest)
    }
}
