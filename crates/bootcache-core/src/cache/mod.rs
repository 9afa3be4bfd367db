//! Content-addressed artifact cache.
//!
//! Entries live at `<root>/<fingerprint>/<filename>`. That layout is read by
//! other tools and must not change. An entry is written at most once, through
//! a private temp file in `<root>/_tmp` and a no-clobber rename, so several
//! processes can populate the same root without locks. A path that exists is
//! trusted as verified; it is never re-hashed on lookup.

mod error;
mod placement;


pub use error::CacheError;

use crate::checksum::{FileHasher, Sha256Hasher};
use placement::{Placement, TempDownload};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory under the cache root that holds downloads in progress.
pub const TEMP_DIR_NAME: &str = "_tmp";

/// Fetches one artifact by name into `dest`.
///
/// `dest` already exists as an empty file; implementations overwrite it.
pub trait Downloader {
    fn download(&self, filename: &str, dest: &Path) -> anyhow::Result<()>;
}

impl<F> Downloader for F
where
    F: Fn(&str, &Path) -> anyhow::Result<()>,
{
    fn download(&self, filename: &str, dest: &Path) -> anyhow::Result<()> {
        self(filename, dest)
    }
}

/// The local artifact store.
pub struct ArtifactCache {
    dir: PathBuf,
    tmp_dir: PathBuf,
    hasher: Box<dyn FileHasher>,
}

impl std::fmt::Debug for ArtifactCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactCache")
            .field("dir", &self.dir)
            .finish_non_exhaustive()
    }
}

impl ArtifactCache {
    /// Open (creating if needed) a cache rooted at `dir`, using SHA-256 fingerprints.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self, CacheError> {
        Self::with_hasher(dir, Box::new(Sha256Hasher))
    }

    /// Open a cache with a custom fingerprint function.
    pub fn with_hasher(
        dir: impl Into<PathBuf>,
        hasher: Box<dyn FileHasher>,
    ) -> Result<Self, CacheError> {
        let dir = dir.into();
        let tmp_dir = dir.join(TEMP_DIR_NAME);
        fs::create_dir_all(&tmp_dir).map_err(|e| {
            CacheError::io(format!("failed to create cache dir {}", tmp_dir.display()), e)
        })?;
        tracing::debug!("artifact cache at {}", dir.display());
        Ok(ArtifactCache {
            dir,
            tmp_dir,
            hasher,
        })
    }

    /// Cache root.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path the entry for (`filename`, `fingerprint`) has or would have.
    pub fn entry_path(&self, filename: &str, fingerprint: &str) -> Result<PathBuf, CacheError> {
        validate_key("filename", filename)?;
        validate_key("fingerprint", fingerprint)?;
        if fingerprint == TEMP_DIR_NAME {
            return Err(CacheError::InvalidKey {
                kind: "fingerprint",
                value: fingerprint.to_string(),
            });
        }
        Ok(self.dir.join(fingerprint).join(filename))
    }

    /// Lookup only. Returns the entry's path if it exists; content is not re-verified.
    pub fn get(&self, filename: &str, fingerprint: &str) -> Result<Option<PathBuf>, CacheError> {
        let path = self.entry_path(filename, fingerprint)?;
        let exists = path
            .try_exists()
            .map_err(|e| CacheError::io(format!("failed to stat {}", path.display()), e))?;
        Ok(exists.then_some(path))
    }

    /// Lookup, or download, verify and store on a miss.
    ///
    /// `downloader` is only invoked on a miss. A fingerprint mismatch fails
    /// with [`CacheError::InvalidHash`] and leaves the slot empty. Losing a
    /// placement race to another writer is not an error; the path that won is
    /// returned.
    pub fn get_or_download<D>(
        &self,
        filename: &str,
        fingerprint: &str,
        downloader: &D,
    ) -> Result<PathBuf, CacheError>
    where
        D: Downloader + ?Sized,
    {
        if let Some(path) = self.get(filename, fingerprint)? {
            tracing::debug!(filename, fingerprint, "cache hit");
            return Ok(path);
        }

        let final_path = self.entry_path(filename, fingerprint)?;
        let entry_dir = self.dir.join(fingerprint);
        fs::create_dir_all(&entry_dir).map_err(|e| {
            CacheError::io(format!("failed to create {}", entry_dir.display()), e)
        })?;
        // `_tmp` may have been removed since `create`.
        fs::create_dir_all(&self.tmp_dir).map_err(|e| {
            CacheError::io(format!("failed to create {}", self.tmp_dir.display()), e)
        })?;

        let temp = TempDownload::create(&self.tmp_dir, filename)?;
        tracing::info!(
            filename,
            fingerprint,
            "downloading to {}",
            temp.path().display()
        );
        downloader
            .download(filename, temp.path())
            .map_err(|source| CacheError::Download {
                filename: filename.to_string(),
                source,
            })?;

        let actual = self
            .hasher
            .fingerprint(temp.path())
            .map_err(|source| CacheError::Hash {
                filename: filename.to_string(),
                source,
            })?;
        if actual != fingerprint {
            tracing::warn!(filename, expected = fingerprint, %actual, "hash mismatch");
            return Err(CacheError::InvalidHash {
                filename: filename.to_string(),
                expected: fingerprint.to_string(),
                actual,
            });
        }

        match temp.place(&final_path)? {
            Placement::Stored => {
                tracing::debug!("stored {}", final_path.display());
            }
            Placement::AlreadyPresent => {
                tracing::debug!("kept concurrent copy of {}", final_path.display());
            }
        }
        Ok(final_path)
    }
}

fn validate_key(kind: &'static str, value: &str) -> Result<(), CacheError> {
    let valid = !value.is_empty()
        && value != "."
        && value != ".."
        && !value.contains(['/', '\\', '\0']);
    if valid {
        Ok(())
    } else {
        Err(CacheError::InvalidKey {
            kind,
            value: value.to_string(),
        })
    }
}
