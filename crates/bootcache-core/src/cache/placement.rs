//! Private temp files and atomic placement into the cache.
//!
//! Every download attempt gets its own uniquely named file under
//! `<root>/_tmp`. The file is removed when the attempt is dropped, whether it
//! failed or lost a placement race. Placement is a no-clobber rename on the
//! same filesystem, so a reader sees the final path either absent or complete.

use super::CacheError;
use std::path::Path;
use tempfile::NamedTempFile;

/// Longest slice of the artifact filename used in a temp name. Leaves room
/// for the random part and `.part` suffix within a 255-byte component.
const TEMP_PREFIX_MAX: usize = 64;

/// Outcome of placing a verified temp file at its final path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Placement {
    /// Our file is now at the final path.
    Stored,
    /// Someone else populated the final path first; our copy was discarded.
    AlreadyPresent,
}

/// A download in progress. Owned exclusively by one `get_or_download` call.
pub(crate) struct TempDownload {
    file: NamedTempFile,
}

impl TempDownload {
    /// Create a fresh temp file in `tmp_dir`, e.g. `_tmp/cpd.jar.Xa81Qz.part`.
    ///
    /// Long filenames are truncated in the temp name only.
    pub(crate) fn create(tmp_dir: &Path, filename: &str) -> Result<Self, CacheError> {
        let file = tempfile::Builder::new()
            .prefix(&format!("{}.", temp_prefix(filename)))
            .suffix(".part")
            .tempfile_in(tmp_dir)
            .map_err(|e| {
                CacheError::io(
                    format!("failed to create temp file in {}", tmp_dir.display()),
                    e,
                )
            })?;
        Ok(TempDownload { file })
    }

    pub(crate) fn path(&self) -> &Path {
        self.file.path()
    }

    /// Sync and rename to `final_path` without overwriting.
    ///
    /// If `final_path` already exists afterwards, the race is treated as
    /// success and our copy is deleted.
    pub(crate) fn place(self, final_path: &Path) -> Result<Placement, CacheError> {
        self.file.as_file().sync_all().map_err(|e| {
            CacheError::io(format!("failed to sync {}", self.file.path().display()), e)
        })?;

        match self.file.persist_noclobber(final_path) {
            Ok(_) => Ok(Placement::Stored),
            Err(err) => {
                // Dropping `err.file` removes our temp copy.
                let temp_path = err.file.path().to_path_buf();
                if final_path.exists() {
                    tracing::debug!(
                        temp = %temp_path.display(),
                        "{} was populated concurrently, discarding our copy",
                        final_path.display()
                    );
                    return Ok(Placement::AlreadyPresent);
                }
                Err(CacheError::io(
                    format!(
                        "failed to move {} to {}",
                        temp_path.display(),
                        final_path.display()
                    ),
                    err.error,
                ))
            }
        }
    }
}

fn temp_prefix(filename: &str) -> &str {
    if filename.len() <= TEMP_PREFIX_MAX {
        return filename;
    }
    let mut end = TEMP_PREFIX_MAX;
    while !filename.is_char_boundary(end) {
        end -= 1;
    }
    &filename[..end]
}
