//! Content fingerprints for cached artifacts.
//!
//! A fingerprint is the lowercase hex SHA-256 digest of a file. The cache only
//! ever compares fingerprint strings; it never interprets them.

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;

const BUF_SIZE: usize = 64 * 1024;

/// Computes the fingerprint of a local file.
///
/// Implementations must be deterministic: the same bytes always produce the
/// same string, and that string must match what the bootstrap index publishes.
pub trait FileHasher: Send + Sync {
    fn fingerprint(&self, path: &Path) -> Result<String>;
}

/// Default hasher: lowercase hex SHA-256.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl FileHasher for Sha256Hasher {
    fn fingerprint(&self, path: &Path) -> Result<String> {
        sha256_path(path)
    }
}

/// Compute SHA-256 of a file and return the digest as lowercase hex.
/// Reads in chunks to keep memory use bounded; suitable for large files.
pub fn sha256_path(path: &Path) -> Result<String> {
    let mut f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; BUF_SIZE];
    loop {
        let n = f
            .read(&mut buf)
            .with_context(|| format!("read {}", path.display()))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn sha256_path_empty_file() {
        let f = tempfile::NamedTempFile::new().unwrap();
        let digest = sha256_path(f.path()).unwrap();
        assert_eq!(
            digest,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn sha256_path_known_content() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"hello\n").unwrap();
        f.flush().unwrap();
        let digest = Sha256Hasher.fingerprint(f.path()).unwrap();
        assert_eq!(
            digest,
            "5891b5b522d5df086d0ff0b110fbd9d21bb4fc7163af34d08286a2e846f6be03"
        );
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = sha256_path(&dir.path().join("absent.jar")).unwrap_err();
        assert!(format!("{:#}", err).contains("absent.jar"));
    }

    #[test]
    fn same_bytes_same_fingerprint() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.jar");
        let b = dir.path().join("b.jar");
        std::fs::write(&a, b"payload").unwrap();
        std::fs::write(&b, b"payload").unwrap();
        assert_eq!(sha256_path(&a).unwrap(), sha256_path(&b).unwrap());
    }
}
