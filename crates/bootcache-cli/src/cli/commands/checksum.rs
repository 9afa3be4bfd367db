//! Checksum command: compute the fingerprint of a file.

use anyhow::Result;
use bootcache_core::checksum;
use std::path::Path;

/// Compute and print the SHA-256 fingerprint of the given file.
pub fn run_checksum(path: &Path) -> Result<()> {
    let digest = checksum::sha256_path(path)?;
    println!("{}  {}", digest, path.display());
    Ok(())
}
