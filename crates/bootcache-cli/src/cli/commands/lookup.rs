//! `bootcache lookup` – cache lookup only, never downloads.

use super::open_cache;
use anyhow::Result;
use bootcache_core::config::BootcacheConfig;

pub fn run_lookup(cfg: &BootcacheConfig, filename: &str, fingerprint: &str) -> Result<()> {
    let cache = open_cache(cfg)?;
    match cache.get(filename, fingerprint)? {
        Some(path) => {
            println!("{}", path.display());
            Ok(())
        }
        None => anyhow::bail!("{} ({}) is not cached", filename, fingerprint),
    }
}
