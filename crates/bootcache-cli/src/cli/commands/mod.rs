//! CLI command handlers. Each command is in its own file.

mod cache_dir;
mod checksum;
mod fetch;
mod index;
mod lookup;

pub use cache_dir::run_cache_dir;
pub use checksum::run_checksum;
pub use fetch::run_fetch;
pub use index::run_index;
pub use lookup::run_lookup;

use anyhow::{Context, Result};
use bootcache_core::bootstrap::ArtifactSet;
use bootcache_core::cache::ArtifactCache;
use bootcache_core::config::BootcacheConfig;
use bootcache_core::home;
use bootcache_core::transport::CurlConnection;

/// Open the cache configured by `cfg`.
fn open_cache(cfg: &BootcacheConfig) -> Result<ArtifactCache> {
    let dir = home::resolve_cache_dir(cfg.user_home.as_deref())?;
    ArtifactCache::create(&dir).with_context(|| format!("open cache at {}", dir.display()))
}

/// Cache plus a curl connection to the configured server.
fn open_artifact_set(cfg: &BootcacheConfig) -> Result<ArtifactSet<CurlConnection>> {
    let cache = open_cache(cfg)?;
    let conn = CurlConnection::new(&cfg.server_url, cfg.curl_options())?;
    Ok(ArtifactSet::new(cache, conn))
}
