//! `bootcache fetch` – resolve every artifact in the bootstrap index.

use super::open_artifact_set;
use anyhow::Result;
use bootcache_core::config::BootcacheConfig;

/// Fetch the index and resolve all artifacts, printing one cached path per line.
/// Downloads and hashing block, so the whole run happens on the blocking pool.
pub async fn run_fetch(cfg: BootcacheConfig, jobs: usize) -> Result<()> {
    let paths = tokio::task::spawn_blocking(move || -> Result<_> {
        let set = open_artifact_set(&cfg)?;
        let manifest = set.fetch_manifest()?;
        tracing::info!(
            artifacts = manifest.len(),
            jobs,
            "resolving artifacts from {}",
            set.connection().base_url()
        );
        Ok(set.resolve_all_parallel(&manifest, jobs)?)
    })
    .await??;

    for p in paths {
        println!("{}", p.display());
    }
    Ok(())
}
