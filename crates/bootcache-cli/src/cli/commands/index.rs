//! `bootcache index` – show the bootstrap index.

use super::open_artifact_set;
use anyhow::Result;
use bootcache_core::bootstrap::FIELD_SEPARATOR;
use bootcache_core::config::BootcacheConfig;

pub async fn run_index(cfg: BootcacheConfig, json: bool) -> Result<()> {
    let manifest = tokio::task::spawn_blocking(move || -> Result<_> {
        let set = open_artifact_set(&cfg)?;
        Ok(set.fetch_manifest()?)
    })
    .await??;

    if json {
        println!("{}", serde_json::to_string_pretty(&manifest)?);
    } else {
        for entry in &manifest {
            println!("{}{}{}", entry.filename, FIELD_SEPARATOR, entry.fingerprint);
        }
    }
    Ok(())
}
