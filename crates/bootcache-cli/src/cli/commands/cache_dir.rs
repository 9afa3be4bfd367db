use anyhow::Result;
use bootcache_core::config::BootcacheConfig;
use bootcache_core::home;

pub fn run_cache_dir(cfg: &BootcacheConfig) -> Result<()> {
    let dir = home::resolve_cache_dir(cfg.user_home.as_deref())?;
    println!("{}", dir.display());
    Ok(())
}
