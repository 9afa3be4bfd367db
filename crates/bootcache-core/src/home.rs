//! Cache root location.
//!
//! First match wins:
//! 1. an explicit user home (CLI flag or `user_home` in config) → `<home>/cache`
//! 2. `$BOOTCACHE_USER_HOME` → `<value>/cache`
//! 3. the XDG cache home → `~/.cache/bootcache`

use anyhow::Result;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Environment variable naming the user home.
pub const USER_HOME_ENV: &str = "BOOTCACHE_USER_HOME";

/// Cache subdirectory under a user home.
pub const CACHE_DIR_NAME: &str = "cache";

const APP_NAME: &str = "bootcache";

/// Resolve the cache root from an optional explicit home and the environment.
pub fn resolve_cache_dir(user_home: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = resolve_from(user_home, std::env::var_os(USER_HOME_ENV)) {
        return Ok(dir);
    }
    let xdg_dirs = xdg::BaseDirectories::new()?;
    Ok(xdg_dirs.get_cache_home().join(APP_NAME))
}

fn resolve_from(user_home: Option<&Path>, env_home: Option<OsString>) -> Option<PathBuf> {
    if let Some(home) = user_home {
        return Some(home.join(CACHE_DIR_NAME));
    }
    env_home
        .filter(|v| !v.is_empty())
        .map(|v| PathBuf::from(v).join(CACHE_DIR_NAME))
}
