use crate::transport::CurlOptions;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Global configuration loaded from `~/.config/bootcache/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BootcacheConfig {
    /// Base URL of the server publishing the bootstrap index.
    pub server_url: String,
    /// User home; the cache lives in `<user_home>/cache`. Falls back to
    /// `$BOOTCACHE_USER_HOME`, then the XDG cache dir.
    pub user_home: Option<PathBuf>,
    /// Connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Whole-request timeout in seconds (index or one artifact).
    pub timeout_secs: u64,
    /// Overrides the default `bootcache/<version>` User-Agent.
    pub user_agent: Option<String>,
    /// Artifacts resolved concurrently (1 = sequential).
    pub max_parallel_downloads: usize,
    /// Extra headers sent with every request (e.g. `Authorization`).
    pub headers: BTreeMap<String, String>,
}

impl Default for BootcacheConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:9000".to_string(),
            user_home: None,
            connect_timeout_secs: 30,
            timeout_secs: 600,
            user_agent: None,
            max_parallel_downloads: 1,
            headers: BTreeMap::new(),
        }
    }
}

impl BootcacheConfig {
    /// curl settings derived from this config.
    pub fn curl_options(&self) -> CurlOptions {
        let mut opts = CurlOptions {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            timeout: Duration::from_secs(self.timeout_secs),
            headers: self.headers.clone(),
            ..CurlOptions::default()
        };
        if let Some(ua) = &self.user_agent {
            opts.user_agent = ua.clone();
        }
        opts
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("bootcache")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<BootcacheConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = BootcacheConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: BootcacheConfig = toml::from_str(&data)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = BootcacheConfig::default();
        assert_eq!(cfg.server_url, "http://localhost:9000");
        assert!(cfg.user_home.is_none());
        assert_eq!(cfg.connect_timeout_secs, 30);
        assert_eq!(cfg.timeout_secs, 600);
        assert_eq!(cfg.max_parallel_downloads, 1);
        assert!(cfg.headers.is_empty());
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = BootcacheConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: BootcacheConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn config_toml_partial_uses_defaults() {
        let toml = r#"
            server_url = "https://artifacts.example.com"
        "#;
        let cfg: BootcacheConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.server_url, "https://artifacts.example.com");
        assert_eq!(cfg.timeout_secs, 600);
        assert!(cfg.user_agent.is_none());
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            server_url = "https://artifacts.example.com/engine"
            user_home = "/srv/bootcache"
            connect_timeout_secs = 5
            timeout_secs = 120
            user_agent = "ci-runner/2"
            max_parallel_downloads = 4

            [headers]
            Authorization = "Bearer xyz"
        "#;
        let cfg: BootcacheConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.user_home, Some(PathBuf::from("/srv/bootcache")));
        assert_eq!(cfg.max_parallel_downloads, 4);

        let opts = cfg.curl_options();
        assert_eq!(opts.connect_timeout, Duration::from_secs(5));
        assert_eq!(opts.timeout, Duration::from_secs(120));
        assert_eq!(opts.user_agent, "ci-runner/2");
        assert_eq!(opts.headers.get("Authorization").unwrap(), "Bearer xyz");
    }

    #[test]
    fn curl_options_keep_default_user_agent() {
        let opts = BootcacheConfig::default().curl_options();
        assert!(opts.user_agent.starts_with("bootcache/"));
    }
}
