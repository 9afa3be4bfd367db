//! CLI for the bootcache artifact bootstrapper.

mod commands;

use anyhow::Result;
use bootcache_core::config::{self, BootcacheConfig};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::{run_cache_dir, run_checksum, run_fetch, run_index, run_lookup};

/// Top-level CLI for bootcache.
#[derive(Debug, Parser)]
#[command(name = "bootcache")]
#[command(about = "Fetch and cache the artifacts listed by a bootstrap server", long_about = None)]
pub struct Cli {
    /// Server base URL (overrides `server_url` in config).
    #[arg(long, global = true, value_name = "URL")]
    pub server: Option<String>,

    /// User home; the cache lives in `<DIR>/cache` (overrides config and $BOOTCACHE_USER_HOME).
    #[arg(long, global = true, value_name = "DIR")]
    pub user_home: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Fetch the bootstrap index and make sure every artifact is cached.
    Fetch {
        /// Resolve up to N artifacts concurrently (default from config).
        #[arg(long, value_name = "N")]
        jobs: Option<usize>,
    },

    /// Print the bootstrap index published by the server.
    Index {
        /// Print as JSON instead of `filename|fingerprint` lines.
        #[arg(long)]
        json: bool,
    },

    /// Print the cached path of an artifact, without downloading.
    Lookup {
        /// Artifact filename, e.g. `engine.jar`.
        filename: String,
        /// Expected fingerprint.
        fingerprint: String,
    },

    /// Compute the fingerprint (SHA-256) of a local file.
    Checksum {
        /// Path to the file.
        path: PathBuf,
    },

    /// Print the resolved cache directory.
    CacheDir,
}

impl Cli {
    /// Apply command-line overrides on top of the loaded config.
    pub fn apply_overrides(&self, cfg: &mut BootcacheConfig) {
        if let Some(server) = &self.server {
            cfg.server_url = server.clone();
        }
        if let Some(home) = &self.user_home {
            cfg.user_home = Some(home.clone());
        }
    }
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let mut cfg = config::load_or_init()?;
        cli.apply_overrides(&mut cfg);
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Fetch { jobs } => {
                let jobs = jobs.unwrap_or(cfg.max_parallel_downloads);
                run_fetch(cfg, jobs).await?;
            }
            CliCommand::Index { json } => run_index(cfg, json).await?,
            CliCommand::Lookup {
                filename,
                fingerprint,
            } => run_lookup(&cfg, &filename, &fingerprint)?,
            CliCommand::Checksum { path } => run_checksum(&path)?,
            CliCommand::CacheDir => run_cache_dir(&cfg)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
