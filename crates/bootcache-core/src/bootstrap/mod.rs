//! Bootstrap protocol: fetch the artifact index, then resolve every artifact
//! through the cache.
//!
//! Exactly one index request is made per [`ArtifactSet::fetch_manifest`] and
//! exactly one file request per artifact that is not already cached. Nothing
//! is retried.

mod error;
mod manifest;


pub use error::BootstrapError;
pub use manifest::{ArtifactEntry, ArtifactManifest, FIELD_SEPARATOR};

use crate::cache::{ArtifactCache, CacheError, Downloader};
use crate::transport::ServerConnection;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Mutex, PoisonError};

/// Server paths of the two bootstrap endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Returns the index text.
    pub index_path: String,
    /// Returns one artifact; the filename is passed as the `name` query parameter.
    pub file_path: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            index_path: "/batch/index".to_string(),
            file_path: "/batch/file".to_string(),
        }
    }
}

impl Endpoints {
    /// Path (with query) serving `filename`, e.g. `/batch/file?name=cpd.jar`.
    pub fn file_request(&self, filename: &str) -> String {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("name", filename)
            .finish();
        format!("{}?{}", self.file_path, query)
    }
}

/// Downloads one artifact from the file endpoint into the cache's temp file.
#[derive(Debug)]
pub struct FileDownloader<'a, C: ?Sized> {
    connection: &'a C,
    endpoints: &'a Endpoints,
}

impl<'a, C: ServerConnection + ?Sized> FileDownloader<'a, C> {
    pub fn new(connection: &'a C, endpoints: &'a Endpoints) -> Self {
        Self {
            connection,
            endpoints,
        }
    }
}

impl<C: ServerConnection + ?Sized> Downloader for FileDownloader<'_, C> {
    fn download(&self, filename: &str, dest: &Path) -> anyhow::Result<()> {
        let path = self.endpoints.file_request(filename);
        self.connection.download_file(&path, dest)?;
        Ok(())
    }
}

/// The set of artifacts a session needs, backed by one server and one cache.
#[derive(Debug)]
pub struct ArtifactSet<C> {
    cache: ArtifactCache,
    connection: C,
    endpoints: Endpoints,
}

impl<C: ServerConnection> ArtifactSet<C> {
    pub fn new(cache: ArtifactCache, connection: C) -> Self {
        Self::with_endpoints(cache, connection, Endpoints::default())
    }

    pub fn with_endpoints(cache: ArtifactCache, connection: C, endpoints: Endpoints) -> Self {
        Self {
            cache,
            connection,
            endpoints,
        }
    }

    pub fn cache(&self) -> &ArtifactCache {
        &self.cache
    }

    pub fn connection(&self) -> &C {
        &self.connection
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Fetch and parse the index. One request, no retry.
    pub fn fetch_manifest(&self) -> Result<ArtifactManifest, BootstrapError> {
        let raw = self
            .connection
            .download_string(&self.endpoints.index_path)
            .map_err(BootstrapError::IndexUnavailable)?;
        let manifest = ArtifactManifest::parse(&raw)?;
        tracing::debug!(artifacts = manifest.len(), "bootstrap index fetched");
        Ok(manifest)
    }

    /// Resolve every entry in manifest order, downloading misses.
    pub fn resolve_all(&self, manifest: &ArtifactManifest) -> Result<Vec<PathBuf>, BootstrapError> {
        manifest
            .iter()
            .map(|entry| self.resolve(entry).map_err(BootstrapError::from))
            .collect()
    }

    /// Like [`resolve_all`](Self::resolve_all) but with up to `max_concurrent`
    /// artifacts in flight. Paths come back in manifest order; the first
    /// failure in manifest order is returned and stops queued work.
    pub fn resolve_all_parallel(
        &self,
        manifest: &ArtifactManifest,
        max_concurrent: usize,
    ) -> Result<Vec<PathBuf>, BootstrapError> {
        let count = manifest.len();
        let num_workers = max_concurrent.min(count);
        if num_workers <= 1 {
            return self.resolve_all(manifest);
        }

        let work: Mutex<VecDeque<(usize, &ArtifactEntry)>> =
            Mutex::new(manifest.iter().enumerate().collect());
        let (tx, rx) = mpsc::channel();
        std::thread::scope(|s| {
            for _ in 0..num_workers {
                let tx = tx.clone();
                let work = &work;
                s.spawn(move || loop {
                    let next = work
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .pop_front();
                    let Some((index, entry)) = next else {
                        break;
                    };
                    let res = self.resolve(entry);
                    let failed = res.is_err();
                    if tx.send((index, res)).is_err() {
                        break;
                    }
                    if failed {
                        work.lock().unwrap_or_else(PoisonError::into_inner).clear();
                        break;
                    }
                });
            }
        });
        drop(tx);

        // Work is handed out in order, so every entry before the first failure
        // has a result.
        let mut results: Vec<Option<Result<PathBuf, CacheError>>> =
            (0..count).map(|_| None).collect();
        for (index, res) in rx {
            results[index] = Some(res);
        }
        let mut paths = Vec::with_capacity(count);
        for res in results.into_iter().flatten() {
            paths.push(res?);
        }
        Ok(paths)
    }

    /// Fetch the index and resolve everything it names.
    pub fn download(&self) -> Result<Vec<PathBuf>, BootstrapError> {
        let manifest = self.fetch_manifest()?;
        self.resolve_all(&manifest)
    }

    fn resolve(&self, entry: &ArtifactEntry) -> Result<PathBuf, CacheError> {
        let downloader = FileDownloader::new(&self.connection, &self.endpoints);
        self.cache
            .get_or_download(&entry.filename, &entry.fingerprint, &downloader)
    }
}
