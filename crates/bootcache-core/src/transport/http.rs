//! libcurl-backed [`ServerConnection`].
//!
//! Each request is a single blocking GET with redirects followed. Non-2xx
//! responses are errors. Call from `spawn_blocking` if used from async code.

use super::{ServerConnection, TransportError};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Per-connection curl settings.
#[derive(Debug, Clone)]
pub struct CurlOptions {
    pub connect_timeout: Duration,
    /// Whole-request timeout.
    pub timeout: Duration,
    pub user_agent: String,
    /// Extra request headers, e.g. an `Authorization` token.
    pub headers: BTreeMap<String, String>,
}

impl Default for CurlOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            timeout: Duration::from_secs(600),
            user_agent: format!("bootcache/{}", env!("CARGO_PKG_VERSION")),
            headers: BTreeMap::new(),
        }
    }
}

/// Connection to one server, identified by its base URL.
#[derive(Debug, Clone)]
pub struct CurlConnection {
    base_url: String,
    options: CurlOptions,
}

impl CurlConnection {
    /// `base_url` is the server root, e.g. `https://artifacts.example.com/engine`.
    pub fn new(base_url: &str, options: CurlOptions) -> Result<Self, TransportError> {
        let trimmed = base_url.trim_end_matches('/');
        Url::parse(trimmed).map_err(|source| TransportError::InvalidUrl {
            url: base_url.to_string(),
            source,
        })?;
        Ok(CurlConnection {
            base_url: trimmed.to_string(),
            options,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an endpoint path such as `/batch/index`.
    pub fn url_for(&self, path: &str) -> Result<Url, TransportError> {
        let joined = if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        };
        Url::parse(&joined).map_err(|source| TransportError::InvalidUrl {
            url: joined.clone(),
            source,
        })
    }

    fn easy(&self, url: &Url) -> Result<curl::easy::Easy, TransportError> {
        let curl_err = |source| TransportError::Curl {
            url: url.to_string(),
            source,
        };
        let mut easy = curl::easy::Easy::new();
        easy.url(url.as_str()).map_err(curl_err)?;
        easy.follow_location(true).map_err(curl_err)?;
        easy.max_redirections(10).map_err(curl_err)?;
        easy.connect_timeout(self.options.connect_timeout)
            .map_err(curl_err)?;
        easy.timeout(self.options.timeout).map_err(curl_err)?;
        easy.useragent(&self.options.user_agent).map_err(curl_err)?;

        if !self.options.headers.is_empty() {
            let mut list = curl::easy::List::new();
            for (k, v) in &self.options.headers {
                list.append(&format!("{}: {}", k.trim(), v.trim()))
                    .map_err(curl_err)?;
            }
            easy.http_headers(list).map_err(curl_err)?;
        }
        Ok(easy)
    }

    /// GET `path`, handing each body chunk to `sink`.
    ///
    /// A sink error aborts the transfer and is returned as-is so callers can
    /// attach the path they were writing.
    fn get(
        &self,
        path: &str,
        sink: &mut dyn FnMut(&[u8]) -> io::Result<()>,
    ) -> Result<Result<(), io::Error>, TransportError> {
        let url = self.url_for(path)?;
        let mut easy = self.easy(&url)?;
        let curl_err = |source| TransportError::Curl {
            url: url.to_string(),
            source,
        };

        let mut sink_error: Option<io::Error> = None;
        let performed = {
            let mut transfer = easy.transfer();
            transfer
                .write_function(|data| match sink(data) {
                    Ok(()) => Ok(data.len()),
                    Err(e) => {
                        sink_error = Some(e);
                        Ok(0) // abort transfer
                    }
                })
                .map_err(curl_err)?;
            transfer.perform()
        };
        if let Some(e) = sink_error {
            return Ok(Err(e));
        }
        performed.map_err(curl_err)?;

        let status = easy.response_code().map_err(curl_err)?;
        if !(200..300).contains(&status) {
            return Err(TransportError::Http {
                url: url.to_string(),
                status,
            });
        }
        tracing::debug!("GET {} -> {}", url, status);
        Ok(Ok(()))
    }
}

impl ServerConnection for CurlConnection {
    fn download_string(&self, path: &str) -> Result<String, TransportError> {
        let url = || format!("{}{}", self.base_url, path);
        let mut body = Vec::new();
        self.get(path, &mut |data: &[u8]| -> io::Result<()> {
            body.try_reserve(data.len())
                .map_err(|e| io::Error::new(io::ErrorKind::OutOfMemory, e))?;
            body.extend_from_slice(data);
            Ok(())
        })?
        .map_err(|source| TransportError::Body { url: url(), source })?;
        String::from_utf8(body).map_err(|source| TransportError::Encoding { url: url(), source })
    }

    fn download_file(&self, path: &str, dest: &Path) -> Result<(), TransportError> {
        let io_err = |source| TransportError::Io {
            path: dest.to_path_buf(),
            source,
        };
        let file = File::create(dest).map_err(io_err)?;
        let mut out = BufWriter::new(file);
        self.get(path, &mut |data: &[u8]| out.write_all(data))?
            .map_err(io_err)?;
        let file = out.into_inner().map_err(|e| io_err(e.into_error()))?;
        file.sync_all().map_err(io_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_for_joins_paths_onto_base() {
        let conn = CurlConnection::new("https://host.example/engine/", CurlOptions::default())
            .unwrap();
        assert_eq!(conn.base_url(), "https://host.example/engine");
        assert_eq!(
            conn.url_for("/batch/index").unwrap().as_str(),
            "https://host.example/engine/batch/index"
        );
        assert_eq!(
            conn.url_for("batch/file?name=cpd.jar").unwrap().as_str(),
            "https://host.example/engine/batch/file?name=cpd.jar"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = CurlConnection::new("not a url", CurlOptions::default()).unwrap_err();
        assert!(matches!(err, TransportError::InvalidUrl { .. }));
    }

    #[test]
    fn default_user_agent_names_the_crate() {
        let opts = CurlOptions::default();
        assert!(opts.user_agent.starts_with("bootcache/"));
        assert!(opts.headers.is_empty());
    }

    #[test]
    fn body_error_names_the_url() {
        let err = TransportError::Body {
            url: "http://host.example/batch/index".to_string(),
            source: io::Error::new(io::ErrorKind::OutOfMemory, "no room"),
        };
        assert_eq!(
            err.to_string(),
            "failed to read response body from http://host.example/batch/index"
        );
        assert!(std::error::Error::source(&err).is_some());
    }
}
