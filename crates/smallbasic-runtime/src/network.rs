//! The `Network` class.
//!
//! Requests block the calling thread until the whole body has arrived and
//! cannot be cancelled.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;

use ureq::{Agent, AgentBuilder};

use crate::config::RuntimeConfig;
use crate::error::{RuntimeError, RuntimeResult};

pub struct Network {
    agent: Agent,
}

impl Network {
    pub fn new(config: &RuntimeConfig) -> Self {
        let agent = AgentBuilder::new()
            .timeout(Duration::from_millis(config.http_timeout_ms))
            .user_agent(&config.user_agent)
            .build();
        Self { agent }
    }

    fn get(&self, url: &str) -> RuntimeResult<ureq::Response> {
        tracing::debug!(url, "HTTP GET");
        let response = self.agent.get(url).call().map_err(|e| {
            tracing::warn!(url, error = %e, "HTTP request failed");
            RuntimeError::network(format!("{url}: {e}"))
        })?;
        Ok(response)
    }

    /// Body of the page at `url` as text
    pub fn get_web_page_contents(&self, url: &str) -> RuntimeResult<String> {
        self.get(url)?
            .into_string()
            .map_err(|e| RuntimeError::network(format!("{url}: {e}")))
    }

    /// Raw body bytes of `url`
    pub fn get_bytes(&self, url: &str) -> RuntimeResult<Vec<u8>> {
        let mut bytes = Vec::new();
        self.get(url)?
            .into_reader()
            .read_to_end(&mut bytes)
            .map_err(|e| RuntimeError::network(format!("{url}: {e}")))?;
        Ok(bytes)
    }

    /// Streams the body of `url` into a new file at `path`
    pub fn download_file(&self, path: impl AsRef<Path>, url: &str) -> RuntimeResult<PathBuf> {
        let response = self.get(url)?;
        let path = path.as_ref();
        let mut file = File::create(path)?;
        let written = io::copy(&mut response.into_reader(), &mut file)?;
        tracing::info!(url, path = %path.display(), bytes = written, "Downloaded file");
        Ok(path.to_path_buf())
    }
}

/// Whether `location` is an absolute http(s) URL rather than a file path
pub fn is_web_url(location: &str) -> bool {
    let lower = location.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_get_web_page_contents() {
        let (url, server) = test_server::serve(200, b"<html>hi</html>".to_vec(), 1);
        let network = Network::new(&RuntimeConfig::default());
        assert_eq!(network.get_web_page_contents(&url).unwrap(), "<html>hi</html>");
        server.join().unwrap();
    }

    #[test]
    fn test_download_file() {
        let (url, server) = test_server::serve(200, vec![1, 2, 3, 4], 1);
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("blob.bin");
        let network = Network::new(&RuntimeConfig::default());
        let saved = network.download_file(&target, &format!("{url}/blob")).unwrap();
        assert_eq!(saved, target);
        assert_eq!(std::fs::read(&target).unwrap(), [1, 2, 3, 4]);
        server.join().unwrap();
    }

    #[test]
    fn test_error_status_is_network_error() {
        let (url, server) = test_server::serve(404, b"missing".to_vec(), 1);
        let network = Network::new(&RuntimeConfig::default());
        let err = network.get_web_page_contents(&url).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Network(_)));
        server.join().unwrap();
    }

    #[test]
    fn test_is_web_url() {
        assert!(is_web_url("https://example.com/a.png"));
        assert!(is_web_url("HTTP://example.com"));
        assert!(!is_web_url("/tmp/a.png"));
        assert!(!is_web_url("C:\\pictures\\a.png"));
    }
}
