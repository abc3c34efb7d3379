use super::{Mapping, Source, document, project};
use crate::error::SourceError;
use crate::keys::KeySet;
use std::time::Duration;
use tracing::debug;

/// Timeout applied to a remote fetch unless overridden
pub const REMOTE_TIMEOUT: Duration = Duration::from_secs(10);

/// A JSON document fetched with an HTTP GET
///
/// Only a success status is accepted; anything else fails the load.
#[derive(Debug, Clone)]
pub struct RemoteFile {
    url: String,
    timeout: Duration,
}

impl RemoteFile {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: REMOTE_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn fetch(&self) -> Result<Vec<u8>, SourceError> {
        let request_error = |source| SourceError::Request {
            url: self.url.clone(),
            source,
        };

        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(request_error)?;

        let response = client.get(&self.url).send().map_err(request_error)?;
        let status = response.status();
        debug!(url = %self.url, status = status.as_u16(), "remote config fetched");

        if !status.is_success() {
            return Err(SourceError::Status {
                url: self.url.clone(),
                status,
            });
        }

        let body = response.bytes().map_err(request_error)?;
        Ok(body.to_vec())
    }
}

impl Source for RemoteFile {
    fn name(&self) -> String {
        format!("remote {}", self.url)
    }

    fn resolve(&self, keys: &KeySet) -> Result<Mapping, SourceError> {
        let body = self.fetch()?;
        let parsed = document::parse_document(&body, &self.url)?;

        Ok(project(&document::flatten(&parsed), keys))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetches_and_projects() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/config.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"ValString":"remote_value","ValSlice":["item1","item2"],"Extra":1}"#)
            .create();

        let keys: KeySet = ["ValString", "ValSlice"].into_iter().collect();
        let found = RemoteFile::new(format!("{}/config.json", server.url()))
            .resolve(&keys)
            .unwrap();

        mock.assert();
        assert_eq!(found.len(), 2);
        assert_eq!(found["ValString"], "remote_value");
        assert_eq!(found["ValSlice"], "item1,item2");
    }

    #[test]
    fn test_non_success_status_fails() {
        let mut server = mockito::Server::new();
        let _mock = server.mock("GET", "/config.json").with_status(503).create();

        let err = RemoteFile::new(format!("{}/config.json", server.url()))
            .resolve(&KeySet::new())
            .unwrap_err();

        assert!(matches!(
            err,
            SourceError::Status { status, .. } if status == reqwest::StatusCode::SERVICE_UNAVAILABLE
        ));
    }

    #[test]
    fn test_malformed_body_fails() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/config.json")
            .with_status(200)
            .with_body("<html>oops</html>")
            .create();

        let err = RemoteFile::new(format!("{}/config.json", server.url()))
            .resolve(&KeySet::new())
            .unwrap_err();

        assert!(matches!(err, SourceError::Parse { .. }));
    }

    #[test]
    fn test_unreachable_host_fails() {
        let err = RemoteFile::new("http://127.0.0.1:1/config.json")
            .with_timeout(Duration::from_secs(1))
            .resolve(&KeySet::new())
            .unwrap_err();

        assert!(matches!(err, SourceError::Request { .. }));
    }

    #[test]
    fn test_default_timeout() {
        let remote = RemoteFile::new("http://localhost/config.json");
        assert_eq!(remote.timeout, Duration::from_secs(10));
        assert_eq!(remote.url(), "http://localhost/config.json");
    }
}
