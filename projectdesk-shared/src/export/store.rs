/// Object storage.

use super::ExportError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

const UPLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Stores a blob under `key` and returns a URL it can be fetched from.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, key: &str, content_type: &str, body: Vec<u8>) -> Result<String, ExportError>;
}

/// Uploads with `PUT {endpoint}/{bucket}/{key}`.
///
/// Works against any S3-compatible gateway that accepts bearer tokens or an
/// unauthenticated bucket.
#[derive(Debug, Clone)]
pub struct HttpObjectStore {
    client: Client,
    endpoint: String,
    bucket: String,
    access_token: Option<String>,
}

impl HttpObjectStore {
    /// Fails when the HTTP client cannot be built, e.g. when the TLS
    /// backend does not initialise.
    pub fn new(endpoint: &str, bucket: &str, access_token: Option<String>) -> Result<Self, ExportError> {
        let client = Client::builder().timeout(UPLOAD_TIMEOUT).build()?;

        Ok(Self {
            client,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            bucket: bucket.trim_matches('/').to_string(),
            access_token,
        })
    }

    pub fn url_for(&self, key: &str) -> String {
        format!("{}/{}/{}", self.endpoint, self.bucket, key.trim_start_matches('/'))
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn put(&self, key: &str, content_type: &str, body: Vec<u8>) -> Result<String, ExportError> {
        let url = self.url_for(key);
        let size = body.len();

        let mut request = self
            .client
            .put(&url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(body);
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ExportError::Upload(format!(
                "HTTP {} - {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        tracing::info!(url = %url, bytes = size, "Uploaded object");
        Ok(url)
    }
}

/// Used when no storage endpoint is configured; every upload fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledStore;

#[async_trait]
impl ObjectStore for DisabledStore {
    async fn put(&self, _key: &str, _content_type: &str, _body: Vec<u8>) -> Result<String, ExportError> {
        Err(ExportError::NotConfigured)
    }
}
