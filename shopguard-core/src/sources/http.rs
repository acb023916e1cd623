//! Permission service client
//!
//! Issues `GET {base_url}{path}` where `{actor}` in the path template is
//! replaced by the URL-encoded actor id, optionally with a bearer token.

use super::{decode_snapshot, PermissionSource};
use crate::config::SourceConfig;
use crate::error::FetchError;
use crate::permissions::ActorSnapshot;
use std::time::Duration;

/// Default path on the permission service
pub const DEFAULT_PATH_TEMPLATE: &str = "/actors/{actor}/permissions";

/// HTTP permission source
#[derive(Clone)]
pub struct HttpPermissionSource {
    client: reqwest::Client,

    /// Service root, e.g. "https://admin-api.example.com/v1"
    base_url: String,

    /// Path appended to the base url, containing `{actor}`
    path_template: String,

    /// Bearer token sent with every request
    token: Option<String>,
}

impl HttpPermissionSource {
    /// Create a source with a 10 second timeout
    pub fn new(base_url: impl Into<String>) -> Result<Self, FetchError> {
        Self::with_timeout(base_url, Duration::from_secs(10))
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            path_template: DEFAULT_PATH_TEMPLATE.to_string(),
            token: None,
        })
    }

    pub fn from_config(config: &SourceConfig) -> Result<Self, FetchError> {
        let mut source =
            Self::with_timeout(&config.base_url, Duration::from_secs(config.timeout_secs))?
                .with_path_template(&config.path_template);
        if let Some(token) = &config.token {
            source = source.with_token(token);
        }
        Ok(source)
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_path_template(mut self, template: impl Into<String>) -> Self {
        let template = template.into();
        self.path_template =
            if template.starts_with('/') { template } else { format!("/{}", template) };
        self
    }

    /// Full request URL for `actor_id`
    pub fn endpoint(&self, actor_id: &str) -> String {
        let path = self.path_template.replace("{actor}", &urlencoding::encode(actor_id));
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait::async_trait]
impl PermissionSource for HttpPermissionSource {
    async fn fetch(&self, actor_id: &str) -> Result<ActorSnapshot, FetchError> {
        let url = self.endpoint(actor_id);
        log::debug!("Fetching permissions for {} from {}", actor_id, url);

        let mut request = self.client.get(&url).header("Accept", "application/json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::Transport(format!("GET {} failed: {}", url, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            return Err(FetchError::Status { status: status.as_u16(), body });
        }

        decode_snapshot(&body, actor_id)
    }

    fn name(&self) -> &str {
        "http"
    }
}
