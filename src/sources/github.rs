//! GitHub contents API client for the watched build definition.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::sources::error::SourceError;

/// Default base URL for the GitHub API
pub const DEFAULT_BASE_URL: &str = "https://api.github.com";

/// Response from the contents API
#[derive(Debug, Deserialize)]
struct ContentsResponse {
    /// Base64 with newlines sprinkled in every 60 columns
    content: String,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    message: String,
}

/// Fetches the raw build definition text out of the watched repository.
pub struct BuildDefinitionClient {
    client: reqwest::Client,
    base_url: String,
    organization: String,
    repository: String,
}

impl BuildDefinitionClient {
    pub fn new(base_url: &str, organization: &str, repository: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("release-sentinel")
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.to_string(),
            organization: organization.to_string(),
            repository: repository.to_string(),
        }
    }

    pub async fn fetch_build_definition(&self) -> Result<String, SourceError> {
        let url = format!(
            "{}/repos/{}/{}/contents/.travis.yml",
            self.base_url, self.organization, self.repository
        );
        debug!("Fetching build definition: {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if status.is_client_error() {
            let message = response
                .json::<ApiMessage>()
                .await
                .map(|body| body.message)
                .unwrap_or_else(|_| "4xx error".to_string());
            return Err(SourceError::Client {
                status: status.as_u16(),
                message,
            });
        }
        if status.is_server_error() {
            return Err(SourceError::Unreachable(self.base_url.clone()));
        }
        if !status.is_success() {
            warn!("GitHub API returned status {}: {}", status, url);
            return Err(SourceError::InvalidResponse(format!(
                "Unexpected status: {status}"
            )));
        }

        let contents: ContentsResponse = response
            .json()
            .await
            .map_err(|error| SourceError::InvalidResponse(error.to_string()))?;
        decode_content(&contents.content)
    }
}

fn decode_content(content: &str) -> Result<String, SourceError> {
    let compact: String = content.split('\n').collect();
    let bytes = STANDARD
        .decode(compact.trim())
        .map_err(|error| SourceError::InvalidResponse(error.to_string()))?;
    String::from_utf8(bytes).map_err(|error| SourceError::InvalidResponse(error.to_string()))
}
