//! Docker Store client for the set of published image versions.

use std::collections::HashSet;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::sources::error::SourceError;
use crate::version::semver::SemanticVersion;

/// Default base URL for the Docker Store API
pub const DEFAULT_BASE_URL: &str = "https://store.docker.com";

#[derive(Debug, Deserialize)]
struct ImageDescription {
    full_description: String,
}

/// Derives the published versions of an image from its free-text
/// description.
pub struct DockerStoreClient {
    client: reqwest::Client,
    base_url: String,
}

impl DockerStoreClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("release-sentinel")
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.to_string(),
        }
    }

    /// Fetches the set of versions an image has been published for.
    ///
    /// Hyphenated tags are pre-releases and are filtered out before
    /// parsing, so the returned set only ever contains stable versions.
    pub async fn fetch_dockerized_versions(
        &self,
        image: &str,
    ) -> Result<HashSet<SemanticVersion>, SourceError> {
        let url = format!(
            "{}/api/content/v1/products/images/{}",
            self.base_url, image
        );
        debug!("Fetching image description: {}", url);

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if status.is_client_error() {
            return Err(SourceError::Client {
                status: status.as_u16(),
                message: "4xx error".to_string(),
            });
        }
        if status.is_server_error() {
            return Err(SourceError::Unreachable(self.base_url.clone()));
        }
        if !status.is_success() {
            warn!("Docker Store returned status {}: {}", status, url);
            return Err(SourceError::InvalidResponse(format!(
                "Unexpected status: {status}"
            )));
        }

        let description: ImageDescription = response
            .json()
            .await
            .map_err(|error| SourceError::InvalidResponse(error.to_string()))?;

        Ok(SemanticVersion::extract_all(&description.full_description, |raw| {
            !raw.contains('-')
        })
        .into_iter()
        .collect())
    }
}
