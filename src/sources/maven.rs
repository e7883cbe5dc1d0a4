//! Maven Central search client for candidate artifact versions.

use serde::{Deserialize, Deserializer};
use tracing::{debug, warn};

use crate::config::MavenCoordinates;
use crate::sources::error::SourceError;
use crate::version::semver::SemanticVersion;

/// Default base URL for the Maven Central search API
pub const DEFAULT_BASE_URL: &str = "https://search.maven.org";

#[derive(Debug, Deserialize)]
struct SearchResult {
    response: Option<SearchResponse>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    docs: Option<Vec<MavenArtifact>>,
}

/// One artifact row returned by the search API. Rows with a version that
/// does not follow the semantic grammar deserialize with `version: None`
/// and are dropped by the reconciler.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MavenArtifact {
    #[serde(rename = "g")]
    pub group_id: String,
    #[serde(rename = "a")]
    pub artifact_id: String,
    #[serde(rename = "v", deserialize_with = "lenient_version", default)]
    pub version: Option<SemanticVersion>,
    #[serde(rename = "p")]
    pub packaging: String,
    #[serde(rename = "ec", default)]
    pub classifiers: Vec<String>,
}

impl std::fmt::Display for MavenArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let version = self
            .version
            .as_ref()
            .map_or_else(|| "?".to_string(), SemanticVersion::to_string);
        write!(
            f,
            "{}:{}:{}:{} ({})",
            self.group_id,
            self.artifact_id,
            version,
            self.packaging,
            self.classifiers.join(", ")
        )
    }
}

fn lenient_version<'de, D>(deserializer: D) -> Result<Option<SemanticVersion>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(SemanticVersion::parse(&raw))
}

/// Queries the GAV search core of Maven Central.
pub struct MavenCentralClient {
    client: reqwest::Client,
    base_url: String,
}

impl MavenCentralClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("release-sentinel")
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.to_string(),
        }
    }

    /// Fetches every indexed version of the watched artifact, keeping only
    /// rows that match the coordinates exactly and carry the watched
    /// classifier.
    pub async fn fetch_artifacts(
        &self,
        coordinates: &MavenCoordinates,
    ) -> Result<Vec<MavenArtifact>, SourceError> {
        let url = format!(
            "{}/solrsearch/select?q=g%3A%22{}%22%20AND%20a%3A%22{}%22&core=gav&wt=json&rows=400",
            self.base_url, coordinates.group_id, coordinates.artifact_id
        );
        debug!("Fetching artifacts: {}", url);

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
            warn!("Maven Central returned status {}: {}", status, url);
            return Err(SourceError::InvalidResponse(format!(
                "Unexpected status: {status}"
            )));
        }

        let result: SearchResult = response
            .json()
            .await
            .map_err(|error| SourceError::InvalidResponse(error.to_string()))?;
        let docs = result
            .response
            .ok_or_else(|| SourceError::InvalidResponse("Could not find 'response' field".to_string()))?
            .docs
            .ok_or_else(|| SourceError::InvalidResponse("Could not find 'docs' field".to_string()))?;

        Ok(docs
            .into_iter()
            .filter(|artifact| matches_coordinates(artifact, coordinates))
            .collect())
    }
}

fn matches_coordinates(artifact: &MavenArtifact, coordinates: &MavenCoordinates) -> bool {
    artifact.group_id == coordinates.group_id
        && artifact.artifact_id == coordinates.artifact_id
        && artifact.packaging == coordinates.packaging
        && artifact
            .classifiers
            .iter()
            .any(|classifier| *classifier == coordinates.classifier)
}
