//! Opens the pull request that carries a refreshed build definition.
//!
//! The GitHub git-data API requires five writes before the pull request
//! itself: blob, base ref lookup, tree, commit, branch ref. Each write is
//! Basic-authenticated with the configured bot credentials.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::Local;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::config::{PullRequestSettings, WatchedRepository};
use crate::sources::error::SourceError;

const LEDGER_PATH: &str = ".travis.yml";

#[derive(Debug, Deserialize)]
struct ShaResponse {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct RefResponse {
    #[serde(rename = "ref")]
    reference: String,
    object: RefObject,
}

#[derive(Debug, Deserialize)]
struct RefObject {
    sha: String,
}

#[derive(Debug, Deserialize)]
struct PullRequestResponse {
    html_url: String,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    message: String,
}

pub struct PullRequestPublisher {
    client: reqwest::Client,
    base_url: String,
    repository: WatchedRepository,
    settings: PullRequestSettings,
}

impl PullRequestPublisher {
    pub fn new(
        base_url: &str,
        repository: WatchedRepository,
        settings: PullRequestSettings,
    ) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("release-sentinel")
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.to_string(),
            repository,
            settings,
        }
    }

    /// Publishes the refreshed build definition on a new branch and opens
    /// a pull request against the watched branch. Returns the pull
    /// request's HTML URL.
    pub async fn publish(&self, build_definition: &str) -> Result<String, SourceError> {
        let blob_sha = self.post_blob(build_definition).await?;
        let base_sha = self.latest_commit_sha().await?;
        let tree_sha = self.post_tree(&base_sha, &blob_sha).await?;
        let commit_sha = self.post_commit(&tree_sha, &base_sha).await?;
        let reference = self.post_branch_ref(&commit_sha).await?;
        let url = self.open_pull_request(&reference).await?;
        info!("Opened pull request: {}", url);
        Ok(url)
    }

    async fn post_blob(&self, content: &str) -> Result<String, SourceError> {
        let payload = json!({
            "content": STANDARD.encode(content),
            "encoding": "base64",
        });
        let response: ShaResponse = self.post("git/blobs", &payload).await?;
        Ok(response.sha)
    }

    async fn latest_commit_sha(&self) -> Result<String, SourceError> {
        let url = format!(
            "{}/git/refs/heads/{}",
            self.repository_url(),
            self.repository.branch
        );
        debug!("GET {}", url);
        let response = self.client.get(&url).send().await?;
        let response = self.ensure_success(response).await?;
        let reference: RefResponse = response
            .json()
            .await
            .map_err(|error| SourceError::InvalidResponse(error.to_string()))?;
        Ok(reference.object.sha)
    }

    async fn post_tree(&self, base_sha: &str, blob_sha: &str) -> Result<String, SourceError> {
        let payload = json!({
            "base_tree": base_sha,
            "tree": [{
                "path": LEDGER_PATH,
                "mode": "100644",
                "type": "blob",
                "sha": blob_sha,
            }],
        });
        let response: ShaResponse = self.post("git/trees", &payload).await?;
        Ok(response.sha)
    }

    async fn post_commit(&self, tree_sha: &str, base_sha: &str) -> Result<String, SourceError> {
        let payload = json!({
            "message": self.settings.message,
            "tree": tree_sha,
            "parents": [base_sha],
        });
        let response: ShaResponse = self.post("git/commits", &payload).await?;
        Ok(response.sha)
    }

    async fn post_branch_ref(&self, commit_sha: &str) -> Result<String, SourceError> {
        let payload = json!({
            "ref": format!("refs/heads/{}", self.settings.branch_name),
            "sha": commit_sha,
        });
        let response: RefResponse = self.post("git/refs", &payload).await?;
        Ok(response.reference)
    }

    async fn open_pull_request(&self, head: &str) -> Result<String, SourceError> {
        let date = Local::now().format("%Y-%m-%d %H:%M").to_string();
        let payload = json!({
            "title": replace_date_placeholder(&self.settings.title, &date),
            "body": self.settings.message,
            "head": head,
            "base": self.repository.branch,
            "maintainer_can_modify": true,
        });
        let response: PullRequestResponse = self.post("pulls", &payload).await?;
        Ok(response.html_url)
    }

    async fn post<T>(&self, path: &str, payload: &serde_json::Value) -> Result<T, SourceError>
    where
        T: serde::de::DeserializeOwned,
    {
        let url = format!("{}/{}", self.repository_url(), path);
        debug!("POST {}", url);
        let credentials = format!("{}:{}", self.repository.username, self.repository.auth_token);
        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Basic {}", STANDARD.encode(credentials)),
            )
            .json(payload)
            .send()
            .await?;
        let response = self.ensure_success(response).await?;
        response
            .json()
            .await
            .map_err(|error| SourceError::InvalidResponse(error.to_string()))
    }

    async fn ensure_success(
        &self,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, SourceError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
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
        Err(SourceError::InvalidResponse(format!(
            "Unexpected status: {status}"
        )))
    }

    fn repository_url(&self) -> String {
        format!(
            "{}/repos/{}/{}",
            self.base_url, self.repository.organization, self.repository.repository
        )
    }
}

fn replace_date_placeholder(template: &str, date: &str) -> String {
    template.replace("##date##", date)
}
