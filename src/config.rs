//! Runtime configuration, loaded from a YAML file.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use crate::sources::{docker, github, maven};

fn default_github_base_uri() -> String {
    github::DEFAULT_BASE_URL.to_string()
}

fn default_maven_search_base_uri() -> String {
    maven::DEFAULT_BASE_URL.to_string()
}

fn default_docker_store_base_uri() -> String {
    docker::DEFAULT_BASE_URL.to_string()
}

fn default_branch() -> String {
    "master".to_string()
}

/// Top-level configuration for one sentinel run.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SentinelConfig {
    pub artifact: WatchedArtifact,
    pub github: WatchedRepository,
    #[serde(default)]
    pub endpoints: Endpoints,
    pub pull_request: PullRequestSettings,
}

impl SentinelConfig {
    pub fn load(path: &Path) -> anyhow::Result<SentinelConfig> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read configuration at {}", path.display()))?;
        serde_yaml::from_str(&text)
            .with_context(|| format!("invalid configuration at {}", path.display()))
    }
}

/// The artifact whose releases are tracked.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WatchedArtifact {
    pub name: String,
    pub maven: MavenCoordinates,
    pub docker: DockerCoordinates,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MavenCoordinates {
    pub group_id: String,
    pub artifact_id: String,
    pub packaging: String,
    pub classifier: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DockerCoordinates {
    pub image: String,
}

/// The repository holding the build definition the ledger lives in.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WatchedRepository {
    pub organization: String,
    pub repository: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    /// Credentials are only needed when opening pull requests.
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub auth_token: String,
}

/// Base URIs of the three sources; overridable for tests.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Endpoints {
    pub github: String,
    pub maven_search: String,
    pub docker_store: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Endpoints {
            github: default_github_base_uri(),
            maven_search: default_maven_search_base_uri(),
            docker_store: default_docker_store_base_uri(),
        }
    }
}

/// Template settings for the pull request carrying a refreshed ledger.
/// `##date##` in the title is replaced with the time of the run.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestSettings {
    pub title: String,
    pub message: String,
    pub branch_name: String,
}
