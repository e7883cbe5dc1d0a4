//! One full sentinel run: fetch the three sources, reconcile, patch the
//! ledger, and optionally open a pull request.

use std::collections::HashSet;
use std::fmt::Write as _;

use anyhow::Context;
use tracing::info;

use crate::config::SentinelConfig;
use crate::ledger::{LedgerVersion, parser, patcher};
use crate::sources::docker::DockerStoreClient;
use crate::sources::github::BuildDefinitionClient;
use crate::sources::maven::{MavenArtifact, MavenCentralClient};
use crate::sources::publisher::PullRequestPublisher;
use crate::version::change::VersionChange;
use crate::version::reconciler;
use crate::version::semver::SemanticVersion;

const REPORT_ROW_CAP: usize = 10;

pub struct Sentinel {
    config: SentinelConfig,
    build_definitions: BuildDefinitionClient,
    maven_central: MavenCentralClient,
    docker_store: DockerStoreClient,
    publisher: PullRequestPublisher,
}

/// Everything one run observed and produced.
#[derive(Debug)]
pub struct RunReport {
    pub ledger_versions: Vec<LedgerVersion>,
    pub artifacts: Vec<MavenArtifact>,
    pub dockerized: HashSet<SemanticVersion>,
    pub changes: Vec<VersionChange>,
    pub updated_definition: String,
    pub pull_request_url: Option<String>,
}

impl Sentinel {
    pub fn new(config: SentinelConfig) -> Sentinel {
        let build_definitions = BuildDefinitionClient::new(
            &config.endpoints.github,
            &config.github.organization,
            &config.github.repository,
        );
        let maven_central = MavenCentralClient::new(&config.endpoints.maven_search);
        let docker_store = DockerStoreClient::new(&config.endpoints.docker_store);
        let publisher = PullRequestPublisher::new(
            &config.endpoints.github,
            config.github.clone(),
            config.pull_request.clone(),
        );
        Sentinel {
            config,
            build_definitions,
            maven_central,
            docker_store,
            publisher,
        }
    }

    /// Runs one reconciliation. All three fetches must succeed before
    /// reconciliation proceeds; a failure is reported with the source
    /// that caused it.
    pub async fn run(&self, open_pull_request: bool) -> anyhow::Result<RunReport> {
        let (definition, artifacts, dockerized) = tokio::join!(
            self.build_definitions.fetch_build_definition(),
            self.maven_central
                .fetch_artifacts(&self.config.artifact.maven),
            self.docker_store
                .fetch_dockerized_versions(&self.config.artifact.docker.image),
        );
        let definition = definition.context("fetching the build definition failed")?;
        let artifacts = artifacts.context("fetching Maven Central artifacts failed")?;
        let dockerized = dockerized.context("fetching Docker Store versions failed")?;

        let ledger_versions =
            parser::parse(&definition).context("parsing the stored version ledger failed")?;
        let changes = reconciler::compute_version_changes(&ledger_versions, &artifacts, &dockerized);
        info!("Computed {} change(s)", changes.len());
        let updated_definition = patcher::apply_changes(&definition, &changes)
            .context("patching the build definition failed")?;

        let pull_request_url = if open_pull_request && !changes.is_empty() {
            let url = self
                .publisher
                .publish(&updated_definition)
                .await
                .context("opening the pull request failed")?;
            Some(url)
        } else {
            None
        };

        Ok(RunReport {
            ledger_versions,
            artifacts,
            dockerized,
            changes,
            updated_definition,
            pull_request_url,
        })
    }
}

impl RunReport {
    /// The sectioned summary printed at the end of a run.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "#### Ledger (showing max {REPORT_ROW_CAP})");
        for entry in self.ledger_versions.iter().take(REPORT_ROW_CAP) {
            let _ = writeln!(out, "{entry}");
        }
        let _ = writeln!(out, "#### Maven Central (showing max {REPORT_ROW_CAP})");
        for artifact in self.artifacts.iter().take(REPORT_ROW_CAP) {
            let _ = writeln!(out, "{artifact}");
        }
        let _ = writeln!(out, "#### Docker Store (showing max {REPORT_ROW_CAP})");
        let mut dockerized: Vec<&SemanticVersion> = self.dockerized.iter().collect();
        dockerized.sort();
        for version in dockerized.iter().take(REPORT_ROW_CAP) {
            let _ = writeln!(out, "{version}");
        }
        let _ = writeln!(out, "#### Changes");
        for change in &self.changes {
            let _ = writeln!(out, "{change}");
        }
        let _ = writeln!(out, "#### Resulting build definition");
        let _ = writeln!(out, "{}", self.updated_definition);
        if let Some(url) = &self.pull_request_url {
            let _ = writeln!(out, "#### Pull request");
            let _ = writeln!(out, "{url}");
        }
        out
    }
}
