//! End-to-end runs against mocked source services.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use mockito::{Matcher, Server, ServerGuard};

use release_sentinel::config::{
    DockerCoordinates, Endpoints, MavenCoordinates, PullRequestSettings, SentinelConfig,
    WatchedArtifact, WatchedRepository,
};
use release_sentinel::runner::Sentinel;
use release_sentinel::version::change::VersionChange;
use release_sentinel::version::semver::SemanticVersion;

const BUILD_DEFINITION: &str = r#"sudo: required
language: java
env:
  matrix:
    - NEO_VERSION=3.0.11
      WITH_DOCKER=true
    - NEO_VERSION=3.1.7
      WITH_DOCKER=false
"#;

fn version(text: &str) -> SemanticVersion {
    SemanticVersion::parse(text).unwrap()
}

fn config(base_url: &str) -> SentinelConfig {
    SentinelConfig {
        artifact: WatchedArtifact {
            name: "neo4j".to_string(),
            maven: MavenCoordinates {
                group_id: "org.neo4j".to_string(),
                artifact_id: "neo4j".to_string(),
                packaging: "jar".to_string(),
                classifier: ".jar".to_string(),
            },
            docker: DockerCoordinates {
                image: "neo4j".to_string(),
            },
        },
        github: WatchedRepository {
            organization: "liquigraph".to_string(),
            repository: "liquigraph".to_string(),
            branch: "master".to_string(),
            username: "sentinel-bot".to_string(),
            auth_token: "s3cr3t".to_string(),
        },
        endpoints: Endpoints {
            github: base_url.to_string(),
            maven_search: base_url.to_string(),
            docker_store: base_url.to_string(),
        },
        pull_request: PullRequestSettings {
            title: "chore: track new versions (##date##)".to_string(),
            message: "Automated version refresh".to_string(),
            branch_name: "sentinel-version-refresh".to_string(),
        },
    }
}

async fn mock_build_definition(server: &mut ServerGuard) -> mockito::Mock {
    let body = format!(
        r#"{{"name": ".travis.yml", "encoding": "base64", "content": "\n{}\n"}}"#,
        STANDARD.encode(BUILD_DEFINITION)
    );
    server
        .mock("GET", "/repos/liquigraph/liquigraph/contents/.travis.yml")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await
}

async fn mock_maven_central(server: &mut ServerGuard) -> mockito::Mock {
    server
        .mock("GET", Matcher::Regex("^/solrsearch/select".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "response": {
                    "numFound": 6,
                    "docs": [
                        {"id": "org.neo4j:neo4j:3.0.11", "g": "org.neo4j", "a": "neo4j", "v": "3.0.11", "p": "jar", "ec": [".jar"]},
                        {"id": "org.neo4j:neo4j:3.0.12", "g": "org.neo4j", "a": "neo4j", "v": "3.0.12", "p": "jar", "ec": [".jar"]},
                        {"id": "org.neo4j:neo4j:3.1.7", "g": "org.neo4j", "a": "neo4j", "v": "3.1.7", "p": "jar", "ec": [".jar"]},
                        {"id": "org.neo4j:neo4j:3.1.9", "g": "org.neo4j", "a": "neo4j", "v": "3.1.9", "p": "jar", "ec": [".jar"]},
                        {"id": "org.neo4j:neo4j:3.2.5", "g": "org.neo4j", "a": "neo4j", "v": "3.2.5", "p": "jar", "ec": [".jar"]},
                        {"id": "org.neo4j:neo4j:3.3.0-alpha01", "g": "org.neo4j", "a": "neo4j", "v": "3.3.0-alpha01", "p": "jar", "ec": [".jar"]}
                    ]
                }
            }"#,
        )
        .create_async()
        .await
}

async fn mock_docker_store(server: &mut ServerGuard) -> mockito::Mock {
    server
        .mock("GET", "/api/content/v1/products/images/neo4j")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"full_description": "Supported tags: `3.0.11`, `3.0.12`, `3.2.5`, `3.3.0-alpha01`"}"#,
        )
        .create_async()
        .await
}

#[tokio::test]
async fn computes_and_applies_changes_across_all_three_sources() {
    let mut server = Server::new_async().await;
    let github = mock_build_definition(&mut server).await;
    let maven = mock_maven_central(&mut server).await;
    let docker = mock_docker_store(&mut server).await;

    let sentinel = Sentinel::new(config(&server.url()));
    let report = sentinel.run(false).await.unwrap();

    github.assert_async().await;
    maven.assert_async().await;
    docker.assert_async().await;

    assert_eq!(
        report.changes,
        vec![
            VersionChange::Addition {
                new: version("3.0.12"),
                dockerized: true,
            },
            VersionChange::Update {
                old: version("3.1.7"),
                new: version("3.1.9"),
                dockerized: false,
            },
            VersionChange::Addition {
                new: version("3.2.5"),
                dockerized: true,
            },
        ]
    );
    assert!(report
        .updated_definition
        .contains("NEO_VERSION=3.1.9 WITH_DOCKER=false"));
    assert!(report
        .updated_definition
        .contains("NEO_VERSION=3.2.5 WITH_DOCKER=true"));
    assert_eq!(report.pull_request_url, None);
}

#[tokio::test]
async fn opens_a_pull_request_when_asked_and_changes_exist() {
    let mut server = Server::new_async().await;
    let _github = mock_build_definition(&mut server).await;
    let _maven = mock_maven_central(&mut server).await;
    let _docker = mock_docker_store(&mut server).await;

    let blob = server
        .mock("POST", "/repos/liquigraph/liquigraph/git/blobs")
        .with_status(201)
        .with_body(r#"{"sha": "blob-sha"}"#)
        .create_async()
        .await;
    let base_ref = server
        .mock("GET", "/repos/liquigraph/liquigraph/git/refs/heads/master")
        .with_status(200)
        .with_body(r#"{"ref": "refs/heads/master", "object": {"sha": "base-sha"}}"#)
        .create_async()
        .await;
    let tree = server
        .mock("POST", "/repos/liquigraph/liquigraph/git/trees")
        .with_status(201)
        .with_body(r#"{"sha": "tree-sha"}"#)
        .create_async()
        .await;
    let commit = server
        .mock("POST", "/repos/liquigraph/liquigraph/git/commits")
        .with_status(201)
        .with_body(r#"{"sha": "commit-sha"}"#)
        .create_async()
        .await;
    let branch_ref = server
        .mock("POST", "/repos/liquigraph/liquigraph/git/refs")
        .with_status(201)
        .with_body(
            r#"{"ref": "refs/heads/sentinel-version-refresh", "object": {"sha": "commit-sha"}}"#,
        )
        .create_async()
        .await;
    let pull_request = server
        .mock("POST", "/repos/liquigraph/liquigraph/pulls")
        .with_status(201)
        .with_body(r#"{"html_url": "https://github.com/liquigraph/liquigraph/pull/42"}"#)
        .create_async()
        .await;

    let sentinel = Sentinel::new(config(&server.url()));
    let report = sentinel.run(true).await.unwrap();

    blob.assert_async().await;
    base_ref.assert_async().await;
    tree.assert_async().await;
    commit.assert_async().await;
    branch_ref.assert_async().await;
    pull_request.assert_async().await;
    assert_eq!(
        report.pull_request_url,
        Some("https://github.com/liquigraph/liquigraph/pull/42".to_string())
    );
}

#[tokio::test]
async fn does_not_reconcile_when_a_source_fails() {
    let mut server = Server::new_async().await;
    let _github = mock_build_definition(&mut server).await;
    let _maven = mock_maven_central(&mut server).await;
    let docker = server
        .mock("GET", "/api/content/v1/products/images/neo4j")
        .with_status(500)
        .create_async()
        .await;

    let sentinel = Sentinel::new(config(&server.url()));
    let error = sentinel.run(false).await.unwrap_err();

    docker.assert_async().await;
    assert!(
        error
            .to_string()
            .contains("fetching Docker Store versions failed")
    );
}
