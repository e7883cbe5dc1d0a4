//! Full pipeline over in-memory inputs: parse the ledger, reconcile
//! against candidate and dockerized versions, patch the document.

use std::collections::HashSet;

use release_sentinel::ledger::{LedgerVersion, parser, patcher};
use release_sentinel::sources::maven::MavenArtifact;
use release_sentinel::version::change::VersionChange;
use release_sentinel::version::reconciler::compute_version_changes;
use release_sentinel::version::semver::SemanticVersion;

const BUILD_DEFINITION: &str = r#"sudo: required
language: java
services:
  - docker
jdk:
  - oraclejdk8
os:
  - linux
env:
  matrix:
    - NEO_VERSION=3.0.11
      WITH_DOCKER=true
      EXTRA_PROFILES=-Pwith-neo4j-io
    - NEO_VERSION=3.1.7
      WITH_DOCKER=false
      EXTRA_PROFILES=-Pwith-neo4j-io
"#;

fn version(text: &str) -> SemanticVersion {
    SemanticVersion::parse(text).unwrap()
}

fn artifact(text: &str) -> MavenArtifact {
    MavenArtifact {
        group_id: "org.neo4j".to_string(),
        artifact_id: "neo4j".to_string(),
        version: SemanticVersion::parse(text),
        packaging: "jar".to_string(),
        classifiers: vec![".jar".to_string()],
    }
}

fn matrix_rows(document: &str) -> Vec<String> {
    let value: serde_yaml::Value = serde_yaml::from_str(document).unwrap();
    value["env"]["matrix"]
        .as_sequence()
        .unwrap()
        .iter()
        .map(|row| row.as_str().unwrap().to_string())
        .collect()
}

#[test]
fn reconciles_the_ledger_against_both_sources_and_patches_the_document() {
    let ledger = parser::parse(BUILD_DEFINITION).unwrap();
    assert_eq!(
        ledger,
        vec![
            LedgerVersion::new(version("3.0.11"), true),
            LedgerVersion::new(version("3.1.7"), false),
        ]
    );

    let candidates = vec![
        artifact("3.0.11"),
        artifact("3.0.12"),
        artifact("3.1.7"),
        artifact("3.1.9"),
        artifact("3.2.5"),
        artifact("3.3.0-alpha01"),
    ];
    let dockerized = HashSet::from([version("3.0.11"), version("3.0.12"), version("3.2.5")]);

    let changes = compute_version_changes(&ledger, &candidates, &dockerized);

    assert_eq!(
        changes,
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

    let patched = patcher::apply_changes(BUILD_DEFINITION, &changes).unwrap();

    assert_eq!(
        matrix_rows(&patched),
        vec![
            "NEO_VERSION=3.0.11 WITH_DOCKER=true",
            "NEO_VERSION=3.0.12 WITH_DOCKER=true",
            "NEO_VERSION=3.1.9 WITH_DOCKER=false",
            "NEO_VERSION=3.2.5 WITH_DOCKER=true",
        ]
    );

    // the rest of the document survives the rewrite
    let value: serde_yaml::Value = serde_yaml::from_str(&patched).unwrap();
    assert_eq!(value["sudo"].as_str(), Some("required"));
    assert_eq!(value["language"].as_str(), Some("java"));
    assert_eq!(value["jdk"][0].as_str(), Some("oraclejdk8"));
}

#[test]
fn a_ledger_that_is_already_up_to_date_yields_no_changes() {
    let ledger = parser::parse(BUILD_DEFINITION).unwrap();
    let candidates = vec![artifact("3.0.11"), artifact("3.1.7")];
    let dockerized = HashSet::from([version("3.0.11")]);

    let changes = compute_version_changes(&ledger, &candidates, &dockerized);

    assert_eq!(changes, vec![]);
    let patched = patcher::apply_changes(BUILD_DEFINITION, &changes).unwrap();
    assert_eq!(
        matrix_rows(&patched),
        vec![
            "NEO_VERSION=3.0.11 WITH_DOCKER=true",
            "NEO_VERSION=3.1.7 WITH_DOCKER=false",
        ]
    );
}
