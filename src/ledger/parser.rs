//! Extracts the tracked versions out of the build definition text.

use std::sync::LazyLock;

use regex::Regex;
use serde_yaml::Value;

use crate::ledger::{LedgerError, LedgerVersion};
use crate::version::semver::SemanticVersion;

pub const VERSION_KEY: &str = "NEO_VERSION";
pub const DOCKER_KEY: &str = "WITH_DOCKER";

static TOKEN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z_]*)=(.*)$").expect("token pattern must compile"));

/// Parses the document and extracts its version matrix.
///
/// Row failures are aggregated: every malformed row contributes one line
/// to the resulting [`LedgerError::MalformedMatrix`].
pub fn parse(text: &str) -> Result<Vec<LedgerVersion>, LedgerError> {
    let document: Value =
        serde_yaml::from_str(text).map_err(|error| LedgerError::InvalidDocument(error.to_string()))?;
    let rows = read_version_matrix(&document)?;
    extract_versions(&rows)
}

fn read_version_matrix(document: &Value) -> Result<Vec<String>, LedgerError> {
    let env = document.get("env").ok_or(LedgerError::MissingField("env"))?;
    let matrix = env.get("matrix").ok_or(LedgerError::MissingField("matrix"))?;
    let rows = matrix
        .as_sequence()
        .ok_or_else(|| LedgerError::InvalidDocument("'matrix' is not a sequence".to_string()))?;
    rows.iter()
        .map(|row| {
            row.as_str().map(str::to_owned).ok_or_else(|| {
                LedgerError::InvalidDocument("'matrix' entries must be strings".to_string())
            })
        })
        .collect()
}

fn extract_versions(rows: &[String]) -> Result<Vec<LedgerVersion>, LedgerError> {
    let mut failures = Vec::new();
    let mut versions = Vec::new();
    for (index, row) in rows.iter().enumerate() {
        match parse_row(index, row) {
            Ok(version) => versions.push(version),
            Err(message) => failures.push(message),
        }
    }
    if failures.is_empty() {
        Ok(versions)
    } else {
        Err(LedgerError::MalformedMatrix(failures.join("\n")))
    }
}

fn parse_row(index: usize, row: &str) -> Result<LedgerVersion, String> {
    let pairs: Vec<(&str, &str)> = row
        .split_whitespace()
        .filter_map(|token| {
            TOKEN_PATTERN.captures(token).map(|captures| {
                let (_, [key, value]) = captures.extract();
                (key, value)
            })
        })
        .collect();

    let raw_version = pairs
        .iter()
        .find(|(key, _)| *key == VERSION_KEY)
        .map(|(_, value)| *value)
        .ok_or_else(|| format!("Missing '{VERSION_KEY}' field at index {index}"))?;

    let version = SemanticVersion::parse(raw_version)
        .ok_or_else(|| format!("Invalid '{VERSION_KEY}' value '{raw_version}' at index {index}"))?;

    let in_docker_registry = pairs
        .iter()
        .find(|(key, _)| *key == DOCKER_KEY)
        .is_some_and(|(_, value)| value.eq_ignore_ascii_case("true"));

    Ok(LedgerVersion::new(version, in_docker_registry))
}
