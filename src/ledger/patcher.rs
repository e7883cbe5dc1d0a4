//! Applies a computed change list to the build definition document.

use serde_yaml::Value;

use crate::ledger::{LedgerError, LedgerVersion, parser};
use crate::version::change::VersionChange;

/// Rewrites the document's version matrix: updates replace their matching
/// entry in place, additions are appended, and the resulting rows are
/// written back sorted ascending by version. Every other field of the
/// document passes through the YAML codec untouched.
pub fn apply_changes(
    ledger_text: &str,
    changes: &[VersionChange],
) -> Result<String, LedgerError> {
    let entries = parser::parse(ledger_text)?;
    let updated = apply_updates(changes, entries);
    let complete = apply_additions(changes, updated);
    serialize(ledger_text, &complete)
}

fn apply_updates(changes: &[VersionChange], entries: Vec<LedgerVersion>) -> Vec<LedgerVersion> {
    entries
        .into_iter()
        .map(|entry| {
            let update = changes.iter().find_map(|change| match change {
                VersionChange::Update {
                    old,
                    new,
                    dockerized,
                } if *old == entry.version => {
                    Some(LedgerVersion::new(new.clone(), *dockerized))
                }
                _ => None,
            });
            update.unwrap_or(entry)
        })
        .collect()
}

fn apply_additions(
    changes: &[VersionChange],
    mut entries: Vec<LedgerVersion>,
) -> Vec<LedgerVersion> {
    entries.extend(changes.iter().filter_map(|change| match change {
        VersionChange::Addition { new, dockerized } => {
            Some(LedgerVersion::new(new.clone(), *dockerized))
        }
        _ => None,
    }));
    entries
}

fn serialize(ledger_text: &str, entries: &[LedgerVersion]) -> Result<String, LedgerError> {
    let mut document: Value = serde_yaml::from_str(ledger_text)
        .map_err(|error| LedgerError::InvalidDocument(error.to_string()))?;

    let mut sorted: Vec<&LedgerVersion> = entries.iter().collect();
    sorted.sort_by(|left, right| left.version.cmp(&right.version));
    let rows: Vec<Value> = sorted
        .iter()
        .map(|entry| {
            Value::String(format!(
                "{}={} {}={}",
                parser::VERSION_KEY,
                entry.version,
                parser::DOCKER_KEY,
                entry.in_docker_registry
            ))
        })
        .collect();

    let matrix = document
        .get_mut("env")
        .and_then(|env| env.get_mut("matrix"))
        .ok_or(LedgerError::MissingField("matrix"))?;
    *matrix = Value::Sequence(rows);

    serde_yaml::to_string(&document)
        .map_err(|error| LedgerError::InvalidDocument(error.to_string()))
}
