//! Changes emitted by reconciliation, to be applied to the ledger.

use std::fmt;

use crate::version::semver::SemanticVersion;

/// One change the ledger needs to catch up with the published releases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionChange {
    /// Introduces a version the ledger has never tracked.
    Addition {
        new: SemanticVersion,
        dockerized: bool,
    },
    /// Replaces an existing ledger entry in place. `old == new` is valid
    /// and means only the docker flag changed.
    Update {
        old: SemanticVersion,
        new: SemanticVersion,
        dockerized: bool,
    },
}

impl VersionChange {
    /// The version the ledger tracks once this change is applied; change
    /// lists are sorted ascending by this value.
    pub fn new_version(&self) -> &SemanticVersion {
        match self {
            VersionChange::Addition { new, .. } => new,
            VersionChange::Update { new, .. } => new,
        }
    }

    pub fn dockerized(&self) -> bool {
        match self {
            VersionChange::Addition { dockerized, .. } => *dockerized,
            VersionChange::Update { dockerized, .. } => *dockerized,
        }
    }
}

impl fmt::Display for VersionChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionChange::Addition { new, dockerized } => write!(f, "{new} | {dockerized}"),
            VersionChange::Update {
                old,
                new,
                dockerized,
            } => write!(f, "{old} -> {new} | {dockerized}"),
        }
    }
}
