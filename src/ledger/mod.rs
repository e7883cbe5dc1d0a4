//! The version ledger embedded in the watched build definition.
//!
//! The ledger is the `env.matrix` field of a Travis-style YAML document:
//! a sequence of space-separated `KEY=value` rows, each carrying a
//! `NEO_VERSION` and optionally a `WITH_DOCKER` flag.
//!
//! # Modules
//!
//! - [`parser`]: extracts the tracked versions out of the document text
//! - [`patcher`]: applies a computed change list and re-serializes
//! - [`error`]: error type shared by both

pub mod error;
pub mod parser;
pub mod patcher;

use std::fmt;

pub use error::LedgerError;

use crate::version::semver::SemanticVersion;

/// One row of the ledger's version matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerVersion {
    pub version: SemanticVersion,
    pub in_docker_registry: bool,
}

impl LedgerVersion {
    pub fn new(version: SemanticVersion, in_docker_registry: bool) -> LedgerVersion {
        LedgerVersion {
            version,
            in_docker_registry,
        }
    }
}

impl fmt::Display for LedgerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {}", self.version, self.in_docker_registry)
    }
}
