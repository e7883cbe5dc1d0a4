//! Version tracking core: value types and the reconciliation algorithm.
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Sources   │────▶│ Reconciler  │────▶│   Patcher   │
//! │  (fetch)    │     │ (pure core) │     │  (ledger)   │
//! └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! The reconciler consumes already-fetched collections and has no I/O of
//! its own; everything in this module is pure and synchronous.
//!
//! # Modules
//!
//! - [`semver`]: `SemanticVersion` parsing, extraction and total ordering
//! - [`change`]: the `VersionChange` sum type emitted by reconciliation
//! - [`reconciler`]: computes the change list, branch by branch

pub mod change;
pub mod reconciler;
pub mod semver;
