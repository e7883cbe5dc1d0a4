//! HTTP collaborators for the three version sources and the publisher.
//!
//! Each client owns its `reqwest::Client` and a `base_url` injected at
//! construction time, so tests can point it at a local mock server.
//!
//! # Modules
//!
//! - [`github`]: fetches the build definition through the contents API
//! - [`maven`]: fetches candidate artifact versions from Maven Central
//! - [`docker`]: fetches the set of published image versions
//! - [`publisher`]: opens the pull request carrying a refreshed ledger
//! - [`error`]: error type shared by every client

pub mod docker;
pub mod error;
pub mod github;
pub mod maven;
pub mod publisher;

pub use error::SourceError;
