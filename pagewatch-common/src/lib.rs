//! Shared types and utilities for the pagewatch workspace.
//!
//! This crate defines the shared error taxonomy and the observability
//! helpers used by the binary and the integration tests. It is
//! intentionally lightweight so every crate can depend on it without
//! pulling in heavy transitive costs.
//!
//! - [`PagewatchError`] and [`Result`]: shared error handling
//! - [`observability`]: centralised tracing/logging initialisation

pub mod observability;

/// Error types used across the pagewatch system.
///
/// Every variant is fatal: the run aborts, nothing is emitted, and the
/// state file is left untouched.
#[derive(thiserror::Error, Debug)]
pub enum PagewatchError {
    /// The page fetch failed (timeout, connection error, non-2xx status).
    #[error("fetch error: {0}")]
    Fetch(String),

    /// Configuration was incomplete or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The state file could not be read or written.
    #[error("state store error: {0}")]
    State(#[from] std::io::Error),

    /// The results file could not be appended to.
    #[error("results output error: {0}")]
    Output(String),
}

/// Convenient alias for results that use [`PagewatchError`].
pub type Result<T> = std::result::Result<T, PagewatchError>;
