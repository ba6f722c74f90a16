//! Library error types
//!
//! Request failures are not errors here: they arrive as `Answer::Bad` and are
//! surfaced through the error reporter. `ClientError` covers everything that
//! is not a request outcome.

use thiserror::Error;

/// Errors returned by the client library
#[derive(Debug, Error)]
pub enum ClientError {
    /// The HTTP client could not be built
    #[error("failed to create HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    /// Server URL is not usable as a base for request paths
    #[error("invalid server url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The application refused the login produced by a successful answer
    #[error("login for '{name}' failed: {source}")]
    Login {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    /// Bundle configuration is inconsistent
    #[error("invalid bundle configuration: {0}")]
    InvalidBundle(String),
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;
