//! Unified error type.

use thiserror::Error as ThisError;

/// The error type returned by awesome's fallible operations.
///
/// Application-level outcomes (404, a rejected sign-in, a validation failure)
/// are expressed as [`ResponseValue`](crate::ResponseValue)s, not as
/// `Error`s. This type surfaces infrastructure failures: binding a port,
/// reaching the user store, rendering a template.
#[derive(Debug, ThisError)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("config: {0}")]
    Config(String),

    #[error("store: {0}")]
    Store(String),

    #[error("template: {0}")]
    Template(#[from] minijinja::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}
