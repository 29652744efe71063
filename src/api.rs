//! Business errors returned as data.
//!
//! Handlers report bad input or missing permissions by returning an
//! [`ApiError`], never by failing the request. It converts into a JSON
//! [`ResponseValue`]:
//!
//! ```json
//! { "error": "value:invalid", "data": "email", "message": "Invalid email." }
//! ```

use serde_json::{Map, Value};
use thiserror::Error;

use crate::request::Request;
use crate::value::ResponseValue;

/// A business-level failure.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    /// Input `field` is missing or invalid.
    #[error("invalid value for `{field}`: {message}")]
    Value { field: String, message: String },

    /// The resource named by `field` does not exist.
    #[error("`{field}` not found: {message}")]
    NotFound { field: String, message: String },

    /// The caller may not perform this operation.
    #[error("permission denied: {message}")]
    Permission { message: String },
}

impl ApiError {
    pub fn value(field: &str, message: impl Into<String>) -> Self {
        Self::Value { field: field.to_owned(), message: message.into() }
    }

    pub fn not_found(field: &str, message: impl Into<String>) -> Self {
        Self::NotFound { field: field.to_owned(), message: message.into() }
    }

    pub fn permission(message: impl Into<String>) -> Self {
        Self::Permission { message: message.into() }
    }

    /// Machine-readable kind, e.g. `value:invalid`.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Value { .. } => "value:invalid",
            Self::NotFound { .. } => "value:notfound",
            Self::Permission { .. } => "permission:forbidden",
        }
    }

    /// The `data` field: the offending input, or `permission`.
    pub fn field(&self) -> &str {
        match self {
            Self::Value { field, .. } | Self::NotFound { field, .. } => field,
            Self::Permission { .. } => "permission",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Value { message, .. }
            | Self::NotFound { message, .. }
            | Self::Permission { message } => message,
        }
    }
}

impl From<ApiError> for ResponseValue {
    fn from(e: ApiError) -> Self {
        let mut map = Map::new();
        map.insert("error".to_owned(), Value::from(e.kind()));
        map.insert("data".to_owned(), Value::from(e.field()));
        map.insert("message".to_owned(), Value::from(e.message()));
        Self::Map(map)
    }
}

/// `Ok` when the caller is a signed-in administrator.
pub fn check_admin(req: &Request) -> Result<(), ApiError> {
    match req.user() {
        Some(user) if user.admin => Ok(()),
        _ => Err(ApiError::permission("administrator required")),
    }
}
