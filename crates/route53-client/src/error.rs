//! Route53 client errors

use thiserror::Error;

/// Errors that can occur when interacting with the Route53 API
#[derive(Debug, Error)]
pub enum Route53Error {
    /// HTTP request/response error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The caller is not authorized for the operation.
    ///
    /// Usually a credential or account mix-up; retrying will not help.
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// Route53 API returned an error
    #[error("Route53 API error ({status} {code}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Route53 error code, e.g. `Throttling`
        code: String,
        /// Human-readable message from the service
        message: String,
    },

    /// The change batch was rejected (e.g. DELETE of a record that does not match)
    #[error("Invalid change batch: {0}")]
    InvalidChangeBatch(String),

    /// Hosted zone not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// XML serialization/deserialization error
    #[error("XML error: {0}")]
    Xml(String),

    /// No usable AWS credentials
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    /// Invalid request (e.g., malformed endpoint)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl Route53Error {
    /// Whether this error is an authorization failure
    pub fn is_access_denied(&self) -> bool {
        matches!(self, Route53Error::AccessDenied(_))
    }
}
