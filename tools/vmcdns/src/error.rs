//! CLI error types.

use route53_client::Route53Error;
use thiserror::Error;
use vmc_ipam::IpamError;

/// Errors that end a `vmcdns` run.
#[derive(Debug, Error)]
pub enum CliError {
    /// Allocation or release failed
    #[error("{0}")]
    Ipam(#[from] IpamError),

    /// Route53 client error
    #[error("Route53 error: {0}")]
    Route53(#[from] Route53Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Writing output failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON rendering error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Whether the root cause is a Route53 authorization failure
    pub fn is_access_denied(&self) -> bool {
        match self {
            CliError::Ipam(e) => e.is_access_denied(),
            CliError::Route53(e) => e.is_access_denied(),
            _ => false,
        }
    }
}
