//! Runtime configuration from environment variables

use crate::error::CliError;
use route53_client::client::DEFAULT_ENDPOINT;
use vmc_ipam::{DEFAULT_BASE_DOMAIN, DEFAULT_HOSTED_ZONE_ID};

/// Largest `maxitems` Route53 accepts for record set listings
pub const MAX_PAGE_SIZE: u32 = 300;

const DEFAULT_PAGE_SIZE: u32 = 100;

/// Where and how to talk to the hosted zone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub hosted_zone_id: String,
    pub base_domain: String,
    pub route53_endpoint: String,
    pub page_size: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hosted_zone_id: DEFAULT_HOSTED_ZONE_ID.to_string(),
            base_domain: DEFAULT_BASE_DOMAIN.to_string(),
            route53_endpoint: DEFAULT_ENDPOINT.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Config {
    /// Load from the process environment
    pub fn from_env() -> Result<Self, CliError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load through an arbitrary variable lookup; unset or empty means default
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CliError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let page_size = match var("VMCDNS_PAGE_SIZE") {
            Some(raw) => {
                let size: u32 = raw.parse().map_err(|_| {
                    CliError::InvalidConfig(format!("VMCDNS_PAGE_SIZE must be a number, got '{raw}'"))
                })?;
                if !(1..=MAX_PAGE_SIZE).contains(&size) {
                    return Err(CliError::InvalidConfig(format!(
                        "VMCDNS_PAGE_SIZE must be between 1 and {MAX_PAGE_SIZE}, got {size}"
                    )));
                }
                size
            }
            None => defaults.page_size,
        };

        Ok(Self {
            hosted_zone_id: var("VMCDNS_HOSTED_ZONE_ID").unwrap_or(defaults.hosted_zone_id),
            base_domain: var("VMCDNS_BASE_DOMAIN")
                .map(|d| d.trim_end_matches('.').to_string())
                .unwrap_or(defaults.base_domain),
            route53_endpoint: var("VMCDNS_ROUTE53_ENDPOINT").unwrap_or(defaults.route53_endpoint),
            page_size,
        })
    }
}
