//! Allocator error types.

use route53_client::Route53Error;
use std::net::Ipv4Addr;
use thiserror::Error;

/// Errors that can occur while allocating or releasing addresses.
#[derive(Debug, Error)]
pub enum IpamError {
    /// Route53 API error
    #[error("Route53 error: {0}")]
    Route53(#[from] Route53Error),

    /// Segment name not in the registry
    #[error("Unknown network segment: {0}")]
    UnknownSegment(String),

    /// Every candidate segment has fewer than two free addresses
    #[error("Could not find any networks with two available IPs!")]
    NoNetworksAvailable,

    /// A cluster allocation is always exactly two addresses
    #[error("A cluster allocation needs exactly 2 addresses (API and ingress), got {0}")]
    InvalidAllocation(usize),

    /// Cluster name is not usable as a DNS label
    #[error("Invalid cluster name '{0}': must be a DNS label (letters, digits and '-')")]
    InvalidClusterName(String),

    /// Address outside every registry segment
    #[error("Could not find segment name for {0}")]
    UnknownAddress(Ipv4Addr),

    /// API and ingress VIPs in different segments
    #[error("API VIP {api} and ingress VIP {ingress} are not in the same segment")]
    SegmentMismatch {
        /// API VIP
        api: Ipv4Addr,
        /// Ingress VIP
        ingress: Ipv4Addr,
    },

    /// API and ingress VIPs are the same address
    #[error("API and ingress VIPs must be different addresses, both are {0}")]
    DuplicateVip(Ipv4Addr),

    /// Address is infrastructure, DHCP or broadcast space of its segment
    #[error("{ip} is outside the static range of segment {segment}")]
    OutsideStaticRange {
        /// Offending address
        ip: Ipv4Addr,
        /// Segment name
        segment: String,
    },

    /// An ICMP probe got a reply
    #[error("{0} is already in use")]
    AddressInUse(Ipv4Addr),

    /// The probe tool itself failed
    #[error("Address probe failed: {0}")]
    Probe(String),

    /// SSH key file holds a private key
    #[error("{0} is a private key file. Please use a public key file.")]
    PrivateKey(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML rendering error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl IpamError {
    /// Whether this error is a Route53 authorization failure
    pub fn is_access_denied(&self) -> bool {
        matches!(self, IpamError::Route53(e) if e.is_access_denied())
    }
}
