//! Reserve and release cluster VIPs in the hosted zone
//!
//! A reservation is two A records: `api.<cluster>.<base>.` for the API VIP
//! and `*.apps.<cluster>.<base>.` for the ingress VIP.
//!
//! Neither operation re-reads the zone or uses a conditional write. A
//! reservation UPSERTs over whatever is there, and a release DELETEs the exact
//! values given (Route53 rejects the batch if they do not match).

use crate::error::IpamError;
use route53_client::{ChangeAction, ChangeBatch, ChangeInfo, Route53ClientTrait};
use std::net::Ipv4Addr;
use tracing::info;

/// TTL of every cluster record
pub const RECORD_TTL: u32 = 60;

/// Which cluster endpoint a record serves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// `api.<cluster>.<base>.`
    Api,
    /// `*.apps.<cluster>.<base>.`
    Ingress,
}

impl Route {
    /// Leading labels of the record name
    pub fn prefix(self) -> &'static str {
        match self {
            Route::Api => "api",
            Route::Ingress => "*.apps",
        }
    }
}

/// Fully qualified record name for a cluster endpoint
pub fn record_name(route: Route, cluster_name: &str, base_domain: &str) -> String {
    format!(
        "{}.{}.{}.",
        route.prefix(),
        cluster_name,
        base_domain.trim_end_matches('.')
    )
}

/// The two addresses of one cluster allocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VipPair {
    /// Address for `api.<cluster>`
    pub api: Ipv4Addr,
    /// Address for `*.apps.<cluster>`
    pub ingress: Ipv4Addr,
}

impl VipPair {
    /// Pair up an API and an ingress VIP
    pub fn new(api: Ipv4Addr, ingress: Ipv4Addr) -> Self {
        Self { api, ingress }
    }
}

impl TryFrom<&[Ipv4Addr]> for VipPair {
    type Error = IpamError;

    fn try_from(addrs: &[Ipv4Addr]) -> Result<Self, Self::Error> {
        match addrs {
            [api, ingress] if api == ingress => Err(IpamError::DuplicateVip(*api)),
            [api, ingress] => Ok(Self::new(*api, *ingress)),
            _ => Err(IpamError::InvalidAllocation(addrs.len())),
        }
    }
}

/// Cluster names become a DNS label
fn validate_cluster_name(name: &str) -> Result<(), IpamError> {
    let valid = !name.is_empty()
        && name.len() <= 63
        && !name.starts_with('-')
        && !name.ends_with('-')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
    if valid {
        Ok(())
    } else {
        Err(IpamError::InvalidClusterName(name.to_string()))
    }
}

/// Writes cluster reservations into one hosted zone
#[derive(Debug)]
pub struct ZoneMutator<'a, C: ?Sized> {
    client: &'a C,
    zone_id: &'a str,
    base_domain: &'a str,
}

impl<'a, C> ZoneMutator<'a, C>
where
    C: Route53ClientTrait + ?Sized,
{
    /// Create a mutator for a zone and base domain
    pub fn new(client: &'a C, zone_id: &'a str, base_domain: &'a str) -> Self {
        Self {
            client,
            zone_id,
            base_domain,
        }
    }

    fn batch(&self, action: ChangeAction, cluster_name: &str, vips: VipPair) -> ChangeBatch {
        let comment = format!(
            "{} DNS records for cluster '{}' in domain '{}'.",
            action, cluster_name, self.base_domain
        );
        ChangeBatch::new(Some(comment))
            .with_a_record(
                action,
                &record_name(Route::Api, cluster_name, self.base_domain),
                &vips.api.to_string(),
                RECORD_TTL,
            )
            .with_a_record(
                action,
                &record_name(Route::Ingress, cluster_name, self.base_domain),
                &vips.ingress.to_string(),
                RECORD_TTL,
            )
    }

    /// Change batch that reserves `vips` for a cluster
    pub fn reservation_batch(&self, cluster_name: &str, vips: VipPair) -> ChangeBatch {
        self.batch(ChangeAction::Upsert, cluster_name, vips)
    }

    /// Change batch that releases `vips` from a cluster
    pub fn release_batch(&self, cluster_name: &str, vips: VipPair) -> ChangeBatch {
        self.batch(ChangeAction::Delete, cluster_name, vips)
    }

    /// Reserve `[api, ingress]` for a cluster in one atomic batch
    ///
    /// Fails without touching the zone unless exactly two addresses are given.
    pub async fn reserve(&self, cluster_name: &str, vips: &[Ipv4Addr]) -> Result<ChangeInfo, IpamError> {
        let vips = VipPair::try_from(vips)?;
        validate_cluster_name(cluster_name)?;

        info!(
            "Reserving IPs for API ({}) and ingress ({})...",
            vips.api, vips.ingress
        );
        let batch = self.reservation_batch(cluster_name, vips);
        Ok(self.client.change_resource_record_sets(self.zone_id, &batch).await?)
    }

    /// Release a cluster's two records in one atomic batch
    ///
    /// Nothing checks that the records currently hold these values; Route53
    /// rejects the whole batch if either does not match.
    pub async fn release(
        &self,
        cluster_name: &str,
        api: Ipv4Addr,
        ingress: Ipv4Addr,
    ) -> Result<ChangeInfo, IpamError> {
        validate_cluster_name(cluster_name)?;

        info!("Releasing IPs for API ({}) and ingress ({})...", api, ingress);
        let batch = self.release_batch(cluster_name, VipPair::new(api, ingress));
        Ok(self.client.change_resource_record_sets(self.zone_id, &batch).await?)
    }
}
