//! Reservation ledger
//!
//! A snapshot of which addresses the hosted zone's A records point at. It is
//! read once per invocation and never refreshed, so it can go stale as soon as
//! someone else writes to the zone.

use crate::error::IpamError;
use route53_client::{RecordSetCursor, ResourceRecordSet, Route53ClientTrait};
use std::collections::BTreeMap;
use std::net::Ipv4Addr;
use tracing::{debug, info, warn};

/// Address to record-name map read from the hosted zone
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReservationLedger {
    entries: BTreeMap<Ipv4Addr, String>,
}

impl ReservationLedger {
    /// Empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `name` claims `ip`; the previous claimant is returned
    pub fn insert(&mut self, ip: Ipv4Addr, name: impl Into<String>) -> Option<String> {
        self.entries.insert(ip, name.into())
    }

    /// Record name claiming `ip`
    pub fn get(&self, ip: Ipv4Addr) -> Option<&str> {
        self.entries.get(&ip).map(String::as_str)
    }

    /// Whether `ip` is claimed
    pub fn contains(&self, ip: Ipv4Addr) -> bool {
        self.entries.contains_key(&ip)
    }

    /// Number of claimed addresses
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is claimed
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Claims in ascending address order
    pub fn iter(&self) -> impl Iterator<Item = (Ipv4Addr, &str)> {
        self.entries.iter().map(|(ip, name)| (*ip, name.as_str()))
    }

    /// Fold one record set into the ledger
    ///
    /// Only type A sets count. Values that are not IPv4 literals are skipped.
    pub fn record(&mut self, rset: &ResourceRecordSet) {
        if rset.record_type != "A" {
            return;
        }
        let name = display_name(&rset.name);
        for value in rset.values() {
            match value.parse::<Ipv4Addr>() {
                Ok(ip) => {
                    debug!("Reserved: {}", ip);
                    self.insert(ip, name.clone());
                }
                Err(_) => warn!("Ignoring non-IPv4 value '{}' of {}", value, name),
            }
        }
    }

    /// Read every A record of a hosted zone, following pagination to the end
    ///
    /// AccessDenied is returned as-is; callers treat it as fatal.
    pub async fn load<C>(client: &C, zone_id: &str, page_size: u32) -> Result<Self, IpamError>
    where
        C: Route53ClientTrait + ?Sized,
    {
        debug!("Querying Hosted Zone {}", zone_id);

        let mut ledger = Self::new();
        let mut cursor: Option<RecordSetCursor> = None;
        let mut pages = 0_u32;

        loop {
            let page = client
                .list_resource_record_sets(zone_id, cursor.as_ref(), page_size)
                .await?;
            pages += 1;

            for rset in &page.resource_record_sets.items {
                ledger.record(rset);
            }

            match page.next_cursor() {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        info!(
            "Loaded {} reserved address(es) from zone {} in {} page(s)",
            ledger.len(),
            zone_id,
            pages
        );
        Ok(ledger)
    }
}

impl FromIterator<(Ipv4Addr, String)> for ReservationLedger {
    fn from_iter<I: IntoIterator<Item = (Ipv4Addr, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Undo Route53's octal escape of `*` in record names
fn display_name(name: &str) -> String {
    name.replace("\\052", "*")
}

#[cfg(test)]
#[path = "ledger_test.rs"]
mod ledger_test;
