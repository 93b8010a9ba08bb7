//! Mock Route53Client for unit testing
//!
//! This module provides a mock implementation of Route53ClientTrait that can be used
//! in unit tests without talking to AWS.
//!
//! The mock keeps hosted zones in memory, paginates listings in a stable order,
//! escapes `*` as `\052` in listed names the way Route53 does, and applies change
//! batches atomically with Route53's CREATE/DELETE/UPSERT rules.

use crate::error::Route53Error;
use crate::models::*;
use crate::route53_trait::Route53ClientTrait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// (name, type, set identifier)
type RecordKey = (String, String, Option<String>);
type Zone = BTreeMap<RecordKey, ResourceRecordSet>;

/// Mock Route53Client for testing
///
/// Clones share the same in-memory state, so a test can hand one clone to the
/// code under test and inspect the zone through another.
#[derive(Debug, Clone)]
pub struct MockRoute53Client {
    pub(crate) endpoint: String,
    pub(crate) zones: Arc<Mutex<HashMap<String, Zone>>>,
    pub(crate) submitted: Arc<Mutex<Vec<(String, ChangeBatch)>>>,
    pub(crate) list_calls: Arc<AtomicU64>,
    pub(crate) access_denied: Arc<AtomicBool>,
    pub(crate) next_change_id: Arc<AtomicU64>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn key_of(rset: &ResourceRecordSet) -> RecordKey {
    (
        unescape_name(&rset.name),
        rset.record_type.clone(),
        rset.set_identifier.clone(),
    )
}

fn escape_name(name: &str) -> String {
    name.replace('*', "\\052")
}

fn unescape_name(name: &str) -> String {
    name.replace("\\052", "*")
}

fn describe(rset: &ResourceRecordSet) -> String {
    format!("[name='{}', type='{}']", rset.name, rset.record_type)
}

impl MockRoute53Client {
    /// Create a new mock client with no hosted zones
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            zones: Arc::new(Mutex::new(HashMap::new())),
            submitted: Arc::new(Mutex::new(Vec::new())),
            list_calls: Arc::new(AtomicU64::new(0)),
            access_denied: Arc::new(AtomicBool::new(false)),
            next_change_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Add an empty hosted zone (for test setup)
    #[must_use]
    pub fn with_zone(self, zone_id: &str) -> Self {
        lock(&self.zones).entry(zone_id.to_string()).or_default();
        self
    }

    /// Add a record set to a zone, creating the zone if needed (for test setup)
    pub fn add_record_set(&self, zone_id: &str, rset: ResourceRecordSet) {
        lock(&self.zones)
            .entry(zone_id.to_string())
            .or_default()
            .insert(key_of(&rset), rset);
    }

    /// Add a single-value A record (for test setup)
    pub fn add_a_record(&self, zone_id: &str, name: &str, value: &str) {
        self.add_record_set(zone_id, ResourceRecordSet::a_record(name, value, 60));
    }

    /// Make every call fail with AccessDenied
    pub fn deny_access(&self, denied: bool) {
        self.access_denied.store(denied, Ordering::SeqCst);
    }

    /// Current record sets of a zone, in listing order
    pub fn record_sets(&self, zone_id: &str) -> Vec<ResourceRecordSet> {
        lock(&self.zones)
            .get(zone_id)
            .map(|zone| zone.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Every change batch submitted so far, accepted or not
    pub fn submitted_batches(&self) -> Vec<ChangeBatch> {
        lock(&self.submitted)
            .iter()
            .map(|(_, batch)| batch.clone())
            .collect()
    }

    /// Number of list pages served so far
    pub fn list_calls(&self) -> u64 {
        self.list_calls.load(Ordering::SeqCst)
    }

    fn check_access(&self, operation: &str) -> Result<(), Route53Error> {
        if self.access_denied.load(Ordering::SeqCst) {
            return Err(Route53Error::AccessDenied(format!(
                "User is not authorized to perform: route53:{}",
                operation
            )));
        }
        Ok(())
    }

    fn apply(zone: &mut Zone, change: &Change) -> Result<(), Route53Error> {
        let rset = &change.resource_record_set;
        let key = key_of(rset);
        match change.action {
            ChangeAction::Create => {
                if zone.contains_key(&key) {
                    return Err(Route53Error::InvalidChangeBatch(format!(
                        "Tried to create resource record set {} but it already exists",
                        describe(rset)
                    )));
                }
                zone.insert(key, rset.clone());
            }
            ChangeAction::Delete => match zone.get(&key) {
                None => {
                    return Err(Route53Error::InvalidChangeBatch(format!(
                        "Tried to delete resource record set {} but it was not found",
                        describe(rset)
                    )));
                }
                Some(current)
                    if current.ttl != rset.ttl
                        || current.values().collect::<Vec<_>>() != rset.values().collect::<Vec<_>>() =>
                {
                    return Err(Route53Error::InvalidChangeBatch(format!(
                        "Tried to delete resource record set {} but the values provided do not match the current values",
                        describe(rset)
                    )));
                }
                Some(_) => {
                    zone.remove(&key);
                }
            },
            ChangeAction::Upsert => {
                zone.insert(key, rset.clone());
            }
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl Route53ClientTrait for MockRoute53Client {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn list_resource_record_sets(
        &self,
        zone_id: &str,
        start: Option<&RecordSetCursor>,
        max_items: u32,
    ) -> Result<ListResourceRecordSetsResponse, Route53Error> {
        self.check_access("ListResourceRecordSets")?;
        self.list_calls.fetch_add(1, Ordering::SeqCst);

        let zones = lock(&self.zones);
        let zone = zones
            .get(zone_id)
            .ok_or_else(|| Route53Error::NotFound(format!("No hosted zone found with ID: {}", zone_id)))?;

        let lower = match start {
            Some(cursor) => Bound::Included((
                unescape_name(&cursor.name),
                cursor.record_type.clone(),
                cursor.identifier.clone(),
            )),
            None => Bound::Unbounded,
        };

        let page_size = usize::try_from(max_items.max(1)).unwrap_or(usize::MAX);
        let mut remaining = zone.range((lower, Bound::Unbounded));
        let items: Vec<ResourceRecordSet> = remaining
            .by_ref()
            .take(page_size)
            .map(|(_, rset)| ResourceRecordSet {
                name: escape_name(&rset.name),
                ..rset.clone()
            })
            .collect();

        let mut page = ListResourceRecordSetsResponse {
            resource_record_sets: ResourceRecordSetList { items },
            max_items: Some(max_items.to_string()),
            ..Default::default()
        };
        if let Some(((name, record_type, identifier), _)) = remaining.next() {
            page.is_truncated = true;
            page.next_record_name = Some(escape_name(name));
            page.next_record_type = Some(record_type.clone());
            page.next_record_identifier = identifier.clone();
        }
        Ok(page)
    }

    async fn change_resource_record_sets(
        &self,
        zone_id: &str,
        batch: &ChangeBatch,
    ) -> Result<ChangeInfo, Route53Error> {
        self.check_access("ChangeResourceRecordSets")?;
        lock(&self.submitted).push((zone_id.to_string(), batch.clone()));

        if batch.changes.is_empty() {
            return Err(Route53Error::InvalidRequest(
                "change batch must contain at least one change".to_string(),
            ));
        }

        let mut zones = lock(&self.zones);
        let zone = zones
            .get_mut(zone_id)
            .ok_or_else(|| Route53Error::NotFound(format!("No hosted zone found with ID: {}", zone_id)))?;

        // All or nothing
        let mut staged = zone.clone();
        for change in &batch.changes {
            Self::apply(&mut staged, change)?;
        }
        *zone = staged;

        let id = self.next_change_id.fetch_add(1, Ordering::SeqCst);
        Ok(ChangeInfo {
            id: format!("/change/C{:012}", id),
            status: "PENDING".to_string(),
            submitted_at: Utc::now(),
            comment: batch.comment.clone(),
        })
    }
}
