//! Route53Client trait for mocking
//!
//! This trait abstracts the Route53Client to enable mocking in unit tests.
//! The concrete Route53Client implements this trait, and tests can use mock implementations.

use crate::error::Route53Error;
use crate::models::*;

/// Trait for Route53 API client operations
///
/// All async methods must be `Send` to work with Tokio's work-stealing runtime.
#[async_trait::async_trait]
pub trait Route53ClientTrait: Send + Sync {
    /// Get the endpoint URL
    fn endpoint(&self) -> &str;

    /// List one page of record sets of a hosted zone, starting at `start`
    async fn list_resource_record_sets(
        &self,
        zone_id: &str,
        start: Option<&RecordSetCursor>,
        max_items: u32,
    ) -> Result<ListResourceRecordSetsResponse, Route53Error>;

    /// Submit a change batch; Route53 applies all changes or none
    async fn change_resource_record_sets(
        &self,
        zone_id: &str,
        batch: &ChangeBatch,
    ) -> Result<ChangeInfo, Route53Error>;
}
