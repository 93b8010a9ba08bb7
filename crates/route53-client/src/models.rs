//! Route53 API models
//!
//! These models match the Route53 `2013-04-01` REST API XML documents.
//! See: https://docs.aws.amazon.com/Route53/latest/APIReference/

use crate::error::Route53Error;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// XML namespace of every Route53 request and response document
pub const ROUTE53_XMLNS: &str = "https://route53.amazonaws.com/doc/2013-04-01/";

/// Route53 API version path prefix
pub const API_VERSION: &str = "2013-04-01";

/// Action of a single change in a change batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeAction {
    /// Create a record set; fails if it already exists
    Create,
    /// Delete a record set; values must match exactly
    Delete,
    /// Create or replace a record set
    Upsert,
}

impl ChangeAction {
    /// Wire name of the action
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeAction::Create => "CREATE",
            ChangeAction::Delete => "DELETE",
            ChangeAction::Upsert => "UPSERT",
        }
    }
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ChangeAction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A single value of a record set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceRecord {
    /// Record value, e.g. an IPv4 literal for type A
    pub value: String,
}

/// `<ResourceRecords>` wrapper
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRecords {
    /// Values of the set
    #[serde(rename = "ResourceRecord", default)]
    pub items: Vec<ResourceRecord>,
}

/// Resource record set model matching the Route53 `ResourceRecordSet` element
///
/// Field order is significant on the wire; Route53 validates element order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceRecordSet {
    /// Fully qualified name with trailing dot; `*` comes back as `\052`
    pub name: String,
    /// Record type, e.g. `A`
    #[serde(rename = "Type")]
    pub record_type: String,
    /// Distinguishes sets with the same name and type under routing policies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_identifier: Option<String>,
    /// Time to live in seconds (absent for alias records)
    #[serde(rename = "TTL", default, skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
    /// Absent for alias records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_records: Option<ResourceRecords>,
}

impl ResourceRecordSet {
    /// Build a single-value A record set
    pub fn a_record(name: impl Into<String>, value: impl Into<String>, ttl: u32) -> Self {
        Self {
            name: name.into(),
            record_type: "A".to_string(),
            set_identifier: None,
            ttl: Some(ttl),
            resource_records: Some(ResourceRecords {
                items: vec![ResourceRecord { value: value.into() }],
            }),
        }
    }

    /// Values of this record set (empty for alias records)
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.resource_records
            .iter()
            .flat_map(|records| records.items.iter())
            .map(|record| record.value.as_str())
    }
}

/// `<ResourceRecordSets>` wrapper
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ResourceRecordSetList {
    /// Record sets on this page
    #[serde(rename = "ResourceRecordSet", default)]
    pub items: Vec<ResourceRecordSet>,
}

/// Position to resume a record set listing from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSetCursor {
    /// Name of the first set on the next page
    pub name: String,
    /// Type of the first set on the next page
    pub record_type: String,
    /// Set identifier of the first set on the next page, if any
    pub identifier: Option<String>,
}

/// One page of `ListResourceRecordSets`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ListResourceRecordSetsResponse {
    /// Record sets on this page
    #[serde(default)]
    pub resource_record_sets: ResourceRecordSetList,
    /// Whether more pages follow
    #[serde(default)]
    pub is_truncated: bool,
    /// Start name for the next page
    #[serde(default)]
    pub next_record_name: Option<String>,
    /// Start type for the next page
    #[serde(default)]
    pub next_record_type: Option<String>,
    /// Start identifier for the next page
    #[serde(default)]
    pub next_record_identifier: Option<String>,
    /// Page size the service applied
    #[serde(default)]
    pub max_items: Option<String>,
}

impl ListResourceRecordSetsResponse {
    /// Cursor for the next page, `None` when this is the last page
    pub fn next_cursor(&self) -> Option<RecordSetCursor> {
        if !self.is_truncated {
            return None;
        }
        Some(RecordSetCursor {
            name: self.next_record_name.clone()?,
            record_type: self.next_record_type.clone()?,
            identifier: self.next_record_identifier.clone(),
        })
    }
}

/// A single change of a change batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Change {
    /// What to do with the set
    pub action: ChangeAction,
    /// The set to act on
    pub resource_record_set: ResourceRecordSet,
}

/// Ordered list of changes Route53 applies atomically
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeBatch {
    /// Free-form note stored with the change
    pub comment: Option<String>,
    /// Changes applied atomically
    pub changes: Vec<Change>,
}

impl ChangeBatch {
    /// Create an empty batch
    pub fn new(comment: Option<String>) -> Self {
        Self {
            comment,
            changes: Vec::new(),
        }
    }

    /// Append a change
    #[must_use]
    pub fn with_change(mut self, action: ChangeAction, resource_record_set: ResourceRecordSet) -> Self {
        self.changes.push(Change {
            action,
            resource_record_set,
        });
        self
    }

    /// Append a change for a single-value A record
    #[must_use]
    pub fn with_a_record(self, action: ChangeAction, name: &str, value: &str, ttl: u32) -> Self {
        self.with_change(action, ResourceRecordSet::a_record(name, value, ttl))
    }

    /// Render the `ChangeResourceRecordSetsRequest` document
    pub fn to_xml(&self) -> Result<String, Route53Error> {
        let request = ChangeResourceRecordSetsRequest {
            xmlns: ROUTE53_XMLNS,
            change_batch: WireChangeBatch {
                comment: self.comment.as_deref(),
                changes: WireChanges {
                    change: &self.changes,
                },
            },
        };
        let body = quick_xml::se::to_string(&request)
            .map_err(|e| Route53Error::Xml(e.to_string()))?;
        Ok(format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{body}"))
    }
}

#[derive(Serialize)]
#[serde(rename = "ChangeResourceRecordSetsRequest")]
struct ChangeResourceRecordSetsRequest<'a> {
    #[serde(rename = "@xmlns")]
    xmlns: &'static str,
    #[serde(rename = "ChangeBatch")]
    change_batch: WireChangeBatch<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct WireChangeBatch<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<&'a str>,
    changes: WireChanges<'a>,
}

#[derive(Serialize)]
struct WireChanges<'a> {
    #[serde(rename = "Change")]
    change: &'a [Change],
}

/// Status of a submitted change batch
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChangeInfo {
    /// Change ID, `/change/<id>`
    pub id: String,
    /// `PENDING` or `INSYNC`
    pub status: String,
    /// When the service accepted the change
    pub submitted_at: DateTime<Utc>,
    /// Comment from the submitted batch
    #[serde(default)]
    pub comment: Option<String>,
}

/// `ChangeResourceRecordSetsResponse` document
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChangeResourceRecordSetsResponse {
    /// Status of the submitted change
    pub change_info: ChangeInfo,
}

/// Generic `ErrorResponse` document
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorResponse {
    /// Error details
    pub error: ErrorDetail,
    /// Request ID for AWS support
    #[serde(default)]
    pub request_id: Option<String>,
}

/// `<Error>` element of an `ErrorResponse`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorDetail {
    /// `Sender` or `Receiver`
    #[serde(rename = "Type", default)]
    pub error_type: Option<String>,
    /// Error code, e.g. `AccessDenied`
    pub code: String,
    /// Human-readable message
    #[serde(default)]
    pub message: String,
}

/// `InvalidChangeBatch` document returned for rejected batches
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InvalidChangeBatchResponse {
    /// Reasons the batch was rejected
    pub messages: InvalidChangeBatchMessages,
}

/// `<Messages>` wrapper
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvalidChangeBatchMessages {
    /// One message per rejected change
    #[serde(rename = "Message", default)]
    pub items: Vec<String>,
}
