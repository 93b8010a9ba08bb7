//! Route53 REST API Client
//!
//! A small Rust client for the parts of the AWS Route53 API that the vmcdns
//! allocator needs: listing the record sets of a hosted zone and submitting
//! change batches against it.
//!
//! # Example
//!
//! ```no_run
//! use route53_client::{AwsCredentials, ChangeAction, ChangeBatch, Route53Client, Route53ClientTrait};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let credentials = AwsCredentials::from_env()?;
//! let client = Route53Client::new("https://route53.amazonaws.com", credentials)?;
//!
//! // First page of record sets
//! let page = client.list_resource_record_sets("Z0355267XBPSF2ILEW5O", None, 100).await?;
//! for rset in &page.resource_record_sets.items {
//!     println!("{} {}", rset.name, rset.record_type);
//! }
//!
//! // Point a name at an address
//! let batch = ChangeBatch::new(Some("example".to_string()))
//!     .with_a_record(ChangeAction::Upsert, "api.demo.example.com.", "192.168.1.10", 60);
//! client.change_resource_record_sets("Z0355267XBPSF2ILEW5O", &batch).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - **SigV4 signing**: requests are signed with `hmac`/`sha2`, no SDK needed
//! - **Credentials**: environment keys or a shared-credentials profile
//! - **Mocking**: `MockRoute53Client` behind the `test-util` feature

pub mod client;
pub mod common;
pub mod credentials;
pub mod error;
pub mod models;
#[path = "trait.rs"]
pub mod route53_trait;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;

pub use client::Route53Client;
pub use common::HttpClient;
pub use credentials::AwsCredentials;
pub use error::Route53Error;
pub use models::*;
pub use route53_trait::Route53ClientTrait;
#[cfg(any(test, feature = "test-util"))]
pub use mock::MockRoute53Client;
