//! Route53 API client
//!
//! Implements the Route53 REST API calls for record set management.
//! Based on the Route53 API structure: /2013-04-01/hostedzone/{Id}/rrset

use crate::common::HttpClient;
use crate::common::signing::RequestSigner;
use crate::credentials::AwsCredentials;
use crate::error::Route53Error;
use crate::models::*;
use crate::route53_trait::Route53ClientTrait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Default public Route53 endpoint
pub const DEFAULT_ENDPOINT: &str = "https://route53.amazonaws.com";

/// Route53 API client
#[derive(Debug)]
pub struct Route53Client {
    http: HttpClient,
}

impl Route53Client {
    /// Create a new Route53 client
    ///
    /// # Arguments
    /// * `endpoint` - Route53 endpoint (e.g., "https://route53.amazonaws.com")
    /// * `credentials` - AWS credentials used to sign every request
    pub fn new(endpoint: &str, credentials: AwsCredentials) -> Result<Self, Route53Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(Route53Error::Http)?;

        Ok(Self {
            http: HttpClient::new(client, endpoint, RequestSigner::route53(credentials))?,
        })
    }

    /// Get the endpoint URL
    pub fn endpoint(&self) -> &str {
        self.http.base_url()
    }

    /// List one page of record sets in a hosted zone
    ///
    /// # Arguments
    /// * `zone_id` - Hosted zone ID, with or without the `/hostedzone/` prefix
    /// * `start` - Cursor returned by the previous page, `None` for the first page
    /// * `max_items` - Page size hint (Route53 caps it at 300)
    pub async fn list_resource_record_sets(
        &self,
        zone_id: &str,
        start: Option<&RecordSetCursor>,
        max_items: u32,
    ) -> Result<ListResourceRecordSetsResponse, Route53Error> {
        let path = format!("/{}/hostedzone/{}/rrset", API_VERSION, normalize_zone_id(zone_id));
        let max_items = max_items.to_string();

        let mut params: Vec<(&str, &str)> = vec![("maxitems", max_items.as_str())];
        if let Some(cursor) = start {
            params.push(("name", cursor.name.as_str()));
            params.push(("type", cursor.record_type.as_str()));
            if let Some(identifier) = &cursor.identifier {
                params.push(("identifier", identifier.as_str()));
            }
        }

        debug!(
            "Listing record sets of zone {} from {}",
            zone_id,
            start.map_or("the beginning", |c| c.name.as_str())
        );
        self.http.get(&path, &params).await
    }

    /// Submit a change batch to a hosted zone
    ///
    /// # Returns
    /// * `Ok(ChangeInfo)` - The change was accepted (status is usually `PENDING`)
    /// * `Err(Route53Error)` - The batch was rejected; none of its changes were applied
    pub async fn change_resource_record_sets(
        &self,
        zone_id: &str,
        batch: &ChangeBatch,
    ) -> Result<ChangeInfo, Route53Error> {
        if batch.changes.is_empty() {
            return Err(Route53Error::InvalidRequest(
                "change batch must contain at least one change".to_string(),
            ));
        }

        let path = format!("/{}/hostedzone/{}/rrset/", API_VERSION, normalize_zone_id(zone_id));
        debug!("Submitting {} change(s) to zone {}", batch.changes.len(), zone_id);

        let response: ChangeResourceRecordSetsResponse = self.http.post(&path, batch.to_xml()?).await?;
        debug!(
            "Change {} is {}",
            response.change_info.id, response.change_info.status
        );
        Ok(response.change_info)
    }
}

#[async_trait::async_trait]
impl Route53ClientTrait for Route53Client {
    fn endpoint(&self) -> &str {
        Route53Client::endpoint(self)
    }

    async fn list_resource_record_sets(
        &self,
        zone_id: &str,
        start: Option<&RecordSetCursor>,
        max_items: u32,
    ) -> Result<ListResourceRecordSetsResponse, Route53Error> {
        Route53Client::list_resource_record_sets(self, zone_id, start, max_items).await
    }

    async fn change_resource_record_sets(
        &self,
        zone_id: &str,
        batch: &ChangeBatch,
    ) -> Result<ChangeInfo, Route53Error> {
        Route53Client::change_resource_record_sets(self, zone_id, batch).await
    }
}

/// Strip the `/hostedzone/` prefix Route53 uses in some responses
pub fn normalize_zone_id(zone_id: &str) -> &str {
    zone_id
        .trim_start_matches('/')
        .trim_start_matches("hostedzone/")
}
