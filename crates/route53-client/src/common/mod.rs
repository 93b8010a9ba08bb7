//! Common utilities for the Route53 API client
//!
//! Provides the signed HTTP transport and error decoding shared by all calls.

pub mod signing;

use crate::error::Route53Error;
use crate::models::{ErrorDetail, ErrorResponse, InvalidChangeBatchResponse};
use chrono::Utc;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use signing::{RequestSigner, SignableRequest};
use tracing::debug;

/// HTTP client wrapper that signs every request
#[derive(Debug)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    host: String,
    signer: RequestSigner,
}

impl HttpClient {
    /// Create a new HTTP client wrapper
    pub fn new(client: Client, base_url: &str, signer: RequestSigner) -> Result<Self, Route53Error> {
        let base_url = base_url.trim_end_matches('/').to_string();
        let url = reqwest::Url::parse(&base_url)
            .map_err(|e| Route53Error::InvalidRequest(format!("invalid endpoint {}: {}", base_url, e)))?;
        let host = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => {
                return Err(Route53Error::InvalidRequest(format!(
                    "endpoint {} has no host",
                    base_url
                )));
            }
        };

        Ok(Self {
            client,
            base_url,
            host,
            signer,
        })
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a full URL from a path and an encoded query string
    pub fn build_url(&self, path: &str, query: &str) -> String {
        if query.is_empty() {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}{}?{}", self.base_url, path, query)
        }
    }

    /// Make a signed GET request and decode the XML response
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, Route53Error> {
        let query = signing::canonical_query_string(params);
        let body = self.send(Method::GET, path, &query, None).await?;
        decode_xml(&body)
    }

    /// Make a signed POST request with an XML body and decode the XML response
    pub async fn post<T: DeserializeOwned>(&self, path: &str, body: String) -> Result<T, Route53Error> {
        let response = self.send(Method::POST, path, "", Some(body)).await?;
        decode_xml(&response)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &str,
        body: Option<String>,
    ) -> Result<String, Route53Error> {
        let url = self.build_url(path, query);
        let payload = body.unwrap_or_default();
        let content_type: &[(&str, &str)] = if payload.is_empty() {
            &[]
        } else {
            &[("content-type", "text/xml")]
        };

        let signed = self.signer.sign(
            &SignableRequest {
                method: method.as_str(),
                host: &self.host,
                path,
                query,
                headers: content_type,
                payload: payload.as_bytes(),
            },
            Utc::now(),
        );

        debug!("{} {}", method, url);
        if !payload.is_empty() {
            debug!("Request body: {}", payload);
        }

        let mut request = self.client.request(method.clone(), &url);
        for (name, value) in content_type {
            request = request.header(*name, *value);
        }
        for (name, value) in signed {
            request = request.header(name, value);
        }
        if !payload.is_empty() {
            request = request.body(payload);
        }

        let response = request.send().await.map_err(Route53Error::Http)?;
        let status = response.status();

        if !status.is_success() {
            debug!("{} {} failed: {}", method, path, status);
            let text = response.text().await.unwrap_or_default();
            return Err(decode_error(status.as_u16(), &text));
        }

        response.text().await.map_err(Route53Error::Http)
    }
}

fn decode_xml<T: DeserializeOwned>(body: &str) -> Result<T, Route53Error> {
    quick_xml::de::from_str(body).map_err(|e| {
        Route53Error::Xml(format!(
            "error decoding response body: {} - Response (first 500 chars): {}",
            e,
            body.chars().take(500).collect::<String>()
        ))
    })
}

/// Map a failed Route53 response to an error
pub fn decode_error(status: u16, body: &str) -> Route53Error {
    if let Ok(response) = quick_xml::de::from_str::<ErrorResponse>(body) {
        let ErrorDetail { code, message, .. } = response.error;
        return match code.as_str() {
            "AccessDenied" => Route53Error::AccessDenied(message),
            "NoSuchHostedZone" => Route53Error::NotFound(message),
            "InvalidChangeBatch" => Route53Error::InvalidChangeBatch(message),
            _ if status == 403 => Route53Error::AccessDenied(format!("{}: {}", code, message)),
            _ => Route53Error::Api {
                status,
                code,
                message,
            },
        };
    }

    if let Ok(response) = quick_xml::de::from_str::<InvalidChangeBatchResponse>(body) {
        if !response.messages.items.is_empty() {
            return Route53Error::InvalidChangeBatch(response.messages.items.join("; "));
        }
    }

    let snippet = body.chars().take(500).collect::<String>();
    if status == 403 {
        return Route53Error::AccessDenied(snippet);
    }
    Route53Error::Api {
        status,
        code: "Unknown".to_string(),
        message: snippet,
    }
}
