//! AWS Signature Version 4 request signing
//!
//! Implements the subset of SigV4 Route53 needs: header-based signing of
//! requests with a fully buffered payload.

use crate::credentials::AwsCredentials;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";

type HmacSha256 = Hmac<Sha256>;

/// Route53 is a global service signed against `us-east-1`
pub const ROUTE53_REGION: &str = "us-east-1";
/// SigV4 service name for Route53
pub const ROUTE53_SERVICE: &str = "route53";

/// Signs requests for one service/region with one set of credentials
#[derive(Debug, Clone)]
pub struct RequestSigner {
    credentials: AwsCredentials,
    region: String,
    service: String,
}

/// The parts of a request that go into the signature
#[derive(Debug)]
pub struct SignableRequest<'a> {
    /// HTTP method, e.g. `GET`
    pub method: &'a str,
    /// `Host` header value
    pub host: &'a str,
    /// Absolute path, already URI-encoded
    pub path: &'a str,
    /// Already-encoded canonical query string (see [`canonical_query_string`])
    pub query: &'a str,
    /// Extra headers to sign besides `host`, `x-amz-date` and the session token
    pub headers: &'a [(&'a str, &'a str)],
    /// Request body (empty for GET)
    pub payload: &'a [u8],
}

impl RequestSigner {
    /// Create a signer
    pub fn new(credentials: AwsCredentials, region: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            credentials,
            region: region.into(),
            service: service.into(),
        }
    }

    /// Signer for Route53
    pub fn route53(credentials: AwsCredentials) -> Self {
        Self::new(credentials, ROUTE53_REGION, ROUTE53_SERVICE)
    }

    /// Sign a request, returning the headers to attach to it
    ///
    /// `host` is not returned; the HTTP client derives it from the URL.
    pub fn sign(&self, request: &SignableRequest<'_>, now: DateTime<Utc>) -> Vec<(String, String)> {
        let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
        let date = now.format("%Y%m%d").to_string();

        let mut headers: BTreeMap<String, String> = request
            .headers
            .iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), value.trim().to_string()))
            .collect();
        headers.insert("host".to_string(), request.host.to_string());
        headers.insert("x-amz-date".to_string(), amz_date.clone());
        if let Some(token) = self.credentials.session_token() {
            headers.insert("x-amz-security-token".to_string(), token.to_string());
        }

        let signed_headers = headers.keys().cloned().collect::<Vec<_>>().join(";");
        let canonical = canonical_request(
            request.method,
            request.path,
            request.query,
            &headers,
            &signed_headers,
            &hex_sha256(request.payload),
        );

        let scope = format!("{}/{}/{}/aws4_request", date, self.region, self.service);
        let to_sign = string_to_sign(&amz_date, &scope, &canonical);
        let key = signing_key(self.credentials.secret_access_key(), &date, &self.region, &self.service);
        let signature = hex::encode(hmac_sha256(&key, to_sign.as_bytes()));

        let authorization = format!(
            "{} Credential={}/{}, SignedHeaders={}, Signature={}",
            ALGORITHM,
            self.credentials.access_key_id(),
            scope,
            signed_headers,
            signature
        );

        let mut out = vec![
            ("x-amz-date".to_string(), amz_date),
            ("authorization".to_string(), authorization),
        ];
        if let Some(token) = self.credentials.session_token() {
            out.push(("x-amz-security-token".to_string(), token.to_string()));
        }
        out
    }
}

/// Build a canonical (sorted, RFC 3986 encoded) query string
pub fn canonical_query_string(params: &[(&str, &str)]) -> String {
    let mut encoded: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (urlencoding::encode(k).into_owned(), urlencoding::encode(v).into_owned()))
        .collect();
    encoded.sort();
    encoded
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&")
}

fn canonical_request(
    method: &str,
    path: &str,
    query: &str,
    headers: &BTreeMap<String, String>,
    signed_headers: &str,
    payload_hash: &str,
) -> String {
    let canonical_headers: String = headers
        .iter()
        .map(|(name, value)| format!("{}:{}\n", name, value))
        .collect();
    let path = if path.is_empty() { "/" } else { path };
    format!(
        "{}\n{}\n{}\n{}\n{}\n{}",
        method, path, query, canonical_headers, signed_headers, payload_hash
    )
}

fn string_to_sign(amz_date: &str, scope: &str, canonical_request: &str) -> String {
    format!(
        "{}\n{}\n{}\n{}",
        ALGORITHM,
        amz_date,
        scope,
        hex_sha256(canonical_request.as_bytes())
    )
}

/// Derive the SigV4 signing key for a date/region/service
pub fn signing_key(secret: &str, date: &str, region: &str, service: &str) -> Vec<u8> {
    let k_date = hmac_sha256(format!("AWS4{}", secret).as_bytes(), date.as_bytes());
    let k_region = hmac_sha256(&k_date, region.as_bytes());
    let k_service = hmac_sha256(&k_region, service.as_bytes());
    hmac_sha256(&k_service, b"aws4_request")
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let Ok(mut mac) = HmacSha256::new_from_slice(key) else {
        unreachable!("HMAC-SHA256 accepts keys of any length")
    };
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

fn hex_sha256(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}
