//! AWS credential discovery
//!
//! Credentials come from `AWS_ACCESS_KEY_ID`/`AWS_SECRET_ACCESS_KEY`
//! (optionally `AWS_SESSION_TOKEN`) or, failing that, from a profile in the
//! shared credentials file selected by `AWS_PROFILE`.

use crate::error::Route53Error;
use std::fmt;
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_PROFILE: &str = "default";

/// Static AWS credentials used to sign requests
#[derive(Clone, PartialEq, Eq)]
pub struct AwsCredentials {
    access_key_id: String,
    secret_access_key: String,
    session_token: Option<String>,
}

impl fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &self.session_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl AwsCredentials {
    /// Create credentials from explicit values
    pub fn new(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: Option<String>,
    ) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token,
        }
    }

    /// Access key id
    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    /// Secret access key
    pub fn secret_access_key(&self) -> &str {
        &self.secret_access_key
    }

    /// Session token for temporary credentials
    pub fn session_token(&self) -> Option<&str> {
        self.session_token.as_deref()
    }

    /// Discover credentials from the process environment
    pub fn from_env() -> Result<Self, Route53Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Discover credentials through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Route53Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let (Some(id), Some(secret)) = (var("AWS_ACCESS_KEY_ID"), var("AWS_SECRET_ACCESS_KEY")) {
            debug!("Using AWS credentials from environment");
            return Ok(Self::new(id, secret, var("AWS_SESSION_TOKEN")));
        }

        let profile = var("AWS_PROFILE").unwrap_or_else(|| DEFAULT_PROFILE.to_string());
        let path = match var("AWS_SHARED_CREDENTIALS_FILE") {
            Some(path) => PathBuf::from(path),
            None => var("HOME")
                .map(|home| PathBuf::from(home).join(".aws").join("credentials"))
                .ok_or_else(|| {
                    Route53Error::MissingCredentials(
                        "AWS_ACCESS_KEY_ID/AWS_SECRET_ACCESS_KEY not set and HOME is unknown".to_string(),
                    )
                })?,
        };

        debug!("Reading AWS profile '{}' from {}", profile, path.display());
        let contents = std::fs::read_to_string(&path).map_err(|e| {
            Route53Error::MissingCredentials(format!(
                "AWS_ACCESS_KEY_ID/AWS_SECRET_ACCESS_KEY not set and {} is unreadable: {}",
                path.display(),
                e
            ))
        })?;

        Self::from_profile(&contents, &profile).ok_or_else(|| {
            Route53Error::MissingCredentials(format!(
                "profile '{}' in {} has no aws_access_key_id/aws_secret_access_key",
                profile,
                path.display()
            ))
        })
    }

    /// Parse one profile out of a shared credentials file
    ///
    /// Accepts both `[name]` and `[profile name]` section headers.
    pub fn from_profile(contents: &str, profile: &str) -> Option<Self> {
        let mut in_section = false;
        let mut access_key_id = None;
        let mut secret_access_key = None;
        let mut session_token = None;

        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
                continue;
            }
            if let Some(section) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                let section = section.trim();
                let name = section.strip_prefix("profile ").unwrap_or(section).trim();
                in_section = name == profile;
                continue;
            }
            if !in_section {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = value.trim().to_string();
            match key.trim().to_ascii_lowercase().as_str() {
                "aws_access_key_id" => access_key_id = Some(value),
                "aws_secret_access_key" => secret_access_key = Some(value),
                "aws_session_token" => session_token = Some(value),
                _ => {}
            }
        }

        Some(Self::new(access_key_id?, secret_access_key?, session_token))
    }
}
