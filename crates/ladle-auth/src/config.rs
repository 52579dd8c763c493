//! Token authority configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Configuration for the token authority.
///
/// The signing secret is injected once at startup and lives for the process
/// lifetime; it is never a mutable runtime global.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC-SHA256 signing secret. Required; tokens from one secret never
    /// verify under another.
    #[serde(default)]
    pub secret: String,

    /// Lifetime of a freshly issued token.
    #[serde(with = "humantime_serde", default = "default_issue_ttl")]
    pub issue_ttl: Duration,

    /// Lifetime of a refreshed token.
    #[serde(with = "humantime_serde", default = "default_refresh_ttl")]
    pub refresh_ttl: Duration,

    /// How close to expiry a token must be before it may be exchanged for a
    /// new one. Keeping this narrow prevents indefinite silent renewal.
    #[serde(with = "humantime_serde", default = "default_refresh_window")]
    pub refresh_window: Duration,
}

fn default_issue_ttl() -> Duration {
    Duration::from_secs(10 * 60)
}
fn default_refresh_ttl() -> Duration {
    Duration::from_secs(5 * 60)
}
fn default_refresh_window() -> Duration {
    Duration::from_secs(30)
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            issue_ttl: default_issue_ttl(),
            refresh_ttl: default_refresh_ttl(),
            refresh_window: default_refresh_window(),
        }
    }
}

impl AuthConfig {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Configuration` for an empty secret or degenerate
    /// durations.
    pub fn validate(&self) -> Result<(), AuthError> {
        if self.secret.is_empty() {
            return Err(AuthError::configuration("auth.secret must be set"));
        }
        if self.issue_ttl.is_zero() || self.refresh_ttl.is_zero() {
            return Err(AuthError::configuration("token lifetimes must be > 0"));
        }
        if self.refresh_window.is_zero() {
            return Err(AuthError::configuration("auth.refresh_window must be > 0"));
        }
        if self.refresh_window >= self.issue_ttl {
            return Err(AuthError::configuration(
                "auth.refresh_window must be shorter than auth.issue_ttl",
            ));
        }
        Ok(())
    }
}
