//! Token issuance, validation, and bounded refresh.
//!
//! Tokens are HS256 JWTs signed with a process-wide secret. No token state
//! is stored anywhere: [`TokenService`] recomputes [`TokenState`] from the
//! token bytes and the current time on every check, so two service instances
//! sharing a secret agree on every token.
//!
//! Refresh is only permitted inside a narrow window just before expiry:
//! an expired token can never be renewed, and a fresh one must wait.

use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::config::AuthConfig;
use crate::credentials::DynCredentialStorage;
use crate::error::{AuthError, AuthResult};

/// Claims carried by every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject username.
    pub sub: String,

    /// Expiry instant (Unix seconds).
    pub exp: i64,

    /// Issued-at instant (Unix seconds).
    pub iat: i64,
}

/// The state of a token at a given instant, recomputed per check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    /// Signature verifies and the expiry instant is still ahead.
    Valid,
    /// Signature verifies but the expiry instant has passed.
    Expired,
    /// Malformed token or signature failure.
    Invalid,
}

/// A minted token together with its expiry instant.
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    /// The encoded token.
    pub token: String,

    /// When the token stops being valid.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

type Clock = Arc<dyn Fn() -> OffsetDateTime + Send + Sync>;

/// Issues, validates, and refreshes bearer tokens against a credential store.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issue_ttl: Duration,
    refresh_ttl: Duration,
    refresh_window: Duration,
    credentials: DynCredentialStorage,
    clock: Clock,
}

impl TokenService {
    /// Creates a token service from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Configuration` if the configuration is invalid.
    pub fn new(config: &AuthConfig, credentials: DynCredentialStorage) -> AuthResult<Self> {
        config.validate()?;
        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            issue_ttl: config.issue_ttl,
            refresh_ttl: config.refresh_ttl,
            refresh_window: config.refresh_window,
            credentials,
            clock: Arc::new(OffsetDateTime::now_utc),
        })
    }

    /// Replaces the clock, for tests that need to move time.
    #[must_use]
    pub fn with_clock(
        mut self,
        clock: impl Fn() -> OffsetDateTime + Send + Sync + 'static,
    ) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    fn now(&self) -> OffsetDateTime {
        (self.clock)()
    }

    /// Checks the supplied credentials and mints a token on success.
    ///
    /// A missing username and a wrong password are indistinguishable in the
    /// returned error.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::AuthenticationFailed` on credential mismatch.
    pub async fn issue(&self, username: &str, password: &str) -> AuthResult<IssuedToken> {
        let credential = self
            .credentials
            .find_by_username(username)
            .await?
            .ok_or(AuthError::AuthenticationFailed)?;

        if !credential.matches(password) {
            return Err(AuthError::AuthenticationFailed);
        }

        tracing::debug!(subject = %username, "token issued");
        self.mint(username, self.issue_ttl)
    }

    /// Validates a token and returns its subject.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Unauthorized` for malformed, forged, or expired
    /// tokens.
    pub fn validate(&self, token: &str) -> AuthResult<String> {
        let claims = self
            .decode_claims(token)
            .map_err(|e| AuthError::unauthorized(e.to_string()))?;

        match self.state_of(&claims) {
            TokenState::Valid => Ok(claims.sub),
            _ => Err(AuthError::unauthorized("token expired")),
        }
    }

    /// Exchanges a near-expiry token for a fresh one with the same subject.
    ///
    /// Eligible only while `0 < remaining <= refresh_window`.
    ///
    /// # Errors
    ///
    /// - `AuthError::InvalidToken` for malformed or forged tokens
    /// - `AuthError::RefreshNotEligible` for already-expired tokens
    /// - `AuthError::RefreshTooEarly` for tokens with too much time left
    pub fn refresh(&self, token: &str) -> AuthResult<IssuedToken> {
        let claims = self.decode_claims(token)?;

        let remaining = claims.exp - self.now().unix_timestamp();
        if remaining <= 0 {
            return Err(AuthError::RefreshNotEligible);
        }
        if remaining > self.refresh_window.as_secs() as i64 {
            return Err(AuthError::RefreshTooEarly);
        }

        tracing::debug!(subject = %claims.sub, remaining_secs = remaining, "token refreshed");
        self.mint(&claims.sub, self.refresh_ttl)
    }

    /// Classifies a token at the current instant.
    #[must_use]
    pub fn classify(&self, token: &str) -> TokenState {
        match self.decode_claims(token) {
            Ok(claims) => self.state_of(&claims),
            Err(_) => TokenState::Invalid,
        }
    }

    fn state_of(&self, claims: &TokenClaims) -> TokenState {
        if self.now().unix_timestamp() < claims.exp {
            TokenState::Valid
        } else {
            TokenState::Expired
        }
    }

    /// Verifies signature and shape only; expiry is judged separately so the
    /// refresh path can see expired-but-genuine tokens.
    fn decode_claims(&self, token: &str) -> AuthResult<TokenClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| AuthError::invalid_token(e.to_string()))
    }

    fn mint(&self, subject: &str, ttl: Duration) -> AuthResult<IssuedToken> {
        let now = self.now();
        let expires_at = now + ttl;
        let claims = TokenClaims {
            sub: subject.to_string(),
            exp: expires_at.unix_timestamp(),
            iat: now.unix_timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::internal(format!("token encoding failed: {e}")))?;

        Ok(IssuedToken { token, expires_at })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::{Credential, CredentialStorage, MemoryCredentialStorage};

    const SECRET: &str = "unit-test-secret";

    async fn credentials() -> DynCredentialStorage {
        let storage = MemoryCredentialStorage::new();
        storage
            .upsert(Credential::new("admin", "hunter2"))
            .await
            .unwrap();
        Arc::new(storage)
    }

    fn config() -> AuthConfig {
        AuthConfig {
            secret: SECRET.to_string(),
            ..AuthConfig::default()
        }
    }

    fn service_at(
        credentials: DynCredentialStorage,
        at: OffsetDateTime,
    ) -> TokenService {
        TokenService::new(&config(), credentials)
            .unwrap()
            .with_clock(move || at)
    }

    fn t0() -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap()
    }

    #[tokio::test]
    async fn issue_then_validate_yields_subject() {
        let service = service_at(credentials().await, t0());
        let issued = service.issue("admin", "hunter2").await.unwrap();

        assert_eq!(issued.expires_at, t0() + Duration::from_secs(600));
        assert_eq!(service.validate(&issued.token).unwrap(), "admin");
        assert_eq!(service.classify(&issued.token), TokenState::Valid);
    }

    #[tokio::test]
    async fn issue_rejects_wrong_password_and_unknown_user_alike() {
        let service = service_at(credentials().await, t0());

        let wrong_password = service.issue("admin", "nope").await.unwrap_err();
        let unknown_user = service.issue("ghost", "hunter2").await.unwrap_err();
        assert_eq!(wrong_password.to_string(), unknown_user.to_string());
        assert!(matches!(wrong_password, AuthError::AuthenticationFailed));
    }

    #[tokio::test]
    async fn validate_rejects_expired_token() {
        let creds = credentials().await;
        let issued = service_at(creds.clone(), t0())
            .issue("admin", "hunter2")
            .await
            .unwrap();

        let later = service_at(creds, t0() + Duration::from_secs(601));
        let err = later.validate(&issued.token).unwrap_err();
        assert!(matches!(err, AuthError::Unauthorized { .. }));
        assert_eq!(later.classify(&issued.token), TokenState::Expired);
    }

    #[tokio::test]
    async fn validate_rejects_forged_token() {
        let creds = credentials().await;
        let service = service_at(creds.clone(), t0());

        let mut forged_config = config();
        forged_config.secret = "some-other-secret".to_string();
        let forger = TokenService::new(&forged_config, creds)
            .unwrap()
            .with_clock(t0);
        let forged = forger.issue("admin", "hunter2").await.unwrap();

        assert!(service.validate(&forged.token).is_err());
        assert_eq!(service.classify(&forged.token), TokenState::Invalid);
        assert_eq!(service.classify("not-a-token"), TokenState::Invalid);
    }

    #[tokio::test]
    async fn refresh_rejects_fresh_token_as_too_early() {
        let service = service_at(credentials().await, t0());
        let issued = service.issue("admin", "hunter2").await.unwrap();

        let err = service.refresh(&issued.token).unwrap_err();
        assert!(matches!(err, AuthError::RefreshTooEarly));
    }

    #[tokio::test]
    async fn refresh_rejects_expired_token() {
        let creds = credentials().await;
        let issued = service_at(creds.clone(), t0())
            .issue("admin", "hunter2")
            .await
            .unwrap();

        let later = service_at(creds, t0() + Duration::from_secs(600));
        let err = later.refresh(&issued.token).unwrap_err();
        assert!(matches!(err, AuthError::RefreshNotEligible));
    }

    #[tokio::test]
    async fn refresh_inside_window_mints_later_expiry() {
        let creds = credentials().await;
        let issued = service_at(creds.clone(), t0())
            .issue("admin", "hunter2")
            .await
            .unwrap();

        // 20s of lifetime left, inside the 30s window.
        let near_expiry = t0() + Duration::from_secs(580);
        let later = service_at(creds, near_expiry);
        let refreshed = later.refresh(&issued.token).unwrap();

        assert!(refreshed.expires_at > issued.expires_at);
        assert_eq!(refreshed.expires_at, near_expiry + Duration::from_secs(300));
        assert_eq!(later.validate(&refreshed.token).unwrap(), "admin");
    }

    #[tokio::test]
    async fn refresh_rejects_malformed_token() {
        let service = service_at(credentials().await, t0());
        let err = service.refresh("garbage").unwrap_err();
        assert!(matches!(err, AuthError::InvalidToken { .. }));
    }
}
