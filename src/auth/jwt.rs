//! JWT token handling

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::models::{AuthenticatedPrincipal, Principal, Role};
use crate::config::AuthConfig;
use crate::error::{Error, Result};

/// Why a presented token was refused
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,

    #[error("token signature is invalid")]
    BadSignature,

    #[error("token has expired")]
    Expired,
}

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ClaimSet {
    /// Subject (principal ID)
    pub sub: String,
    /// Granted roles
    pub roles: BTreeSet<Role>,
    /// Issued at, seconds since the epoch
    pub iat: i64,
    /// Expiration, whole seconds since the epoch
    pub exp: i64,
    /// Sub-second part of the expiration
    #[serde(default)]
    pub exp_nsec: u32,
}

impl ClaimSet {
    fn for_principal(principal: &Principal, now: DateTime<Utc>, ttl: Duration) -> Self {
        let expires_at = now + ttl;
        Self {
            sub: principal.id.clone(),
            roles: principal.roles.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            exp_nsec: expires_at.timestamp_subsec_nanos(),
        }
    }

    /// Check expiry against an explicit clock reading, to the nanosecond
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        (now.timestamp(), now.timestamp_subsec_nanos()) >= (self.exp, self.exp_nsec)
    }
}

impl From<ClaimSet> for AuthenticatedPrincipal {
    fn from(claims: ClaimSet) -> Self {
        Self {
            id: claims.sub,
            roles: claims.roles,
        }
    }
}

/// A signed, compact token string
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Issues and verifies HS256 session tokens with one process-wide key
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    /// Same checks minus the signature, used to tell a bad signature from a broken token
    structure: Validation,
    ttl: Duration,
}

impl TokenCodec {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked in verify_at so the clock can be supplied
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let mut structure = validation.clone();
        structure.insecure_disable_signature_validation();

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            structure,
            ttl,
        }
    }

    /// Build a codec from the `[auth]` config section
    pub fn from_config(config: &AuthConfig) -> Result<Self> {
        if config.jwt_secret.is_empty() {
            return Err(Error::Config("auth.jwt_secret must not be empty".to_string()));
        }
        if config.token_ttl_secs == 0 {
            return Err(Error::Config("auth.token_ttl_secs must be positive".to_string()));
        }
        let ttl = i64::try_from(config.token_ttl_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .ok_or_else(|| Error::Config("auth.token_ttl_secs is too large".to_string()))?;

        Ok(Self::new(config.jwt_secret.as_bytes(), ttl))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Create a token for an authenticated principal
    pub fn issue(&self, principal: &Principal) -> Result<SessionToken> {
        self.issue_at(principal, Utc::now())
    }

    /// Create a token as if issued at `now`
    pub fn issue_at(&self, principal: &Principal, now: DateTime<Utc>) -> Result<SessionToken> {
        let claims = ClaimSet::for_principal(principal, now, self.ttl);
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map(SessionToken)
            .map_err(|e| Error::TokenIssue(e.to_string()))
    }

    /// Validate and decode a token against the current time
    pub fn verify(&self, token: &str) -> std::result::Result<ClaimSet, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Validate and decode a token against an explicit clock reading
    pub fn verify_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> std::result::Result<ClaimSet, TokenError> {
        let claims = decode::<ClaimSet>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| self.classify(token, e.kind()))?;

        if claims.is_expired_at(now) {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    /// A token whose header and claims parse cleanly but still fails
    /// verification has a bad signature segment, whether it is the wrong
    /// MAC, undecodable base64 or the wrong length.
    fn classify(&self, token: &str, kind: &ErrorKind) -> TokenError {
        if matches!(kind, ErrorKind::InvalidSignature)
            || decode::<ClaimSet>(token, &self.decoding_key, &self.structure).is_ok()
        {
            TokenError::BadSignature
        } else {
            TokenError::Malformed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn codec() -> TokenCodec {
        TokenCodec::new(b"unit-test-secret", Duration::seconds(3600))
    }

    fn patient() -> Principal {
        Principal::new("42", "pat@x.com", "hash", [Role::Patient]).unwrap()
    }

    #[test]
    fn test_issue_and_verify_token() {
        let token = codec().issue(&patient()).expect("Failed to create token");
        let claims = codec().verify(token.as_str()).expect("Failed to validate token");

        assert_eq!(claims.sub, "42");
        assert!(claims.roles.contains(&Role::Patient));
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_token_is_three_segments() {
        let token = codec().issue(&patient()).unwrap();
        assert_eq!(token.as_str().split('.').count(), 3);
    }

    #[test]
    fn test_expiry_window() {
        let t0 = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        let token = codec().issue_at(&patient(), t0).unwrap();

        assert!(codec().verify_at(token.as_str(), t0).is_ok());
        assert!(codec()
            .verify_at(token.as_str(), t0 + Duration::seconds(3599))
            .is_ok());
        assert_eq!(
            codec().verify_at(token.as_str(), t0 + Duration::seconds(3600)),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn test_expiry_keeps_sub_second_precision() {
        let t0 = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap() + Duration::milliseconds(700);
        let codec = TokenCodec::new(b"unit-test-secret", Duration::seconds(600));
        let token = codec.issue_at(&patient(), t0).unwrap();
        let expiry = t0 + Duration::seconds(600);

        assert!(codec.verify_at(token.as_str(), expiry - Duration::milliseconds(500)).is_ok());
        assert!(codec.verify_at(token.as_str(), expiry - Duration::nanoseconds(1)).is_ok());
        assert_eq!(codec.verify_at(token.as_str(), expiry), Err(TokenError::Expired));
    }

    #[test]
    fn test_undecodable_signature_is_bad_signature() {
        let token = codec().issue(&patient()).unwrap();
        let (head, _) = token.as_str().rsplit_once('.').unwrap();

        for signature in ["", "!!!!", "AAAA", "not~base64"] {
            let forged = format!("{}.{}", head, signature);
            assert_eq!(codec().verify(&forged), Err(TokenError::BadSignature), "{:?}", signature);
        }
    }

    #[test]
    fn test_wrong_key_is_bad_signature() {
        let token = codec().issue(&patient()).unwrap();
        let other = TokenCodec::new(b"another-secret", Duration::seconds(3600));
        assert_eq!(other.verify(token.as_str()), Err(TokenError::BadSignature));
    }

    #[test]
    fn test_garbage_is_malformed() {
        assert_eq!(codec().verify("not-a-jwt-token"), Err(TokenError::Malformed));
        assert_eq!(codec().verify(""), Err(TokenError::Malformed));
    }

    #[test]
    fn test_from_config_rejects_empty_secret() {
        let config = AuthConfig {
            jwt_secret: String::new(),
            ..AuthConfig::default()
        };
        assert!(matches!(TokenCodec::from_config(&config), Err(Error::Config(_))));
    }
}
