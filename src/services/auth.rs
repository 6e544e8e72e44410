//! Authentication service implementation
//!
//! This service handles password digests and the signed bearer tokens
//! identifying API callers. Session tokens carry only the user id; reset and
//! verification tokens add a `purpose` claim so they cannot be used as
//! bearer credentials.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::utils::errors::{EventHubError, Result};

const SALT_BYTES: usize = 16;
const DIGEST_ROUNDS: u32 = 10_000;

/// Salted, iterated SHA-256 password digests stored as `salt$digest`
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordHasher;

impl PasswordHasher {
    pub fn hash(&self, password: &str) -> String {
        let mut salt = [0u8; SALT_BYTES];
        rand::thread_rng().fill_bytes(&mut salt);
        let digest = Self::digest(&salt, password);
        format!("{}${}", STANDARD.encode(salt), STANDARD.encode(digest))
    }

    /// Compare `password` against a stored `salt$digest` pair.
    /// Malformed stored values never match.
    pub fn verify(&self, password: &str, stored: &str) -> bool {
        let Some((salt, expected)) = stored.split_once('$') else {
            return false;
        };
        let (Ok(salt), Ok(expected)) = (STANDARD.decode(salt), STANDARD.decode(expected)) else {
            return false;
        };

        let actual = Self::digest(&salt, password);
        actual.len() == expected.len()
            && actual
                .iter()
                .zip(expected.iter())
                .fold(0u8, |acc, (a, b)| acc | (a ^ b))
                == 0
    }

    fn digest(salt: &[u8], password: &str) -> Vec<u8> {
        let mut hasher = Sha256::new();
        hasher.update(salt);
        hasher.update(password.as_bytes());
        let mut digest = hasher.finalize();

        for _ in 1..DIGEST_ROUNDS {
            let mut hasher = Sha256::new();
            hasher.update(salt);
            hasher.update(digest);
            digest = hasher.finalize();
        }

        digest.to_vec()
    }
}

/// Non-session token kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    PasswordReset,
    EmailVerification,
}

impl TokenPurpose {
    fn lifetime(&self) -> Duration {
        match self {
            TokenPurpose::PasswordReset => Duration::hours(1),
            TokenPurpose::EmailVerification => Duration::days(7),
        }
    }
}

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id: Uuid,
    pub exp: i64,
    pub iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<TokenPurpose>,
}

/// Authentication service for passwords and tokens
#[derive(Clone)]
pub struct AuthService {
    config: AuthConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    hasher: PasswordHasher,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("token_ttl_days", &self.config.token_ttl_days)
            .finish()
    }
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(config: AuthConfig) -> Self {
        let secret = config.jwt_secret.as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            hasher: PasswordHasher,
            config,
        }
    }

    pub fn hash_password(&self, password: &str) -> String {
        self.hasher.hash(password)
    }

    pub fn verify_password(&self, password: &str, stored: &str) -> bool {
        self.hasher.verify(password, stored)
    }

    /// Session token valid for the configured number of days
    pub fn generate_token(&self, user_id: Uuid) -> Result<String> {
        self.sign(user_id, Duration::days(self.config.token_ttl_days), None)
    }

    pub fn generate_password_reset_token(&self, user_id: Uuid) -> Result<String> {
        let purpose = TokenPurpose::PasswordReset;
        self.sign(user_id, purpose.lifetime(), Some(purpose))
    }

    pub fn generate_email_verification_token(&self, user_id: Uuid) -> Result<String> {
        let purpose = TokenPurpose::EmailVerification;
        self.sign(user_id, purpose.lifetime(), Some(purpose))
    }

    /// Verify a bearer token and return the user id it names
    pub fn verify_session_token(&self, token: &str) -> Result<Uuid> {
        let claims = self.decode(token)?;
        if let Some(purpose) = claims.purpose {
            warn!(user_id = %claims.id, purpose = ?purpose, "Purpose token presented as bearer credential");
            return Err(EventHubError::Unauthorized("Not authorized, invalid token".to_string()));
        }
        Ok(claims.id)
    }

    /// Verify a reset or verification token of the given kind
    pub fn verify_purpose_token(&self, token: &str, purpose: TokenPurpose) -> Result<Uuid> {
        let claims = self.decode(token)?;
        if claims.purpose != Some(purpose) {
            return Err(EventHubError::Unauthorized("Token has the wrong purpose".to_string()));
        }
        Ok(claims.id)
    }

    fn sign(&self, user_id: Uuid, lifetime: Duration, purpose: Option<TokenPurpose>) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            id: user_id,
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
            purpose,
        };

        debug!(user_id = %user_id, purpose = ?purpose, "Issuing token");
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?)
    }

    fn decode(&self, token: &str) -> Result<Claims> {
        let validation = Validation::new(Algorithm::HS256);
        Ok(decode::<Claims>(token, &self.decoding_key, &validation)?.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use assert_matches::assert_matches;

    fn service() -> AuthService {
        AuthService::new(Settings::default().auth)
    }

    #[test]
    fn test_password_round_trip() {
        let hasher = PasswordHasher;
        let stored = hasher.hash("secret1");

        assert!(stored.contains('$'));
        assert!(hasher.verify("secret1", &stored));
        assert!(!hasher.verify("secret2", &stored));
        assert!(!hasher.verify("secret1", "not-a-digest"));
    }

    #[test]
    fn test_same_password_gets_distinct_salts() {
        let hasher = PasswordHasher;
        assert_ne!(hasher.hash("secret1"), hasher.hash("secret1"));
    }

    #[test]
    fn test_session_token() {
        let auth = service();
        let id = Uuid::new_v4();
        let token = auth.generate_token(id).unwrap();
        assert_eq!(auth.verify_session_token(&token).unwrap(), id);
    }

    #[test]
    fn test_purpose_tokens_are_not_session_tokens() {
        let auth = service();
        let id = Uuid::new_v4();

        let reset = auth.generate_password_reset_token(id).unwrap();
        assert_matches!(auth.verify_session_token(&reset), Err(EventHubError::Unauthorized(_)));
        assert_eq!(auth.verify_purpose_token(&reset, TokenPurpose::PasswordReset).unwrap(), id);
        assert!(auth
            .verify_purpose_token(&reset, TokenPurpose::EmailVerification)
            .is_err());
    }

    #[test]
    fn test_foreign_signature_rejected() {
        let mut other = Settings::default().auth;
        other.jwt_secret = "a-completely-different-secret".to_string();
        let token = AuthService::new(other).generate_token(Uuid::new_v4()).unwrap();

        assert_matches!(service().verify_session_token(&token), Err(EventHubError::Token(_)));
    }
}
