//! Session token verification for the storefront.
//!
//! The auth API issues HS256-signed JWTs carrying the user id and role. This
//! crate only verifies; issuing lives server-side in the auth API. All
//! verification failures collapse into a single opaque error so callers
//! cannot (and must not) branch on *why* a token was rejected — expired,
//! malformed, and forged tokens all take the same refresh-or-reject path.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role claim carried in every session token.
///
/// Role is only ever taken from verified token claims (edge layer) or from
/// the auth API's user payload (client layer) — never inferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    User,
    SuperAdmin,
}

impl Role {
    /// Returns true for the super-admin role.
    pub fn is_super_admin(&self) -> bool {
        matches!(self, Role::SuperAdmin)
    }
}

/// Claims decoded from a valid session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject — the user id.
    pub sub: String,
    /// Role at issue time. A promoted/demoted user carries the old role
    /// until the token is re-issued.
    pub role: Role,
    /// Issued-at (unix seconds).
    pub iat: i64,
    /// Expiry (unix seconds).
    pub exp: i64,
}

/// Opaque verification failure.
///
/// Deliberately undifferentiated: structural, signature, and expiry failures
/// are indistinguishable to callers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("session token verification failed")]
pub struct VerificationError;

/// Verifies session tokens against a fixed secret.
///
/// The secret is process-wide configuration, loaded once at startup. The
/// verifier holds no mutable state and is safe to share across tasks.
pub struct SessionTokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl SessionTokenVerifier {
    /// Build a verifier from the shared signing secret.
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is a hard boundary; no clock leeway.
        validation.leeway = 0;
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Verify a token and extract its claims.
    ///
    /// Succeeds only if the signature checks out and the token has not
    /// expired.
    pub fn verify(&self, token: &str) -> Result<Claims, VerificationError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| VerificationError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-signing-secret";

    fn mint(role: Role, expires_in_secs: i64, secret: &str) -> String {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "user-123".to_string(),
            role,
            iat: now,
            exp: now + expires_in_secs,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_verify_valid_token() {
        let verifier = SessionTokenVerifier::new(SECRET);
        let token = mint(Role::User, 3600, SECRET);

        let claims = verifier.verify(&token).unwrap();
        assert_eq!(claims.sub, "user-123");
        assert_eq!(claims.role, Role::User);
    }

    #[test]
    fn test_verify_super_admin_role() {
        let verifier = SessionTokenVerifier::new(SECRET);
        let token = mint(Role::SuperAdmin, 3600, SECRET);

        let claims = verifier.verify(&token).unwrap();
        assert!(claims.role.is_super_admin());
    }

    #[test]
    fn test_reject_expired_token() {
        let verifier = SessionTokenVerifier::new(SECRET);
        let token = mint(Role::User, -120, SECRET);

        assert_eq!(verifier.verify(&token), Err(VerificationError));
    }

    #[test]
    fn test_reject_wrong_secret() {
        let verifier = SessionTokenVerifier::new(SECRET);
        let token = mint(Role::User, 3600, "some-other-secret");

        assert_eq!(verifier.verify(&token), Err(VerificationError));
    }

    #[test]
    fn test_reject_malformed_token() {
        let verifier = SessionTokenVerifier::new(SECRET);

        assert_eq!(verifier.verify("not-a-jwt"), Err(VerificationError));
        assert_eq!(verifier.verify(""), Err(VerificationError));
    }

    #[test]
    fn test_role_serialization_matches_api() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"USER\"");
        assert_eq!(
            serde_json::to_string(&Role::SuperAdmin).unwrap(),
            "\"SUPER_ADMIN\""
        );
    }
}
