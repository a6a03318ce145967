//! Signed session tokens (HS256 JWT).

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use crate::{validate_claims, JwtClaims, PublicUser, TokenValidationError};

/// Lifetime of an issued token, in minutes.
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 120;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("failed to sign token: {0}")]
    Encode(String),

    #[error("token rejected: {0}")]
    Invalid(String),

    #[error(transparent)]
    Claims(#[from] TokenValidationError),
}

/// Opaque sign/verify boundary.
///
/// `now` is passed in explicitly so expiry is deterministic under test.
pub trait TokenCodec: Send + Sync {
    fn issue(&self, user: &PublicUser, now: DateTime<Utc>) -> Result<String, TokenError>;

    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenError>;
}

/// Symmetric HS256 codec sharing one secret between signing and verification.
pub struct Hs256TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl Hs256TokenCodec {
    pub fn new(secret: &[u8]) -> Self {
        Self::with_ttl(secret, Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES))
    }

    pub fn with_ttl(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        // Time checks are done by `validate_claims` against the caller's clock.
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.set_required_spec_claims(&["exp"]);
        validation
    }
}

impl core::fmt::Debug for Hs256TokenCodec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Hs256TokenCodec")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenCodec for Hs256TokenCodec {
    fn issue(&self, user: &PublicUser, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = JwtClaims::new(user.clone(), now, now + self.ttl);
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Encode(e.to_string()))
    }

    fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenError> {
        let data = jsonwebtoken::decode::<JwtClaims>(token, &self.decoding, &Self::validation())
            .map_err(|e| TokenError::Invalid(e.to_string()))?;
        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maintrack_core::UserId;

    use crate::Role;

    fn user() -> PublicUser {
        PublicUser {
            id: UserId::new(),
            name: "Mia".into(),
            email: "mia@example.com".into(),
            role: Role::Manager,
        }
    }

    #[test]
    fn round_trip_yields_issued_user() {
        let codec = Hs256TokenCodec::new(b"test-secret");
        let now = Utc::now();
        let u = user();
        let token = codec.issue(&u, now).unwrap();
        let claims = codec.verify(&token, now + Duration::minutes(1)).unwrap();
        assert_eq!(claims.user, u);
        assert_eq!(claims.exp - claims.iat, 2 * 60 * 60);
    }

    #[test]
    fn expired_token_is_rejected() {
        let codec = Hs256TokenCodec::new(b"test-secret");
        let now = Utc::now();
        let token = codec.issue(&user(), now).unwrap();
        let err = codec.verify(&token, now + Duration::hours(2)).unwrap_err();
        assert_eq!(err, TokenError::Claims(TokenValidationError::Expired));
    }

    #[test]
    fn foreign_signature_is_rejected() {
        let ours = Hs256TokenCodec::new(b"test-secret");
        let theirs = Hs256TokenCodec::new(b"other-secret");
        let now = Utc::now();
        let token = theirs.issue(&user(), now).unwrap();
        assert!(matches!(ours.verify(&token, now), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn garbage_is_rejected() {
        let codec = Hs256TokenCodec::new(b"test-secret");
        assert!(matches!(
            codec.verify("not.a.jwt", Utc::now()),
            Err(TokenError::Invalid(_))
        ));
        assert!(matches!(codec.verify("", Utc::now()), Err(TokenError::Invalid(_))));
    }

    #[test]
    fn custom_ttl_is_honored() {
        let codec = Hs256TokenCodec::with_ttl(b"test-secret", Duration::minutes(5));
        let now = Utc::now();
        let token = codec.issue(&user(), now).unwrap();
        assert!(codec.verify(&token, now + Duration::minutes(4)).is_ok());
        assert!(codec.verify(&token, now + Duration::minutes(5)).is_err());
    }
}
