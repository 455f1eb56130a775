use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use shoploom_core::{TenantId, UserId};

use crate::Principal;

/// JWT claims model (transport-agnostic).
///
/// The minimal set of claims expected once a token has been decoded and its
/// signature verified. The tenant always travels in the token; request
/// bodies never carry one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject / user identifier.
    pub sub: UserId,

    /// Business the token is scoped to.
    pub tenant_id: TenantId,

    /// Whether the subject owns the business.
    pub is_owner: bool,

    /// Whether the subject is a staff member.
    pub is_staff: bool,

    /// Issued-at timestamp.
    pub issued_at: DateTime<Utc>,

    /// Expiration timestamp.
    pub expires_at: DateTime<Utc>,
}

impl Claims {
    /// Resolve the principal these claims represent.
    pub fn principal(&self) -> Principal {
        Principal::new(self.sub, Some(self.tenant_id), self.is_owner, self.is_staff)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expires_at <= issued_at)")]
    InvalidTimeWindow,

    #[error("malformed token: {0}")]
    Malformed(String),
}

/// Deterministically validate JWT claims.
///
/// Note: this validates the *claims* only. Signature verification / decoding
/// is the validator's job.
pub fn validate_claims(claims: &Claims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    if claims.expires_at <= claims.issued_at {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.issued_at {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.expires_at {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

/// Token verification boundary consumed by the HTTP middleware.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenValidationError>;
}

/// HS256 (shared-secret) token validator.
pub struct Hs256JwtValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl Hs256JwtValidator {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Time-window checks run through `validate_claims` against an
        // explicit `now`, not the decoder's wall clock.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_ref()),
            validation,
        }
    }
}

impl JwtValidator for Hs256JwtValidator {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenValidationError> {
        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| TokenValidationError::Malformed(e.to_string()))?;

        validate_claims(&data.claims, now)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use jsonwebtoken::{EncodingKey, Header};

    fn mint(secret: &str, claims: &Claims) -> String {
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn claims_at(now: DateTime<Utc>) -> Claims {
        Claims {
            sub: UserId::new(),
            tenant_id: TenantId::new(),
            is_owner: true,
            is_staff: false,
            issued_at: now,
            expires_at: now + Duration::minutes(10),
        }
    }

    #[test]
    fn valid_token_round_trips() {
        let now = Utc::now();
        let claims = claims_at(now);
        let token = mint("secret", &claims);

        let validator = Hs256JwtValidator::new("secret");
        let decoded = validator.validate(&token, now + Duration::minutes(1)).unwrap();
        assert_eq!(decoded, claims);
        assert_eq!(decoded.principal().tenant_id, Some(claims.tenant_id));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let now = Utc::now();
        let token = mint("secret", &claims_at(now));

        let validator = Hs256JwtValidator::new("other-secret");
        let err = validator.validate(&token, now).unwrap_err();
        assert!(matches!(err, TokenValidationError::Malformed(_)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let now = Utc::now();
        let token = mint("secret", &claims_at(now));

        let validator = Hs256JwtValidator::new("secret");
        let err = validator
            .validate(&token, now + Duration::minutes(11))
            .unwrap_err();
        assert_eq!(err, TokenValidationError::Expired);
    }

    #[test]
    fn future_token_is_rejected() {
        let now = Utc::now();
        let token = mint("secret", &claims_at(now + Duration::minutes(5)));

        let validator = Hs256JwtValidator::new("secret");
        let err = validator.validate(&token, now).unwrap_err();
        assert_eq!(err, TokenValidationError::NotYetValid);
    }

    #[test]
    fn inverted_time_window_is_rejected() {
        let now = Utc::now();
        let mut claims = claims_at(now);
        claims.expires_at = claims.issued_at - Duration::minutes(1);

        let err = validate_claims(&claims, now).unwrap_err();
        assert_eq!(err, TokenValidationError::InvalidTimeWindow);
    }
}
