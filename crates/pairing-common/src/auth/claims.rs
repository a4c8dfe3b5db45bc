//! Access-token claims
//!
//! The identity provider signs tokens with a key the client never sees, so
//! claims are read without verifying the signature. The GraphQL server does
//! the verification; the client only needs the subject and expiry to decide
//! when to refresh.

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Claims carried by an identity-provider access token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject (user ID)
    pub sub: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    #[serde(default)]
    pub iat: i64,
    /// Provider-level role (e.g. "authenticated"), unrelated to the app role
    #[serde(default)]
    pub role: Option<String>,
}

impl SessionClaims {
    /// Read the claims of `token` without checking its signature or expiry
    ///
    /// # Errors
    /// Returns `AppError::InvalidToken` if the token is not a well-formed JWT
    pub fn decode_unverified(token: &str) -> Result<Self, AppError> {
        let header = jsonwebtoken::decode_header(token).map_err(|_| AppError::InvalidToken)?;

        let mut validation = Validation::new(header.alg);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        decode::<Self>(token, &DecodingKey::from_secret(&[]), &validation)
            .map(|data| data.claims)
            .map_err(|_| AppError::InvalidToken)
    }

    /// Expiry as a timestamp
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }

    /// Check if the token is expired
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Check if the token expires within `window` from now
    #[must_use]
    pub fn expires_within(&self, window: Duration) -> bool {
        self.expires_at().map_or(true, |at| at - Utc::now() <= window)
    }
}
