use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use rogerbank_core::UserId;

/// Bearer token claims.
///
/// `id` carries the authenticated user. `iat`/`exp` are Unix seconds, as the
/// JWT registered claims require.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Authenticated user.
    pub id: UserId,

    /// Issued-at (Unix seconds).
    pub iat: i64,

    /// Expiration (Unix seconds).
    pub exp: i64,
}

impl JwtClaims {
    /// Claims for `user_id`, valid from `now` for `ttl`.
    pub fn new(user_id: UserId, now: DateTime<Utc>, ttl: Duration) -> Self {
        let iat = now.timestamp();
        Self {
            id: user_id,
            iat,
            exp: iat + ttl.num_seconds(),
        }
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.iat, 0).single()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.exp, 0).single()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,
}

/// Deterministically validate the claim time window against `now`.
///
/// Signature verification happens before this, in [`crate::jwt`].
pub fn validate_claims(claims: &JwtClaims, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
    let now = now.timestamp();
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.iat {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.exp {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_is_half_open() {
        let now = Utc::now();
        let claims = JwtClaims::new(UserId::new(), now, Duration::hours(1));

        assert_eq!(claims.exp - claims.iat, 3600);
        assert_eq!(validate_claims(&claims, now), Ok(()));
        assert_eq!(
            validate_claims(&claims, now + Duration::seconds(3599)),
            Ok(())
        );
        assert_eq!(
            validate_claims(&claims, now + Duration::seconds(3600)),
            Err(TokenValidationError::Expired)
        );
    }

    #[test]
    fn future_and_inverted_tokens_are_rejected() {
        let now = Utc::now();
        let claims = JwtClaims::new(UserId::new(), now + Duration::minutes(5), Duration::hours(1));
        assert_eq!(
            validate_claims(&claims, now),
            Err(TokenValidationError::NotYetValid)
        );

        let inverted = JwtClaims {
            exp: claims.iat,
            ..claims
        };
        assert_eq!(
            validate_claims(&inverted, now),
            Err(TokenValidationError::InvalidTimeWindow)
        );
    }

    #[test]
    fn exposes_timestamps() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let claims = JwtClaims::new(UserId::new(), now, Duration::hours(1));
        assert_eq!(claims.issued_at(), Some(now));
        assert_eq!(claims.expires_at(), Some(now + Duration::hours(1)));
    }
}
