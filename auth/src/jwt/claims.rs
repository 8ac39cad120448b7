use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Claims carried by every bearer token.
///
/// Only the three registered claims the service relies on are modelled.
/// All of them are required: a payload missing any field does not decode.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (login key of the principal)
    pub sub: String,

    /// Issued at (Unix timestamp, seconds)
    pub iat: i64,

    /// Expiration time (Unix timestamp, seconds)
    pub exp: i64,
}

impl Claims {
    /// Create claims for a subject issued at `now` and valid for `ttl`.
    ///
    /// # Arguments
    /// * `subject` - Principal identifier stored in `sub`
    /// * `now` - Issue instant
    /// * `ttl` - Lifetime of the token
    ///
    /// # Returns
    /// Claims with `sub`, `iat` and `exp` set
    pub fn for_subject(subject: impl ToString, now: DateTime<Utc>, ttl: Duration) -> Self {
        let expiration = now + ttl;

        Self {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
        }
    }

    /// Check if the token is expired at `current_timestamp`.
    ///
    /// A token stops being valid at the exact second of `exp`.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        current_timestamp >= self.exp
    }
}
