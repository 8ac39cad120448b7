use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::jwt::Claims;
use crate::jwt::JwtError;
use crate::jwt::JwtHandler;

/// Anything a token can be issued for.
///
/// Services implement this on their own identity type; the subject is
/// what ends up in the `sub` claim.
pub trait Principal {
    fn subject(&self) -> &str;
}

impl Principal for str {
    fn subject(&self) -> &str {
        self
    }
}

impl Principal for String {
    fn subject(&self) -> &str {
        self.as_str()
    }
}

/// Issues and verifies self-contained bearer tokens.
///
/// Every operation is a pure computation over the server secret and the
/// clock; nothing here touches storage. The `*_at` variants take the clock
/// explicitly.
pub struct TokenCodec {
    jwt_handler: JwtHandler,
    ttl: Duration,
}

impl TokenCodec {
    /// Create a codec signing with `secret` and issuing tokens valid for `ttl`.
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            jwt_handler: JwtHandler::new(secret),
            ttl,
        }
    }

    /// Lifetime given to every issued token.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `principal`, valid from now for the configured ttl.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn issue<P: Principal + ?Sized>(&self, principal: &P) -> Result<String, JwtError> {
        self.issue_at(principal, Utc::now())
    }

    pub fn issue_at<P: Principal + ?Sized>(
        &self,
        principal: &P,
        now: DateTime<Utc>,
    ) -> Result<String, JwtError> {
        let claims = Claims::for_subject(principal.subject(), now, self.ttl);
        self.jwt_handler.encode(&claims)
    }

    /// Verify `token` and return its subject.
    ///
    /// # Errors
    /// * `MalformedToken` - Token cannot be decoded
    /// * `Expired` - Current time is at or past `exp`
    /// * `InvalidSignature` - Signature does not match
    pub fn extract_subject(&self, token: &str) -> Result<String, JwtError> {
        self.extract_subject_at(token, Utc::now())
    }

    pub fn extract_subject_at(&self, token: &str, now: DateTime<Utc>) -> Result<String, JwtError> {
        self.jwt_handler
            .decode_at(token, now.timestamp())
            .map(|claims| claims.sub)
    }

    /// Verify `token` and check it was issued for `principal`.
    ///
    /// Never errors: any verification failure yields `false`.
    pub fn is_valid<P: Principal + ?Sized>(&self, token: &str, principal: &P) -> bool {
        self.is_valid_at(token, principal, Utc::now())
    }

    pub fn is_valid_at<P: Principal + ?Sized>(
        &self,
        token: &str,
        principal: &P,
        now: DateTime<Utc>,
    ) -> bool {
        self.extract_subject_at(token, now)
            .map(|subject| subject == principal.subject())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test_secret_key_at_least_32_bytes!";

    struct Account {
        email: String,
    }

    impl Principal for Account {
        fn subject(&self) -> &str {
            &self.email
        }
    }

    fn account(email: &str) -> Account {
        Account {
            email: email.to_string(),
        }
    }

    #[test]
    fn test_issue_and_extract_subject() {
        let codec = TokenCodec::new(SECRET, Duration::hours(24));
        let alice = account("a@x.com");

        let token = codec.issue(&alice).expect("Failed to issue token");
        let subject = codec.extract_subject(&token).expect("Failed to verify");

        assert_eq!(subject, "a@x.com");
    }

    #[test]
    fn test_round_trip_until_expiry() {
        let codec = TokenCodec::new(SECRET, Duration::minutes(30));
        let issued = Utc::now();
        let token = codec.issue_at("a@x.com", issued).unwrap();

        for offset in [0, 1, 60, 29 * 60, 30 * 60 - 1] {
            let now = issued + Duration::seconds(offset);
            assert_eq!(
                codec.extract_subject_at(&token, now),
                Ok("a@x.com".to_string())
            );
        }
        assert_eq!(
            codec.extract_subject_at(&token, issued + Duration::minutes(30)),
            Err(JwtError::Expired)
        );
    }

    #[test]
    fn test_zero_ttl_token_is_already_expired() {
        let codec = TokenCodec::new(SECRET, Duration::zero());
        let now = Utc::now();
        let token = codec.issue_at("a@x.com", now).unwrap();

        assert_eq!(codec.extract_subject_at(&token, now), Err(JwtError::Expired));
    }

    #[test]
    fn test_token_from_other_secret() {
        let issuer = TokenCodec::new(b"secret1_at_least_32_bytes_long_key!", Duration::hours(1));
        let verifier = TokenCodec::new(b"secret2_at_least_32_bytes_long_key!", Duration::hours(1));

        let token = issuer.issue("a@x.com").unwrap();

        assert_eq!(
            verifier.extract_subject(&token),
            Err(JwtError::InvalidSignature)
        );
    }

    #[test]
    fn test_is_valid_checks_subject() {
        let codec = TokenCodec::new(SECRET, Duration::hours(1));
        let alice = account("a@x.com");
        let bob = account("b@x.com");

        let token = codec.issue(&alice).unwrap();

        assert!(codec.is_valid(&token, &alice));
        assert!(!codec.is_valid(&token, &bob));
    }

    #[test]
    fn test_is_valid_is_false_on_any_failure() {
        let codec = TokenCodec::new(SECRET, Duration::hours(1));
        let alice = account("a@x.com");
        let issued = Utc::now();
        let token = codec.issue_at(&alice, issued).unwrap();

        assert!(!codec.is_valid("invalid.token.here", &alice));
        assert!(!codec.is_valid_at(&token, &alice, issued + Duration::hours(2)));

        let other = TokenCodec::new(b"secret2_at_least_32_bytes_long_key!", Duration::hours(1));
        assert!(!other.is_valid(&token, &alice));
    }
}
