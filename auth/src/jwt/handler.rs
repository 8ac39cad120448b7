use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::Error as JsonWebTokenError;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::errors::JwtError;

/// JWT encoder and decoder for [`Claims`].
///
/// Tokens are compact `header.payload.signature` strings signed with
/// HS256 (HMAC with SHA-256) over the server secret.
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl JwtHandler {
    /// Create a new JWT handler with a secret key.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - The secret is process configuration; it never leaves the server
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
        }
    }

    /// Encode claims into a signed token.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn encode(&self, claims: &Claims) -> Result<String, JwtError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Decode and verify a token against the clock value `now` (Unix seconds).
    ///
    /// Checks run in this order, and the first failure wins:
    /// 1. the token must decode into well-formed [`Claims`]
    /// 2. `now` must be before `exp`
    /// 3. the signature must match
    ///
    /// # Errors
    /// * `MalformedToken` - Structure, encoding or claims cannot be decoded
    /// * `Expired` - `now >= exp`
    /// * `InvalidSignature` - Signature mismatch or unexpected algorithm
    pub fn decode_at(&self, token: &str, now: i64) -> Result<Claims, JwtError> {
        let claims = self.decode_unverified(token)?;

        if claims.is_expired(now) {
            return Err(JwtError::Expired);
        }

        let mut validation = Validation::new(self.algorithm);
        // Expiry is checked above with exact `>=` semantics and no leeway
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|token_data| token_data.claims)
            .map_err(classify)
    }

    /// Decode token without validation (for inspection only).
    ///
    /// # Errors
    /// * `MalformedToken` - Token format is invalid
    ///
    /// # Security Warning
    /// This does NOT validate the token signature or expiry. Never trust
    /// claims from this method for authentication decisions.
    pub fn decode_unverified(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(self.algorithm);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|token_data| token_data.claims)
            .map_err(|e| JwtError::MalformedToken(e.to_string()))
    }
}

fn classify(err: JsonWebTokenError) -> JwtError {
    match err.kind() {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => JwtError::InvalidSignature,
        ErrorKind::ExpiredSignature => JwtError::Expired,
        _ => JwtError::MalformedToken(err.to_string()),
    }
}
