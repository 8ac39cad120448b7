//! Authentication primitives
//!
//! Provides the storage-free building blocks of bearer-token authentication:
//! - Secret hashing and verification (Argon2id)
//! - JWT encoding and decoding of `{sub, iat, exp}` claims
//! - A token codec that issues and verifies tokens for any [`Principal`]
//!
//! Services define their own identity types and implement [`Principal`] on them.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Tokens
//! ```
//! use auth::TokenCodec;
//! use chrono::Duration;
//!
//! let codec = TokenCodec::new(b"secret_key_at_least_32_bytes_long!", Duration::hours(24));
//! let token = codec.issue("a@x.com").unwrap();
//!
//! assert_eq!(codec.extract_subject(&token).unwrap(), "a@x.com");
//! assert!(codec.is_valid(&token, "a@x.com"));
//! ```

pub mod codec;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use codec::Principal;
pub use codec::TokenCodec;
pub use jwt::Claims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use password::PasswordError;
pub use password::PasswordHasher;
