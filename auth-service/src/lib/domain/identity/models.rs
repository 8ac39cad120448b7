use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::identity::errors::LoginKeyError;
use crate::domain::identity::errors::ProfileError;
use crate::domain::identity::errors::SecretError;

/// Identity aggregate entity.
///
/// A registered principal. The secret hash is opaque and its `Debug`
/// output is redacted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: IdentityId,
    pub login_key: LoginKey,
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub secret_hash: SecretHash,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Identity {
    /// Build a not-yet-persisted identity with the default role.
    ///
    /// `created_at` and `updated_at` both start at `now`.
    pub fn register(
        login_key: LoginKey,
        first_name: PersonName,
        last_name: PersonName,
        secret_hash: SecretHash,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: IdentityId::new(),
            login_key,
            first_name,
            last_name,
            secret_hash,
            role: Role::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Refresh `updated_at`, never moving it before `created_at`.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.max(self.created_at);
    }

    /// Authorities granted to this identity.
    pub fn authorities(&self) -> Vec<&'static str> {
        vec![self.role.authority()]
    }
}

impl auth::Principal for Identity {
    fn subject(&self) -> &str {
        self.login_key.as_str()
    }
}

/// Identity unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdentityId(pub Uuid);

impl IdentityId {
    /// Generate a new random identity ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for IdentityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for IdentityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Login key value type
///
/// An email address, trimmed and lower-cased so that lookups and the
/// uniqueness constraint are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoginKey(String);

impl LoginKey {
    /// Create a new normalized login key.
    ///
    /// # Errors
    /// * `InvalidFormat` - Value is not an RFC 5322 email address
    pub fn new(raw: impl AsRef<str>) -> Result<Self, LoginKeyError> {
        let normalized = raw.as_ref().trim().to_lowercase();

        email_address::EmailAddress::from_str(&normalized)
            .map(|_| LoginKey(normalized))
            .map_err(|e| LoginKeyError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LoginKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// First or last name of an identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonName(String);

impl PersonName {
    const MAX_LENGTH: usize = 100;

    /// Create a validated name.
    ///
    /// # Arguments
    /// * `field` - Field label used in error messages
    /// * `value` - Raw value, trimmed before validation
    ///
    /// # Errors
    /// * `Empty` - Value is blank
    /// * `TooLong` - Value is longer than 100 characters
    pub fn new(field: &'static str, value: impl AsRef<str>) -> Result<Self, ProfileError> {
        let value = value.as_ref().trim();
        let length = value.chars().count();

        if length == 0 {
            Err(ProfileError::Empty { field })
        } else if length > Self::MAX_LENGTH {
            Err(ProfileError::TooLong {
                field,
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(Self(value.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Plaintext secret presented during signup or signin.
///
/// Lives only for the duration of one call. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    const MAX_BYTES: usize = 1024;

    /// # Errors
    /// * `Empty` - Secret is empty
    /// * `TooLong` - Secret is longer than 1024 bytes
    pub fn new(value: String) -> Result<Self, SecretError> {
        if value.is_empty() {
            Err(SecretError::Empty)
        } else if value.len() > Self::MAX_BYTES {
            Err(SecretError::TooLong {
                max: Self::MAX_BYTES,
            })
        } else {
            Ok(Self(value))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

/// One-way hash of a secret, in PHC string format.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretHash(String);

impl SecretHash {
    /// Wrap a stored hash. Returns `None` for an empty value.
    pub fn new(value: String) -> Option<Self> {
        if value.is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretHash(<redacted>)")
    }
}

/// Role granted to an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    /// Authority string for this role; also its stored form.
    pub fn authority(&self) -> &'static str {
        match self {
            Role::User => "ROLE_USER",
            Role::Admin => "ROLE_ADMIN",
        }
    }

    pub fn from_authority(authority: &str) -> Option<Self> {
        match authority {
            "ROLE_USER" => Some(Role::User),
            "ROLE_ADMIN" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// Command to register a new identity with domain types
#[derive(Debug)]
pub struct SignupCommand {
    pub login_key: LoginKey,
    pub secret: Secret,
    pub first_name: PersonName,
    pub last_name: PersonName,
}

/// Command to authenticate with a login key and secret
#[derive(Debug)]
pub struct SigninCommand {
    pub login_key: LoginKey,
    pub secret: Secret,
}

/// Command to update profile fields of an existing identity.
///
/// Only provided fields are changed.
#[derive(Debug, Default)]
pub struct UpdateProfileCommand {
    pub first_name: Option<PersonName>,
    pub last_name: Option<PersonName>,
}

/// Result of a successful signup or signin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticationResult {
    /// Signed bearer token
    pub token: String,
}
