use thiserror::Error;

/// Error for LoginKey validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LoginKeyError {
    #[error("Invalid email format: {0}")]
    InvalidFormat(String),
}

/// Error for profile field validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProfileError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} too long: maximum {max} characters, got {actual}")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },
}

/// Error for plaintext secret validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SecretError {
    #[error("Password must not be empty")]
    Empty,

    #[error("Password too long: maximum {max} bytes")]
    TooLong { max: usize },
}

/// Top-level error for identity and authentication operations
#[derive(Debug, Clone, Error)]
pub enum IdentityError {
    // Value object validation errors (automatically converted via #[from])
    #[error("Invalid login: {0}")]
    InvalidLoginKey(#[from] LoginKeyError),

    #[error("Invalid profile: {0}")]
    InvalidProfile(#[from] ProfileError),

    #[error("Invalid password: {0}")]
    InvalidSecret(#[from] SecretError),

    #[error("Password error: {0}")]
    Password(#[from] auth::PasswordError),

    #[error("Token error: {0}")]
    Token(#[from] auth::JwtError),

    // Domain-level errors
    #[error("Username not found: {0}")]
    UsernameNotFound(String),

    #[error("Login already exists: {0}")]
    DuplicateLogin(String),

    #[error("Bad credentials")]
    BadCredentials,

    #[error("Invalid email or password")]
    InvalidCredentials,

    // Infrastructure errors
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<tokio::task::JoinError> for IdentityError {
    fn from(err: tokio::task::JoinError) -> Self {
        IdentityError::Unknown(format!("Blocking task failed: {}", err))
    }
}
