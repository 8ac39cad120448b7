use async_trait::async_trait;

use crate::domain::identity::errors::IdentityError;
use crate::domain::identity::models::AuthenticationResult;
use crate::domain::identity::models::Identity;
use crate::domain::identity::models::LoginKey;
use crate::domain::identity::models::Secret;
use crate::domain::identity::models::SigninCommand;
use crate::domain::identity::models::SignupCommand;
use crate::domain::identity::models::UpdateProfileCommand;

/// Port for authentication service operations.
#[async_trait]
pub trait AuthenticationServicePort: Send + Sync + 'static {
    /// Register a new identity and issue its first token.
    ///
    /// # Arguments
    /// * `command` - Validated login key, secret and profile fields
    ///
    /// # Returns
    /// Token for the newly persisted identity
    ///
    /// # Errors
    /// * `DuplicateLogin` - Login key is already registered
    /// * `Password` - Secret hashing failed
    /// * `DatabaseError` - Database operation failed
    async fn signup(&self, command: SignupCommand) -> Result<AuthenticationResult, IdentityError>;

    /// Verify credentials and issue a token.
    ///
    /// # Errors
    /// * `BadCredentials` - Unknown login key or wrong secret (not distinguished)
    /// * `InvalidCredentials` - Identity vanished between verification and lookup
    /// * `DatabaseError` - Database operation failed
    async fn signin(&self, command: SigninCommand) -> Result<AuthenticationResult, IdentityError>;

    /// Retrieve identity by login key.
    ///
    /// # Errors
    /// * `UsernameNotFound` - No identity with this login key
    /// * `DatabaseError` - Database operation failed
    async fn get_identity(&self, login_key: &LoginKey) -> Result<Identity, IdentityError>;

    /// Update profile fields of an existing identity.
    ///
    /// # Errors
    /// * `UsernameNotFound` - No identity with this login key
    /// * `DatabaseError` - Database operation failed
    async fn update_profile(
        &self,
        login_key: &LoginKey,
        command: UpdateProfileCommand,
    ) -> Result<Identity, IdentityError>;
}

/// Persistence operations for the identity aggregate.
#[async_trait]
pub trait IdentityRepository: Send + Sync + 'static {
    /// Persist new identity to storage.
    ///
    /// Concurrent creates for the same login key race on the store's
    /// uniqueness constraint: exactly one succeeds.
    ///
    /// # Errors
    /// * `DuplicateLogin` - Login key is already registered
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, identity: Identity) -> Result<Identity, IdentityError>;

    /// Retrieve identity by login key.
    ///
    /// # Returns
    /// Optional identity (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_login_key(&self, login_key: &LoginKey)
        -> Result<Option<Identity>, IdentityError>;

    /// Persist changed profile fields and `updated_at`.
    ///
    /// # Errors
    /// * `UsernameNotFound` - Identity does not exist
    /// * `DatabaseError` - Database operation failed
    async fn update(&self, identity: Identity) -> Result<Identity, IdentityError>;
}

/// Confirms that a presented secret matches the stored hash for a login key.
#[async_trait]
pub trait CredentialVerifier: Send + Sync + 'static {
    /// # Returns
    /// Whether the secret matches
    ///
    /// # Errors
    /// * `UsernameNotFound` - No identity with this login key
    /// * `Password` - Stored hash could not be parsed
    /// * `DatabaseError` - Database operation failed
    async fn verify(&self, login_key: &LoginKey, secret: &Secret) -> Result<bool, IdentityError>;
}
