use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::identity::errors::IdentityError;
use crate::domain::identity::models::AuthenticationResult;
use crate::domain::identity::models::Identity;
use crate::domain::identity::models::LoginKey;
use crate::domain::identity::models::SecretHash;
use crate::domain::identity::models::SigninCommand;
use crate::domain::identity::models::SignupCommand;
use crate::domain::identity::models::UpdateProfileCommand;
use crate::domain::identity::ports::AuthenticationServicePort;
use crate::domain::identity::ports::CredentialVerifier;
use crate::domain::identity::ports::IdentityRepository;

/// Domain service implementation for signup, signin and profile operations.
///
/// Concrete implementation of AuthenticationServicePort with dependency injection.
pub struct AuthenticationService<IR, CV>
where
    IR: IdentityRepository + ?Sized,
    CV: CredentialVerifier + ?Sized,
{
    repository: Arc<IR>,
    credential_verifier: Arc<CV>,
    password_hasher: Arc<auth::PasswordHasher>,
    token_codec: Arc<auth::TokenCodec>,
}

impl<IR, CV> AuthenticationService<IR, CV>
where
    IR: IdentityRepository + ?Sized,
    CV: CredentialVerifier + ?Sized,
{
    /// Create a new authentication service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - Identity persistence implementation
    /// * `credential_verifier` - Secret verification used by signin
    /// * `password_hasher` - Hasher used to protect secrets at signup
    /// * `token_codec` - Issues bearer tokens
    pub fn new(
        repository: Arc<IR>,
        credential_verifier: Arc<CV>,
        password_hasher: Arc<auth::PasswordHasher>,
        token_codec: Arc<auth::TokenCodec>,
    ) -> Self {
        Self {
            repository,
            credential_verifier,
            password_hasher,
            token_codec,
        }
    }
}

#[async_trait]
impl<IR, CV> AuthenticationServicePort for AuthenticationService<IR, CV>
where
    IR: IdentityRepository + ?Sized,
    CV: CredentialVerifier + ?Sized,
{
    async fn signup(&self, command: SignupCommand) -> Result<AuthenticationResult, IdentityError> {
        let SignupCommand {
            login_key,
            secret,
            first_name,
            last_name,
        } = command;

        let hasher = Arc::clone(&self.password_hasher);
        let phc = tokio::task::spawn_blocking(move || hasher.hash(secret.expose())).await??;
        let secret_hash = SecretHash::new(phc)
            .ok_or_else(|| IdentityError::Unknown("Password hasher returned empty hash".into()))?;

        let identity = Identity::register(login_key, first_name, last_name, secret_hash, Utc::now());

        // Issued before persisting: a codec failure must leave the store untouched.
        let token = self.token_codec.issue(&identity)?;

        let created = self.repository.create(identity).await?;
        tracing::info!(identity_id = %created.id, "Identity registered");

        Ok(AuthenticationResult { token })
    }

    async fn signin(&self, command: SigninCommand) -> Result<AuthenticationResult, IdentityError> {
        let matches = match self
            .credential_verifier
            .verify(&command.login_key, &command.secret)
            .await
        {
            Ok(matches) => matches,
            Err(IdentityError::UsernameNotFound(_)) => false,
            Err(e) => return Err(e),
        };

        if !matches {
            tracing::debug!("Signin rejected");
            return Err(IdentityError::BadCredentials);
        }

        let identity = self
            .repository
            .find_by_login_key(&command.login_key)
            .await?
            .ok_or(IdentityError::InvalidCredentials)?;

        let token = self.token_codec.issue(&identity)?;

        Ok(AuthenticationResult { token })
    }

    async fn get_identity(&self, login_key: &LoginKey) -> Result<Identity, IdentityError> {
        self.repository
            .find_by_login_key(login_key)
            .await?
            .ok_or(IdentityError::UsernameNotFound(login_key.to_string()))
    }

    async fn update_profile(
        &self,
        login_key: &LoginKey,
        command: UpdateProfileCommand,
    ) -> Result<Identity, IdentityError> {
        let mut identity = self.get_identity(login_key).await?;

        if let Some(first_name) = command.first_name {
            identity.first_name = first_name;
        }

        if let Some(last_name) = command.last_name {
            identity.last_name = last_name;
        }

        identity.touch(Utc::now());

        self.repository.update(identity).await
    }
}
