use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::identity::errors::IdentityError;
use crate::domain::identity::models::LoginKey;
use crate::domain::identity::models::Secret;
use crate::domain::identity::ports::CredentialVerifier;
use crate::domain::identity::ports::IdentityRepository;

/// Credential verification backed by the identity store and Argon2.
///
/// Unknown login keys still pay for one hash computation so the two failure
/// paths take comparable time.
pub struct StoreCredentialVerifier<IR>
where
    IR: IdentityRepository + ?Sized,
{
    repository: Arc<IR>,
    password_hasher: Arc<auth::PasswordHasher>,
}

impl<IR> StoreCredentialVerifier<IR>
where
    IR: IdentityRepository + ?Sized,
{
    pub fn new(repository: Arc<IR>, password_hasher: Arc<auth::PasswordHasher>) -> Self {
        Self {
            repository,
            password_hasher,
        }
    }
}

#[async_trait]
impl<IR> CredentialVerifier for StoreCredentialVerifier<IR>
where
    IR: IdentityRepository + ?Sized,
{
    async fn verify(&self, login_key: &LoginKey, secret: &Secret) -> Result<bool, IdentityError> {
        let identity = self.repository.find_by_login_key(login_key).await?;

        let hasher = Arc::clone(&self.password_hasher);
        let presented = secret.clone();

        match identity {
            Some(identity) => {
                let stored = identity.secret_hash;
                let matches = tokio::task::spawn_blocking(move || {
                    hasher.verify(presented.expose(), stored.as_str())
                })
                .await??;

                Ok(matches)
            }
            None => {
                tokio::task::spawn_blocking(move || hasher.hash_and_discard(presented.expose()))
                    .await?;

                Err(IdentityError::UsernameNotFound(login_key.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::identity::models::Identity;
    use crate::domain::identity::models::PersonName;
    use crate::domain::identity::models::SecretHash;
    use crate::domain::identity::ports::mocks::MockTestIdentityRepository;

    fn hasher() -> Arc<auth::PasswordHasher> {
        Arc::new(auth::PasswordHasher::with_params(1024, 1, 1).unwrap())
    }

    fn stored_identity(hasher: &auth::PasswordHasher, secret: &str) -> Identity {
        Identity::register(
            LoginKey::new("a@x.com").unwrap(),
            PersonName::new("firstName", "Ada").unwrap(),
            PersonName::new("lastName", "Lovelace").unwrap(),
            SecretHash::new(hasher.hash(secret).unwrap()).unwrap(),
            Utc::now(),
        )
    }

    fn secret(value: &str) -> Secret {
        Secret::new(value.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_verify_matching_secret() {
        let hasher = hasher();
        let identity = stored_identity(&hasher, "secret1");

        let mut repository = MockTestIdentityRepository::new();
        repository
            .expect_find_by_login_key()
            .withf(|key| key.as_str() == "a@x.com")
            .times(1)
            .returning(move |_| Ok(Some(identity.clone())));

        let verifier = StoreCredentialVerifier::new(Arc::new(repository), hasher);
        let login_key = LoginKey::new("a@x.com").unwrap();

        assert!(verifier.verify(&login_key, &secret("secret1")).await.unwrap());
    }

    #[tokio::test]
    async fn test_verify_wrong_secret() {
        let hasher = hasher();
        let identity = stored_identity(&hasher, "secret1");

        let mut repository = MockTestIdentityRepository::new();
        repository
            .expect_find_by_login_key()
            .times(1)
            .returning(move |_| Ok(Some(identity.clone())));

        let verifier = StoreCredentialVerifier::new(Arc::new(repository), hasher);
        let login_key = LoginKey::new("a@x.com").unwrap();

        assert!(!verifier.verify(&login_key, &secret("wrong")).await.unwrap());
    }

    #[tokio::test]
    async fn test_verify_unknown_login_key() {
        let mut repository = MockTestIdentityRepository::new();
        repository
            .expect_find_by_login_key()
            .times(1)
            .returning(|_| Ok(None));

        let verifier = StoreCredentialVerifier::new(Arc::new(repository), hasher());
        let login_key = LoginKey::new("ghost@x.com").unwrap();

        let result = verifier.verify(&login_key, &secret("secret1")).await;
        assert!(matches!(result, Err(IdentityError::UsernameNotFound(_))));
    }

    #[tokio::test]
    async fn test_verify_propagates_store_failure() {
        let mut repository = MockTestIdentityRepository::new();
        repository
            .expect_find_by_login_key()
            .times(1)
            .returning(|_| Err(IdentityError::DatabaseError("connection reset".to_string())));

        let verifier = StoreCredentialVerifier::new(Arc::new(repository), hasher());
        let login_key = LoginKey::new("a@x.com").unwrap();

        let result = verifier.verify(&login_key, &secret("secret1")).await;
        assert!(matches!(result, Err(IdentityError::DatabaseError(_))));
    }
}
