use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::identity::errors::IdentityError;
use crate::domain::identity::models::Identity;
use crate::domain::identity::models::LoginKey;
use crate::domain::identity::ports::IdentityRepository;

/// In-memory identity store for development and tests.
///
/// All data is lost when the process exits. The uniqueness check and the
/// insert happen under one write lock, so concurrent creates for the same
/// login key cannot both succeed.
#[derive(Default)]
pub struct InMemoryIdentityRepository {
    identities: RwLock<HashMap<LoginKey, Identity>>,
}

impl InMemoryIdentityRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.identities.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.identities.read().await.is_empty()
    }
}

#[async_trait]
impl IdentityRepository for InMemoryIdentityRepository {
    async fn create(&self, identity: Identity) -> Result<Identity, IdentityError> {
        let mut identities = self.identities.write().await;

        if identities.contains_key(&identity.login_key) {
            return Err(IdentityError::DuplicateLogin(
                identity.login_key.to_string(),
            ));
        }

        identities.insert(identity.login_key.clone(), identity.clone());

        Ok(identity)
    }

    async fn find_by_login_key(
        &self,
        login_key: &LoginKey,
    ) -> Result<Option<Identity>, IdentityError> {
        Ok(self.identities.read().await.get(login_key).cloned())
    }

    async fn update(&self, identity: Identity) -> Result<Identity, IdentityError> {
        let mut identities = self.identities.write().await;

        match identities.get_mut(&identity.login_key) {
            Some(stored) if stored.id == identity.id => {
                stored.first_name = identity.first_name.clone();
                stored.last_name = identity.last_name.clone();
                stored.updated_at = identity.updated_at;
                Ok(stored.clone())
            }
            _ => Err(IdentityError::UsernameNotFound(
                identity.login_key.to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Duration;
    use chrono::Utc;

    use super::*;
    use crate::domain::identity::models::PersonName;
    use crate::domain::identity::models::Role;
    use crate::domain::identity::models::SecretHash;

    fn identity(email: &str) -> Identity {
        Identity::register(
            LoginKey::new(email).unwrap(),
            PersonName::new("firstName", "Ada").unwrap(),
            PersonName::new("lastName", "Lovelace").unwrap(),
            SecretHash::new("$argon2id$test_hash".to_string()).unwrap(),
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let repository = InMemoryIdentityRepository::new();
        let created = repository.create(identity("a@x.com")).await.unwrap();

        let found = repository
            .find_by_login_key(&LoginKey::new("A@X.COM").unwrap())
            .await
            .unwrap();
        assert_eq!(found, Some(created));

        let missing = repository
            .find_by_login_key(&LoginKey::new("b@x.com").unwrap())
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_create_duplicate_login() {
        let repository = InMemoryIdentityRepository::new();
        repository.create(identity("a@x.com")).await.unwrap();

        let result = repository.create(identity("a@x.com")).await;
        assert!(matches!(result, Err(IdentityError::DuplicateLogin(_))));
        assert_eq!(repository.len().await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_admit_exactly_one() {
        let repository = Arc::new(InMemoryIdentityRepository::new());

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let repository = Arc::clone(&repository);
                tokio::spawn(async move { repository.create(identity("race@x.com")).await })
            })
            .collect();

        let mut created = 0;
        let mut duplicates = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(IdentityError::DuplicateLogin(_)) => duplicates += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }

        assert_eq!(created, 1);
        assert_eq!(duplicates, 15);
        assert_eq!(repository.len().await, 1);
    }

    #[tokio::test]
    async fn test_update_changes_profile_only() {
        let repository = InMemoryIdentityRepository::new();
        let mut stored = repository.create(identity("a@x.com")).await.unwrap();
        let created_at = stored.created_at;

        stored.first_name = PersonName::new("firstName", "Augusta").unwrap();
        stored.role = Role::Admin;
        stored.touch(created_at + Duration::minutes(1));

        let updated = repository.update(stored).await.unwrap();
        assert_eq!(updated.first_name.as_str(), "Augusta");
        assert_eq!(updated.role, Role::User);
        assert_eq!(updated.created_at, created_at);
        assert_eq!(updated.updated_at, created_at + Duration::minutes(1));
    }

    #[tokio::test]
    async fn test_update_unknown_identity() {
        let repository = InMemoryIdentityRepository::new();

        let result = repository.update(identity("ghost@x.com")).await;
        assert!(matches!(result, Err(IdentityError::UsernameNotFound(_))));
        assert!(repository.is_empty().await);
    }
}
