use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::identity::errors::IdentityError;
use crate::domain::identity::models::Identity;
use crate::domain::identity::models::IdentityId;
use crate::domain::identity::models::LoginKey;
use crate::domain::identity::models::PersonName;
use crate::domain::identity::models::Role;
use crate::domain::identity::models::SecretHash;
use crate::domain::identity::ports::IdentityRepository;

const LOGIN_KEY_CONSTRAINT: &str = "identities_login_key_key";

pub struct PostgresIdentityRepository {
    pool: PgPool,
}

impl PostgresIdentityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct IdentityRow {
    id: Uuid,
    login_key: String,
    first_name: String,
    last_name: String,
    secret_hash: String,
    role: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<IdentityRow> for Identity {
    type Error = IdentityError;

    fn try_from(row: IdentityRow) -> Result<Self, Self::Error> {
        let secret_hash = SecretHash::new(row.secret_hash).ok_or_else(|| {
            IdentityError::DatabaseError(format!("Empty secret hash for identity {}", row.id))
        })?;

        let role = Role::from_authority(&row.role).ok_or_else(|| {
            IdentityError::DatabaseError(format!("Unknown role {} for identity {}", row.role, row.id))
        })?;

        Ok(Identity {
            id: IdentityId(row.id),
            login_key: LoginKey::new(row.login_key)?,
            first_name: PersonName::new("firstName", row.first_name)?,
            last_name: PersonName::new("lastName", row.last_name)?,
            secret_hash,
            role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl IdentityRepository for PostgresIdentityRepository {
    async fn create(&self, identity: Identity) -> Result<Identity, IdentityError> {
        sqlx::query(
            r#"
            INSERT INTO identities
                (id, login_key, first_name, last_name, secret_hash, role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(identity.id.0)
        .bind(identity.login_key.as_str())
        .bind(identity.first_name.as_str())
        .bind(identity.last_name.as_str())
        .bind(identity.secret_hash.as_str())
        .bind(identity.role.authority())
        .bind(identity.created_at)
        .bind(identity.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() && db_err.constraint() == Some(LOGIN_KEY_CONSTRAINT)
                {
                    return IdentityError::DuplicateLogin(identity.login_key.to_string());
                }
            }
            tracing::error!(error = %e, "Failed to insert identity");
            IdentityError::DatabaseError(e.to_string())
        })?;

        Ok(identity)
    }

    async fn find_by_login_key(
        &self,
        login_key: &LoginKey,
    ) -> Result<Option<Identity>, IdentityError> {
        let row = sqlx::query_as::<_, IdentityRow>(
            r#"
            SELECT id, login_key, first_name, last_name, secret_hash, role, created_at, updated_at
            FROM identities
            WHERE login_key = $1
            "#,
        )
        .bind(login_key.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "Identity lookup failed");
            IdentityError::DatabaseError(e.to_string())
        })?;

        row.map(Identity::try_from).transpose()
    }

    async fn update(&self, identity: Identity) -> Result<Identity, IdentityError> {
        let row = sqlx::query_as::<_, IdentityRow>(
            r#"
            UPDATE identities
            SET first_name = $2, last_name = $3, updated_at = GREATEST($4, created_at)
            WHERE id = $1
            RETURNING id, login_key, first_name, last_name, secret_hash, role, created_at, updated_at
            "#,
        )
        .bind(identity.id.0)
        .bind(identity.first_name.as_str())
        .bind(identity.last_name.as_str())
        .bind(identity.updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, identity_id = %identity.id, "Failed to update identity");
            IdentityError::DatabaseError(e.to_string())
        })?;

        match row {
            Some(row) => Identity::try_from(row),
            None => Err(IdentityError::UsernameNotFound(
                identity.login_key.to_string(),
            )),
        }
    }
}
