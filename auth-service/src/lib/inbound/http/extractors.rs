use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::domain::identity::models::Role;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::middleware::AuthenticatedIdentity;
use crate::inbound::http::middleware::IdentityContext;

const AUTHENTICATION_REQUIRED: &str = "Full authentication is required to access this resource";
const ACCESS_DENIED: &str = "Access denied";

/// Caller resolved by the authentication pipeline. Rejects with 401 otherwise.
#[derive(Debug, Clone)]
pub struct Authenticated(pub AuthenticatedIdentity);

#[async_trait]
impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<IdentityContext>()
            .and_then(IdentityContext::identity)
            .cloned()
            .map(Authenticated)
            .ok_or_else(|| ApiError::Unauthorized(AUTHENTICATION_REQUIRED.to_string()))
    }
}

/// Caller holding the admin authority. 401 when unauthenticated, 403 otherwise.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub AuthenticatedIdentity);

#[async_trait]
impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Authenticated(caller) = Authenticated::from_request_parts(parts, state).await?;

        if !caller.has_authority(Role::Admin.authority()) {
            tracing::debug!(identity_id = %caller.identity.id, "Admin authority required");
            return Err(ApiError::Forbidden(ACCESS_DENIED.to_string()));
        }

        Ok(RequireAdmin(caller))
    }
}
