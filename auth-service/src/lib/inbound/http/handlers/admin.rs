use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;

use crate::domain::identity::models::LoginKey;
use crate::identity::errors::IdentityError;
use crate::inbound::http::extractors::RequireAdmin;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::handlers::IdentityResponseData;
use crate::inbound::http::router::AppState;

pub async fn get_identity(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(email): Path<String>,
) -> Result<ApiSuccess<IdentityResponseData>, ApiError> {
    let login_key = LoginKey::new(&email).map_err(IdentityError::from)?;

    state
        .auth_service
        .get_identity(&login_key)
        .await
        .map_err(ApiError::from)
        .map(|identity| ApiSuccess::new(StatusCode::OK, (&identity).into()))
}
