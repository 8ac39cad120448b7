use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::domain::identity::models::PersonName;
use crate::domain::identity::models::UpdateProfileCommand;
use crate::identity::errors::IdentityError;
use crate::inbound::http::extractors::Authenticated;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::handlers::IdentityResponseData;
use crate::inbound::http::router::AppState;

/// HTTP request body for a profile update; absent fields stay unchanged.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl UpdateProfileRequest {
    fn try_into_command(self) -> Result<UpdateProfileCommand, IdentityError> {
        let first_name = self
            .first_name
            .map(|value| PersonName::new("firstName", value))
            .transpose()?;

        let last_name = self
            .last_name
            .map(|value| PersonName::new("lastName", value))
            .transpose()?;

        Ok(UpdateProfileCommand {
            first_name,
            last_name,
        })
    }
}

pub async fn get_current_identity(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
) -> Result<ApiSuccess<IdentityResponseData>, ApiError> {
    state
        .auth_service
        .get_identity(&caller.identity.login_key)
        .await
        .map_err(ApiError::from)
        .map(|identity| ApiSuccess::new(StatusCode::OK, (&identity).into()))
}

pub async fn update_current_identity(
    State(state): State<AppState>,
    Authenticated(caller): Authenticated,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<ApiSuccess<IdentityResponseData>, ApiError> {
    let command = req.try_into_command()?;

    state
        .auth_service
        .update_profile(&caller.identity.login_key, command)
        .await
        .map_err(ApiError::from)
        .map(|identity| ApiSuccess::new(StatusCode::OK, (&identity).into()))
}
