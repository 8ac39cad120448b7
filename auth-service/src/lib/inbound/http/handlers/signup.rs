use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::domain::identity::models::LoginKey;
use crate::domain::identity::models::PersonName;
use crate::domain::identity::models::Secret;
use crate::domain::identity::models::SignupCommand;
use crate::identity::errors::IdentityError;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::handlers::TokenResponseData;
use crate::inbound::http::router::AppState;

/// HTTP request body for registering an identity (raw JSON)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

impl SignupRequest {
    fn try_into_command(self) -> Result<SignupCommand, IdentityError> {
        Ok(SignupCommand {
            login_key: LoginKey::new(&self.email)?,
            secret: Secret::new(self.password)?,
            first_name: PersonName::new("firstName", self.first_name)?,
            last_name: PersonName::new("lastName", self.last_name)?,
        })
    }
}

pub async fn signup(
    State(state): State<AppState>,
    Json(req): Json<SignupRequest>,
) -> Result<ApiSuccess<TokenResponseData>, ApiError> {
    let command = req.try_into_command()?;

    state
        .auth_service
        .signup(command)
        .await
        .map_err(ApiError::from)
        .map(|result| ApiSuccess::new(StatusCode::CREATED, TokenResponseData { token: result.token }))
}
