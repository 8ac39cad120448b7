use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::domain::identity::models::LoginKey;
use crate::domain::identity::models::Secret;
use crate::domain::identity::models::SigninCommand;
use crate::identity::errors::IdentityError;
use crate::inbound::http::handlers::ApiError;
use crate::inbound::http::handlers::ApiSuccess;
use crate::inbound::http::handlers::TokenResponseData;
use crate::inbound::http::router::AppState;

#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

impl SigninRequest {
    /// Malformed credentials are reported exactly like wrong ones.
    fn try_into_command(self) -> Result<SigninCommand, IdentityError> {
        let login_key = LoginKey::new(&self.email).map_err(|_| IdentityError::BadCredentials)?;
        let secret = Secret::new(self.password).map_err(|_| IdentityError::BadCredentials)?;

        Ok(SigninCommand { login_key, secret })
    }
}

pub async fn signin(
    State(state): State<AppState>,
    Json(req): Json<SigninRequest>,
) -> Result<ApiSuccess<TokenResponseData>, ApiError> {
    let command = req.try_into_command()?;

    let result = state.auth_service.signin(command).await?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        TokenResponseData {
            token: result.token,
        },
    ))
}
