// handlers/auth/login.rs - POST /api/v1/auth/login

use axum::{extract::State, http::StatusCode};
use serde::Deserialize;

use super::send_token;
use crate::error::ApiError;
use crate::extract::JsonBody;
use crate::filter::Condition;
use crate::middleware::TokenResponse;
use crate::models::UserView;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Unknown email and wrong password produce the same 401; the unknown-email
/// path still runs a bcrypt compare.
pub async fn login(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<LoginRequest>,
) -> Result<TokenResponse<UserView>, ApiError> {
    let (email, password) = match (request.email.as_deref(), request.password.as_deref()) {
        (Some(email), Some(password)) if !email.trim().is_empty() && !password.is_empty() => {
            (email.trim(), password)
        }
        _ => return Err(ApiError::bad_request("Email and password are required")),
    };

    let user = state.users().select_first(vec![Condition::eq("email", email)]).await?;
    let digest = user.as_ref().map(|u| u.password.as_str());
    let matches = state.credentials.verify_password_or_dummy(password, digest).await?;

    match user {
        Some(user) if matches => {
            tracing::info!(user = %user.id, "login succeeded");
            let message = format!("Welcome {}", user.name);
            send_token(&state, &user, StatusCode::OK, message)
        }
        _ => {
            tracing::debug!("login rejected");
            Err(ApiError::invalid_credentials())
        }
    }
}
