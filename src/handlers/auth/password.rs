// handlers/auth/password.rs - forgot / reset / update password

use axum::{
    extract::{Extension, Host, Path, State},
    http::{HeaderMap, StatusCode},
};
use chrono::Utc;
use serde::Deserialize;

use super::send_token;
use crate::auth::digest_reset_token;
use crate::error::{ensure_valid, ApiError};
use crate::extract::JsonBody;
use crate::filter::Condition;
use crate::middleware::{ApiResponse, CurrentUser, TokenResponse};
use crate::models::user::validate_password;
use crate::models::UserView;
use crate::services::mailer::reset_password_email;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: Option<String>,
}

/// Stores a hashed reset token and mails the plain one as a link. A failed
/// send clears the stored token again.
pub async fn forgot_password(
    State(state): State<AppState>,
    Host(host): Host,
    headers: HeaderMap,
    JsonBody(request): JsonBody<ForgotPasswordRequest>,
) -> Result<ApiResponse<serde_json::Value>, ApiError> {
    let email = request.email.as_deref().map(str::trim).unwrap_or_default();
    if email.is_empty() {
        return Err(ApiError::bad_request("Please provide an email"));
    }

    let users = state.users();
    let mut user = users
        .select_first(vec![Condition::eq("email", email)])
        .await?
        .ok_or_else(|| ApiError::not_found("Email is not registered"))?;

    let reset = state.credentials.issue_reset_token();
    user.reset_password_token = Some(reset.digest);
    user.reset_password_expire = Some(reset.expires_at);
    users.update(&user).await?;

    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http");
    let reset_url = format!("{scheme}://{host}/api/v1/auth/resetpassword/{}", reset.plain);

    if let Err(e) = state.mailer.send(&reset_password_email(&user.email, &reset_url)).await {
        tracing::error!(user = %user.id, error = %e, "reset email failed, clearing reset token");
        user.clear_reset();
        users.update(&user).await?;
        return Err(ApiError::internal_server_error("Could not send an email"));
    }

    tracing::info!(user = %user.id, "issued password reset token");
    Ok(ApiResponse::empty().message("A reset link have been sent to your email"))
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub password: Option<String>,
}

/// Consumes an unexpired reset token and signs the user in.
pub async fn reset_password(
    State(state): State<AppState>,
    Path(reset_token): Path<String>,
    JsonBody(request): JsonBody<ResetPasswordRequest>,
) -> Result<TokenResponse<UserView>, ApiError> {
    let password = request.password.unwrap_or_default();
    ensure_valid(validate_password(&password).into_iter().collect())?;

    let users = state.users();
    let digest = digest_reset_token(&reset_token);
    let mut user = users
        .select_first(vec![Condition::eq("resetPasswordToken", digest)])
        .await?
        .filter(|u| u.reset_password_expire.is_some_and(|expires| expires > Utc::now()))
        .ok_or_else(|| ApiError::bad_request("Invalid or expired reset token"))?;

    user.password = state.credentials.hash_password(&password).await?;
    user.clear_reset();
    users.update(&user).await?;

    tracing::info!(user = %user.id, "password reset");
    send_token(&state, &user, StatusCode::OK, "Password has been reset")
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

pub async fn update_password(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    JsonBody(request): JsonBody<UpdatePasswordRequest>,
) -> Result<TokenResponse<UserView>, ApiError> {
    let (Some(current_password), Some(new_password)) = (request.current_password, request.new_password) else {
        return Err(ApiError::bad_request("Current and new password are required"));
    };
    ensure_valid(validate_password(&new_password).into_iter().collect())?;

    let users = state.users();
    let mut user = users.select_404(current.id).await?;
    if !state.credentials.verify_password(&current_password, &user.password).await? {
        return Err(ApiError::unauthorized("Password is incorrect"));
    }

    user.password = state.credentials.hash_password(&new_password).await?;
    users.update(&user).await?;

    tracing::info!(user = %user.id, "password updated");
    send_token(&state, &user, StatusCode::OK, "Password updated")
}
