// handlers/auth/session.rs - GET /me, GET /logout, PUT /updatedetails

use axum::extract::{Extension, State};
use serde::Deserialize;

use super::cleared_cookie;
use crate::error::{ensure_valid, ApiError};
use crate::extract::JsonBody;
use crate::middleware::{ApiResponse, ApiResult, CookieResponse, CurrentUser};
use crate::models::{UserInput, UserView};
use crate::state::AppState;

pub async fn me(State(state): State<AppState>, Extension(current): Extension<CurrentUser>) -> ApiResult<UserView> {
    let user = state.users().select_404(current.id).await?;
    Ok(ApiResponse::success(user.view()))
}

pub async fn logout(State(state): State<AppState>) -> CookieResponse<serde_json::Value> {
    CookieResponse {
        inner: ApiResponse::empty(),
        cookie: cleared_cookie(&state.config.security),
    }
}

/// Name and email only; passwords go through `updatepassword`.
#[derive(Debug, Deserialize)]
pub struct DetailsRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

pub async fn update_details(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    JsonBody(request): JsonBody<DetailsRequest>,
) -> Result<ApiResponse<UserView>, ApiError> {
    let patch = UserInput { name: request.name, email: request.email, ..Default::default() };
    ensure_valid(patch.validate_patch(&[]))?;

    let users = state.users();
    let mut user = users.select_404(current.id).await?;
    if let Some(name) = patch.name.as_deref() {
        user.name = name.trim().to_string();
    }
    if let Some(email) = patch.email.as_deref() {
        user.email = email.trim().to_string();
    }
    users.update(&user).await?;

    tracing::info!(user = %user.id, "updated account details");
    Ok(ApiResponse::success(user.view()))
}
