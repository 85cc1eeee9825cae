// handlers/users/write.rs

use axum::extract::{Extension, Path, State};
use serde_json::Value;

use super::ASSIGNABLE_ROLES;
use crate::error::{ensure_valid, ApiError};
use crate::extract::{parse_id, JsonBody};
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::models::{Role, User, UserInput, UserView};
use crate::state::AppState;

pub async fn create_user(
    State(state): State<AppState>,
    Extension(admin): Extension<CurrentUser>,
    JsonBody(input): JsonBody<UserInput>,
) -> ApiResult<UserView> {
    ensure_valid(input.validate_new(&ASSIGNABLE_ROLES))?;

    let digest = state
        .credentials
        .hash_password(input.password.as_deref().unwrap_or_default())
        .await?;
    let user = User::new(
        input.name.as_deref().unwrap_or_default().trim().to_string(),
        input.email.as_deref().unwrap_or_default().trim().to_string(),
        input.role_or_default(),
        digest,
    );
    state.users().insert(&user).await?;

    tracing::info!(user = %user.id, role = %user.role, admin = %admin.id, "admin created user");
    Ok(ApiResponse::created(user.view()).message("Successfully created a new user"))
}

/// Partial update. A new password is hashed before it is stored.
pub async fn update_user(
    State(state): State<AppState>,
    Extension(admin): Extension<CurrentUser>,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<UserInput>,
) -> ApiResult<UserView> {
    let users = state.users();
    let mut user = users.select_404(parse_id(&id)?).await?;
    ensure_valid(patch.validate_patch(&ASSIGNABLE_ROLES))?;

    if let Some(name) = patch.name.as_deref() {
        user.name = name.trim().to_string();
    }
    if let Some(email) = patch.email.as_deref() {
        user.email = email.trim().to_string();
    }
    if let Some(role) = patch.role.as_deref().and_then(Role::parse) {
        user.role = role;
    }
    if let Some(password) = patch.password.as_deref() {
        user.password = state.credentials.hash_password(password).await?;
    }
    users.update(&user).await?;

    tracing::info!(user = %user.id, admin = %admin.id, "admin updated user");
    Ok(ApiResponse::success(user.view()).message("Successfully updated the user"))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Extension(admin): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Value>, ApiError> {
    let users = state.users();
    let user = users.select_404(parse_id(&id)?).await?;
    users.delete(user.id).await?;

    tracing::info!(user = %user.id, admin = %admin.id, "admin deleted user");
    Ok(ApiResponse::empty().message(format!("Successfully deleted the user \"{}\"", user.name)))
}
