// handlers/auth/register.rs - POST /api/v1/auth/register

use axum::{extract::State, http::StatusCode};

use super::send_token;
use crate::error::{ensure_valid, ApiError};
use crate::extract::JsonBody;
use crate::middleware::TokenResponse;
use crate::models::{Role, User, UserInput, UserView};
use crate::state::AppState;

/// Roles a caller may pick for themselves. Admins are created by admins.
pub const SELF_SERVICE_ROLES: [Role; 2] = [Role::User, Role::Publisher];

pub async fn register(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<UserInput>,
) -> Result<TokenResponse<UserView>, ApiError> {
    ensure_valid(input.validate_new(&SELF_SERVICE_ROLES))?;

    let password = input.password.as_deref().unwrap_or_default();
    let digest = state.credentials.hash_password(password).await?;
    let user = User::new(
        input.name.as_deref().unwrap_or_default().trim().to_string(),
        input.email.as_deref().unwrap_or_default().trim().to_string(),
        input.role_or_default(),
        digest,
    );
    state.users().insert(&user).await?;

    tracing::info!(user = %user.id, role = %user.role, "registered user");
    send_token(&state, &user, StatusCode::OK, "Registered successfully")
}
