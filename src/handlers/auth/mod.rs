// handlers/auth/mod.rs - Account and session endpoints
//
// Public:  POST /register, POST /login, POST /forgotpassword, PUT /resetpassword/:resettoken
// Token:   GET /me, GET /logout, PUT /updatedetails, PUT /updatepassword
pub mod login;
pub mod password;
pub mod register;
pub mod session;

pub use login::login;
pub use password::{forgot_password, reset_password, update_password};
pub use register::register;
pub use session::{logout, me, update_details};

use axum::http::StatusCode;
use cookie::{time, Cookie};

use crate::config::SecurityConfig;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, TokenResponse};
use crate::models::{User, UserView};
use crate::state::AppState;

/// HTTP-only session cookie that expires together with the token.
pub(crate) fn session_cookie(security: &SecurityConfig, token: String, lifetime: chrono::Duration) -> Cookie<'static> {
    Cookie::build((security.cookie_name.clone(), token))
        .http_only(true)
        .secure(security.secure_cookies)
        .path("/")
        .max_age(time::Duration::seconds(lifetime.num_seconds()))
        .build()
}

/// Overwrites the session cookie with `none`, expiring in ten seconds.
pub(crate) fn cleared_cookie(security: &SecurityConfig) -> Cookie<'static> {
    Cookie::build((security.cookie_name.clone(), "none"))
        .http_only(true)
        .secure(security.secure_cookies)
        .path("/")
        .max_age(time::Duration::seconds(10))
        .build()
}

/// Signs a token for `user` and returns it in both the body and the cookie.
pub(crate) fn send_token(
    state: &AppState,
    user: &User,
    status: StatusCode,
    message: impl Into<String>,
) -> Result<TokenResponse<UserView>, ApiError> {
    let token = state.credentials.issue_token(user.id)?;
    let cookie = session_cookie(&state.config.security, token.clone(), state.credentials.token_lifetime());
    Ok(TokenResponse {
        inner: ApiResponse::with_status(user.view(), status).message(message),
        token,
        cookie,
    })
}
