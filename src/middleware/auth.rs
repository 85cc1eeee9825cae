use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use cookie::Cookie;
use uuid::Uuid;

use crate::config::SecurityConfig;
use crate::error::ApiError;
use crate::models::{Role, User};
use crate::state::AppState;

/// Identity loaded for an authenticated request.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// Token → identity. Fails with 401 before touching the store when the token
/// is missing or invalid, and with 404 when its identity no longer exists.
pub async fn require_token(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(request.headers(), &state.config.security)
        .ok_or_else(ApiError::not_authenticated)?;
    let id = state.credentials.verify_token(&token)?;

    let user = state
        .users()
        .select_one(id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    tracing::debug!(user = %user.id, role = %user.role, "authenticated request");
    request.extensions_mut().insert(CurrentUser::from(&user));
    Ok(next.run(request).await)
}

/// Bearer header first, then the auth cookie when the fallback is enabled.
/// Other authorization schemes are ignored.
pub fn extract_token(headers: &HeaderMap, config: &SecurityConfig) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    if let Some(token) = bearer {
        let token = token.trim();
        return (!token.is_empty()).then(|| token.to_string());
    }

    if !config.cookie_fallback {
        return None;
    }
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|c| c.name() == config.cookie_name && !c.value().is_empty() && c.value() != "none")
        .map(|c| c.value().to_string())
}

/// Role gate. Runs after `require_token`; no identity at all is also forbidden.
pub fn verify_user_role<'a>(
    user: Option<&'a CurrentUser>,
    allowed: &[Role],
) -> Result<&'a CurrentUser, ApiError> {
    match user {
        Some(user) if allowed.contains(&user.role) => Ok(user),
        _ => Err(ApiError::forbidden("User does not have permission to modify this resource")),
    }
}

async fn gate(allowed: &[Role], request: Request, next: Next) -> Result<Response, ApiError> {
    verify_user_role(request.extensions().get::<CurrentUser>(), allowed)?;
    Ok(next.run(request).await)
}

pub async fn require_publisher(request: Request, next: Next) -> Result<Response, ApiError> {
    gate(&[Role::Publisher, Role::Admin], request, next).await
}

pub async fn require_reviewer(request: Request, next: Next) -> Result<Response, ApiError> {
    gate(&[Role::User, Role::Admin], request, next).await
}

pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    gate(&[Role::Admin], request, next).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use axum::http::HeaderValue;

    fn security() -> SecurityConfig {
        AppConfig::development().security
    }

    fn user(role: Role) -> CurrentUser {
        CurrentUser { id: Uuid::new_v4(), name: "n".into(), email: "e@x.io".into(), role }
    }

    #[test]
    fn bearer_header_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        headers.insert(header::COOKIE, HeaderValue::from_static("jwt_token=cookie.token.value"));
        assert_eq!(extract_token(&headers, &security()).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn malformed_header_yields_nothing() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert_eq!(extract_token(&headers, &security()), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer   "));
        assert_eq!(extract_token(&headers, &security()), None);
    }

    #[test]
    fn other_schemes_fall_back_to_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        headers.insert(header::COOKIE, HeaderValue::from_static("jwt_token=from.cookie.jwt"));
        assert_eq!(extract_token(&headers, &security()).as_deref(), Some("from.cookie.jwt"));
    }

    #[test]
    fn cookie_fallback_is_configurable() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; jwt_token=from.cookie.jwt"));

        let mut config = security();
        assert_eq!(extract_token(&headers, &config).as_deref(), Some("from.cookie.jwt"));

        config.cookie_fallback = false;
        assert_eq!(extract_token(&headers, &config), None);
    }

    #[test]
    fn logged_out_cookie_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("jwt_token=none"));
        assert_eq!(extract_token(&headers, &security()), None);
    }

    #[test]
    fn role_gate() {
        let publisher = user(Role::Publisher);
        let admin = user(Role::Admin);
        let plain = user(Role::User);
        let allowed = [Role::Publisher, Role::Admin];

        assert!(verify_user_role(Some(&publisher), &allowed).is_ok());
        assert!(verify_user_role(Some(&admin), &allowed).is_ok());
        let err = verify_user_role(Some(&plain), &allowed).unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::FORBIDDEN);
        assert!(verify_user_role(None, &allowed).is_err());
    }
}
