use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use cookie::Cookie;
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::pagination::PageLinks;

/// Success envelope: `{ success, message?, count?, pagination?, data }`.
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub status_code: Option<StatusCode>,
    pub message: Option<String>,
    pub count: Option<usize>,
    pub pagination: Option<PageLinks>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            data,
            status_code: None,
            message: None,
            count: None,
            pagination: None,
        }
    }

    pub fn with_status(data: T, status_code: StatusCode) -> Self {
        Self { status_code: Some(status_code), ..Self::success(data) }
    }

    pub fn created(data: T) -> Self {
        Self::with_status(data, StatusCode::CREATED)
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl<T: Serialize> ApiResponse<Vec<T>> {
    /// List response carrying the page size and neighbouring pages.
    pub fn list(data: Vec<T>, pagination: Option<PageLinks>) -> Self {
        Self {
            count: Some(data.len()),
            pagination,
            ..Self::success(data)
        }
    }
}

impl ApiResponse<Value> {
    /// `data: {}`, used by deletes.
    pub fn empty() -> Self {
        Self::success(Value::Object(Map::new()))
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status_code.unwrap_or(StatusCode::OK);

        let data_value = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "success": false,
                        "error": "Internal Server Error"
                    })),
                )
                    .into_response();
            }
        };

        let mut envelope = Map::new();
        envelope.insert("success".into(), Value::Bool(true));
        if let Some(message) = self.message {
            envelope.insert("message".into(), Value::String(message));
        }
        if let Some(count) = self.count {
            envelope.insert("count".into(), json!(count));
        }
        if let Some(pagination) = self.pagination {
            envelope.insert("pagination".into(), json!(pagination));
        }
        envelope.insert("data".into(), data_value);

        (status, Json(Value::Object(envelope))).into_response()
    }
}

/// Issued session: token in the body plus the HTTP-only cookie.
pub struct TokenResponse<T: Serialize> {
    pub inner: ApiResponse<T>,
    pub token: String,
    pub cookie: Cookie<'static>,
}

impl<T: Serialize> IntoResponse for TokenResponse<T> {
    fn into_response(self) -> Response {
        let mut envelope = json!({ "success": true, "jwt_token": self.token });
        if let Some(message) = self.inner.message {
            envelope["message"] = Value::String(message);
        }
        match serde_json::to_value(&self.inner.data) {
            Ok(data) => envelope["data"] = data,
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        }

        let status = self.inner.status_code.unwrap_or(StatusCode::OK);
        let mut response = (status, Json(envelope)).into_response();
        if let Ok(value) = HeaderValue::from_str(&self.cookie.to_string()) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
        response
    }
}

/// Response that only replaces the auth cookie, e.g. logout.
pub struct CookieResponse<T: Serialize> {
    pub inner: ApiResponse<T>,
    pub cookie: Cookie<'static>,
}

impl<T: Serialize> IntoResponse for CookieResponse<T> {
    fn into_response(self) -> Response {
        let mut response = self.inner.into_response();
        if let Ok(value) = HeaderValue::from_str(&self.cookie.to_string()) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
        response
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;
