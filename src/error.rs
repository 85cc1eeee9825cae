// HTTP API error types. Every failure a handler can raise ends up here and
// leaves the server as `{ "success": false, "error": "<message>" }`.
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::auth::CredentialError;
use crate::filter::FilterError;
use crate::services::geocoder::GeocodeError;
use crate::services::mailer::MailError;
use crate::services::uploads::UploadError;
use crate::store::StoreError;

#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationFailed(Vec<String>),
    DuplicateKey(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),
    MalformedIdentifier,

    // 500 Internal Server Error, detail is logged and never sent
    InternalServerError(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            ApiError::DuplicateKey(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MalformedIdentifier => StatusCode::NOT_FOUND,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-safe message.
    pub fn message(&self) -> String {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg) => msg.clone(),
            ApiError::ValidationFailed(messages) => messages
                .iter()
                .map(|m| if m.ends_with('.') { m.clone() } else { format!("{m}.") })
                .collect::<Vec<_>>()
                .join(" "),
            ApiError::DuplicateKey(value) => format!("\"{value}\" already exists"),
            ApiError::MalformedIdentifier => "Resource not found".to_string(),
            ApiError::InternalServerError(_) => "Internal Server Error".to_string(),
        }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "success": false,
            "error": self.message(),
        })
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation(messages: Vec<String>) -> Self {
        ApiError::ValidationFailed(messages)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn not_authenticated() -> Self {
        ApiError::Unauthorized("Not authenticated".to_string())
    }

    pub fn invalid_credentials() -> Self {
        ApiError::Unauthorized("Invalid credentials".to_string())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }
}

/// Turns an empty list of validation messages into `Ok`.
pub fn ensure_valid(messages: Vec<String>) -> Result<(), ApiError> {
    if messages.is_empty() {
        Ok(())
    } else {
        Err(ApiError::ValidationFailed(messages))
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(label) => ApiError::not_found(format!("{label} not found")),
            StoreError::DuplicateKey { value, .. } => ApiError::DuplicateKey(value),
            other => {
                tracing::error!("Store error: {}", other);
                ApiError::internal_server_error(other.to_string())
            }
        }
    }
}

impl From<FilterError> for ApiError {
    fn from(err: FilterError) -> Self {
        ApiError::bad_request(err.to_string())
    }
}

impl From<CredentialError> for ApiError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::InvalidToken => ApiError::not_authenticated(),
            other => {
                tracing::error!("Credential error: {}", other);
                ApiError::internal_server_error(other.to_string())
            }
        }
    }
}

impl From<GeocodeError> for ApiError {
    fn from(err: GeocodeError) -> Self {
        match err {
            GeocodeError::NoResults(query) => {
                ApiError::bad_request(format!("Could not locate address \"{query}\""))
            }
            other => {
                tracing::error!("Geocoder error: {}", other);
                ApiError::internal_server_error(other.to_string())
            }
        }
    }
}

impl From<MailError> for ApiError {
    fn from(err: MailError) -> Self {
        tracing::error!("Mail error: {}", err);
        ApiError::internal_server_error(err.to_string())
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::Io(e) => {
                tracing::error!("Upload write failed: {}", e);
                ApiError::internal_server_error(e.to_string())
            }
            other => ApiError::bad_request(other.to_string()),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::InternalServerError(detail) => write!(f, "{}", detail),
            other => write!(f, "{}", other.message()),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        if let ApiError::InternalServerError(detail) = &self {
            tracing::error!(detail = %detail, "request failed");
        }
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_messages_are_terminated_and_joined() {
        let err = ApiError::validation(vec![
            "Please enter a name".to_string(),
            "Please add a description.".to_string(),
        ]);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "Please enter a name. Please add a description.");
    }

    #[test]
    fn duplicate_key_quotes_value() {
        let err = ApiError::from(StoreError::DuplicateKey {
            collection: "bootcamps".to_string(),
            value: "Devworks".to_string(),
        });
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_json(), json!({ "success": false, "error": "\"Devworks\" already exists" }));
    }

    #[test]
    fn malformed_identifier_reads_as_not_found() {
        let err = ApiError::MalformedIdentifier;
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(err.message(), "Resource not found");
    }

    #[test]
    fn internal_detail_is_hidden() {
        let err = ApiError::internal_server_error("connection reset by peer");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), "Internal Server Error");
    }

    #[test]
    fn store_not_found_names_resource() {
        let err = ApiError::from(StoreError::NotFound("Bootcamp"));
        assert_eq!(err.message(), "Bootcamp not found");
    }
}
