//! Application router.
//!
//! [`app`] is shared by the server binary and the integration tests so both
//! run the same middleware stack.

use std::any::Any;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{from_fn, from_fn_with_state},
    response::{IntoResponse, Json, Response},
    routing::{get, post, put},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::handlers::{auth, bootcamps, courses, reviews, users};
use crate::middleware::{require_admin, require_publisher, require_reviewer, require_token};
use crate::state::AppState;

/// Room for multipart framing around the largest accepted photo.
const BODY_LIMIT_SLACK: usize = 64 * 1024;

pub fn app(state: AppState) -> Router {
    let config = state.config.clone();

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .nest("/api/v1", api_routes(&state))
        .nest_service("/uploads", ServeDir::new(&config.upload.upload_path))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(config.upload.max_file_upload + BODY_LIMIT_SLACK))
        .layer(
            ServiceBuilder::new()
                .layer(CatchPanicLayer::custom(handle_panic))
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&config)),
        )
        .with_state(state)
}

fn api_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes(state))
        .nest("/bootcamps", bootcamp_routes(state))
        .nest("/courses", course_routes(state))
        .nest("/reviews", review_routes(state))
        .nest("/users", user_routes(state))
}

fn auth_routes(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", get(auth::logout))
        .route("/forgotpassword", post(auth::forgot_password))
        .route("/resetpassword/:resettoken", put(auth::reset_password));

    let private = Router::new()
        .route("/me", get(auth::me))
        .route("/updatedetails", put(auth::update_details))
        .route("/updatepassword", put(auth::update_password))
        .route_layer(from_fn_with_state(state.clone(), require_token));

    public.merge(private)
}

// Every path segment after `/bootcamps` is `:id`, so the radius search reads
// its first parameter as the zipcode.
fn bootcamp_routes(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/", get(bootcamps::list_bootcamps))
        .route("/:id", get(bootcamps::get_bootcamp))
        .route("/:id/:distance", get(bootcamps::bootcamps_within_radius))
        .route("/:id/courses", get(courses::bootcamp_courses))
        .route("/:id/reviews", get(reviews::bootcamp_reviews));

    let publisher = Router::new()
        .route("/", post(bootcamps::create_bootcamp))
        .route(
            "/:id",
            put(bootcamps::update_bootcamp).delete(bootcamps::delete_bootcamp),
        )
        .route("/:id/photo", put(bootcamps::upload_photo))
        .route_layer(from_fn(require_publisher))
        .route_layer(from_fn_with_state(state.clone(), require_token));

    let course_owner = Router::new()
        .route("/:id/courses", post(courses::create_course))
        .route_layer(from_fn_with_state(state.clone(), require_token));

    let reviewer = Router::new()
        .route("/:id/reviews", post(reviews::create_review))
        .route_layer(from_fn(require_reviewer))
        .route_layer(from_fn_with_state(state.clone(), require_token));

    public.merge(publisher).merge(course_owner).merge(reviewer)
}

fn course_routes(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/", get(courses::list_courses))
        .route("/:id", get(courses::get_course));

    let private = Router::new()
        .route("/:id", put(courses::update_course).delete(courses::delete_course))
        .route_layer(from_fn_with_state(state.clone(), require_token));

    public.merge(private)
}

fn review_routes(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/", get(reviews::list_reviews))
        .route("/:id", get(reviews::get_review));

    let reviewer = Router::new()
        .route("/:id", put(reviews::update_review).delete(reviews::delete_review))
        .route_layer(from_fn(require_reviewer))
        .route_layer(from_fn_with_state(state.clone(), require_token));

    public.merge(reviewer)
}

fn user_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(users::list_users).post(users::create_user))
        .route(
            "/:id",
            get(users::get_user).put(users::update_user).delete(users::delete_user),
        )
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(state.clone(), require_token))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let security = &config.security;
    if !security.enable_cors {
        return CorsLayer::new();
    }

    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if security.cors_origins.is_empty() || security.cors_origins.iter().any(|o| o == "*") {
        return base.allow_origin(AllowOrigin::any());
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(%origin, error = %e, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    base.allow_origin(origins).allow_credentials(true)
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!(%detail, "request handler panicked");
    ApiError::internal_server_error(detail).into_response()
}

async fn not_found() -> ApiError {
    ApiError::not_found("Resource Not Found")
}

async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "DevCamper API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Bootcamp directory: bootcamps, courses, reviews and users",
            "endpoints": {
                "auth": "/api/v1/auth/*",
                "bootcamps": "/api/v1/bootcamps[/:id]",
                "radius": "/api/v1/bootcamps/:zipcode/:distance",
                "courses": "/api/v1/courses[/:id], /api/v1/bootcamps/:id/courses",
                "reviews": "/api/v1/reviews[/:id], /api/v1/bootcamps/:id/reviews",
                "users": "/api/v1/users[/:id] (admin)",
                "uploads": "/uploads/:file",
                "health": "/health",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": { "status": "ok", "timestamp": now, "store": "ok" }
            })),
        ),
        Err(e) => {
            tracing::error!(error = %e, "store health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "store unavailable",
                    "data": { "status": "degraded", "timestamp": now }
                })),
            )
        }
    }
}
