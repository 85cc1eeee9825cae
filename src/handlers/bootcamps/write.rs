// handlers/bootcamps/write.rs - bootcamp create / update / delete

use axum::extract::{Extension, Path, State};
use serde_json::Value;

use crate::error::{ensure_valid, ApiError};
use crate::extract::JsonBody;
use crate::filter::Condition;
use crate::handlers::load_bootcamp;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::models::{Bootcamp, BootcampInput};
use crate::policy::{ensure_can_mutate, ensure_can_publish};
use crate::services::aggregates::AGGREGATE_FIELDS;
use crate::services::slugify;
use crate::state::AppState;

/// Validate, enforce the one-bootcamp rule, derive slug and location, persist.
pub async fn create_bootcamp(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    JsonBody(input): JsonBody<BootcampInput>,
) -> ApiResult<Bootcamp> {
    ensure_valid(input.validate_new())?;

    let bootcamps = state.bootcamps();
    let owned = bootcamps
        .count(&[Condition::eq("user", current.id.to_string())])
        .await?;
    ensure_can_publish(&current, owned)?;

    let mut bootcamp = Bootcamp::from_input(&input, current.id);
    bootcamp.slug = slugify(&bootcamp.name);
    if let Some(address) = input.address.as_deref() {
        bootcamp.location = Some(state.geocoder.geocode(address).await?);
    }
    bootcamps.insert(&bootcamp).await?;

    tracing::info!(bootcamp = %bootcamp.id, user = %current.id, slug = %bootcamp.slug, "created bootcamp");
    Ok(ApiResponse::created(bootcamp))
}

pub async fn update_bootcamp(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<BootcampInput>,
) -> ApiResult<Bootcamp> {
    let mut bootcamp = load_bootcamp(&state, &id).await?;
    ensure_can_mutate(&current, &bootcamp, "update")?;
    ensure_valid(patch.validate_patch())?;

    if bootcamp.apply(&patch) {
        bootcamp.slug = slugify(&bootcamp.name);
    }
    if let Some(address) = patch.address.as_deref().filter(|a| !a.trim().is_empty()) {
        bootcamp.location = Some(state.geocoder.geocode(address).await?);
    }
    state.bootcamps().update_preserving(&bootcamp, &AGGREGATE_FIELDS).await?;

    tracing::info!(bootcamp = %bootcamp.id, user = %current.id, "updated bootcamp");
    Ok(ApiResponse::success(bootcamp))
}

/// Courses and reviews go first so no child outlives its parent.
pub async fn delete_bootcamp(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Value>, ApiError> {
    let bootcamp = load_bootcamp(&state, &id).await?;
    ensure_can_mutate(&current, &bootcamp, "delete")?;

    let children = [Condition::eq("bootcamp", bootcamp.id.to_string())];
    let courses = state.courses();
    let reviews = state.reviews();
    let (removed_courses, removed_reviews) =
        futures::try_join!(courses.delete_where(&children), reviews.delete_where(&children))?;
    state.bootcamps().delete(bootcamp.id).await?;

    tracing::info!(
        bootcamp = %bootcamp.id,
        user = %current.id,
        removed_courses,
        removed_reviews,
        "deleted bootcamp"
    );
    Ok(ApiResponse::empty())
}
