// handlers/reviews/write.rs - review create / update / delete

use axum::extract::{Extension, Path, State};
use serde_json::Value;

use crate::error::{ensure_valid, ApiError};
use crate::extract::{parse_id, JsonBody};
use crate::filter::Condition;
use crate::handlers::load_bootcamp;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::models::{Review, ReviewInput};
use crate::policy::{ensure_can_mutate, ensure_first_review};
use crate::services::aggregates::schedule_average_rating;
use crate::state::AppState;

/// The pre-check gives the friendly 400; the (bootcamp, user) unique index
/// still catches concurrent duplicates as a `DuplicateKey`.
pub async fn create_review(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(bootcamp_id): Path<String>,
    JsonBody(input): JsonBody<ReviewInput>,
) -> ApiResult<Review> {
    let bootcamp = load_bootcamp(&state, &bootcamp_id).await?;
    ensure_valid(input.validate_new())?;

    let reviews = state.reviews();
    let existing = reviews
        .count(&[
            Condition::eq("bootcamp", bootcamp.id.to_string()),
            Condition::eq("user", current.id.to_string()),
        ])
        .await?;
    ensure_first_review(existing)?;

    let review = Review::from_input(&input, bootcamp.id, current.id);
    reviews.insert(&review).await?;
    let _ = schedule_average_rating(state.store.clone(), bootcamp.id);

    tracing::info!(review = %review.id, bootcamp = %bootcamp.id, user = %current.id, "created review");
    Ok(ApiResponse::created(review))
}

pub async fn update_review(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<ReviewInput>,
) -> ApiResult<Review> {
    let reviews = state.reviews();
    let mut review = reviews.select_404(parse_id(&id)?).await?;
    ensure_can_mutate(&current, &review, "update")?;
    ensure_valid(patch.validate_patch())?;

    review.apply(&patch);
    reviews.update(&review).await?;
    let _ = schedule_average_rating(state.store.clone(), review.bootcamp);

    tracing::info!(review = %review.id, user = %current.id, "updated review");
    Ok(ApiResponse::success(review))
}

pub async fn delete_review(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Value>, ApiError> {
    let reviews = state.reviews();
    let review = reviews.select_404(parse_id(&id)?).await?;
    ensure_can_mutate(&current, &review, "delete")?;

    reviews.delete(review.id).await?;
    let _ = schedule_average_rating(state.store.clone(), review.bootcamp);

    tracing::info!(review = %review.id, user = %current.id, "deleted review");
    Ok(ApiResponse::empty())
}
