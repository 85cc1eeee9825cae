// handlers/courses/write.rs - course create / update / delete

use axum::extract::{Extension, Path, State};
use serde_json::Value;

use crate::error::{ensure_valid, ApiError};
use crate::extract::{parse_id, JsonBody};
use crate::handlers::load_bootcamp;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::models::{Course, CourseInput};
use crate::policy::ensure_can_mutate;
use crate::services::aggregates::schedule_average_cost;
use crate::state::AppState;

/// Adding a course counts as modifying the parent bootcamp.
pub async fn create_course(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(bootcamp_id): Path<String>,
    JsonBody(input): JsonBody<CourseInput>,
) -> ApiResult<Course> {
    let bootcamp = load_bootcamp(&state, &bootcamp_id).await?;
    ensure_can_mutate(&current, &bootcamp, "add a course to")?;
    ensure_valid(input.validate_new())?;

    let course = Course::from_input(&input, bootcamp.id, current.id);
    state.courses().insert(&course).await?;
    let _ = schedule_average_cost(state.store.clone(), bootcamp.id);

    tracing::info!(course = %course.id, bootcamp = %bootcamp.id, user = %current.id, "created course");
    Ok(ApiResponse::created(course))
}

pub async fn update_course(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    JsonBody(patch): JsonBody<CourseInput>,
) -> ApiResult<Course> {
    let courses = state.courses();
    let mut course = courses.select_404(parse_id(&id)?).await?;
    ensure_can_mutate(&current, &course, "update")?;
    ensure_valid(patch.validate_patch())?;

    course.apply(&patch);
    courses.update(&course).await?;
    let _ = schedule_average_cost(state.store.clone(), course.bootcamp);

    tracing::info!(course = %course.id, user = %current.id, "updated course");
    Ok(ApiResponse::success(course))
}

pub async fn delete_course(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Value>, ApiError> {
    let courses = state.courses();
    let course = courses.select_404(parse_id(&id)?).await?;
    ensure_can_mutate(&current, &course, "delete")?;

    courses.delete(course.id).await?;
    let _ = schedule_average_cost(state.store.clone(), course.bootcamp);

    tracing::info!(course = %course.id, user = %current.id, "deleted course");
    Ok(ApiResponse::empty())
}
