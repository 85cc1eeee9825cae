// handlers/courses/read.rs - public course reads

use axum::extract::{Path, State};
use serde_json::Value;

use crate::error::ApiError;
use crate::extract::{parse_id, QueryPairs};
use crate::filter::{translate, Condition};
use crate::handlers::{fetch_page, load_bootcamp, populate_bootcamp};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

pub async fn list_courses(State(state): State<AppState>, QueryPairs(raw): QueryPairs) -> ApiResult<Vec<Value>> {
    let plan = translate(&raw, &state.config.filter)?;
    let (mut docs, links) = fetch_page(&state.courses(), &plan).await?;
    populate_bootcamp(&state, &mut docs).await?;
    Ok(ApiResponse::list(docs, Some(links)))
}

/// Nested listing; 404 when the parent bootcamp does not exist.
pub async fn bootcamp_courses(
    State(state): State<AppState>,
    Path(bootcamp_id): Path<String>,
    QueryPairs(raw): QueryPairs,
) -> ApiResult<Vec<Value>> {
    let bootcamp = load_bootcamp(&state, &bootcamp_id).await?;
    let plan = translate(&raw, &state.config.filter)?
        .with_condition(Condition::eq("bootcamp", bootcamp.id.to_string()));
    let (docs, links) = fetch_page(&state.courses(), &plan).await?;
    Ok(ApiResponse::list(docs, Some(links)))
}

pub async fn get_course(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Value> {
    let course = state.courses().select_404(parse_id(&id)?).await?;
    let mut docs = [serde_json::to_value(&course).map_err(|e| ApiError::internal_server_error(e.to_string()))?];
    populate_bootcamp(&state, &mut docs).await?;
    let [doc] = docs;
    Ok(ApiResponse::success(doc))
}
