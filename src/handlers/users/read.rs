// handlers/users/read.rs

use axum::extract::{Path, State};
use serde_json::Value;

use crate::extract::{parse_id, QueryPairs};
use crate::filter::translate;
use crate::handlers::fetch_page;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::UserView;
use crate::state::AppState;

/// Listed documents are redacted by the repository.
pub async fn list_users(State(state): State<AppState>, QueryPairs(raw): QueryPairs) -> ApiResult<Vec<Value>> {
    let plan = translate(&raw, &state.config.filter)?;
    let (docs, links) = fetch_page(&state.users(), &plan).await?;
    Ok(ApiResponse::list(docs, Some(links)))
}

pub async fn get_user(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<UserView> {
    let user = state.users().select_404(parse_id(&id)?).await?;
    Ok(ApiResponse::success(user.view()))
}
