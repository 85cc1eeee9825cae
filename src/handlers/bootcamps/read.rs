// handlers/bootcamps/read.rs - public bootcamp reads

use axum::extract::{Path, State};
use serde_json::Value;

use crate::error::ApiError;
use crate::extract::{parse_id, QueryPairs};
use crate::filter::{translate, Condition};
use crate::handlers::fetch_page;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::Bootcamp;
use crate::state::AppState;
use crate::store::matcher::EARTH_RADIUS_MILES;

pub async fn list_bootcamps(State(state): State<AppState>, QueryPairs(raw): QueryPairs) -> ApiResult<Vec<Value>> {
    let plan = translate(&raw, &state.config.filter)?;
    let (docs, links) = fetch_page(&state.bootcamps(), &plan).await?;
    Ok(ApiResponse::list(docs, Some(links)))
}

pub async fn get_bootcamp(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Bootcamp> {
    let id = parse_id(&id)?;
    let bootcamp = state.bootcamps().select_404(id).await?;
    Ok(ApiResponse::success(bootcamp))
}

/// Bootcamps whose location lies within `distance` miles of the geocoded
/// zipcode. The usual filter, sort and paging parameters still apply.
pub async fn bootcamps_within_radius(
    State(state): State<AppState>,
    Path((zipcode, distance)): Path<(String, String)>,
    QueryPairs(raw): QueryPairs,
) -> ApiResult<Vec<Value>> {
    let distance: f64 = distance
        .parse()
        .ok()
        .filter(|d: &f64| d.is_finite() && *d >= 0.0)
        .ok_or_else(|| ApiError::bad_request("Distance must be a non-negative number of miles"))?;

    let origin = state.geocoder.geocode(&zipcode).await?;
    let [longitude, latitude] = origin.coordinates;
    let radius = distance / EARTH_RADIUS_MILES;
    tracing::debug!(%zipcode, distance, longitude, latitude, radius, "radius search");

    let plan = translate(&raw, &state.config.filter)?
        .with_condition(Condition::within("location", longitude, latitude, radius));
    let (docs, links) = fetch_page(&state.bootcamps(), &plan).await?;
    Ok(ApiResponse::list(docs, Some(links)))
}
