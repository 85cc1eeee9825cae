// handlers/mod.rs - Route handlers grouped by resource
//
// auth       /api/v1/auth/*            public sign-in plus token-protected account routes
// bootcamps  /api/v1/bootcamps/*       public reads, publisher/admin writes
// courses    /api/v1/courses/*         also nested under /bootcamps/:id/courses
// reviews    /api/v1/reviews/*         also nested under /bootcamps/:id/reviews
// users      /api/v1/users/*           admin only
//
// Authentication and role gates are route layers (see router.rs); handlers
// receive the identity as an `Extension<CurrentUser>` and apply ownership rules
// themselves through `crate::policy`.
pub mod auth;
pub mod bootcamps;
pub mod courses;
pub mod reviews;
pub mod users;

use std::collections::{BTreeSet, HashMap};

use serde_json::Value;

use crate::error::ApiError;
use crate::extract::parse_id;
use crate::filter::{Condition, FilterOp, QueryPlan};
use crate::models::Bootcamp;
use crate::pagination::{paginate, PageLinks};
use crate::state::AppState;
use crate::store::{Model, Query, Repository};

/// One page of a filtered listing plus its neighbouring-page links. The
/// total used for the links is the filtered count.
pub(crate) async fn fetch_page<T: Model>(
    repo: &Repository<T>,
    plan: &QueryPlan,
) -> Result<(Vec<Value>, PageLinks), ApiError> {
    let total = repo.count(&plan.conditions).await?;
    let window = paginate(total, plan.page, plan.limit);
    let docs = repo.select_raw(&Query::from(plan)).await?;

    tracing::debug!(
        collection = T::COLLECTION,
        total,
        page = window.page,
        limit = window.limit,
        returned = docs.len(),
        "listed documents"
    );
    Ok((docs, window.links))
}

/// Parent lookup for nested routes and child writes.
pub(crate) async fn load_bootcamp(state: &AppState, raw_id: &str) -> Result<Bootcamp, ApiError> {
    let id = parse_id(raw_id)?;
    Ok(state.bootcamps().select_404(id).await?)
}

/// Replaces each document's `bootcamp` id with `{ id, name, description }`.
/// Documents whose projection dropped the field are left alone.
pub(crate) async fn populate_bootcamp(state: &AppState, docs: &mut [Value]) -> Result<(), ApiError> {
    let ids: BTreeSet<String> = docs
        .iter()
        .filter_map(|doc| doc.get("bootcamp")?.as_str().map(str::to_string))
        .collect();
    if ids.is_empty() {
        return Ok(());
    }

    let lookup = Query {
        select: Some(vec!["name".to_string(), "description".to_string()]),
        ..Query::filter(vec![Condition::new(
            "id",
            FilterOp::In,
            Value::Array(ids.into_iter().map(Value::String).collect()),
        )])
    };
    let parents: HashMap<String, Value> = state
        .bootcamps()
        .select_raw(&lookup)
        .await?
        .into_iter()
        .filter_map(|parent| Some((parent.get("id")?.as_str()?.to_string(), parent)))
        .collect();

    for doc in docs.iter_mut() {
        let parent = doc
            .get("bootcamp")
            .and_then(Value::as_str)
            .and_then(|id| parents.get(id))
            .cloned();
        if let Some(parent) = parent {
            doc["bootcamp"] = parent;
        }
    }
    Ok(())
}
