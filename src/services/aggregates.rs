//! Derived bootcamp fields recomputed after course and review writes.
//!
//! The `schedule_*` functions run in a spawned task after the triggering write
//! has committed; failures are logged and never reach the request. Only the
//! aggregate field itself is written, so concurrent bootcamp edits survive.

use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::filter::Condition;
use crate::models::{Bootcamp, Course, Review};
use crate::store::{DocumentStore, Repository, StoreError};

pub const AVERAGE_COST: &str = "averageCost";
pub const AVERAGE_RATING: &str = "averageRating";

/// Stored bootcamp fields owned by the recompute tasks. Other bootcamp writes
/// leave them alone.
pub const AGGREGATE_FIELDS: [&str; 2] = [AVERAGE_COST, AVERAGE_RATING];

/// Mean tuition rounded up to the next multiple of ten.
pub fn average_cost(tuitions: &[f64]) -> Option<f64> {
    mean(tuitions).map(|avg| (avg / 10.0).ceil() * 10.0)
}

pub fn average_rating(ratings: &[f64]) -> Option<f64> {
    mean(ratings)
}

fn mean(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}

pub async fn recompute_average_cost(store: Arc<dyn DocumentStore>, bootcamp_id: Uuid) -> Result<(), StoreError> {
    let courses: Vec<Course> = Repository::new(store.clone())
        .select_any(vec![Condition::eq("bootcamp", bootcamp_id.to_string())])
        .await?;
    let tuitions: Vec<f64> = courses.iter().map(|c| c.tuition).collect();

    let average = average_cost(&tuitions);
    write_aggregate(store, bootcamp_id, AVERAGE_COST, average).await?;
    tracing::debug!(bootcamp = %bootcamp_id, average_cost = ?average, "recomputed average cost");
    Ok(())
}

pub async fn recompute_average_rating(store: Arc<dyn DocumentStore>, bootcamp_id: Uuid) -> Result<(), StoreError> {
    let reviews: Vec<Review> = Repository::new(store.clone())
        .select_any(vec![Condition::eq("bootcamp", bootcamp_id.to_string())])
        .await?;
    let ratings: Vec<f64> = reviews.iter().map(|r| r.rating as f64).collect();

    let average = average_rating(&ratings);
    write_aggregate(store, bootcamp_id, AVERAGE_RATING, average).await?;
    tracing::debug!(bootcamp = %bootcamp_id, average_rating = ?average, "recomputed average rating");
    Ok(())
}

/// `None` unsets the field.
async fn write_aggregate(
    store: Arc<dyn DocumentStore>,
    bootcamp_id: Uuid,
    field: &str,
    average: Option<f64>,
) -> Result<(), StoreError> {
    let value = average.map(Value::from).unwrap_or(Value::Null);
    let fields = Map::from_iter([(field.to_string(), value)]);
    Repository::<Bootcamp>::new(store).update_fields(bootcamp_id, fields).await
}

pub fn schedule_average_cost(store: Arc<dyn DocumentStore>, bootcamp_id: Uuid) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = recompute_average_cost(store, bootcamp_id).await {
            tracing::warn!(bootcamp = %bootcamp_id, error = %e, "average cost recomputation failed");
        }
    })
}

pub fn schedule_average_rating(store: Arc<dyn DocumentStore>, bootcamp_id: Uuid) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = recompute_average_rating(store, bootcamp_id).await {
            tracing::warn!(bootcamp = %bootcamp_id, error = %e, "average rating recomputation failed");
        }
    })
}
