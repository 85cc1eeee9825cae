//! Generic document persistence.
//!
//! Handlers never talk to a database directly; they go through
//! [`DocumentStore`], which stores JSON documents keyed by their `id` field in
//! named collections. Two backends exist: [`MemoryStore`] and [`PgStore`].

pub mod matcher;
pub mod memory;
pub mod postgres;
pub mod repository;

use async_trait::async_trait;
use std::sync::Arc;
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::config::DatabaseConfig;
use crate::filter::{Condition, SortKey};

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use repository::{Model, Repository};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Duplicate value \"{value}\" in {collection}")]
    DuplicateKey { collection: String, value: String },

    #[error("Document is missing a valid id")]
    MissingId,

    #[error("Document decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Fields that must be unique per collection. Compound entries are unique
/// as a tuple.
pub const UNIQUE_INDEXES: &[(&str, &[&str])] = &[
    ("bootcamps", &["name"]),
    ("users", &["email"]),
    ("reviews", &["bootcamp", "user"]),
];

/// Read parameters for [`DocumentStore::find`].
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub conditions: Vec<Condition>,
    pub sort: Vec<SortKey>,
    pub select: Option<Vec<String>>,
    pub skip: u64,
    pub limit: Option<u64>,
}

impl Query {
    pub fn filter(conditions: Vec<Condition>) -> Self {
        Self { conditions, ..Default::default() }
    }
}

impl From<&crate::filter::QueryPlan> for Query {
    fn from(plan: &crate::filter::QueryPlan) -> Self {
        Self {
            conditions: plan.conditions.clone(),
            sort: plan.sort.clone(),
            select: plan.select.clone(),
            skip: plan.skip(),
            limit: Some(plan.limit),
        }
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Stores a new document. The document must carry an `id`.
    async fn insert(&self, collection: &str, doc: Value) -> Result<Value, StoreError>;

    async fn find(&self, collection: &str, query: &Query) -> Result<Vec<Value>, StoreError>;

    async fn find_by_id(&self, collection: &str, id: Uuid) -> Result<Option<Value>, StoreError>;

    async fn count(&self, collection: &str, conditions: &[Condition]) -> Result<u64, StoreError>;

    /// Overwrites a whole document. `None` when no document has that id.
    async fn replace(&self, collection: &str, id: Uuid, doc: Value) -> Result<Option<Value>, StoreError>;

    /// Merges top-level fields into a stored document in one write; a `null`
    /// value removes the field. Fields not named keep their stored values.
    async fn patch(&self, collection: &str, id: Uuid, fields: Map<String, Value>) -> Result<Option<Value>, StoreError>;

    async fn delete(&self, collection: &str, id: Uuid) -> Result<bool, StoreError>;

    async fn delete_many(&self, collection: &str, conditions: &[Condition]) -> Result<u64, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}

/// Postgres when a URL is configured (migrated on open), memory otherwise.
pub async fn open(config: &DatabaseConfig) -> Result<Arc<dyn DocumentStore>, StoreError> {
    match config.url {
        Some(_) => {
            let store = PgStore::connect(config).await?;
            store.migrate().await?;
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using the in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

pub fn document_id(doc: &Value) -> Result<Uuid, StoreError> {
    doc.get("id")
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or(StoreError::MissingId)
}

pub fn unique_fields(collection: &str) -> &'static [&'static str] {
    UNIQUE_INDEXES
        .iter()
        .find(|(name, _)| *name == collection)
        .map(|(_, fields)| *fields)
        .unwrap_or(&[])
}

/// Text used in duplicate-key messages, e.g. `Devworks Bootcamp`.
pub fn unique_value(collection: &str, doc: &Value) -> String {
    unique_fields(collection)
        .iter()
        .map(|field| match matcher::lookup(doc, field) {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}
