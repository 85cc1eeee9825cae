use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::postgres::{PgArguments, PgPoolOptions};
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use super::matcher::project;
use super::{document_id, unique_value, DocumentStore, Query, StoreError, UNIQUE_INDEXES};
use crate::config::DatabaseConfig;
use crate::filter::{Condition, FilterOp, SortKey};

const COLLECTIONS: [&str; 4] = ["users", "bootcamps", "courses", "reviews"];

/// Postgres SQLSTATE for unique_violation.
const UNIQUE_VIOLATION: &str = "23505";

/// One JSONB table per collection: `(id uuid, doc jsonb, created_at timestamptz)`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

#[derive(Debug, Clone)]
enum SqlParam {
    Json(Value),
    Text(String),
    TextArray(Vec<String>),
    Float(f64),
}

/// Accumulates `$n` placeholders and their values.
#[derive(Default)]
struct SqlWhere {
    clauses: Vec<String>,
    params: Vec<SqlParam>,
}

impl SqlWhere {
    fn param(&mut self, value: SqlParam) -> String {
        self.params.push(value);
        format!("${}", self.params.len())
    }

    fn path(&mut self, field: &str) -> String {
        let segments = field.split('.').map(str::to_string).collect();
        format!("{}::text[]", self.param(SqlParam::TextArray(segments)))
    }

    fn push(&mut self, condition: &Condition) -> Result<(), StoreError> {
        let clause = match condition.op {
            FilterOp::Eq => {
                let json_path = self.path(&condition.field);
                let json = self.param(SqlParam::Json(condition.value.clone()));
                let text_path = self.path(&condition.field);
                let text = self.param(SqlParam::Text(as_text(&condition.value)));
                format!("(doc #> {json_path} @> {json}::jsonb OR doc #>> {text_path} = {text})")
            }
            FilterOp::Gt | FilterOp::Gte | FilterOp::Lt | FilterOp::Lte => {
                let path = self.path(&condition.field);
                let value = self.param(SqlParam::Json(condition.value.clone()));
                format!("doc #> {path} {} {value}::jsonb", condition.op.to_sql())
            }
            FilterOp::In => {
                let candidates = condition
                    .value
                    .as_array()
                    .ok_or_else(|| StoreError::QueryError(format!("{} [in] needs a list", condition.field)))?;
                let json_path = self.path(&condition.field);
                let json = self.param(SqlParam::Json(condition.value.clone()));
                let text_path = self.path(&condition.field);
                let texts = self.param(SqlParam::TextArray(candidates.iter().map(as_text).collect()));
                format!("({json}::jsonb @> doc #> {json_path} OR doc #> {text_path} ?| {texts}::text[])")
            }
            FilterOp::Within => {
                let (lng, lat, radius) = condition
                    .circle()
                    .ok_or_else(|| StoreError::QueryError(format!("{} has no search circle", condition.field)))?;
                let lng_path = self.path(&format!("{}.coordinates.0", condition.field));
                let lat_path = self.path(&format!("{}.coordinates.1", condition.field));
                let (lng, lat, radius) = (
                    self.param(SqlParam::Float(lng)),
                    self.param(SqlParam::Float(lat)),
                    self.param(SqlParam::Float(radius)),
                );
                let doc_lng = format!("(doc #>> {lng_path})::float8");
                let doc_lat = format!("(doc #>> {lat_path})::float8");
                format!(
                    "2 * asin(least(1.0, sqrt(power(sin(radians({doc_lat} - {lat}::float8) / 2), 2) \
                     + cos(radians({lat}::float8)) * cos(radians({doc_lat})) \
                     * power(sin(radians({doc_lng} - {lng}::float8) / 2), 2)))) <= {radius}::float8"
                )
            }
        };
        self.clauses.push(clause);
        Ok(())
    }

    fn build(conditions: &[Condition]) -> Result<Self, StoreError> {
        let mut out = Self::default();
        for condition in conditions {
            out.push(condition)?;
        }
        Ok(out)
    }

    fn sql(&self) -> String {
        if self.clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.clauses.join(" AND "))
        }
    }

    fn order_by(&mut self, sort: &[SortKey]) -> String {
        let mut parts: Vec<String> = sort
            .iter()
            .map(|key| format!("doc #> {} {}", self.path(&key.field), key.direction.to_sql()))
            .collect();
        parts.push("created_at ASC".to_string());
        format!(" ORDER BY {}", parts.join(", "))
    }
}

fn as_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn bind_all<'q>(
    mut q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    params: &'q [SqlParam],
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    for p in params {
        q = match p {
            SqlParam::Json(v) => q.bind(Json(v)),
            SqlParam::Text(s) => q.bind(s),
            SqlParam::TextArray(items) => q.bind(items),
            SqlParam::Float(f) => q.bind(*f),
        };
    }
    q
}

fn table(collection: &str) -> Result<&'static str, StoreError> {
    COLLECTIONS
        .iter()
        .find(|c| **c == collection)
        .copied()
        .ok_or_else(|| StoreError::QueryError(format!("Unknown collection: {collection}")))
}

impl PgStore {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let url = config
            .url
            .as_deref()
            .ok_or_else(|| StoreError::QueryError("DATABASE_URL is not set".to_string()))?;
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;
        info!(max_connections = config.max_connections, "connected to postgres");
        Ok(Self { pool })
    }

    /// Creates the collection tables and unique indexes when missing.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        for collection in COLLECTIONS {
            let ddl = format!(
                "CREATE TABLE IF NOT EXISTS {collection} (\
                 id UUID PRIMARY KEY, \
                 doc JSONB NOT NULL, \
                 created_at TIMESTAMPTZ NOT NULL DEFAULT now())"
            );
            sqlx::query(&ddl).execute(&self.pool).await?;
        }
        for (collection, fields) in UNIQUE_INDEXES {
            let columns = fields
                .iter()
                .map(|f| format!("(doc ->> '{f}')"))
                .collect::<Vec<_>>()
                .join(", ");
            let ddl = format!(
                "CREATE UNIQUE INDEX IF NOT EXISTS {collection}_{}_key ON {collection} ({columns})",
                fields.join("_")
            );
            sqlx::query(&ddl).execute(&self.pool).await?;
        }
        info!("document tables ready");
        Ok(())
    }

    fn map_write_error(collection: &str, doc: &Value, err: sqlx::Error) -> StoreError {
        if let sqlx::Error::Database(db) = &err {
            if db.code().as_deref() == Some(UNIQUE_VIOLATION) {
                return StoreError::DuplicateKey {
                    collection: collection.to_string(),
                    value: unique_value(collection, doc),
                };
            }
        }
        StoreError::Sqlx(err)
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn insert(&self, collection: &str, doc: Value) -> Result<Value, StoreError> {
        let table = table(collection)?;
        let id = document_id(&doc)?;
        sqlx::query(&format!("INSERT INTO {table} (id, doc) VALUES ($1, $2)"))
            .bind(id)
            .bind(Json(&doc))
            .execute(&self.pool)
            .await
            .map_err(|e| Self::map_write_error(collection, &doc, e))?;
        Ok(doc)
    }

    async fn find(&self, collection: &str, query: &Query) -> Result<Vec<Value>, StoreError> {
        let table = table(collection)?;
        let mut filter = SqlWhere::build(&query.conditions)?;
        let mut sql = format!("SELECT doc FROM {table}{}", filter.sql());
        sql.push_str(&filter.order_by(&query.sort));
        if let Some(limit) = query.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }
        if query.skip > 0 {
            // OFFSET is a bigint.
            sql.push_str(&format!(" OFFSET {}", query.skip.min(i64::MAX as u64)));
        }

        let rows = bind_all(sqlx::query(&sql), &filter.params).fetch_all(&self.pool).await?;
        rows.into_iter()
            .map(|row| -> Result<Value, StoreError> {
                let Json(doc): Json<Value> = row.try_get("doc")?;
                Ok(project(doc, query.select.as_deref()))
            })
            .collect()
    }

    async fn find_by_id(&self, collection: &str, id: Uuid) -> Result<Option<Value>, StoreError> {
        let table = table(collection)?;
        let row = sqlx::query(&format!("SELECT doc FROM {table} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match row {
            Some(row) => {
                let Json(doc): Json<Value> = row.try_get("doc")?;
                Ok(Some(doc))
            }
            None => Ok(None),
        }
    }

    async fn count(&self, collection: &str, conditions: &[Condition]) -> Result<u64, StoreError> {
        let table = table(collection)?;
        let filter = SqlWhere::build(conditions)?;
        let sql = format!("SELECT COUNT(*) AS count FROM {table}{}", filter.sql());
        let row = bind_all(sqlx::query(&sql), &filter.params).fetch_one(&self.pool).await?;
        let count: i64 = row.try_get("count")?;
        Ok(count as u64)
    }

    async fn replace(&self, collection: &str, id: Uuid, doc: Value) -> Result<Option<Value>, StoreError> {
        let table = table(collection)?;
        let result = sqlx::query(&format!("UPDATE {table} SET doc = $2 WHERE id = $1"))
            .bind(id)
            .bind(Json(&doc))
            .execute(&self.pool)
            .await
            .map_err(|e| Self::map_write_error(collection, &doc, e))?;
        Ok((result.rows_affected() > 0).then_some(doc))
    }

    async fn patch(&self, collection: &str, id: Uuid, fields: Map<String, Value>) -> Result<Option<Value>, StoreError> {
        let table = table(collection)?;
        let (removed, set): (Vec<_>, Vec<_>) = fields.into_iter().partition(|(_, value)| value.is_null());
        let set = Value::Object(set.into_iter().collect());
        let removed: Vec<String> = removed.into_iter().map(|(field, _)| field).collect();

        let row = sqlx::query(&format!(
            "UPDATE {table} SET doc = (doc || $2) - $3::text[] WHERE id = $1 RETURNING doc"
        ))
        .bind(id)
        .bind(Json(&set))
        .bind(removed)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Self::map_write_error(collection, &set, e))?;

        match row {
            Some(row) => {
                let Json(doc): Json<Value> = row.try_get("doc")?;
                Ok(Some(doc))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, collection: &str, id: Uuid) -> Result<bool, StoreError> {
        let table = table(collection)?;
        let result = sqlx::query(&format!("DELETE FROM {table} WHERE id = $1"))
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_many(&self, collection: &str, conditions: &[Condition]) -> Result<u64, StoreError> {
        let table = table(collection)?;
        let filter = SqlWhere::build(conditions)?;
        let sql = format!("DELETE FROM {table}{}", filter.sql());
        let result = bind_all(sqlx::query(&sql), &filter.params).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
