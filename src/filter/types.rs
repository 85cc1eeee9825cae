use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Comparison operators accepted in the bracketed key position (`price[gt]=100`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterOp {
    #[serde(rename = "$eq")] Eq,
    #[serde(rename = "$gt")] Gt,
    #[serde(rename = "$gte")] Gte,
    #[serde(rename = "$lt")] Lt,
    #[serde(rename = "$lte")] Lte,
    #[serde(rename = "$in")] In,
    /// Spherical containment, value is `[[lng, lat], radius_in_radians]`.
    #[serde(rename = "$geoWithin")] Within,
}

impl FilterOp {
    /// Whole-token lookup; anything but the five query operators is rejected.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "gt" => Some(FilterOp::Gt),
            "gte" => Some(FilterOp::Gte),
            "lt" => Some(FilterOp::Lt),
            "lte" => Some(FilterOp::Lte),
            "in" => Some(FilterOp::In),
            _ => None,
        }
    }

    pub fn to_sql(&self) -> &'static str {
        match self {
            FilterOp::Eq => "=",
            FilterOp::Gt => ">",
            FilterOp::Gte => ">=",
            FilterOp::Lt => "<",
            FilterOp::Lte => "<=",
            FilterOp::In => "IN",
            FilterOp::Within => "WITHIN",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Dotted document path, e.g. `location.state`.
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

impl Condition {
    pub fn new(field: impl Into<String>, op: FilterOp, value: Value) -> Self {
        Self { field: field.into(), op, value }
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, FilterOp::Eq, value.into())
    }

    pub fn within(field: impl Into<String>, longitude: f64, latitude: f64, radius: f64) -> Self {
        Self::new(field, FilterOp::Within, json!([[longitude, latitude], radius]))
    }

    /// Splits a `$geoWithin` value back into `(lng, lat, radius)`.
    pub fn circle(&self) -> Option<(f64, f64, f64)> {
        let parts = self.value.as_array()?;
        let center = parts.first()?.as_array()?;
        Some((
            center.first()?.as_f64()?,
            center.get(1)?.as_f64()?,
            parts.get(1)?.as_f64()?,
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn to_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn asc(field: impl Into<String>) -> Self {
        Self { field: field.into(), direction: SortDirection::Asc }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self { field: field.into(), direction: SortDirection::Desc }
    }
}

/// Per-request read plan. Built by [`crate::filter::translate`], never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryPlan {
    pub conditions: Vec<Condition>,
    pub sort: Vec<SortKey>,
    /// `None` projects every field.
    pub select: Option<Vec<String>>,
    pub page: u64,
    pub limit: u64,
}
