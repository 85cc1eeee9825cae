//! In-process evaluation of conditions, ordering and projection over JSON
//! documents.

use serde_json::{Map, Value};
use std::cmp::Ordering;

use crate::filter::{Condition, FilterOp, SortDirection, SortKey};

/// Mean Earth radius in miles. Radius-search distances divide by this.
pub const EARTH_RADIUS_MILES: f64 = 3963.0;

/// Follows a dotted path through nested objects.
pub fn lookup<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(doc, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

pub fn matches_all(doc: &Value, conditions: &[Condition]) -> bool {
    conditions.iter().all(|c| matches(doc, c))
}

pub fn matches(doc: &Value, condition: &Condition) -> bool {
    let actual = lookup(doc, &condition.field);
    match condition.op {
        FilterOp::Eq => actual.is_some_and(|v| contains_equal(v, &condition.value)),
        FilterOp::In => match (actual, condition.value.as_array()) {
            (Some(v), Some(candidates)) => candidates.iter().any(|c| contains_equal(v, c)),
            _ => false,
        },
        FilterOp::Gt | FilterOp::Gte | FilterOp::Lt | FilterOp::Lte => {
            let Some(actual) = actual else { return false };
            let Some(ordering) = compare_scalars(actual, &condition.value) else {
                return false;
            };
            match condition.op {
                FilterOp::Gt => ordering == Ordering::Greater,
                FilterOp::Gte => ordering != Ordering::Less,
                FilterOp::Lt => ordering == Ordering::Less,
                _ => ordering != Ordering::Greater,
            }
        }
        FilterOp::Within => {
            let (Some(point), Some((lng, lat, radius))) =
                (actual.and_then(coordinates), condition.circle())
            else {
                return false;
            };
            angular_distance(point, (lng, lat)) <= radius
        }
    }
}

/// Array fields match when any element is equal.
fn contains_equal(actual: &Value, expected: &Value) -> bool {
    match actual {
        Value::Array(items) if !expected.is_array() => items.iter().any(|v| loose_eq(v, expected)),
        _ => loose_eq(actual, expected),
    }
}

fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::String(s), Value::Number(_) | Value::Bool(_)) => *s == b.to_string(),
        (Value::Number(_) | Value::Bool(_), Value::String(s)) => a.to_string() == *s,
        _ => a == b,
    }
}

/// Numbers compare numerically and strings lexically; mixed types do not compare.
/// Timestamps are fixed-width UTC strings, so lexical order is chronological.
pub fn compare_scalars(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn type_rank(v: Option<&Value>) -> u8 {
    match v {
        None | Some(Value::Null) => 0,
        Some(Value::Number(_)) => 1,
        Some(Value::String(_)) => 2,
        Some(Value::Object(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Bool(_)) => 5,
    }
}

/// Total order used for sorting; missing values sort first.
pub fn compare_for_sort(a: &Value, b: &Value, keys: &[SortKey]) -> Ordering {
    for key in keys {
        let (x, y) = (lookup(a, &key.field), lookup(b, &key.field));
        let ordering = match (x, y) {
            (Some(x), Some(y)) => compare_scalars(x, y).unwrap_or_else(|| type_rank(Some(x)).cmp(&type_rank(Some(y)))),
            _ => type_rank(x).cmp(&type_rank(y)),
        };
        let ordering = match key.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Keeps only the selected top-level fields plus `id`.
pub fn project(doc: Value, select: Option<&[String]>) -> Value {
    let Some(fields) = select else { return doc };
    let Value::Object(map) = doc else { return doc };

    let mut out = Map::new();
    if let Some(id) = map.get("id") {
        out.insert("id".to_string(), id.clone());
    }
    for field in fields {
        let root = field.split('.').next().unwrap_or(field);
        if let Some(value) = map.get(root) {
            out.insert(root.to_string(), value.clone());
        }
    }
    Value::Object(out)
}

/// GeoJSON points nest their `[lng, lat]` under `coordinates`.
fn coordinates(v: &Value) -> Option<(f64, f64)> {
    let pair = match v {
        Value::Object(map) => map.get("coordinates")?,
        other => other,
    };
    let pair = pair.as_array()?;
    Some((pair.first()?.as_f64()?, pair.get(1)?.as_f64()?))
}

/// Great-circle distance in radians between two `(lng, lat)` points.
pub fn angular_distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    let (lng1, lat1) = (a.0.to_radians(), a.1.to_radians());
    let (lng2, lat2) = (b.0.to_radians(), b.1.to_radians());
    let h = ((lat2 - lat1) / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * ((lng2 - lng1) / 2.0).sin().powi(2);
    2.0 * h.sqrt().min(1.0).asin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bootcamp() -> Value {
        json!({
            "id": "1",
            "name": "Devworks",
            "careers": ["Web Development", "Business"],
            "averageCost": 10000,
            "housing": true,
            "location": { "city": "Boston", "zipcode": "02118", "coordinates": [-71.104028, 42.350846] },
            "createdAt": "2024-03-01T10:00:00.000Z"
        })
    }

    #[test]
    fn nested_lookup() {
        let doc = bootcamp();
        assert_eq!(lookup(&doc, "location.city"), Some(&json!("Boston")));
        assert_eq!(lookup(&doc, "careers.1"), Some(&json!("Business")));
        assert_eq!(lookup(&doc, "location.nope"), None);
    }

    #[test]
    fn equality_reaches_into_arrays() {
        let doc = bootcamp();
        assert!(matches(&doc, &Condition::eq("careers", "Business")));
        assert!(!matches(&doc, &Condition::eq("careers", "UI/UX")));
        assert!(matches(&doc, &Condition::eq("housing", true)));
        assert!(matches(&doc, &Condition::eq("location.zipcode", "02118")));
    }

    #[test]
    fn comparisons() {
        let doc = bootcamp();
        assert!(matches(&doc, &Condition::new("averageCost", FilterOp::Lte, json!(10000))));
        assert!(!matches(&doc, &Condition::new("averageCost", FilterOp::Gt, json!(10000))));
        assert!(matches(&doc, &Condition::new("createdAt", FilterOp::Gte, json!("2024-01-01"))));
        assert!(!matches(&doc, &Condition::new("name", FilterOp::Gt, json!(5))));
    }

    #[test]
    fn in_matches_scalars_and_arrays() {
        let doc = bootcamp();
        assert!(matches(&doc, &Condition::new("careers", FilterOp::In, json!(["UI/UX", "Business"]))));
        assert!(matches(&doc, &Condition::new("averageCost", FilterOp::In, json!([5000, 10000]))));
        assert!(!matches(&doc, &Condition::new("location.city", FilterOp::In, json!(["Lowell"]))));
    }

    #[test]
    fn radius_containment() {
        let doc = bootcamp();
        // Harvard Square, about 1.6 miles away.
        let near = Condition::within("location", -71.1097, 42.3736, 10.0 / EARTH_RADIUS_MILES);
        let far = Condition::within("location", -71.1097, 42.3736, 1.0 / EARTH_RADIUS_MILES);
        assert!(matches(&doc, &near));
        assert!(!matches(&doc, &far));
    }

    #[test]
    fn sort_and_project() {
        let a = json!({ "id": "a", "averageCost": 5000, "name": "B" });
        let b = json!({ "id": "b", "averageCost": 9000, "name": "A" });
        let missing = json!({ "id": "c", "name": "C" });

        let mut docs = vec![a.clone(), b.clone(), missing.clone()];
        docs.sort_by(|x, y| compare_for_sort(x, y, &[SortKey::desc("averageCost")]));
        assert_eq!(docs[0]["id"], "b");
        assert_eq!(docs[2]["id"], "c");

        let projected = project(a, Some(&["name".to_string()]));
        assert_eq!(projected, json!({ "id": "a", "name": "B" }));
    }
}
