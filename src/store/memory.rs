use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::matcher::{compare_for_sort, lookup, matches_all, project};
use super::{document_id, unique_fields, unique_value, DocumentStore, Query, StoreError};
use crate::filter::Condition;

/// Collections held in process, in insertion order. Used by tests and when
/// no database URL is configured.
#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<String, Vec<Value>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_unique(collection: &str, docs: &[Value], candidate: &Value, skip: Option<Uuid>) -> Result<(), StoreError> {
        let fields = unique_fields(collection);
        if fields.is_empty() {
            return Ok(());
        }
        let key: Vec<Option<&Value>> = fields.iter().map(|f| lookup(candidate, f)).collect();
        if key.iter().any(Option::is_none) {
            return Ok(());
        }
        let clash = docs.iter().any(|existing| {
            let same_doc = skip.is_some() && document_id(existing).ok() == skip;
            !same_doc && fields.iter().map(|f| lookup(existing, f)).eq(key.iter().copied())
        });
        if clash {
            return Err(StoreError::DuplicateKey {
                collection: collection.to_string(),
                value: unique_value(collection, candidate),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, collection: &str, doc: Value) -> Result<Value, StoreError> {
        document_id(&doc)?;
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();
        Self::check_unique(collection, docs, &doc, None)?;
        docs.push(doc.clone());
        Ok(doc)
    }

    async fn find(&self, collection: &str, query: &Query) -> Result<Vec<Value>, StoreError> {
        let collections = self.collections.read().await;
        let Some(docs) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut found: Vec<&Value> = docs.iter().filter(|d| matches_all(d, &query.conditions)).collect();
        if !query.sort.is_empty() {
            found.sort_by(|a, b| compare_for_sort(a, b, &query.sort));
        }

        let limit = query.limit.map(|l| l as usize).unwrap_or(usize::MAX);
        Ok(found
            .into_iter()
            .skip(query.skip as usize)
            .take(limit)
            .map(|d| project(d.clone(), query.select.as_deref()))
            .collect())
    }

    async fn find_by_id(&self, collection: &str, id: Uuid) -> Result<Option<Value>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| document_id(d).ok() == Some(id)))
            .cloned())
    }

    async fn count(&self, collection: &str, conditions: &[Condition]) -> Result<u64, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| docs.iter().filter(|d| matches_all(d, conditions)).count() as u64)
            .unwrap_or(0))
    }

    async fn replace(&self, collection: &str, id: Uuid, doc: Value) -> Result<Option<Value>, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(None);
        };
        Self::check_unique(collection, docs, &doc, Some(id))?;
        match docs.iter_mut().find(|d| document_id(d).ok() == Some(id)) {
            Some(slot) => {
                *slot = doc.clone();
                Ok(Some(doc))
            }
            None => Ok(None),
        }
    }

    async fn patch(&self, collection: &str, id: Uuid, fields: Map<String, Value>) -> Result<Option<Value>, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(None);
        };
        let Some(current) = docs.iter().find(|d| document_id(d).ok() == Some(id)) else {
            return Ok(None);
        };

        let mut merged = current.clone();
        if let Value::Object(map) = &mut merged {
            for (field, value) in fields {
                if value.is_null() {
                    map.remove(&field);
                } else {
                    map.insert(field, value);
                }
            }
        }
        Self::check_unique(collection, docs, &merged, Some(id))?;

        match docs.iter_mut().find(|d| document_id(d).ok() == Some(id)) {
            Some(slot) => {
                *slot = merged.clone();
                Ok(Some(merged))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, collection: &str, id: Uuid) -> Result<bool, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(false);
        };
        let before = docs.len();
        docs.retain(|d| document_id(d).ok() != Some(id));
        Ok(docs.len() != before)
    }

    async fn delete_many(&self, collection: &str, conditions: &[Condition]) -> Result<u64, StoreError> {
        let mut collections = self.collections.write().await;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(0);
        };
        let before = docs.len();
        docs.retain(|d| !matches_all(d, conditions));
        Ok((before - docs.len()) as u64)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{FilterOp, SortKey};
    use serde_json::json;

    fn camp(name: &str, cost: u64) -> Value {
        json!({ "id": Uuid::new_v4().to_string(), "name": name, "averageCost": cost })
    }

    #[tokio::test]
    async fn unique_name_is_enforced() {
        let store = MemoryStore::new();
        store.insert("bootcamps", camp("Devworks", 1)).await.unwrap();
        let err = store.insert("bootcamps", camp("Devworks", 2)).await.unwrap_err();
        match err {
            StoreError::DuplicateKey { value, .. } => assert_eq!(value, "Devworks"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn replace_keeps_own_unique_value() {
        let store = MemoryStore::new();
        let doc = store.insert("bootcamps", camp("Devworks", 1)).await.unwrap();
        let id = document_id(&doc).unwrap();
        let mut updated = doc.clone();
        updated["averageCost"] = json!(5);
        let replaced = store.replace("bootcamps", id, updated).await.unwrap();
        assert_eq!(replaced.unwrap()["averageCost"], 5);
    }

    #[tokio::test]
    async fn patch_touches_only_named_fields() {
        let store = MemoryStore::new();
        let doc = store.insert("bootcamps", camp("Devworks", 1)).await.unwrap();
        let id = document_id(&doc).unwrap();

        let mut rename = Map::new();
        rename.insert("name".into(), json!("Renamed"));
        store.patch("bootcamps", id, rename).await.unwrap();

        let mut unset = Map::new();
        unset.insert("averageCost".into(), Value::Null);
        let patched = store.patch("bootcamps", id, unset).await.unwrap().unwrap();
        assert_eq!(patched["name"], "Renamed");
        assert!(patched.get("averageCost").is_none());

        assert!(store.patch("bootcamps", Uuid::new_v4(), Map::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn patch_respects_unique_indexes() {
        let store = MemoryStore::new();
        store.insert("bootcamps", camp("Devworks", 1)).await.unwrap();
        let other = store.insert("bootcamps", camp("Codemasters", 2)).await.unwrap();

        let mut rename = Map::new();
        rename.insert("name".into(), json!("Devworks"));
        let err = store.patch("bootcamps", document_id(&other).unwrap(), rename).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateKey { .. }));
    }

    #[tokio::test]
    async fn compound_unique_index() {
        let store = MemoryStore::new();
        let review = |user: &str| json!({ "id": Uuid::new_v4().to_string(), "bootcamp": "b1", "user": user });
        store.insert("reviews", review("u1")).await.unwrap();
        store.insert("reviews", review("u2")).await.unwrap();
        assert!(store.insert("reviews", review("u1")).await.is_err());
    }

    #[tokio::test]
    async fn find_filters_sorts_and_windows() {
        let store = MemoryStore::new();
        for (name, cost) in [("A", 3), ("B", 1), ("C", 2), ("D", 9)] {
            store.insert("bootcamps", camp(name, cost)).await.unwrap();
        }
        let query = Query {
            conditions: vec![Condition::new("averageCost", FilterOp::Lt, json!(9))],
            sort: vec![SortKey::asc("averageCost")],
            select: Some(vec!["name".to_string()]),
            skip: 1,
            limit: Some(1),
        };
        let docs = store.find("bootcamps", &query).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0]["name"], "C");
        assert!(docs[0].get("averageCost").is_none());
        assert_eq!(store.count("bootcamps", &query.conditions).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn delete_many_by_condition() {
        let store = MemoryStore::new();
        for parent in ["x", "x", "y"] {
            store
                .insert("courses", json!({ "id": Uuid::new_v4().to_string(), "bootcamp": parent }))
                .await
                .unwrap();
        }
        let removed = store.delete_many("courses", &[Condition::eq("bootcamp", "x")]).await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(store.count("courses", &[]).await.unwrap(), 1);
    }
}
