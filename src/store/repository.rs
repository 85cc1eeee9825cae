use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::marker::PhantomData;
use std::sync::Arc;
use uuid::Uuid;

use super::{DocumentStore, Query, StoreError};
use crate::filter::Condition;

/// A typed document kind stored in its own collection.
pub trait Model: Serialize + DeserializeOwned + Send + Sync {
    const COLLECTION: &'static str;
    /// Human name used in "<Label> not found" messages.
    const LABEL: &'static str;

    fn id(&self) -> Uuid;

    /// Strips fields that must never leave the server.
    fn redact(_doc: &mut Value) {}
}

pub struct Repository<T> {
    store: Arc<dyn DocumentStore>,
    _phantom: PhantomData<T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self { store: self.store.clone(), _phantom: PhantomData }
    }
}

impl<T: Model> Repository<T> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store, _phantom: PhantomData }
    }

    /// Raw, possibly projected documents, already redacted.
    pub async fn select_raw(&self, query: &Query) -> Result<Vec<Value>, StoreError> {
        let mut docs = self.store.find(T::COLLECTION, query).await?;
        docs.iter_mut().for_each(T::redact);
        Ok(docs)
    }

    pub async fn select_any(&self, conditions: Vec<Condition>) -> Result<Vec<T>, StoreError> {
        self.store
            .find(T::COLLECTION, &Query::filter(conditions))
            .await?
            .into_iter()
            .map(|doc| serde_json::from_value(doc).map_err(StoreError::from))
            .collect()
    }

    pub async fn select_first(&self, conditions: Vec<Condition>) -> Result<Option<T>, StoreError> {
        let query = Query { limit: Some(1), ..Query::filter(conditions) };
        match self.store.find(T::COLLECTION, &query).await?.into_iter().next() {
            Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
            None => Ok(None),
        }
    }

    pub async fn select_one(&self, id: Uuid) -> Result<Option<T>, StoreError> {
        match self.store.find_by_id(T::COLLECTION, id).await? {
            Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
            None => Ok(None),
        }
    }

    pub async fn select_404(&self, id: Uuid) -> Result<T, StoreError> {
        self.select_one(id).await?.ok_or(StoreError::NotFound(T::LABEL))
    }

    pub async fn count(&self, conditions: &[Condition]) -> Result<u64, StoreError> {
        self.store.count(T::COLLECTION, conditions).await
    }

    pub async fn insert(&self, model: &T) -> Result<(), StoreError> {
        self.store.insert(T::COLLECTION, serde_json::to_value(model)?).await?;
        Ok(())
    }

    pub async fn update(&self, model: &T) -> Result<(), StoreError> {
        let doc = serde_json::to_value(model)?;
        match self.store.replace(T::COLLECTION, model.id(), doc).await? {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(T::LABEL)),
        }
    }

    /// Writes only `fields`; a `null` value removes the field.
    pub async fn update_fields(&self, id: Uuid, fields: Map<String, Value>) -> Result<(), StoreError> {
        match self.store.patch(T::COLLECTION, id, fields).await? {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(T::LABEL)),
        }
    }

    /// Like [`Repository::update`], but the `preserved` fields keep whatever
    /// value is stored at write time.
    pub async fn update_preserving(&self, model: &T, preserved: &[&str]) -> Result<(), StoreError> {
        let mut fields = match serde_json::to_value(model)? {
            Value::Object(map) => map,
            _ => return Err(StoreError::MissingId),
        };
        for field in preserved {
            fields.remove(*field);
        }
        self.update_fields(model.id(), fields).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        self.store.delete(T::COLLECTION, id).await
    }

    pub async fn delete_where(&self, conditions: &[Condition]) -> Result<u64, StoreError> {
        self.store.delete_many(T::COLLECTION, conditions).await
    }

    pub async fn delete_all(&self) -> Result<u64, StoreError> {
        self.store.delete_many(T::COLLECTION, &[]).await
    }
}
