// src/store/memory.rs
use std::collections::BTreeMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use super::{Collection, Document, DocumentStore, Fields, StoreError};

/// Digits of `u64::MAX`; padding to it keeps string order equal to
/// insertion order for every store-assigned id.
const ID_WIDTH: usize = 20;

/// Whole-database image: every collection plus the id counter.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub next_id: u64,
    pub collections: BTreeMap<String, BTreeMap<String, Fields>>,
}

impl Snapshot {
    pub fn count(&self, collection: Collection) -> usize {
        self.collections.get(collection.as_str()).map_or(0, BTreeMap::len)
    }
}

/// HashMap-style store held in memory. Interior mutability so it can be
/// shared by reference like a remote client handle.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<Snapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self { state: RwLock::new(snapshot) }
    }

    pub fn snapshot(&self) -> Result<Snapshot, StoreError> {
        let state = self.state.read().map_err(|_| StoreError::LockPoisoned("snapshot"))?;
        Ok(state.clone())
    }

    pub fn count(&self, collection: Collection) -> Result<usize, StoreError> {
        let state = self.state.read().map_err(|_| StoreError::LockPoisoned("count"))?;
        Ok(state.count(collection))
    }
}

impl DocumentStore for MemoryStore {
    fn list(&self, collection: Collection) -> Result<Vec<Document>, StoreError> {
        let state = self.state.read().map_err(|_| StoreError::LockPoisoned("list"))?;
        Ok(state
            .collections
            .get(collection.as_str())
            .map(|docs| {
                docs.iter()
                    .map(|(id, fields)| Document { id: id.clone(), fields: fields.clone() })
                    .collect()
            })
            .unwrap_or_default())
    }

    fn add(&self, collection: Collection, fields: Fields) -> Result<String, StoreError> {
        let mut state = self.state.write().map_err(|_| StoreError::LockPoisoned("add"))?;
        state.next_id += 1;
        let id = format!("{}-{:0width$}", collection.id_prefix(), state.next_id, width = ID_WIDTH);
        state
            .collections
            .entry(s!(collection.as_str()))
            .or_default()
            .insert(id.clone(), fields);
        Ok(id)
    }

    fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, StoreError> {
        let state = self.state.read().map_err(|_| StoreError::LockPoisoned("get"))?;
        Ok(state
            .collections
            .get(collection.as_str())
            .and_then(|docs| docs.get(id))
            .map(|fields| Document { id: s!(id), fields: fields.clone() }))
    }

    fn set(&self, collection: Collection, id: &str, fields: Fields) -> Result<(), StoreError> {
        let mut state = self.state.write().map_err(|_| StoreError::LockPoisoned("set"))?;
        state
            .collections
            .entry(s!(collection.as_str()))
            .or_default()
            .insert(s!(id), fields);
        Ok(())
    }

    fn update(&self, collection: Collection, id: &str, fields: Fields) -> Result<(), StoreError> {
        let mut state = self.state.write().map_err(|_| StoreError::LockPoisoned("update"))?;
        let doc = state
            .collections
            .get_mut(collection.as_str())
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::NotFound { collection, id: s!(id) })?;
        for (k, v) in fields {
            doc.insert(k, v);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Filter;

    #[test]
    fn add_assigns_distinct_ids_and_lists_in_id_order() {
        let store = MemoryStore::new();
        let a = store.add(Collection::Judges, fields! { "name" => "Ann" }).unwrap();
        let b = store.add(Collection::Judges, fields! { "name" => "Bob" }).unwrap();
        assert_ne!(a, b);

        let names: Vec<_> = store
            .list(Collection::Judges)
            .unwrap()
            .iter()
            .map(|d| s!(d.str_field("name").unwrap()))
            .collect();
        assert_eq!(names, vec!["Ann", "Bob"]);
        assert!(store.list(Collection::People).unwrap().is_empty());
    }

    #[test]
    fn id_order_follows_insertion_past_a_million() {
        let store = MemoryStore::from_snapshot(Snapshot { next_id: 999_998, ..Default::default() });
        let ids: Vec<String> = ["A", "B", "C"]
            .iter()
            .map(|n| store.add(Collection::People, fields! { "name" => *n }).unwrap())
            .collect();
        let listed: Vec<String> = store.list(Collection::People).unwrap().into_iter().map(|d| d.id).collect();
        assert_eq!(listed, ids);
    }

    #[test]
    fn update_merges_and_requires_existing_doc() {
        let store = MemoryStore::new();
        store.set(Collection::Scores, "k", fields! { "score" => 1, "overall_score" => 2 }).unwrap();
        store.update(Collection::Scores, "k", fields! { "score" => 5 }).unwrap();

        let doc = store.get(Collection::Scores, "k").unwrap().unwrap();
        assert_eq!(doc.i64_field("score"), Some(5));
        assert_eq!(doc.i64_field("overall_score"), Some(2));

        let err = store.update(Collection::Scores, "nope", fields! { "score" => 1 }).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn query_and_update_touches_every_match() {
        let store = MemoryStore::new();
        store.set(Collection::Scores, "a", fields! { "people_id" => "p", "overall_score" => 0 }).unwrap();
        store.set(Collection::Scores, "b", fields! { "people_id" => "p", "overall_score" => 0 }).unwrap();
        store.set(Collection::Scores, "c", fields! { "people_id" => "q", "overall_score" => 0 }).unwrap();

        let n = store
            .query_and_update(
                Collection::Scores,
                &Filter::new().where_eq("people_id", "p"),
                &fields! { "overall_score" => 9 },
            )
            .unwrap();
        assert_eq!(n, 2);
        assert_eq!(store.get(Collection::Scores, "c").unwrap().unwrap().i64_field("overall_score"), Some(0));
        assert_eq!(store.get(Collection::Scores, "a").unwrap().unwrap().i64_field("overall_score"), Some(9));
    }
}
