// src/store/mod.rs
//! Document store seam.
//!
//! The pipeline talks to the database through [`DocumentStore`] only: a set
//! of named collections holding JSON documents addressed by an opaque id.
//! Nothing here is transactional; multi-step read-then-write sequences are
//! not compare-and-swap.

mod json_file;
mod memory;

pub use json_file::JsonFileStore;
pub use memory::{MemoryStore, Snapshot};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub type Fields = serde_json::Map<String, Value>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store lock poisoned during {0}")]
    LockPoisoned(&'static str),

    #[error("document {collection}/{id} not found")]
    NotFound { collection: Collection, id: String },

    #[error("unknown collection '{0}'")]
    UnknownCollection(String),

    #[error("store IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Judges,
    People,
    Styles,
    Competitions,
    Scores,
}

impl Collection {
    pub const ALL: [Collection; 5] = [
        Collection::Judges,
        Collection::People,
        Collection::Styles,
        Collection::Competitions,
        Collection::Scores,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Judges => "judges",
            Collection::People => "people",
            Collection::Styles => "styles",
            Collection::Competitions => "competitions",
            Collection::Scores => "scores",
        }
    }

    /// Prefix for store-assigned ids.
    pub(crate) fn id_prefix(&self) -> &'static str {
        match self {
            Collection::Judges => "judge",
            Collection::People => "person",
            Collection::Styles => "style",
            Collection::Competitions => "comp",
            Collection::Scores => "score",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Collection::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s.trim())
            .ok_or_else(|| StoreError::UnknownCollection(s!(s)))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    pub fn i64_field(&self, name: &str) -> Option<i64> {
        self.fields.get(name).and_then(Value::as_i64)
    }
}

/// Conjunction of field-equality clauses.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<(String, Value)>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn where_eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.clauses.push((s!(field), value.into()));
        self
    }

    pub fn matches(&self, fields: &Fields) -> bool {
        self.clauses
            .iter()
            .all(|(k, v)| fields.get(k).is_some_and(|have| have == v))
    }
}

pub trait DocumentStore {
    /// All documents of a collection, ordered by id.
    fn list(&self, collection: Collection) -> Result<Vec<Document>, StoreError>;

    /// Insert with a store-assigned id; returns the id.
    fn add(&self, collection: Collection, fields: Fields) -> Result<String, StoreError>;

    fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, StoreError>;

    /// Create or replace the document at `id`.
    fn set(&self, collection: Collection, id: &str, fields: Fields) -> Result<(), StoreError>;

    /// Merge `fields` into an existing document. Missing document is
    /// [`StoreError::NotFound`].
    fn update(&self, collection: Collection, id: &str, fields: Fields) -> Result<(), StoreError>;

    fn exists(&self, collection: Collection, id: &str) -> Result<bool, StoreError> {
        Ok(self.get(collection, id)?.is_some())
    }

    fn query(&self, collection: Collection, filter: &Filter) -> Result<Vec<Document>, StoreError> {
        Ok(self
            .list(collection)?
            .into_iter()
            .filter(|d| filter.matches(&d.fields))
            .collect())
    }

    /// Persist buffered writes. Stores that write through need not override.
    fn flush(&self) -> Result<(), StoreError> {
        Ok(())
    }

    /// Apply `fields` to every document matching `filter`; returns how many.
    fn query_and_update(
        &self,
        collection: Collection,
        filter: &Filter,
        fields: &Fields,
    ) -> Result<usize, StoreError> {
        let docs = self.query(collection, filter)?;
        for d in &docs {
            self.update(collection, &d.id, fields.clone())?;
        }
        Ok(docs.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_names_round_trip() {
        for c in Collection::ALL {
            assert_eq!(c.as_str().parse::<Collection>().unwrap(), c);
        }
        assert!(matches!("teams".parse::<Collection>(), Err(StoreError::UnknownCollection(_))));
    }

    #[test]
    fn filter_requires_every_clause() {
        let doc = fields! { "people_id" => "p1", "style_id" => "s1", "score" => 3 };
        assert!(Filter::new().where_eq("people_id", "p1").where_eq("style_id", "s1").matches(&doc));
        assert!(!Filter::new().where_eq("people_id", "p1").where_eq("style_id", "s2").matches(&doc));
        assert!(!Filter::new().where_eq("comp_id", "c1").matches(&doc));
        assert!(Filter::new().matches(&doc));
    }
}
