// src/directory.rs
use std::collections::HashMap;

use crate::store::{Collection, DocumentStore, StoreError};

/// Reference entities the pipeline resolves names against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Judge,
    Competitor,
    Style,
}

impl EntityKind {
    pub fn collection(self) -> Collection {
        match self {
            EntityKind::Judge => Collection::Judges,
            EntityKind::Competitor => Collection::People,
            EntityKind::Style => Collection::Styles,
        }
    }
}

/// Name -> id maps for judges, people and styles.
///
/// The maps are a snapshot: [`create`](Self::create) writes to the store
/// but does not touch them. Call [`refresh`](Self::refresh) before relying
/// on ids of entities created since the last load.
pub struct ReferenceDirectory<'s> {
    store: &'s dyn DocumentStore,
    judges: HashMap<String, String>,
    people: HashMap<String, String>,
    styles: HashMap<String, String>,
}

impl<'s> ReferenceDirectory<'s> {
    pub fn load(store: &'s dyn DocumentStore) -> Result<Self, StoreError> {
        let mut dir = Self {
            store,
            judges: HashMap::new(),
            people: HashMap::new(),
            styles: HashMap::new(),
        };
        dir.refresh()?;
        Ok(dir)
    }

    /// Re-read all three maps from the store, wholesale.
    pub fn refresh(&mut self) -> Result<(), StoreError> {
        self.judges = self.read_names(EntityKind::Judge)?;
        self.people = self.read_names(EntityKind::Competitor)?;
        self.styles = self.read_names(EntityKind::Style)?;
        logd!(
            "Directory loaded: {} judges, {} people, {} styles",
            self.judges.len(),
            self.people.len(),
            self.styles.len()
        );
        Ok(())
    }

    pub fn lookup(&self, kind: EntityKind, name: &str) -> Option<&str> {
        self.map(kind).get(name).map(String::as_str)
    }

    /// Insert a new entity and return its id. Does not check for an
    /// existing entity of the same name.
    pub fn create(&self, kind: EntityKind, name: &str) -> Result<String, StoreError> {
        let id = self.store.add(kind.collection(), fields! { "name" => name })?;
        logd!("Created {:?} '{name}' as {id}", kind);
        Ok(id)
    }

    pub fn len(&self, kind: EntityKind) -> usize {
        self.map(kind).len()
    }

    pub fn store(&self) -> &'s dyn DocumentStore {
        self.store
    }

    fn map(&self, kind: EntityKind) -> &HashMap<String, String> {
        match kind {
            EntityKind::Judge => &self.judges,
            EntityKind::Competitor => &self.people,
            EntityKind::Style => &self.styles,
        }
    }

    // Later documents win when two share a name.
    fn read_names(&self, kind: EntityKind) -> Result<HashMap<String, String>, StoreError> {
        let mut out = HashMap::new();
        for doc in self.store.list(kind.collection())? {
            match doc.str_field("name") {
                Some(name) => {
                    out.insert(s!(name), doc.id);
                }
                None => logd!("{} document {} has no name; ignored", kind.collection(), doc.id),
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn create_is_invisible_until_refresh() {
        let store = MemoryStore::new();
        let mut dir = ReferenceDirectory::load(&store).unwrap();
        assert_eq!(dir.lookup(EntityKind::Judge, "Jane Doe"), None);

        let id = dir.create(EntityKind::Judge, "Jane Doe").unwrap();
        assert_eq!(dir.lookup(EntityKind::Judge, "Jane Doe"), None);

        dir.refresh().unwrap();
        assert_eq!(dir.lookup(EntityKind::Judge, "Jane Doe"), Some(id.as_str()));
        // kinds are separate namespaces
        assert_eq!(dir.lookup(EntityKind::Competitor, "Jane Doe"), None);
    }

    #[test]
    fn duplicate_names_are_not_checked() {
        let store = MemoryStore::new();
        let dir = ReferenceDirectory::load(&store).unwrap();
        let a = dir.create(EntityKind::Competitor, "Ann Lee").unwrap();
        let b = dir.create(EntityKind::Competitor, "Ann Lee").unwrap();
        assert_ne!(a, b);
        assert_eq!(store.count(Collection::People).unwrap(), 2);

        let dir = ReferenceDirectory::load(&store).unwrap();
        assert_eq!(dir.len(EntityKind::Competitor), 1);
        assert_eq!(dir.lookup(EntityKind::Competitor, "Ann Lee"), Some(b.as_str()));
    }

    #[test]
    fn nameless_documents_are_ignored() {
        let store = MemoryStore::new();
        store.add(Collection::Styles, fields! { "label" => "Waltz" }).unwrap();
        let dir = ReferenceDirectory::load(&store).unwrap();
        assert_eq!(dir.len(EntityKind::Style), 0);
    }
}
