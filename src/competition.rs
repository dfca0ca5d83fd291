// src/competition.rs
use crate::store::{Collection, DocumentStore, Filter, StoreError};

/// Id of the competition called `name`, adding it if absent.
/// First exact match wins. Not safe against a concurrent creator.
pub fn get_or_create(store: &dyn DocumentStore, name: &str) -> Result<String, StoreError> {
    let found = store.query(Collection::Competitions, &Filter::new().where_eq("name", name))?;
    if let Some(doc) = found.into_iter().next() {
        logf!("Competition '{name}' found with id {}", doc.id);
        return Ok(doc.id);
    }
    let id = store.add(Collection::Competitions, fields! { "name" => name })?;
    logf!("Competition '{name}' added with id {id}");
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn second_call_reuses_the_first_id() {
        let store = MemoryStore::new();
        let a = get_or_create(&store, "Dances with Owls 2025").unwrap();
        let b = get_or_create(&store, "Dances with Owls 2025").unwrap();
        assert_eq!(a, b);
        assert_eq!(store.count(Collection::Competitions).unwrap(), 1);

        let c = get_or_create(&store, "dances with owls 2025").unwrap();
        assert_ne!(a, c, "lookup is exact");
    }
}
