//! In-process document store.
//!
//! One [`Collection`] per document kind, keyed by match id. All mutations
//! go through [`Collection::mutate`], which gives the caller exclusive
//! access to one document slot for the duration of a closure, so a
//! read-modify-write (including the auto-stop side effect on clock reads)
//! is a single atomic step.

use std::collections::HashMap;
use std::sync::Mutex;

/// Errors surfaced by the document store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store could not serve the request right now.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl crate::retry::Transient for StoreError {
    fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

/// A keyed collection of documents of one kind.
pub struct Collection<T> {
    documents: Mutex<HashMap<String, T>>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Collection<T> {
    pub fn new() -> Self {
        Self {
            documents: Mutex::new(HashMap::new()),
        }
    }

    /// Read-modify-write one document slot under the collection lock.
    ///
    /// The closure sees `None` when the document does not exist; leaving
    /// `Some` behind inserts or replaces it, leaving `None` deletes it.
    pub fn mutate<R>(
        &self,
        id: &str,
        f: impl FnOnce(&mut Option<T>) -> R,
    ) -> Result<R, StoreError> {
        let mut documents = self
            .documents
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        let mut slot = documents.remove(id);
        let out = f(&mut slot);
        if let Some(document) = slot {
            documents.insert(id.to_string(), document);
        }
        Ok(out)
    }

    /// Delete a document. Returns whether it existed.
    pub fn remove(&self, id: &str) -> Result<bool, StoreError> {
        let mut documents = self
            .documents
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(documents.remove(id).is_some())
    }
}

impl<T: Clone> Collection<T> {
    /// Read a snapshot of one document.
    pub fn get(&self, id: &str) -> Result<Option<T>, StoreError> {
        let documents = self
            .documents
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(documents.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mutate_inserts_updates_and_deletes() {
        let collection: Collection<u32> = Collection::new();
        assert_eq!(collection.get("m1").unwrap(), None);

        let created = collection
            .mutate("m1", |slot| {
                let value = slot.get_or_insert(0);
                *value += 1;
                *value
            })
            .unwrap();
        assert_eq!(created, 1);
        assert_eq!(collection.get("m1").unwrap(), Some(1));

        collection
            .mutate("m1", |slot| {
                if let Some(value) = slot.as_mut() {
                    *value += 41;
                }
            })
            .unwrap();
        assert_eq!(collection.get("m1").unwrap(), Some(42));

        collection.mutate("m1", |slot| *slot = None).unwrap();
        assert_eq!(collection.get("m1").unwrap(), None);
    }

    #[test]
    fn remove_reports_existence() {
        let collection: Collection<u32> = Collection::new();
        collection.mutate("m1", |slot| *slot = Some(7)).unwrap();
        assert!(collection.remove("m1").unwrap());
        assert!(!collection.remove("m1").unwrap());
    }
}
