//! In-memory document store (default, thread-safe, async).
//!
//! Uses DashMap for concurrent access with per-key sharding. Create is
//! atomic per id, so two writers racing on one bill number see exactly one
//! success and one conflict.

use super::query::{self, Query};
use super::{DocumentStore, StoredDocument};
use crate::error::{Error, Result};
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Thread-safe async in-memory document store.
///
/// Clones share the same storage. Used as the local store and as the fake
/// behind the test suite.
///
/// # Example
///
/// ```no_run
/// use bill_kit::store::{DocumentStore, InMemoryStore, Query};
/// use serde_json::json;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = InMemoryStore::new();
///
///     store.create_document("bills", "BILL-20250101-AB12", json!({ "status": "paid" })).await?;
///
///     let paid = store
///         .list_documents("bills", &[Query::equal("status", "paid")])
///         .await?;
///     assert_eq!(paid.len(), 1);
///
///     Ok(())
/// }
/// ```
#[derive(Clone, Default)]
pub struct InMemoryStore {
    documents: Arc<DashMap<(String, String), StoredDocument>>,
}

impl InMemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        InMemoryStore {
            documents: Arc::new(DashMap::new()),
        }
    }

    /// Number of documents across all collections.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Number of documents in one collection.
    pub fn count(&self, collection: &str) -> usize {
        self.documents
            .iter()
            .filter(|entry| entry.collection == collection)
            .count()
    }

    fn key(collection: &str, document_id: &str) -> (String, String) {
        (collection.to_string(), document_id.to_string())
    }
}

fn into_object(collection: &str, data: Value) -> Result<Map<String, Value>> {
    match data {
        Value::Object(map) => Ok(map),
        other => Err(Error::Serialization(format!(
            "document data for {} must be a JSON object, got {}",
            collection, other
        ))),
    }
}

impl DocumentStore for InMemoryStore {
    async fn create_document(
        &self,
        collection: &str,
        document_id: &str,
        data: Value,
    ) -> Result<StoredDocument> {
        let data = into_object(collection, data)?;

        match self.documents.entry(Self::key(collection, document_id)) {
            Entry::Occupied(_) => {
                debug!("✗ InMemory CREATE {}/{} -> CONFLICT", collection, document_id);
                Err(Error::Conflict(format!(
                    "document {} already exists in {}",
                    document_id, collection
                )))
            }
            Entry::Vacant(slot) => {
                let now = Utc::now();
                let document = StoredDocument {
                    id: document_id.to_string(),
                    collection: collection.to_string(),
                    created_at: now,
                    updated_at: now,
                    data,
                };
                slot.insert(document.clone());
                debug!("✓ InMemory CREATE {}/{}", collection, document_id);
                Ok(document)
            }
        }
    }

    async fn list_documents(
        &self,
        collection: &str,
        queries: &[Query],
    ) -> Result<Vec<StoredDocument>> {
        let documents: Vec<StoredDocument> = self
            .documents
            .iter()
            .filter(|entry| entry.collection == collection)
            .map(|entry| entry.value().clone())
            .collect();

        let result = query::apply(documents, queries);
        debug!("✓ InMemory LIST {} -> {} documents", collection, result.len());
        Ok(result)
    }

    async fn update_document(
        &self,
        collection: &str,
        document_id: &str,
        partial: Value,
    ) -> Result<StoredDocument> {
        let partial = into_object(collection, partial)?;

        let mut entry = self
            .documents
            .get_mut(&Self::key(collection, document_id))
            .ok_or_else(|| {
                Error::NotFound(format!("document {} in {}", document_id, collection))
            })?;

        entry.data.extend(partial);
        entry.updated_at = Utc::now();
        debug!("✓ InMemory UPDATE {}/{}", collection, document_id);
        Ok(entry.value().clone())
    }

    async fn delete_document(&self, collection: &str, document_id: &str) -> Result<()> {
        match self.documents.remove(&Self::key(collection, document_id)) {
            Some(_) => {
                debug!("✓ InMemory DELETE {}/{}", collection, document_id);
                Ok(())
            }
            None => Err(Error::NotFound(format!(
                "document {} in {}",
                document_id, collection
            ))),
        }
    }

    async fn get_document(
        &self,
        collection: &str,
        document_id: &str,
    ) -> Result<Option<StoredDocument>> {
        Ok(self
            .documents
            .get(&Self::key(collection, document_id))
            .map(|entry| entry.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_inmemory_create_and_list() {
        let store = InMemoryStore::new();

        store
            .create_document("bills", "a", json!({ "status": "paid", "n": 2 }))
            .await
            .expect("Failed to create");
        store
            .create_document("bills", "b", json!({ "status": "pending", "n": 1 }))
            .await
            .expect("Failed to create");
        store
            .create_document("orders", "a", json!({ "status": "paid" }))
            .await
            .expect("Same id in another collection is fine");

        let bills = store
            .list_documents("bills", &[Query::order_asc("n")])
            .await
            .expect("Failed to list");
        let ids: Vec<&str> = bills.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(store.count("bills"), 2);
        assert_eq!(store.len(), 3);
    }

    #[tokio::test]
    async fn test_inmemory_create_conflict() {
        let store = InMemoryStore::new();

        store
            .create_document("bills", "a", json!({ "v": 1 }))
            .await
            .expect("Failed to create");

        let err = store
            .create_document("bills", "a", json!({ "v": 2 }))
            .await
            .expect_err("Duplicate id must conflict");
        assert!(matches!(err, Error::Conflict(_)));

        // Original is untouched
        let doc = store.get_document("bills", "a").await.unwrap().unwrap();
        assert_eq!(doc.data["v"], json!(1));
    }

    #[tokio::test]
    async fn test_inmemory_rejects_non_object() {
        let store = InMemoryStore::new();
        let err = store
            .create_document("bills", "a", json!([1, 2]))
            .await
            .expect_err("Arrays are not documents");
        assert!(matches!(err, Error::Serialization(_)));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_inmemory_update_merges() {
        let store = InMemoryStore::new();
        store
            .create_document("bills", "a", json!({ "status": "paid", "total": "10.00" }))
            .await
            .expect("Failed to create");

        let updated = store
            .update_document("bills", "a", json!({ "status": "cancelled" }))
            .await
            .expect("Failed to update");
        assert_eq!(updated.data["status"], json!("cancelled"));
        assert_eq!(updated.data["total"], json!("10.00"));
        assert!(updated.updated_at >= updated.created_at);

        let missing = store
            .update_document("bills", "zzz", json!({}))
            .await
            .expect_err("Missing id");
        assert!(matches!(missing, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_inmemory_delete() {
        let store = InMemoryStore::new();
        store
            .create_document("bills", "a", json!({}))
            .await
            .expect("Failed to create");

        store
            .delete_document("bills", "a")
            .await
            .expect("Failed to delete");
        assert!(store.is_empty());

        let err = store
            .delete_document("bills", "a")
            .await
            .expect_err("Already deleted");
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_inmemory_concurrent_create_same_id() {
        let store = InMemoryStore::new();
        let mut handles = vec![];

        for i in 0..10 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .create_document("bills", "same", json!({ "writer": i }))
                    .await
                    .is_ok()
            }));
        }

        let mut successes = 0;
        for handle in handles {
            if handle.await.expect("Task failed") {
                successes += 1;
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_inmemory_ids_with_separators_do_not_collide() {
        let store = InMemoryStore::new();

        store
            .create_document("a", "b:c", json!({ "v": 1 }))
            .await
            .expect("Failed to create a / b:c");
        store
            .create_document("a:b", "c", json!({ "v": 2 }))
            .await
            .expect("a:b / c is a different document");

        assert_eq!(store.len(), 2);
        assert_eq!(store.count("a"), 1);
        assert_eq!(store.count("a:b"), 1);

        let first = store.get_document("a", "b:c").await.unwrap().unwrap();
        assert_eq!(first.data["v"], json!(1));

        store
            .delete_document("a:b", "c")
            .await
            .expect("Failed to delete");
        assert!(store.get_document("a", "b:c").await.unwrap().is_some());
    }
}
