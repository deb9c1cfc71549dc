//! Document store implementations.

use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[cfg(feature = "appwrite")]
pub mod appwrite;
#[cfg(feature = "inmemory")]
pub mod inmemory;
pub mod query;

#[cfg(feature = "appwrite")]
pub use appwrite::{AppwriteConfig, AppwriteCredentials, AppwriteStore};
#[cfg(feature = "inmemory")]
pub use inmemory::InMemoryStore;
pub use query::Query;

/// A document as returned by the store.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: String,
    pub collection: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// User fields, without store metadata.
    pub data: Map<String, Value>,
}

/// Trait for hosted document database clients.
///
/// Abstracts the four document operations the billing core relies on,
/// allowing the hosted backend to be swapped for a fake in tests.
/// Implementations: InMemory (default), Appwrite REST.
///
/// **IMPORTANT:** All methods use `&self` to allow concurrent access.
/// Implementations should use interior mutability or external storage.
///
/// **ASYNC:** All methods are async and must be awaited.
#[allow(async_fn_in_trait)]
pub trait DocumentStore: Send + Sync + Clone {
    /// Create a document under an explicit id.
    ///
    /// # Errors
    /// - `Error::Conflict` if `document_id` already exists in the collection
    /// - `Error::AuthExpired` if the session is no longer valid
    /// - `Error::Persistence` for any other store failure
    async fn create_document(
        &self,
        collection: &str,
        document_id: &str,
        data: Value,
    ) -> Result<StoredDocument>;

    /// List documents matching the queries.
    ///
    /// Must support at least `Query::Equal` and `Query::OrderDesc`.
    ///
    /// # Errors
    /// Returns `Err` if the store is unavailable or rejects the query.
    async fn list_documents(
        &self,
        collection: &str,
        queries: &[Query],
    ) -> Result<Vec<StoredDocument>>;

    /// Merge `partial` into an existing document.
    ///
    /// # Errors
    /// Returns `Error::NotFound` for a missing id, or any store failure.
    async fn update_document(
        &self,
        collection: &str,
        document_id: &str,
        partial: Value,
    ) -> Result<StoredDocument>;

    /// Remove a document.
    ///
    /// # Errors
    /// Returns `Error::NotFound` for a missing id, or any store failure.
    async fn delete_document(&self, collection: &str, document_id: &str) -> Result<()>;

    /// Fetch one document by id (optional optimization).
    ///
    /// Default implementation lists with an `$id` equality filter.
    ///
    /// # Errors
    /// Returns `Err` if the store is unavailable.
    async fn get_document(
        &self,
        collection: &str,
        document_id: &str,
    ) -> Result<Option<StoredDocument>> {
        let queries = [Query::equal(query::ID_FIELD, document_id), Query::limit(1)];
        Ok(self
            .list_documents(collection, &queries)
            .await?
            .into_iter()
            .next())
    }

    /// Health check - verify the store is reachable.
    ///
    /// # Errors
    /// Returns `Err` if the store is not accessible
    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }
}
