//! Appwrite REST document store.
//!
//! Talks to `/databases/{database}/collections/{collection}/documents` on a
//! hosted Appwrite instance. Status codes map onto the crate's error kinds:
//! 409 is a conflict, 401 an expired session, 404 a missing document;
//! everything else (including timeouts) is a persistence failure.

use super::query::Query;
use super::{DocumentStore, StoredDocument};
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde_json::{json, Map, Value};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Page size used when a listing has no explicit limit. Appwrite returns
/// only 25 documents when no limit is sent.
pub const PAGE_SIZE: usize = 100;

/// How requests authenticate.
#[derive(Clone, Debug)]
pub enum AppwriteCredentials {
    /// Server API key (`X-Appwrite-Key`).
    ApiKey(String),
    /// User session secret (`X-Appwrite-Session`).
    Session(String),
    /// Short-lived user JWT (`X-Appwrite-JWT`).
    Jwt(String),
}

/// Connection settings for an Appwrite project.
#[derive(Clone, Debug)]
pub struct AppwriteConfig {
    /// API root, e.g. `https://fra.cloud.appwrite.io/v1`.
    pub endpoint: String,
    pub project_id: String,
    pub database_id: String,
    pub credentials: Option<AppwriteCredentials>,
    /// Per-request timeout; expiry is reported as `Error::Persistence`.
    pub timeout: Duration,
}

impl AppwriteConfig {
    pub fn new(
        endpoint: impl Into<String>,
        project_id: impl Into<String>,
        database_id: impl Into<String>,
    ) -> Self {
        AppwriteConfig {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            project_id: project_id.into(),
            database_id: database_id.into(),
            credentials: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_credentials(mut self, credentials: AppwriteCredentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Read settings from `APPWRITE_ENDPOINT`, `APPWRITE_PROJECT_ID`,
    /// `APPWRITE_DATABASE_ID`, and optionally `APPWRITE_API_KEY`,
    /// `APPWRITE_SESSION`, `APPWRITE_TIMEOUT_SECS`.
    ///
    /// # Errors
    /// Returns `Error::Config` if a required variable is missing or the
    /// timeout is not a number.
    pub fn from_env() -> Result<Self> {
        let required = |name: &str| {
            std::env::var(name).map_err(|_| Error::Config(format!("{} is not set", name)))
        };

        let mut config = AppwriteConfig::new(
            required("APPWRITE_ENDPOINT")?,
            required("APPWRITE_PROJECT_ID")?,
            required("APPWRITE_DATABASE_ID")?,
        );

        if let Ok(key) = std::env::var("APPWRITE_API_KEY") {
            config = config.with_credentials(AppwriteCredentials::ApiKey(key));
        } else if let Ok(session) = std::env::var("APPWRITE_SESSION") {
            config = config.with_credentials(AppwriteCredentials::Session(session));
        }

        if let Ok(secs) = std::env::var("APPWRITE_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                Error::Config(format!("APPWRITE_TIMEOUT_SECS is not a number: {}", secs))
            })?;
            config = config.with_timeout(Duration::from_secs(secs));
        }

        Ok(config)
    }
}

/// Document store backed by the Appwrite Databases REST API.
#[derive(Clone)]
pub struct AppwriteStore {
    client: Client,
    config: Arc<AppwriteConfig>,
}

impl AppwriteStore {
    /// Build a client for the given project.
    ///
    /// # Errors
    /// Returns `Error::Config` if the endpoint is empty or the HTTP client
    /// cannot be built.
    pub fn new(config: AppwriteConfig) -> Result<Self> {
        if config.endpoint.is_empty() || config.project_id.is_empty() {
            return Err(Error::Config(
                "Appwrite endpoint and project id are required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        info!(
            "✓ Appwrite store ready: {} (project {}, database {})",
            config.endpoint, config.project_id, config.database_id
        );

        Ok(AppwriteStore {
            client,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &AppwriteConfig {
        &self.config
    }

    fn documents_url(&self, collection: &str) -> String {
        format!(
            "{}/databases/{}/collections/{}/documents",
            self.config.endpoint, self.config.database_id, collection
        )
    }

    fn request(&self, method: Method, url: String) -> RequestBuilder {
        let builder = self
            .client
            .request(method, url)
            .header("X-Appwrite-Project", &self.config.project_id)
            .header("X-Appwrite-Response-Format", "1.5.0");

        match &self.config.credentials {
            Some(AppwriteCredentials::ApiKey(key)) => builder.header("X-Appwrite-Key", key),
            Some(AppwriteCredentials::Session(secret)) => {
                builder.header("X-Appwrite-Session", secret)
            }
            Some(AppwriteCredentials::Jwt(token)) => builder.header("X-Appwrite-JWT", token),
            None => builder,
        }
    }
}

/// Encode a directive in Appwrite's JSON query syntax.
pub fn encode_query(query: &Query) -> String {
    let value = match query {
        Query::Equal(field, value) => {
            json!({ "method": "equal", "attribute": field, "values": [value] })
        }
        Query::OrderAsc(field) => json!({ "method": "orderAsc", "attribute": field }),
        Query::OrderDesc(field) => json!({ "method": "orderDesc", "attribute": field }),
        Query::Limit(n) => json!({ "method": "limit", "values": [n] }),
        Query::Offset(n) => json!({ "method": "offset", "values": [n] }),
    };
    value.to_string()
}

/// Split an Appwrite document into metadata and user fields.
///
/// # Errors
/// Returns `Error::Serialization` if the payload is not a document.
pub fn decode_document(value: Value) -> Result<StoredDocument> {
    let Value::Object(fields) = value else {
        return Err(Error::Serialization(
            "Appwrite document is not a JSON object".to_string(),
        ));
    };

    let meta_str = |key: &str| -> Result<String> {
        fields
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| Error::Serialization(format!("Appwrite document missing {}", key)))
    };
    let meta_time = |key: &str| -> Result<DateTime<Utc>> {
        let raw = meta_str(key)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| Error::Serialization(format!("Appwrite {} {:?}: {}", key, raw, e)))
    };

    let id = meta_str("$id")?;
    let collection = meta_str("$collectionId")?;
    let created_at = meta_time("$createdAt")?;
    let updated_at = meta_time("$updatedAt")?;

    let data: Map<String, Value> = fields
        .into_iter()
        .filter(|(key, _)| !key.starts_with('$'))
        .collect();

    Ok(StoredDocument {
        id,
        collection,
        created_at,
        updated_at,
        data,
    })
}

async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.bytes().await.unwrap_or_default();
    Err(error_for_status(status, &body))
}

/// Map a failed response onto the crate's error kinds.
///
/// The message comes from the body's `message` field, falling back to the
/// status reason when the body is not Appwrite's JSON error.
pub fn error_for_status(status: StatusCode, body: &[u8]) -> Error {
    let body: Value = serde_json::from_slice(body).unwrap_or(Value::Null);
    let message = body
        .get("message")
        .and_then(Value::as_str)
        .or(status.canonical_reason())
        .unwrap_or("unknown error")
        .to_string();

    match status {
        StatusCode::CONFLICT => Error::Conflict(message),
        StatusCode::UNAUTHORIZED => Error::AuthExpired(message),
        StatusCode::NOT_FOUND => Error::NotFound(message),
        _ => Error::Persistence(format!("{}: {}", status, message)),
    }
}

/// Queries for one page: the caller's filters and sorts, then
/// `Limit(PAGE_SIZE)` and `Offset(offset)`.
fn page_queries(queries: &[Query], offset: usize) -> Vec<Query> {
    queries
        .iter()
        .filter(|q| !matches!(q, Query::Limit(_) | Query::Offset(_)))
        .cloned()
        .chain([Query::Limit(PAGE_SIZE), Query::Offset(offset)])
        .collect()
}

/// Fetch pages from `start` until one comes back short.
async fn collect_pages<F, Fut>(start: usize, mut fetch: F) -> Result<Vec<StoredDocument>>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<Vec<StoredDocument>>>,
{
    let mut documents = Vec::new();
    let mut offset = start;

    loop {
        let page = fetch(offset).await?;
        let fetched = page.len();
        documents.extend(page);

        if fetched < PAGE_SIZE {
            return Ok(documents);
        }
        offset += fetched;
    }
}

impl AppwriteStore {
    async fn fetch_page(&self, collection: &str, queries: &[Query]) -> Result<Vec<StoredDocument>> {
        let params: Vec<(&str, String)> = queries
            .iter()
            .map(|q| ("queries[]", encode_query(q)))
            .collect();

        let response = self
            .request(Method::GET, self.documents_url(collection))
            .query(&params)
            .send()
            .await?;

        let body: Value = check(response).await?.json().await?;
        match body.get("documents") {
            Some(Value::Array(items)) => items.iter().cloned().map(decode_document).collect(),
            _ => Err(Error::Serialization(
                "Appwrite list response has no documents array".to_string(),
            )),
        }
    }
}

impl DocumentStore for AppwriteStore {
    async fn create_document(
        &self,
        collection: &str,
        document_id: &str,
        data: Value,
    ) -> Result<StoredDocument> {
        let body = json!({ "documentId": document_id, "data": data });
        let response = self
            .request(Method::POST, self.documents_url(collection))
            .json(&body)
            .send()
            .await?;

        let document = decode_document(check(response).await?.json().await?)?;
        debug!("✓ Appwrite CREATE {}/{}", collection, document_id);
        Ok(document)
    }

    async fn list_documents(
        &self,
        collection: &str,
        queries: &[Query],
    ) -> Result<Vec<StoredDocument>> {
        let documents = if queries.iter().any(|q| matches!(q, Query::Limit(_))) {
            self.fetch_page(collection, queries).await?
        } else {
            let start = queries
                .iter()
                .find_map(|q| match q {
                    Query::Offset(n) => Some(*n),
                    _ => None,
                })
                .unwrap_or(0);

            collect_pages(start, |offset| {
                let page = page_queries(queries, offset);
                async move { self.fetch_page(collection, &page).await }
            })
            .await?
        };

        debug!("✓ Appwrite LIST {} -> {} documents", collection, documents.len());
        Ok(documents)
    }

    async fn update_document(
        &self,
        collection: &str,
        document_id: &str,
        partial: Value,
    ) -> Result<StoredDocument> {
        let url = format!("{}/{}", self.documents_url(collection), document_id);
        let response = self
            .request(Method::PATCH, url)
            .json(&json!({ "data": partial }))
            .send()
            .await?;

        let document = decode_document(check(response).await?.json().await?)?;
        debug!("✓ Appwrite UPDATE {}/{}", collection, document_id);
        Ok(document)
    }

    async fn delete_document(&self, collection: &str, document_id: &str) -> Result<()> {
        let url = format!("{}/{}", self.documents_url(collection), document_id);
        let response = self.request(Method::DELETE, url).send().await?;
        check(response).await?;
        debug!("✓ Appwrite DELETE {}/{}", collection, document_id);
        Ok(())
    }

    async fn get_document(
        &self,
        collection: &str,
        document_id: &str,
    ) -> Result<Option<StoredDocument>> {
        let url = format!("{}/{}", self.documents_url(collection), document_id);
        let response = self.request(Method::GET, url).send().await?;
        match check(response).await {
            Ok(response) => decode_document(response.json().await?).map(Some),
            Err(Error::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/databases/{}", self.config.endpoint, self.config.database_id);
        let response = self.request(Method::GET, url).send().await?;
        Ok(check(response).await.is_ok())
    }
}
