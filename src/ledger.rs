//! Bill ledger - validates drafts, persists bills and reads history back.

use crate::bill_number::{BillNumber, BillNumberGenerator};
use crate::calculator::BillPreview;
use crate::config::BillingConfig;
use crate::draft::BillDraft;
use crate::error::{Error, Result};
use crate::observability::{BillingMetrics, NoOpMetrics};
use crate::record::{BillRecord, BillStatus, Document};
use crate::store::{DocumentStore, Query, StoredDocument};
use crate::validation;
use chrono::{DateTime, Utc};
use futures::stream::{self, Stream, StreamExt};
use serde::Serialize;
use std::future::Future;
use std::time::Instant;

/// Field bills are ordered by.
const DATE_FIELD: &str = "date";

/// Result of a listing that never fails outright.
///
/// When the store cannot be read, `records` is empty and `error` says why.
#[derive(Debug, Default)]
pub struct BillHistory {
    pub records: Vec<BillRecord>,
    pub error: Option<Error>,
}

impl BillHistory {
    pub fn is_degraded(&self) -> bool {
        self.error.is_some()
    }
}

/// Bill counts per status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    pub pending: usize,
    pub paid: usize,
    pub cancelled: usize,
}

impl StatusSummary {
    pub fn total(&self) -> usize {
        self.pending + self.paid + self.cancelled
    }

    fn add(&mut self, status: BillStatus) {
        match status {
            BillStatus::Pending => self.pending += 1,
            BillStatus::Paid => self.paid += 1,
            BillStatus::Cancelled => self.cancelled += 1,
        }
    }
}

/// Core bill lifecycle manager.
///
/// Owns the construction of [`BillRecord`]s: every record it returns has
/// been written to the store under its bill number.
///
/// # Example
///
/// ```ignore
/// use bill_kit::{BillLedger, BillDraft, store::InMemoryStore};
///
/// let ledger = BillLedger::new(InMemoryStore::new());
/// let record = ledger.submit(&draft).await?;
/// let history = ledger.try_list_recent(Some(20)).await?;
/// ```
pub struct BillLedger<S: DocumentStore> {
    store: S,
    config: BillingConfig,
    generator: BillNumberGenerator,
    metrics: Box<dyn BillingMetrics>,
    clock: fn() -> DateTime<Utc>,
}

impl<S: DocumentStore> BillLedger<S> {
    /// Create a ledger with default configuration.
    pub fn new(store: S) -> Self {
        Self::with_config(store, BillingConfig::default())
    }

    /// Create a ledger with the given configuration.
    pub fn with_config(store: S, config: BillingConfig) -> Self {
        BillLedger {
            generator: BillNumberGenerator::new().with_suffix_len(config.suffix_len),
            store,
            config,
            metrics: Box::new(NoOpMetrics),
            clock: Utc::now,
        }
    }

    /// Set custom metrics handler.
    pub fn with_metrics(mut self, metrics: Box<dyn BillingMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Set the time source used for bill dates and numbers.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &BillingConfig {
        &self.config
    }

    /// Get store reference (for advanced use).
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Live figures for a draft under the configured tax policy.
    pub fn preview(&self, draft: &BillDraft) -> BillPreview {
        BillPreview::compute(draft, &self.config.tax_policy)
    }

    /// Validate a draft, collecting every failed rule.
    ///
    /// # Errors
    /// Returns `Error::Validation` with all failed fields.
    pub fn validate(&self, draft: &BillDraft) -> Result<()> {
        validation::validate(draft).map_err(Error::Validation)
    }

    /// Validate, number, assemble and store a bill.
    ///
    /// A bill-number conflict mints a fresh number and tries again, up to
    /// `config.conflict_retries` extra attempts. Nothing else is retried.
    /// Once the store accepts the write, `submit` succeeds with the record that
    /// was written, even if the store's echo of it cannot be decoded.
    ///
    /// # Errors
    ///
    /// Returns `Err` in these cases:
    /// - `Error::Validation`: Draft is incomplete; the store is never called
    /// - `Error::Conflict`: Every attempted bill number already existed
    /// - `Error::AuthExpired`: Store session expired
    /// - `Error::Persistence`: Store failure or request timeout
    /// - `Error::Serialization`: Record could not be encoded; nothing was written
    pub async fn submit(&self, draft: &BillDraft) -> Result<BillRecord> {
        let timer = Instant::now();

        // Step 1: Validate locally
        if let Err(e) = self.validate(draft) {
            debug!("✗ Bill draft rejected: {}", e);
            return Err(e);
        }

        // Step 2: Number, assemble and store, retrying on collisions only
        let now = (self.clock)();
        let max_attempts = self.config.conflict_retries.saturating_add(1);
        let mut attempts = 0;
        let mut previous: Option<BillNumber> = None;

        loop {
            attempts += 1;

            let bill_number = self.next_number(now, previous.as_ref());
            let record =
                BillRecord::assemble(draft, bill_number.clone(), now, &self.config.tax_policy);

            debug!(
                "» Submitting bill {} (attempt {}/{})",
                bill_number, attempts, max_attempts
            );

            match self.persist(&record).await {
                Ok(stored) => {
                    self.metrics
                        .record_submit(stored.bill_number.as_str(), attempts, timer.elapsed());
                    info!(
                        "✓ Bill {} stored (total {}) in {:?}",
                        stored.bill_number,
                        stored.total,
                        timer.elapsed()
                    );
                    return Ok(stored);
                }
                Err(Error::Conflict(msg)) if attempts < max_attempts => {
                    self.metrics.record_conflict(bill_number.as_str());
                    warn!(
                        "Bill number {} collided ({}), retrying with a new number",
                        bill_number, msg
                    );
                    previous = Some(bill_number);
                }
                Err(e) => {
                    self.metrics.record_error("submit", &e.to_string());
                    return Err(e);
                }
            }
        }
    }

    /// Bills newest first, optionally limited.
    ///
    /// Each call queries the store again. A just-submitted bill may not be
    /// visible yet on eventually consistent stores.
    ///
    /// # Errors
    /// Returns `Err` if the store cannot be read.
    pub async fn try_list_recent(&self, limit: Option<usize>) -> Result<Vec<BillRecord>> {
        let mut queries = vec![Query::order_desc(DATE_FIELD)];
        queries.extend(limit.map(Query::limit));
        self.list(&queries).await
    }

    /// Like [`try_list_recent`](Self::try_list_recent), but a store failure
    /// degrades to an empty history carrying the error.
    pub async fn list_recent(&self, limit: Option<usize>) -> BillHistory {
        match self.try_list_recent(limit).await {
            Ok(records) => BillHistory {
                records,
                error: None,
            },
            Err(e) => {
                warn!("Bill history unavailable: {}", e);
                BillHistory {
                    records: Vec::new(),
                    error: Some(e),
                }
            }
        }
    }

    /// Lazy stream of bills, newest first.
    ///
    /// Nothing is fetched until the stream is polled. Calling this again
    /// gives a fresh stream that re-queries the store.
    pub fn stream_recent(
        &self,
        limit: Option<usize>,
    ) -> impl Stream<Item = Result<BillRecord>> + '_ {
        stream::once(self.try_list_recent(limit)).flat_map(|result| {
            let items: Vec<Result<BillRecord>> = match result {
                Ok(records) => records.into_iter().map(Ok).collect(),
                Err(e) => vec![Err(e)],
            };
            stream::iter(items)
        })
    }

    /// Bills in one status, newest first.
    ///
    /// # Errors
    /// Returns `Err` if the store cannot be read.
    pub async fn list_by_status(
        &self,
        status: BillStatus,
        limit: Option<usize>,
    ) -> Result<Vec<BillRecord>> {
        let mut queries = vec![
            Query::equal("status", status.as_str()),
            Query::order_desc(DATE_FIELD),
        ];
        queries.extend(limit.map(Query::limit));
        self.list(&queries).await
    }

    /// Count bills per status.
    ///
    /// # Errors
    /// Returns `Err` if the store cannot be read.
    pub async fn status_summary(&self) -> Result<StatusSummary> {
        let mut summary = StatusSummary::default();
        for record in self.list(&[]).await? {
            summary.add(record.status);
        }
        Ok(summary)
    }

    /// Look up a single bill.
    ///
    /// # Errors
    /// Returns `Err` if the store cannot be read or the document is not a bill.
    pub async fn find(&self, bill_number: &BillNumber) -> Result<Option<BillRecord>> {
        let document = self
            .with_timeout(
                self.store
                    .get_document(&self.config.collection, bill_number.as_str()),
            )
            .await?;
        document.as_ref().map(BillRecord::from_document).transpose()
    }

    fn next_number(&self, now: DateTime<Utc>, previous: Option<&BillNumber>) -> BillNumber {
        loop {
            let candidate = self.generator.generate(now);
            if previous != Some(&candidate) {
                return candidate;
            }
        }
    }

    async fn persist(&self, record: &BillRecord) -> Result<BillRecord> {
        let data = record.to_document()?;
        let stored = self
            .with_timeout(self.store.create_document(
                &self.config.collection,
                &record.document_id(),
                data,
            ))
            .await?;

        // Write accepted: no failure is reported past this point.
        match BillRecord::from_document(&stored) {
            Ok(echoed) if echoed == *record => Ok(echoed),
            Ok(_) => {
                warn!(
                    "Store echoed bill {} with different fields, keeping the submitted record",
                    record.bill_number
                );
                Ok(record.clone())
            }
            Err(e) => {
                warn!(
                    "Stored bill {} could not be read back ({}), keeping the submitted record",
                    record.bill_number, e
                );
                Ok(record.clone())
            }
        }
    }

    async fn list(&self, queries: &[Query]) -> Result<Vec<BillRecord>> {
        let timer = Instant::now();

        let documents = match self
            .with_timeout(self.store.list_documents(&self.config.collection, queries))
            .await
        {
            Ok(documents) => documents,
            Err(e) => {
                self.metrics.record_error("list", &e.to_string());
                return Err(e);
            }
        };

        let records: Vec<BillRecord> = documents.iter().filter_map(decode_or_skip).collect();
        self.metrics
            .record_list(&self.config.collection, records.len(), timer.elapsed());
        Ok(records)
    }

    async fn with_timeout<T, F>(&self, operation: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::time::timeout(self.config.request_timeout, operation).await?
    }
}

fn decode_or_skip(document: &StoredDocument) -> Option<BillRecord> {
    match BillRecord::from_document(document) {
        Ok(record) => Some(record),
        Err(e) => {
            warn!("Skipping unreadable bill document {}: {}", document.id, e);
            None
        }
    }
}
