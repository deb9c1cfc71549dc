//! High-level billing service for apps.
//!
//! Provides a convenient wrapper around BillLedger with Arc for easy sharing.

use crate::bill_number::BillNumber;
use crate::calculator::BillPreview;
use crate::config::BillingConfig;
use crate::draft::BillDraft;
use crate::error::Result;
use crate::ledger::{BillHistory, BillLedger, StatusSummary};
use crate::observability::BillingMetrics;
use crate::record::{BillRecord, BillStatus};
use crate::session::FormSession;
use crate::store::DocumentStore;
use futures::Stream;
use std::sync::Arc;

/// High-level billing service.
///
/// Wraps `BillLedger` in `Arc` so screens, tasks and handlers can share one
/// ledger without an external `Arc<Mutex<>>`. Stores use interior
/// mutability and the ledger only takes `&self`.
///
/// # Example
///
/// ```ignore
/// use bill_kit::{BillingService, store::InMemoryStore};
///
/// let billing = BillingService::new(InMemoryStore::new());
///
/// let record = billing.submit(&draft).await?;
/// let history = billing.list_recent(Some(20)).await;
/// ```
#[derive(Clone)]
pub struct BillingService<S: DocumentStore> {
    ledger: Arc<BillLedger<S>>,
}

impl<S: DocumentStore> BillingService<S> {
    /// Create a new billing service with default configuration.
    pub fn new(store: S) -> Self {
        BillingService {
            ledger: Arc::new(BillLedger::new(store)),
        }
    }

    /// Create a new billing service with custom configuration.
    pub fn with_config(store: S, config: BillingConfig) -> Self {
        BillingService {
            ledger: Arc::new(BillLedger::with_config(store, config)),
        }
    }

    /// Create a new billing service with custom configuration and metrics.
    pub fn with_metrics(
        store: S,
        config: BillingConfig,
        metrics: Box<dyn BillingMetrics>,
    ) -> Self {
        BillingService {
            ledger: Arc::new(BillLedger::with_config(store, config).with_metrics(metrics)),
        }
    }

    /// Wrap an already configured ledger.
    pub fn from_ledger(ledger: BillLedger<S>) -> Self {
        BillingService {
            ledger: Arc::new(ledger),
        }
    }

    /// Live figures for a draft.
    pub fn preview(&self, draft: &BillDraft) -> BillPreview {
        self.ledger.preview(draft)
    }

    /// Validate and store a bill.
    ///
    /// # Errors
    /// See [`BillLedger::submit`].
    pub async fn submit(&self, draft: &BillDraft) -> Result<BillRecord> {
        self.ledger.submit(draft).await
    }

    /// Bills newest first; a store failure degrades to an empty history.
    pub async fn list_recent(&self, limit: Option<usize>) -> BillHistory {
        self.ledger.list_recent(limit).await
    }

    /// Bills newest first.
    ///
    /// # Errors
    /// Returns `Err` if the store cannot be read.
    pub async fn try_list_recent(&self, limit: Option<usize>) -> Result<Vec<BillRecord>> {
        self.ledger.try_list_recent(limit).await
    }

    /// Lazy stream of bills, newest first.
    pub fn stream_recent(
        &self,
        limit: Option<usize>,
    ) -> impl Stream<Item = Result<BillRecord>> + '_ {
        self.ledger.stream_recent(limit)
    }

    /// # Errors
    /// Returns `Err` if the store cannot be read.
    pub async fn list_by_status(
        &self,
        status: BillStatus,
        limit: Option<usize>,
    ) -> Result<Vec<BillRecord>> {
        self.ledger.list_by_status(status, limit).await
    }

    /// # Errors
    /// Returns `Err` if the store cannot be read.
    pub async fn status_summary(&self) -> Result<StatusSummary> {
        self.ledger.status_summary().await
    }

    /// # Errors
    /// Returns `Err` if the store cannot be read.
    pub async fn find(&self, bill_number: &BillNumber) -> Result<Option<BillRecord>> {
        self.ledger.find(bill_number).await
    }

    /// Check the store is reachable.
    ///
    /// # Errors
    /// Returns `Err` if the store is not accessible.
    pub async fn health_check(&self) -> Result<bool> {
        self.ledger.store().health_check().await
    }

    /// Start an empty bill form backed by this service.
    pub fn session(&self) -> FormSession<S> {
        FormSession::new(self.clone())
    }

    /// Get a reference to the underlying ledger.
    pub fn ledger(&self) -> &BillLedger<S> {
        &self.ledger
    }
}

#[cfg(all(test, feature = "inmemory"))]
mod tests {
    use super::*;
    use crate::calculator::TaxPolicy;
    use crate::draft::PaymentMethod;
    use crate::store::InMemoryStore;

    fn upi_draft() -> BillDraft {
        BillDraft {
            service_type: "Electrical".into(),
            service_provider_name: "Meena".into(),
            customer_name: "Kiran".into(),
            address: "4 Lake View".into(),
            contact_number: "9123456780".into(),
            service_charge: "99.5".into(),
            payment_method: PaymentMethod::Upi,
            ..BillDraft::default()
        }
    }

    #[tokio::test]
    async fn test_service_is_shareable() {
        let store = InMemoryStore::new();
        let billing = BillingService::new(store.clone());
        let clone = billing.clone();

        let record = clone.submit(&upi_draft()).await.expect("Failed to submit");
        assert_eq!(record.total.to_string(), "99.50");
        assert_eq!(record.cash_given, None);
        assert_eq!(record.change_due, None);

        let history = billing.list_recent(None).await;
        assert!(!history.is_degraded());
        assert_eq!(history.records, vec![record]);
    }

    #[tokio::test]
    async fn test_service_preview_uses_config() {
        let billing = BillingService::with_config(
            InMemoryStore::new(),
            BillingConfig::default().with_tax_policy(TaxPolicy::gst_25()),
        );

        assert!(billing.health_check().await.expect("In-memory store is always up"));

        let preview = billing.preview(&upi_draft());
        assert_eq!(preview.tax.to_string(), "24.88");
        assert_eq!(preview.total.to_string(), "124.38");
        assert_eq!(preview.change_due, None);
    }
}
