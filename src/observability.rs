//! Observability hooks for billing operations.
//!
//! Implement [`BillingMetrics`] to feed submissions, conflicts and listing
//! latency into your monitoring system:
//!
//! ```no_run
//! use bill_kit::observability::BillingMetrics;
//! use bill_kit::store::InMemoryStore;
//! use bill_kit::{BillingConfig, BillingService};
//! use std::time::Duration;
//!
//! struct PrometheusMetrics;
//!
//! impl BillingMetrics for PrometheusMetrics {
//!     fn record_submit(&self, _bill_number: &str, _attempts: u32, _duration: Duration) {
//!         // counter!("bills_submitted").inc();
//!         // histogram!("bill_submit_latency").record(duration);
//!     }
//!     // ... implement other methods
//! }
//!
//! let service = BillingService::with_metrics(
//!     InMemoryStore::new(),
//!     BillingConfig::default(),
//!     Box::new(PrometheusMetrics),
//! );
//! ```
//!
//! The default hook bodies log through the `log` crate. The service starts
//! with [`NoOpMetrics`], which records nothing.

use std::time::Duration;

/// Trait for billing metrics collection.
pub trait BillingMetrics: Send + Sync {
    /// Record a stored bill.
    fn record_submit(&self, bill_number: &str, attempts: u32, duration: Duration) {
        debug!(
            "Bill SUBMIT: {} after {} attempt(s) took {:?}",
            bill_number, attempts, duration
        );
    }

    /// Record a bill-number collision.
    fn record_conflict(&self, bill_number: &str) {
        debug!("Bill CONFLICT: {}", bill_number);
    }

    /// Record a bill listing.
    fn record_list(&self, collection: &str, count: usize, duration: Duration) {
        debug!("Bill LIST: {} -> {} records took {:?}", collection, count, duration);
    }

    /// Record a failed operation.
    fn record_error(&self, operation: &str, error: &str) {
        warn!("Bill ERROR during {}: {}", operation, error);
    }
}

/// Default metrics implementation (no-op).
#[derive(Clone, Default)]
pub struct NoOpMetrics;

impl BillingMetrics for NoOpMetrics {
    fn record_submit(&self, _bill_number: &str, _attempts: u32, _duration: Duration) {}
    fn record_conflict(&self, _bill_number: &str) {}
    fn record_list(&self, _collection: &str, _count: usize, _duration: Duration) {}
    fn record_error(&self, _operation: &str, _error: &str) {}
}

/// Metrics that only log, using the trait's default hooks.
#[derive(Clone, Default)]
pub struct LogMetrics;

impl BillingMetrics for LogMetrics {}
