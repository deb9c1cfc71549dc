//! # bill-kit
//!
//! Billing core for service-dispatch apps: turn a filled-in service form
//! into a numbered, stored bill and read bill history back.
//!
//! ## Features
//!
//! - **Exact money:** Decimal amounts rounded half away from zero to two places
//! - **Live figures:** Total, tax and change due recomputed from raw form text
//! - **Validation:** Per-field rules checked before anything reaches the store
//! - **Bill numbers:** `BILL-YYYYMMDD-XXXX`, regenerated on collision
//! - **Store agnostic:** In-memory store by default, Appwrite REST behind a feature
//! - **Production Ready:** Built-in logging, metrics hooks, and error handling
//!
//! ## Quick Start
//!
//! Use [`BillingService`] for easy sharing across tasks:
//!
//! ```ignore
//! use bill_kit::{BillingService, BillDraft, PaymentMethod, store::InMemoryStore};
//!
//! // 1. Create the service (Clone is just an Arc increment)
//! let billing = BillingService::new(InMemoryStore::new());
//!
//! // 2. Fill a form
//! let mut form = billing.session();
//! form.set_field("serviceType", "Plumbing")?;
//! form.set_field("serviceProviderName", "Ravi")?;
//! form.set_field("customerName", "Asha")?;
//! form.set_field("address", "12 MG Road")?;
//! form.set_field("contactNumber", "9876543210")?;
//! form.set_field("serviceCharge", "200")?;
//! form.set_field("cashGiven", "250")?;
//! assert_eq!(form.preview().change_due.unwrap().to_string(), "50.00");
//!
//! // 3. Store it
//! let record = form.submit().await?;
//! println!("Stored {}", record.bill_number);
//!
//! // 4. Read history back, newest first
//! let history = billing.list_recent(Some(20)).await;
//! ```
//!
//! ### Lower level
//!
//! Use [`BillLedger`] directly when you need a custom clock or metrics:
//!
//! ```ignore
//! use bill_kit::{BillLedger, store::InMemoryStore};
//! use std::sync::Arc;
//!
//! let ledger = BillLedger::new(InMemoryStore::new()).with_clock(my_clock);
//! let ledger = Arc::new(ledger);
//! ```

#[macro_use]
extern crate log;

pub mod bill_number;
pub mod calculator;
pub mod config;
pub mod draft;
pub mod error;
pub mod ledger;
pub mod money;
pub mod observability;
pub mod record;
pub mod service;
pub mod session;
pub mod store;
pub mod validation;

// Re-exports for convenience
pub use bill_number::{BillNumber, BillNumberGenerator};
pub use calculator::{BillPreview, TaxPolicy};
pub use config::BillingConfig;
pub use draft::{BillDraft, PaymentMethod};
pub use error::{Error, Result};
pub use ledger::{BillHistory, BillLedger, StatusSummary};
pub use money::Money;
pub use record::{BillRecord, BillStatus, Document};
pub use service::BillingService;
pub use session::FormSession;
pub use store::{DocumentStore, Query, StoredDocument};
#[cfg(feature = "inmemory")]
pub use store::InMemoryStore;
pub use validation::FieldError;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
