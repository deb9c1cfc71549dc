//! Bill form session.
//!
//! Holds the draft a user is editing, keeps the live preview in step with it
//! and clears the form once the bill is stored.

use crate::calculator::BillPreview;
use crate::draft::{BillDraft, FieldDescriptor};
use crate::error::Result;
use crate::record::BillRecord;
use crate::service::BillingService;
use crate::store::DocumentStore;
use crate::validation::{self, FieldError};
use serde_json::Value;

/// One bill form being filled in.
///
/// `submit` takes `&mut self`, so a session can never have two submissions
/// in flight. On failure the draft is left as it was for correction and
/// resubmission; on success it is reset to a blank cash bill.
///
/// # Example
///
/// ```ignore
/// let mut form = billing.session();
/// form.set_field("customerName", "Asha")?;
/// form.set_field("serviceCharge", "200")?;
/// println!("Total: {}", form.preview().total);
/// let record = form.submit().await?;
/// ```
pub struct FormSession<S: DocumentStore> {
    service: BillingService<S>,
    draft: BillDraft,
}

impl<S: DocumentStore> FormSession<S> {
    /// Start with a blank draft.
    pub fn new(service: BillingService<S>) -> Self {
        FormSession {
            service,
            draft: BillDraft::new(),
        }
    }

    /// Start from an existing draft.
    pub fn with_draft(service: BillingService<S>, draft: BillDraft) -> Self {
        FormSession { service, draft }
    }

    pub fn draft(&self) -> &BillDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut BillDraft {
        &mut self.draft
    }

    /// Update one field by its form key.
    ///
    /// # Errors
    /// Returns `Err` for a key the form does not have.
    pub fn set_field(&mut self, key: &str, value: impl Into<String>) -> Result<()> {
        self.draft.set_field(key, value)
    }

    /// Replace the draft with one prefilled from a service request.
    pub fn prefill(&mut self, service_data: &Value) {
        self.draft = BillDraft::from_service_data(service_data);
    }

    /// Clear every field.
    pub fn reset(&mut self) {
        self.draft.reset();
    }

    /// Fields to render, in order.
    pub fn visible_fields(&self) -> Vec<FieldDescriptor> {
        self.draft.visible_fields()
    }

    /// Current figures, recomputed from the draft on every call.
    pub fn preview(&self) -> BillPreview {
        self.service.preview(&self.draft)
    }

    /// First rule the draft currently breaks, if any.
    pub fn first_error(&self) -> Option<FieldError> {
        validation::validate_first(&self.draft).err()
    }

    /// Store the bill.
    ///
    /// # Errors
    /// See [`BillLedger::submit`](crate::ledger::BillLedger::submit). The
    /// draft is kept untouched on any error.
    pub async fn submit(&mut self) -> Result<BillRecord> {
        let record = self.service.submit(&self.draft).await?;
        self.draft.reset();
        Ok(record)
    }
}

#[cfg(all(test, feature = "inmemory"))]
mod tests {
    use super::*;
    use crate::draft::PaymentMethod;
    use crate::error::Error;
    use crate::store::InMemoryStore;
    use serde_json::json;

    fn fill(form: &mut FormSession<InMemoryStore>) {
        for (key, value) in [
            ("serviceType", "Plumbing"),
            ("serviceProviderName", "Ravi"),
            ("customerName", "Asha"),
            ("address", "12 MG Road"),
            ("contactNumber", "9876543210"),
            ("serviceCharge", "200"),
            ("cashGiven", "500"),
        ] {
            form.set_field(key, value).expect("Known field");
        }
    }

    #[tokio::test]
    async fn test_session_submit_resets_draft() {
        let billing = BillingService::new(InMemoryStore::new());
        let mut form = billing.session();
        fill(&mut form);

        assert_eq!(form.preview().change_due.map(|m| m.to_string()), Some("300.00".into()));
        assert!(form.first_error().is_none());

        let record = form.submit().await.expect("Failed to submit");
        assert_eq!(record.cash_given.map(|m| m.to_string()), Some("500.00".into()));
        assert_eq!(form.draft(), &BillDraft::new());
        assert_eq!(form.draft().payment_method, PaymentMethod::Cash);
    }

    #[tokio::test]
    async fn test_session_keeps_draft_on_error() {
        let store = InMemoryStore::new();
        let billing = BillingService::new(store.clone());
        let mut form = billing.session();
        fill(&mut form);
        form.set_field("customerName", "   ").unwrap();

        let before = form.draft().clone();
        let err = form.submit().await.expect_err("Blank customer");
        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(form.draft(), &before);
        assert_eq!(form.first_error().map(|e| e.field), Some("customerName"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_session_prefill() {
        let billing = BillingService::new(InMemoryStore::new());
        let mut form = billing.session();
        form.prefill(&json!({
            "serviceType": "AC Repair",
            "serviceBoyName": "Suresh",
            "billAmount": "450"
        }));

        assert_eq!(form.draft().service_provider_name, "Suresh");
        assert_eq!(form.preview().total.to_string(), "450.00");

        form.reset();
        assert_eq!(form.draft(), &BillDraft::new());
    }
}
