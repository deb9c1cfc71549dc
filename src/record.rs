//! Persisted bill records and the document mapping they share with the store.

use crate::bill_number::BillNumber;
use crate::calculator::{compute_change_due, compute_tax, compute_total, service_charge, TaxPolicy};
use crate::draft::{BillDraft, PaymentMethod};
use crate::error::{Error, Result};
use crate::money::Money;
use crate::store::StoredDocument;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Trait for records kept in a document store collection.
///
/// # Example
///
/// ```
/// use bill_kit::record::Document;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, Serialize, Deserialize)]
/// struct ServiceOrder {
///     id: String,
///     status: String,
/// }
///
/// impl Document for ServiceOrder {
///     fn document_id(&self) -> String {
///         self.id.clone()
///     }
///
///     fn collection() -> &'static str {
///         "orders"
///     }
/// }
/// ```
pub trait Document: Send + Sync + Serialize + DeserializeOwned + Clone {
    /// Id the record is stored under.
    fn document_id(&self) -> String;

    /// Default collection for this record type.
    fn collection() -> &'static str;

    /// Convert into the store's JSON object form.
    ///
    /// # Errors
    /// Returns `Error::Serialization` if the record does not map to a JSON object.
    fn to_document(&self) -> Result<Value> {
        match serde_json::to_value(self)? {
            value @ Value::Object(_) => Ok(value),
            other => Err(Error::Serialization(format!(
                "{} record is not a JSON object: {}",
                Self::collection(),
                other
            ))),
        }
    }

    /// Rebuild from a stored document.
    ///
    /// # Errors
    /// Returns `Error::Serialization` when stored fields do not match the record.
    fn from_document(document: &StoredDocument) -> Result<Self> {
        serde_json::from_value(Value::Object(document.data.clone())).map_err(|e| {
            Error::Serialization(format!(
                "document {}/{}: {}",
                document.collection, document.id, e
            ))
        })
    }
}

/// Lifecycle state of a bill.
///
/// Bills are created as `Paid`. `Pending` and `Cancelled` are reserved for
/// later workflows; nothing in this crate moves a bill into them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillStatus {
    Pending,
    #[default]
    Paid,
    Cancelled,
}

impl BillStatus {
    pub const ALL: [BillStatus; 3] = [BillStatus::Pending, BillStatus::Paid, BillStatus::Cancelled];

    /// Value stored in the `status` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            BillStatus::Pending => "pending",
            BillStatus::Paid => "paid",
            BillStatus::Cancelled => "cancelled",
        }
    }

    /// Text for status badges.
    pub fn label(&self) -> &'static str {
        match self {
            BillStatus::Pending => "Pending",
            BillStatus::Paid => "Paid",
            BillStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for BillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A submitted bill.
///
/// Created once from a validated draft and never changed afterwards, except
/// for `status`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillRecord {
    pub bill_number: BillNumber,
    pub service_type: String,
    pub service_provider_name: String,
    pub customer_name: String,
    pub address: String,
    pub contact_number: String,
    pub service_charge: Money,
    pub tax: Money,
    pub total: Money,
    pub payment_method: PaymentMethod,
    pub cash_given: Option<Money>,
    pub change_due: Option<Money>,
    pub date: DateTime<Utc>,
    pub status: BillStatus,
    pub notes: Option<String>,
}

impl BillRecord {
    /// Snapshot a draft into a record.
    ///
    /// The draft must already have passed validation. Cash figures are only
    /// read for cash payments; for UPI they are `None`.
    pub fn assemble(
        draft: &BillDraft,
        bill_number: BillNumber,
        now: DateTime<Utc>,
        policy: &TaxPolicy,
    ) -> Self {
        let total = compute_total(&draft.service_charge, policy);
        let (cash_given, change_due) = match draft.payment_method {
            PaymentMethod::Cash => (
                Some(service_charge(&draft.cash_given)),
                Some(compute_change_due(total, &draft.cash_given)),
            ),
            PaymentMethod::Upi => (None, None),
        };

        BillRecord {
            bill_number,
            service_type: draft.service_type.trim().to_string(),
            service_provider_name: draft.service_provider_name.trim().to_string(),
            customer_name: draft.customer_name.trim().to_string(),
            address: draft.address.trim().to_string(),
            contact_number: draft.contact_number.clone(),
            service_charge: service_charge(&draft.service_charge),
            tax: compute_tax(&draft.service_charge, policy),
            total,
            payment_method: draft.payment_method,
            cash_given,
            change_due,
            date: now,
            status: BillStatus::Paid,
            notes: draft.notes_opt(),
        }
    }
}

impl Document for BillRecord {
    fn document_id(&self) -> String {
        self.bill_number.to_string()
    }

    fn collection() -> &'static str {
        "bills"
    }
}
