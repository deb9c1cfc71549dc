//! In-memory bill form state and the field descriptors that drive it.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Maximum length of the free-form notes field, in characters.
pub const MAX_NOTES_LEN: usize = 500;

/// How the customer pays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Upi,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Upi => "upi",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keyboard the UI should offer for a field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyboardHint {
    Default,
    Numeric,
    Phone,
}

/// Rule a field value must satisfy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldRule {
    /// Non-empty after trimming.
    Required,
    /// Exactly ten ASCII digits.
    TenDigitPhone,
    /// Parses as a decimal between zero and [`max_amount`](crate::money::max_amount).
    NonNegativeAmount,
    /// May be empty; at most this many characters.
    MaxChars(usize),
}

/// Describes one input of the bill form.
///
/// The UI renders inputs from [`FIELDS`] and the validator walks the same
/// list, so both agree on order, labels and rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub key: &'static str,
    pub label: &'static str,
    pub keyboard: KeyboardHint,
    pub rule: FieldRule,
}

/// Text inputs of the bill form, in validation order.
pub const FIELDS: &[FieldDescriptor] = &[
    FieldDescriptor {
        key: "serviceType",
        label: "Service type",
        keyboard: KeyboardHint::Default,
        rule: FieldRule::Required,
    },
    FieldDescriptor {
        key: "serviceProviderName",
        label: "Service provider name",
        keyboard: KeyboardHint::Default,
        rule: FieldRule::Required,
    },
    FieldDescriptor {
        key: "customerName",
        label: "Customer name",
        keyboard: KeyboardHint::Default,
        rule: FieldRule::Required,
    },
    FieldDescriptor {
        key: "address",
        label: "Address",
        keyboard: KeyboardHint::Default,
        rule: FieldRule::Required,
    },
    FieldDescriptor {
        key: "contactNumber",
        label: "Contact number",
        keyboard: KeyboardHint::Phone,
        rule: FieldRule::TenDigitPhone,
    },
    FieldDescriptor {
        key: "serviceCharge",
        label: "Service charge",
        keyboard: KeyboardHint::Numeric,
        rule: FieldRule::NonNegativeAmount,
    },
    FieldDescriptor {
        key: "notes",
        label: "Notes",
        keyboard: KeyboardHint::Default,
        rule: FieldRule::MaxChars(MAX_NOTES_LEN),
    },
];

/// Shown only when the payment method is cash.
pub const CASH_GIVEN_FIELD: FieldDescriptor = FieldDescriptor {
    key: "cashGiven",
    label: "Amount given by customer",
    keyboard: KeyboardHint::Numeric,
    rule: FieldRule::NonNegativeAmount,
};

/// Unsaved bill form state.
///
/// Amounts stay as the raw text the user typed; the calculator and validator
/// interpret them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BillDraft {
    pub service_type: String,
    pub service_provider_name: String,
    pub customer_name: String,
    pub address: String,
    pub contact_number: String,
    pub service_charge: String,
    pub notes: String,
    pub payment_method: PaymentMethod,
    pub cash_given: String,
}

impl BillDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefill from a service or order document.
    ///
    /// Accepts both `serviceBoyName` (legacy order documents) and
    /// `serviceProviderName`. Missing keys stay empty, numbers are stringified.
    pub fn from_service_data(data: &Value) -> Self {
        let text = |keys: &[&str]| -> String {
            keys.iter()
                .find_map(|k| match data.get(*k) {
                    Some(Value::String(s)) => Some(s.clone()),
                    Some(Value::Number(n)) => Some(n.to_string()),
                    _ => None,
                })
                .unwrap_or_default()
        };

        BillDraft {
            service_type: text(&["serviceType"]),
            service_provider_name: text(&["serviceProviderName", "serviceBoyName"]),
            customer_name: text(&["customerName", "clientName"]),
            address: text(&["address"]),
            contact_number: text(&["contactNumber", "phoneNumber"]),
            service_charge: text(&["serviceCharge", "billAmount"]),
            ..Default::default()
        }
    }

    /// Read a field by its descriptor key.
    pub fn field(&self, key: &str) -> Option<&str> {
        let value = match key {
            "serviceType" => &self.service_type,
            "serviceProviderName" => &self.service_provider_name,
            "customerName" => &self.customer_name,
            "address" => &self.address,
            "contactNumber" => &self.contact_number,
            "serviceCharge" => &self.service_charge,
            "notes" => &self.notes,
            "cashGiven" => &self.cash_given,
            _ => return None,
        };
        Some(value.as_str())
    }

    /// Write a field by its descriptor key.
    ///
    /// # Errors
    /// Returns `Error::Other` for a key that is not a form field.
    pub fn set_field(&mut self, key: &str, value: impl Into<String>) -> Result<()> {
        let slot = match key {
            "serviceType" => &mut self.service_type,
            "serviceProviderName" => &mut self.service_provider_name,
            "customerName" => &mut self.customer_name,
            "address" => &mut self.address,
            "contactNumber" => &mut self.contact_number,
            "serviceCharge" => &mut self.service_charge,
            "notes" => &mut self.notes,
            "cashGiven" => &mut self.cash_given,
            other => return Err(Error::Other(format!("unknown bill field: {}", other))),
        };
        *slot = value.into();
        Ok(())
    }

    /// Descriptors of the inputs visible for the current payment method.
    ///
    /// The cash field sits right after the service charge.
    pub fn visible_fields(&self) -> Vec<FieldDescriptor> {
        let mut fields = Vec::with_capacity(FIELDS.len() + 1);
        for descriptor in FIELDS {
            fields.push(*descriptor);
            if descriptor.key == "serviceCharge" && self.payment_method == PaymentMethod::Cash {
                fields.push(CASH_GIVEN_FIELD);
            }
        }
        fields
    }

    /// Notes as an optional value (empty after trimming means none).
    pub fn notes_opt(&self) -> Option<String> {
        let trimmed = self.notes.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    }

    /// Clear back to an empty cash bill.
    pub fn reset(&mut self) {
        *self = BillDraft::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_service_data() {
        let data = json!({
            "serviceType": "AC repair",
            "serviceBoyName": "Ravi",
            "customerName": "Asha",
            "address": "12 MG Road",
            "contactNumber": "9876543210",
            "serviceCharge": 450
        });

        let draft = BillDraft::from_service_data(&data);
        assert_eq!(draft.service_type, "AC repair");
        assert_eq!(draft.service_provider_name, "Ravi");
        assert_eq!(draft.contact_number, "9876543210");
        assert_eq!(draft.service_charge, "450");
        assert_eq!(draft.payment_method, PaymentMethod::Cash);
        assert!(draft.cash_given.is_empty());
    }

    #[test]
    fn test_from_service_data_missing_keys() {
        let draft = BillDraft::from_service_data(&json!({ "address": null }));
        assert_eq!(draft, BillDraft::default());
    }

    #[test]
    fn test_field_roundtrip_by_key() {
        let mut draft = BillDraft::new();
        for descriptor in FIELDS {
            draft.set_field(descriptor.key, "x").unwrap();
            assert_eq!(draft.field(descriptor.key), Some("x"));
        }
        assert!(draft.set_field("status", "paid").is_err());
        assert_eq!(draft.field("status"), None);
    }

    #[test]
    fn test_visible_fields_follow_payment_method() {
        let mut draft = BillDraft::new();
        assert!(draft.visible_fields().iter().any(|f| f.key == "cashGiven"));

        draft.payment_method = PaymentMethod::Upi;
        assert!(!draft.visible_fields().iter().any(|f| f.key == "cashGiven"));
    }

    #[test]
    fn test_reset() {
        let mut draft = BillDraft {
            customer_name: "Asha".into(),
            payment_method: PaymentMethod::Upi,
            ..Default::default()
        };
        draft.reset();
        assert_eq!(draft, BillDraft::default());
    }

    #[test]
    fn test_payment_method_serde() {
        assert_eq!(serde_json::to_string(&PaymentMethod::Upi).unwrap(), "\"upi\"");
        let method: PaymentMethod = serde_json::from_str("\"cash\"").unwrap();
        assert_eq!(method, PaymentMethod::Cash);
    }
}
