//! Draft validation.
//!
//! Walks [`BillDraft::visible_fields`] and applies each descriptor's
//! [`FieldRule`]. Pure: no state is touched and nothing is sent anywhere.

use crate::calculator::parse_amount;
use crate::draft::{BillDraft, FieldDescriptor, FieldRule};
use crate::money::max_amount;
use serde::Serialize;
use std::fmt;

/// A single failed field rule, ready for display next to the input.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        FieldError {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check one value against a descriptor's rule.
pub fn check_field(descriptor: &FieldDescriptor, value: &str) -> Option<FieldError> {
    let label = descriptor.label;
    let message = match descriptor.rule {
        FieldRule::Required if value.trim().is_empty() => format!("{} is required", label),
        FieldRule::TenDigitPhone if value.is_empty() => format!("{} is required", label),
        FieldRule::TenDigitPhone if !is_ten_digits(value) => {
            format!("{} must be exactly 10 digits", label)
        }
        FieldRule::NonNegativeAmount => match parse_amount(value) {
            None => format!("{} must be a number", label),
            Some(amount) if amount.is_sign_negative() && !amount.is_zero() => {
                format!("{} cannot be negative", label)
            }
            Some(amount) if amount > max_amount() => {
                format!("{} must be at most {}", label, max_amount())
            }
            Some(_) => return None,
        },
        FieldRule::MaxChars(max) if value.chars().count() > max => {
            format!("{} must be at most {} characters", label, max)
        }
        _ => return None,
    };
    Some(FieldError::new(descriptor.key, message))
}

/// Validate every visible field and collect all violations, in field order.
///
/// # Errors
/// Returns the full list of failed rules when any field is invalid.
pub fn validate(draft: &BillDraft) -> Result<(), Vec<FieldError>> {
    let errors: Vec<FieldError> = draft
        .visible_fields()
        .iter()
        .filter_map(|descriptor| check_field(descriptor, draft.field(descriptor.key).unwrap_or("")))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Fail-fast variant: stops at the first failing rule.
///
/// # Errors
/// Returns the first failed rule in field order.
pub fn validate_first(draft: &BillDraft) -> Result<(), FieldError> {
    for descriptor in draft.visible_fields() {
        if let Some(error) = check_field(&descriptor, draft.field(descriptor.key).unwrap_or("")) {
            return Err(error);
        }
    }
    Ok(())
}

fn is_ten_digits(value: &str) -> bool {
    value.len() == 10 && value.bytes().all(|b| b.is_ascii_digit())
}
