//! Bill arithmetic: tax, total and change due.
//!
//! Every function here is pure. Inputs are the raw strings from the form;
//! anything that does not parse counts as zero, so recomputing on every
//! keystroke never fails.

use crate::draft::{BillDraft, PaymentMethod};
use crate::money::Money;
use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;

/// How tax is applied to the service charge.
///
/// Bills are tax-free unless a flat rate is configured explicitly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TaxPolicy {
    /// Total equals the service charge.
    #[default]
    None,

    /// Tax = charge × rate, added on top of the charge.
    Flat(Decimal),
}

impl TaxPolicy {
    /// The 25% GST rate some deployments bill with.
    pub fn gst_25() -> Self {
        TaxPolicy::Flat(Decimal::new(25, 2))
    }

    pub fn rate(&self) -> Decimal {
        match self {
            TaxPolicy::None => Decimal::ZERO,
            TaxPolicy::Flat(rate) => *rate,
        }
    }
}

/// Strict parse of a user-entered amount.
///
/// Surrounding whitespace is ignored. Returns `None` for empty or
/// non-numeric input.
pub fn parse_amount(input: &str) -> Option<Decimal> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    Decimal::from_str(trimmed).ok()
}

/// Lenient parse: unparseable input is zero.
pub fn parse_amount_lenient(input: &str) -> Decimal {
    parse_amount(input).unwrap_or(Decimal::ZERO)
}

/// Service charge as money (negative or unparseable input is zero).
pub fn service_charge(input: &str) -> Money {
    Money::new(parse_amount_lenient(input))
}

/// Tax line for a service charge under the given policy.
pub fn compute_tax(service_charge_input: &str, policy: &TaxPolicy) -> Money {
    let charge = service_charge(service_charge_input).amount();
    Money::new(charge.saturating_mul(policy.rate()))
}

/// Bill total: service charge plus the (already rounded) tax line.
///
/// Always defined; `"0.00"` when the charge is missing or not a number.
///
/// # Example
///
/// ```
/// use bill_kit::calculator::{compute_total, TaxPolicy};
///
/// assert_eq!(compute_total("200", &TaxPolicy::None).to_string(), "200.00");
/// assert_eq!(compute_total("", &TaxPolicy::None).to_string(), "0.00");
/// assert_eq!(compute_total("100", &TaxPolicy::gst_25()).to_string(), "125.00");
/// ```
pub fn compute_total(service_charge_input: &str, policy: &TaxPolicy) -> Money {
    let charge = service_charge(service_charge_input).amount();
    let tax = compute_tax(service_charge_input, policy).amount();
    Money::new(charge.saturating_add(tax))
}

/// Change to hand back for a cash payment.
///
/// `"0.00"` unless the cash given exceeds the total. Underpayment is not an
/// error here; it simply yields no change.
///
/// # Example
///
/// ```
/// use bill_kit::calculator::compute_change_due;
/// use bill_kit::Money;
///
/// let total: Money = "200.00".parse().unwrap();
/// assert_eq!(compute_change_due(total, "250").to_string(), "50.00");
/// assert_eq!(compute_change_due(total, "150").to_string(), "0.00");
/// assert_eq!(compute_change_due(total, "cash").to_string(), "0.00");
/// ```
pub fn compute_change_due(total: Money, cash_given_input: &str) -> Money {
    let given = parse_amount_lenient(cash_given_input);
    if given > total.amount() {
        Money::new(given - total.amount())
    } else {
        Money::ZERO
    }
}

/// Figures shown under the form while the bill is being filled in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillPreview {
    pub service_charge: Money,
    pub tax: Money,
    pub total: Money,
    /// Only for cash payments.
    pub change_due: Option<Money>,
}

impl BillPreview {
    /// Recompute every figure from the draft. Nothing is cached.
    pub fn compute(draft: &BillDraft, policy: &TaxPolicy) -> Self {
        let total = compute_total(&draft.service_charge, policy);
        let change_due = match draft.payment_method {
            PaymentMethod::Cash => Some(compute_change_due(total, &draft.cash_given)),
            PaymentMethod::Upi => None,
        };

        BillPreview {
            service_charge: service_charge(&draft.service_charge),
            tax: compute_tax(&draft.service_charge, policy),
            total,
            change_due,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_without_tax() {
        assert_eq!(compute_total("200.00", &TaxPolicy::None).to_string(), "200.00");
        assert_eq!(compute_total("  99.999 ", &TaxPolicy::None).to_string(), "100.00");
    }

    #[test]
    fn test_total_unparseable_is_zero() {
        for input in ["", "   ", "abc", "12abc", "--1"] {
            assert_eq!(compute_total(input, &TaxPolicy::None).to_string(), "0.00");
        }
    }

    #[test]
    fn test_total_negative_clamps() {
        assert_eq!(compute_total("-50", &TaxPolicy::gst_25()).to_string(), "0.00");
    }

    #[test]
    fn test_huge_charge_keeps_two_places() {
        for input in ["7922816251426433759354395033.5", "79228162514264337593543950335"] {
            for policy in [TaxPolicy::None, TaxPolicy::gst_25()] {
                let total = compute_total(input, &policy).to_string();
                assert_eq!(total, "999999999999999.99", "{} under {:?}", input, policy);
            }
        }
    }

    #[test]
    fn test_flat_tax() {
        let policy = TaxPolicy::gst_25();
        assert_eq!(compute_tax("99.99", &policy).to_string(), "25.00");
        assert_eq!(compute_total("99.99", &policy).to_string(), "124.99");
        assert_eq!(compute_tax("99.99", &TaxPolicy::None).to_string(), "0.00");
    }

    #[test]
    fn test_change_due() {
        let total = compute_total("200.00", &TaxPolicy::None);
        assert_eq!(compute_change_due(total, "250").to_string(), "50.00");
        assert_eq!(compute_change_due(total, "200").to_string(), "0.00");
        assert_eq!(compute_change_due(total, "").to_string(), "0.00");
        assert_eq!(compute_change_due(total, "-10").to_string(), "0.00");
        assert_eq!(compute_change_due(total, "200.005").to_string(), "0.01");
    }

    #[test]
    fn test_idempotent() {
        let a = compute_total("123.456", &TaxPolicy::gst_25()).to_string();
        let b = compute_total("123.456", &TaxPolicy::gst_25()).to_string();
        assert_eq!(a, b);
    }

    #[test]
    fn test_preview_cash_and_upi() {
        let mut draft = BillDraft {
            service_charge: "200".into(),
            cash_given: "250".into(),
            ..Default::default()
        };

        let preview = BillPreview::compute(&draft, &TaxPolicy::None);
        assert_eq!(preview.total.to_string(), "200.00");
        assert_eq!(preview.tax, Money::ZERO);
        assert_eq!(preview.change_due.map(|m| m.to_string()), Some("50.00".to_string()));

        draft.payment_method = PaymentMethod::Upi;
        let preview = BillPreview::compute(&draft, &TaxPolicy::None);
        assert_eq!(preview.change_due, None);
    }
}
