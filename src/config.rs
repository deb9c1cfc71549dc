//! Billing configuration.

use crate::bill_number::DEFAULT_SUFFIX_LEN;
use crate::calculator::TaxPolicy;
use crate::error::{Error, Result};
use rust_decimal::Decimal;
use std::str::FromStr;
use std::time::Duration;

/// Settings shared by every submission and listing.
///
/// # Example
///
/// ```
/// use bill_kit::BillingConfig;
/// use std::time::Duration;
///
/// let config = BillingConfig::default()
///     .with_collection("bills_test")
///     .with_conflict_retries(5)
///     .with_request_timeout(Duration::from_secs(3));
/// assert_eq!(config.collection, "bills_test");
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct BillingConfig {
    /// Collection bills are written to.
    pub collection: String,

    /// Tax applied to the service charge. Defaults to none.
    pub tax_policy: TaxPolicy,

    /// Extra create attempts after a bill-number conflict (0 = no retry).
    ///
    /// Each attempt mints a fresh bill number. Other failures are never
    /// retried automatically.
    pub conflict_retries: u32,

    /// Upper bound on each store call; expiry is a persistence failure.
    pub request_timeout: Duration,

    /// Length of the random bill-number suffix (at least 4).
    pub suffix_len: usize,
}

impl Default for BillingConfig {
    fn default() -> Self {
        BillingConfig {
            collection: "bills".to_string(),
            tax_policy: TaxPolicy::None,
            conflict_retries: 3,
            request_timeout: Duration::from_secs(10),
            suffix_len: DEFAULT_SUFFIX_LEN,
        }
    }
}

impl BillingConfig {
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    pub fn with_tax_policy(mut self, policy: TaxPolicy) -> Self {
        self.tax_policy = policy;
        self
    }

    pub fn with_conflict_retries(mut self, retries: u32) -> Self {
        self.conflict_retries = retries;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_suffix_len(mut self, len: usize) -> Self {
        self.suffix_len = len.max(DEFAULT_SUFFIX_LEN);
        self
    }

    /// Load overrides from the process environment.
    ///
    /// | Variable | Field |
    /// |----------|-------|
    /// | `BILLKIT_COLLECTION` | `collection` |
    /// | `BILLKIT_TAX_RATE` | `tax_policy` (`0` or empty = none, `0.25` = 25%) |
    /// | `BILLKIT_CONFLICT_RETRIES` | `conflict_retries` |
    /// | `BILLKIT_TIMEOUT_SECS` | `request_timeout` |
    /// | `BILLKIT_SUFFIX_LEN` | `suffix_len` |
    ///
    /// # Errors
    /// Returns `Error::Config` for a value that does not parse.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    ///
    /// # Errors
    /// Returns `Error::Config` for a value that does not parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = BillingConfig::default();

        if let Some(collection) = lookup("BILLKIT_COLLECTION") {
            let collection = collection.trim();
            if collection.is_empty() {
                return Err(Error::Config("BILLKIT_COLLECTION is empty".to_string()));
            }
            config.collection = collection.to_string();
        }

        if let Some(rate) = lookup("BILLKIT_TAX_RATE") {
            config.tax_policy = parse_tax_rate(&rate)?;
        }

        if let Some(retries) = lookup("BILLKIT_CONFLICT_RETRIES") {
            config.conflict_retries = parse_number("BILLKIT_CONFLICT_RETRIES", &retries)?;
        }

        if let Some(secs) = lookup("BILLKIT_TIMEOUT_SECS") {
            let secs: u64 = parse_number("BILLKIT_TIMEOUT_SECS", &secs)?;
            if secs == 0 {
                return Err(Error::Config("BILLKIT_TIMEOUT_SECS must be positive".to_string()));
            }
            config.request_timeout = Duration::from_secs(secs);
        }

        if let Some(len) = lookup("BILLKIT_SUFFIX_LEN") {
            let len: usize = parse_number("BILLKIT_SUFFIX_LEN", &len)?;
            config = config.with_suffix_len(len);
        }

        debug!("Billing config loaded: {:?}", config);
        Ok(config)
    }
}

fn parse_number<T: FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| Error::Config(format!("{} is not a valid number: {:?}", name, raw)))
}

fn parse_tax_rate(raw: &str) -> Result<TaxPolicy> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(TaxPolicy::None);
    }

    let rate = Decimal::from_str(raw)
        .map_err(|_| Error::Config(format!("BILLKIT_TAX_RATE is not a decimal: {:?}", raw)))?;

    if rate.is_sign_negative() && !rate.is_zero() {
        return Err(Error::Config(format!("BILLKIT_TAX_RATE is negative: {}", raw)));
    }

    Ok(if rate.is_zero() {
        TaxPolicy::None
    } else {
        TaxPolicy::Flat(rate)
    })
}
