//! Human-readable bill identifiers.
//!
//! Format: `BILL-YYYYMMDD-XXXX`, where the date is the creation day (UTC) and
//! `XXXX` is drawn from `A-Z0-9`. The bill number doubles as the store's
//! document id, so a collision surfaces as a create conflict.

use crate::error::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Literal prefix of every bill number.
pub const BILL_PREFIX: &str = "BILL-";

/// Suffix length of the documented format.
pub const DEFAULT_SUFFIX_LEN: usize = 4;

/// Characters the random suffix is drawn from.
pub const SUFFIX_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// A validated bill number.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BillNumber(String);

impl BillNumber {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Calendar day encoded in the number.
    pub fn date(&self) -> NaiveDate {
        let digits = &self.0[BILL_PREFIX.len()..BILL_PREFIX.len() + 8];
        // Checked in `parse`.
        NaiveDate::parse_from_str(digits, "%Y%m%d").unwrap_or(NaiveDate::MIN)
    }

    /// Random suffix after the date.
    pub fn suffix(&self) -> &str {
        &self.0[BILL_PREFIX.len() + 9..]
    }

    /// Parse and validate `BILL-YYYYMMDD-XXXX` (suffix of at least four chars).
    ///
    /// # Errors
    /// Returns `Error::Other` when the text does not follow the format.
    pub fn parse(s: &str) -> Result<Self> {
        let invalid = || Error::Other(format!("invalid bill number: {}", s));

        let rest = s.strip_prefix(BILL_PREFIX).ok_or_else(invalid)?;
        let (date, suffix) = rest.split_once('-').ok_or_else(invalid)?;

        if date.len() != 8 || !date.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        NaiveDate::parse_from_str(date, "%Y%m%d").map_err(|_| invalid())?;

        if suffix.len() < DEFAULT_SUFFIX_LEN
            || !suffix.bytes().all(|b| SUFFIX_ALPHABET.contains(&b))
        {
            return Err(invalid());
        }

        Ok(BillNumber(s.to_string()))
    }
}

impl fmt::Display for BillNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for BillNumber {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        BillNumber::parse(s)
    }
}

impl TryFrom<String> for BillNumber {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        BillNumber::parse(&value).map_err(|e| e.to_string())
    }
}

impl From<BillNumber> for String {
    fn from(value: BillNumber) -> Self {
        value.0
    }
}

impl AsRef<str> for BillNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Mints bill numbers.
///
/// Never blocks and never consults external state. Uniqueness is
/// probabilistic (36^4 per day with the default suffix); widen the suffix
/// for busier deployments.
///
/// # Example
///
/// ```
/// use bill_kit::BillNumberGenerator;
/// use chrono::{TimeZone, Utc};
///
/// let now = Utc.with_ymd_and_hms(2025, 3, 7, 10, 30, 0).unwrap();
/// let number = BillNumberGenerator::new().generate(now);
/// assert!(number.as_str().starts_with("BILL-20250307-"));
/// assert_eq!(number.suffix().len(), 4);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BillNumberGenerator {
    suffix_len: usize,
}

impl BillNumberGenerator {
    pub fn new() -> Self {
        BillNumberGenerator {
            suffix_len: DEFAULT_SUFFIX_LEN,
        }
    }

    /// Use a longer random suffix. Values below four are raised to four.
    pub fn with_suffix_len(mut self, len: usize) -> Self {
        self.suffix_len = len.max(DEFAULT_SUFFIX_LEN);
        self
    }

    pub fn suffix_len(&self) -> usize {
        self.suffix_len
    }

    /// Mint a bill number for a bill created at `now`.
    pub fn generate(&self, now: DateTime<Utc>) -> BillNumber {
        let mut rng = rand::rng();
        let suffix: String = (0..self.suffix_len)
            .map(|_| SUFFIX_ALPHABET[rng.random_range(0..SUFFIX_ALPHABET.len())] as char)
            .collect();

        BillNumber(format!("{}{}-{}", BILL_PREFIX, now.format("%Y%m%d"), suffix))
    }
}

impl Default for BillNumberGenerator {
    fn default() -> Self {
        Self::new()
    }
}
