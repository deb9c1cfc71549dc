//! Error types for the billing core.

use crate::validation::FieldError;
use std::fmt;

/// Result type for billing operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the billing core.
///
/// All billing operations return `Result<T>` where `Result` is defined as `std::result::Result<T, Error>`.
/// Different error variants represent different failure modes:
#[derive(Debug, Clone)]
pub enum Error {
    /// One or more draft fields are missing or malformed.
    ///
    /// Raised locally before any store call. The store never sees an
    /// invalid draft.
    ///
    /// **Recovery:** The user corrects the listed fields and submits again.
    Validation(Vec<FieldError>),

    /// The store rejected a create because the document id already exists.
    ///
    /// For bills this means the generated bill number collided with an
    /// existing record.
    ///
    /// **Recovery:** Mint a new bill number and retry. `BillLedger::submit`
    /// does this automatically up to `BillingConfig::conflict_retries` times.
    Conflict(String),

    /// Store or network failure other than a conflict.
    ///
    /// Common causes:
    /// - Request timed out
    /// - Hosted service unavailable
    /// - Unexpected response from the store
    ///
    /// **Recovery:** Surface to the user with a retry affordance. Not retried
    /// automatically.
    Persistence(String),

    /// The session used for store calls has expired.
    ///
    /// **Recovery:** Re-authenticate. Retrying the write will not help.
    AuthExpired(String),

    /// Document not found (update/delete on a missing id).
    NotFound(String),

    /// A record could not be converted to or from a store document.
    Serialization(String),

    /// Configuration error while building the service or a store.
    ///
    /// Common causes:
    /// - Invalid environment value
    /// - Missing endpoint or project id
    ///
    /// **Recovery:** Fix configuration and restart.
    Config(String),

    /// Generic error with custom message.
    Other(String),
}

impl Error {
    /// Whether retrying the same user action can succeed.
    ///
    /// Validation and auth failures need user action first.
    pub fn is_retriable(&self) -> bool {
        matches!(self, Error::Conflict(_) | Error::Persistence(_))
    }

    /// Field errors carried by a validation failure, empty otherwise.
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            Error::Validation(errors) => errors,
            _ => &[],
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Validation(errors) => {
                let messages: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
                write!(f, "Validation error: {}", messages.join("; "))
            }
            Error::Conflict(msg) => write!(f, "Conflict: {}", msg),
            Error::Persistence(msg) => write!(f, "Persistence error: {}", msg),
            Error::AuthExpired(msg) => write!(f, "Session expired: {}", msg),
            Error::NotFound(msg) => write!(f, "Not found: {}", msg),
            Error::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            Error::Config(msg) => write!(f, "Config error: {}", msg),
            Error::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ============================================================================
// Conversions from other error types
// ============================================================================

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        if e.is_io() {
            Error::Persistence(e.to_string())
        } else {
            Error::Serialization(e.to_string())
        }
    }
}

impl From<tokio::time::error::Elapsed> for Error {
    fn from(e: tokio::time::error::Elapsed) -> Self {
        Error::Persistence(format!("request timed out: {}", e))
    }
}

impl From<String> for Error {
    fn from(e: String) -> Self {
        Error::Other(e)
    }
}

impl From<&str> for Error {
    fn from(e: &str) -> Self {
        Error::Other(e.to_string())
    }
}

#[cfg(feature = "appwrite")]
impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Error::Serialization(format!("Appwrite response: {}", e))
        } else {
            Error::Persistence(format!("Appwrite request: {}", e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::FieldError;

    #[test]
    fn test_error_display() {
        let err = Error::Conflict("BILL-20250101-ABCD".to_string());
        assert_eq!(err.to_string(), "Conflict: BILL-20250101-ABCD");
    }

    #[test]
    fn test_validation_display_joins_messages() {
        let err = Error::Validation(vec![
            FieldError::new("customerName", "Customer name is required"),
            FieldError::new("contactNumber", "Contact number must be exactly 10 digits"),
        ]);
        assert_eq!(
            err.to_string(),
            "Validation error: Customer name is required; Contact number must be exactly 10 digits"
        );
        assert_eq!(err.field_errors().len(), 2);
    }

    #[test]
    fn test_error_from_string() {
        let err: Error = "test error".into();
        assert!(matches!(err, Error::Other(_)));
    }

    #[test]
    fn test_retriable_kinds() {
        assert!(Error::Conflict("x".into()).is_retriable());
        assert!(Error::Persistence("x".into()).is_retriable());
        assert!(!Error::AuthExpired("x".into()).is_retriable());
        assert!(!Error::Validation(vec![]).is_retriable());
    }
}
