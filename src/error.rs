//! Error handling for the statement calculator
//!
//! Defines custom error types and establishes a unified Result type
//! using anyhow for context chaining and error propagation.

use chrono::NaiveDate;
use thiserror::Error;

/// Core error types for statement processing
#[derive(Error, Debug)]
pub enum StatementError {
    /// Requested currency is outside the supported set. Raised before any
    /// network call is attempted.
    #[error("unsupported currency: {0}")]
    UnsupportedCurrency(String),

    /// A record carries a date field that is not an ISO `YYYY-MM-DD` prefix.
    #[error("invalid date format: {0}")]
    InvalidDateFormat(String),

    /// Input file is not a well-formed Flex XML statement. Aborts the batch.
    #[error("unparseable input file: {0}")]
    UnparseableInputFile(String),

    /// Cache lookup missed after the resolve barrier. Indicates a record was
    /// valued against a rate the resolver never reserved.
    #[error("exchange rate unavailable for {currency} on {date}")]
    RateUnavailable { currency: String, date: NaiveDate },

    #[error("io error")]
    Io(#[from] std::io::Error),
}

/// Result type alias for statement operations
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_formatting_is_readable() {
        let err = StatementError::UnsupportedCurrency("GBP".to_string());
        assert_eq!(err.to_string(), "unsupported currency: GBP");
    }

    #[test]
    fn test_rate_unavailable_names_the_key() {
        let err = StatementError::RateUnavailable {
            currency: "USD".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        };
        assert_eq!(
            err.to_string(),
            "exchange rate unavailable for USD on 2024-01-02"
        );
    }

    #[test]
    fn test_anyhow_context_chains_errors() {
        use anyhow::Context;
        let result: Result<()> = Err(StatementError::InvalidDateFormat("1/2/2024".to_string()))
            .map_err(anyhow::Error::from)
            .context("failed to resolve rates");
        match result {
            Err(e) => {
                assert!(e.to_string().contains("failed to resolve rates"));
                let debug_msg = format!("{:?}", e);
                assert!(debug_msg.contains("invalid date format"));
            }
            Ok(_) => panic!("expected error"),
        }
    }
}
