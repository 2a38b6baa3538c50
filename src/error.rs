use chrono::NaiveDate;
use thiserror::Error;

/// Errors surfaced by the ledger core. Not-found conditions are not errors;
/// they come back as `Option`/`bool` results the caller must check.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// Validation: a date string did not parse as ISO YYYY-MM-DD.
    #[error("Invalid date '{0}'. Use YYYY-MM-DD")]
    InvalidDate(String),

    /// Validation: a date range was given backwards.
    #[error("Start date {start} cannot be after end date {end}")]
    StartAfterEnd { start: NaiveDate, end: NaiveDate },

    /// Failure of the storage medium. Fatal, propagated unchanged.
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

impl LedgerError {
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            LedgerError::InvalidDate(_) | LedgerError::StartAfterEnd { .. }
        )
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
