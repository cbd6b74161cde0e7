//! Error type shared by every stage of the analysis

use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RfmError {
    #[error("missing required column `{0}`")]
    MissingColumn(String),

    #[error("row {row}: missing value in column `{column}`")]
    MissingValue { row: usize, column: String },

    #[error("row {row}: invalid date `{value}` in column `{column}`, expected YYYYMMDD")]
    InvalidDate {
        row: usize,
        column: String,
        value: String,
    },

    #[error("row {row}: invalid amount `{value}` in column `{column}`")]
    InvalidAmount {
        row: usize,
        column: String,
        value: String,
    },

    #[error("customer {customer_id}: transaction on {date} is after the reference date {reference}")]
    TransactionAfterReference {
        customer_id: String,
        date: chrono::NaiveDate,
        reference: chrono::NaiveDate,
    },

    #[error("insufficient data: {0}")]
    InsufficientData(String),

    #[error("score {0} is outside the range 1..=5")]
    ScoreOutOfRange(u8),

    #[error(transparent)]
    Polars(#[from] PolarsError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl RfmError {
    /// True for errors caused by malformed input values rather than I/O or
    /// missing columns.
    pub fn is_data_format(&self) -> bool {
        matches!(
            self,
            Self::MissingValue { .. } | Self::InvalidDate { .. } | Self::InvalidAmount { .. }
        )
    }
}
