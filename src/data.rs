//! Transaction loading using Polars

use std::path::Path;

use chrono::NaiveDate;
use polars::prelude::*;
use tracing::debug;

use crate::error::RfmError;

/// Date layout of the transaction date column
pub const DATE_FORMAT: &str = "%Y%m%d";

/// Names of the input columns the analysis reads
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnConfig {
    pub customer_id: String,
    pub date: String,
    pub amount: String,
}

impl Default for ColumnConfig {
    /// Column names of the sales extract: parent customer id, performance
    /// date and net price amount.
    fn default() -> Self {
        Self {
            customer_id: "prnts_cstmr_id".to_string(),
            date: "prf_ymd".to_string(),
            amount: "ntprc_amt".to_string(),
        }
    }
}

impl ColumnConfig {
    pub fn new(
        customer_id: impl Into<String>,
        date: impl Into<String>,
        amount: impl Into<String>,
    ) -> Self {
        Self {
            customer_id: customer_id.into(),
            date: date.into(),
            amount: amount.into(),
        }
    }

    /// Fails on the first configured column absent from `df`
    pub fn validate(&self, df: &DataFrame) -> crate::Result<()> {
        for name in [&self.customer_id, &self.date, &self.amount] {
            if df.get_column_index(name).is_none() {
                return Err(RfmError::MissingColumn(name.clone()));
            }
        }
        Ok(())
    }
}

/// A single sales row
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub customer_id: String,
    pub date: NaiveDate,
    pub amount: f64,
}

impl Transaction {
    pub fn new(customer_id: impl Into<String>, date: NaiveDate, amount: f64) -> Self {
        Self {
            customer_id: customer_id.into(),
            date,
            amount,
        }
    }
}

/// Read a CSV file with a header row, keeping every column as text
pub fn read_csv(file_path: impl AsRef<Path>) -> crate::Result<DataFrame> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .try_into_reader_with_file_path(Some(file_path.as_ref().to_path_buf()))?
        .finish()?;

    debug!(rows = df.height(), columns = df.width(), "read transaction csv");
    Ok(df)
}

/// Load and parse transactions from a CSV file
///
/// # Arguments
/// * `file_path` - Path to the CSV file
/// * `columns` - Names of the customer id, date and amount columns
pub fn load_transactions(
    file_path: impl AsRef<Path>,
    columns: &ColumnConfig,
) -> crate::Result<Vec<Transaction>> {
    let df = read_csv(file_path)?;
    transactions_from_frame(&df, columns)
}

/// Convert a DataFrame into transaction records
///
/// All three configured columns must be present. Columns of any dtype are
/// read through their text form, so integer dates and float amounts work the
/// same as string columns. Customer ids are kept verbatim, so `" C1"` and
/// `"C1"` are different customers. Row numbers in errors are 1-based data
/// rows.
pub fn transactions_from_frame(
    df: &DataFrame,
    columns: &ColumnConfig,
) -> crate::Result<Vec<Transaction>> {
    columns.validate(df)?;

    let id_column = text_column(df, &columns.customer_id)?;
    let date_column = text_column(df, &columns.date)?;
    let amount_column = text_column(df, &columns.amount)?;

    let ids = id_column.as_materialized_series().str()?;
    let dates = date_column.as_materialized_series().str()?;
    let amounts = amount_column.as_materialized_series().str()?;

    let mut transactions = Vec::with_capacity(df.height());
    for (index, ((id, date), amount)) in ids
        .into_iter()
        .zip(dates.into_iter())
        .zip(amounts.into_iter())
        .enumerate()
    {
        let row = index + 1;
        let id = required(id, row, &columns.customer_id)?;
        let date = required(date, row, &columns.date)?;
        let amount = required(amount, row, &columns.amount)?;

        let date = parse_date(date).ok_or_else(|| RfmError::InvalidDate {
            row,
            column: columns.date.clone(),
            value: date.to_string(),
        })?;
        let amount = parse_amount(amount).ok_or_else(|| RfmError::InvalidAmount {
            row,
            column: columns.amount.clone(),
            value: amount.to_string(),
        })?;

        transactions.push(Transaction::new(id, date, amount));
    }

    debug!(transactions = transactions.len(), "parsed transactions");
    Ok(transactions)
}

/// Parse a `YYYYMMDD` date literal
///
/// Exactly eight digits are required; chrono alone would accept a
/// single-digit day.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}

fn parse_amount(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|amount| amount.is_finite())
}

fn text_column(df: &DataFrame, name: &str) -> crate::Result<Column> {
    Ok(df.column(name)?.cast(&DataType::String)?)
}

fn required<'a>(value: Option<&'a str>, row: usize, column: &str) -> crate::Result<&'a str> {
    value.ok_or_else(|| RfmError::MissingValue {
        row,
        column: column.to_string(),
    })
}
