//! Per-customer Recency, Frequency and Monetary aggregation using Polars

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use tracing::debug;

use crate::data::Transaction;
use crate::error::RfmError;

/// Raw RFM values for one customer
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerMetrics {
    pub customer_id: String,
    /// Days since the most recent transaction
    pub recency: u32,
    /// Number of transaction rows
    pub frequency: u32,
    /// Sum of transaction amounts
    pub monetary: f64,
}

/// Group transactions by customer and reduce them to RFM metrics
///
/// The reference timestamp is truncated to its date before subtracting, so
/// recency counts whole days from midnight of the last purchase. Every row
/// adds to frequency, including several on the same day. Output is ordered by
/// customer id.
pub fn aggregate(
    transactions: &[Transaction],
    reference: NaiveDateTime,
) -> crate::Result<Vec<CustomerMetrics>> {
    let reference_date = reference.date();
    if transactions.is_empty() {
        debug!("no transactions to aggregate");
        return Ok(Vec::new());
    }

    let rfm_df = compute_rfm_frame(transactions, reference_date)?;
    let metrics = collect_metrics(&rfm_df, reference_date)?;

    debug!(
        transactions = transactions.len(),
        customers = metrics.len(),
        reference = %reference_date,
        "aggregated customer metrics"
    );
    Ok(metrics)
}

/// Group the transaction rows by customer with a lazy query
///
/// Dates travel as day numbers (days from the common era) so recency is a
/// plain integer difference.
fn compute_rfm_frame(
    transactions: &[Transaction],
    reference_date: NaiveDate,
) -> crate::Result<DataFrame> {
    let ids: Vec<&str> = transactions.iter().map(|t| t.customer_id.as_str()).collect();
    let days: Vec<i32> = transactions.iter().map(|t| t.date.num_days_from_ce()).collect();
    let amounts: Vec<f64> = transactions.iter().map(|t| t.amount).collect();

    let df = DataFrame::new(vec![
        Series::new("CustomerID".into(), ids).into(),
        Series::new("PurchaseDay".into(), days).into(),
        Series::new("Amount".into(), amounts).into(),
    ])?;

    let rfm_df = df
        .lazy()
        .group_by([col("CustomerID")])
        .agg([
            // Recency: last purchase day
            col("PurchaseDay").max().alias("LastPurchaseDay"),
            // Frequency: every row counts
            len().alias("Frequency"),
            // Monetary: total spending
            col("Amount").sum().alias("Monetary"),
        ])
        .with_columns([(lit(reference_date.num_days_from_ce()) - col("LastPurchaseDay"))
            .cast(DataType::Int64)
            .alias("Recency")])
        .sort(["CustomerID"], SortMultipleOptions::default())
        .collect()?;

    Ok(rfm_df)
}

fn collect_metrics(
    rfm_df: &DataFrame,
    reference_date: NaiveDate,
) -> crate::Result<Vec<CustomerMetrics>> {
    let frequency_column = rfm_df.column("Frequency")?.cast(&DataType::UInt32)?;
    let last_day_column = rfm_df.column("LastPurchaseDay")?.cast(&DataType::Int32)?;

    let ids = rfm_df.column("CustomerID")?.as_materialized_series().str()?;
    let recency = rfm_df.column("Recency")?.as_materialized_series().i64()?;
    let last_days = last_day_column.as_materialized_series().i32()?;
    let frequency = frequency_column.as_materialized_series().u32()?;
    let monetary = rfm_df.column("Monetary")?.as_materialized_series().f64()?;

    ids.into_no_null_iter()
        .zip(recency.into_no_null_iter())
        .zip(last_days.into_no_null_iter())
        .zip(frequency.into_no_null_iter())
        .zip(monetary.into_no_null_iter())
        .map(|((((customer_id, days), last_day), frequency), monetary)| {
            let recency = u32::try_from(days).map_err(|_| RfmError::TransactionAfterReference {
                customer_id: customer_id.to_string(),
                date: NaiveDate::from_num_days_from_ce_opt(last_day).unwrap_or(reference_date),
                reference: reference_date,
            })?;
            Ok(CustomerMetrics {
                customer_id: customer_id.to_string(),
                recency,
                frequency,
                monetary,
            })
        })
        .collect()
}
