//! End-to-end RFM analysis: aggregate, fit quantiles, score, classify

use std::fs::File;
use std::path::Path;

use chrono::NaiveDateTime;
use polars::prelude::*;
use tracing::{debug, info};

use crate::data::{self, ColumnConfig, Transaction};
use crate::metrics::{aggregate, CustomerMetrics};
use crate::quantile::{compute_thresholds, QuantileThresholds};
use crate::score::{score_metrics, score_values, RfmScores};
use crate::segment::{classify, Segment};

/// Metrics, scores and segment of one customer
#[derive(Debug, Clone, PartialEq)]
pub struct RfmRecord {
    pub metrics: CustomerMetrics,
    pub scores: RfmScores,
    pub segment: Segment,
}

/// Aggregate statistics of one segment
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentSummary {
    pub segment: Segment,
    pub customers: usize,
    /// Fraction of all customers, 0.0..=1.0
    pub share: f64,
    pub mean_recency: f64,
    pub mean_frequency: f64,
    pub mean_monetary: f64,
}

/// Scores and segment for a set of raw values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prediction {
    pub scores: RfmScores,
    pub segment: Segment,
}

/// Result of a full run, one record per customer ordered by customer id
#[derive(Debug, Clone, PartialEq)]
pub struct RfmAnalysis {
    pub records: Vec<RfmRecord>,
    pub thresholds: QuantileThresholds,
}

/// Run the analysis over parsed transactions
///
/// # Arguments
/// * `transactions` - Sales rows
/// * `reference` - "Current" timestamp that recency is measured from
pub fn run_analysis(
    transactions: &[Transaction],
    reference: NaiveDateTime,
) -> crate::Result<RfmAnalysis> {
    let metrics = aggregate(transactions, reference)?;
    let thresholds = compute_thresholds(&metrics)?;
    let records = score_and_classify(metrics, &thresholds);

    let analysis = RfmAnalysis {
        records,
        thresholds,
    };
    info!(
        transactions = transactions.len(),
        customers = analysis.records.len(),
        "rfm analysis complete"
    );
    Ok(analysis)
}

/// Run the analysis over a DataFrame with the configured columns
pub fn analyze_frame(
    df: &DataFrame,
    columns: &ColumnConfig,
    reference: NaiveDateTime,
) -> crate::Result<RfmAnalysis> {
    let transactions = data::transactions_from_frame(df, columns)?;
    run_analysis(&transactions, reference)
}

/// Run the analysis over a CSV file with the configured columns
pub fn analyze_csv(
    file_path: impl AsRef<Path>,
    columns: &ColumnConfig,
    reference: NaiveDateTime,
) -> crate::Result<RfmAnalysis> {
    let transactions = data::load_transactions(file_path, columns)?;
    run_analysis(&transactions, reference)
}

fn score_and_classify(
    metrics: Vec<CustomerMetrics>,
    thresholds: &QuantileThresholds,
) -> Vec<RfmRecord> {
    metrics
        .into_iter()
        .map(|metrics| {
            let scores = score_metrics(&metrics, thresholds);
            let segment = classify(&scores);
            RfmRecord {
                metrics,
                scores,
                segment,
            }
        })
        .collect()
}

impl RfmAnalysis {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, customer_id: &str) -> Option<&RfmRecord> {
        self.records
            .binary_search_by(|record| record.metrics.customer_id.as_str().cmp(customer_id))
            .ok()
            .map(|index| &self.records[index])
    }

    /// Score and classify a hypothetical customer against the fitted thresholds
    pub fn predict(&self, recency: f64, frequency: f64, monetary: f64) -> Prediction {
        let scores = score_values(recency, frequency, monetary, &self.thresholds);
        Prediction {
            scores,
            segment: classify(&scores),
        }
    }

    /// Result table with one row per customer
    pub fn to_dataframe(&self) -> crate::Result<DataFrame> {
        let records = &self.records;

        let ids: Vec<&str> = records.iter().map(|r| r.metrics.customer_id.as_str()).collect();
        let recency: Vec<u32> = records.iter().map(|r| r.metrics.recency).collect();
        let frequency: Vec<u32> = records.iter().map(|r| r.metrics.frequency).collect();
        let monetary: Vec<f64> = records.iter().map(|r| r.metrics.monetary).collect();
        let names: Vec<&str> = records.iter().map(|r| r.segment.name()).collect();
        let descriptions: Vec<&str> = records.iter().map(|r| r.segment.description()).collect();

        let df = DataFrame::new(vec![
            Series::new("customer_id".into(), ids).into(),
            Series::new("Recency".into(), recency).into(),
            Series::new("Frequency".into(), frequency).into(),
            Series::new("Monetary".into(), monetary).into(),
            score_series("R", records, |s| s.r()).into(),
            score_series("F", records, |s| s.f()).into(),
            score_series("M", records, |s| s.m()).into(),
            Series::new("Segment".into(), names).into(),
            Series::new("Description".into(), descriptions).into(),
        ])?;

        Ok(df)
    }

    /// Export the result table as CSV
    pub fn write_csv(&self, output_path: impl AsRef<Path>) -> crate::Result<()> {
        let mut df = self.to_dataframe()?;
        let mut file = File::create(output_path.as_ref())?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut df)?;

        debug!(
            path = %output_path.as_ref().display(),
            rows = df.height(),
            "wrote rfm results"
        );
        Ok(())
    }

    /// Per-segment counts and mean metrics, in rule-table order, omitting
    /// empty segments
    pub fn segment_summary(&self) -> Vec<SegmentSummary> {
        let total = self.records.len();

        Segment::ALL
            .iter()
            .filter_map(|&segment| {
                let members: Vec<&CustomerMetrics> = self
                    .records
                    .iter()
                    .filter(|r| r.segment == segment)
                    .map(|r| &r.metrics)
                    .collect();
                if members.is_empty() {
                    return None;
                }

                let count = members.len() as f64;
                let mean = |value: fn(&CustomerMetrics) -> f64| {
                    members.iter().map(|m| value(m)).sum::<f64>() / count
                };

                Some(SegmentSummary {
                    segment,
                    customers: members.len(),
                    share: count / total as f64,
                    mean_recency: mean(|m| f64::from(m.recency)),
                    mean_frequency: mean(|m| f64::from(m.frequency)),
                    mean_monetary: mean(|m| m.monetary),
                })
            })
            .collect()
    }
}

fn score_series(name: &str, records: &[RfmRecord], pick: impl Fn(&RfmScores) -> u8) -> Series {
    let values: Vec<u32> = records.iter().map(|r| u32::from(pick(&r.scores))).collect();
    Series::new(name.into(), values)
}
