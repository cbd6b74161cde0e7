//! SegmentForge: A Rust CLI application for RFM customer segmentation
//!
//! This library derives Recency, Frequency and Monetary metrics from
//! transaction data, scores each metric into quintiles and maps the scores to
//! named customer segments through a fixed, ordered rule table.

pub mod cli;
pub mod data;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod quantile;
pub mod report;
pub mod score;
pub mod segment;

// Re-export public items for easier access
pub use cli::Args;
pub use data::{load_transactions, transactions_from_frame, ColumnConfig, Transaction};
pub use error::RfmError;
pub use metrics::{aggregate, CustomerMetrics};
pub use pipeline::{analyze_csv, analyze_frame, run_analysis, Prediction, RfmAnalysis, RfmRecord};
pub use quantile::{compute_thresholds, Metric, QuantileThresholds};
pub use score::{score_metrics, RfmScores};
pub use segment::{classify, Segment, SEGMENT_RULES};

/// Common result type used throughout the library
pub type Result<T> = std::result::Result<T, RfmError>;
