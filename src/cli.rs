//! Command-line interface definitions and argument parsing

use chrono::{Local, NaiveDate, NaiveDateTime};
use clap::{Parser, ValueEnum};

use crate::data::parse_date;

/// Customer segmentation CLI using quintile RFM scoring
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input CSV file
    #[arg(short, long, default_value = "data.csv")]
    pub input: String,

    /// Write the per-customer results to this CSV file
    #[arg(short, long)]
    pub output: Option<String>,

    /// Date recency is measured from, as YYYYMMDD or YYYY-MM-DD (default: now)
    #[arg(short, long)]
    pub reference_date: Option<String>,

    /// Prediction mode: provide R,F,M values as comma-separated string
    /// Example: --predict "30,10,500.0" for Recency=30, Frequency=10, Monetary=500.0
    #[arg(short, long)]
    pub predict: Option<String>,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl Args {
    /// Parse RFM values from the predict string
    /// Expected format: "recency,frequency,monetary"
    pub fn parse_rfm_values(&self) -> anyhow::Result<Option<(f64, f64, f64)>> {
        let Some(ref predict_str) = self.predict else {
            return Ok(None);
        };

        let parts: Vec<&str> = predict_str.split(',').collect();
        if parts.len() != 3 {
            anyhow::bail!("Predict values must be in format 'recency,frequency,monetary'");
        }

        let parse = |label: &str, raw: &str| -> anyhow::Result<f64> {
            raw.trim()
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| anyhow::anyhow!("Invalid {label} value: {raw}"))
        };

        Ok(Some((
            parse("recency", parts[0])?,
            parse("frequency", parts[1])?,
            parse("monetary", parts[2])?,
        )))
    }

    /// Reference timestamp for recency: the given date at midnight, or the
    /// local wall clock
    pub fn reference_timestamp(&self) -> anyhow::Result<NaiveDateTime> {
        match self.reference_date.as_deref() {
            None => Ok(Local::now().naive_local()),
            Some(raw) => {
                let date = parse_date(raw)
                    .or_else(|| NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok())
                    .ok_or_else(|| anyhow::anyhow!("Invalid reference date: {raw}"))?;
                date.and_hms_opt(0, 0, 0)
                    .ok_or_else(|| anyhow::anyhow!("Invalid reference date: {raw}"))
            }
        }
    }
}
