//! SegmentForge: Customer segmentation CLI using quintile RFM scoring
//!
//! This is the main entrypoint that orchestrates data loading, scoring,
//! classification, reporting and prediction.

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use segmentforge::cli::LogFormat;
use segmentforge::{analyze_csv, report, Args, ColumnConfig};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

fn init_logging(args: &Args) {
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    match args.log_format {
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Json => builder.json().init(),
    }
}

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse();
    init_logging(&args);

    // Check if in prediction mode
    if let Some(rfm_values) = args.parse_rfm_values()? {
        run_prediction_mode(&args, rfm_values)?;
    } else {
        run_full_pipeline(&args)?;
    }

    Ok(())
}

/// Run prediction mode for a single customer
fn run_prediction_mode(args: &Args, rfm_values: (f64, f64, f64)) -> Result<()> {
    println!("=== Prediction Mode ===");
    println!(
        "Input RFM values: R={}, F={}, M={}",
        rfm_values.0, rfm_values.1, rfm_values.2
    );

    let start_time = Instant::now();
    let reference = args.reference_timestamp()?;

    // Fit quantile thresholds on the input data
    info!(input = %args.input, %reference, "fitting quantile thresholds");
    let analysis = analyze_csv(&args.input, &ColumnConfig::default(), reference)
        .with_context(|| format!("failed to analyse {}", args.input))?;
    debug!(customers = analysis.len(), "thresholds fitted");

    let prediction = analysis.predict(rfm_values.0, rfm_values.1, rfm_values.2);
    let elapsed = start_time.elapsed();

    println!("\n{}", report::format_prediction(&prediction));
    println!("  Processing time: {:.2}s", elapsed.as_secs_f64());
    println!("\n{}", report::format_thresholds(&analysis));

    Ok(())
}

/// Run full segmentation pipeline
fn run_full_pipeline(args: &Args) -> Result<()> {
    println!("=== RFM Segmentation Pipeline ===\n");

    let start_time = Instant::now();
    let reference = args.reference_timestamp()?;

    info!(input = %args.input, %reference, "loading transactions");
    let analysis = analyze_csv(&args.input, &ColumnConfig::default(), reference)
        .with_context(|| format!("failed to analyse {}", args.input))?;
    println!("✓ Customers segmented: {}", analysis.len());

    let df = analysis.to_dataframe()?;
    println!("\n{df}");

    report::print_report(&analysis);

    if let Some(output) = &args.output {
        analysis
            .write_csv(output)
            .with_context(|| format!("failed to write {output}"))?;
        println!("Results saved to: {output}");
    }

    let total_time = start_time.elapsed();
    println!("\n=== Pipeline Complete ===");
    println!("Total processing time: {:.2}s", total_time.as_secs_f64());

    Ok(())
}
