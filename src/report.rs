//! Console report of segment statistics and quantile boundaries

use crate::pipeline::{Prediction, RfmAnalysis};
use crate::quantile::{Metric, QUANTILE_LEVELS};

/// Segment sizes and mean metrics as a text table
pub fn format_segment_statistics(analysis: &RfmAnalysis) -> String {
    let mut lines = vec![
        "=== Segment Statistics ===".to_string(),
        format!("Total customers: {}", analysis.len()),
        String::new(),
        format!(
            "  {:<26} | {:>9} | {:>6} | {:>7} | {:>9} | {:>12}",
            "Segment", "Customers", "Share", "Recency", "Frequency", "Monetary"
        ),
        format!(
            "  {:-<26}-|-{:-<9}-|-{:-<6}-|-{:-<7}-|-{:-<9}-|-{:-<12}",
            "", "", "", "", "", ""
        ),
    ];

    lines.extend(analysis.segment_summary().iter().map(|summary| {
        format!(
            "  {:<26} | {:>9} | {:>5.1}% | {:>7.1} | {:>9.1} | {:>12.2}",
            summary.segment.name(),
            summary.customers,
            summary.share * 100.0,
            summary.mean_recency,
            summary.mean_frequency,
            summary.mean_monetary
        )
    }));

    lines.join("\n")
}

/// Quintile boundaries per metric as a text table
pub fn format_thresholds(analysis: &RfmAnalysis) -> String {
    let mut header = format!("  {:<9}", "Metric");
    for level in QUANTILE_LEVELS {
        header.push_str(&format!(" | {:>12}", format!("p{:.0}", level * 100.0)));
    }

    let mut lines = vec!["=== Quantile Thresholds ===".to_string(), header];
    for metric in Metric::ALL {
        let mut line = format!("  {:<9}", metric.name());
        for (_, value) in analysis.thresholds.get(metric).iter() {
            line.push_str(&format!(" | {value:>12.2}"));
        }
        lines.push(line);
    }

    lines.join("\n")
}

pub fn format_prediction(prediction: &Prediction) -> String {
    format!(
        "Scores: R={} F={} M={}\nSegment: {}\n  {}",
        prediction.scores.r(),
        prediction.scores.f(),
        prediction.scores.m(),
        prediction.segment.name(),
        prediction.segment.description()
    )
}

/// Print the full report to stdout
pub fn print_report(analysis: &RfmAnalysis) {
    println!("\n{}", format_segment_statistics(analysis));
    println!("{}", format_thresholds(analysis));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Transaction;
    use crate::pipeline::run_analysis;
    use chrono::NaiveDate;

    fn analysis() -> RfmAnalysis {
        let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
        let transactions = vec![
            Transaction::new("A", day(30), 900.0),
            Transaction::new("A", day(29), 100.0),
            Transaction::new("B", day(15), 50.0),
            Transaction::new("C", day(2), 10.0),
        ];
        run_analysis(&transactions, day(31).and_hms_opt(12, 0, 0).unwrap()).unwrap()
    }

    #[test]
    fn test_format_segment_statistics() {
        let analysis = analysis();
        let text = format_segment_statistics(&analysis);

        assert!(text.contains("Total customers: 3"));
        let summaries = analysis.segment_summary();
        for summary in &summaries {
            assert!(text.contains(summary.segment.name()));
        }
        // title, total, blank, header, rule, one row per segment
        assert_eq!(text.lines().count(), 5 + summaries.len());
    }

    #[test]
    fn test_format_thresholds() {
        let text = format_thresholds(&analysis());

        assert!(text.contains("p20"));
        assert!(text.contains("p80"));
        assert_eq!(text.lines().count(), 2 + Metric::ALL.len());
        for metric in Metric::ALL {
            assert!(text.contains(metric.name()));
        }
    }

    #[test]
    fn test_format_prediction() {
        let prediction = analysis().predict(0.0, 10.0, 10_000.0);
        let text = format_prediction(&prediction);

        assert!(text.starts_with("Scores: R=5 F=5 M=5"));
        assert!(text.contains("VIP customer"));
    }
}
