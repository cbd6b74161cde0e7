//! Integration tests for SegmentForge

use chrono::{NaiveDate, NaiveDateTime};
use segmentforge::{
    analyze_csv, analyze_frame, load_transactions, run_analysis, ColumnConfig, RfmError, Segment,
};
use std::io::Write;
use tempfile::{tempdir, NamedTempFile};

fn reference() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 7, 1)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap()
}

/// Create a test CSV file with sample sales data
fn create_test_csv() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "prnts_cstmr_id,prf_ymd,ntprc_amt,prdct_nm").unwrap();

    // C100 - frequent, recent, high value
    for day in ["20240625", "20240620", "20240610", "20240601", "20240520", "20240510"] {
        writeln!(file, "C100,{day},150000,Musical").unwrap();
    }

    // C200 - two tickets on the same day
    writeln!(file, "C200,20240415,40000,Concert").unwrap();
    writeln!(file, "C200,20240415,40000,Concert").unwrap();
    writeln!(file, "C200,20240301,35000,Concert").unwrap();

    // C300 - single purchase, recent
    writeln!(file, "C300,20240628,20000,Play").unwrap();

    // C400 - lapsed regular
    writeln!(file, "C400,20231101,60000,Opera").unwrap();
    writeln!(file, "C400,20231015,60000,Opera").unwrap();

    // C500 - single purchase, long ago, low value
    writeln!(file, "C500,20221224,5000,Exhibition").unwrap();

    // C600 - mid-range
    writeln!(file, "C600,20240201,30000,Play").unwrap();
    writeln!(file, "C600,20240105,25000,Play").unwrap();

    file
}

#[test]
fn test_end_to_end_pipeline() {
    let test_file = create_test_csv();

    let analysis = analyze_csv(test_file.path(), &ColumnConfig::default(), reference()).unwrap();

    assert_eq!(analysis.len(), 6);
    let ids: Vec<&str> = analysis
        .records
        .iter()
        .map(|r| r.metrics.customer_id.as_str())
        .collect();
    assert_eq!(ids, ["C100", "C200", "C300", "C400", "C500", "C600"]);

    let c100 = analysis.get("C100").unwrap();
    assert_eq!(c100.metrics.recency, 6);
    assert_eq!(c100.metrics.frequency, 6);
    assert_eq!(c100.metrics.monetary, 900000.0);
    assert_eq!(c100.segment, Segment::Vip);

    // every row counts, including same-day duplicates
    let c200 = analysis.get("C200").unwrap();
    assert_eq!(c200.metrics.frequency, 3);
    assert_eq!(c200.metrics.recency, 77);

    let c500 = analysis.get("C500").unwrap();
    assert_eq!(c500.metrics.frequency, 1);
    assert_eq!(c500.segment, Segment::NeedsAttention);

    for record in &analysis.records {
        for score in [record.scores.r(), record.scores.f(), record.scores.m()] {
            assert!((1..=5).contains(&score));
        }
    }
}

#[test]
fn test_thresholds_are_monotone() {
    let test_file = create_test_csv();
    let analysis = analyze_csv(test_file.path(), &ColumnConfig::default(), reference()).unwrap();

    for metric in segmentforge::Metric::ALL {
        let values = analysis.thresholds.get(metric).values();
        assert!(values.windows(2).all(|w| w[0] <= w[1]), "{metric}: {values:?}");
    }
}

#[test]
fn test_rerun_is_deterministic() {
    let test_file = create_test_csv();
    let transactions = load_transactions(test_file.path(), &ColumnConfig::default()).unwrap();

    let first = run_analysis(&transactions, reference()).unwrap();
    let second = run_analysis(&transactions, reference()).unwrap();

    assert_eq!(first, second);
    assert!(first
        .to_dataframe()
        .unwrap()
        .equals(&second.to_dataframe().unwrap()));
}

#[test]
fn test_csv_export() {
    let test_file = create_test_csv();
    let analysis = analyze_csv(test_file.path(), &ColumnConfig::default(), reference()).unwrap();

    let temp_dir = tempdir().unwrap();
    let output_path = temp_dir.path().join("rfm.csv");
    analysis.write_csv(&output_path).unwrap();

    let contents = std::fs::read_to_string(&output_path).unwrap();
    let mut lines = contents.lines();
    assert_eq!(
        lines.next(),
        Some("customer_id,Recency,Frequency,Monetary,R,F,M,Segment,Description")
    );
    assert_eq!(lines.count(), 6);
    let c100 = contents.lines().find(|l| l.starts_with("C100,")).unwrap();
    assert!(c100.starts_with("C100,6,6,"));
    assert!(c100.contains(",5,5,5,VIP customer,"));
}

#[test]
fn test_frame_input_with_custom_columns() {
    let test_file = create_test_csv();
    let mut df = segmentforge::data::read_csv(test_file.path()).unwrap();
    df.rename("prnts_cstmr_id", "customer".into()).unwrap();
    let columns = ColumnConfig::new("customer", "prf_ymd", "ntprc_amt");

    let analysis = analyze_frame(&df, &columns, reference()).unwrap();
    assert_eq!(analysis.len(), 6);
}

#[test]
fn test_error_handling_missing_column() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "prnts_cstmr_id,prf_ymd").unwrap();
    writeln!(file, "C100,20240625").unwrap();

    let err = analyze_csv(file.path(), &ColumnConfig::default(), reference()).unwrap_err();
    assert!(matches!(err, RfmError::MissingColumn(ref name) if name == "ntprc_amt"));
    assert!(err.to_string().contains("ntprc_amt"));
}

#[test]
fn test_error_handling_malformed_date() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "prnts_cstmr_id,prf_ymd,ntprc_amt").unwrap();
    writeln!(file, "C100,20240625,1000").unwrap();
    writeln!(file, "C200,2024/06/25,1000").unwrap();

    let err = analyze_csv(file.path(), &ColumnConfig::default(), reference()).unwrap_err();
    assert!(err.is_data_format());
    assert!(matches!(err, RfmError::InvalidDate { row: 2, .. }));
}

#[test]
fn test_error_handling_empty_input() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "prnts_cstmr_id,prf_ymd,ntprc_amt").unwrap();

    let err = analyze_csv(file.path(), &ColumnConfig::default(), reference()).unwrap_err();
    assert!(matches!(err, RfmError::InsufficientData(_)));
}
