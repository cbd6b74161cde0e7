//! Quintile boundaries for each RFM metric

use std::fmt;

use tracing::{debug, warn};

use crate::error::RfmError;
use crate::metrics::CustomerMetrics;

/// Quantile levels that separate the five score tiers
pub const QUANTILE_LEVELS: [f64; 4] = [0.2, 0.4, 0.6, 0.8];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Recency,
    Frequency,
    Monetary,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Recency, Metric::Frequency, Metric::Monetary];

    pub fn name(&self) -> &'static str {
        match self {
            Metric::Recency => "Recency",
            Metric::Frequency => "Frequency",
            Metric::Monetary => "Monetary",
        }
    }

    pub fn value(&self, metrics: &CustomerMetrics) -> f64 {
        match self {
            Metric::Recency => f64::from(metrics.recency),
            Metric::Frequency => f64::from(metrics.frequency),
            Metric::Monetary => metrics.monetary,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Values of one metric at the 20th, 40th, 60th and 80th percentiles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricThresholds([f64; 4]);

impl MetricThresholds {
    pub fn new(values: [f64; 4]) -> Self {
        Self(values)
    }

    /// Threshold at one of [`QUANTILE_LEVELS`]
    pub fn at(&self, level: f64) -> Option<f64> {
        QUANTILE_LEVELS
            .iter()
            .position(|&l| (l - level).abs() < f64::EPSILON)
            .map(|i| self.0[i])
    }

    pub fn values(&self) -> &[f64; 4] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        QUANTILE_LEVELS.iter().copied().zip(self.0.iter().copied())
    }
}

/// Quintile boundaries for all three metrics, fitted on one customer set
#[derive(Debug, Clone, PartialEq)]
pub struct QuantileThresholds {
    pub recency: MetricThresholds,
    pub frequency: MetricThresholds,
    pub monetary: MetricThresholds,
}

impl QuantileThresholds {
    pub fn get(&self, metric: Metric) -> &MetricThresholds {
        match metric {
            Metric::Recency => &self.recency,
            Metric::Frequency => &self.frequency,
            Metric::Monetary => &self.monetary,
        }
    }
}

/// Compute the quintile boundaries of every metric
///
/// Fails when there are no customers. Small inputs are fine: boundaries may
/// coincide.
pub fn compute_thresholds(customers: &[CustomerMetrics]) -> crate::Result<QuantileThresholds> {
    if customers.is_empty() {
        return Err(RfmError::InsufficientData(
            "no customers to compute quantiles from".to_string(),
        ));
    }
    if customers.len() < QUANTILE_LEVELS.len() + 1 {
        warn!(
            customers = customers.len(),
            "fewer customers than score tiers, quantile boundaries will coincide"
        );
    }

    let metric_thresholds = |metric: Metric| {
        let mut values: Vec<f64> = customers.iter().map(|c| metric.value(c)).collect();
        values.sort_by(f64::total_cmp);
        MetricThresholds(QUANTILE_LEVELS.map(|q| percentile(&values, q)))
    };

    let thresholds = QuantileThresholds {
        recency: metric_thresholds(Metric::Recency),
        frequency: metric_thresholds(Metric::Frequency),
        monetary: metric_thresholds(Metric::Monetary),
    };

    debug!(?thresholds, "computed quantile thresholds");
    Ok(thresholds)
}

/// Linearly interpolated quantile `q` (0.0..=1.0) of an ascending slice
///
/// The interpolated value is clamped to its two neighbouring order statistics
/// so results stay monotone in `q` despite rounding. Returns NaN for an empty
/// slice.
pub fn percentile(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => return f64::NAN,
        1 => return sorted[0],
        _ => {}
    }

    let rank = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = (rank.ceil() as usize).min(sorted.len() - 1);
    let frac = rank - lower as f64;

    let (low, high) = (sorted[lower], sorted[upper]);
    (low + (high - low) * frac).clamp(low, high)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn customer(recency: u32, frequency: u32, monetary: f64) -> CustomerMetrics {
        CustomerMetrics {
            customer_id: format!("{recency}-{frequency}-{monetary}"),
            recency,
            frequency,
            monetary,
        }
    }

    #[test]
    fn test_percentile_linear_interpolation() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        let expected = [1.8, 2.6, 3.4, 4.2];

        for (q, want) in QUANTILE_LEVELS.iter().zip(expected) {
            assert!((percentile(&values, *q) - want).abs() < 1e-12);
        }
        assert_eq!(percentile(&values, 0.0), 1.0);
        assert_eq!(percentile(&values, 1.0), 5.0);
    }

    #[test]
    fn test_percentile_exact_rank() {
        // rank 0.25 * 4 = 1 lands on an order statistic
        assert_eq!(percentile(&[10.0, 20.0, 30.0, 40.0, 50.0], 0.25), 20.0);
    }

    #[test]
    fn test_compute_thresholds() {
        let customers = vec![
            customer(1, 5, 500.0),
            customer(10, 4, 400.0),
            customer(20, 3, 300.0),
            customer(30, 2, 200.0),
            customer(40, 1, 100.0),
        ];

        let thresholds = compute_thresholds(&customers).unwrap();

        for (got, want) in thresholds.frequency.values().iter().zip([1.8, 2.6, 3.4, 4.2]) {
            assert!((got - want).abs() < 1e-9);
        }
        assert!((thresholds.recency.at(0.2).unwrap() - 8.2).abs() < 1e-9);
        assert!((thresholds.monetary.at(0.8).unwrap() - 420.0).abs() < 1e-9);
        assert_eq!(thresholds.recency.at(0.5), None);
    }

    #[test]
    fn test_single_customer_thresholds_coincide() {
        let thresholds = compute_thresholds(&[customer(7, 1, 42.0)]).unwrap();

        for metric in Metric::ALL {
            let values = thresholds.get(metric).values();
            assert!(values.iter().all(|v| *v == values[0]));
        }
        assert_eq!(thresholds.recency.values(), &[7.0; 4]);
    }

    #[test]
    fn test_empty_input_is_insufficient_data() {
        let err = compute_thresholds(&[]).unwrap_err();
        assert!(matches!(err, RfmError::InsufficientData(_)));
    }

    proptest! {
        #[test]
        fn thresholds_are_monotone(
            rows in prop::collection::vec((0u32..3650, 1u32..500, 0.0f64..1.0e7), 1..200)
        ) {
            let customers: Vec<_> = rows
                .into_iter()
                .map(|(r, f, m)| customer(r, f, m))
                .collect();
            let thresholds = compute_thresholds(&customers).unwrap();

            for metric in Metric::ALL {
                let values = thresholds.get(metric).values();
                for pair in values.windows(2) {
                    prop_assert!(pair[0] <= pair[1], "{metric}: {values:?}");
                }
            }
        }
    }
}
