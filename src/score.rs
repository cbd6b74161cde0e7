//! Quintile scoring of raw RFM values

use std::fmt;

use crate::error::RfmError;
use crate::metrics::CustomerMetrics;
use crate::quantile::{MetricThresholds, QuantileThresholds};

pub const MIN_SCORE: u8 = 1;
pub const MAX_SCORE: u8 = 5;

/// Which end of a metric is better
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Smaller values score higher (recency)
    LowerIsBetter,
    /// Larger values score higher (frequency, monetary)
    HigherIsBetter,
}

/// R, F and M scores, each within 1..=5
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RfmScores {
    r: u8,
    f: u8,
    m: u8,
}

impl RfmScores {
    pub fn new(r: u8, f: u8, m: u8) -> crate::Result<Self> {
        for score in [r, f, m] {
            if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
                return Err(RfmError::ScoreOutOfRange(score));
            }
        }
        Ok(Self { r, f, m })
    }

    pub fn r(&self) -> u8 {
        self.r
    }

    pub fn f(&self) -> u8 {
        self.f
    }

    pub fn m(&self) -> u8 {
        self.m
    }

    /// Every valid score triple, R varying slowest
    pub fn all() -> impl Iterator<Item = RfmScores> {
        let range = MIN_SCORE..=MAX_SCORE;
        range.clone().flat_map(move |r| {
            let range = range.clone();
            range
                .clone()
                .flat_map(move |f| range.clone().map(move |m| RfmScores { r, f, m }))
        })
    }
}

impl fmt::Display for RfmScores {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{}F{}M{}", self.r, self.f, self.m)
    }
}

/// Map a value to its quintile tier
///
/// Brackets are upper-inclusive: a value equal to a boundary falls in the
/// lower bracket.
pub fn score(value: f64, thresholds: &MetricThresholds, direction: Direction) -> u8 {
    let bracket = thresholds
        .values()
        .iter()
        .position(|&boundary| value <= boundary)
        .unwrap_or(thresholds.values().len()) as u8;

    match direction {
        Direction::HigherIsBetter => MIN_SCORE + bracket,
        Direction::LowerIsBetter => MAX_SCORE - bracket,
    }
}

pub fn recency_score(recency: f64, thresholds: &MetricThresholds) -> u8 {
    score(recency, thresholds, Direction::LowerIsBetter)
}

pub fn frequency_monetary_score(value: f64, thresholds: &MetricThresholds) -> u8 {
    score(value, thresholds, Direction::HigherIsBetter)
}

/// Score raw metric values against fitted thresholds
pub fn score_values(
    recency: f64,
    frequency: f64,
    monetary: f64,
    thresholds: &QuantileThresholds,
) -> RfmScores {
    RfmScores {
        r: recency_score(recency, &thresholds.recency),
        f: frequency_monetary_score(frequency, &thresholds.frequency),
        m: frequency_monetary_score(monetary, &thresholds.monetary),
    }
}

pub fn score_metrics(metrics: &CustomerMetrics, thresholds: &QuantileThresholds) -> RfmScores {
    score_values(
        f64::from(metrics.recency),
        f64::from(metrics.frequency),
        metrics.monetary,
        thresholds,
    )
}
