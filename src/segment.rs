//! Customer segments and the ordered rule table that assigns them
//!
//! Rules are checked top to bottom and the first match wins. Several
//! conditions overlap (a 5/5/5 customer also satisfies the loyal rule), so
//! the order of [`SEGMENT_RULES`] is part of the classification.

use std::fmt;
use std::ops::RangeInclusive;

use crate::score::RfmScores;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Segment {
    Vip,
    Loyal,
    RecentPurchase,
    Potential,
    NeedsAttention,
    General,
    LowActivity,
    AtRisk,
}

impl Segment {
    pub const ALL: [Segment; 8] = [
        Segment::Vip,
        Segment::Loyal,
        Segment::RecentPurchase,
        Segment::Potential,
        Segment::NeedsAttention,
        Segment::General,
        Segment::LowActivity,
        Segment::AtRisk,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Segment::Vip => "VIP customer",
            Segment::Loyal => "Loyal customer",
            Segment::RecentPurchase => "Recent-purchase customer",
            Segment::Potential => "Potential customer",
            Segment::NeedsAttention => "Needs-attention customer",
            Segment::General => "General customer",
            Segment::LowActivity => "Low-activity customer",
            Segment::AtRisk => "At-risk customer",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Segment::Vip => "Top scores across the board; the most valuable customers.",
            Segment::Loyal => "Buys often and spends a substantial amount.",
            Segment::RecentPurchase => {
                "Bought for the first time recently or is likely to buy again."
            }
            Segment::Potential => "Low purchase frequency and spend, but bought recently.",
            Segment::NeedsAttention => "Has not bought in a long time; low frequency and spend.",
            Segment::General => "Shows an ordinary, average spending pattern.",
            Segment::LowActivity => {
                "Used to buy often and spend well but has not bought recently."
            }
            Segment::AtRisk => "Purchase frequency has dropped; likely to churn.",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One row of the classification table: inclusive score ranges for R, F and M
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentRule {
    pub r: RangeInclusive<u8>,
    pub f: RangeInclusive<u8>,
    pub m: RangeInclusive<u8>,
    pub segment: Segment,
}

impl SegmentRule {
    pub fn matches(&self, scores: &RfmScores) -> bool {
        self.r.contains(&scores.r()) && self.f.contains(&scores.f()) && self.m.contains(&scores.m())
    }
}

/// Assigned when no rule matches
pub const DEFAULT_SEGMENT: Segment = Segment::General;

#[rustfmt::skip]
pub const SEGMENT_RULES: [SegmentRule; 8] = [
    SegmentRule { r: 5..=5, f: 5..=5, m: 5..=5, segment: Segment::Vip },
    SegmentRule { r: 4..=5, f: 4..=5, m: 3..=5, segment: Segment::Loyal },
    SegmentRule { r: 5..=5, f: 1..=3, m: 1..=3, segment: Segment::RecentPurchase },
    SegmentRule { r: 3..=4, f: 1..=3, m: 1..=3, segment: Segment::Potential },
    SegmentRule { r: 1..=1, f: 1..=2, m: 1..=2, segment: Segment::NeedsAttention },
    SegmentRule { r: 2..=3, f: 2..=3, m: 2..=3, segment: Segment::General },
    SegmentRule { r: 1..=2, f: 2..=5, m: 2..=5, segment: Segment::LowActivity },
    SegmentRule { r: 1..=2, f: 1..=2, m: 2..=5, segment: Segment::AtRisk },
];

/// Index into [`SEGMENT_RULES`] of the first matching rule
pub fn matching_rule(scores: &RfmScores) -> Option<usize> {
    SEGMENT_RULES.iter().position(|rule| rule.matches(scores))
}

pub fn classify(scores: &RfmScores) -> Segment {
    matching_rule(scores)
        .map(|index| SEGMENT_RULES[index].segment)
        .unwrap_or(DEFAULT_SEGMENT)
}
