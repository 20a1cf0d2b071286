use crate::error::{DashboardError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Days-since-last-order band a customer falls into.
///
/// Variants are declared in ascending order so the derived `Ord` matches
/// the order of the bands on the day axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RecencyBucket {
    #[serde(rename = "0-10 dias")]
    UpTo10,
    #[serde(rename = "11-20 dias")]
    From11To20,
    #[serde(rename = "21-30 dias")]
    From21To30,
    #[serde(rename = "31+ dias")]
    Over30,
}

impl RecencyBucket {
    pub const ALL: [RecencyBucket; 4] = [
        RecencyBucket::UpTo10,
        RecencyBucket::From11To20,
        RecencyBucket::From21To30,
        RecencyBucket::Over30,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RecencyBucket::UpTo10 => "0-10 dias",
            RecencyBucket::From11To20 => "11-20 dias",
            RecencyBucket::From21To30 => "21-30 dias",
            RecencyBucket::Over30 => "31+ dias",
        }
    }

    /// Exact label lookup, used for the campaign join. `FromStr` is the
    /// lenient form meant for typed input.
    pub fn from_label(label: &str) -> Option<Self> {
        RecencyBucket::ALL.iter().copied().find(|bucket| bucket.label() == label)
    }

    /// Overflow band; customers here are treated as inactive.
    pub fn is_overflow(&self) -> bool {
        matches!(self, RecencyBucket::Over30)
    }
}

/// Map a day count to its bucket. Upper bounds are inclusive.
///
/// Negative counts (an order dated after `today`) land in the first bucket.
pub fn classify(days: i64) -> RecencyBucket {
    if days <= 10 {
        RecencyBucket::UpTo10
    } else if days <= 20 {
        RecencyBucket::From11To20
    } else if days <= 30 {
        RecencyBucket::From21To30
    } else {
        RecencyBucket::Over30
    }
}

impl fmt::Display for RecencyBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RecencyBucket {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        RecencyBucket::ALL
            .iter()
            .copied()
            .find(|bucket| bucket.label().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| DashboardError::InvalidInput(format!("unknown recency bucket '{s}'")))
    }
}
