use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub date: NaiveDate,
    pub weight: f64,
}

impl Sample {
    pub fn new(date: NaiveDate, weight: f64) -> Self {
        Self { date, weight }
    }
}

/// Samples ordered by date, oldest first.
pub type Series = Vec<Sample>;

/// A signed difference split into its magnitude and direction.
///
/// The magnitude is kept unrounded; two-decimal rounding only happens when
/// the value is displayed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Delta {
    pub magnitude: f64,
    pub non_negative: bool,
}

impl Delta {
    pub fn zero() -> Self {
        Self {
            magnitude: 0.0,
            non_negative: true,
        }
    }

    pub fn from_signed(value: f64) -> Self {
        Self {
            magnitude: value.abs(),
            non_negative: value >= 0.0,
        }
    }

    pub fn signed(&self) -> f64 {
        if self.non_negative {
            self.magnitude
        } else {
            -self.magnitude
        }
    }
}

impl Default for Delta {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Delta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.magnitude)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetricsResult {
    pub sample_count: usize,
    pub actual: Option<f64>,
    pub first: Option<f64>,
    pub change: Delta,
    pub total: Delta,
    pub trend_week: Delta,
    pub this_week: Delta,
    pub this_month: Delta,
    /// Entries per calendar day spanned, as a percentage.
    pub consistency: Option<f64>,
}

impl MetricsResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.sample_count == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MarkerKind {
    LocalMaximum,
    LocalMinimum,
    SeriesMinimum,
    SeriesMaximum,
    MonthBoundary,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    pub index: usize,
    pub kind: MarkerKind,
    /// Month name, set only on month boundaries.
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChartAnnotations {
    pub markers: Vec<Marker>,
}

impl ChartAnnotations {
    pub fn of_kind(&self, kind: MarkerKind) -> impl Iterator<Item = &Marker> {
        self.markers.iter().filter(move |marker| marker.kind == kind)
    }
}

/// Goal weight, supplied from configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    pub kilograms: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_keeps_sign_exactly() {
        let value = 69.3 - 70.1;
        let delta = Delta::from_signed(value);
        assert!(!delta.non_negative);
        assert_eq!(delta.signed(), value);
    }

    #[test]
    fn zero_delta_counts_as_non_negative() {
        assert!(Delta::from_signed(0.0).non_negative);
        assert_eq!(Delta::zero(), Delta::default());
    }

    #[test]
    fn delta_displays_two_decimals() {
        assert_eq!(Delta::from_signed(-1.005_1).to_string(), "1.01");
        assert_eq!(Delta::from_signed(3.0).to_string(), "3.00");
    }

    #[test]
    fn marker_kind_names_are_kebab_case() {
        let json = serde_json::to_string(&MarkerKind::MonthBoundary).unwrap();
        assert_eq!(json, "\"month-boundary\"");
    }
}
