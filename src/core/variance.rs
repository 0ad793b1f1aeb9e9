//! Variance severity rules.
//!
//! Two threshold sets apply to the same metric: the four-level [`Severity`]
//! used for histogram buckets, and the two-threshold [`RowHighlight`] used
//! when colouring individual reconciliation rows. They disagree between 1%
//! and 2% (and at exactly 2%), so callers pick the rule for their context.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Histogram severity of an absolute variance percentage
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum Severity {
    Normal,
    Moderate,
    High,
    Critical,
}

impl Severity {
    pub fn label(self) -> &'static str {
        self.bucket().label
    }

    /// The histogram bucket this severity is counted in
    pub fn bucket(self) -> &'static VarianceBucket {
        &BUCKETS[self as usize]
    }
}

/// A half-open range `[min, max)` of absolute variance percentage
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VarianceBucket {
    pub severity: Severity,
    pub min: f64,
    pub max: f64,
    pub label: &'static str,
    pub color_tag: &'static str,
}

impl VarianceBucket {
    pub fn contains(&self, abs_variance: f64) -> bool {
        self.min <= abs_variance && abs_variance < self.max
    }

    /// Range as shown in the analytics tab, e.g. `1-2%`
    pub fn range_label(&self) -> String {
        if self.max >= 100.0 {
            format!("{}%+", self.min)
        } else if self.min == 0.0 {
            format!("<{}%", self.max)
        } else {
            format!("{}-{}%", self.min, self.max)
        }
    }
}

/// Fixed, ascending, non-overlapping buckets covering `[0, 100)`
pub const VARIANCE_BUCKETS: [VarianceBucket; 4] = [
    VarianceBucket {
        severity: Severity::Normal,
        min: 0.0,
        max: 1.0,
        label: "Normal",
        color_tag: "green",
    },
    VarianceBucket {
        severity: Severity::Moderate,
        min: 1.0,
        max: 2.0,
        label: "Moderate",
        color_tag: "yellow",
    },
    VarianceBucket {
        severity: Severity::High,
        min: 2.0,
        max: 5.0,
        label: "High",
        color_tag: "orange",
    },
    VarianceBucket {
        severity: Severity::Critical,
        min: 5.0,
        max: 100.0,
        label: "Critical",
        color_tag: "red",
    },
];

static BUCKETS: [VarianceBucket; 4] = VARIANCE_BUCKETS;

/// Classify an absolute variance percentage.
///
/// Values at or above 100% are `Critical`; a negative input is classified by
/// its magnitude.
pub fn classify(abs_variance_pct: f64) -> Severity {
    let v = abs_variance_pct.abs();
    if v < 1.0 {
        Severity::Normal
    } else if v < 2.0 {
        Severity::Moderate
    } else if v < 5.0 {
        Severity::High
    } else {
        Severity::Critical
    }
}

/// Row colour in the reconciliations table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RowHighlight {
    Green,
    Yellow,
    Red,
}

impl RowHighlight {
    pub fn as_str(self) -> &'static str {
        match self {
            RowHighlight::Green => "green",
            RowHighlight::Yellow => "yellow",
            RowHighlight::Red => "red",
        }
    }
}

/// `>2% → red`, `>1% → yellow`, otherwise green
pub fn row_highlight(variance_pct: f64) -> RowHighlight {
    let v = variance_pct.abs();
    if v > 2.0 {
        RowHighlight::Red
    } else if v > 1.0 {
        RowHighlight::Yellow
    } else {
        RowHighlight::Green
    }
}

/// Whether a row is flagged red in the reconciliations table
pub fn is_high_variance(variance_pct: f64) -> bool {
    row_highlight(variance_pct) == RowHighlight::Red
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_boundaries_are_half_open() {
        assert_eq!(classify(0.0), Severity::Normal);
        assert_eq!(classify(0.5), Severity::Normal);
        assert_eq!(classify(1.0), Severity::Moderate);
        assert_eq!(classify(2.0), Severity::High);
        assert_eq!(classify(4.999), Severity::High);
        assert_eq!(classify(5.0), Severity::Critical);
        assert_eq!(classify(99.9), Severity::Critical);
    }

    #[test]
    fn classify_is_open_ended_above_100() {
        assert_eq!(classify(100.0), Severity::Critical);
        assert_eq!(classify(250.0), Severity::Critical);
    }

    #[test]
    fn classify_uses_magnitude() {
        assert_eq!(classify(-3.0), Severity::High);
    }

    #[test]
    fn classify_agrees_with_buckets() {
        for v in [0.0, 0.99, 1.0, 1.5, 2.0, 3.7, 5.0, 42.0, 99.99] {
            let bucket = VARIANCE_BUCKETS.iter().find(|b| b.contains(v)).unwrap();
            assert_eq!(bucket.severity, classify(v), "variance {v}");
        }
    }

    #[test]
    fn buckets_are_ascending_and_contiguous() {
        assert_eq!(VARIANCE_BUCKETS[0].min, 0.0);
        assert_eq!(VARIANCE_BUCKETS[3].max, 100.0);
        for pair in VARIANCE_BUCKETS.windows(2) {
            assert_eq!(pair[0].max, pair[1].min);
        }
        for bucket in &VARIANCE_BUCKETS {
            assert_eq!(bucket.severity.bucket(), bucket);
            assert_eq!(bucket.severity.label(), bucket.label);
        }
    }

    #[test]
    fn row_highlight_uses_its_own_thresholds() {
        assert_eq!(row_highlight(0.5), RowHighlight::Green);
        assert_eq!(row_highlight(1.0), RowHighlight::Green);
        assert_eq!(row_highlight(1.5), RowHighlight::Yellow);
        assert_eq!(row_highlight(2.0), RowHighlight::Yellow);
        assert_eq!(row_highlight(2.01), RowHighlight::Red);
        assert_eq!(row_highlight(-6.0), RowHighlight::Red);

        // same value, different rule
        assert_eq!(classify(2.0), Severity::High);
        assert!(!is_high_variance(2.0));
    }

    #[test]
    fn range_labels() {
        let labels: Vec<_> = VARIANCE_BUCKETS.iter().map(|b| b.range_label()).collect();
        assert_eq!(labels, vec!["<1%", "1-2%", "2-5%", "5%+"]);
    }
}
