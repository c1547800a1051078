use serde::{Deserialize, Serialize};

/// Half-open reference interval covered by one or more hits
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Interval {
    pub start: u64,
    pub end: u64,
}

impl Interval {
    /// Create an interval, swapping the bounds if given in reverse
    #[must_use]
    pub fn new(start: u64, end: u64) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self { start: end, end: start }
        }
    }

    /// Covered length, `end - start`. Coordinates are 1-based inclusive, so
    /// an interval misses one position: 1..100 has length 99.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Fraction of a gene covered by merged hits.
///
/// `Undefined` is a state of its own: it is never read as 0 or 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "value")]
pub enum Coverage {
    Fraction(f64),
    /// Gene length unknown
    Undefined,
}

impl Coverage {
    #[must_use]
    pub fn fraction(&self) -> Option<f64> {
        match self {
            Self::Fraction(f) => Some(*f),
            Self::Undefined => None,
        }
    }

    #[must_use]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// Whether this coverage clears `cutoff`; undefined coverage always does
    #[must_use]
    pub fn passes(&self, cutoff: f64) -> bool {
        match self {
            Self::Fraction(f) => *f >= cutoff,
            Self::Undefined => true,
        }
    }
}

impl std::fmt::Display for Coverage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fraction(v) => write!(f, "{v:.4}"),
            Self::Undefined => write!(f, "NA"),
        }
    }
}

/// Coverage of one reference gene by its merged hit intervals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneCoverageRecord {
    pub reference_id: String,

    /// Sorted by start, pairwise non-overlapping
    pub intervals: Vec<Interval>,

    pub covered_length: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gene_length: Option<u64>,

    pub coverage: Coverage,
}

/// A reference gene accepted as present in the sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArgCall {
    pub reference_id: String,

    /// Curated gene name, or the reference id when none is known
    pub gene_name: String,

    /// Majority-vote category across the group's predictions
    pub predicted_category: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mechanism: Option<String>,

    pub best_identity: f64,

    pub best_probability: f64,

    pub best_evalue: f64,

    /// Distinct query ids contributing hits
    pub read_count: u64,

    pub hit_count: u64,

    pub coverage: GeneCoverageRecord,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_new_swaps_reversed_bounds() {
        let interval = Interval::new(260, 180);
        assert_eq!(interval.start, 180);
        assert_eq!(interval.end, 260);
        assert_eq!(interval.len(), 80);
    }

    #[test]
    fn test_full_span_length_is_one_short() {
        assert_eq!(Interval::new(1, 100).len(), 99);
        assert_eq!(Interval::new(5, 5).len(), 0);
    }

    #[test]
    fn test_undefined_coverage_passes_any_cutoff() {
        assert!(Coverage::Undefined.passes(1.0));
        assert!(Coverage::Fraction(0.5).passes(0.5));
        assert!(!Coverage::Fraction(0.49).passes(0.5));
        assert_eq!(Coverage::Undefined.fraction(), None);
        assert_eq!(Coverage::Undefined.to_string(), "NA");
    }
}
