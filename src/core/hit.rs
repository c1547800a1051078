use serde::{Deserialize, Serialize};

/// One pairwise alignment between a query sequence and a reference gene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentHit {
    /// Query sequence id (read or gene)
    pub query_id: String,

    /// Reference gene id from the ARG database
    pub reference_id: String,

    /// Percent identity, 0-100
    pub identity_pct: f64,

    /// Alignment length in columns
    pub alignment_length: u64,

    pub mismatches: u64,

    pub gap_opens: u64,

    /// Query coordinates, normalized so that start <= end
    pub query_start: u64,
    pub query_end: u64,

    /// Reference coordinates, normalized so that start <= end
    pub reference_start: u64,
    pub reference_end: u64,

    /// True when the aligner reported the query coordinates reversed
    #[serde(default)]
    pub query_reversed: bool,

    pub e_value: f64,

    pub bit_score: f64,
}

impl AlignmentHit {
    /// Number of query positions spanned by the alignment
    #[must_use]
    pub fn query_span(&self) -> u64 {
        self.query_end - self.query_start + 1
    }

    /// Number of reference positions spanned by the alignment
    #[must_use]
    pub fn reference_span(&self) -> u64 {
        self.reference_end - self.reference_start + 1
    }
}

/// A hit that passed the alignment cutoffs.
///
/// Only [`crate::filtering::HitFilter`] constructs these, so anything handed
/// to a classifier is known to have cleared identity, e-value and overlap.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredHit(AlignmentHit);

impl FilteredHit {
    pub(crate) fn new(hit: AlignmentHit) -> Self {
        Self(hit)
    }

    #[must_use]
    pub fn hit(&self) -> &AlignmentHit {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> AlignmentHit {
        self.0
    }
}

impl std::ops::Deref for FilteredHit {
    type Target = AlignmentHit;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// A filtered hit together with the classifier's verdict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredHit {
    #[serde(flatten)]
    pub hit: AlignmentHit,

    /// Probability that the hit is a true ARG, in [0, 1]
    pub probability: f64,

    /// Predicted ARG category (antibiotic class)
    pub predicted_category: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predicted_mechanism: Option<String>,
}

impl ScoredHit {
    pub fn new(hit: FilteredHit, probability: f64, category: impl Into<String>) -> Self {
        Self {
            hit: hit.into_inner(),
            probability,
            predicted_category: category.into(),
            predicted_mechanism: None,
        }
    }

    #[must_use]
    pub fn with_mechanism(mut self, mechanism: Option<String>) -> Self {
        self.predicted_mechanism = mechanism;
        self
    }

    pub fn query_id(&self) -> &str {
        &self.hit.query_id
    }

    pub fn reference_id(&self) -> &str {
        &self.hit.reference_id
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::AlignmentHit;

    /// Build a hit with the fields the pipeline stages look at
    pub fn hit(
        query: &str,
        reference: &str,
        identity: f64,
        e_value: f64,
        ref_range: (u64, u64),
    ) -> AlignmentHit {
        let (reference_start, reference_end) = ref_range;
        let length = reference_end - reference_start + 1;
        AlignmentHit {
            query_id: query.to_string(),
            reference_id: reference.to_string(),
            identity_pct: identity,
            alignment_length: length,
            mismatches: 0,
            gap_opens: 0,
            query_start: 1,
            query_end: length,
            reference_start,
            reference_end,
            query_reversed: false,
            e_value,
            bit_score: identity * 2.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::hit;

    #[test]
    fn test_spans_are_inclusive() {
        let h = hit("q1", "ref1", 90.0, 1e-20, (100, 200));
        assert_eq!(h.reference_span(), 101);
        assert_eq!(h.query_span(), 101);
    }
}
