use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::hit::{AlignmentHit, FilteredHit};
use crate::core::types::MoleculeType;
use crate::utils::validation::count_to_f64;

/// Why a hit was discarded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    LowIdentity,
    HighEvalue,
    LowOverlap,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LowIdentity => write!(f, "identity below cutoff"),
            Self::HighEvalue => write!(f, "e-value above cutoff"),
            Self::LowOverlap => write!(f, "overlap below cutoff"),
        }
    }
}

/// Outcome of evaluating one hit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterVerdict {
    Accept,
    /// Every cutoff the hit failed, in check order
    Reject(Vec<RejectReason>),
}

impl FilterVerdict {
    #[must_use]
    pub fn is_accept(&self) -> bool {
        matches!(self, Self::Accept)
    }
}

/// Tally of filter outcomes for the run summary.
///
/// A hit failing several cutoffs counts once in `rejected` and once under
/// each reason.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterStats {
    pub evaluated: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub low_identity: usize,
    pub high_evalue: usize,
    pub low_overlap: usize,
}

impl FilterStats {
    fn record(&mut self, verdict: &FilterVerdict) {
        self.evaluated += 1;
        match verdict {
            FilterVerdict::Accept => self.accepted += 1,
            FilterVerdict::Reject(reasons) => {
                self.rejected += 1;
                for reason in reasons {
                    match reason {
                        RejectReason::LowIdentity => self.low_identity += 1,
                        RejectReason::HighEvalue => self.high_evalue += 1,
                        RejectReason::LowOverlap => self.low_overlap += 1,
                    }
                }
            }
        }
    }
}

/// Alignment-quality cutoffs applied to every hit
#[derive(Debug, Clone, PartialEq)]
pub struct HitFilter {
    /// Minimum percent identity (inclusive)
    identity_cutoff: f64,
    /// Maximum e-value (inclusive)
    evalue_cutoff: f64,
    /// Minimum overlap fraction (inclusive); `None` disables the check
    overlap_cutoff: Option<f64>,
    molecule: MoleculeType,
}

impl HitFilter {
    /// Create a filter on identity and e-value only
    #[must_use]
    pub fn new(identity_cutoff: f64, evalue_cutoff: f64) -> Self {
        Self {
            identity_cutoff,
            evalue_cutoff,
            overlap_cutoff: None,
            molecule: MoleculeType::default(),
        }
    }

    /// Also require the overlap fraction to reach `cutoff`
    #[must_use]
    pub fn with_overlap(mut self, cutoff: f64, molecule: MoleculeType) -> Self {
        self.overlap_cutoff = Some(cutoff);
        self.molecule = molecule;
        self
    }

    /// Evaluate one hit against every cutoff, without a known gene length
    #[must_use]
    pub fn evaluate(&self, hit: &AlignmentHit) -> FilterVerdict {
        self.evaluate_with_length(hit, None)
    }

    /// Evaluate one hit; `gene_length` is the reference gene's full length
    /// when the reference metadata has it.
    #[must_use]
    pub fn evaluate_with_length(
        &self,
        hit: &AlignmentHit,
        gene_length: Option<u64>,
    ) -> FilterVerdict {
        let mut reasons = Vec::new();

        if hit.identity_pct < self.identity_cutoff {
            reasons.push(RejectReason::LowIdentity);
        }
        if hit.e_value > self.evalue_cutoff {
            reasons.push(RejectReason::HighEvalue);
        }
        if let Some(cutoff) = self.overlap_cutoff {
            if overlap_fraction(hit, self.molecule, gene_length) < cutoff {
                reasons.push(RejectReason::LowOverlap);
            }
        }

        if reasons.is_empty() {
            FilterVerdict::Accept
        } else {
            FilterVerdict::Reject(reasons)
        }
    }

    /// Filter a batch of hits in parallel, preserving input order
    #[must_use]
    pub fn apply(&self, hits: Vec<AlignmentHit>) -> (Vec<FilteredHit>, FilterStats) {
        self.apply_with_lengths(hits, |_| None)
    }

    /// Like [`HitFilter::apply`], looking up each reference's gene length
    /// for the overlap check
    #[must_use]
    pub fn apply_with_lengths<F>(
        &self,
        hits: Vec<AlignmentHit>,
        gene_length: F,
    ) -> (Vec<FilteredHit>, FilterStats)
    where
        F: Fn(&str) -> Option<u64> + Sync,
    {
        let verdicts: Vec<(AlignmentHit, FilterVerdict)> = hits
            .into_par_iter()
            .map(|hit| {
                let verdict = if self.overlap_cutoff.is_some() {
                    self.evaluate_with_length(&hit, gene_length(&hit.reference_id))
                } else {
                    self.evaluate(&hit)
                };
                (hit, verdict)
            })
            .collect();

        let mut stats = FilterStats::default();
        let mut accepted = Vec::with_capacity(verdicts.len());
        for (hit, verdict) in verdicts {
            stats.record(&verdict);
            if verdict.is_accept() {
                accepted.push(FilteredHit::new(hit));
            }
        }

        (accepted, stats)
    }
}

/// Fraction of the reference gene spanned by one alignment.
///
/// With a known gene length this is the aligned reference span over the gene
/// length, so a short fragment of a long gene scores low. Tabular alignments
/// carry no gene length, so without one the shorter of the two aligned spans
/// is measured against the alignment length instead; the query span is
/// converted to reference residues first. The result is clamped to [0, 1].
#[must_use]
pub fn overlap_fraction(
    hit: &AlignmentHit,
    molecule: MoleculeType,
    gene_length: Option<u64>,
) -> f64 {
    let fraction = match gene_length {
        Some(length) if length > 0 => count_to_f64(hit.reference_span()) / count_to_f64(length),
        _ => {
            let query_residues = hit.query_span() / molecule.query_scale();
            let shorter = query_residues.min(hit.reference_span());
            count_to_f64(shorter) / count_to_f64(hit.alignment_length)
        }
    };
    fraction.clamp(0.0, 1.0)
}
