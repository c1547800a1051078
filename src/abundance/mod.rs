//! Marker-gene normalization of ARG read counts.
//!
//! In short-read mode the number of reads assigned to each ARG category (and
//! to each individual gene, the "subtype") is divided by the number of reads
//! classified as 16S rRNA. This gives an abundance that does not depend on
//! sequencing depth.
//!
//! A 16S count of zero leaves the abundance undefined. That is reported as
//! [`AbundanceError::DivisionByZero`], never as a zero or an infinity.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::call::ArgCall;
use crate::utils::validation::count_to_f64;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AbundanceError {
    #[error("marker gene count is zero; {categories} categories cannot be normalized")]
    DivisionByZero { categories: usize },
}

/// Read counts keyed by category (or gene), sorted by key
pub type CategoryCounts = BTreeMap<String, u64>;

/// Abundance per category relative to the marker gene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedAbundance {
    pub marker_gene_count: u64,
    pub values: BTreeMap<String, f64>,
}

/// Sum read counts per predicted category
#[must_use]
pub fn category_counts(calls: &[ArgCall]) -> CategoryCounts {
    let mut counts = CategoryCounts::new();
    for call in calls {
        *counts.entry(call.predicted_category.clone()).or_insert(0) += call.read_count;
    }
    counts
}

/// Sum read counts per gene, keyed `category|gene`
#[must_use]
pub fn subtype_counts(calls: &[ArgCall]) -> CategoryCounts {
    let mut counts = CategoryCounts::new();
    for call in calls {
        let key = format!("{}|{}", call.predicted_category, call.gene_name);
        *counts.entry(key).or_insert(0) += call.read_count;
    }
    counts
}

/// Divide each count by the marker gene count
///
/// # Errors
///
/// Returns `AbundanceError::DivisionByZero` when `marker_gene_count` is 0.
pub fn normalize(
    counts: &CategoryCounts,
    marker_gene_count: u64,
) -> Result<NormalizedAbundance, AbundanceError> {
    if marker_gene_count == 0 {
        return Err(AbundanceError::DivisionByZero {
            categories: counts.len(),
        });
    }

    let denominator = count_to_f64(marker_gene_count);
    Ok(NormalizedAbundance {
        marker_gene_count,
        values: counts
            .iter()
            .map(|(category, &count)| (category.clone(), count_to_f64(count) / denominator))
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::call::{Coverage, GeneCoverageRecord};

    fn call(reference: &str, gene: &str, category: &str, reads: u64) -> ArgCall {
        ArgCall {
            reference_id: reference.to_string(),
            gene_name: gene.to_string(),
            predicted_category: category.to_string(),
            mechanism: None,
            best_identity: 90.0,
            best_probability: 0.9,
            best_evalue: 1e-20,
            read_count: reads,
            hit_count: reads,
            coverage: GeneCoverageRecord {
                reference_id: reference.to_string(),
                intervals: Vec::new(),
                covered_length: 0,
                gene_length: None,
                coverage: Coverage::Undefined,
            },
        }
    }

    #[test]
    fn test_category_counts_sum_across_genes() {
        let calls = vec![
            call("ref1", "TEM-1", "betalactam", 30),
            call("ref2", "OXA-1", "betalactam", 10),
            call("ref3", "sul1", "sulfonamide", 5),
        ];
        let counts = category_counts(&calls);
        assert_eq!(counts["betalactam"], 40);
        assert_eq!(counts["sulfonamide"], 5);

        let subtypes = subtype_counts(&calls);
        assert_eq!(subtypes["betalactam|TEM-1"], 30);
        assert_eq!(subtypes.len(), 3);
    }

    #[test]
    fn test_normalize() {
        let counts: CategoryCounts = [("betalactam".to_string(), 40), ("sulfonamide".to_string(), 5)]
            .into_iter()
            .collect();
        let abundance = normalize(&counts, 200).unwrap();
        assert!((abundance.values["betalactam"] - 0.2).abs() < 0.001);
        assert!((abundance.values["sulfonamide"] - 0.025).abs() < 0.001);
    }

    #[test]
    fn test_normalize_zero_marker_count() {
        let counts: CategoryCounts = [("betalactam".to_string(), 40)].into_iter().collect();
        assert_eq!(
            normalize(&counts, 0),
            Err(AbundanceError::DivisionByZero { categories: 1 })
        );
    }
}
