use std::collections::{BTreeMap, HashMap, HashSet};

use rayon::prelude::*;
use tracing::debug;

use crate::core::call::{ArgCall, Coverage, GeneCoverageRecord, Interval};
use crate::core::hit::{FilteredHit, ScoredHit};
use crate::database::store::ReferenceDatabase;
use crate::resolve::intervals::{covered_length, merge_intervals};
use crate::resolve::vote::majority_category;
use crate::utils::validation::count_to_f64;

/// Result of resolving scored hits into gene calls
#[derive(Debug, Default)]
pub struct Resolution {
    /// Accepted genes, ordered by reference id
    pub calls: Vec<ArgCall>,

    /// Genes whose hits cleared the probability cutoff but not the coverage cutoff
    pub below_coverage: Vec<GeneCoverageRecord>,

    /// Best hit per query among hits below the probability cutoff
    pub potential: Vec<ScoredHit>,

    /// Reference ids whose coverage is undefined (gene length unknown)
    pub undefined_coverage: Vec<String>,
}

/// Groups scored hits by reference gene and decides which genes are present
#[derive(Debug, Clone, PartialEq)]
pub struct Resolver {
    /// Minimum classifier probability (inclusive)
    pub min_prob: f64,
    /// Minimum coverage fraction (inclusive); skipped for genes of unknown length
    pub gene_coverage_cutoff: f64,
}

impl Resolver {
    #[must_use]
    pub fn new(min_prob: f64, gene_coverage_cutoff: f64) -> Self {
        Self {
            min_prob,
            gene_coverage_cutoff,
        }
    }

    /// Resolve scored hits into one call per surviving reference gene.
    ///
    /// Grouping needs every hit, so this is the barrier between per-hit and
    /// per-gene work. Groups are independent and resolved in parallel.
    pub fn resolve(&self, hits: Vec<ScoredHit>, database: &ReferenceDatabase) -> Resolution {
        let (confident, below): (Vec<ScoredHit>, Vec<ScoredHit>) = hits
            .into_iter()
            .partition(|h| h.probability >= self.min_prob);

        let mut groups: BTreeMap<String, Vec<ScoredHit>> = BTreeMap::new();
        for hit in confident {
            groups.entry(hit.hit.reference_id.clone()).or_default().push(hit);
        }

        let outcomes: Vec<GroupOutcome> = groups
            .into_par_iter()
            .map(|(reference_id, group)| self.resolve_group(reference_id, &group, database))
            .collect();

        let mut resolution = Resolution::default();
        let mut called_queries: HashSet<String> = HashSet::new();

        for outcome in outcomes {
            match outcome {
                GroupOutcome::Called { call, queries } => {
                    if call.coverage.coverage.is_undefined() {
                        resolution.undefined_coverage.push(call.reference_id.clone());
                    }
                    called_queries.extend(queries);
                    resolution.calls.push(*call);
                }
                GroupOutcome::BelowCoverage(record) => resolution.below_coverage.push(record),
            }
        }

        // A query that supports a call is not a potential ARG elsewhere
        resolution.potential = best_per_query(
            below
                .into_iter()
                .filter(|h| !called_queries.contains(h.query_id()))
                .collect(),
        );

        resolution.calls.sort_by(|a, b| a.reference_id.cmp(&b.reference_id));
        resolution
    }

    fn resolve_group(
        &self,
        reference_id: String,
        group: &[ScoredHit],
        database: &ReferenceDatabase,
    ) -> GroupOutcome {
        let coverage = gene_coverage(&reference_id, group, database.gene_length(&reference_id));

        if !coverage.coverage.passes(self.gene_coverage_cutoff) {
            debug!(
                reference = %reference_id,
                coverage = %coverage.coverage,
                cutoff = self.gene_coverage_cutoff,
                "Gene below coverage cutoff"
            );
            return GroupOutcome::BelowCoverage(coverage);
        }

        let reference = database.lookup(&reference_id);
        let category = majority_category(group).unwrap_or_else(|| "unknown".to_string());

        // Mechanism of the most confident hit voting for the winning category
        let mechanism = group
            .iter()
            .filter(|h| h.predicted_category == category)
            .max_by(|a, b| {
                a.probability
                    .partial_cmp(&b.probability)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .and_then(|h| h.predicted_mechanism.clone())
            .or_else(|| reference.as_ref().and_then(|r| r.mechanism.clone()));

        let queries: HashSet<String> = group.iter().map(|h| h.query_id().to_string()).collect();
        let read_count = queries.len() as u64;

        let call = Box::new(ArgCall {
            gene_name: reference
                .as_ref()
                .map_or_else(|| reference_id.clone(), |r| r.display_name().to_string()),
            reference_id,
            predicted_category: category,
            mechanism,
            best_identity: group.iter().map(|h| h.hit.identity_pct).fold(0.0, f64::max),
            best_probability: group.iter().map(|h| h.probability).fold(0.0, f64::max),
            best_evalue: group
                .iter()
                .map(|h| h.hit.e_value)
                .fold(f64::INFINITY, f64::min),
            read_count,
            hit_count: group.len() as u64,
            coverage,
        });

        GroupOutcome::Called { call, queries }
    }
}

enum GroupOutcome {
    Called {
        call: Box<ArgCall>,
        queries: HashSet<String>,
    },
    BelowCoverage(GeneCoverageRecord),
}

/// Merge a group's reference intervals and compute its coverage
pub fn gene_coverage(
    reference_id: &str,
    group: &[ScoredHit],
    gene_length: Option<u64>,
) -> GeneCoverageRecord {
    let intervals = merge_intervals(
        group
            .iter()
            .map(|h| Interval::new(h.hit.reference_start, h.hit.reference_end)),
    );
    let covered = covered_length(&intervals);

    let coverage = match gene_length {
        Some(length) if length > 0 => {
            Coverage::Fraction((count_to_f64(covered) / count_to_f64(length)).min(1.0))
        }
        _ => Coverage::Undefined,
    };

    GeneCoverageRecord {
        reference_id: reference_id.to_string(),
        intervals,
        covered_length: covered,
        gene_length,
        coverage,
    }
}

/// Keep each query's single best hit: highest bit score, then identity,
/// then smallest reference id.
///
/// Short reads are counted once, for the gene they match best.
#[must_use]
pub fn best_hit_per_query(hits: Vec<FilteredHit>) -> Vec<FilteredHit> {
    rank_hits_per_query(hits)
        .into_iter()
        .filter_map(|candidates| candidates.into_iter().next())
        .collect()
}

/// Group hits by query, each group ordered best first (see
/// [`best_hit_per_query`]); groups are ordered by query id.
#[must_use]
pub fn rank_hits_per_query(hits: Vec<FilteredHit>) -> Vec<Vec<FilteredHit>> {
    let mut by_query: BTreeMap<String, Vec<FilteredHit>> = BTreeMap::new();
    for hit in hits {
        by_query.entry(hit.query_id.clone()).or_default().push(hit);
    }

    by_query
        .into_values()
        .map(|mut candidates| {
            candidates.sort_by(rank_order);
            candidates
        })
        .collect()
}

fn rank_order(a: &FilteredHit, b: &FilteredHit) -> std::cmp::Ordering {
    b.bit_score
        .partial_cmp(&a.bit_score)
        .unwrap_or(std::cmp::Ordering::Equal)
        .then_with(|| {
            b.identity_pct
                .partial_cmp(&a.identity_pct)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .then_with(|| a.reference_id.cmp(&b.reference_id))
}

/// Highest-probability hit per query, ordered by query id
fn best_per_query(hits: Vec<ScoredHit>) -> Vec<ScoredHit> {
    let mut best: HashMap<String, ScoredHit> = HashMap::new();
    for hit in hits {
        let replace = best.get(hit.query_id()).map_or(true, |current| {
            hit.probability > current.probability
                || (hit.probability == current.probability
                    && hit.hit.bit_score > current.hit.bit_score)
        });
        if replace {
            best.insert(hit.query_id().to_string(), hit);
        }
    }

    let mut kept: Vec<ScoredHit> = best.into_values().collect();
    kept.sort_by(|a, b| a.query_id().cmp(b.query_id()));
    kept
}
