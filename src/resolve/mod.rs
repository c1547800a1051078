//! Hit-to-gene resolution.
//!
//! Scored hits that clear the probability cutoff are grouped by reference
//! gene. Within each group:
//!
//! 1. Reference intervals are sorted and merged (overlapping or touching)
//! 2. Covered length is the sum of merged interval lengths
//! 3. Coverage is covered length over gene length, or undefined when the
//!    gene length is unknown
//! 4. Genes at or above the coverage cutoff become [`ArgCall`]s; undefined
//!    coverage skips the cutoff
//!
//! The call's category is a majority vote over the group's predictions (see
//! [`vote::majority_category`] for the tie-break). Hits below the
//! probability cutoff become potential ARGs, best hit per query, unless the
//! query already supports a call.
//!
//! [`ArgCall`]: crate::core::call::ArgCall

pub mod intervals;
pub mod resolver;
pub mod vote;

pub use resolver::{best_hit_per_query, gene_coverage, rank_hits_per_query, Resolution, Resolver};
