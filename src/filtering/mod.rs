//! Alignment-quality filtering.
//!
//! Every parsed hit is checked against:
//!
//! - **Identity**: `identity_pct >= identity_cutoff`
//! - **E-value**: `e_value <= evalue_cutoff`
//! - **Overlap** (genes mode only): the shorter aligned span covers at least
//!   `overlap_cutoff` of the alignment
//!
//! Bounds are inclusive. A rejected hit carries every reason it failed so the
//! run summary can report them.

pub mod hit_filter;

pub use hit_filter::{overlap_fraction, FilterStats, FilterVerdict, HitFilter, RejectReason};
