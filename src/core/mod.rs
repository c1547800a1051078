//! Core data types for ARG detection.
//!
//! This module provides the value types passed between pipeline stages:
//!
//! - [`AlignmentHit`]: One parsed alignment row
//! - [`FilteredHit`]: A hit that cleared the alignment cutoffs
//! - [`ScoredHit`]: A filtered hit with the classifier's probability and category
//! - [`ReferenceGene`]: Metadata for a database gene (length, category, mechanism)
//! - [`ArgCall`], [`GeneCoverageRecord`]: Gene-level results
//! - [`ModelMode`], [`MoleculeType`], [`RunStatus`]: Run configuration and outcome
//!
//! No stage mutates the values it receives; each one derives new values from
//! its input.
//!
//! [`AlignmentHit`]: hit::AlignmentHit
//! [`FilteredHit`]: hit::FilteredHit
//! [`ScoredHit`]: hit::ScoredHit
//! [`ReferenceGene`]: reference::ReferenceGene
//! [`ArgCall`]: call::ArgCall
//! [`GeneCoverageRecord`]: call::GeneCoverageRecord
//! [`ModelMode`]: types::ModelMode
//! [`MoleculeType`]: types::MoleculeType
//! [`RunStatus`]: types::RunStatus

pub mod call;
pub mod hit;
pub mod reference;
pub mod types;
