//! # arg-resolver
//!
//! A library for turning sequence alignments against an antibiotic resistance
//! gene (ARG) reference database into gene-level calls and abundances.
//!
//! Alignments from BLAST or DIAMOND say which reference a sequence looks
//! like, not whether that similarity means resistance. `arg-resolver` filters
//! the raw hits, asks a pluggable classifier how likely each hit is to be a
//! real ARG and of which category, and then resolves hits into one call per
//! reference gene.
//!
//! ## Features
//!
//! - **Two models**: long sequences (genes, contigs) and short reads
//! - **Alignment filtering**: identity, e-value and (for long sequences) overlap cutoffs
//! - **Pluggable classification**: any [`Classifier`]; label transfer and
//!   precomputed prediction tables are built in
//! - **Gene coverage**: merged alignment intervals over gene length, with an
//!   explicit undefined state when the length is unknown
//! - **Abundance**: read counts per category and gene, normalized against 16S
//!
//! ## Example
//!
//! ```rust,no_run
//! use arg_resolver::{HomologyClassifier, ModelMode, Pipeline, PipelineConfig, ReferenceDatabase};
//! use arg_resolver::parsing::alignment::read_alignment_lines;
//! use std::path::Path;
//!
//! let database = ReferenceDatabase::load_from_file(Path::new("features.tsv")).unwrap();
//! let lines = read_alignment_lines(Path::new("genes.diamond.tsv")).unwrap();
//!
//! let classifier = HomologyClassifier::new();
//! let pipeline = Pipeline::new(PipelineConfig::new(ModelMode::LongSequence), &database, &classifier);
//! let output = pipeline.run(&lines, None).unwrap();
//!
//! for call in &output.calls {
//!     println!("{}\t{}\t{}", call.gene_name, call.predicted_category, call.coverage.coverage);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`parsing`]: Alignment and reference metadata parsers
//! - [`filtering`]: Alignment-level cutoffs
//! - [`classify`]: Classifier trait and built-in classifiers
//! - [`resolve`]: Hit-to-gene resolution and coverage
//! - [`abundance`]: Marker-gene normalization
//! - [`pipeline`]: Configuration and orchestration of a run
//! - [`report`]: Output tables
//! - [`database`]: Reference metadata storage
//! - [`cli`]: Command-line interface implementation

pub mod abundance;
pub mod classify;
pub mod cli;
pub mod core;
pub mod database;
pub mod filtering;
pub mod parsing;
pub mod pipeline;
pub mod report;
pub mod resolve;
pub mod utils;

// Re-export commonly used types for convenience
pub use classify::{Classifier, HomologyClassifier, PredictionTable};
pub use core::call::{ArgCall, Coverage};
pub use core::hit::{AlignmentHit, FilteredHit, ScoredHit};
pub use core::reference::ReferenceGene;
pub use core::types::*;
pub use database::store::ReferenceDatabase;
pub use pipeline::{Pipeline, PipelineConfig, PipelineError, PipelineOutput, RunSummary};
