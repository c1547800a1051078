//! End-to-end orchestration of one run.
//!
//! ```text
//! lines ─▶ parse ─▶ filter ─▶ [best hit per read] ─▶ classify ─▶ resolve ─▶ [normalize]
//! ```
//!
//! Bracketed stages run in short-read mode only. The overlap check inside
//! the filter runs in long-sequence mode only.
//!
//! | Condition                  | Effect                                        |
//! |----------------------------|-----------------------------------------------|
//! | Malformed line             | skipped, counted as a warning                 |
//! | Classifier error on a hit  | hit excluded, counted as a warning; a read    |
//! |                            | falls back to its next-best hit               |
//! | Unknown gene length        | coverage `NA`, counted as a warning           |
//! | Marker gene count of zero  | normalized tables omitted, warning            |
//! | No gene passes             | empty tables, flagged in the summary          |
//! | Empty metadata or input    | [`PipelineError`], nothing written            |
//!
//! ## Example
//!
//! ```rust,no_run
//! use arg_resolver::classify::HomologyClassifier;
//! use arg_resolver::core::types::ModelMode;
//! use arg_resolver::database::store::ReferenceDatabase;
//! use arg_resolver::parsing::alignment::read_alignment_lines;
//! use arg_resolver::pipeline::{Pipeline, PipelineConfig};
//! use std::path::Path;
//!
//! let database = ReferenceDatabase::load_from_file(Path::new("features.tsv")).unwrap();
//! let lines = read_alignment_lines(Path::new("sample.tsv")).unwrap();
//!
//! let classifier = HomologyClassifier;
//! let pipeline = Pipeline::new(PipelineConfig::new(ModelMode::ShortRead), &database, &classifier);
//! let output = pipeline.run(&lines, Some(25_000)).unwrap();
//!
//! println!("{} ARG calls, status {}", output.calls.len(), output.summary.status);
//! ```

pub mod config;
pub mod runner;
pub mod summary;

pub use config::{ConfigError, ConfigOverrides, Cutoffs, PipelineConfig};
pub use runner::{AbundanceTables, Pipeline, PipelineError, PipelineOutput};
pub use summary::{RunSummary, Warning, WarningLog};
