//! Parsers for alignment output and reference metadata.
//!
//! This module provides parsers for:
//!
//! - **Tabular alignments**: BLAST/DIAMOND "outfmt 6" rows, plain or gzipped
//! - **Reference metadata**: TSV files mapping reference ids to gene length,
//!   category and mechanism
//!
//! ## Example
//!
//! ```rust,no_run
//! use arg_resolver::parsing::alignment::{parse_lines, read_alignment_lines};
//! use std::path::Path;
//!
//! let lines = read_alignment_lines(Path::new("sample.align.tsv")).unwrap();
//! let batch = parse_lines(&lines);
//! println!("{} hits, {} malformed", batch.hits.len(), batch.malformed.len());
//! ```
//!
//! ## Alignment Columns
//!
//! | # | Column | Description |
//! |---|--------|-------------|
//! | 1 | qseqid | Query (read or gene) id |
//! | 2 | sseqid | Reference gene id |
//! | 3 | pident | Percent identity |
//! | 4 | length | Alignment length |
//! | 5 | mismatch | Mismatches |
//! | 6 | gapopen | Gap openings |
//! | 7-8 | qstart, qend | Query coordinates |
//! | 9-10 | sstart, send | Reference coordinates |
//! | 11 | evalue | E-value |
//! | 12 | bitscore | Bit score |

pub mod alignment;
pub mod metadata;
