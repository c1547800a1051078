//! Command-line interface for arg-resolver.
//!
//! Available commands:
//!
//! - **predict**: Resolve an alignment file into ARG calls and abundance tables
//! - **database**: List, show, or summarize the reference metadata
//!
//! ## Usage
//!
//! ```text
//! # Assembled genes, label transfer from the reference metadata
//! arg-resolver predict --model LS -i genes.diamond.tsv -d features.tsv -o out/sample
//!
//! # Short reads with external model predictions, normalized against 16S
//! arg-resolver predict --model SS -i reads.tsv.gz -d features.tsv \
//!     --predictions reads.predictions.tsv --marker-count 25000 -o out/sample
//!
//! # JSON run summary for scripting
//! arg-resolver predict --model SS -i reads.tsv -d features.tsv -o out/s --format json
//!
//! # Inspect the reference metadata
//! arg-resolver database stats -d features.tsv
//! ```

use clap::{Parser, Subcommand};

pub mod database;
pub mod predict;

#[derive(Parser)]
#[command(name = "arg-resolver")]
#[command(author = "Fulcrum Genomics")]
#[command(version)]
#[command(about = "Resolve sequence alignments into antibiotic resistance gene calls")]
#[command(
    long_about = "arg-resolver turns tabular alignments against an ARG reference database into gene-level calls.\n\nIt filters alignments, scores each surviving hit with a classifier, and groups hits by reference gene to report:\n- Predicted resistance category and mechanism per gene\n- Gene coverage from merged alignment intervals\n- Read counts and 16S-normalized abundances for short-read samples"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Predict ARGs from a tabular alignment file
    Predict(predict::PredictArgs),

    /// Inspect the reference metadata
    Database(database::DatabaseArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}
