//! Predict command - run the full pipeline over one alignment file.

use std::path::{Path, PathBuf};

use clap::Args;

use crate::classify::{Classifier, HomologyClassifier, PredictionTable};
use crate::cli::OutputFormat;
use crate::core::types::{ModelMode, MoleculeType};
use crate::database::store::ReferenceDatabase;
use crate::parsing::alignment::read_alignment_lines;
use crate::pipeline::{ConfigOverrides, Pipeline, PipelineConfig, PipelineOutput};
use crate::report;

/// Model selected on the command line
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum ModelArg {
    /// Long sequences (assembled genes or contigs)
    #[value(name = "LS")]
    Ls,
    /// Short reads
    #[value(name = "SS")]
    Ss,
}

impl From<ModelArg> for ModelMode {
    fn from(arg: ModelArg) -> Self {
        match arg {
            ModelArg::Ls => ModelMode::LongSequence,
            ModelArg::Ss => ModelMode::ShortRead,
        }
    }
}

/// Query molecule type
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum MoleculeArg {
    /// Nucleotide queries searched against protein references
    Nucl,
    /// Protein queries
    Prot,
}

impl From<MoleculeArg> for MoleculeType {
    fn from(arg: MoleculeArg) -> Self {
        match arg {
            MoleculeArg::Nucl => MoleculeType::Nucleotide,
            MoleculeArg::Prot => MoleculeType::Protein,
        }
    }
}

#[derive(Args)]
pub struct PredictArgs {
    /// Tabular alignment file (12-column outfmt 6, optionally gzipped)
    /// Use '-' for stdin
    #[arg(short, long, required = true)]
    pub input: PathBuf,

    /// Reference metadata (JSON database or TSV)
    #[arg(short, long, required = true)]
    pub database: PathBuf,

    /// Output prefix; files are written as <prefix>.ARG.tsv etc.
    #[arg(short, long, required = true)]
    pub output: PathBuf,

    /// Model: LS for genes/contigs, SS for short reads
    #[arg(long, value_enum, ignore_case = true)]
    pub model: Option<ModelArg>,

    /// Query molecule type
    #[arg(long = "type", value_enum)]
    pub molecule: Option<MoleculeArg>,

    /// Per-hit predictions from an external model (TSV).
    /// Without this, categories are transferred from the reference metadata
    #[arg(long)]
    pub predictions: Option<PathBuf>,

    /// JSON file with default settings; flags given here override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    // === Cutoff options (defaults depend on --model) ===
    /// Minimum alignment identity in percent (LS: 50, SS: 80)
    #[arg(long)]
    pub identity: Option<f64>,

    /// Maximum alignment e-value (default 1e-10)
    #[arg(long)]
    pub evalue: Option<f64>,

    /// Minimum fraction of the reference gene spanned by one alignment, LS only (default 0.8)
    #[arg(long)]
    pub overlap: Option<f64>,

    /// Minimum classifier probability (default 0.8)
    #[arg(long)]
    pub min_prob: Option<f64>,

    /// Minimum gene coverage fraction (LS: 0, SS: 0.01)
    ///
    /// Covered length is summed as end - start over merged intervals, so a
    /// hit spanning a whole gene reaches (length - 1) / length, never 1.0.
    #[arg(long)]
    pub gene_coverage: Option<f64>,

    /// Reads assigned to the 16S marker gene, used to normalize SS abundances
    #[arg(long)]
    pub marker_count: Option<u64>,

    /// Hits per classifier batch
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Worker threads (defaults to all cores)
    #[arg(short, long)]
    pub threads: Option<usize>,
}

impl PredictArgs {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            mode: self.model.map(ModelMode::from),
            molecule: self.molecule.map(MoleculeType::from),
            identity: self.identity,
            evalue: self.evalue,
            overlap: self.overlap,
            min_prob: self.min_prob,
            gene_coverage: self.gene_coverage,
            batch_size: self.batch_size,
        }
    }

    fn pipeline_config(&self) -> anyhow::Result<PipelineConfig> {
        let file = match &self.config {
            Some(path) => ConfigOverrides::load(path)?,
            None => ConfigOverrides::default(),
        };
        Ok(PipelineConfig::from_overrides(
            &file.merged_with(self.overrides()),
        )?)
    }
}

/// Execute predict subcommand
///
/// # Errors
///
/// Returns an error if an input cannot be read, the configuration is
/// invalid, or the run fails.
#[allow(clippy::needless_pass_by_value)] // CLI entry point, values from clap
pub fn run(args: PredictArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .ok();
    }

    let config = args.pipeline_config()?;
    if verbose {
        eprintln!(
            "Model {} ({}): identity >= {}, e-value <= {:e}, probability >= {}, coverage >= {}",
            config.mode,
            config.molecule,
            config.cutoffs.identity_pct,
            config.cutoffs.evalue,
            config.cutoffs.min_prob,
            config.cutoffs.gene_coverage
        );
    }

    let database = ReferenceDatabase::load_from_file(&args.database)?;
    if verbose {
        eprintln!("Loaded reference metadata with {} genes", database.len());
    }

    let classifier: Box<dyn Classifier> = match &args.predictions {
        Some(path) => {
            let table = PredictionTable::load(path)?;
            if verbose {
                eprintln!("Loaded predictions for {} queries", table.len());
            }
            Box::new(table)
        }
        None => Box::new(HomologyClassifier::new()),
    };

    let lines = read_alignment_lines(&args.input)?;
    if config.mode == ModelMode::ShortRead && args.marker_count.is_none() {
        eprintln!("Warning: --marker-count not given; abundance tables will not be normalized");
    }

    let pipeline = Pipeline::new(config, &database, classifier.as_ref());
    let output = pipeline.run(&lines, args.marker_count)?;

    ensure_parent_dir(&args.output)?;
    let written = report::write_outputs(&args.output, &output)?;

    match format {
        OutputFormat::Text => print_text_summary(&output, &written, verbose),
        OutputFormat::Json => print_json_summary(&output, &written)?,
        OutputFormat::Tsv => print_tsv_summary(&output),
    }

    Ok(())
}

fn ensure_parent_dir(prefix: &Path) -> anyhow::Result<()> {
    if let Some(parent) = prefix.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

fn print_text_summary(output: &PipelineOutput, written: &[PathBuf], verbose: bool) {
    let summary = &output.summary;

    println!("Status: {}", summary.status);
    println!("Model: {} (classifier: {})", summary.mode, summary.classifier);
    println!(
        "Alignments: {} parsed, {} malformed",
        summary.parsed_hits, summary.malformed_records
    );
    println!(
        "Filter: {} kept, {} rejected (identity {}, e-value {}, overlap {})",
        summary.filter.accepted,
        summary.filter.rejected,
        summary.filter.low_identity,
        summary.filter.high_evalue,
        summary.filter.low_overlap
    );
    println!(
        "Classifier: {} scored, {} failed",
        summary.scored_hits, summary.classifier_failures
    );
    println!(
        "ARG calls: {} ({} potential, {} below coverage)",
        summary.arg_calls, summary.potential_args, summary.genes_below_coverage
    );
    if summary.no_surviving_hits {
        println!("No gene passed every cutoff.");
    }

    if let Some(tables) = &output.abundance {
        println!("\nReads per category:");
        for (category, count) in &tables.type_counts {
            match tables
                .type_abundance
                .as_ref()
                .and_then(|a| a.values.get(category))
            {
                Some(value) => println!("   {category}: {count} ({value:.4e} per 16S read)"),
                None => println!("   {category}: {count}"),
            }
        }
    }

    if !summary.warnings.is_empty() {
        println!("\nWarnings:");
        for (kind, count) in &summary.warnings.counts {
            println!("   {kind}: {count}");
        }
        if verbose {
            for warning in &summary.warnings.details {
                println!("   - {warning}");
            }
        }
    }

    println!("\nWrote:");
    for path in written {
        println!("   {}", path.display());
    }
}

fn print_json_summary(output: &PipelineOutput, written: &[PathBuf]) -> anyhow::Result<()> {
    let json = serde_json::json!({
        "summary": output.summary,
        "calls": output.calls,
        "outputs": written,
    });
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

fn print_tsv_summary(output: &PipelineOutput) {
    let summary = &output.summary;
    println!("key\tvalue");
    println!("status\t{}", summary.status);
    println!("mode\t{}", summary.mode);
    println!("classifier\t{}", summary.classifier);
    println!("parsed_hits\t{}", summary.parsed_hits);
    println!("malformed_records\t{}", summary.malformed_records);
    println!("filter_accepted\t{}", summary.filter.accepted);
    println!("filter_rejected\t{}", summary.filter.rejected);
    println!("low_identity\t{}", summary.filter.low_identity);
    println!("high_evalue\t{}", summary.filter.high_evalue);
    println!("low_overlap\t{}", summary.filter.low_overlap);
    println!("scored_hits\t{}", summary.scored_hits);
    println!("classifier_failures\t{}", summary.classifier_failures);
    println!("arg_calls\t{}", summary.arg_calls);
    println!("potential_args\t{}", summary.potential_args);
    println!("warnings\t{}", summary.warnings.total());
}
