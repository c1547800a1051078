use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};

use crate::cli::OutputFormat;
use crate::core::reference::ReferenceGene;
use crate::database::store::ReferenceDatabase;
use crate::utils::validation::count_to_f64;

#[derive(Args)]
pub struct DatabaseArgs {
    #[command(subcommand)]
    pub command: DatabaseCommands,
}

#[derive(Subcommand)]
pub enum DatabaseCommands {
    /// List genes in the reference metadata
    List {
        /// Reference metadata (JSON database or TSV)
        #[arg(short, long, required = true)]
        database: PathBuf,

        /// Filter by category (e.g., "betalactam")
        #[arg(long)]
        category: Option<String>,
    },

    /// Show details of a specific reference gene
    Show {
        /// Reference ID
        #[arg(required = true)]
        id: String,

        /// Reference metadata (JSON database or TSV)
        #[arg(short, long, required = true)]
        database: PathBuf,
    },

    /// Summarize genes per category
    Stats {
        /// Reference metadata (JSON database or TSV)
        #[arg(short, long, required = true)]
        database: PathBuf,
    },

    /// Convert the reference metadata to a JSON database
    Export {
        /// Reference metadata (JSON database or TSV)
        #[arg(short, long, required = true)]
        database: PathBuf,

        /// Output file path
        #[arg(required = true)]
        output: PathBuf,
    },
}

/// Execute database subcommand
///
/// # Errors
///
/// Returns an error if the metadata cannot be loaded or the gene is unknown.
pub fn run(args: DatabaseArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    match args.command {
        DatabaseCommands::List { database, category } => {
            run_list(&database, category.as_deref(), format, verbose)
        }
        DatabaseCommands::Show { id, database } => run_show(&id, &database, format),
        DatabaseCommands::Stats { database } => run_stats(&database, format),
        DatabaseCommands::Export { database, output } => run_export(&database, &output),
    }
}

fn run_list(
    path: &Path,
    category_filter: Option<&str>,
    format: OutputFormat,
    verbose: bool,
) -> anyhow::Result<()> {
    let database = ReferenceDatabase::load_from_file(path)?;

    if verbose {
        eprintln!("Loaded reference metadata with {} genes", database.len());
    }

    let filtered: Vec<&ReferenceGene> = database
        .genes
        .iter()
        .filter(|g| match category_filter {
            Some(wanted) => g
                .category
                .as_deref()
                .is_some_and(|c| c.eq_ignore_ascii_case(wanted)),
            None => true,
        })
        .collect();

    match format {
        OutputFormat::Text => {
            let id_width = filtered
                .iter()
                .map(|g| g.id.len().min(40))
                .max()
                .unwrap_or(2)
                .max(2);
            let name_width = filtered
                .iter()
                .map(|g| g.display_name().len().min(20))
                .max()
                .unwrap_or(4)
                .max(4);
            let category_width = filtered
                .iter()
                .map(|g| g.category.as_deref().map_or(2, str::len))
                .max()
                .unwrap_or(8)
                .max(8);

            let total_width = id_width + name_width + category_width + 8 + 3;

            println!("Reference Genes ({} genes)\n", filtered.len());
            println!(
                "{:<id_w$} {:<name_w$} {:<cat_w$} {:>8}",
                "ID",
                "Gene",
                "Category",
                "Length",
                id_w = id_width,
                name_w = name_width,
                cat_w = category_width,
            );
            println!("{}", "-".repeat(total_width));

            for g in &filtered {
                println!(
                    "{:<id_w$} {:<name_w$} {:<cat_w$} {:>8}",
                    truncate(&g.id, id_width),
                    truncate(g.display_name(), name_width),
                    g.category.as_deref().unwrap_or("NA"),
                    g.gene_length.map_or_else(|| "NA".to_string(), |l| l.to_string()),
                    id_w = id_width,
                    name_w = name_width,
                    cat_w = category_width,
                );
                if verbose {
                    if let Some(mechanism) = &g.mechanism {
                        println!("  └─ Mechanism: {mechanism}");
                    }
                }
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&filtered)?);
        }
        OutputFormat::Tsv => {
            println!("id\tgene\tcategory\tmechanism\tgene_length\tsource");
            for g in &filtered {
                println!(
                    "{}\t{}\t{}\t{}\t{}\t{}",
                    g.id,
                    g.display_name(),
                    g.category.as_deref().unwrap_or(""),
                    g.mechanism.as_deref().unwrap_or(""),
                    g.gene_length.map_or_else(String::new, |l| l.to_string()),
                    g.source.as_deref().unwrap_or("")
                );
            }
        }
    }

    Ok(())
}

fn run_show(id: &str, path: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let database = ReferenceDatabase::load_from_file(path)?;
    let gene = database
        .lookup(id)
        .ok_or_else(|| anyhow::anyhow!("Reference '{}' not found", id))?;

    match format {
        OutputFormat::Text => {
            println!("Reference: {}\n", gene.display_name());
            println!("ID:        {}", gene.id);
            println!("Category:  {}", gene.category.as_deref().unwrap_or("NA"));
            println!("Mechanism: {}", gene.mechanism.as_deref().unwrap_or("NA"));
            println!(
                "Length:    {}",
                gene.gene_length
                    .map_or_else(|| "NA".to_string(), |l| l.to_string())
            );
            if let Some(source) = &gene.source {
                println!("Source:    {source}");
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&*gene)?);
        }
        OutputFormat::Tsv => {
            println!("field\tvalue");
            println!("id\t{}", gene.id);
            println!("gene\t{}", gene.display_name());
            println!("category\t{}", gene.category.as_deref().unwrap_or(""));
            println!("mechanism\t{}", gene.mechanism.as_deref().unwrap_or(""));
            println!(
                "gene_length\t{}",
                gene.gene_length.map_or_else(String::new, |l| l.to_string())
            );
        }
    }

    Ok(())
}

fn run_stats(path: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let database = ReferenceDatabase::load_from_file(path)?;
    let counts = database.category_counts();
    let with_length = database
        .genes
        .iter()
        .filter(|g| g.gene_length.is_some())
        .count();

    match format {
        OutputFormat::Text => {
            println!("Reference Metadata Statistics\n");
            println!("Genes:        {}", database.len());
            let pct = if database.is_empty() {
                0.0
            } else {
                100.0 * count_to_f64(with_length as u64) / count_to_f64(database.len() as u64)
            };
            println!("With length:  {with_length} ({pct:.0}%)");
            println!("Categories:   {}", counts.len());
            println!();
            for (category, count) in &counts {
                println!("   {category}: {count}");
            }
        }
        OutputFormat::Json => {
            let json = serde_json::json!({
                "gene_count": database.len(),
                "genes_with_length": with_length,
                "categories": counts,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Tsv => {
            println!("category\tgene_count");
            for (category, count) in &counts {
                println!("{category}\t{count}");
            }
        }
    }

    Ok(())
}

fn run_export(path: &Path, output: &Path) -> anyhow::Result<()> {
    let database = ReferenceDatabase::load_from_file(path)?;
    std::fs::write(output, database.to_json()?)?;
    eprintln!("Exported {} genes to {}", database.len(), output.display());
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
