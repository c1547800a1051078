//! Output tables for a finished run.
//!
//! | File                          | Contents                               | Mode  |
//! |-------------------------------|----------------------------------------|-------|
//! | `<prefix>.ARG.tsv`            | one row per ARG call                   | both  |
//! | `<prefix>.potential.ARG.tsv`  | best low-probability hit per query     | both  |
//! | `<prefix>.type.counts.tsv`    | reads per category                     | reads |
//! | `<prefix>.subtype.counts.tsv` | reads per `category\|gene`             | reads |
//! | `<prefix>.type.abundance.tsv` | reads per category / marker count      | reads |
//! | `<prefix>.subtype.abundance.tsv` | reads per gene / marker count       | reads |
//! | `<prefix>.summary.json`       | [`RunSummary`]                         | both  |
//!
//! Abundance tables are skipped when normalization was not possible.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::abundance::{CategoryCounts, NormalizedAbundance};
use crate::core::call::ArgCall;
use crate::core::hit::ScoredHit;
use crate::pipeline::{PipelineOutput, RunSummary};

pub const ARG_TABLE_HEADER: &str = "reference_id\tgene\tcategory\tmechanism\tidentity\tprobability\tevalue\tcoverage\tcovered_length\tgene_length\tread_count\thit_count";

pub const POTENTIAL_TABLE_HEADER: &str =
    "query_id\treference_id\tcategory\tmechanism\tidentity\tprobability\tevalue\tbit_score";

/// Write the ARG call table
///
/// # Errors
///
/// Returns any I/O error from the writer.
pub fn write_arg_table<W: Write>(mut out: W, calls: &[ArgCall]) -> std::io::Result<()> {
    writeln!(out, "{ARG_TABLE_HEADER}")?;
    for call in calls {
        writeln!(
            out,
            "{}\t{}\t{}\t{}\t{:.2}\t{:.4}\t{:e}\t{}\t{}\t{}\t{}\t{}",
            call.reference_id,
            call.gene_name,
            call.predicted_category,
            call.mechanism.as_deref().unwrap_or("NA"),
            call.best_identity,
            call.best_probability,
            call.best_evalue,
            call.coverage.coverage,
            call.coverage.covered_length,
            call.coverage
                .gene_length
                .map_or_else(|| "NA".to_string(), |len| len.to_string()),
            call.read_count,
            call.hit_count
        )?;
    }
    Ok(())
}

/// Write the potential ARG table
///
/// # Errors
///
/// Returns any I/O error from the writer.
pub fn write_potential_table<W: Write>(mut out: W, hits: &[ScoredHit]) -> std::io::Result<()> {
    writeln!(out, "{POTENTIAL_TABLE_HEADER}")?;
    for scored in hits {
        writeln!(
            out,
            "{}\t{}\t{}\t{}\t{:.2}\t{:.4}\t{:e}\t{:.1}",
            scored.query_id(),
            scored.reference_id(),
            scored.predicted_category,
            scored.predicted_mechanism.as_deref().unwrap_or("NA"),
            scored.hit.identity_pct,
            scored.probability,
            scored.hit.e_value,
            scored.hit.bit_score
        )?;
    }
    Ok(())
}

/// Write a two-column count table
///
/// # Errors
///
/// Returns any I/O error from the writer.
pub fn write_counts<W: Write>(
    mut out: W,
    key_header: &str,
    counts: &CategoryCounts,
) -> std::io::Result<()> {
    writeln!(out, "{key_header}\tread_count")?;
    for (key, count) in counts {
        writeln!(out, "{key}\t{count}")?;
    }
    Ok(())
}

/// Write a two-column abundance table
///
/// # Errors
///
/// Returns any I/O error from the writer.
pub fn write_abundance<W: Write>(
    mut out: W,
    key_header: &str,
    abundance: &NormalizedAbundance,
) -> std::io::Result<()> {
    writeln!(out, "{key_header}\tabundance")?;
    for (key, value) in &abundance.values {
        writeln!(out, "{key}\t{value:.6e}")?;
    }
    Ok(())
}

/// Write the run summary as pretty JSON
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_summary<W: Write>(out: W, summary: &RunSummary) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(out, summary)?;
    Ok(())
}

/// Path of one output file for `prefix`
#[must_use]
pub fn output_path(prefix: &Path, suffix: &str) -> PathBuf {
    let mut name = prefix.as_os_str().to_os_string();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

fn create(prefix: &Path, suffix: &str, written: &mut Vec<PathBuf>) -> anyhow::Result<BufWriter<File>> {
    let path = output_path(prefix, suffix);
    let file = File::create(&path)
        .map_err(|e| anyhow::anyhow!("Failed to create {}: {e}", path.display()))?;
    debug!("Writing {}", path.display());
    written.push(path);
    Ok(BufWriter::new(file))
}

/// Write every table a run produced; returns the paths written
///
/// # Errors
///
/// Returns an error if any file cannot be created or written.
pub fn write_outputs(prefix: &Path, output: &PipelineOutput) -> anyhow::Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    let mut out = create(prefix, "ARG.tsv", &mut written)?;
    write_arg_table(&mut out, &output.calls)?;
    out.flush()?;

    let mut out = create(prefix, "potential.ARG.tsv", &mut written)?;
    write_potential_table(&mut out, &output.potential)?;
    out.flush()?;

    if let Some(tables) = &output.abundance {
        let mut out = create(prefix, "type.counts.tsv", &mut written)?;
        write_counts(&mut out, "category", &tables.type_counts)?;
        out.flush()?;

        let mut out = create(prefix, "subtype.counts.tsv", &mut written)?;
        write_counts(&mut out, "subtype", &tables.subtype_counts)?;
        out.flush()?;

        if let Some(abundance) = &tables.type_abundance {
            let mut out = create(prefix, "type.abundance.tsv", &mut written)?;
            write_abundance(&mut out, "category", abundance)?;
            out.flush()?;
        }
        if let Some(abundance) = &tables.subtype_abundance {
            let mut out = create(prefix, "subtype.abundance.tsv", &mut written)?;
            write_abundance(&mut out, "subtype", abundance)?;
            out.flush()?;
        }
    }

    let mut out = create(prefix, "summary.json", &mut written)?;
    write_summary(&mut out, &output.summary)?;
    writeln!(out)?;
    out.flush()?;

    Ok(written)
}
