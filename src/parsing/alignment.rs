use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use flate2::read::GzDecoder;
use rayon::prelude::*;
use thiserror::Error;

use crate::core::hit::AlignmentHit;

/// Columns in a tabular alignment row:
/// qseqid sseqid pident length mismatch gapopen qstart qend sstart send evalue bitscore
pub const FIELD_COUNT: usize = 12;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed alignment record: {0}")]
    MalformedRecord(String),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Result of parsing a batch of alignment lines
#[derive(Debug, Default)]
pub struct ParsedBatch {
    /// Hits in input order
    pub hits: Vec<AlignmentHit>,

    /// (1-based line number, reason) for every line that failed to parse
    pub malformed: Vec<(usize, String)>,

    /// Data lines seen, excluding blank and comment lines
    pub data_lines: usize,
}

/// Blank lines and `#` comments carry no record
#[must_use]
pub fn is_skippable(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}

/// Parse one tab-delimited alignment row
///
/// # Errors
///
/// Returns `ParseError::MalformedRecord` if the row does not have exactly
/// 12 fields, a numeric field does not parse, or a value is out of range.
pub fn parse_record(line: &str) -> Result<AlignmentHit, ParseError> {
    let fields: Vec<&str> = line.trim_end_matches(['\r', '\n']).split('\t').collect();
    if fields.len() != FIELD_COUNT {
        return Err(ParseError::MalformedRecord(format!(
            "expected {FIELD_COUNT} fields, found {}",
            fields.len()
        )));
    }

    let query_id = non_empty(fields[0], "query id")?;
    let reference_id = non_empty(fields[1], "reference id")?;

    let identity_pct: f64 = parse_field(fields[2], "identity")?;
    if !(0.0..=100.0).contains(&identity_pct) {
        return Err(ParseError::MalformedRecord(format!(
            "identity {identity_pct} outside 0-100"
        )));
    }

    let alignment_length: u64 = parse_field(fields[3], "alignment length")?;
    if alignment_length == 0 {
        return Err(ParseError::MalformedRecord(
            "alignment length must be at least 1".to_string(),
        ));
    }

    let mismatches = parse_field(fields[4], "mismatches")?;
    let gap_opens = parse_field(fields[5], "gap opens")?;
    let qstart: u64 = parse_field(fields[6], "query start")?;
    let qend: u64 = parse_field(fields[7], "query end")?;
    let sstart: u64 = parse_field(fields[8], "reference start")?;
    let send: u64 = parse_field(fields[9], "reference end")?;

    let e_value: f64 = parse_field(fields[10], "e-value")?;
    if e_value.is_nan() || e_value < 0.0 {
        return Err(ParseError::MalformedRecord(format!(
            "e-value {} must be non-negative",
            fields[10].trim()
        )));
    }

    let bit_score: f64 = parse_field(fields[11], "bit score")?;

    Ok(AlignmentHit {
        query_id,
        reference_id,
        identity_pct,
        alignment_length,
        mismatches,
        gap_opens,
        query_start: qstart.min(qend),
        query_end: qstart.max(qend),
        reference_start: sstart.min(send),
        reference_end: sstart.max(send),
        query_reversed: qstart > qend,
        e_value,
        bit_score,
    })
}

fn non_empty(field: &str, name: &str) -> Result<String, ParseError> {
    let value = field.trim();
    if value.is_empty() {
        return Err(ParseError::MalformedRecord(format!("empty {name}")));
    }
    Ok(value.to_string())
}

fn parse_field<T: std::str::FromStr>(field: &str, name: &str) -> Result<T, ParseError> {
    field
        .trim()
        .parse()
        .map_err(|_| ParseError::MalformedRecord(format!("invalid {name}: '{}'", field.trim())))
}

/// Parse a batch of lines in parallel.
///
/// Lines are independent, so they are parsed out of order and the results
/// are put back in input order. Malformed lines are collected, not fatal.
#[must_use]
pub fn parse_lines(lines: &[String]) -> ParsedBatch {
    let results: Vec<(usize, Result<AlignmentHit, ParseError>)> = lines
        .par_iter()
        .enumerate()
        .filter(|(_, line)| !is_skippable(line))
        .map(|(i, line)| (i + 1, parse_record(line)))
        .collect();

    let mut batch = ParsedBatch {
        data_lines: results.len(),
        ..ParsedBatch::default()
    };

    for (line_num, result) in results {
        match result {
            Ok(hit) => batch.hits.push(hit),
            Err(e) => batch.malformed.push((line_num, e.to_string())),
        }
    }

    batch
}

/// Whether a path looks gzip-compressed
#[must_use]
pub fn is_gzipped(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("gz") || e.eq_ignore_ascii_case("bgz"))
}

/// Open an alignment table; `-` reads stdin, `.gz` files are decompressed
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be opened.
pub fn open_alignments(path: &Path) -> Result<Box<dyn BufRead>, ParseError> {
    if path.to_string_lossy() == "-" {
        return Ok(Box::new(BufReader::new(io::stdin())));
    }

    let file = File::open(path)?;
    if is_gzipped(path) {
        Ok(Box::new(BufReader::new(GzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Read every line of an alignment table into memory
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be opened or read.
pub fn read_alignment_lines(path: &Path) -> Result<Vec<String>, ParseError> {
    let reader = open_alignments(path)?;
    Ok(reader.lines().collect::<Result<Vec<_>, _>>()?)
}
