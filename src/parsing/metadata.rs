use std::path::Path;

use crate::core::reference::ReferenceGene;
use crate::parsing::alignment::ParseError;

/// Parse a reference metadata TSV file with columns:
/// id, length, [category], [mechanism], [gene_name]
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or other parse errors
/// if the content is invalid.
pub fn parse_metadata_file(path: &Path) -> Result<Vec<ReferenceGene>, ParseError> {
    let content = std::fs::read_to_string(path)?;
    parse_metadata_text(&content)
}

/// Parse reference metadata TSV text.
///
/// A length of `NA`, `-`, `0` or an empty field means the length is unknown.
/// Ids carrying a `|FEATURES|source|category|gene` annotation fill any
/// category or gene name the columns leave out.
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` if a line has fewer than 2 fields,
/// a length does not parse, or no genes are found.
pub fn parse_metadata_text(text: &str) -> Result<Vec<ReferenceGene>, ParseError> {
    let mut genes = Vec::new();
    let mut first_data_line = true;

    for (i, line) in text.lines().enumerate() {
        let line = line.trim_end();
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').map(str::trim).collect();

        if first_data_line {
            first_data_line = false;
            let first = fields.first().map(|s| s.to_lowercase()).unwrap_or_default();
            if first == "id" || first == "reference_id" || first == "gene" || first == "name" {
                continue;
            }
        }

        let line_num = i + 1;

        if fields.len() < 2 {
            return Err(ParseError::InvalidFormat(format!(
                "Line {line_num} has fewer than 2 fields"
            )));
        }

        let mut gene = ReferenceGene::new(fields[0]);
        gene.gene_length = parse_length(fields[1]).map_err(|()| {
            ParseError::InvalidFormat(format!(
                "Invalid gene length on line {line_num}: '{}'",
                fields[1]
            ))
        })?;
        gene.category = optional_field(&fields, 2);
        gene.mechanism = optional_field(&fields, 3);
        gene.gene_name = optional_field(&fields, 4);

        genes.push(gene.enriched_from_label());
    }

    if genes.is_empty() {
        return Err(ParseError::InvalidFormat(
            "No reference genes found in metadata".to_string(),
        ));
    }

    Ok(genes)
}

fn parse_length(field: &str) -> Result<Option<u64>, ()> {
    match field {
        "" | "NA" | "na" | "-" => Ok(None),
        value => match value.parse::<u64>() {
            Ok(0) => Ok(None),
            Ok(length) => Ok(Some(length)),
            Err(_) => Err(()),
        },
    }
}

fn optional_field(fields: &[&str], index: usize) -> Option<String> {
    fields
        .get(index)
        .filter(|s| !s.is_empty() && **s != "NA")
        .map(|s| (*s).to_string())
}
