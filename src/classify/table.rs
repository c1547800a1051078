use std::collections::HashMap;
use std::path::Path;

use crate::classify::{Classifier, ClassifierError, ClassifierInput, Prediction};
use crate::parsing::alignment::ParseError;

#[derive(Debug, Clone)]
struct TableEntry {
    /// Restricts the prediction to one reference when set
    reference_id: Option<String>,
    prediction: Prediction,
}

/// Predictions produced by an external model, keyed by query id.
///
/// TSV columns: `query_id  category  probability  [mechanism]  [reference_id]`.
/// A row with a reference id applies only to hits on that reference; a row
/// without one applies to every hit of the query.
#[derive(Debug, Clone, Default)]
pub struct PredictionTable {
    entries: HashMap<String, Vec<TableEntry>>,
}

impl PredictionTable {
    /// Load predictions from a TSV file
    ///
    /// # Errors
    ///
    /// Returns `ParseError::Io` if the file cannot be read, or
    /// `ParseError::InvalidFormat` if a row is invalid.
    pub fn load(path: &Path) -> Result<Self, ParseError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_tsv(&content)
    }

    /// Parse predictions from TSV text
    ///
    /// # Errors
    ///
    /// Returns `ParseError::InvalidFormat` if a row has fewer than 3 fields
    /// or an unparseable probability.
    pub fn from_tsv(text: &str) -> Result<Self, ParseError> {
        let mut table = Self::default();
        let mut first_data_line = true;

        for (i, line) in text.lines().enumerate() {
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = line.split('\t').map(str::trim).collect();

            if first_data_line {
                first_data_line = false;
                let first = fields.first().map(|s| s.to_lowercase()).unwrap_or_default();
                if first == "query_id" || first == "read_id" || first == "query" {
                    continue;
                }
            }

            let line_num = i + 1;

            if fields.len() < 3 {
                return Err(ParseError::InvalidFormat(format!(
                    "Line {line_num} has fewer than 3 fields"
                )));
            }

            let probability: f64 = fields[2].parse().map_err(|_| {
                ParseError::InvalidFormat(format!(
                    "Invalid probability on line {line_num}: '{}'",
                    fields[2]
                ))
            })?;

            let optional = |index: usize| {
                fields
                    .get(index)
                    .filter(|s| !s.is_empty() && **s != "NA")
                    .map(|s| (*s).to_string())
            };

            let mut prediction = Prediction::new(probability, fields[1]);
            prediction.mechanism = optional(3);
            table.insert(fields[0], optional(4), prediction);
        }

        Ok(table)
    }

    /// Add a prediction for `query_id`, optionally scoped to one reference
    pub fn insert(
        &mut self,
        query_id: impl Into<String>,
        reference_id: Option<String>,
        prediction: Prediction,
    ) {
        self.entries
            .entry(query_id.into())
            .or_default()
            .push(TableEntry {
                reference_id,
                prediction,
            });
    }

    /// Number of queries with at least one prediction
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Classifier for PredictionTable {
    fn name(&self) -> &str {
        "prediction-table"
    }

    fn classify(&self, input: &ClassifierInput<'_>) -> Result<Prediction, ClassifierError> {
        let hit = input.hit;
        let entries = self
            .entries
            .get(&hit.query_id)
            .ok_or_else(|| ClassifierError::MissingPrediction(hit.query_id.clone()))?;

        entries
            .iter()
            .find(|e| e.reference_id.as_deref() == Some(hit.reference_id.as_str()))
            .or_else(|| entries.iter().find(|e| e.reference_id.is_none()))
            .map(|e| e.prediction.clone())
            .ok_or_else(|| ClassifierError::MissingPrediction(hit.query_id.clone()))
    }
}
