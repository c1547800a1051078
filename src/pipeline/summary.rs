use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::types::{ModelMode, RunStatus};
use crate::filtering::FilterStats;
use crate::utils::validation::MAX_STORED_WARNINGS;

/// A non-fatal condition met during a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// Input line skipped
    MalformedRecord { line: usize, reason: String },
    /// Hit excluded because the classifier could not score it
    ClassifierFailure {
        query_id: String,
        reference_id: String,
        reason: String,
    },
    /// Gene reported with undefined coverage
    UndefinedCoverage { reference_id: String },
    /// Normalized tables omitted
    DivisionByZero { categories: usize },
}

impl Warning {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedRecord { .. } => "malformed_record",
            Self::ClassifierFailure { .. } => "classifier_failure",
            Self::UndefinedCoverage { .. } => "undefined_coverage",
            Self::DivisionByZero { .. } => "division_by_zero",
        }
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedRecord { line, reason } => {
                write!(f, "line {line} skipped: {reason}")
            }
            Self::ClassifierFailure {
                query_id,
                reference_id,
                reason,
            } => write!(f, "{query_id} -> {reference_id} not scored: {reason}"),
            Self::UndefinedCoverage { reference_id } => {
                write!(f, "{reference_id}: gene length unknown, coverage undefined")
            }
            Self::DivisionByZero { categories } => write!(
                f,
                "marker gene count is zero; abundance for {categories} categories omitted"
            ),
        }
    }
}

/// Warnings accumulated over a run.
///
/// Counts are exact; at most `MAX_STORED_WARNINGS` details are kept per kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WarningLog {
    pub counts: BTreeMap<String, usize>,
    pub details: Vec<Warning>,
}

impl WarningLog {
    pub fn push(&mut self, warning: Warning) {
        let count = self.counts.entry(warning.kind().to_string()).or_insert(0);
        *count += 1;
        if *count <= MAX_STORED_WARNINGS {
            self.details.push(warning);
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    #[must_use]
    pub fn count(&self, kind: &str) -> usize {
        self.counts.get(kind).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

/// Everything a run reports besides its tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub status: RunStatus,
    pub mode: ModelMode,
    pub classifier: String,
    pub started_at: String,
    pub input_lines: usize,
    pub data_lines: usize,
    pub parsed_hits: usize,
    pub malformed_records: usize,
    pub filter: FilterStats,
    /// Hits remaining after per-read best-hit selection (reads mode)
    pub classified_hits: usize,
    pub scored_hits: usize,
    pub classifier_failures: usize,
    pub arg_calls: usize,
    pub potential_args: usize,
    pub genes_below_coverage: usize,
    /// True when no gene survived every cutoff
    pub no_surviving_hits: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker_gene_count: Option<u64>,
    pub normalized: bool,
    pub warnings: WarningLog,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warning_log_caps_details() {
        let mut log = WarningLog::default();
        for line in 0..MAX_STORED_WARNINGS + 5 {
            log.push(Warning::MalformedRecord {
                line,
                reason: "bad".to_string(),
            });
        }
        log.push(Warning::DivisionByZero { categories: 1 });

        assert_eq!(log.count("malformed_record"), MAX_STORED_WARNINGS + 5);
        assert_eq!(log.count("division_by_zero"), 1);
        assert_eq!(log.total(), MAX_STORED_WARNINGS + 6);
        assert_eq!(log.details.len(), MAX_STORED_WARNINGS + 1);
    }

    #[test]
    fn test_warning_serializes_with_kind() {
        let json = serde_json::to_string(&Warning::UndefinedCoverage {
            reference_id: "ref1".to_string(),
        })
        .unwrap();
        assert_eq!(json, r#"{"kind":"undefined_coverage","reference_id":"ref1"}"#);
    }
}
