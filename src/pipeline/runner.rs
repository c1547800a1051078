use std::collections::HashSet;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::abundance::{self, CategoryCounts, NormalizedAbundance};
use crate::classify::{score_hits, Classifier, ScoringOutcome};
use crate::core::call::{ArgCall, GeneCoverageRecord};
use crate::core::hit::{FilteredHit, ScoredHit};
use crate::core::types::{ModelMode, RunStatus};
use crate::database::store::ReferenceDatabase;
use crate::parsing::alignment::parse_lines;
use crate::pipeline::config::PipelineConfig;
use crate::pipeline::summary::{RunSummary, Warning, WarningLog};
use crate::resolve::rank_hits_per_query;
use crate::utils::validation::ValidationError;

/// Conditions that end a run without output
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Reference metadata is empty; no hit can be resolved")]
    NoReferenceMetadata,

    #[error("Alignment input contains no records")]
    NoInput,

    #[error("None of the {malformed} alignment records could be parsed")]
    NoUsableRecords { malformed: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ValidationError),
}

/// Short-read abundance tables
#[derive(Debug, Clone, PartialEq)]
pub struct AbundanceTables {
    pub type_counts: CategoryCounts,
    pub subtype_counts: CategoryCounts,
    /// Present when a non-zero marker gene count was supplied
    pub type_abundance: Option<NormalizedAbundance>,
    pub subtype_abundance: Option<NormalizedAbundance>,
}

/// Everything a successful run produces
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub calls: Vec<ArgCall>,
    pub potential: Vec<ScoredHit>,
    pub below_coverage: Vec<GeneCoverageRecord>,
    /// Reads mode only
    pub abundance: Option<AbundanceTables>,
    pub summary: RunSummary,
}

/// Sequences parse, filter, classify, resolve and normalize for one input.
///
/// The configuration, database and classifier are shared read-only; a
/// `Pipeline` can run any number of inputs.
pub struct Pipeline<'a> {
    config: PipelineConfig,
    database: &'a ReferenceDatabase,
    classifier: &'a dyn Classifier,
}

impl<'a> Pipeline<'a> {
    #[must_use]
    pub fn new(
        config: PipelineConfig,
        database: &'a ReferenceDatabase,
        classifier: &'a dyn Classifier,
    ) -> Self {
        Self {
            config,
            database,
            classifier,
        }
    }

    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the pipeline over the lines of a tabular alignment file.
    ///
    /// `marker_gene_count` is the 16S read count used to normalize
    /// short-read abundances; it is ignored in genes mode.
    ///
    /// # Errors
    ///
    /// Returns a `PipelineError` when the run cannot produce any output:
    /// empty reference metadata, no data lines, or no parseable record.
    pub fn run(
        &self,
        lines: &[String],
        marker_gene_count: Option<u64>,
    ) -> Result<PipelineOutput, PipelineError> {
        let started_at = chrono::Utc::now().to_rfc3339();
        self.config.validate()?;

        if self.database.is_empty() {
            return Err(PipelineError::NoReferenceMetadata);
        }

        let mut warnings = WarningLog::default();

        let parsed = parse_lines(lines);
        if parsed.data_lines == 0 {
            return Err(PipelineError::NoInput);
        }
        if parsed.hits.is_empty() {
            return Err(PipelineError::NoUsableRecords {
                malformed: parsed.malformed.len(),
            });
        }
        let malformed_records = parsed.malformed.len();
        if malformed_records > 0 {
            warn!("Skipped {} malformed alignment records", malformed_records);
        }
        for (line, reason) in parsed.malformed {
            warnings.push(Warning::MalformedRecord { line, reason });
        }
        let parsed_hits = parsed.hits.len();
        info!("Parsed {} alignment records", parsed_hits);

        let (filtered, filter_stats) = self
            .config
            .hit_filter()
            .apply_with_lengths(parsed.hits, |id| self.database.gene_length(id));
        info!(
            "Filter kept {} of {} hits (identity: {}, e-value: {}, overlap: {})",
            filter_stats.accepted,
            filter_stats.evaluated,
            filter_stats.low_identity,
            filter_stats.high_evalue,
            filter_stats.low_overlap
        );

        let (outcome, classified_hits) = match self.config.mode {
            ModelMode::LongSequence => {
                let classified = filtered.len();
                let outcome = score_hits(
                    self.classifier,
                    filtered,
                    self.database,
                    self.config.batch_size,
                );
                (outcome, classified)
            }
            ModelMode::ShortRead => self.score_best_per_read(filtered),
        };
        if !outcome.failures.is_empty() {
            warn!(
                "Classifier {} could not score {} hits",
                self.classifier.name(),
                outcome.failures.len()
            );
        }
        let classifier_failures = outcome.failures.len();
        for failure in outcome.failures {
            warnings.push(Warning::ClassifierFailure {
                query_id: failure.query_id,
                reference_id: failure.reference_id,
                reason: failure.reason,
            });
        }
        let scored_hits = outcome.scored.len();

        let resolution = self.config.resolver().resolve(outcome.scored, self.database);
        for reference_id in resolution.undefined_coverage {
            warnings.push(Warning::UndefinedCoverage { reference_id });
        }
        info!(
            "Resolved {} ARG calls ({} potential, {} below coverage)",
            resolution.calls.len(),
            resolution.potential.len(),
            resolution.below_coverage.len()
        );

        let abundance = match self.config.mode {
            ModelMode::LongSequence => None,
            ModelMode::ShortRead => Some(Self::abundance_tables(
                &resolution.calls,
                marker_gene_count,
                &mut warnings,
            )),
        };

        let no_surviving_hits = resolution.calls.is_empty();
        if no_surviving_hits {
            info!("No gene passed every cutoff");
        }

        let status = if warnings.is_empty() {
            RunStatus::Completed
        } else {
            RunStatus::CompletedWithWarnings
        };

        let summary = RunSummary {
            status,
            mode: self.config.mode,
            classifier: self.classifier.name().to_string(),
            started_at,
            input_lines: lines.len(),
            data_lines: parsed.data_lines,
            parsed_hits,
            malformed_records,
            filter: filter_stats,
            classified_hits,
            scored_hits,
            classifier_failures,
            arg_calls: resolution.calls.len(),
            potential_args: resolution.potential.len(),
            genes_below_coverage: resolution.below_coverage.len(),
            no_surviving_hits,
            marker_gene_count: match self.config.mode {
                ModelMode::ShortRead => marker_gene_count,
                ModelMode::LongSequence => None,
            },
            normalized: abundance
                .as_ref()
                .is_some_and(|tables| tables.type_abundance.is_some()),
            warnings,
        };

        Ok(PipelineOutput {
            calls: resolution.calls,
            potential: resolution.potential,
            below_coverage: resolution.below_coverage,
            abundance,
            summary,
        })
    }

    /// Score one hit per read, best first. A read moves on to its next hit
    /// only when the classifier fails on the current one. Returns the outcome
    /// and the number of hits sent to the classifier.
    fn score_best_per_read(&self, hits: Vec<FilteredHit>) -> (ScoringOutcome, usize) {
        let mut pending: Vec<std::vec::IntoIter<FilteredHit>> = rank_hits_per_query(hits)
            .into_iter()
            .map(Vec::into_iter)
            .collect();
        let mut outcome = ScoringOutcome::default();
        let mut classified = 0;
        let mut round = 0;

        loop {
            let mut batch = Vec::new();
            let mut waiting = Vec::new();
            for mut candidates in pending {
                if let Some(hit) = candidates.next() {
                    waiting.push((hit.query_id.clone(), candidates));
                    batch.push(hit);
                }
            }
            if batch.is_empty() {
                break;
            }

            round += 1;
            classified += batch.len();
            debug!("Scoring round {}: {} reads", round, batch.len());

            let scored = score_hits(
                self.classifier,
                batch,
                self.database,
                self.config.batch_size,
            );
            let failed: HashSet<&str> = scored
                .failures
                .iter()
                .map(|f| f.query_id.as_str())
                .collect();
            pending = waiting
                .into_iter()
                .filter(|(query_id, _)| failed.contains(query_id.as_str()))
                .map(|(_, candidates)| candidates)
                .collect();

            outcome.scored.extend(scored.scored);
            outcome.failures.extend(scored.failures);
        }

        (outcome, classified)
    }

    fn abundance_tables(
        calls: &[ArgCall],
        marker_gene_count: Option<u64>,
        warnings: &mut WarningLog,
    ) -> AbundanceTables {
        let type_counts = abundance::category_counts(calls);
        let subtype_counts = abundance::subtype_counts(calls);

        let (type_abundance, subtype_abundance) = match marker_gene_count {
            None => {
                debug!("No marker gene count supplied; reporting raw counts only");
                (None, None)
            }
            Some(count) => match (
                abundance::normalize(&type_counts, count),
                abundance::normalize(&subtype_counts, count),
            ) {
                (Ok(types), Ok(subtypes)) => (Some(types), Some(subtypes)),
                (Err(abundance::AbundanceError::DivisionByZero { categories }), _)
                | (_, Err(abundance::AbundanceError::DivisionByZero { categories })) => {
                    warn!("Marker gene count is zero; normalized abundance omitted");
                    warnings.push(Warning::DivisionByZero { categories });
                    (None, None)
                }
            },
        };

        AbundanceTables {
            type_counts,
            subtype_counts,
            type_abundance,
            subtype_abundance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::test_support::StubClassifier;
    use crate::core::reference::ReferenceGene;

    fn line(query: &str, reference: &str, identity: f64, ref_start: u64, ref_end: u64) -> String {
        let length = ref_end - ref_start + 1;
        let query_end = length * 3;
        format!(
            "{query}\t{reference}\t{identity}\t{length}\t0\t0\t1\t{query_end}\t{ref_start}\t{ref_end}\t1e-30\t{}",
            identity * 2.0
        )
    }

    fn database() -> ReferenceDatabase {
        ReferenceDatabase::from_genes([
            ReferenceGene::new("tem1")
                .with_length(1000)
                .with_category("betalactam"),
            ReferenceGene::new("sul1")
                .with_length(800)
                .with_category("sulfonamide"),
        ])
    }

    #[test]
    fn test_genes_mode_end_to_end() {
        let db = database();
        let classifier = StubClassifier::new(&[("g1", 0.95, "betalactam"), ("g2", 0.9, "sulfonamide")]);
        let pipeline = Pipeline::new(PipelineConfig::new(ModelMode::LongSequence), &db, &classifier);

        let lines = vec![
            "# header".to_string(),
            line("g1", "tem1", 99.0, 1, 900),
            line("g2", "sul1", 98.0, 1, 700),
        ];
        let output = pipeline.run(&lines, None).unwrap();

        assert_eq!(output.calls.len(), 2);
        assert!(output.abundance.is_none());
        assert_eq!(output.summary.status, RunStatus::Completed);
        assert_eq!(output.summary.data_lines, 2);
        assert!(!output.summary.no_surviving_hits);
    }

    #[test]
    fn test_malformed_lines_are_warnings() {
        let db = database();
        let classifier = StubClassifier::new(&[("g1", 0.95, "betalactam")]);
        let pipeline = Pipeline::new(PipelineConfig::new(ModelMode::LongSequence), &db, &classifier);

        let lines = vec![
            line("g1", "tem1", 99.0, 1, 900),
            "not\tenough\tfields".to_string(),
        ];
        let output = pipeline.run(&lines, None).unwrap();

        assert_eq!(output.calls.len(), 1);
        assert_eq!(output.summary.status, RunStatus::CompletedWithWarnings);
        assert_eq!(output.summary.malformed_records, 1);
        assert_eq!(output.summary.warnings.count("malformed_record"), 1);
    }

    #[test]
    fn test_zero_marker_count_warns() {
        let db = database();
        let classifier = StubClassifier::new(&[("r1", 0.95, "betalactam")]);
        let pipeline = Pipeline::new(PipelineConfig::new(ModelMode::ShortRead), &db, &classifier);

        let lines = vec![line("r1", "tem1", 99.0, 1, 100)];
        let output = pipeline.run(&lines, Some(0)).unwrap();

        let tables = output.abundance.unwrap();
        assert_eq!(tables.type_counts["betalactam"], 1);
        assert!(tables.type_abundance.is_none());
        assert_eq!(output.summary.warnings.count("division_by_zero"), 1);
        assert!(!output.summary.normalized);
    }

    #[test]
    fn test_failed_best_hit_falls_back_to_next_hit() {
        let db = database();
        let classifier = StubClassifier::new(&[("r1", 0.9, "sulfonamide")]).failing_on("tem1");
        let pipeline = Pipeline::new(PipelineConfig::new(ModelMode::ShortRead), &db, &classifier);

        // tem1 has the higher bit score but cannot be scored
        let lines = vec![line("r1", "tem1", 99.0, 1, 100), line("r1", "sul1", 90.0, 1, 100)];
        let output = pipeline.run(&lines, Some(10)).unwrap();

        assert_eq!(output.calls.len(), 1);
        assert_eq!(output.calls[0].reference_id, "sul1");
        assert_eq!(output.summary.classifier_failures, 1);
        assert_eq!(output.summary.classified_hits, 2);
        assert_eq!(output.summary.status, RunStatus::CompletedWithWarnings);
    }

    #[test]
    fn test_failed_runs() {
        let empty = ReferenceDatabase::new();
        let classifier = StubClassifier::new(&[]);
        let pipeline = Pipeline::new(PipelineConfig::new(ModelMode::LongSequence), &empty, &classifier);
        assert!(matches!(
            pipeline.run(&[line("g1", "tem1", 99.0, 1, 900)], None),
            Err(PipelineError::NoReferenceMetadata)
        ));

        let db = database();
        let pipeline = Pipeline::new(PipelineConfig::new(ModelMode::LongSequence), &db, &classifier);
        assert!(matches!(
            pipeline.run(&["# only a comment".to_string()], None),
            Err(PipelineError::NoInput)
        ));
        assert!(matches!(
            pipeline.run(&["garbage".to_string()], None),
            Err(PipelineError::NoUsableRecords { malformed: 1 })
        ));
    }
}
