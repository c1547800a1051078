//! Classifier boundary.
//!
//! The probability model that decides whether a hit is a true ARG lives
//! outside this crate. It is reached through the [`Classifier`] trait so the
//! pipeline can be driven by any scorer, including deterministic stubs.
//!
//! Two adapters ship with the crate:
//!
//! - [`PredictionTable`]: predictions written by an external model, one row
//!   per query
//! - [`HomologyClassifier`]: labels from the reference metadata, probability
//!   from alignment identity
//!
//! [`score_hits`] runs a classifier over filtered hits in parallel batches.
//! A failure on one hit excludes that hit only.

pub mod homology;
pub mod table;

use std::borrow::Cow;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::core::hit::{FilteredHit, ScoredHit};
use crate::core::reference::ReferenceGene;
use crate::database::store::ReferenceDatabase;

pub use homology::HomologyClassifier;
pub use table::PredictionTable;

/// Default number of hits handed to a classifier per call
pub const DEFAULT_BATCH_SIZE: usize = 1024;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClassifierError {
    #[error("no prediction for query '{0}'")]
    MissingPrediction(String),

    #[error("reference '{0}' has no category in the database")]
    UnknownReference(String),

    #[error("probability {0} is outside [0, 1]")]
    InvalidProbability(f64),

    #[error("classifier returned {got} predictions for a batch of {expected}")]
    BatchSizeMismatch { expected: usize, got: usize },

    #[error("classifier failed: {0}")]
    Failed(String),
}

/// What a classifier sees for one hit
#[derive(Debug, Clone, Copy)]
pub struct ClassifierInput<'a> {
    pub hit: &'a FilteredHit,

    /// Metadata of the matched reference gene, when the database knows it
    pub reference: Option<&'a ReferenceGene>,
}

/// A classifier's verdict for one hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub probability: f64,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mechanism: Option<String>,
}

impl Prediction {
    pub fn new(probability: f64, category: impl Into<String>) -> Self {
        Self {
            probability,
            category: category.into(),
            mechanism: None,
        }
    }
}

/// Scores filtered hits.
///
/// Implementations must be deterministic: identical input yields an
/// identical prediction.
pub trait Classifier: Send + Sync {
    /// Short name for logs and the run summary
    fn name(&self) -> &str;

    /// Score one hit
    ///
    /// # Errors
    ///
    /// Returns a `ClassifierError` when the hit cannot be scored.
    fn classify(&self, input: &ClassifierInput<'_>) -> Result<Prediction, ClassifierError>;

    /// Score a batch of hits; one result per input, in input order
    fn classify_batch(
        &self,
        inputs: &[ClassifierInput<'_>],
    ) -> Vec<Result<Prediction, ClassifierError>> {
        inputs.iter().map(|input| self.classify(input)).collect()
    }
}

/// A hit the classifier could not score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierFailure {
    pub query_id: String,
    pub reference_id: String,
    pub reason: String,
}

/// Scored hits plus the hits that were excluded
#[derive(Debug, Default)]
pub struct ScoringOutcome {
    pub scored: Vec<ScoredHit>,
    pub failures: Vec<ClassifierFailure>,
}

/// Run `classifier` over `hits` in parallel batches of `batch_size`.
///
/// Output keeps input order. A prediction with a probability outside [0, 1]
/// counts as a failure for that hit.
pub fn score_hits(
    classifier: &dyn Classifier,
    hits: Vec<FilteredHit>,
    database: &ReferenceDatabase,
    batch_size: usize,
) -> ScoringOutcome {
    let references: Vec<Option<Cow<'_, ReferenceGene>>> = hits
        .iter()
        .map(|hit| database.lookup(&hit.reference_id))
        .collect();

    let predictions: Vec<Result<Prediction, ClassifierError>> = {
        let inputs: Vec<ClassifierInput<'_>> = hits
            .iter()
            .zip(&references)
            .map(|(hit, reference)| ClassifierInput {
                hit,
                reference: reference.as_deref(),
            })
            .collect();

        let batches: Vec<Vec<Result<Prediction, ClassifierError>>> = inputs
            .par_chunks(batch_size.max(1))
            .map(|chunk| {
                let mut results = classifier.classify_batch(chunk);
                if results.len() != chunk.len() {
                    let mismatch = ClassifierError::BatchSizeMismatch {
                        expected: chunk.len(),
                        got: results.len(),
                    };
                    results.truncate(chunk.len());
                    results.resize_with(chunk.len(), || Err(mismatch.clone()));
                }
                results
            })
            .collect();

        batches.into_iter().flatten().collect()
    };

    let mut outcome = ScoringOutcome::default();
    for ((hit, reference), prediction) in hits.into_iter().zip(references).zip(predictions) {
        match prediction.and_then(validate_prediction) {
            Ok(prediction) => {
                let mechanism = prediction
                    .mechanism
                    .or_else(|| reference.and_then(|r| r.mechanism.clone()));
                outcome.scored.push(
                    ScoredHit::new(hit, prediction.probability, prediction.category)
                        .with_mechanism(mechanism),
                );
            }
            Err(e) => {
                debug!(query = %hit.query_id, reference = %hit.reference_id, error = %e, "Hit not scored");
                outcome.failures.push(ClassifierFailure {
                    query_id: hit.query_id.clone(),
                    reference_id: hit.reference_id.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    outcome
}

fn validate_prediction(prediction: Prediction) -> Result<Prediction, ClassifierError> {
    if !(0.0..=1.0).contains(&prediction.probability) {
        return Err(ClassifierError::InvalidProbability(prediction.probability));
    }
    if prediction.category.trim().is_empty() {
        return Err(ClassifierError::Failed("empty category".to_string()));
    }
    Ok(prediction)
}
