use crate::classify::{Classifier, ClassifierError, ClassifierInput, Prediction};

/// Label-transfer classifier used when no external predictions are supplied.
///
/// The category and mechanism come from the matched reference gene; the
/// probability is the alignment identity as a fraction.
#[derive(Debug, Clone, Default)]
pub struct HomologyClassifier;

impl HomologyClassifier {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Classifier for HomologyClassifier {
    fn name(&self) -> &str {
        "homology"
    }

    fn classify(&self, input: &ClassifierInput<'_>) -> Result<Prediction, ClassifierError> {
        let reference = input
            .reference
            .ok_or_else(|| ClassifierError::UnknownReference(input.hit.reference_id.clone()))?;
        let category = reference
            .category
            .clone()
            .ok_or_else(|| ClassifierError::UnknownReference(reference.id.clone()))?;

        Ok(Prediction {
            probability: (input.hit.identity_pct / 100.0).clamp(0.0, 1.0),
            category,
            mechanism: reference.mechanism.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hit::test_support::hit;
    use crate::core::reference::ReferenceGene;
    use crate::filtering::HitFilter;

    #[test]
    fn test_label_transfer() {
        let filtered = HitFilter::new(0.0, 1.0)
            .apply(vec![hit("q1", "ref1", 85.0, 1e-20, (1, 100))])
            .0;
        let gene = ReferenceGene::new("ref1")
            .with_category("tetracycline")
            .with_mechanism("ribosomal protection");

        let input = ClassifierInput {
            hit: &filtered[0],
            reference: Some(&gene),
        };
        let prediction = HomologyClassifier::new().classify(&input).unwrap();
        assert!((prediction.probability - 0.85).abs() < 0.001);
        assert_eq!(prediction.category, "tetracycline");
        assert_eq!(prediction.mechanism.as_deref(), Some("ribosomal protection"));

        // Deterministic for identical input
        assert_eq!(HomologyClassifier::new().classify(&input).unwrap(), prediction);
    }

    #[test]
    fn test_unknown_reference() {
        let filtered = HitFilter::new(0.0, 1.0)
            .apply(vec![hit("q1", "ref1", 85.0, 1e-20, (1, 100))])
            .0;
        let input = ClassifierInput {
            hit: &filtered[0],
            reference: None,
        };
        assert_eq!(
            HomologyClassifier::new().classify(&input),
            Err(ClassifierError::UnknownReference("ref1".to_string()))
        );

        let uncategorized = ReferenceGene::new("ref1");
        let input = ClassifierInput {
            hit: &filtered[0],
            reference: Some(&uncategorized),
        };
        assert!(HomologyClassifier::new().classify(&input).is_err());
    }
}
