use serde::{Deserialize, Serialize};

/// Marker separating the accession from the annotation in database ids,
/// e.g. `AAB60941.1|FEATURES|CARD|beta-lactam|TEM-1`
const FEATURE_MARKER: &str = "FEATURES";

/// Metadata for one reference gene in the ARG database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceGene {
    /// Reference id exactly as it appears in the alignment output
    pub id: String,

    /// Gene length in reference residues, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gene_length: Option<u64>,

    /// Antibiotic class (e.g. "beta-lactam")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Resistance mechanism (e.g. "antibiotic inactivation")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mechanism: Option<String>,

    /// Short gene name (e.g. "TEM-1")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gene_name: Option<String>,

    /// Upstream database the gene was curated from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl ReferenceGene {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            gene_length: None,
            category: None,
            mechanism: None,
            gene_name: None,
            source: None,
        }
    }

    #[must_use]
    pub fn with_length(mut self, length: u64) -> Self {
        self.gene_length = Some(length);
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn with_mechanism(mut self, mechanism: impl Into<String>) -> Self {
        self.mechanism = Some(mechanism.into());
        self
    }

    /// Build a record from the annotation embedded in the id, if it has one
    #[must_use]
    pub fn from_label(id: &str) -> Option<Self> {
        let label = FeatureLabel::parse(id)?;
        Some(Self {
            id: id.to_string(),
            gene_length: None,
            category: Some(label.category),
            mechanism: None,
            gene_name: Some(label.gene_name),
            source: Some(label.source),
        })
    }

    /// Fill fields missing here from the id annotation
    #[must_use]
    pub fn enriched_from_label(mut self) -> Self {
        if let Some(label) = FeatureLabel::parse(&self.id) {
            self.category.get_or_insert(label.category);
            self.gene_name.get_or_insert(label.gene_name);
            self.source.get_or_insert(label.source);
        }
        self
    }

    /// Name to report for this gene: the curated name, else the id
    pub fn display_name(&self) -> &str {
        self.gene_name.as_deref().unwrap_or(&self.id)
    }
}

/// Annotation embedded in a database reference id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureLabel {
    pub source: String,
    pub category: String,
    pub gene_name: String,
}

impl FeatureLabel {
    /// Parse `accession|FEATURES|source|category|gene`
    pub fn parse(id: &str) -> Option<Self> {
        let fields: Vec<&str> = id.split('|').collect();
        let marker = fields.iter().position(|f| *f == FEATURE_MARKER)?;
        let rest = &fields[marker + 1..];
        if rest.len() < 3 || rest[..3].iter().any(|f| f.trim().is_empty()) {
            return None;
        }

        Some(Self {
            source: rest[0].trim().to_string(),
            category: rest[1].trim().to_string(),
            gene_name: rest[2].trim().to_string(),
        })
    }
}
