use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use thiserror::Error;
use tracing::warn;

use crate::core::reference::ReferenceGene;
use crate::parsing;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Failed to read reference database: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse reference database: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Failed to parse reference metadata: {0}")]
    Metadata(#[from] parsing::alignment::ParseError),
}

/// Database format version for compatibility checking
pub const DATABASE_VERSION: &str = "1.0.0";

/// Serializable database format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseData {
    pub version: String,
    pub created_at: String,
    pub genes: Vec<ReferenceGene>,
}

/// Reference gene metadata indexed by id
#[derive(Debug)]
pub struct ReferenceDatabase {
    /// All reference genes
    pub genes: Vec<ReferenceGene>,

    /// Index: reference id -> index in genes vec
    id_to_index: HashMap<String, usize>,
}

impl ReferenceDatabase {
    /// Create an empty database
    pub fn new() -> Self {
        Self {
            genes: Vec::new(),
            id_to_index: HashMap::new(),
        }
    }

    /// Load a database, choosing JSON or TSV by file extension
    pub fn load_from_file(path: &Path) -> Result<Self, DatabaseError> {
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        if is_json {
            let content = std::fs::read_to_string(path)?;
            Self::from_json(&content)
        } else {
            let genes = parsing::metadata::parse_metadata_file(path)?;
            Ok(Self::from_genes(genes))
        }
    }

    /// Parse a database from a JSON string
    pub fn from_json(json: &str) -> Result<Self, DatabaseError> {
        let data: DatabaseData = serde_json::from_str(json)?;

        // Version check (warn but don't fail)
        if data.version != DATABASE_VERSION {
            warn!(
                expected = DATABASE_VERSION,
                found = %data.version,
                "Reference database version mismatch"
            );
        }

        Ok(Self::from_genes(
            data.genes
                .into_iter()
                .map(ReferenceGene::enriched_from_label),
        ))
    }

    pub fn from_genes(genes: impl IntoIterator<Item = ReferenceGene>) -> Self {
        let mut database = Self::new();
        for gene in genes {
            database.add_gene(gene);
        }
        database
    }

    /// Add a gene; a later record with the same id replaces the earlier one
    pub fn add_gene(&mut self, gene: ReferenceGene) {
        if let Some(&index) = self.id_to_index.get(&gene.id) {
            warn!(reference = %gene.id, "Duplicate reference id, keeping the last record");
            self.genes[index] = gene;
            return;
        }

        let index = self.genes.len();
        self.id_to_index.insert(gene.id.clone(), index);
        self.genes.push(gene);
    }

    /// Get a gene by id
    pub fn get(&self, id: &str) -> Option<&ReferenceGene> {
        self.id_to_index.get(id).map(|&idx| &self.genes[idx])
    }

    /// Get a gene by id, falling back to the annotation embedded in the id
    pub fn lookup<'a>(&'a self, id: &str) -> Option<Cow<'a, ReferenceGene>> {
        self.get(id)
            .map(Cow::Borrowed)
            .or_else(|| ReferenceGene::from_label(id).map(Cow::Owned))
    }

    /// Gene length for an id, if the database knows it
    pub fn gene_length(&self, id: &str) -> Option<u64> {
        self.get(id).and_then(|g| g.gene_length)
    }

    /// Number of genes per category, sorted by category name
    pub fn category_counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for gene in &self.genes {
            let category = gene.category.clone().unwrap_or_else(|| "unknown".to_string());
            *counts.entry(category).or_insert(0) += 1;
        }
        counts
    }

    /// Export database to JSON
    pub fn to_json(&self) -> Result<String, DatabaseError> {
        let data = DatabaseData {
            version: DATABASE_VERSION.to_string(),
            created_at: chrono::Utc::now().to_rfc3339(),
            genes: self.genes.clone(),
        };
        Ok(serde_json::to_string_pretty(&data)?)
    }

    /// Number of genes in the database
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    /// Check if database is empty
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }
}

impl Default for ReferenceDatabase {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_database() -> ReferenceDatabase {
        ReferenceDatabase::from_genes(vec![
            ReferenceGene::new("ref1")
                .with_length(300)
                .with_category("betalactam"),
            ReferenceGene::new("ref2").with_category("sulfonamide"),
            ReferenceGene::new("ref3")
                .with_length(500)
                .with_category("betalactam"),
        ])
    }

    #[test]
    fn test_database_get_by_id() {
        let db = make_test_database();
        assert_eq!(db.len(), 3);
        assert_eq!(db.get("ref1").unwrap().gene_length, Some(300));
        assert!(db.get("missing").is_none());
        assert_eq!(db.gene_length("ref2"), None);
    }

    #[test]
    fn test_lookup_falls_back_to_label() {
        let db = make_test_database();
        let gene = db.lookup("X1|FEATURES|CARD|tetracycline|tetM").unwrap();
        assert_eq!(gene.category.as_deref(), Some("tetracycline"));
        assert!(matches!(gene, Cow::Owned(_)));
        assert!(db.lookup("unlabelled").is_none());
    }

    #[test]
    fn test_duplicate_id_replaces() {
        let mut db = make_test_database();
        db.add_gene(ReferenceGene::new("ref1").with_length(900));
        assert_eq!(db.len(), 3);
        assert_eq!(db.gene_length("ref1"), Some(900));
    }

    #[test]
    fn test_category_counts() {
        let db = make_test_database();
        let counts = db.category_counts();
        assert_eq!(counts["betalactam"], 2);
        assert_eq!(counts["sulfonamide"], 1);
    }

    #[test]
    fn test_json_round_trip() {
        let db = make_test_database();
        let json = db.to_json().unwrap();
        assert!(json.contains("\"version\""));
        assert!(json.contains("\"genes\""));

        let reloaded = ReferenceDatabase::from_json(&json).unwrap();
        assert_eq!(reloaded.len(), 3);
        assert_eq!(reloaded.gene_length("ref3"), Some(500));
    }
}
