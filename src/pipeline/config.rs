use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::classify::DEFAULT_BATCH_SIZE;
use crate::core::types::{ModelMode, MoleculeType};
use crate::filtering::HitFilter;
use crate::resolve::Resolver;
use crate::utils::validation::{
    validate_evalue, validate_fraction, validate_nonzero, validate_percent, ValidationError,
};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("No model selected: pass --model LS|SS or set \"mode\" in the config file")]
    MissingMode,

    #[error("Invalid cutoff: {0}")]
    Invalid(#[from] ValidationError),
}

/// Numeric cutoffs applied by the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cutoffs {
    /// Minimum alignment identity, percent
    pub identity_pct: f64,
    /// Maximum alignment e-value
    pub evalue: f64,
    /// Minimum overlap fraction (genes mode only)
    pub overlap: f64,
    /// Minimum classifier probability
    pub min_prob: f64,
    /// Minimum gene coverage fraction
    pub gene_coverage: f64,
}

impl Cutoffs {
    /// Defaults used by each model
    #[must_use]
    pub fn for_mode(mode: ModelMode) -> Self {
        match mode {
            ModelMode::LongSequence => Self {
                identity_pct: 50.0,
                evalue: 1e-10,
                overlap: 0.8,
                min_prob: 0.8,
                gene_coverage: 0.0,
            },
            ModelMode::ShortRead => Self {
                identity_pct: 80.0,
                evalue: 1e-10,
                overlap: 0.8,
                min_prob: 0.8,
                gene_coverage: 0.01,
            },
        }
    }

    /// Check every cutoff is in range
    ///
    /// # Errors
    ///
    /// Returns the first `ValidationError` found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_percent("identity cutoff", self.identity_pct)?;
        validate_evalue("e-value cutoff", self.evalue)?;
        validate_fraction("overlap cutoff", self.overlap)?;
        validate_fraction("probability cutoff", self.min_prob)?;
        validate_fraction("gene coverage cutoff", self.gene_coverage)?;
        Ok(())
    }
}

/// Immutable run configuration threaded through every stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub mode: ModelMode,
    pub molecule: MoleculeType,
    pub cutoffs: Cutoffs,
    /// Hits per classifier call
    pub batch_size: usize,
}

impl PipelineConfig {
    /// Configuration with the model's default cutoffs
    #[must_use]
    pub fn new(mode: ModelMode) -> Self {
        Self {
            mode,
            molecule: MoleculeType::default(),
            cutoffs: Cutoffs::for_mode(mode),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    #[must_use]
    pub fn with_cutoffs(mut self, cutoffs: Cutoffs) -> Self {
        self.cutoffs = cutoffs;
        self
    }

    #[must_use]
    pub fn with_molecule(mut self, molecule: MoleculeType) -> Self {
        self.molecule = molecule;
        self
    }

    /// Build a configuration from layered overrides on top of mode defaults
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingMode` if no mode is set, or
    /// `ConfigError::Invalid` if a cutoff is out of range.
    pub fn from_overrides(overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
        let mode = overrides.mode.ok_or(ConfigError::MissingMode)?;
        let mut config = Self::new(mode);

        if let Some(molecule) = overrides.molecule {
            config.molecule = molecule;
        }
        let cutoffs = &mut config.cutoffs;
        if let Some(v) = overrides.identity {
            cutoffs.identity_pct = v;
        }
        if let Some(v) = overrides.evalue {
            cutoffs.evalue = v;
        }
        if let Some(v) = overrides.overlap {
            cutoffs.overlap = v;
        }
        if let Some(v) = overrides.min_prob {
            cutoffs.min_prob = v;
        }
        if let Some(v) = overrides.gene_coverage {
            cutoffs.gene_coverage = v;
        }
        if let Some(v) = overrides.batch_size {
            config.batch_size = v;
        }

        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns the first `ValidationError` found.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.cutoffs.validate()?;
        validate_nonzero("batch size", self.batch_size)?;
        Ok(())
    }

    /// Alignment filter for this mode; the overlap check is genes-mode only
    #[must_use]
    pub fn hit_filter(&self) -> HitFilter {
        let filter = HitFilter::new(self.cutoffs.identity_pct, self.cutoffs.evalue);
        if self.mode.checks_overlap() {
            filter.with_overlap(self.cutoffs.overlap, self.molecule)
        } else {
            filter
        }
    }

    #[must_use]
    pub fn resolver(&self) -> Resolver {
        Resolver::new(self.cutoffs.min_prob, self.cutoffs.gene_coverage)
    }
}

/// Optional settings from a config file or the command line.
///
/// Later layers win: see [`ConfigOverrides::merged_with`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigOverrides {
    pub mode: Option<ModelMode>,
    pub molecule: Option<MoleculeType>,
    pub identity: Option<f64>,
    pub evalue: Option<f64>,
    pub overlap: Option<f64>,
    pub min_prob: Option<f64>,
    pub gene_coverage: Option<f64>,
    pub batch_size: Option<usize>,
}

impl ConfigOverrides {
    /// Load overrides from a JSON file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ReadError` or `ConfigError::ParseError`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Layer `other` on top of `self`; fields set in `other` win
    #[must_use]
    pub fn merged_with(self, other: Self) -> Self {
        Self {
            mode: other.mode.or(self.mode),
            molecule: other.molecule.or(self.molecule),
            identity: other.identity.or(self.identity),
            evalue: other.evalue.or(self.evalue),
            overlap: other.overlap.or(self.overlap),
            min_prob: other.min_prob.or(self.min_prob),
            gene_coverage: other.gene_coverage.or(self.gene_coverage),
            batch_size: other.batch_size.or(self.batch_size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_defaults() {
        let genes = PipelineConfig::new(ModelMode::LongSequence);
        assert!((genes.cutoffs.identity_pct - 50.0).abs() < 0.001);
        assert!((genes.cutoffs.gene_coverage - 0.0).abs() < 0.001);

        let reads = PipelineConfig::new(ModelMode::ShortRead);
        assert!((reads.cutoffs.identity_pct - 80.0).abs() < 0.001);
        assert!((reads.cutoffs.gene_coverage - 0.01).abs() < 0.0001);
        assert!(reads.validate().is_ok());
    }

    #[test]
    fn test_overrides_layering() {
        let file: ConfigOverrides =
            serde_json::from_str(r#"{"mode": "short_read", "identity": 70.0, "min_prob": 0.5}"#)
                .unwrap();
        let cli = ConfigOverrides {
            identity: Some(90.0),
            ..ConfigOverrides::default()
        };

        let config = PipelineConfig::from_overrides(&file.merged_with(cli)).unwrap();
        assert_eq!(config.mode, ModelMode::ShortRead);
        assert!((config.cutoffs.identity_pct - 90.0).abs() < 0.001);
        assert!((config.cutoffs.min_prob - 0.5).abs() < 0.001);
        assert!((config.cutoffs.evalue - 1e-10).abs() < 1e-15);
    }

    #[test]
    fn test_overrides_require_mode() {
        let err = PipelineConfig::from_overrides(&ConfigOverrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingMode));
    }

    #[test]
    fn test_invalid_cutoff_rejected() {
        let overrides = ConfigOverrides {
            mode: Some(ModelMode::LongSequence),
            overlap: Some(80.0),
            ..ConfigOverrides::default()
        };
        let err = PipelineConfig::from_overrides(&overrides).unwrap_err();
        assert!(err.to_string().contains("overlap cutoff"));
    }

    #[test]
    fn test_unknown_config_field_rejected() {
        let result: Result<ConfigOverrides, _> = serde_json::from_str(r#"{"identiy": 70}"#);
        assert!(result.is_err());
    }
}
