use serde::{Deserialize, Serialize};

/// Operating mode of a run, fixed for its whole duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelMode {
    /// Assembled genes or contigs: overlap-checked, every hit kept
    LongSequence,
    /// Short reads: one best hit per read, normalized against 16S counts
    ShortRead,
}

impl ModelMode {
    /// Parse the model codes used on the command line (`LS` / `SS`)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "LS" | "GENES" | "LONG" | "LONG_SEQUENCE" => Some(Self::LongSequence),
            "SS" | "READS" | "SHORT" | "SHORT_READ" => Some(Self::ShortRead),
            _ => None,
        }
    }

    /// Whether the overlap cutoff participates in hit filtering
    #[must_use]
    pub fn checks_overlap(self) -> bool {
        matches!(self, Self::LongSequence)
    }
}

impl std::fmt::Display for ModelMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LongSequence => write!(f, "LS (genes)"),
            Self::ShortRead => write!(f, "SS (reads)"),
        }
    }
}

/// Molecule type of the query sequences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoleculeType {
    /// Nucleotide queries searched against protein references (translated search)
    #[default]
    Nucleotide,
    /// Protein queries searched against protein references
    Protein,
}

impl MoleculeType {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "nucl" | "nucleotide" | "dna" => Some(Self::Nucleotide),
            "prot" | "protein" | "aa" => Some(Self::Protein),
            _ => None,
        }
    }

    /// Number of query positions per reference residue
    #[must_use]
    pub fn query_scale(self) -> u64 {
        match self {
            Self::Nucleotide => 3,
            Self::Protein => 1,
        }
    }
}

impl std::fmt::Display for MoleculeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nucleotide => write!(f, "nucl"),
            Self::Protein => write!(f, "prot"),
        }
    }
}

/// Terminal state of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Output written, nothing to report
    Completed,
    /// Output written, but records were skipped or a value was undefined
    CompletedWithWarnings,
    /// Nothing could be resolved. `Pipeline::run` reports this state as a
    /// `PipelineError` rather than a summary, so no output is written.
    Failed,
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::CompletedWithWarnings => write!(f, "completed with warnings"),
            Self::Failed => write!(f, "failed"),
        }
    }
}
