use serde::{Deserialize, Serialize};

use crate::align::AlignConfig;

/// Summary of a file-pipeline run, printed with `--json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Unique ID for this run
    pub execution_id: String,
    /// Path of the M2 file written
    pub output: String,
    /// Alignment settings used
    pub align: AlignConfig,
    /// Sentence pairs annotated
    pub sentences: usize,
    /// Classified (non-noop) edits written
    pub edits: usize,
    /// Noop edits written
    pub noops: usize,
    /// BLAKE3 hash of the output file (hex-encoded)
    pub output_checksum: String,
    /// Whether one input file had lines left over
    pub truncated: bool,
}

impl RunReport {
    pub fn new(output: impl Into<String>, align: AlignConfig) -> Self {
        Self {
            execution_id: generate_execution_id(),
            output: output.into(),
            align,
            sentences: 0,
            edits: 0,
            noops: 0,
            output_checksum: String::new(),
            truncated: false,
        }
    }

    /// One-line human-readable summary
    pub fn summary(&self) -> String {
        format!(
            "Annotated {} sentence(s): {} edit(s), {} noop(s)\nOutput: {}\nOutput checksum: {}",
            self.sentences, self.edits, self.noops, self.output, self.output_checksum
        )
    }
}

/// Generate a unique execution ID using UUID v4
pub fn generate_execution_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
