use thiserror::Error;

/// Hard failures of a run. Per-file problems (unreadable text, parse
/// failures, unresolved imports) are recorded in the analysis instead.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("dependency edge {source_file} -> {target_file} references a file outside the scanned set")]
    DanglingEdge {
        source_file: String,
        target_file: String,
    },

    #[error("unknown file: {0}")]
    UnknownFile(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
