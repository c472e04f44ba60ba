use std::path::PathBuf;
use thiserror::Error;

/// Failures that abort a build run.
///
/// Every variant is fatal: the orchestrator computes all artifacts in memory
/// before writing anything, so a `BuildError` means no output file was
/// touched.
#[derive(Debug, Error)]
pub enum BuildError {
    /// A required input file is absent before any output is produced.
    #[error("missing {what}: {path:?}")]
    MissingInput { what: &'static str, path: PathBuf },

    /// An annotation pair whose declaration line does not yield a function
    /// name. Carries the 1-based line number of the annotation line.
    #[error("malformed annotation at line {line}: {reason}")]
    MalformedAnnotation { line: usize, reason: String },

    /// A referenced template file is absent at render time.
    #[error("missing template: {path:?}")]
    MissingTemplate { path: PathBuf },
}
