//! Error types for the reconciliation pipeline.

use std::path::PathBuf;

/// All errors that can abort a pipeline run.
///
/// Numeric cell parse failures never surface here; the normalizer turns a
/// malformed cell into an absent value.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("could not find header row starting with '{expected}' in the {format} export")]
    HeaderNotFound {
        expected: &'static str,
        format: &'static str,
    },

    #[error("malformed CSV on line {line}: {source}")]
    Csv { line: usize, source: csv::Error },

    #[error("unknown source format '{0}' (known: fidelity)")]
    UnknownFormat(String),

    #[error("total portfolio value computed as {total:.2}; it must be > 0 and finite (check the positions export)")]
    ZeroPortfolio { total: f64 },

    #[error("policy error: {0}")]
    Policy(String),

    #[error("failed to read policy file {path}: {source}")]
    PolicyRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse policy JSON: {0}")]
    PolicyParse(#[from] serde_json::Error),

    #[error("failed to read thesis file {path}: {source}")]
    ThesisRead {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
