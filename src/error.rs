use std::path::PathBuf;
use thiserror::Error;

use crate::conversion::{ConvertIssue, IssueList};

/// The main error type for accuvote-convert operations.
#[derive(Debug, Error)]
pub enum AccuvoteError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse ballot definition {path}:\n{}", IssueList(.issues))]
    DefinitionParse {
        path: PathBuf,
        issues: Vec<ConvertIssue>,
    },

    #[error("Failed to parse detection JSON from {path}: {source}")]
    DetectionJsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse config {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("Invalid config {path}: {message}")]
    InvalidConfig { path: PathBuf, message: String },

    #[error("Failed to write JSON to {path}: {source}")]
    JsonWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Conversion failed with {} issue(s):\n{}", .issues.len(), IssueList(.issues))]
    ConversionFailed { issues: Vec<ConvertIssue> },
}
