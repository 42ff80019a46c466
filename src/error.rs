use std::fmt;
use std::path::Path;

use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;

use crate::edit::CapturedStack;
use crate::locate::ArgumentRange;

/// One side of a range conflict, kept as plain data so diagnostics can show
/// where each colliding edit came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictingEdit {
    pub range: ArgumentRange,
    pub stack: CapturedStack,
}

impl fmt::Display for ConflictingEdit {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            formatter,
            "[{}, {}) recorded at:\n{}",
            self.range.start, self.range.end, self.stack
        )
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum SnapError {
    #[error("Failed to access file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("File '{path}' is busy: another snapshot flush is in progress")]
    FileBusy { path: String },

    #[error("Unexpected snapshot expression at {file}:{line}:{column}\n{stack}")]
    LocateFailed {
        file: String,
        line: usize,
        column: usize,
        stack: CapturedStack,
    },

    #[error(
        "Multiple inline snapshots written to the same location in '{file}':\n{first}\n{second}"
    )]
    Conflict {
        file: String,
        first: ConflictingEdit,
        second: ConflictingEdit,
    },

    #[error("Edit range [{start}, {end}) is not a valid UTF-8 boundary range for file '{path}'")]
    InvalidSpan {
        path: String,
        start: usize,
        end: usize,
    },

    #[error("Failed to serialize flush report: {source}")]
    ReportSerialization {
        #[source]
        source: serde_json::Error,
    },
}

impl SnapError {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }

    pub fn to_error_response(&self) -> ErrorResponse {
        match self {
            Self::Io { .. } => ErrorResponse {
                error: ErrorBody {
                    r#type: "io_error".to_string(),
                    message: self.to_string(),
                    suggestion: None,
                },
            },
            Self::FileBusy { .. } => ErrorResponse {
                error: ErrorBody {
                    r#type: "file_busy".to_string(),
                    message: self.to_string(),
                    suggestion: Some("Retry after the current flush completes".to_string()),
                },
            },
            Self::LocateFailed { .. } => ErrorResponse {
                error: ErrorBody {
                    r#type: "locate_failed".to_string(),
                    message: self.to_string(),
                    suggestion: Some(
                        "The recorded call site no longer matches the file on disk; re-run the test suite against fresh sources"
                            .to_string(),
                    ),
                },
            },
            Self::Conflict { .. } => ErrorResponse {
                error: ErrorBody {
                    r#type: "snapshot_conflict".to_string(),
                    message: self.to_string(),
                    suggestion: Some(
                        "Ensure each inline snapshot call site records at most one edit per run"
                            .to_string(),
                    ),
                },
            },
            Self::InvalidSpan { .. } => ErrorResponse {
                error: ErrorBody {
                    r#type: "invalid_span".to_string(),
                    message: self.to_string(),
                    suggestion: None,
                },
            },
            Self::ReportSerialization { .. } => ErrorResponse {
                error: ErrorBody {
                    r#type: "serialization_error".to_string(),
                    message: self.to_string(),
                    suggestion: None,
                },
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub r#type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}
