//! Error types for report definition, rendering and output.
//!
//! Every error is fail-fast: rendering stops at the first one and nothing is
//! retried. Row and column indices are zero-based.

use csv_types::{BoxError, FormatError};
use std::path::PathBuf;
use thiserror::Error;

/// The report definition failed validation. Raised before any row is read.
#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("Report definition columns could not be empty")]
    EmptyColumns,

    #[error("Report definition column[{index}] name is invalid")]
    InvalidColumnName { index: usize },

    #[error("Report definition column[{index}] mapper could not be null")]
    MissingExtractor { index: usize },

    #[error("Report definition has an invalid pattern: {0}")]
    InvalidPattern(#[from] FormatError),
}

/// Mapping a single row failed. Carries the column but not the row index,
/// which only the renderer knows.
#[derive(Debug, Error)]
pub enum RowError {
    #[error("Failed to extract column[{column}] '{name}': {source}")]
    Extraction {
        column: usize,
        name: String,
        #[source]
        source: BoxError,
    },

    #[error("Failed to format column[{column}] '{name}': {source}")]
    Formatter {
        column: usize,
        name: String,
        #[source]
        source: FormatError,
    },

    #[error("Report definition column[{column}] mapper could not be null")]
    MissingExtractor { column: usize, name: String },
}

/// Errors surfaced by a render.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Definition(#[from] DefinitionError),

    #[error("Row {row}: failed to extract column[{column}] '{name}': {source}")]
    Extraction {
        row: usize,
        column: usize,
        name: String,
        #[source]
        source: BoxError,
    },

    #[error("Row {row}: failed to format column[{column}] '{name}': {source}")]
    Formatter {
        row: usize,
        column: usize,
        name: String,
        #[source]
        source: FormatError,
    },

    #[error("Row {row}: row source failed: {source}")]
    Source {
        row: usize,
        #[source]
        source: BoxError,
    },

    #[error("Output error: {0}")]
    Sink(#[from] std::io::Error),

    #[error("Report path {} escapes output directory {}", .path.display(), .dir.display())]
    PathEscape { dir: PathBuf, path: PathBuf },
}

impl ReportError {
    /// Attach the row index to a row mapping failure.
    pub fn from_row_error(row: usize, err: RowError) -> Self {
        match err {
            RowError::Extraction {
                column,
                name,
                source,
            } => ReportError::Extraction {
                row,
                column,
                name,
                source,
            },
            RowError::Formatter {
                column,
                name,
                source,
            } => ReportError::Formatter {
                row,
                column,
                name,
                source,
            },
            RowError::MissingExtractor { column, .. } => {
                ReportError::Definition(DefinitionError::MissingExtractor { index: column })
            }
        }
    }

    /// Index of the data row that failed, if the error belongs to a row.
    pub fn row(&self) -> Option<usize> {
        match self {
            ReportError::Extraction { row, .. }
            | ReportError::Formatter { row, .. }
            | ReportError::Source { row, .. } => Some(*row),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_error_messages() {
        assert_eq!(
            DefinitionError::EmptyColumns.to_string(),
            "Report definition columns could not be empty"
        );
        assert_eq!(
            DefinitionError::InvalidColumnName { index: 1 }.to_string(),
            "Report definition column[1] name is invalid"
        );
        assert_eq!(
            DefinitionError::MissingExtractor { index: 0 }.to_string(),
            "Report definition column[0] mapper could not be null"
        );
    }

    #[test]
    fn test_definition_error_is_transparent() {
        let err: ReportError = DefinitionError::EmptyColumns.into();
        assert_eq!(err.to_string(), "Report definition columns could not be empty");
        assert_eq!(err.row(), None);
    }

    #[test]
    fn test_from_row_error_tags_row() {
        let err = ReportError::from_row_error(
            3,
            RowError::Extraction {
                column: 1,
                name: "Price".to_string(),
                source: "missing".into(),
            },
        );
        assert_eq!(err.row(), Some(3));
        assert_eq!(
            err.to_string(),
            "Row 3: failed to extract column[1] 'Price': missing"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ReportError = io_error.into();
        assert!(matches!(err, ReportError::Sink(_)));
        assert!(err.to_string().contains("Output error"));
    }
}
