/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types for whole-document failures.
//!
//! Only problems that make the whole call meaningless are errors: markup
//! that does not parse, and a data context that is not valid JSON. Problems
//! with individual fields are diagnostics (see [`crate::diagnostics`]).

use crate::diagnostics::{DiagnosticMessage, DiagnosticMessageBuilder};
use thiserror::Error;

/// Errors that abort a processing call.
#[derive(Debug, Error)]
pub enum FieldError {
    /// The input markup could not be parsed.
    #[error("Invalid document markup: {0}")]
    Xml(#[from] ooxml_xml::Error),

    /// The data context could not be decoded.
    #[error("Invalid data context: {0}")]
    DataContext(#[from] serde_json::Error),
}

/// Result type for field operations.
pub type FieldResult<T> = Result<T, FieldError>;

impl FieldError {
    /// Convert this error to a DiagnosticMessage with an `F-0-*` code.
    pub fn to_diagnostic(&self) -> DiagnosticMessage {
        match self {
            FieldError::Xml(err) => {
                let mut builder = DiagnosticMessageBuilder::error("Invalid Document Markup")
                    .with_code("F-0-1")
                    .problem(err.to_string());
                if let Some(pos) = err.position() {
                    builder = builder.add_detail(format!("Error at byte offset {}", pos));
                }
                builder
                    .add_hint("Is the input the `word/document.xml` part of the package?")
                    .build()
            }
            FieldError::DataContext(err) => {
                DiagnosticMessageBuilder::error("Invalid Data Context")
                    .with_code("F-0-2")
                    .problem(err.to_string())
                    .add_detail(format!("Error at line {}, column {}", err.line(), err.column()))
                    .build()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xml_error_diagnostic() {
        let err = FieldError::from(ooxml_xml::Error::EmptyDocument);
        let diag = err.to_diagnostic();
        assert_eq!(diag.code.as_deref(), Some("F-0-1"));
        assert!(err.to_string().starts_with("Invalid document markup"));
    }

    #[test]
    fn test_data_error_diagnostic() {
        let json_err = serde_json::from_str::<serde_json::Value>("{ nope").unwrap_err();
        let err = FieldError::from(json_err);
        let diag = err.to_diagnostic();
        assert_eq!(diag.code.as_deref(), Some("F-0-2"));
        assert_eq!(diag.details.len(), 1);
    }
}
