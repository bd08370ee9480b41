/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Field templating for WordprocessingML documents.
//!
//! This crate works on the `word/document.xml` part of a `.docx` package and
//! understands two kinds of Word fields:
//!
//! - Merge fields: `MERGEFIELD step.question`, replaced by a placeholder that
//!   records the field path
//! - IF fields: `IF "step.question" = "Oui" "%iftrue%" "%iffalse%"`, whose
//!   branches are the document content up to `%else%` and `%end%` markers,
//!   nested to any depth
//!
//! It can extract a JSON description of those fields, rewrite the document
//! against a JSON data context, and simplify the markup by removing
//! presentation-only elements.
//!
//! # Example
//!
//! ```
//! use ooxml_fields::{ProcessOptions, process_document_json};
//!
//! let xml = concat!(
//!     r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
//!     r#"<w:body><w:p>"#,
//!     r#"<w:r><w:fldChar w:fldCharType="begin"/></w:r>"#,
//!     r#"<w:r><w:instrText> MERGEFIELD client.name </w:instrText></w:r>"#,
//!     r#"<w:r><w:fldChar w:fldCharType="separate"/></w:r>"#,
//!     r#"<w:r><w:t>«client.name»</w:t></w:r>"#,
//!     r#"<w:r><w:fldChar w:fldCharType="end"/></w:r>"#,
//!     r#"</w:p></w:body></w:document>"#,
//! );
//!
//! let output = process_document_json(xml, Some("{}"), &ProcessOptions::default())?;
//! assert!(output.xml.contains(r#"<w:t data-merge-field="client.name">..........</w:t>"#));
//! # Ok::<(), ooxml_fields::FieldError>(())
//! ```

pub mod ast;
pub mod conditional;
pub mod context;
pub mod diagnostics;
pub mod document;
pub mod error;
pub mod evaluator;
pub mod extract;
pub mod instruction;
pub mod locator;
pub mod merge;
pub mod options;
pub mod processor;
pub mod simplify;

// Re-export main types at crate root
pub use ast::{BranchContent, BranchItem, FieldJsonStructure, IfField};
pub use context::DataContext;
pub use diagnostics::{DiagnosticCollector, DiagnosticKind, DiagnosticMessage, DiagnosticMessageBuilder};
pub use document::{FieldCharType, WORDML_NS, WordDocument};
pub use error::{FieldError, FieldResult};
pub use merge::SubstitutionRecord;
pub use options::{ElsePolicy, ProcessOptions};
pub use processor::{
    ExtractOutput, FieldProcessor, ProcessOutput, extract_fields, process_document,
    process_document_json, simplify_xml,
};
