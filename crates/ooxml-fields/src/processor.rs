/*
 * processor.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! High-level entry points.
//!
//! [`FieldProcessor`] owns one parsed document and runs the passes against
//! it, accumulating diagnostics. The free functions wrap it for the common
//! one-shot calls.

use crate::ast::FieldJsonStructure;
use crate::conditional;
use crate::context::DataContext;
use crate::diagnostics::{DiagnosticCollector, DiagnosticMessage};
use crate::document::WordDocument;
use crate::error::FieldResult;
use crate::extract;
use crate::merge::{self, SubstitutionRecord};
use crate::options::ProcessOptions;
use crate::simplify;
use serde::Serialize;

/// Result of a mutating call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessOutput {
    /// The serialized document.
    pub xml: String,
    pub diagnostics: Vec<DiagnosticMessage>,
}

/// Result of an extraction call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractOutput {
    pub fields: FieldJsonStructure,
    pub diagnostics: Vec<DiagnosticMessage>,
}

/// A document under processing.
///
/// ```
/// use ooxml_fields::{DataContext, FieldProcessor, ProcessOptions};
///
/// let xml = r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body/></w:document>"#;
/// let mut processor = FieldProcessor::new(xml, ProcessOptions::default())?;
/// processor.process_merge_fields();
/// processor.process_if_fields(&DataContext::default());
/// assert!(processor.diagnostics().is_empty());
/// # Ok::<(), ooxml_fields::FieldError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FieldProcessor {
    doc: WordDocument,
    options: ProcessOptions,
    diagnostics: DiagnosticCollector,
}

impl FieldProcessor {
    /// Parse document markup.
    ///
    /// # Errors
    ///
    /// Fails if the markup is not well-formed XML.
    pub fn new(xml: &str, options: ProcessOptions) -> FieldResult<Self> {
        Ok(Self {
            doc: WordDocument::parse(xml)?,
            options,
            diagnostics: DiagnosticCollector::new(),
        })
    }

    pub fn document(&self) -> &WordDocument {
        &self.doc
    }

    pub fn options(&self) -> &ProcessOptions {
        &self.options
    }

    /// Replace every merge field's result with the placeholder. Returns the
    /// number of fields substituted.
    pub fn process_merge_fields(&mut self) -> usize {
        merge::process_merge_fields(&mut self.doc, &self.options, &mut self.diagnostics)
    }

    /// Evaluate and prune every IF field. Returns the number of top-level
    /// fields applied.
    pub fn process_if_fields(&mut self, context: &DataContext) -> usize {
        conditional::process_if_fields(&mut self.doc, context, &self.options, &mut self.diagnostics)
    }

    /// Describe the document's fields without modifying it.
    pub fn extract_fields(&mut self) -> FieldJsonStructure {
        extract::extract(&self.doc, &self.options, &mut self.diagnostics)
    }

    /// Non-empty text of every `w:t`.
    pub fn text_runs(&self) -> Vec<String> {
        extract::text_runs(&self.doc)
    }

    /// Substitution records left by [`Self::process_merge_fields`].
    pub fn substitution_records(&self) -> Vec<SubstitutionRecord> {
        merge::substitution_records(&self.doc)
    }

    /// Simplify the tree and serialize it without blank lines.
    pub fn simplify(&mut self) -> String {
        simplify::simplify_to_string(&mut self.doc)
    }

    pub fn to_xml(&self) -> String {
        self.doc.to_xml()
    }

    pub fn diagnostics(&self) -> &[DiagnosticMessage] {
        self.diagnostics.diagnostics()
    }

    pub fn into_diagnostics(self) -> Vec<DiagnosticMessage> {
        self.diagnostics.into_diagnostics()
    }
}

/// Substitute merge fields and prune IF fields.
///
/// Runs the passes enabled in `options`, merge fields first. A `None`
/// context behaves as an empty object.
///
/// # Errors
///
/// Fails only if the markup does not parse; per-field problems are returned
/// as diagnostics.
pub fn process_document(
    xml: &str,
    data: Option<&DataContext>,
    options: &ProcessOptions,
) -> FieldResult<ProcessOutput> {
    let empty = DataContext::default();
    let context = data.unwrap_or(&empty);
    let mut processor = FieldProcessor::new(xml, options.clone())?;

    let merged = if options.merge_fields {
        processor.process_merge_fields()
    } else {
        0
    };
    let applied = if options.if_fields {
        processor.process_if_fields(context)
    } else {
        0
    };
    tracing::debug!(
        merged,
        applied,
        diagnostics = processor.diagnostics().len(),
        "processed document"
    );

    Ok(ProcessOutput {
        xml: processor.to_xml(),
        diagnostics: processor.into_diagnostics(),
    })
}

/// [`process_document`] with the data context given as JSON text.
///
/// # Errors
///
/// Fails if the data is not valid JSON or the markup does not parse.
pub fn process_document_json(
    xml: &str,
    data: Option<&str>,
    options: &ProcessOptions,
) -> FieldResult<ProcessOutput> {
    let context = data.map(DataContext::from_json).transpose()?;
    process_document(xml, context.as_ref(), options)
}

/// Describe every field of a document.
///
/// # Errors
///
/// Fails if the markup does not parse.
pub fn extract_fields(xml: &str) -> FieldResult<ExtractOutput> {
    let mut processor = FieldProcessor::new(xml, ProcessOptions::default())?;
    let fields = processor.extract_fields();
    Ok(ExtractOutput {
        fields,
        diagnostics: processor.into_diagnostics(),
    })
}

/// Simplify a document and serialize it without blank lines.
///
/// # Errors
///
/// Fails if the markup does not parse.
pub fn simplify_xml(xml: &str) -> FieldResult<String> {
    let mut processor = FieldProcessor::new(xml, ProcessOptions::default())?;
    Ok(processor.simplify())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FieldError;

    #[test]
    fn test_invalid_markup_is_an_error() {
        let err = process_document("<w:document>", None, &ProcessOptions::default()).unwrap_err();
        assert!(matches!(err, FieldError::Xml(_)));
        assert!(extract_fields("").is_err());
        assert!(simplify_xml("<a></b>").is_err());
    }

    #[test]
    fn test_invalid_data_is_an_error() {
        let err = process_document_json("<a/>", Some("{"), &ProcessOptions::default()).unwrap_err();
        assert!(matches!(err, FieldError::DataContext(_)));
    }

    #[test]
    fn test_passes_can_be_disabled() {
        let xml = r#"<a/>"#;
        let options = ProcessOptions {
            merge_fields: false,
            if_fields: false,
            ..ProcessOptions::default()
        };
        let output = process_document(xml, None, &options).unwrap();
        assert_eq!(output.xml, "<a/>");
        assert!(output.diagnostics.is_empty());
    }
}
