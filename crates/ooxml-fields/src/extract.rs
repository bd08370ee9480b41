/*
 * extract.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Read-only field extraction.

use crate::ast::FieldJsonStructure;
use crate::conditional::parse_if_fields;
use crate::diagnostics::DiagnosticCollector;
use crate::document::{WordDocument, names};
use crate::merge::merge_field_names;
use crate::options::ProcessOptions;

/// Describe every merge field and top-level IF field of a document.
///
/// The document is not modified. Malformed IF fields are left out of the
/// result and reported to `diagnostics`.
pub fn extract(
    doc: &WordDocument,
    options: &ProcessOptions,
    diagnostics: &mut DiagnosticCollector,
) -> FieldJsonStructure {
    let merge_fields = merge_field_names(doc);
    let if_fields = parse_if_fields(doc, options, diagnostics)
        .iter()
        .map(|parsed| parsed.to_if_field())
        .collect();
    FieldJsonStructure {
        merge_fields,
        if_fields,
    }
}

/// The non-empty text of every `w:t`, in document order.
pub fn text_runs(doc: &WordDocument) -> Vec<String> {
    doc.elements(names::TEXT)
        .into_iter()
        .map(|t| doc.text_content(t))
        .filter(|text| !text.is_empty())
        .collect()
}
