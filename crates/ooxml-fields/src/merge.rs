/*
 * merge.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Merge-field substitution.
//!
//! Each merge field's rendered result (the `«name»` text Word shows between
//! the `separate` and `end` markers) is replaced with a placeholder, and the
//! field's dotted path is recorded on the text element so later consumers
//! can map placeholders back to data without reading field codes.

use crate::diagnostics::{DiagnosticCollector, DiagnosticMessageBuilder};
use crate::document::{WordDocument, names};
use crate::instruction::{Instruction, is_merge_instruction, parse_instruction};
use crate::locator::{locate_triad, result_text};
use crate::options::ProcessOptions;
use ooxml_xml::NodeId;

/// Attribute carrying the field path on a substituted `w:t`.
pub const MERGE_FIELD_ATTRIBUTE: &str = "data-merge-field";

/// Prefix of the comment inserted before a substituted `w:t`.
pub const MERGE_COMMENT_PREFIX: &str = "MERGEFIELD:";

/// A merge field found in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeFieldRef {
    /// The `w:instrText` element.
    pub instruction: NodeId,
    /// The dotted path, or `None` if the instruction names no field.
    pub path: Option<String>,
}

/// Every merge-field instruction in document order.
pub fn merge_field_refs(doc: &WordDocument) -> Vec<MergeFieldRef> {
    doc.elements(names::INSTRUCTION)
        .into_iter()
        .filter_map(|instr| {
            let text = doc.text_content(instr);
            if !is_merge_instruction(&text) {
                return None;
            }
            let path = match parse_instruction(&text) {
                Ok(Instruction::MergeField { path }) => Some(path),
                _ => None,
            };
            Some(MergeFieldRef {
                instruction: instr,
                path,
            })
        })
        .collect()
}

/// The dotted paths of every merge field, in document order.
pub fn merge_field_names(doc: &WordDocument) -> Vec<String> {
    merge_field_refs(doc)
        .into_iter()
        .filter_map(|field| field.path)
        .collect()
}

fn run_index(doc: &WordDocument, runs: &[NodeId], node: NodeId) -> Option<usize> {
    let run = doc.enclosing_run(node)?;
    runs.iter().position(|&r| r == run)
}

/// Substitute every merge field. Returns the number of fields substituted.
///
/// Fields with a missing marker, no field name, or no result text are
/// reported to `diagnostics` and left untouched.
pub fn process_merge_fields(
    doc: &mut WordDocument,
    options: &ProcessOptions,
    diagnostics: &mut DiagnosticCollector,
) -> usize {
    let fields = merge_field_refs(doc);
    let runs = doc.runs();
    let mut substituted = 0;

    for field in fields {
        let instruction = doc.text_content(field.instruction);
        let at_run = |builder: DiagnosticMessageBuilder| match run_index(doc, &runs, field.instruction) {
            Some(index) => builder.at_run(index),
            None => builder,
        };

        let Some(path) = field.path else {
            diagnostics.add(
                at_run(
                    DiagnosticMessageBuilder::warning("Incomplete merge field")
                        .with_code("F-1-1")
                        .problem("The merge field does not name a data field"),
                )
                .add_detail(format!("Instruction: `{}`", instruction.trim()))
                .build(),
            );
            continue;
        };

        let triad = match locate_triad(doc, field.instruction) {
            Ok(triad) => triad,
            Err(missing) => {
                diagnostics.add(
                    at_run(
                        DiagnosticMessageBuilder::warning("Incomplete merge field")
                            .with_code("F-1-1")
                            .problem(format!("The merge field has no `{}` marker", missing.as_str())),
                    )
                    .add_detail(format!("Field: `{}`", path))
                    .add_hint("Re-insert the field in the word processor?")
                    .build(),
                );
                continue;
            }
        };

        let Some(text) = result_text(doc, &triad) else {
            diagnostics.add(
                at_run(
                    DiagnosticMessageBuilder::warning("Merge field without result text")
                        .with_code("F-1-2")
                        .problem("No text was found between the field's `separate` and `end` markers"),
                )
                .add_detail(format!("Field: `{}`", path))
                .build(),
            );
            continue;
        };

        if doc.xml().attribute(text, MERGE_FIELD_ATTRIBUTE) == Some(path.as_str()) {
            tracing::debug!(field = %path, "merge field already substituted");
            continue;
        }

        let xml = doc.xml_mut();
        xml.set_text_content(text, &options.placeholder);
        xml.set_attribute(text, MERGE_FIELD_ATTRIBUTE, &path);
        if options.merge_comments {
            let comment = xml.create_comment(&comment_text(&path));
            xml.insert_before(comment, text);
        }
        tracing::debug!(field = %path, "substituted merge field");
        substituted += 1;
    }

    substituted
}

/// Comment marker text for a field path. XML comments may not contain `--`
/// or end with `-`, so those are spaced apart.
fn comment_text(path: &str) -> String {
    let mut text = format!("{}{}", MERGE_COMMENT_PREFIX, path);
    while text.contains("--") {
        text = text.replace("--", "- -");
    }
    if text.ends_with('-') {
        text.push(' ');
    }
    text
}

/// A substituted merge field, read back from the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionRecord {
    /// The `w:t` element.
    pub text: NodeId,
    /// The stored field path.
    pub field: String,
    /// The element's current text.
    pub value: String,
}

/// Every `w:t` carrying a substitution record, in document order.
pub fn substitution_records(doc: &WordDocument) -> Vec<SubstitutionRecord> {
    doc.elements(names::TEXT)
        .into_iter()
        .filter_map(|text| {
            let field = doc.xml().attribute(text, MERGE_FIELD_ATTRIBUTE)?.to_string();
            Some(SubstitutionRecord {
                text,
                field,
                value: doc.text_content(text),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::WORDML_NS;
    use pretty_assertions::assert_eq;

    fn doc(body: &str) -> WordDocument {
        WordDocument::parse(&format!(
            r#"<w:document xmlns:w="{WORDML_NS}"><w:body><w:p>{body}</w:p></w:body></w:document>"#
        ))
        .unwrap()
    }

    fn merge_field(name: &str) -> String {
        format!(
            concat!(
                r#"<w:r><w:fldChar w:fldCharType="begin"/></w:r>"#,
                r#"<w:r><w:instrText xml:space="preserve"> MERGEFIELD {name} </w:instrText></w:r>"#,
                r#"<w:r><w:fldChar w:fldCharType="separate"/></w:r>"#,
                r#"<w:r><w:t>«{name}»</w:t></w:r>"#,
                r#"<w:r><w:fldChar w:fldCharType="end"/></w:r>"#
            ),
            name = name
        )
    }

    #[test]
    fn test_substitution() {
        let mut d = doc(&merge_field("step_info.q_companyname.q_companyname"));
        let mut diagnostics = DiagnosticCollector::new();
        let count = process_merge_fields(&mut d, &ProcessOptions::default(), &mut diagnostics);
        assert_eq!(count, 1);
        assert!(diagnostics.is_empty());

        let records = substitution_records(&d);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].field, "step_info.q_companyname.q_companyname");
        assert_eq!(records[0].value, "..........");

        let xml = d.to_xml();
        assert!(xml.contains(concat!(
            "<!--MERGEFIELD:step_info.q_companyname.q_companyname-->",
            r#"<w:t data-merge-field="step_info.q_companyname.q_companyname">..........</w:t>"#
        )));
    }

    #[test]
    fn test_substitution_is_idempotent() {
        let mut d = doc(&merge_field("a.b"));
        let mut diagnostics = DiagnosticCollector::new();
        process_merge_fields(&mut d, &ProcessOptions::default(), &mut diagnostics);
        let once = d.to_xml();
        assert_eq!(process_merge_fields(&mut d, &ProcessOptions::default(), &mut diagnostics), 0);
        assert_eq!(d.to_xml(), once);
    }

    #[test]
    fn test_custom_placeholder_without_comment() {
        let mut d = doc(&merge_field("x"));
        let options = ProcessOptions {
            placeholder: "___".to_string(),
            merge_comments: false,
            ..ProcessOptions::default()
        };
        let mut diagnostics = DiagnosticCollector::new();
        process_merge_fields(&mut d, &options, &mut diagnostics);
        let xml = d.to_xml();
        assert!(xml.contains(r#"<w:t data-merge-field="x">___</w:t>"#));
        assert!(!xml.contains("<!--"));
    }

    #[test]
    fn test_missing_separate_leaves_document_unchanged() {
        let input = concat!(
            r#"<w:r><w:fldChar w:fldCharType="begin"/></w:r>"#,
            r#"<w:r><w:instrText> MERGEFIELD a </w:instrText></w:r>"#,
            r#"<w:r><w:t>«a»</w:t></w:r>"#,
            r#"<w:r><w:fldChar w:fldCharType="end"/></w:r>"#
        );
        let mut d = doc(input);
        let before = d.to_xml();
        let mut diagnostics = DiagnosticCollector::new();
        assert_eq!(process_merge_fields(&mut d, &ProcessOptions::default(), &mut diagnostics), 0);
        assert_eq!(d.to_xml(), before);
        assert_eq!(diagnostics.len(), 1);
        let diag = &diagnostics.diagnostics()[0];
        assert_eq!(diag.code.as_deref(), Some("F-1-1"));
        assert_eq!(diag.run_index, Some(1));
    }

    #[test]
    fn test_missing_result_text() {
        let mut d = doc(concat!(
            r#"<w:r><w:fldChar w:fldCharType="begin"/></w:r>"#,
            r#"<w:r><w:instrText> MERGEFIELD a </w:instrText></w:r>"#,
            r#"<w:r><w:fldChar w:fldCharType="separate"/></w:r>"#,
            r#"<w:r><w:fldChar w:fldCharType="end"/></w:r>"#
        ));
        let mut diagnostics = DiagnosticCollector::new();
        process_merge_fields(&mut d, &ProcessOptions::default(), &mut diagnostics);
        assert_eq!(diagnostics.diagnostics()[0].code.as_deref(), Some("F-1-2"));
    }

    #[test]
    fn test_comment_text_is_well_formed() {
        assert_eq!(comment_text("a.b"), "MERGEFIELD:a.b");
        assert_eq!(comment_text("a--b"), "MERGEFIELD:a- -b");
        assert_eq!(comment_text("a---b-"), "MERGEFIELD:a- - -b- ");
    }

    #[test]
    fn test_merge_field_names() {
        let d = doc(&[merge_field("first"), merge_field("second.path")].concat());
        assert_eq!(merge_field_names(&d), vec!["first", "second.path"]);
    }
}
