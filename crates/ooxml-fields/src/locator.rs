/*
 * locator.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Field boundary location.
//!
//! A field is delimited by three `w:fldChar` markers, each in its own run:
//!
//! ```text
//! <w:r><w:fldChar w:fldCharType="begin"/></w:r>
//! <w:r><w:instrText> MERGEFIELD name </w:instrText></w:r>
//! <w:r><w:fldChar w:fldCharType="separate"/></w:r>
//! <w:r><w:t>«name»</w:t></w:r>
//! <w:r><w:fldChar w:fldCharType="end"/></w:r>
//! ```
//!
//! The locator walks sibling runs from an instruction node to find them.
//! Lookups are pure reads against the live tree.

use crate::document::{FieldCharType, WordDocument, names};
use ooxml_xml::NodeId;

/// The markers of one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldTriad {
    pub begin: NodeId,
    pub separate: NodeId,
    pub end: NodeId,
}

/// First marker of the given type among the descendants of `container`.
fn marker_in(doc: &WordDocument, container: NodeId, marker: FieldCharType) -> Option<NodeId> {
    doc.descendants(container, names::FIELD_CHAR)
        .into_iter()
        .find(|&m| doc.field_char_type(m) == Some(marker))
}

/// Find a marker at or before `node`.
///
/// Starts with the element containing `node` (its run) and walks backward
/// through the preceding element siblings.
pub fn locate_previous(doc: &WordDocument, node: NodeId, marker: FieldCharType) -> Option<NodeId> {
    let xml = doc.xml();
    let mut current = xml.parent(node);
    while let Some(container) = current {
        if let Some(found) = marker_in(doc, container, marker) {
            return Some(found);
        }
        current = xml.previous_element_sibling(container);
    }
    None
}

/// Find a marker after `node`.
///
/// Starts with the element sibling following the element containing `node`
/// and walks forward.
pub fn locate_next(doc: &WordDocument, node: NodeId, marker: FieldCharType) -> Option<NodeId> {
    let xml = doc.xml();
    let mut current = xml.parent(node).and_then(|p| xml.next_element_sibling(p));
    while let Some(container) = current {
        if let Some(found) = marker_in(doc, container, marker) {
            return Some(found);
        }
        current = xml.next_element_sibling(container);
    }
    None
}

/// Locate the `begin`/`separate`/`end` markers around an instruction node.
///
/// Returns the first missing marker type on failure.
pub fn locate_triad(doc: &WordDocument, instruction: NodeId) -> Result<FieldTriad, FieldCharType> {
    let begin = locate_previous(doc, instruction, FieldCharType::Begin)
        .ok_or(FieldCharType::Begin)?;
    let separate = locate_next(doc, instruction, FieldCharType::Separate)
        .ok_or(FieldCharType::Separate)?;
    let end = locate_next(doc, separate, FieldCharType::End).ok_or(FieldCharType::End)?;
    Ok(FieldTriad {
        begin,
        separate,
        end,
    })
}

/// The first `w:t` in the runs between a field's `separate` and `end`
/// markers: the field's rendered result.
pub fn result_text(doc: &WordDocument, triad: &FieldTriad) -> Option<NodeId> {
    let xml = doc.xml();
    let end_container = xml.parent(triad.end);
    let mut current = xml
        .parent(triad.separate)
        .and_then(|p| xml.next_element_sibling(p));
    while let Some(container) = current {
        if Some(container) == end_container {
            break;
        }
        if let Some(text) = doc.first_descendant(container, names::TEXT) {
            return Some(text);
        }
        current = xml.next_element_sibling(container);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::WORDML_NS;

    fn doc(body: &str) -> WordDocument {
        WordDocument::parse(&format!(
            r#"<w:document xmlns:w="{WORDML_NS}"><w:body><w:p>{body}</w:p></w:body></w:document>"#
        ))
        .unwrap()
    }

    const FULL: &str = concat!(
        r#"<w:r><w:fldChar w:fldCharType="begin"/></w:r>"#,
        "\n",
        r#"<w:r><w:instrText> MERGEFIELD a.b </w:instrText></w:r>"#,
        r#"<w:r><w:fldChar w:fldCharType="separate"/></w:r>"#,
        r#"<w:r><w:t>«a.b»</w:t></w:r>"#,
        r#"<w:r><w:fldChar w:fldCharType="end"/></w:r>"#
    );

    fn instruction(doc: &WordDocument) -> NodeId {
        doc.elements(names::INSTRUCTION)[0]
    }

    #[test]
    fn test_locate_full_triad() {
        let doc = doc(FULL);
        let triad = locate_triad(&doc, instruction(&doc)).unwrap();
        assert_eq!(doc.field_char_type(triad.begin), Some(FieldCharType::Begin));
        assert_eq!(doc.field_char_type(triad.separate), Some(FieldCharType::Separate));
        assert_eq!(doc.field_char_type(triad.end), Some(FieldCharType::End));

        let text = result_text(&doc, &triad).unwrap();
        assert_eq!(doc.text_content(text), "«a.b»");
    }

    #[test]
    fn test_missing_separate() {
        let doc = doc(concat!(
            r#"<w:r><w:fldChar w:fldCharType="begin"/></w:r>"#,
            r#"<w:r><w:instrText> MERGEFIELD a </w:instrText></w:r>"#,
            r#"<w:r><w:t>x</w:t></w:r>"#,
            r#"<w:r><w:fldChar w:fldCharType="end"/></w:r>"#
        ));
        assert_eq!(
            locate_triad(&doc, instruction(&doc)),
            Err(FieldCharType::Separate)
        );
    }

    #[test]
    fn test_missing_begin() {
        let doc = doc(concat!(
            r#"<w:r><w:instrText> MERGEFIELD a </w:instrText></w:r>"#,
            r#"<w:r><w:fldChar w:fldCharType="separate"/></w:r>"#,
            r#"<w:r><w:fldChar w:fldCharType="end"/></w:r>"#
        ));
        assert_eq!(locate_triad(&doc, instruction(&doc)), Err(FieldCharType::Begin));
    }

    #[test]
    fn test_locate_next_does_not_include_own_run() {
        let doc = doc(FULL);
        let separate = locate_next(&doc, instruction(&doc), FieldCharType::Separate).unwrap();
        assert_eq!(locate_next(&doc, separate, FieldCharType::Separate), None);
    }

    #[test]
    fn test_result_text_absent() {
        let doc = doc(concat!(
            r#"<w:r><w:fldChar w:fldCharType="begin"/></w:r>"#,
            r#"<w:r><w:instrText> MERGEFIELD a </w:instrText></w:r>"#,
            r#"<w:r><w:fldChar w:fldCharType="separate"/></w:r>"#,
            r#"<w:r><w:fldChar w:fldCharType="end"/></w:r>"#,
            r#"<w:r><w:t>after</w:t></w:r>"#
        ));
        let triad = locate_triad(&doc, instruction(&doc)).unwrap();
        assert_eq!(result_text(&doc, &triad), None);
    }
}
