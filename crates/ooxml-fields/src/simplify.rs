/*
 * simplify.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Tree simplification.
//!
//! Strips presentation-only WordprocessingML elements, then collapses the
//! runs and paragraphs left empty, so the remaining markup is mostly text
//! and field structure.

use crate::document::{WordDocument, names};
use ooxml_xml::{NodeId, XmlNodeKind};

/// Elements removed wholesale.
pub const PRESENTATION_ELEMENTS: &[&str] = &[
    "tabs", "rFonts", "drawing", "pStyle", "rPr", "pPr", "tcPr", "tblPr", "tblGrid",
];

/// `w:type` value of a forced line break.
const TEXT_WRAPPING: &str = "textWrapping";

/// Simplify a document in place.
pub fn simplify(doc: &mut WordDocument) {
    let mut removed = 0;
    for local in PRESENTATION_ELEMENTS {
        for id in doc.elements(local) {
            doc.xml_mut().remove(id);
            removed += 1;
        }
    }

    removed += remove_all_empty(doc, names::RUN);
    removed += remove_all_empty(doc, names::PARAGRAPH);
    removed += remove_break_paragraphs(doc);

    tracing::debug!(removed, "simplified document");
}

/// Simplify and serialize, dropping blank lines.
pub fn simplify_to_string(doc: &mut WordDocument) -> String {
    simplify(doc);
    drop_blank_lines(&doc.to_xml())
}

pub(crate) fn drop_blank_lines(xml: &str) -> String {
    xml.lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_blank_text(doc: &WordDocument, id: NodeId) -> bool {
    matches!(doc.xml().kind(id), XmlNodeKind::Text(text) if text.trim().is_empty())
}

/// Blank text content, and nothing but blank text nodes as children.
fn is_empty_element(doc: &WordDocument, id: NodeId) -> bool {
    doc.text_content(id).trim().is_empty()
        && doc
            .xml()
            .children(id)
            .iter()
            .all(|&child| is_blank_text(doc, child))
}

/// Remove empty elements of one kind until a pass removes nothing.
fn remove_all_empty(doc: &mut WordDocument, local: &str) -> usize {
    let mut total = 0;
    loop {
        let empty: Vec<NodeId> = doc
            .elements(local)
            .into_iter()
            .filter(|&id| is_empty_element(doc, id))
            .collect();
        if empty.is_empty() {
            return total;
        }
        total += empty.len();
        for id in empty {
            doc.xml_mut().remove(id);
        }
    }
}

/// Children that are elements or non-blank text.
fn significant_children(doc: &WordDocument, id: NodeId) -> Vec<NodeId> {
    doc.xml()
        .children(id)
        .iter()
        .copied()
        .filter(|&child| match doc.xml().kind(child) {
            XmlNodeKind::Element(_) => true,
            XmlNodeKind::Text(text) => !text.trim().is_empty(),
            _ => false,
        })
        .collect()
}

fn is_forced_break(doc: &WordDocument, id: NodeId) -> bool {
    doc.is_w(id, names::BREAK)
        && doc
            .w_attribute(id, names::BREAK_TYPE)
            .is_none_or(|kind| kind == TEXT_WRAPPING)
}

/// Remove paragraphs holding nothing but a single forced line break.
fn remove_break_paragraphs(doc: &mut WordDocument) -> usize {
    let targets: Vec<NodeId> = doc
        .elements(names::PARAGRAPH)
        .into_iter()
        .filter(|&p| match significant_children(doc, p).as_slice() {
            [run] if doc.is_w(*run, names::RUN) => {
                matches!(significant_children(doc, *run).as_slice(), [br] if is_forced_break(doc, *br))
            }
            _ => false,
        })
        .collect();
    for &p in &targets {
        doc.xml_mut().remove(p);
    }
    targets.len()
}
