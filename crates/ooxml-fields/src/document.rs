/*
 * document.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! WordprocessingML view over an [`XmlDocument`].
//!
//! [`WordDocument`] owns the parsed tree for the duration of one processing
//! call and closes over the WordprocessingML namespace, so the rest of the
//! engine asks for `"r"` or `"fldChar"` without repeating the URI.

use crate::error::FieldResult;
use ooxml_xml::{NodeId, XmlDocument};

/// The WordprocessingML main namespace.
pub const WORDML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Local names of the WordprocessingML elements the engine works with.
pub mod names {
    pub const PARAGRAPH: &str = "p";
    pub const RUN: &str = "r";
    pub const TEXT: &str = "t";
    pub const FIELD_CHAR: &str = "fldChar";
    pub const FIELD_CHAR_TYPE: &str = "fldCharType";
    pub const INSTRUCTION: &str = "instrText";
    pub const BREAK: &str = "br";
    pub const BREAK_TYPE: &str = "type";
}

/// The three field-character marker types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldCharType {
    Begin,
    Separate,
    End,
}

impl FieldCharType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "begin" => Some(FieldCharType::Begin),
            "separate" => Some(FieldCharType::Separate),
            "end" => Some(FieldCharType::End),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldCharType::Begin => "begin",
            FieldCharType::Separate => "separate",
            FieldCharType::End => "end",
        }
    }
}

/// A parsed WordprocessingML document.
#[derive(Debug, Clone)]
pub struct WordDocument {
    xml: XmlDocument,
}

impl WordDocument {
    /// Parse document markup.
    ///
    /// # Errors
    ///
    /// Fails if the markup is not well-formed XML.
    pub fn parse(content: &str) -> FieldResult<Self> {
        Ok(Self {
            xml: ooxml_xml::parse(content)?,
        })
    }

    /// Serialize the current tree.
    pub fn to_xml(&self) -> String {
        self.xml.to_xml_string()
    }

    pub fn xml(&self) -> &XmlDocument {
        &self.xml
    }

    pub fn xml_mut(&mut self) -> &mut XmlDocument {
        &mut self.xml
    }

    /// Whether `id` is a WordprocessingML element with the given local name.
    pub fn is_w(&self, id: NodeId, local: &str) -> bool {
        self.xml.is_element_ns(id, WORDML_NS, local)
    }

    /// All WordprocessingML elements with the given local name, in document
    /// order.
    pub fn elements(&self, local: &str) -> Vec<NodeId> {
        self.xml.descendants_ns(self.xml.root(), WORDML_NS, local)
    }

    /// WordprocessingML descendants of `id` with the given local name.
    pub fn descendants(&self, id: NodeId, local: &str) -> Vec<NodeId> {
        self.xml.descendants_ns(id, WORDML_NS, local)
    }

    pub fn first_descendant(&self, id: NodeId, local: &str) -> Option<NodeId> {
        self.xml.first_descendant_ns(id, WORDML_NS, local)
    }

    /// Read a `w:`-qualified attribute.
    pub fn w_attribute(&self, id: NodeId, local: &str) -> Option<&str> {
        self.xml.attribute_ns(id, WORDML_NS, local)
    }

    pub fn text_content(&self, id: NodeId) -> String {
        self.xml.text_content(id)
    }

    /// Marker type of a `w:fldChar` element.
    pub fn field_char_type(&self, id: NodeId) -> Option<FieldCharType> {
        if !self.is_w(id, names::FIELD_CHAR) {
            return None;
        }
        self.w_attribute(id, names::FIELD_CHAR_TYPE)
            .and_then(FieldCharType::parse)
    }

    /// The document's run sequence: every `w:r` in document order.
    pub fn runs(&self) -> Vec<NodeId> {
        self.elements(names::RUN)
    }

    /// Marker type of the first `w:fldChar` inside a run.
    pub fn run_field_char(&self, run: NodeId) -> Option<FieldCharType> {
        self.first_descendant(run, names::FIELD_CHAR)
            .and_then(|marker| self.field_char_type(marker))
    }

    /// The first `w:instrText` inside a run, with its text.
    pub fn run_instruction(&self, run: NodeId) -> Option<(NodeId, String)> {
        self.first_descendant(run, names::INSTRUCTION)
            .map(|instr| (instr, self.text_content(instr)))
    }

    /// Concatenated text of every `w:t` inside a run.
    pub fn run_text(&self, run: NodeId) -> String {
        self.descendants(run, names::TEXT)
            .into_iter()
            .map(|t| self.text_content(t))
            .collect()
    }

    /// The run that contains `node` (the node itself if it is a run).
    pub fn enclosing_run(&self, node: NodeId) -> Option<NodeId> {
        let mut current = Some(node);
        while let Some(id) = current {
            if self.is_w(id, names::RUN) {
                return Some(id);
            }
            current = self.xml.parent(id);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(body: &str) -> WordDocument {
        WordDocument::parse(&format!(
            r#"<w:document xmlns:w="{WORDML_NS}"><w:body>{body}</w:body></w:document>"#
        ))
        .unwrap()
    }

    #[test]
    fn test_run_helpers() {
        let doc = doc(concat!(
            r#"<w:p><w:r><w:fldChar w:fldCharType="begin"/></w:r>"#,
            r#"<w:r><w:instrText> MERGEFIELD name </w:instrText></w:r>"#,
            r#"<w:r><w:t>Hello </w:t><w:t>world</w:t></w:r></w:p>"#
        ));
        let runs = doc.runs();
        assert_eq!(runs.len(), 3);
        assert_eq!(doc.run_field_char(runs[0]), Some(FieldCharType::Begin));
        assert_eq!(doc.run_field_char(runs[1]), None);
        assert_eq!(
            doc.run_instruction(runs[1]).map(|(_, text)| text),
            Some(" MERGEFIELD name ".to_string())
        );
        assert_eq!(doc.run_text(runs[2]), "Hello world");

        let t = doc.first_descendant(runs[2], names::TEXT).unwrap();
        assert_eq!(doc.enclosing_run(t), Some(runs[2]));
    }

    #[test]
    fn test_other_namespaces_are_ignored() {
        let doc = WordDocument::parse(r#"<document xmlns:w="urn:other"><w:r/></document>"#).unwrap();
        assert!(doc.runs().is_empty());
    }

    #[test]
    fn test_field_char_type_parse() {
        assert_eq!(FieldCharType::parse("separate"), Some(FieldCharType::Separate));
        assert_eq!(FieldCharType::parse("Begin"), None);
        assert_eq!(FieldCharType::End.as_str(), "end");
    }
}
