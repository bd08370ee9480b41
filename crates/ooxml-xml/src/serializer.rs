//! Writing [`XmlDocument`] trees back to markup.
//!
//! The output of `to_xml_string` parses back into an equivalent tree and
//! serializes to the same string again, which the simplification pass relies
//! on for idempotence.

use crate::types::XmlNodeKind;
use crate::{NodeId, XmlDocument};
use quick_xml::escape::{escape, partial_escape};

impl XmlDocument {
    /// Serialize the whole document.
    pub fn to_xml_string(&self) -> String {
        let mut out = String::new();
        for &child in self.children(self.root()) {
            self.write_node(child, &mut out);
        }
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        match self.kind(id) {
            XmlNodeKind::Document => {
                for &child in self.children(id) {
                    self.write_node(child, out);
                }
            }
            XmlNodeKind::Element(element) => {
                let name = element.name.qualified();
                out.push('<');
                out.push_str(&name);
                for attr in &element.attributes {
                    out.push(' ');
                    out.push_str(&attr.name.qualified());
                    out.push_str("=\"");
                    out.push_str(&escape(attr.value.as_str()));
                    out.push('"');
                }

                let children = self.children(id);
                if children.is_empty() {
                    out.push_str("/>");
                    return;
                }
                out.push('>');
                for &child in children {
                    self.write_node(child, out);
                }
                out.push_str("</");
                out.push_str(&name);
                out.push('>');
            }
            XmlNodeKind::Text(text) => out.push_str(&partial_escape(text.as_str())),
            XmlNodeKind::CData(text) => {
                out.push_str("<![CDATA[");
                out.push_str(text);
                out.push_str("]]>");
            }
            XmlNodeKind::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            XmlNodeKind::Declaration(text) | XmlNodeKind::ProcessingInstruction(text) => {
                out.push_str("<?");
                out.push_str(text);
                out.push_str("?>");
            }
            XmlNodeKind::DocType(text) => {
                out.push_str("<!DOCTYPE ");
                out.push_str(text);
                out.push('>');
            }
        }
    }
}
