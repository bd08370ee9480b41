//! XML parser that builds mutable [`XmlDocument`] trees.

use crate::types::{QName, XML_NAMESPACE, XmlNodeKind};
use crate::{Error, NodeId, Result, XmlAttribute, XmlDocument, XmlElement};
use quick_xml::Reader;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

/// Parse XML from a string, producing an [`XmlDocument`].
///
/// Whitespace, comments, CDATA sections, processing instructions and the XML
/// declaration are all kept so the document can be written back faithfully.
///
/// # Example
///
/// ```rust
/// use ooxml_xml::parse;
///
/// let doc = parse("<root><child/></root>").unwrap();
/// let root = doc.document_element().unwrap();
/// assert_eq!(doc.element(root).unwrap().name.local, "root");
/// ```
///
/// # Errors
///
/// Returns an error if the XML is malformed.
pub fn parse(content: &str) -> Result<XmlDocument> {
    XmlParser::new(content).parse()
}

/// Internal parser state.
struct XmlParser<'a> {
    /// The quick-xml reader.
    reader: Reader<&'a [u8]>,

    /// The document being built.
    doc: XmlDocument,

    /// Stack of open elements, with the raw name used to check end tags.
    stack: Vec<(NodeId, String)>,

    /// Namespace bindings introduced by each open element.
    scopes: Vec<Vec<(Option<String>, String)>>,
}

impl<'a> XmlParser<'a> {
    fn new(source: &'a str) -> Self {
        let mut reader = Reader::from_str(source);
        reader.config_mut().trim_text_start = false;
        reader.config_mut().trim_text_end = false;

        Self {
            reader,
            doc: XmlDocument::new(),
            stack: Vec::new(),
            scopes: Vec::new(),
        }
    }

    fn parse(mut self) -> Result<XmlDocument> {
        let mut has_root = false;

        loop {
            let event_start = self.reader.buffer_position();

            match self.reader.read_event() {
                Ok(Event::Start(e)) => {
                    let id = self.handle_start(&e, event_start, &mut has_root)?;
                    self.stack
                        .push((id, String::from_utf8_lossy(e.name().as_ref()).to_string()));
                }
                Ok(Event::End(e)) => {
                    self.handle_end(&e, event_start)?;
                }
                Ok(Event::Empty(e)) => {
                    self.handle_start(&e, event_start, &mut has_root)?;
                    self.scopes.pop();
                }
                Ok(Event::Text(e)) => {
                    self.handle_text(&e, event_start)?;
                }
                Ok(Event::CData(e)) => {
                    let text = String::from_utf8_lossy(e.as_ref()).to_string();
                    self.append_leaf(XmlNodeKind::CData(text));
                }
                Ok(Event::Comment(e)) => {
                    let text = String::from_utf8_lossy(&e).to_string();
                    self.append_leaf(XmlNodeKind::Comment(text));
                }
                Ok(Event::Decl(e)) => {
                    let text = String::from_utf8_lossy(&e).to_string();
                    self.append_leaf(XmlNodeKind::Declaration(text));
                }
                Ok(Event::PI(e)) => {
                    let text = String::from_utf8_lossy(&e).to_string();
                    self.append_leaf(XmlNodeKind::ProcessingInstruction(text));
                }
                Ok(Event::DocType(e)) => {
                    let text = String::from_utf8_lossy(&e).trim().to_string();
                    self.append_leaf(XmlNodeKind::DocType(text));
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::XmlSyntax {
                        message: e.to_string(),
                        position: Some(self.reader.error_position()),
                    });
                }
            }
        }

        // Check for unclosed elements
        if let Some((_, name)) = self.stack.last() {
            return Err(Error::UnexpectedEof {
                expected: format!("closing tag </{}>", name),
                position: Some(self.reader.buffer_position()),
            });
        }

        if !has_root {
            return Err(Error::EmptyDocument);
        }

        Ok(self.doc)
    }

    fn current_parent(&self) -> NodeId {
        self.stack
            .last()
            .map_or(self.doc.root(), |(id, _)| *id)
    }

    fn handle_start(
        &mut self,
        e: &BytesStart<'_>,
        event_start: u64,
        has_root: &mut bool,
    ) -> Result<NodeId> {
        if self.stack.is_empty() {
            if *has_root {
                return Err(Error::MultipleRoots {
                    position: Some(event_start),
                });
            }
            *has_root = true;
        }

        let raw_name = String::from_utf8_lossy(e.name().as_ref()).to_string();
        let name = QName::parse(&raw_name);

        // Collect the raw attributes first: xmlns declarations on this
        // element are in scope for the element itself.
        let mut raw_attributes = Vec::new();
        let mut bindings = Vec::new();
        for attr_result in e.attributes() {
            let attr = attr_result?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
            let value = attr.unescape_value().map_err(|err| Error::XmlSyntax {
                message: format!("Invalid attribute value: {}", err),
                position: Some(event_start),
            })?;
            let value = value.into_owned();

            if key == "xmlns" {
                bindings.push((None, value.clone()));
            } else if let Some(prefix) = key.strip_prefix("xmlns:") {
                bindings.push((Some(prefix.to_string()), value.clone()));
            }
            raw_attributes.push((QName::parse(&key), value));
        }
        self.scopes.push(bindings);

        let attributes = raw_attributes
            .into_iter()
            .map(|(name, value)| {
                // Unprefixed attributes never take the default namespace.
                let namespace = name
                    .prefix
                    .as_deref()
                    .and_then(|prefix| self.resolve(Some(prefix)));
                XmlAttribute {
                    name,
                    namespace,
                    value,
                }
            })
            .collect();

        let namespace = self.resolve(name.prefix.as_deref());
        let element = XmlElement {
            name,
            namespace,
            attributes,
        };

        let parent = self.current_parent();
        let id = self.doc.create_element(element);
        self.doc.append_child(parent, id);
        Ok(id)
    }

    fn handle_end(&mut self, e: &BytesEnd<'_>, event_start: u64) -> Result<()> {
        let end_name = String::from_utf8_lossy(e.name().as_ref()).to_string();

        let (_, open_name) = self.stack.pop().ok_or_else(|| Error::InvalidStructure {
            message: format!("Unexpected closing tag </{}>", end_name),
            position: Some(event_start),
        })?;
        self.scopes.pop();

        // Verify tag names match
        if open_name != end_name {
            return Err(Error::MismatchedEndTag {
                expected: open_name,
                found: end_name,
                position: Some(event_start),
            });
        }
        Ok(())
    }

    fn handle_text(&mut self, e: &BytesText<'_>, event_start: u64) -> Result<()> {
        let text = e.unescape().map_err(|err| Error::XmlSyntax {
            message: format!("Invalid text content: {}", err),
            position: Some(event_start),
        })?;

        if self.stack.is_empty() && !text.trim().is_empty() {
            return Err(Error::InvalidStructure {
                message: "Text content outside of the root element".to_string(),
                position: Some(event_start),
            });
        }

        self.append_leaf(XmlNodeKind::Text(text.into_owned()));
        Ok(())
    }

    fn append_leaf(&mut self, kind: XmlNodeKind) {
        let parent = self.current_parent();
        let id = self.doc.push_node(kind);
        self.doc.append_child(parent, id);
    }

    /// Resolve a prefix against the open namespace scopes.
    fn resolve(&self, prefix: Option<&str>) -> Option<String> {
        if prefix == Some("xml") {
            return Some(XML_NAMESPACE.to_string());
        }
        self.scopes
            .iter()
            .rev()
            .flat_map(|scope| scope.iter())
            .find(|(bound, _)| bound.as_deref() == prefix)
            .map(|(_, uri)| uri.clone())
            .filter(|uri| !uri.is_empty())
    }
}
