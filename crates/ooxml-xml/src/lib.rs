//! Mutable, namespace-aware XML trees for OOXML processing.
//!
//! This crate wraps [`quick-xml`] to provide an arena-backed [`XmlDocument`]
//! that supports the operations a document templating engine needs: parent
//! and sibling navigation, namespace-qualified lookup, in-place removal, node
//! creation, attribute updates and faithful serialization.
//!
//! # Overview
//!
//! The main types are:
//! - [`XmlDocument`]: The parsed document; owns every node
//! - [`NodeId`]: A stable handle to a node, valid across mutations
//! - [`XmlElement`]: Element name, resolved namespace and attributes
//! - [`XmlNodeKind`]: Element, text, comment, CDATA and prolog node kinds
//!
//! # Example
//!
//! ```rust
//! use ooxml_xml::parse;
//!
//! let mut doc = parse(r#"<w:p xmlns:w="urn:w"><w:r><w:t>Hi</w:t></w:r></w:p>"#).unwrap();
//! let root = doc.document_element().unwrap();
//!
//! let texts = doc.descendants_ns(root, "urn:w", "t");
//! assert_eq!(doc.text_content(texts[0]), "Hi");
//!
//! doc.set_text_content(texts[0], "Bye");
//! assert_eq!(
//!     doc.to_xml_string(),
//!     r#"<w:p xmlns:w="urn:w"><w:r><w:t>Bye</w:t></w:r></w:p>"#
//! );
//! ```

pub mod error;
pub mod parser;
pub mod serializer;
pub mod types;

// Re-export main types
pub use error::{Error, Result};
pub use parser::parse;
pub use types::{NodeId, QName, XML_NAMESPACE, XmlAttribute, XmlDocument, XmlElement, XmlNodeKind};
