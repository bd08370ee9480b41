/*
 * ast.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Neutral description of the fields found in a document.
//!
//! These types are what [`crate::extract_fields`] returns and serialize to
//! the JSON shape consumers rely on:
//!
//! ```json
//! {
//!   "mergeFields": ["step.name"],
//!   "ifFields": [
//!     {"left": "a", "operator": "=", "right": "1",
//!      "ifTrue": "shown", "ifFalse": ["x", {"left": "b", ...}]}
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

/// One IF field with its branch content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IfField {
    pub left: String,
    pub operator: String,
    pub right: String,
    pub if_true: BranchContent,
    pub if_false: BranchContent,
}

/// Content of one branch of an IF field.
///
/// A branch holding exactly one text item collapses to that string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BranchContent {
    Text(String),
    Items(Vec<BranchItem>),
}

/// An element of a branch: literal text or a nested IF field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BranchItem {
    Text(String),
    Field(IfField),
}

impl BranchContent {
    /// Normalize collected items, preserving their order.
    pub fn from_items(mut items: Vec<BranchItem>) -> Self {
        if let [BranchItem::Text(_)] = items.as_slice() {
            if let Some(BranchItem::Text(text)) = items.pop() {
                return BranchContent::Text(text);
            }
        }
        BranchContent::Items(items)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, BranchContent::Items(items) if items.is_empty())
    }
}

/// Every field in a document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldJsonStructure {
    pub merge_fields: Vec<String>,
    pub if_fields: Vec<IfField>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn text(s: &str) -> BranchItem {
        BranchItem::Text(s.to_string())
    }

    #[test]
    fn test_normalization() {
        assert_eq!(
            BranchContent::from_items(vec![text("only")]),
            BranchContent::Text("only".to_string())
        );
        assert!(BranchContent::from_items(vec![]).is_empty());
        assert_eq!(
            BranchContent::from_items(vec![text("a"), text("b")]),
            BranchContent::Items(vec![text("a"), text("b")])
        );
    }

    #[test]
    fn test_json_shape() {
        let nested = IfField {
            left: "b".to_string(),
            operator: "<>".to_string(),
            right: "2".to_string(),
            if_true: BranchContent::Text("inner".to_string()),
            if_false: BranchContent::from_items(vec![]),
        };
        let structure = FieldJsonStructure {
            merge_fields: vec!["step.name".to_string()],
            if_fields: vec![IfField {
                left: "a".to_string(),
                operator: "=".to_string(),
                right: "1".to_string(),
                if_true: BranchContent::Text("shown".to_string()),
                if_false: BranchContent::from_items(vec![text("x"), BranchItem::Field(nested)]),
            }],
        };

        assert_eq!(
            serde_json::to_value(&structure).unwrap(),
            json!({
                "mergeFields": ["step.name"],
                "ifFields": [{
                    "left": "a",
                    "operator": "=",
                    "right": "1",
                    "ifTrue": "shown",
                    "ifFalse": ["x", {
                        "left": "b",
                        "operator": "<>",
                        "right": "2",
                        "ifTrue": "inner",
                        "ifFalse": []
                    }]
                }]
            })
        );
    }
}
