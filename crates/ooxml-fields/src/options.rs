/*
 * options.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Processing options.

use serde::{Deserialize, Serialize};

/// Text that replaces a merge field's rendered result.
pub const DEFAULT_PLACEHOLDER: &str = "..........";

/// Field result token Word renders for an IF field; skipped while collecting
/// branch content.
pub const DEFAULT_IF_PLACEHOLDER: &str = "{IF}";

/// How a second `%else%` marker inside one IF field is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElsePolicy {
    /// A repeated `%else%` makes the field malformed; it is skipped.
    #[default]
    Reject,
    /// Every `%else%` flips the active branch, so a second one switches back
    /// to the true branch.
    Toggle,
}

/// Options controlling the mutating passes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessOptions {
    /// Replacement text for merge-field results.
    pub placeholder: String,

    /// Insert a `<!--MERGEFIELD:path-->` comment before each substituted
    /// text node.
    pub merge_comments: bool,

    /// IF field result token to ignore during branch collection.
    pub if_placeholder: String,

    pub else_policy: ElsePolicy,

    /// Run the merge-field pass in [`crate::process_document`].
    pub merge_fields: bool,

    /// Run the IF-field pass in [`crate::process_document`].
    pub if_fields: bool,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            placeholder: DEFAULT_PLACEHOLDER.to_string(),
            merge_comments: true,
            if_placeholder: DEFAULT_IF_PLACEHOLDER.to_string(),
            else_policy: ElsePolicy::default(),
            merge_fields: true,
            if_fields: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ProcessOptions::default();
        assert_eq!(options.placeholder, "..........");
        assert_eq!(options.placeholder.chars().count(), 10);
        assert!(options.merge_comments);
        assert_eq!(options.else_policy, ElsePolicy::Reject);
    }

    #[test]
    fn test_partial_deserialization_keeps_defaults() {
        let options: ProcessOptions =
            serde_json::from_str(r#"{"else_policy": "toggle", "merge_comments": false}"#).unwrap();
        assert_eq!(options.else_policy, ElsePolicy::Toggle);
        assert!(!options.merge_comments);
        assert_eq!(options.if_placeholder, "{IF}");
        assert!(options.if_fields);
    }
}
