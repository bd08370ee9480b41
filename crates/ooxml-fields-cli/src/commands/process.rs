/*
 * process.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Process command implementation
 */

use anyhow::{Context, Result};
use ooxml_fields::{ElsePolicy, ProcessOptions};
use tracing::{debug, info};

use super::{ReportOptions, read_input, report_diagnostics, write_output};

/// Arguments for the process command
#[derive(Debug)]
pub struct ProcessArgs {
    /// Input document ('-' for stdin)
    pub input: String,
    /// JSON data context file
    pub data: Option<String>,
    /// Output file (stdout if absent)
    pub output: Option<String>,
    /// Merge-field replacement text
    pub placeholder: Option<String>,
    pub merge_comments: bool,
    pub else_policy: ElsePolicy,
    pub merge_fields: bool,
    pub if_fields: bool,
}

impl ProcessArgs {
    fn options(&self) -> ProcessOptions {
        let mut options = ProcessOptions {
            merge_comments: self.merge_comments,
            else_policy: self.else_policy,
            merge_fields: self.merge_fields,
            if_fields: self.if_fields,
            ..ProcessOptions::default()
        };
        if let Some(placeholder) = &self.placeholder {
            options.placeholder = placeholder.clone();
        }
        options
    }
}

/// Execute the process command
pub fn execute(args: ProcessArgs, report: &ReportOptions) -> Result<()> {
    let xml = read_input(&args.input)?;
    let data = match &args.data {
        Some(path) => {
            debug!(path = %path, "reading data context");
            Some(read_input(path)?)
        }
        None => None,
    };

    let options = args.options();
    let output = ooxml_fields::process_document_json(&xml, data.as_deref(), &options)
        .with_context(|| format!("Failed to process {}", args.input))?;

    info!(
        diagnostics = output.diagnostics.len(),
        "processed {}", args.input
    );
    report_diagnostics(&output.diagnostics, report)?;
    write_output(args.output.as_deref(), &output.xml)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> ProcessArgs {
        ProcessArgs {
            input: "-".to_string(),
            data: None,
            output: None,
            placeholder: None,
            merge_comments: true,
            else_policy: ElsePolicy::Reject,
            merge_fields: true,
            if_fields: true,
        }
    }

    #[test]
    fn test_default_options() {
        assert_eq!(args().options(), ProcessOptions::default());
    }

    #[test]
    fn test_overrides() {
        let options = ProcessArgs {
            placeholder: Some("___".to_string()),
            merge_comments: false,
            else_policy: ElsePolicy::Toggle,
            if_fields: false,
            ..args()
        }
        .options();
        assert_eq!(options.placeholder, "___");
        assert!(!options.merge_comments);
        assert_eq!(options.else_policy, ElsePolicy::Toggle);
        assert!(options.merge_fields);
        assert!(!options.if_fields);
    }
}
