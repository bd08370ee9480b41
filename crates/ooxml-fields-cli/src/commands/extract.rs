/*
 * extract.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Extract command implementation
 */

use anyhow::{Context, Result};
use tracing::info;

use super::{ReportOptions, read_input, report_diagnostics, write_output};

/// Arguments for the extract command
#[derive(Debug)]
pub struct ExtractArgs {
    /// Input document ('-' for stdin)
    pub input: String,
    /// Print compact JSON
    pub compact: bool,
}

/// Execute the extract command
pub fn execute(args: ExtractArgs, report: &ReportOptions) -> Result<()> {
    let xml = read_input(&args.input)?;
    let output = ooxml_fields::extract_fields(&xml)
        .with_context(|| format!("Failed to extract fields from {}", args.input))?;

    info!(
        merge_fields = output.fields.merge_fields.len(),
        if_fields = output.fields.if_fields.len(),
        "extracted fields"
    );
    report_diagnostics(&output.diagnostics, report)?;

    let json = if args.compact {
        serde_json::to_string(&output.fields)?
    } else {
        serde_json::to_string_pretty(&output.fields)?
    };
    write_output(None, &json)
}
