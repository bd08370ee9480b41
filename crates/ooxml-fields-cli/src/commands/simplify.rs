/*
 * simplify.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Simplify command implementation
 */

use anyhow::{Context, Result};
use tracing::info;

use super::{read_input, write_output};

/// Arguments for the simplify command
#[derive(Debug)]
pub struct SimplifyArgs {
    pub input: String,
    pub output: Option<String>,
}

/// Execute the simplify command
pub fn execute(args: SimplifyArgs) -> Result<()> {
    let xml = read_input(&args.input)?;
    let simplified = ooxml_fields::simplify_xml(&xml)
        .with_context(|| format!("Failed to simplify {}", args.input))?;
    info!(
        before = xml.len(),
        after = simplified.len(),
        "simplified {}", args.input
    );
    write_output(args.output.as_deref(), &simplified)
}
