/*
 * text.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Text command implementation
 */

use anyhow::{Context, Result};
use ooxml_fields::{FieldProcessor, ProcessOptions};

use super::{read_input, write_output};

/// Execute the text command
pub fn execute(input: &str) -> Result<()> {
    let xml = read_input(input)?;
    let processor = FieldProcessor::new(&xml, ProcessOptions::default())
        .with_context(|| format!("Failed to parse {}", input))?;
    let lines = processor.text_runs().join("\n");
    if lines.is_empty() {
        return Ok(());
    }
    write_output(None, &lines)
}
