//! Command implementations for the ooxml-fields CLI
//!
//! Each command module handles the CLI interface and delegates to
//! ooxml-fields for the actual work.

pub mod extract;
pub mod process;
pub mod simplify;
pub mod text;

use std::fs;
use std::io::{self, Read, Write};

use anyhow::{Context, Result};
use ooxml_fields::DiagnosticMessage;

/// How diagnostics are reported on stderr.
#[derive(Debug, Clone, Copy)]
pub struct ReportOptions {
    pub diagnostics_json: bool,
}

/// Read a file, or stdin when `path` is `-`.
pub fn read_input(path: &str) -> Result<String> {
    if path == "-" {
        let mut content = String::new();
        io::stdin()
            .read_to_string(&mut content)
            .context("Failed to read stdin")?;
        Ok(content)
    } else {
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))
    }
}

/// Write to a file, or stdout when `path` is `None` or `-`.
pub fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) if path != "-" => {
            fs::write(path, content).with_context(|| format!("Failed to write {}", path))
        }
        _ => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            if !content.ends_with('\n') {
                stdout.write_all(b"\n")?;
            }
            Ok(())
        }
    }
}

/// Print diagnostics to stderr.
pub fn report_diagnostics(diagnostics: &[DiagnosticMessage], options: &ReportOptions) -> Result<()> {
    if diagnostics.is_empty() {
        return Ok(());
    }
    let mut stderr = io::stderr().lock();
    if options.diagnostics_json {
        writeln!(stderr, "{}", serde_json::to_string_pretty(diagnostics)?)?;
    } else {
        for diagnostic in diagnostics {
            write!(stderr, "{}", diagnostic.to_text())?;
        }
    }
    Ok(())
}
