/*
 * diagnostics.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Diagnostic messages for field processing.
//!
//! Per-field problems (a missing `separate` marker, an unparseable IF
//! instruction, ...) never abort a call. They are recorded here in a
//! tidyverse-style structure: a code, a short title, a problem statement,
//! bulleted details and hints ending with `?`.

use serde::{Deserialize, Serialize};

/// The kind of diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticKind {
    /// An error that prevents completion
    Error,
    /// A problem that was skipped over
    Warning,
}

impl DiagnosticKind {
    fn label(self) -> &'static str {
        match self {
            DiagnosticKind::Error => "Error",
            DiagnosticKind::Warning => "Warning",
        }
    }
}

/// A diagnostic message.
///
/// Codes follow the `F-<subsystem>-<number>` scheme:
/// `F-0-*` whole-document failures, `F-1-*` merge fields, `F-2-*` IF fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Brief title for the problem
    pub title: String,

    pub kind: DiagnosticKind,

    /// The problem statement (the "what")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub problem: Option<String>,

    /// Specific details (the "where/why")
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,

    /// Optional hints for fixing (end with ?)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<String>,

    /// Index of the run (in document order) where the problem was found.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_index: Option<usize>,
}

impl DiagnosticMessage {
    /// Render this diagnostic message as text.
    ///
    /// Format:
    /// ```text
    /// Warning [F-1-1]: title
    /// Problem statement here
    /// ✖ Detail 1
    /// ? Hint 1
    /// ```
    pub fn to_text(&self) -> String {
        let mut result = match &self.code {
            Some(code) => format!("{} [{}]: {}\n", self.kind.label(), code, self.title),
            None => format!("{}: {}\n", self.kind.label(), self.title),
        };
        if let Some(problem) = &self.problem {
            result.push_str(problem);
            result.push('\n');
        }
        if let Some(index) = self.run_index {
            result.push_str(&format!("ℹ At run {}\n", index));
        }
        for detail in &self.details {
            result.push_str(&format!("✖ {}\n", detail));
        }
        for hint in &self.hints {
            result.push_str(&format!("? {}\n", hint));
        }
        result
    }
}

/// Builder for [`DiagnosticMessage`].
///
/// ```
/// use ooxml_fields::DiagnosticMessageBuilder;
///
/// let msg = DiagnosticMessageBuilder::warning("Incomplete merge field")
///     .with_code("F-1-1")
///     .problem("The field has no `separate` marker")
///     .add_hint("Re-insert the field in the word processor?")
///     .build();
/// assert!(msg.to_text().contains("Warning [F-1-1]: Incomplete merge field"));
/// ```
#[derive(Debug, Clone)]
pub struct DiagnosticMessageBuilder {
    message: DiagnosticMessage,
}

impl DiagnosticMessageBuilder {
    fn new(kind: DiagnosticKind, title: impl Into<String>) -> Self {
        Self {
            message: DiagnosticMessage {
                code: None,
                title: title.into(),
                kind,
                problem: None,
                details: Vec::new(),
                hints: Vec::new(),
                run_index: None,
            },
        }
    }

    pub fn error(title: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Error, title)
    }

    pub fn warning(title: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Warning, title)
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.message.code = Some(code.into());
        self
    }

    pub fn problem(mut self, problem: impl Into<String>) -> Self {
        self.message.problem = Some(problem.into());
        self
    }

    pub fn add_detail(mut self, detail: impl Into<String>) -> Self {
        self.message.details.push(detail.into());
        self
    }

    pub fn add_hint(mut self, hint: impl Into<String>) -> Self {
        self.message.hints.push(hint.into());
        self
    }

    pub fn at_run(mut self, index: usize) -> Self {
        self.message.run_index = Some(index);
        self
    }

    pub fn build(self) -> DiagnosticMessage {
        self.message
    }
}

/// Collector for diagnostic messages produced while processing one document.
#[derive(Debug, Default, Clone)]
pub struct DiagnosticCollector {
    diagnostics: Vec<DiagnosticMessage>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic message. Callers report collected diagnostics
    /// themselves, so the log only sees them at debug level.
    pub fn add(&mut self, diagnostic: DiagnosticMessage) {
        tracing::debug!(
            kind = ?diagnostic.kind,
            code = diagnostic.code.as_deref().unwrap_or(""),
            "{}",
            diagnostic.title
        );
        self.diagnostics.push(diagnostic);
    }

    /// Check if any errors were collected (warnings don't count).
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::Error)
    }

    pub fn diagnostics(&self) -> &[DiagnosticMessage] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<DiagnosticMessage> {
        self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }
}
