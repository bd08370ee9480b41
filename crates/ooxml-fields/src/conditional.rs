/*
 * conditional.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! IF field parsing and pruning.
//!
//! An IF field's branches are not stored inside the field. The field code
//! only carries the condition; the branch content is the document content
//! that follows it, delimited by text markers:
//!
//! ```text
//! [begin][IF a = "1" "%iftrue%" "%iffalse%"][separate]{IF}[end]
//! shown when true
//! %else%
//! shown when false
//! %end%
//! ```
//!
//! Parsing walks the document's run sequence from the field's `begin` run.
//! A nested IF field inside a branch is parsed recursively and consumes its
//! own `%end%`, so an inner `%end%` never closes the outer field.

use crate::ast::{BranchContent, BranchItem, IfField};
use crate::context::DataContext;
use crate::diagnostics::{DiagnosticCollector, DiagnosticMessage, DiagnosticMessageBuilder};
use crate::document::{FieldCharType, WordDocument, names};
use crate::evaluator::evaluate_condition;
use crate::instruction::{Condition, Instruction, InstructionError, is_if_instruction, parse_instruction};
use crate::locator::locate_triad;
use crate::options::{ElsePolicy, ProcessOptions};
use ooxml_xml::{NodeId, XmlNodeKind};
use std::collections::HashSet;
use thiserror::Error;

/// Text marker separating the true branch from the false branch.
pub const ELSE_MARKER: &str = "%else%";
/// Text marker closing an IF field.
pub const END_MARKER: &str = "%end%";

/// One element of a parsed branch.
#[derive(Debug, Clone, PartialEq)]
pub enum BranchEntry {
    /// A run with text that belongs to the branch content.
    Text { run: NodeId, text: String },
    /// A run without content of its own (empty text, breaks, the `{IF}`
    /// token, other field codes). It still belongs to the branch.
    Run(NodeId),
    /// A nested IF field.
    Nested(ParsedIf),
    /// Text that shares a run with a marker, e.g. `Yes` in `Yes%else%`.
    /// Its run is rewritten, not removed.
    Fragment(String),
}

impl BranchEntry {
    fn collect_runs(&self, out: &mut Vec<NodeId>) {
        match self {
            BranchEntry::Text { run, .. } | BranchEntry::Run(run) => out.push(*run),
            BranchEntry::Nested(nested) => nested.collect_runs(out),
            BranchEntry::Fragment(_) => {}
        }
    }
}

/// Which part of an IF field a piece of marker-run text belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchSide {
    True,
    False,
    /// After the field's closing `%end%`.
    Outside,
}

/// A run holding `%else%` or `%end%`, with the side of every text piece
/// between its markers, in document order.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerRun {
    pub run: NodeId,
    pub sides: Vec<BranchSide>,
}

/// A fully parsed IF field, with the runs it spans.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedIf {
    pub condition: Condition,
    /// Index of the `begin` run in the run sequence.
    pub begin_index: usize,
    /// Runs from `begin` through `end` of the field code.
    pub code_runs: Vec<NodeId>,
    pub if_true: Vec<BranchEntry>,
    pub if_false: Vec<BranchEntry>,
    pub marker_runs: Vec<MarkerRun>,
    /// Index of the first run after the closing `%end%`.
    pub next_index: usize,
}

impl ParsedIf {
    fn collect_runs(&self, out: &mut Vec<NodeId>) {
        out.extend_from_slice(&self.code_runs);
        for entry in self.if_true.iter().chain(&self.if_false) {
            entry.collect_runs(out);
        }
        out.extend(self.marker_runs.iter().map(|marker| marker.run));
    }

    /// The neutral description of this field.
    pub fn to_if_field(&self) -> IfField {
        IfField {
            left: self.condition.left.clone(),
            operator: self.condition.operator.clone(),
            right: self.condition.right.clone(),
            if_true: branch_content(&self.if_true),
            if_false: branch_content(&self.if_false),
        }
    }
}

fn branch_content(entries: &[BranchEntry]) -> BranchContent {
    let items = entries
        .iter()
        .filter_map(|entry| match entry {
            BranchEntry::Text { text, .. } | BranchEntry::Fragment(text) => {
                Some(BranchItem::Text(text.clone()))
            }
            BranchEntry::Run(_) => None,
            BranchEntry::Nested(nested) => Some(BranchItem::Field(nested.to_if_field())),
        })
        .collect();
    BranchContent::from_items(items)
}

/// Why an IF field was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IfProblem {
    #[error("The IF field has no `{}` marker", .missing.as_str())]
    Incomplete {
        run_index: usize,
        missing: FieldCharType,
        instruction: String,
    },

    #[error("The IF instruction could not be parsed: {error}")]
    Unparseable {
        run_index: usize,
        instruction: String,
        error: InstructionError,
    },

    #[error("The document ends before the IF field's `%end%` marker")]
    Unclosed { run_index: usize, instruction: String },

    #[error("The IF field has a second `%else%` marker")]
    RepeatedElse {
        run_index: usize,
        marker_index: usize,
        instruction: String,
    },
}

impl IfProblem {
    /// Index of the `begin` run of the field the problem belongs to.
    pub fn run_index(&self) -> usize {
        match self {
            IfProblem::Incomplete { run_index, .. }
            | IfProblem::Unparseable { run_index, .. }
            | IfProblem::Unclosed { run_index, .. }
            | IfProblem::RepeatedElse { run_index, .. } => *run_index,
        }
    }

    fn instruction(&self) -> &str {
        match self {
            IfProblem::Incomplete { instruction, .. }
            | IfProblem::Unparseable { instruction, .. }
            | IfProblem::Unclosed { instruction, .. }
            | IfProblem::RepeatedElse { instruction, .. } => instruction,
        }
    }

    pub fn to_diagnostic(&self) -> DiagnosticMessage {
        let builder = match self {
            IfProblem::Incomplete { .. } => {
                DiagnosticMessageBuilder::warning("Incomplete IF field").with_code("F-2-1")
            }
            IfProblem::Unparseable { .. } => {
                DiagnosticMessageBuilder::warning("Unparseable IF field")
                    .with_code("F-2-2")
                    .add_hint(r#"IF fields must read `IF <left> <op> <right> "%iftrue%" "%iffalse%"`?"#)
            }
            IfProblem::Unclosed { .. } => DiagnosticMessageBuilder::warning("Unclosed IF field")
                .with_code("F-2-3")
                .add_hint("Add a `%end%` marker after the field's branch content?"),
            IfProblem::RepeatedElse { marker_index, .. } => {
                DiagnosticMessageBuilder::warning("Repeated `%else%` in IF field")
                    .with_code("F-2-4")
                    .add_detail(format!("Second `%else%` found at run {}", marker_index))
            }
        };
        builder
            .problem(self.to_string())
            .add_detail(format!("Instruction: `{}`", self.instruction().trim()))
            .at_run(self.run_index())
            .build()
    }
}

/// Whether `runs[index]` opens an IF field: a `begin` marker followed by a
/// run whose instruction starts with the IF keyword.
pub fn is_if_start(doc: &WordDocument, runs: &[NodeId], index: usize) -> bool {
    if doc.run_field_char(runs[index]) != Some(FieldCharType::Begin) {
        return false;
    }
    runs.get(index + 1)
        .and_then(|&run| doc.run_instruction(run))
        .is_some_and(|(_, text)| is_if_instruction(&text))
}

/// Parse the IF field whose `begin` run is `runs[index]`.
///
/// The caller must have checked [`is_if_start`].
pub fn parse_if_at(
    doc: &WordDocument,
    runs: &[NodeId],
    index: usize,
    options: &ProcessOptions,
) -> Result<ParsedIf, IfProblem> {
    let (instr, instruction) = runs
        .get(index + 1)
        .and_then(|&run| doc.run_instruction(run))
        .unwrap_or_else(|| (runs[index], String::new()));

    let condition = match parse_instruction(&instruction) {
        Ok(Instruction::If(condition)) => condition,
        Ok(_) => {
            return Err(IfProblem::Unparseable {
                run_index: index,
                instruction,
                error: InstructionError::MissingBranchLiterals,
            });
        }
        Err(error) => {
            return Err(IfProblem::Unparseable {
                run_index: index,
                instruction,
                error,
            });
        }
    };

    let incomplete = |missing: FieldCharType| IfProblem::Incomplete {
        run_index: index,
        missing,
        instruction: instruction.clone(),
    };
    let triad = locate_triad(doc, instr).map_err(incomplete)?;
    let code_end = doc
        .enclosing_run(triad.end)
        .and_then(|end_run| {
            runs.iter()
                .skip(index + 2)
                .position(|&run| run == end_run)
                .map(|offset| offset + index + 2)
        })
        .ok_or_else(|| incomplete(FieldCharType::End))?;

    let mut parsed = ParsedIf {
        condition,
        begin_index: index,
        code_runs: runs[index..=code_end].to_vec(),
        if_true: Vec::new(),
        if_false: Vec::new(),
        marker_runs: Vec::new(),
        next_index: code_end + 1,
    };

    let mut in_true = true;
    let mut seen_else = false;
    let mut depth = 1usize;
    let mut j = code_end + 1;

    while j < runs.len() && depth > 0 {
        let run = runs[j];

        if is_if_start(doc, runs, j) {
            let nested = parse_if_at(doc, runs, j, options)?;
            j = nested.next_index;
            branch(&mut parsed, in_true).push(BranchEntry::Nested(nested));
            continue;
        }

        let texts = text_nodes(doc, run);
        let has_marker = texts
            .iter()
            .any(|(_, text)| text.contains(ELSE_MARKER) || text.contains(END_MARKER));
        if !has_marker {
            let text = doc.run_text(run);
            if !text.is_empty() && text.trim() != options.if_placeholder {
                branch(&mut parsed, in_true).push(BranchEntry::Text { run, text });
            } else {
                branch(&mut parsed, in_true).push(BranchEntry::Run(run));
            }
            j += 1;
            continue;
        }

        let mut sides = Vec::new();
        for (_, text) in &texts {
            for piece in pieces(text) {
                match piece {
                    Piece::Text(_) if depth == 0 => sides.push(BranchSide::Outside),
                    Piece::Text(fragment) => {
                        sides.push(if in_true { BranchSide::True } else { BranchSide::False });
                        let trimmed = fragment.trim();
                        if !trimmed.is_empty() && trimmed != options.if_placeholder {
                            branch(&mut parsed, in_true)
                                .push(BranchEntry::Fragment(fragment.to_string()));
                        }
                    }
                    Piece::Else if depth > 0 => {
                        match options.else_policy {
                            ElsePolicy::Reject if seen_else => {
                                return Err(IfProblem::RepeatedElse {
                                    run_index: index,
                                    marker_index: j,
                                    instruction,
                                });
                            }
                            ElsePolicy::Reject => in_true = false,
                            ElsePolicy::Toggle => in_true = !in_true,
                        }
                        seen_else = true;
                    }
                    Piece::End if depth > 0 => depth -= 1,
                    Piece::Else | Piece::End => {}
                }
            }
        }
        parsed.marker_runs.push(MarkerRun { run, sides });
        j += 1;
    }

    if depth > 0 {
        return Err(IfProblem::Unclosed {
            run_index: index,
            instruction,
        });
    }

    parsed.next_index = j;
    Ok(parsed)
}

fn branch(parsed: &mut ParsedIf, in_true: bool) -> &mut Vec<BranchEntry> {
    if in_true {
        &mut parsed.if_true
    } else {
        &mut parsed.if_false
    }
}

/// Text of a run split at its markers.
enum Piece<'a> {
    Text(&'a str),
    Else,
    End,
}

fn pieces(text: &str) -> Vec<Piece<'_>> {
    let mut out = Vec::new();
    let mut rest = text;
    loop {
        let (at, piece, len) = match (rest.find(ELSE_MARKER), rest.find(END_MARKER)) {
            (Some(e), Some(d)) if d < e => (d, Piece::End, END_MARKER.len()),
            (Some(e), _) => (e, Piece::Else, ELSE_MARKER.len()),
            (None, Some(d)) => (d, Piece::End, END_MARKER.len()),
            (None, None) => {
                out.push(Piece::Text(rest));
                return out;
            }
        };
        out.push(Piece::Text(&rest[..at]));
        out.push(piece);
        rest = &rest[at + len..];
    }
}

/// Text nodes inside the `w:t` elements of a run.
fn text_nodes(doc: &WordDocument, run: NodeId) -> Vec<(NodeId, String)> {
    doc.descendants(run, names::TEXT)
        .into_iter()
        .flat_map(|t| doc.xml().children(t).to_vec())
        .filter_map(|child| match doc.xml().kind(child) {
            XmlNodeKind::Text(text) => Some((child, text.clone())),
            _ => None,
        })
        .collect()
}

/// Parse every top-level IF field in document order.
///
/// Malformed fields are reported to `diagnostics` once each and skipped;
/// scanning resumes at the next run.
pub fn parse_if_fields(
    doc: &WordDocument,
    options: &ProcessOptions,
    diagnostics: &mut DiagnosticCollector,
) -> Vec<ParsedIf> {
    let runs = doc.runs();
    let mut fields = Vec::new();
    let mut reported = HashSet::new();
    let mut i = 0;

    while i < runs.len() {
        if !is_if_start(doc, &runs, i) {
            i += 1;
            continue;
        }
        match parse_if_at(doc, &runs, i, options) {
            Ok(parsed) => {
                tracing::debug!(
                    left = %parsed.condition.left,
                    operator = %parsed.condition.operator,
                    run = i,
                    "parsed IF field"
                );
                i = parsed.next_index;
                fields.push(parsed);
            }
            Err(problem) => {
                // A broken nested field fails its parent too; the scan then
                // reaches it again at top level.
                if reported.insert(problem.run_index()) {
                    diagnostics.add(problem.to_diagnostic());
                }
                i += 1;
            }
        }
    }

    fields
}

/// Evaluate and prune one parsed field.
///
/// Removes every run of the losing branch, prunes nested fields of the
/// winning branch, and rewrites the marker runs so that only their markers
/// and losing text disappear. Field-code runs are kept.
pub fn apply_if_field(doc: &mut WordDocument, parsed: &ParsedIf, context: &DataContext) {
    let keep_true = evaluate_condition(&parsed.condition, context);
    tracing::debug!(
        left = %parsed.condition.left,
        result = keep_true,
        "evaluated IF field"
    );

    let (winning, losing, keep) = if keep_true {
        (&parsed.if_true, &parsed.if_false, BranchSide::True)
    } else {
        (&parsed.if_false, &parsed.if_true, BranchSide::False)
    };

    let mut removed = Vec::new();
    for entry in losing {
        entry.collect_runs(&mut removed);
    }
    for run in removed {
        doc.xml_mut().remove(run);
    }

    for entry in winning {
        if let BranchEntry::Nested(nested) = entry {
            apply_if_field(doc, nested, context);
        }
    }

    for marker in &parsed.marker_runs {
        rewrite_marker_run(doc, marker, keep);
    }
}

fn rewrite_marker_run(doc: &mut WordDocument, marker: &MarkerRun, keep: BranchSide) {
    let mut sides = marker.sides.iter();
    for (node, text) in text_nodes(doc, marker.run) {
        let mut kept = String::new();
        for piece in pieces(&text) {
            if let Piece::Text(fragment) = piece {
                let side = sides.next().copied().unwrap_or(BranchSide::Outside);
                if side == keep || side == BranchSide::Outside {
                    kept.push_str(fragment);
                }
            }
        }
        if kept != text {
            doc.xml_mut().set_node_value(node, &kept);
        }
    }
}

/// Parse, evaluate and prune every IF field. Returns the number of fields
/// applied.
pub fn process_if_fields(
    doc: &mut WordDocument,
    context: &DataContext,
    options: &ProcessOptions,
    diagnostics: &mut DiagnosticCollector,
) -> usize {
    let fields = parse_if_fields(doc, options, diagnostics);
    for parsed in &fields {
        apply_if_field(doc, parsed, context);
    }
    fields.len()
}
