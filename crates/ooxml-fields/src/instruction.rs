/*
 * instruction.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Field instruction grammar.
//!
//! Instruction text is tokenized into bare words, `"quoted"` literals and
//! comparison operators, then matched against the two supported forms:
//!
//! ```text
//! MERGEFIELD <dotted-path> [switches...]
//! IF <left> <op> <right> "%iftrue%" "%iffalse%" [switches...]
//! ```
//!
//! `<left>` and `<right>` may be bare or quoted; `<op>` is one of
//! `=`, `<>`, `<=`, `>=`, `<`, `>` (`==` and `!=` are accepted too).

use std::ops::Range;
use thiserror::Error;

pub const MERGEFIELD_KEYWORD: &str = "MERGEFIELD";
pub const IF_KEYWORD: &str = "IF";

/// Literal that must follow an IF condition.
pub const IF_TRUE_LITERAL: &str = "%iftrue%";
/// Literal that must follow [`IF_TRUE_LITERAL`].
pub const IF_FALSE_LITERAL: &str = "%iffalse%";

/// Recognized operator spellings, longest first.
const OPERATORS: &[&str] = &["<>", "<=", ">=", "==", "!=", "=", "<", ">"];

/// Length of the operator starting at `input[at..]`, if any.
fn operator_at(input: &str, at: usize) -> Option<usize> {
    OPERATORS
        .iter()
        .find(|op| input[at..].starts_with(*op))
        .map(|op| op.len())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A run of characters up to whitespace, a quote or a recognized
    /// operator. A lone `!` stays part of the word.
    Word,
    /// A `"..."` literal; the token text excludes the quotes.
    Quoted,
    /// One of the recognized comparison operators.
    Operator,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Byte range in the instruction, including quotes.
    pub span: Range<usize>,
}

impl Token {
    fn is_operand(&self) -> bool {
        matches!(self.kind, TokenKind::Word | TokenKind::Quoted)
    }

    fn is_quoted(&self, literal: &str) -> bool {
        self.kind == TokenKind::Quoted && self.text == literal
    }
}

/// Why an instruction does not match the grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InstructionError {
    #[error("unterminated quoted literal starting at byte {0}")]
    UnterminatedQuote(usize),

    #[error("instruction is empty")]
    Empty,

    #[error("MERGEFIELD has no field name")]
    MissingFieldName,

    #[error("IF has no condition")]
    MissingCondition,

    #[error("IF is not followed by \"%iftrue%\" \"%iffalse%\"")]
    MissingBranchLiterals,
}

/// Split an instruction into tokens.
pub fn tokenize(input: &str) -> Result<Vec<Token>, InstructionError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c == '"' {
            chars.next();
            let mut end = None;
            for (i, ch) in chars.by_ref() {
                if ch == '"' {
                    end = Some(i);
                    break;
                }
            }
            let end = end.ok_or(InstructionError::UnterminatedQuote(start))?;
            tokens.push(Token {
                kind: TokenKind::Quoted,
                text: input[start + 1..end].to_string(),
                span: start..end + 1,
            });
        } else if let Some(len) = operator_at(input, start) {
            let end = start + len;
            while chars.peek().is_some_and(|&(i, _)| i < end) {
                chars.next();
            }
            tokens.push(Token {
                kind: TokenKind::Operator,
                text: input[start..end].to_string(),
                span: start..end,
            });
        } else {
            let mut end = start;
            while let Some(&(i, ch)) = chars.peek() {
                if ch.is_whitespace() || ch == '"' || (i > start && operator_at(input, i).is_some()) {
                    break;
                }
                end = i + ch.len_utf8();
                chars.next();
            }
            tokens.push(Token {
                kind: TokenKind::Word,
                text: input[start..end].to_string(),
                span: start..end,
            });
        }
    }

    Ok(tokens)
}

/// The first bare word of an instruction, e.g. `MERGEFIELD` or `IF`.
pub fn keyword(input: &str) -> Option<&str> {
    input.split_whitespace().next().map(|word| {
        word.split(|c: char| matches!(c, '"' | '=' | '<' | '>'))
            .next()
            .unwrap_or(word)
    })
}

/// Whether the instruction text introduces an IF field.
pub fn is_if_instruction(input: &str) -> bool {
    keyword(input) == Some(IF_KEYWORD)
}

/// Whether the instruction text introduces a merge field.
pub fn is_merge_instruction(input: &str) -> bool {
    keyword(input) == Some(MERGEFIELD_KEYWORD)
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

impl Operator {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "=" | "==" => Some(Operator::Eq),
            "<>" | "!=" => Some(Operator::Ne),
            "<" => Some(Operator::Lt),
            ">" => Some(Operator::Gt),
            "<=" => Some(Operator::Le),
            ">=" => Some(Operator::Ge),
            _ => None,
        }
    }
}

/// An IF condition, split into its parts.
///
/// When the condition is not of the form `<left> <op> <right>`, the whole
/// condition text is kept in `left` and `operator`/`right` are empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Condition {
    pub left: String,
    pub operator: String,
    pub right: String,
}

/// A recognized field instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// `MERGEFIELD <path>`
    MergeField { path: String },
    /// `IF <condition> "%iftrue%" "%iffalse%"`
    If(Condition),
    /// Any other field type, identified by its keyword.
    Other(String),
}

/// Parse instruction text.
///
/// # Errors
///
/// Returns an error when the text is empty, or when it starts with
/// `MERGEFIELD` or `IF` but does not follow that field's grammar.
pub fn parse_instruction(input: &str) -> Result<Instruction, InstructionError> {
    let tokens = tokenize(input)?;
    let first = tokens.first().ok_or(InstructionError::Empty)?;

    if first.kind == TokenKind::Word && first.text == MERGEFIELD_KEYWORD {
        return match tokens.get(1) {
            Some(name) if name.is_operand() && !name.text.is_empty() => Ok(Instruction::MergeField {
                path: name.text.clone(),
            }),
            _ => Err(InstructionError::MissingFieldName),
        };
    }

    if first.kind == TokenKind::Word && first.text == IF_KEYWORD {
        return parse_if(input, &tokens).map(Instruction::If);
    }

    Ok(Instruction::Other(first.text.clone()))
}

fn parse_if(input: &str, tokens: &[Token]) -> Result<Condition, InstructionError> {
    // The condition is everything between the keyword and the first
    // `"%iftrue%" "%iffalse%"` pair.
    let literals = (1..tokens.len().saturating_sub(1))
        .find(|&i| tokens[i].is_quoted(IF_TRUE_LITERAL) && tokens[i + 1].is_quoted(IF_FALSE_LITERAL))
        .ok_or(InstructionError::MissingBranchLiterals)?;

    let condition = &tokens[1..literals];
    let (Some(first), Some(last)) = (condition.first(), condition.last()) else {
        return Err(InstructionError::MissingCondition);
    };

    if let [left, op, right] = condition {
        if left.is_operand() && op.kind == TokenKind::Operator && right.is_operand() {
            return Ok(Condition {
                left: left.text.clone(),
                operator: op.text.clone(),
                right: right.text.clone(),
            });
        }
    }

    Ok(Condition {
        left: input[first.span.start..last.span.end].to_string(),
        operator: String::new(),
        right: String::new(),
    })
}
