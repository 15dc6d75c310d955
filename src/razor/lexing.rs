//! Lexing for razor templates
//!
//!     Templates are scanned in one of two modes. Text mode treats input as literal markup
//!     with `@` constructs embedded in it; Code mode (entered with `@:`) treats each line as a
//!     statement, with inline tags switching back to markup until they close.
//!
//!     Layout:
//!         - [token]: token kinds and payloads.
//!         - [rules]: the ordered regex tables for each mode.
//!         - [lexer]: the state machine that runs them and drives the scope stack.

pub mod lexer;
pub mod rules;
pub mod token;

pub use lexer::{Lexer, LexerState, Mode};
pub use token::{ExprSource, LineEnding, Token, TokenKind};

use std::fmt;

use thiserror::Error;

use super::scope::ScopeError;

/// Position of a lexing failure, 1-based, with the offending source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub line: usize,
    pub column: usize,
    pub snippet: String,
}

impl Location {
    /// Resolves a byte offset into `source`.
    pub fn of(source: &str, offset: usize) -> Self {
        let before = &source[..offset];
        let line_start = before.rfind('\n').map(|idx| idx + 1).unwrap_or(0);
        let line_end = source[offset..]
            .find('\n')
            .map(|idx| offset + idx)
            .unwrap_or(source.len());
        Location {
            line: before.matches('\n').count() + 1,
            column: before[line_start..].chars().count() + 1,
            snippet: source[line_start..line_end].trim_end_matches('\r').to_string(),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}: {:?}", self.line, self.column, self.snippet)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    /// No rule of the active mode matches at this position
    #[error("no token matches at {0}")]
    NoRule(Location),
    /// A parenthesized expression does not close on its line
    #[error("unterminated expression at {0}")]
    UnterminatedExpression(Location),
    #[error(transparent)]
    Scope(#[from] ScopeError),
}

/// Lexes a whole template.
pub fn tokenize(source: &str, ignore_whitespace: bool) -> Result<Vec<Token>, LexError> {
    Lexer::new(source, ignore_whitespace).collect()
}
