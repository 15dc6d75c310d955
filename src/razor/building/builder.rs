//! Token stream to procedure
//!
//!     The builder sees one token at a time together with the scope depth the lexer reported
//!     right after producing it. Statement levels only resynchronize on line breaks, so a
//!     block header is written at the level of the line it sits on and its body one level
//!     deeper.

use super::procedure::{Procedure, StatementKind};
use crate::razor::lexing::{LineEnding, Token, TokenKind};

pub struct ProcedureBuilder {
    procedure: Procedure,
    level: usize,
    last: Option<TokenKind>,
    /// Relative indentation of the current line, written only if the line turns out to
    /// produce output
    pending_indent: Option<String>,
}

impl Default for ProcedureBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcedureBuilder {
    pub fn new() -> Self {
        let mut procedure = Procedure::new();
        procedure.push(0, StatementKind::Header);
        procedure.push(1, StatementKind::BindView);
        ProcedureBuilder {
            procedure,
            level: 1,
            last: None,
            pending_indent: None,
        }
    }

    /// Current statement level.
    pub fn level(&self) -> usize {
        self.level
    }

    /// Adds one token. `depth` is the scope depth after the token was lexed.
    pub fn push(&mut self, token: &Token, depth: usize) {
        let indent = self.pending_indent.take();
        match token {
            Token::EmptyLine => {
                self.pending_indent = indent;
                return;
            }
            Token::Newline { ending, indent: next } => {
                // Whitespace of a line that held nothing else
                self.write_indent(indent);
                self.line_break(*ending);
                self.level = depth + 1;
                self.pending_indent = Some(next.clone());
            }
            Token::ExplicitMultilineClose(ending) => {
                self.line_break(*ending);
                self.level = depth + 1;
            }
            Token::Code(code) | Token::MultilineOpen(code) | Token::OneLineDirective(code) => {
                self.procedure.push(
                    self.level,
                    StatementKind::Raw(code.trim_start_matches([' ', '\t']).to_string()),
                );
            }
            Token::Expression(expr) | Token::ParenExpression(expr) => {
                self.write_indent(indent);
                self.procedure
                    .push(self.level, StatementKind::WriteExpression(expr.clone()));
            }
            other => {
                if let Some(text) = other.literal() {
                    self.write_indent(indent);
                    self.procedure
                        .push(self.level, StatementKind::WriteLiteral(text.to_string()));
                }
            }
        }
        self.last = Some(token.kind());
    }

    pub fn finish(mut self) -> Procedure {
        let indent = self.pending_indent.take();
        self.write_indent(indent);
        self.procedure
    }

    fn write_indent(&mut self, indent: Option<String>) {
        if let Some(text) = indent.filter(|text| !text.is_empty()) {
            self.procedure
                .push(self.level, StatementKind::WriteLiteral(text));
        }
    }

    /// Writes the line break ending the previous line, unless that line was pure code.
    fn line_break(&mut self, ending: LineEnding) {
        let level = match self.last {
            Some(kind) if kind.is_statement() => return,
            // Inside the guard of the expression that ended the line
            Some(kind) if kind.is_expression() => self.level + 1,
            _ => self.level,
        };
        self.procedure
            .push(level, StatementKind::WriteLiteral(ending.as_str().to_string()));
    }
}
