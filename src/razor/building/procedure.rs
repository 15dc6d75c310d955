//! The intermediate render procedure
//!
//!     A flat, append-only list of statements, each with the indentation level it was
//!     generated at. Nesting is implied by indentation only; [crate::razor::template] turns
//!     the list into a tree when a template is compiled.
//!
//!     [Procedure] renders as the Python-like source text the statements stand for. That text
//!     is what `razor procedure` prints and what debug logging shows.

use std::fmt;

use crate::razor::lexing::ExprSource;

/// Indentation per level in the rendered procedure text.
const INDENT: &str = "  ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementKind {
    /// `def template(self, __io, model=None):`
    Header,
    /// `view = self`
    BindView,
    /// Writes literal text to the output
    WriteLiteral(String),
    /// Evaluates an expression and writes it unless it is none-like. Statements nested one
    /// level deeper run only when the value was written.
    WriteExpression(ExprSource),
    /// A statement of the template's host language, kept verbatim
    Raw(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub indent: usize,
    pub kind: StatementKind,
}

impl Statement {
    pub fn new(indent: usize, kind: StatementKind) -> Self {
        Statement { indent, kind }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Procedure {
    statements: Vec<Statement>,
}

impl Procedure {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, indent: usize, kind: StatementKind) {
        self.statements.push(Statement::new(indent, kind));
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

/// Quotes `text` as a single-quoted literal.
fn quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('\'');
    for c in text.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '\'' => quoted.push_str("\\'"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            other => quoted.push(other),
        }
    }
    quoted.push('\'');
    quoted
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pad = INDENT.repeat(self.indent);
        match &self.kind {
            StatementKind::Header => write!(f, "{}def template(self, __io, model=None):", pad),
            StatementKind::BindView => write!(f, "{}view = self", pad),
            StatementKind::WriteLiteral(text) => write!(f, "{}__io.write(u{})", pad, quote(text)),
            StatementKind::WriteExpression(expr) => {
                if expr.escape {
                    writeln!(f, "{}__e = escape(str({}))", pad, expr.source)?;
                } else {
                    writeln!(f, "{}__e = {}", pad, expr.source)?;
                }
                writeln!(f, "{}if __e != None and __e != 'None':", pad)?;
                write!(f, "{}{}__io.write(unicode(__e))", pad, INDENT)
            }
            StatementKind::Raw(code) => write!(f, "{}{}", pad, code),
        }
    }
}

impl fmt::Display for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for statement in &self.statements {
            writeln!(f, "{}", statement)?;
        }
        Ok(())
    }
}
