//! Program assembly
//!
//!     The procedure is flat; nesting lives in the statement levels. Assembly rebuilds the
//!     tree a Python compiler would see: a header's body is the run of statements indented
//!     one level deeper, `elif`/`else` attach to the `if` right above them at the same level,
//!     and the statements nested under a write-expression are its guarded tail.
//!
//!     Every expression is compiled once here, so syntax errors surface at compile time and
//!     renders only evaluate.

use std::fmt;
use std::sync::Arc;

use minijinja::value::Value;
use minijinja::Expression;
use serde::Serialize;

use super::runtime::ENV;
use super::statement::{self, AssignOp, Stmt};
use crate::razor::building::{Procedure, Statement, StatementKind};
use crate::razor::error::{CompileError, StructureError};

/// An expression compiled against the shared environment, with its source kept for errors.
#[derive(Clone)]
pub struct Expr {
    source: String,
    compiled: Arc<Expression<'static, 'static>>,
}

impl Expr {
    pub fn new(source: impl Into<String>) -> Result<Self, CompileError> {
        let source = source.into();
        match ENV.compile_expression_owned(source.clone()) {
            Ok(compiled) => Ok(Expr {
                source,
                compiled: Arc::new(compiled),
            }),
            Err(err) => Err(CompileError::Syntax {
                expr: source,
                message: err.to_string(),
            }),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn eval<S: Serialize>(&self, ctx: S) -> Result<Value, minijinja::Error> {
        self.compiled.eval(ctx)
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Expr").field(&self.source).finish()
    }
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Expr {}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Write(String),
    Output {
        expr: Expr,
        escape: bool,
        guarded: Vec<Node>,
    },
    If {
        branches: Vec<(Expr, Vec<Node>)>,
        otherwise: Option<Vec<Node>>,
    },
    For {
        targets: Vec<String>,
        iterable: Expr,
        body: Vec<Node>,
    },
    While {
        cond: Expr,
        body: Vec<Node>,
    },
    Assign {
        name: String,
        value: Expr,
    },
    Assert(Expr),
    Eval(Expr),
    Pass,
    Break,
    Continue,
}

/// The assembled statement tree of one template.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub body: Vec<Node>,
}

impl Program {
    pub fn assemble(procedure: &Procedure) -> Result<Self, CompileError> {
        let statements: Vec<&Statement> = procedure
            .statements()
            .iter()
            .filter(|st| !matches!(st.kind, StatementKind::Header | StatementKind::BindView))
            .collect();
        let mut assembler = Assembler {
            statements,
            pos: 0,
        };
        let body = assembler.block(1)?;
        if let Some(st) = assembler.peek() {
            return Err(StructureError::UnexpectedIndent(describe(st)).into());
        }
        Ok(Program { body })
    }
}

fn describe(statement: &Statement) -> String {
    match &statement.kind {
        StatementKind::Raw(code) => code.clone(),
        _ => statement.to_string().trim().to_string(),
    }
}

struct Assembler<'a> {
    statements: Vec<&'a Statement>,
    pos: usize,
}

impl<'a> Assembler<'a> {
    fn peek(&self) -> Option<&'a Statement> {
        self.statements.get(self.pos).copied()
    }

    /// Statements at exactly `indent`, up to the first shallower one.
    fn block(&mut self, indent: usize) -> Result<Vec<Node>, CompileError> {
        let mut nodes = Vec::new();
        while let Some(st) = self.peek() {
            if st.indent < indent {
                break;
            }
            if st.indent > indent {
                return Err(StructureError::UnexpectedIndent(describe(st)).into());
            }
            self.pos += 1;
            match &st.kind {
                StatementKind::WriteLiteral(text) => nodes.push(Node::Write(text.clone())),
                StatementKind::WriteExpression(source) => {
                    let expr = Expr::new(source.source.clone())?;
                    let guarded = self.block(indent + 1)?;
                    nodes.push(Node::Output {
                        expr,
                        escape: source.escape,
                        guarded,
                    });
                }
                StatementKind::Raw(code) => {
                    if let Some(node) = self.raw(code, indent)? {
                        nodes.push(node);
                    }
                }
                StatementKind::Header | StatementKind::BindView => {
                    return Err(StructureError::Unsupported(describe(st)).into());
                }
            }
        }
        Ok(nodes)
    }

    /// Body of a header at `indent`.
    fn body(&mut self, indent: usize, header: &str) -> Result<Vec<Node>, CompileError> {
        let body = self.block(indent + 1)?;
        if body.is_empty() {
            return Err(StructureError::EmptyBlock(header.to_string()).into());
        }
        Ok(body)
    }

    fn raw(&mut self, code: &str, indent: usize) -> Result<Option<Node>, CompileError> {
        let node = match statement::parse(code)? {
            Stmt::If(cond) => {
                let mut branches = vec![(Expr::new(cond)?, self.body(indent, code)?)];
                let mut otherwise = None;
                while let Some((next, stmt)) = self.branch_at(indent)? {
                    self.pos += 1;
                    match stmt {
                        Stmt::Elif(cond) => {
                            branches.push((Expr::new(cond)?, self.body(indent, &next)?));
                        }
                        _ => {
                            otherwise = Some(self.body(indent, &next)?);
                            break;
                        }
                    }
                }
                Node::If {
                    branches,
                    otherwise,
                }
            }
            Stmt::Elif(_) | Stmt::Else => {
                return Err(StructureError::DanglingBranch(code.to_string()).into());
            }
            Stmt::For { targets, iterable } => Node::For {
                targets,
                iterable: Expr::new(iterable)?,
                body: self.body(indent, code)?,
            },
            Stmt::While(cond) => Node::While {
                cond: Expr::new(cond)?,
                body: self.body(indent, code)?,
            },
            Stmt::Assign { name, op, value } => {
                let value = match op {
                    AssignOp::Set => value,
                    AssignOp::Add => format!("({}) + ({})", name, value),
                    AssignOp::Sub => format!("({}) - ({})", name, value),
                };
                Node::Assign {
                    name,
                    value: Expr::new(value)?,
                }
            }
            Stmt::Assert(expr) => Node::Assert(Expr::new(expr)?),
            Stmt::Expr(expr) => Node::Eval(Expr::new(expr)?),
            Stmt::Pass => Node::Pass,
            Stmt::Break => Node::Break,
            Stmt::Continue => Node::Continue,
            Stmt::Import(code) => {
                tracing::trace!(%code, "import has no effect");
                return Ok(None);
            }
            Stmt::Comment => return Ok(None),
        };
        Ok(Some(node))
    }

    /// The `elif`/`else` continuing an `if` at `indent`, if the next statement is one.
    fn branch_at(&self, indent: usize) -> Result<Option<(String, Stmt)>, CompileError> {
        let Some(st) = self.peek() else {
            return Ok(None);
        };
        let StatementKind::Raw(code) = &st.kind else {
            return Ok(None);
        };
        if st.indent != indent {
            return Ok(None);
        }
        match statement::parse(code)? {
            stmt @ (Stmt::Elif(_) | Stmt::Else) => Ok(Some((code.clone(), stmt))),
            _ => Ok(None),
        }
    }
}
