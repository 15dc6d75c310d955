//! Classification of raw statements
//!
//!     Raw statements come from `@kw ...:` headers, `@import`/`@model` directives and the lines
//!     of `@:` code regions. Only the head of a statement needs recognizing: the keywords, the
//!     targets of a `for`, the name on the left of an assignment. Whatever follows is an
//!     expression handed over verbatim.

use logos::Logos;

use crate::razor::error::{CompileError, StructureError};

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t]+")]
enum Word {
    #[token("if")]
    If,
    #[token("elif")]
    Elif,
    #[token("else")]
    Else,
    #[token("for")]
    For,
    #[token("in")]
    In,
    #[token("while")]
    While,
    #[token("pass")]
    Pass,
    #[token("break")]
    Break,
    #[token("continue")]
    Continue,
    #[token("import")]
    Import,
    #[token("from")]
    From,
    #[token("assert")]
    Assert,
    #[token(",")]
    Comma,
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("=")]
    Assign,
    #[token("+=")]
    AddAssign,
    #[token("-=")]
    SubAssign,
    #[token("==")]
    Equals,
    #[regex("[A-Za-z_][A-Za-z0-9_]*")]
    Ident,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Set,
    Add,
    Sub,
}

/// A classified raw statement. Expression parts are still source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    If(String),
    Elif(String),
    Else,
    For {
        targets: Vec<String>,
        iterable: String,
    },
    While(String),
    Pass,
    Break,
    Continue,
    Assign {
        name: String,
        op: AssignOp,
        value: String,
    },
    Assert(String),
    Import(String),
    Comment,
    Expr(String),
}

impl Stmt {
    /// Statements that open an indented body.
    pub fn is_header(&self) -> bool {
        matches!(
            self,
            Stmt::If(_) | Stmt::Elif(_) | Stmt::Else | Stmt::For { .. } | Stmt::While(_)
        )
    }
}

fn unsupported(code: &str) -> CompileError {
    CompileError::Structure(StructureError::Unsupported(code.to_string()))
}

fn non_empty(text: &str, code: &str) -> Result<String, CompileError> {
    if text.is_empty() {
        Err(unsupported(code))
    } else {
        Ok(text.to_string())
    }
}

pub fn parse(code: &str) -> Result<Stmt, CompileError> {
    let code = code.trim();
    if code.starts_with('#') {
        return Ok(Stmt::Comment);
    }
    let (head, is_header) = match code.strip_suffix(':') {
        Some(head) => (head.trim_end(), true),
        None => (code, false),
    };

    let mut lexer = Word::lexer(head);
    let first = lexer.next();
    let first_slice = lexer.slice();
    let rest = lexer.remainder().trim();

    match (first, is_header) {
        (Some(Ok(Word::If)), true) => Ok(Stmt::If(non_empty(rest, code)?)),
        (Some(Ok(Word::Elif)), true) => Ok(Stmt::Elif(non_empty(rest, code)?)),
        (Some(Ok(Word::Else)), true) if rest.is_empty() => Ok(Stmt::Else),
        (Some(Ok(Word::While)), true) => Ok(Stmt::While(non_empty(rest, code)?)),
        (Some(Ok(Word::For)), true) => parse_for(&mut lexer, code),
        (Some(Ok(Word::Pass)), false) if rest.is_empty() => Ok(Stmt::Pass),
        (Some(Ok(Word::Break)), false) if rest.is_empty() => Ok(Stmt::Break),
        (Some(Ok(Word::Continue)), false) if rest.is_empty() => Ok(Stmt::Continue),
        (Some(Ok(Word::Import | Word::From)), false) => Ok(Stmt::Import(code.to_string())),
        (Some(Ok(Word::Assert)), false) => Ok(Stmt::Assert(non_empty(rest, code)?)),
        (Some(Ok(Word::Ident)), false) => {
            let name = first_slice.to_string();
            let op = match lexer.next() {
                Some(Ok(Word::Assign)) => AssignOp::Set,
                Some(Ok(Word::AddAssign)) => AssignOp::Add,
                Some(Ok(Word::SubAssign)) => AssignOp::Sub,
                _ => return Ok(Stmt::Expr(code.to_string())),
            };
            let value = non_empty(lexer.remainder().trim(), code)?;
            Ok(Stmt::Assign { name, op, value })
        }
        (_, true) => Err(unsupported(code)),
        (Some(Ok(Word::Elif | Word::Else | Word::If | Word::For | Word::While)), false) => {
            Err(unsupported(code))
        }
        _ => Ok(Stmt::Expr(code.to_string())),
    }
}

/// `for a in xs`, `for a, b in xs`, `for (a, b) in xs`
fn parse_for(lexer: &mut logos::Lexer<Word>, code: &str) -> Result<Stmt, CompileError> {
    let mut targets = Vec::new();
    let mut in_paren = false;
    let mut expect_name = true;
    loop {
        match lexer.next() {
            Some(Ok(Word::LParen)) if targets.is_empty() && !in_paren => in_paren = true,
            Some(Ok(Word::Ident)) if expect_name => {
                targets.push(lexer.slice().to_string());
                expect_name = false;
            }
            Some(Ok(Word::Comma)) if !expect_name => expect_name = true,
            Some(Ok(Word::RParen)) if in_paren && !expect_name => in_paren = false,
            Some(Ok(Word::In)) if !expect_name && !in_paren => break,
            _ => return Err(unsupported(code)),
        }
    }
    let iterable = non_empty(lexer.remainder().trim(), code)?;
    Ok(Stmt::For { targets, iterable })
}
