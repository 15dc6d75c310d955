//! Errors raised while compiling, rendering and loading templates

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use super::lexing::LexError;

/// Program shapes the statement assembler rejects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructureError {
    #[error("block `{0}` has an empty body")]
    EmptyBlock(String),
    #[error("`{0}` without a matching `if`")]
    DanglingBranch(String),
    #[error("unexpected indentation before `{0}`")]
    UnexpectedIndent(String),
    #[error("unsupported statement `{0}`")]
    Unsupported(String),
}

#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error("invalid expression `{expr}`: {message}")]
    Syntax { expr: String, message: String },
    #[error(transparent)]
    Structure(#[from] StructureError),
}

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("cannot evaluate `{expr}`: {error}")]
    Expression {
        expr: String,
        #[source]
        error: minijinja::Error,
    },
    #[error("`{0}` is undefined")]
    Undefined(String),
    #[error("assertion failed: {0}")]
    AssertionFailed(String),
    #[error("cannot unpack {value} into {count} names")]
    Unpack { value: String, count: usize },
    #[error("`{0}` outside of a loop")]
    LoopControl(&'static str),
    #[error("failed to write output")]
    Write(#[from] fmt::Error),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("template `{name}` not found, tried:\n{}", format_tried(.tried))]
    NotFound { name: String, tried: Vec<PathBuf> },
    #[error("cannot read {}: {error}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },
    #[error("cannot compile {name}: {error}")]
    Compile {
        name: String,
        #[source]
        error: CompileError,
    },
    #[error(transparent)]
    Eval(#[from] EvalError),
}

fn format_tried(tried: &[PathBuf]) -> String {
    tried
        .iter()
        .map(|path| format!("  {} -->  Not Found!", path.display()))
        .collect::<Vec<_>>()
        .join("\n")
}
