//! Compiled templates
//!
//!     A [CompiledTemplate] keeps the generated procedure (for diagnostics) and the program
//!     assembled from it. It is immutable, so one compiled template can serve any number of
//!     concurrent renders.

pub mod program;
pub mod runtime;
pub mod statement;

use std::fmt;

use minijinja::value::Value;
use serde::Serialize;

use self::program::Program;
use self::runtime::Runtime;
use super::building::Procedure;
use super::error::{CompileError, EvalError};

#[derive(Debug, Clone)]
pub struct CompiledTemplate {
    procedure: Procedure,
    program: Program,
}

impl CompiledTemplate {
    /// Assembles the program for `procedure`.
    pub fn from_procedure(procedure: Procedure) -> Result<Self, CompileError> {
        let program = Program::assemble(&procedure)?;
        Ok(CompiledTemplate { procedure, program })
    }

    pub fn procedure(&self) -> &Procedure {
        &self.procedure
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Renders with `model` into `out`.
    pub fn render<S, W>(&self, model: &S, out: &mut W) -> Result<(), EvalError>
    where
        S: Serialize + ?Sized,
        W: fmt::Write,
    {
        self.render_value(Value::from_serialize(model), out)
    }

    pub fn render_value<W: fmt::Write>(&self, model: Value, out: &mut W) -> Result<(), EvalError> {
        Runtime::new(model, out)?.run(&self.program)
    }

    pub fn render_to_string<S: Serialize + ?Sized>(&self, model: &S) -> Result<String, EvalError> {
        let mut out = String::new();
        self.render(model, &mut out)?;
        Ok(out)
    }
}
