//! Rendering: a tree-walking interpreter over [Program]
//!
//!     Expressions are evaluated with minijinja against a flat variable map. The map starts
//!     with the fields of the model (when the model is a map), plus `model` and `view`;
//!     assignments and loop targets write into the same map, so locals shadow model fields.
//!     Undefined names are errors.
//!
//!     Values are stringified the way Python's `str()` would show them (`None`, `True`,
//!     `False`), since templates compare against those spellings.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use minijinja::value::{Value, ValueKind};
use minijinja::{Environment, Error, ErrorKind, UndefinedBehavior};
use once_cell::sync::Lazy;

use super::program::{Expr, Node, Program};
use crate::razor::error::EvalError;

/// Shared expression environment with the Python-flavoured globals.
pub static ENV: Lazy<Environment<'static>> = Lazy::new(|| {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.add_function("isinstance", isinstance);
    env.add_function("len", len);
    env.add_function("str", |value: Value| py_str(&value));
    env
});

fn isinstance(value: Value, type_name: &str) -> Result<bool, Error> {
    let matches = match type_name {
        "dict" | "Mapping" => value.kind() == ValueKind::Map,
        "list" | "tuple" | "Sequence" => value.kind() == ValueKind::Seq,
        "str" | "unicode" => value.kind() == ValueKind::String,
        "bool" => value.kind() == ValueKind::Bool,
        "int" => value.is_integer(),
        "float" => value.kind() == ValueKind::Number && !value.is_integer(),
        "NoneType" => value.is_none(),
        "object" => !value.is_undefined(),
        // Record types serialize to maps
        name if name.starts_with(|c: char| c.is_ascii_uppercase()) => {
            value.kind() == ValueKind::Map
        }
        other => {
            return Err(Error::new(
                ErrorKind::InvalidOperation,
                format!("unknown type name {:?}", other),
            ))
        }
    };
    Ok(matches)
}

fn len(value: Value) -> Result<usize, Error> {
    value.len().ok_or_else(|| {
        Error::new(
            ErrorKind::InvalidOperation,
            format!("object of kind {} has no len()", value.kind()),
        )
    })
}

/// `str()` as Python spells it.
pub fn py_str(value: &Value) -> String {
    match value.kind() {
        ValueKind::Undefined | ValueKind::None => "None".to_string(),
        ValueKind::Bool if value.is_true() => "True".to_string(),
        ValueKind::Bool => "False".to_string(),
        _ => value.to_string(),
    }
}

/// Escapes `&`, `<` and `>`. Quotes are left alone.
pub fn escape(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>']) {
        return Cow::Borrowed(text);
    }
    let mut escaped = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            other => escaped.push(other),
        }
    }
    Cow::Owned(escaped)
}

/// How a block finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Normal,
    Break,
    Continue,
}

pub struct Runtime<'w, W: fmt::Write> {
    vars: BTreeMap<String, Value>,
    out: &'w mut W,
}

impl<'w, W: fmt::Write> Runtime<'w, W> {
    pub fn new(model: Value, out: &'w mut W) -> Result<Self, EvalError> {
        let mut vars = BTreeMap::new();
        if model.kind() == ValueKind::Map {
            let keys = model.try_iter().map_err(|error| EvalError::Expression {
                expr: "model".to_string(),
                error,
            })?;
            for key in keys {
                if let Some(name) = key.as_str() {
                    let field = model.get_item(&key).map_err(|error| EvalError::Expression {
                        expr: format!("model[{:?}]", name),
                        error,
                    })?;
                    vars.insert(name.to_string(), field);
                }
            }
        }
        let view = BTreeMap::from([("model", model.clone())]);
        vars.insert("view".to_string(), Value::from_serialize(&view));
        vars.insert("model".to_string(), model);
        Ok(Runtime { vars, out })
    }

    pub fn run(&mut self, program: &Program) -> Result<(), EvalError> {
        match self.exec_block(&program.body)? {
            Flow::Normal => Ok(()),
            Flow::Break => Err(EvalError::LoopControl("break")),
            Flow::Continue => Err(EvalError::LoopControl("continue")),
        }
    }

    fn eval(&self, expr: &Expr) -> Result<Value, EvalError> {
        let value = expr.eval(&self.vars).map_err(|error| EvalError::Expression {
            expr: expr.source().to_string(),
            error,
        })?;
        if value.is_undefined() {
            return Err(EvalError::Undefined(expr.source().to_string()));
        }
        Ok(value)
    }

    fn truthy(&self, expr: &Expr) -> Result<bool, EvalError> {
        Ok(self.eval(expr)?.is_true())
    }

    fn exec_block(&mut self, nodes: &[Node]) -> Result<Flow, EvalError> {
        for node in nodes {
            let flow = self.exec(node)?;
            if flow != Flow::Normal {
                return Ok(flow);
            }
        }
        Ok(Flow::Normal)
    }

    fn exec(&mut self, node: &Node) -> Result<Flow, EvalError> {
        match node {
            Node::Write(text) => self.out.write_str(text)?,
            Node::Output {
                expr,
                escape: escaped,
                guarded,
            } => {
                let value = self.eval(expr)?;
                if value.is_none() {
                    return Ok(Flow::Normal);
                }
                let text = py_str(&value);
                let text = if *escaped { escape(&text) } else { Cow::Borrowed(text.as_str()) };
                // A value printing as "None" is dropped too, along with its line break
                if text == "None" {
                    return Ok(Flow::Normal);
                }
                self.out.write_str(&text)?;
                return self.exec_block(guarded);
            }
            Node::If {
                branches,
                otherwise,
            } => {
                for (cond, body) in branches {
                    if self.truthy(cond)? {
                        return self.exec_block(body);
                    }
                }
                if let Some(body) = otherwise {
                    return self.exec_block(body);
                }
            }
            Node::For {
                targets,
                iterable,
                body,
            } => {
                let items = self.eval(iterable)?;
                let iter = items.try_iter().map_err(|error| EvalError::Expression {
                    expr: iterable.source().to_string(),
                    error,
                })?;
                for item in iter {
                    self.bind(targets, item)?;
                    if self.exec_block(body)? == Flow::Break {
                        break;
                    }
                }
            }
            Node::While { cond, body } => {
                while self.truthy(cond)? {
                    if self.exec_block(body)? == Flow::Break {
                        break;
                    }
                }
            }
            Node::Assign { name, value } => {
                let value = self.eval(value)?;
                self.vars.insert(name.clone(), value);
            }
            Node::Assert(expr) => {
                if !self.truthy(expr)? {
                    return Err(EvalError::AssertionFailed(expr.source().to_string()));
                }
            }
            Node::Eval(expr) => {
                self.eval(expr)?;
            }
            Node::Pass => {}
            Node::Break => return Ok(Flow::Break),
            Node::Continue => return Ok(Flow::Continue),
        }
        Ok(Flow::Normal)
    }

    /// Binds one loop item to the loop's target names.
    fn bind(&mut self, targets: &[String], item: Value) -> Result<(), EvalError> {
        if let [name] = targets {
            self.vars.insert(name.clone(), item);
            return Ok(());
        }
        if item.len() != Some(targets.len()) || item.kind() == ValueKind::String {
            return Err(EvalError::Unpack {
                value: py_str(&item),
                count: targets.len(),
            });
        }
        for (idx, name) in targets.iter().enumerate() {
            let part = item
                .get_item(&Value::from(idx))
                .map_err(|error| EvalError::Expression {
                    expr: name.clone(),
                    error,
                })?;
            self.vars.insert(name.clone(), part);
        }
        Ok(())
    }
}
