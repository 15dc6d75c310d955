//! Scope tracking for indentation-delimited blocks
//!
//!     Two layers:
//!         - [indent_stack]: raw indentation markers and their close actions.
//!         - [scope_stack]: the nesting depth the code generator indents by.
//!
//!     The lexer owns one [ScopeStack] per compilation and feeds it every line's leading
//!     whitespace. The generator only ever reads the depth.

pub mod indent_stack;
pub mod scope_stack;

pub use indent_stack::{CloseAction, IndentStack, ScopeKind, ScopeMarker};
pub use scope_stack::ScopeStack;

use thiserror::Error;

/// Internal invariant violations in scope bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScopeError {
    #[error("scope underflow: closed a scope that was never opened")]
    Underflow,
}
