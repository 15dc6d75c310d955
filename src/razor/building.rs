//! Code generation
//!
//!     [builder] turns the token stream into a [procedure::Procedure], the flat intermediate
//!     form of a template's render routine.

pub mod builder;
pub mod procedure;

pub use builder::ProcedureBuilder;
pub use procedure::{Procedure, Statement, StatementKind};
