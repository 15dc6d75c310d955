//! # razor
//!
//! A compiler and renderer for Razor-style templates: markup with embedded `@` expressions
//! and Python-style indentation-delimited blocks.
//!
//! See the [razor module](razor) for the pipeline and [razor::store::Razor] for the cached
//! entry point.

pub mod razor;

pub use razor::compile;
pub use razor::config::CompileOptions;
pub use razor::error::{CompileError, EvalError, StoreError};
pub use razor::store::Razor;
pub use razor::template::CompiledTemplate;
