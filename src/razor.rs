//! Razor-style templates
//!
//!     Templates are markup with `@` expressions and indentation-delimited blocks:
//!
//!         @model dict
//!         <ul>
//!         @for item in items:
//!             <li>@item.name</li>
//!         </ul>
//!
//!     Compilation runs in three stages:
//!         - [lexing]: tokens, with the [scope] stack tracking block depth from indentation.
//!         - [building]: the token stream becomes a flat [building::Procedure].
//!         - [template]: the procedure is assembled into a program and rendered by an
//!           interpreter.
//!
//!     [store::Razor] adds caching and view-root lookup on top of [compile].

pub mod building;
pub mod config;
pub mod error;
pub mod lexing;
pub mod scope;
pub mod store;
pub mod template;

use self::building::ProcedureBuilder;
use self::config::CompileOptions;
use self::error::CompileError;
use self::lexing::Lexer;
use self::template::CompiledTemplate;

/// Compiles template `source` into a renderable template.
pub fn compile(source: &str, options: &CompileOptions) -> Result<CompiledTemplate, CompileError> {
    let mut lexer = Lexer::new(source, options.ignore_whitespace);
    let mut builder = ProcedureBuilder::new();
    while let Some(token) = lexer.next_token()? {
        let depth = lexer.scope().current_depth();
        if options.debug {
            tracing::debug!(%token, depth, "token");
        }
        builder.push(&token, depth);
    }

    let procedure = builder.finish();
    if options.debug {
        tracing::debug!(statements = procedure.len(), "generated procedure:\n{}", procedure);
    }
    CompiledTemplate::from_procedure(procedure)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_and_render() {
        let template = compile("Hello @name!", &CompileOptions::default()).unwrap();
        let model = serde_json::json!({ "name": "World" });
        assert_eq!(template.render_to_string(&model).unwrap(), "Hello World!");
    }

    #[test]
    fn test_compile_reports_lex_errors() {
        let err = compile("@(1 + 2\n", &CompileOptions::default()).unwrap_err();
        assert!(matches!(err, CompileError::Lex(_)));
    }

    #[test]
    fn test_debug_compile() {
        let options = CompileOptions {
            ignore_whitespace: false,
            debug: true,
        };
        let template = compile("@if x:\n    y\n", &options).unwrap();
        assert_eq!(template.program().body.len(), 1);
    }
}
