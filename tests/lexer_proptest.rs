//! Property-based tests for the template lexer and compiler
//!
//! These check structural guarantees over generated templates: scopes always close by the
//! end of input, and templates without `@` render back to exactly their source.

use proptest::prelude::*;
use razor::razor::lexing::Lexer;
use razor::{compile, CompileOptions};

/// A line of literal markup: empty, whitespace only, or optional indentation followed by a
/// run without `@`, possibly with trailing whitespace.
fn literal_line() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        "[ \t]{1,6}",
        "[ \t]{0,6}[a-zA-Z0-9<>/=.,;:!?'\"#(){}-][a-zA-Z0-9 <>/=.,;:!?'\"#(){}-]{0,24}[ \t]{0,2}",
    ]
}

fn literal_template() -> impl Strategy<Value = String> {
    let ending = prop_oneof![Just("\n"), Just("\r\n")];
    (prop::collection::vec(literal_line(), 0..8), ending)
        .prop_map(|(lines, ending)| lines.join(ending))
}

/// A line of a block-structured template at some nesting level.
fn block_line() -> impl Strategy<Value = String> {
    let content = prop_oneof![
        Just("@if x:".to_string()),
        Just("@for i in items:".to_string()),
        Just("text".to_string()),
        Just("<p>@i</p>".to_string()),
        Just(String::new()),
    ];
    (0usize..4, content).prop_map(|(level, content)| format!("{}{}", "    ".repeat(level), content))
}

fn block_template() -> impl Strategy<Value = String> {
    prop::collection::vec(block_line(), 0..12).prop_map(|lines| lines.join("\n"))
}

proptest! {
    #[test]
    fn test_literal_templates_round_trip(source in literal_template()) {
        let template = compile(&source, &CompileOptions::default()).unwrap();
        let rendered = template.render_to_string(&()).unwrap();
        prop_assert_eq!(rendered, source);
    }

    #[test]
    fn test_depth_returns_to_zero(source in block_template()) {
        let mut lexer = Lexer::new(&source, false);
        let mut opened = 0usize;
        while let Some(token) = lexer.next_token().unwrap() {
            if matches!(token, razor::razor::lexing::Token::MultilineOpen(_)) {
                opened += 1;
            }
            prop_assert!(lexer.scope().current_depth() <= opened);
        }
        prop_assert_eq!(lexer.scope().current_depth(), 0);
    }

    #[test]
    fn test_ignore_whitespace_depth_returns_to_zero(source in block_template()) {
        let mut lexer = Lexer::new(&source, true);
        while lexer.next_token().unwrap().is_some() {}
        prop_assert_eq!(lexer.scope().current_depth(), 0);
    }
}
