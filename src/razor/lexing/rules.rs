//! Declarative lexer rules for both lexer modes
//!
//!     Each mode has an ordered table of `(kind, pattern)` pairs. Patterns are tried in
//!     declaration order at the scan position and the first match wins, so order is what
//!     disambiguates (a line ending in `:` is a block opener before it is an expression, a
//!     full tag before an open tag, and so on). Every pattern is anchored with `\A` and matched
//!     against the remaining input.

use once_cell::sync::Lazy;
use regex::Regex;

use super::token::TokenKind;

/// Rules for literal markup, the default mode.
const TEXT_PATTERNS: &[(TokenKind, &str)] = &[
    (TokenKind::Newline, r"\A\r?\n[ \t]*"),
    (TokenKind::Escaped, r"\A@@"),
    (TokenKind::Comment, r"(?s)\A@#.*?#@"),
    (TokenKind::LineComment, r"\A@#[^\r\n]*"),
    (TokenKind::OneLineDirective, r"\A@(?:import|from|model) [^\r\n]+"),
    (TokenKind::MultilineOpen, r"(?mR)\A@\w*.*:$"),
    (TokenKind::ParenExpression, r"\A@!?\("),
    // Only the head: the chain after it is scanned by hand
    (TokenKind::Expression, r"\A@!?\w"),
    // A whole `<br/>`, or the `/>` ending a tag opened earlier on the line
    (
        TokenKind::XmlSelfClose,
        r"\A(?:[ \t]*<\w[^@\r\n>]*|[^@\r\n<>]*)/>[ \t]*",
    ),
    (TokenKind::XmlFullTag, r"\A[ \t]*<\w(?:[^@\r\n>]*[^/@\r\n>])?>"),
    (TokenKind::XmlOpenTag, r"\A[ \t]*<\w[^@\r\n>]*"),
    (TokenKind::XmlCloseTag, r"\A[ \t]*</[^@\r\n>]+>"),
    (TokenKind::Text, r"\A(?:[^@\r\n<]+|<|\r)"),
];

/// Rules inside a code region (`@:`).
const CODE_PATTERNS: &[(TokenKind, &str)] = &[
    (TokenKind::EmptyLine, r"(?mR)\A\r?\n[ \t]*$"),
    (TokenKind::ExplicitMultilineClose, r"\A\r?\n[ \t]*:@"),
    (TokenKind::Newline, r"\A\r?\n[ \t]*"),
    // Tag tails are always lexed in Text mode, so only whole self-closing tags here
    (TokenKind::XmlSelfClose, r"\A[ \t]*<\w[^@\r\n>]*/>[ \t]*"),
    (TokenKind::XmlFullTag, r"\A[ \t]*<\w(?:[^@\r\n>]*[^/@\r\n>])?>"),
    (TokenKind::XmlOpenTag, r"\A[ \t]*<\w[^@\r\n>]*"),
    (TokenKind::XmlCloseTag, r"\A[ \t]*</[^@\r\n>]+>"),
    (TokenKind::MultilineOpen, r"(?mR)\A[^\r\n]*:$"),
    (
        TokenKind::PrintLine,
        r#"\A[ \t]*print[ \t]*\([ \t]*['"](.*)['"][ \t]*\)"#,
    ),
    (TokenKind::Code, r"\A[^\r\n]+"),
];

/// A compiled lexer rule.
#[derive(Debug)]
pub struct Rule {
    pub kind: TokenKind,
    pub regex: Regex,
}

fn compile(patterns: &[(TokenKind, &str)]) -> Vec<Rule> {
    patterns
        .iter()
        .map(|(kind, pattern)| Rule {
            kind: *kind,
            regex: Regex::new(pattern).unwrap(),
        })
        .collect()
}

pub static TEXT_RULES: Lazy<Vec<Rule>> = Lazy::new(|| compile(TEXT_PATTERNS));

pub static CODE_RULES: Lazy<Vec<Rule>> = Lazy::new(|| compile(CODE_PATTERNS));

/// A line holding nothing but a line comment, plus the next line's indentation.
pub static COMMENT_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\A[ \t]*@#([^\r\n]*)\r?\n([ \t]*)").unwrap());

/// The quoted literal of a `print("...")` line.
pub static PRINT_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[ \t]*print[ \t]*\([ \t]*['"](.*)['"][ \t]*\)"#).unwrap());

/// `<text>` / `</text>` pseudo-tags that only switch modes and never render.
pub static TEXT_OPEN_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]*<text>").unwrap());

pub static TEXT_CLOSE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]*</text>").unwrap());
