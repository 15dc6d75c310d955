//! Token types produced by the template lexer
//!
//!     Tokens carry their transformed lexeme: `@` prefixes are gone, `@model` is already an
//!     assertion, `<text>` pseudo-tags are stripped and tag tokens may carry the indentation of
//!     the line they start. [TokenKind] is the payload-free classification used by the rule
//!     tables and by the generator's "previous token" decisions.

use std::fmt;

use serde::Serialize;

/// Classification of tokens and lexer rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenKind {
    Text,
    Escaped,
    /// Block comment `@# ... #@`, never emitted
    Comment,
    /// Line comment `@# ...`, never emitted
    LineComment,
    OneLineDirective,
    MultilineOpen,
    ExplicitMultilineClose,
    ParenExpression,
    Expression,
    Code,
    Newline,
    EmptyLine,
    XmlFullTag,
    XmlOpenTag,
    XmlCloseTag,
    XmlSelfClose,
    PrintLine,
}

impl TokenKind {
    /// Kinds whose lines are pure control flow: no visible line break follows them.
    pub fn is_statement(&self) -> bool {
        matches!(
            self,
            TokenKind::Code
                | TokenKind::MultilineOpen
                | TokenKind::OneLineDirective
                | TokenKind::ExplicitMultilineClose
        )
    }

    /// Kinds that evaluate an embedded expression.
    pub fn is_expression(&self) -> bool {
        matches!(self, TokenKind::Expression | TokenKind::ParenExpression)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Text => "TEXT",
            TokenKind::Escaped => "ESCAPED",
            TokenKind::Comment => "COMMENT",
            TokenKind::LineComment => "LINECOMMENT",
            TokenKind::OneLineDirective => "ONELINE",
            TokenKind::MultilineOpen => "MULTILINE",
            TokenKind::ExplicitMultilineClose => "EXPLICITMULTILINEEND",
            TokenKind::ParenExpression => "PARENEXPRESSION",
            TokenKind::Expression => "EXPRESSION",
            TokenKind::Code => "CODE",
            TokenKind::Newline => "NEWLINE",
            TokenKind::EmptyLine => "EMPTYLINE",
            TokenKind::XmlFullTag => "XMLFULLSTART",
            TokenKind::XmlOpenTag => "XMLSTART",
            TokenKind::XmlCloseTag => "XMLEND",
            TokenKind::XmlSelfClose => "XMLSELFCLOSE",
            TokenKind::PrintLine => "PRINTLINE",
        };
        write!(f, "{}", name)
    }
}

/// Line terminator as written in the source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    /// The ending a newline lexeme starts with.
    pub fn of(lexeme: &str) -> Self {
        if lexeme.starts_with("\r\n") {
            LineEnding::CrLf
        } else {
            LineEnding::Lf
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

/// An embedded expression and whether its result gets markup-escaped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExprSource {
    pub source: String,
    pub escape: bool,
}

impl ExprSource {
    pub fn new(source: impl Into<String>, escape: bool) -> Self {
        ExprSource {
            source: source.into(),
            escape,
        }
    }
}

/// A lexed template token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value")]
pub enum Token {
    Text(String),
    /// `@@`, renders a single `@`
    Escaped,
    OneLineDirective(String),
    MultilineOpen(String),
    /// `:@`, carrying the ending of the line it terminates
    ExplicitMultilineClose(LineEnding),
    ParenExpression(ExprSource),
    Expression(ExprSource),
    Code(String),
    /// A line break and the next line's leading whitespace, relative to its scope
    Newline { ending: LineEnding, indent: String },
    EmptyLine,
    XmlFullTag(String),
    XmlOpenTag(String),
    XmlCloseTag(String),
    XmlSelfClose(String),
    PrintLine(String),
}

impl Token {
    pub fn kind(&self) -> TokenKind {
        match self {
            Token::Text(_) => TokenKind::Text,
            Token::Escaped => TokenKind::Escaped,
            Token::OneLineDirective(_) => TokenKind::OneLineDirective,
            Token::MultilineOpen(_) => TokenKind::MultilineOpen,
            Token::ExplicitMultilineClose(_) => TokenKind::ExplicitMultilineClose,
            Token::ParenExpression(_) => TokenKind::ParenExpression,
            Token::Expression(_) => TokenKind::Expression,
            Token::Code(_) => TokenKind::Code,
            Token::Newline { .. } => TokenKind::Newline,
            Token::EmptyLine => TokenKind::EmptyLine,
            Token::XmlFullTag(_) => TokenKind::XmlFullTag,
            Token::XmlOpenTag(_) => TokenKind::XmlOpenTag,
            Token::XmlCloseTag(_) => TokenKind::XmlCloseTag,
            Token::XmlSelfClose(_) => TokenKind::XmlSelfClose,
            Token::PrintLine(_) => TokenKind::PrintLine,
        }
    }

    /// Literal text this token writes to the output, if it writes any.
    pub fn literal(&self) -> Option<&str> {
        match self {
            Token::Text(text)
            | Token::XmlFullTag(text)
            | Token::XmlOpenTag(text)
            | Token::XmlCloseTag(text)
            | Token::XmlSelfClose(text)
            | Token::PrintLine(text) => Some(text),
            Token::Escaped => Some("@"),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::ParenExpression(expr) | Token::Expression(expr) => {
                let bang = if expr.escape { "" } else { "!" };
                write!(f, "({}, {}{:?})", self.kind(), bang, expr.source)
            }
            Token::Newline {
                ending: LineEnding::CrLf,
                indent,
            } => write!(f, "({}, {:?}, CRLF)", self.kind(), indent),
            Token::Newline { indent: text, .. }
            | Token::OneLineDirective(text)
            | Token::MultilineOpen(text)
            | Token::Code(text) => write!(f, "({}, {:?})", self.kind(), text),
            other => match other.literal() {
                Some(text) => write!(f, "({}, {:?})", other.kind(), text),
                None => write!(f, "({})", other.kind()),
            },
        }
    }
}
