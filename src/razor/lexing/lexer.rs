//! The two-mode template lexer
//!
//!     Scanning walks the source with the rule table of the current [Mode]. Handlers may
//!     consume more input than their rule matched (balanced expressions, comment-only lines),
//!     change the mode, and feed indentation into the [ScopeStack]. All of that mutable state
//!     lives in [LexerState], owned by one lexer for one compilation.
//!
//!     The generator consumes tokens one at a time and reads the scope depth right after each
//!     one, so the lexer is an iterator rather than a function returning a vector.

use super::rules::{
    Rule, CODE_RULES, COMMENT_LINE, PRINT_LITERAL, TEXT_CLOSE_TAG, TEXT_OPEN_TAG, TEXT_RULES,
};
use super::token::{ExprSource, LineEnding, Token, TokenKind};
use super::{LexError, Location};
use crate::razor::scope::{CloseAction, ScopeKind, ScopeStack};

/// Sub-grammar in effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Literal markup with `@` constructs
    Text,
    /// Raw statements, one per line
    Code,
}

/// Mutable lexer state for one compilation.
#[derive(Debug)]
pub struct LexerState {
    pub mode: Mode,
    /// Modes saved when inline markup or a code region was entered
    pub mode_stack: Vec<Mode>,
    /// Nothing but a newline (and its indentation) was emitted on the current line
    pub saw_newline: bool,
    /// A `@:` opener was just lexed; the line break ending it writes nothing
    pub opened_region: bool,
    /// An open tag was cut short by an expression; its `/>` closes the saved mode
    pub open_tag: bool,
    pub scope: ScopeStack,
}

impl LexerState {
    pub fn new(ignore_whitespace: bool) -> Self {
        LexerState {
            mode: Mode::Text,
            mode_stack: Vec::new(),
            saw_newline: false,
            opened_region: false,
            open_tag: false,
            scope: ScopeStack::new(ignore_whitespace),
        }
    }

    fn push_mode(&mut self) {
        if !self.mode_stack.is_empty() || self.mode == Mode::Code {
            self.mode_stack.push(self.mode);
        }
    }

    fn pop_mode(&mut self) {
        if let Some(mode) = self.mode_stack.pop() {
            self.mode = mode;
        }
    }

    fn apply(&mut self, actions: Vec<CloseAction>) {
        for action in actions {
            if action == CloseAction::RestoreMode {
                self.pop_mode();
            }
        }
    }
}

/// Streaming lexer over one template source.
pub struct Lexer<'a> {
    source: &'a str,
    pos: usize,
    state: LexerState,
    ignore_whitespace: bool,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, ignore_whitespace: bool) -> Self {
        // Leading whitespace is skipped, not sliced off, so error locations stay true
        let pos = if ignore_whitespace {
            source.len() - source.trim_start().len()
        } else {
            0
        };

        let mut lexer = Lexer {
            source,
            pos,
            state: LexerState::new(ignore_whitespace),
            ignore_whitespace,
            finished: false,
        };
        lexer.skip_leading_comment_lines();
        lexer
    }

    pub fn state(&self) -> &LexerState {
        &self.state
    }

    pub fn scope(&self) -> &ScopeStack {
        &self.state.scope
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    /// Scans the next token. `Ok(None)` once the input is exhausted.
    pub fn next_token(&mut self) -> Result<Option<Token>, LexError> {
        while self.pos < self.source.len() {
            let rules: &[Rule] = match self.state.mode {
                Mode::Text => TEXT_RULES.as_slice(),
                Mode::Code => CODE_RULES.as_slice(),
            };
            let start = self.pos;
            let matched = rules.iter().find_map(|rule| {
                rule.regex
                    .find(&self.source[start..])
                    .map(|m| (rule.kind, m.end()))
            });
            let Some((kind, len)) = matched else {
                return Err(LexError::NoRule(Location::of(self.source, start)));
            };

            self.pos = start + len;
            let lexeme = self.source[start..start + len].to_string();
            if let Some(token) = self.dispatch(kind, start, lexeme)? {
                if !matches!(token, Token::Newline { .. } | Token::EmptyLine) {
                    self.state.saw_newline = false;
                }
                return Ok(Some(token));
            }
        }

        if !self.finished {
            self.finished = true;
            let actions = self.state.scope.close_all()?;
            self.state.apply(actions);
        }
        Ok(None)
    }

    fn dispatch(
        &mut self,
        kind: TokenKind,
        start: usize,
        lexeme: String,
    ) -> Result<Option<Token>, LexError> {
        match kind {
            TokenKind::Newline => {
                let token = self.new_line(&lexeme)?;
                if std::mem::take(&mut self.state.opened_region) {
                    return Ok(None);
                }
                Ok(token)
            }
            TokenKind::EmptyLine => Ok(Some(Token::EmptyLine)),
            TokenKind::Escaped => Ok(Some(Token::Escaped)),
            TokenKind::Comment | TokenKind::LineComment => Ok(None),
            TokenKind::OneLineDirective => Ok(Some(one_line(&lexeme))),
            TokenKind::MultilineOpen => self.multiline(&lexeme),
            TokenKind::ExplicitMultilineClose => self.multiline_end(&lexeme),
            TokenKind::ParenExpression => self.paren_expression(start, &lexeme).map(Some),
            TokenKind::Expression => Ok(Some(self.expression(start, &lexeme))),
            TokenKind::XmlFullTag | TokenKind::XmlOpenTag => {
                self.state.open_tag = kind == TokenKind::XmlOpenTag;
                self.state.push_mode();
                self.state.mode = Mode::Text;
                let text = TEXT_OPEN_TAG.replace_all(&lexeme, "");
                let text = self.with_line_indent(&text);
                Ok(Some(if kind == TokenKind::XmlFullTag {
                    Token::XmlFullTag(text)
                } else {
                    Token::XmlOpenTag(text)
                }))
            }
            TokenKind::XmlCloseTag => {
                self.state.open_tag = false;
                self.state.pop_mode();
                let text = TEXT_CLOSE_TAG.replace_all(&lexeme, "");
                Ok(Some(Token::XmlCloseTag(self.with_line_indent(&text))))
            }
            TokenKind::XmlSelfClose => {
                // A whole self-closing tag leaves the mode alone
                if !lexeme.trim_start().starts_with('<') {
                    if !std::mem::take(&mut self.state.open_tag) {
                        return Ok(Some(Token::Text(lexeme)));
                    }
                    self.state.pop_mode();
                }
                Ok(Some(Token::XmlSelfClose(self.with_line_indent(&lexeme))))
            }
            TokenKind::PrintLine => {
                let literal = PRINT_LITERAL
                    .captures(&lexeme)
                    .and_then(|caps| caps.get(1))
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default();
                Ok(Some(Token::PrintLine(self.with_line_indent(&literal))))
            }
            TokenKind::Code => Ok(Some(Token::Code(lexeme))),
            TokenKind::Text => Ok(Some(Token::Text(lexeme))),
        }
    }

    fn new_line(&mut self, lexeme: &str) -> Result<Option<Token>, LexError> {
        let ending = LineEnding::of(lexeme);
        let mut indent = lexeme.trim_start_matches(['\r', '\n']).to_string();

        // Lines holding only a comment vanish, newline included
        if self.state.mode == Mode::Text {
            while let Some(caps) = COMMENT_LINE.captures(&self.source[self.pos..]) {
                if caps[1].contains("#@") {
                    break;
                }
                indent = caps[2].to_string();
                self.pos += caps[0].len();
            }
        }

        self.state.saw_newline = true;
        let rest = &self.source[self.pos..];
        if rest.is_empty() || rest.starts_with('\n') || rest.starts_with("\r\n") {
            // Blank lines never open or close scopes but keep their whitespace
            let (_, scope_len) = self.state.scope.indent_stack().current_scope_indentation();
            let indent = if self.ignore_whitespace {
                ""
            } else {
                indent.get(scope_len..).unwrap_or("")
            };
            return Ok(Some(Token::Newline {
                ending,
                indent: indent.to_string(),
            }));
        }

        let actions = self.state.scope.handle_indentation(&indent)?;
        self.state.apply(actions);

        if self.ignore_whitespace {
            return Ok(Some(Token::Newline {
                ending,
                indent: String::new(),
            }));
        }
        let relative = self.state.scope.indent_stack().relative_indentation();
        let keep_from = indent.len().saturating_sub(relative);
        Ok(Some(Token::Newline {
            ending,
            indent: indent[keep_from..].to_string(),
        }))
    }

    fn multiline(&mut self, lexeme: &str) -> Result<Option<Token>, LexError> {
        if lexeme == "@:" {
            // Uncounted code region: statements until the body dedents or `:@`
            self.state.mode_stack.push(self.state.mode);
            self.state.mode = Mode::Code;
            let actions = self
                .state
                .scope
                .mark_scope(ScopeKind::ModeToggle, Some(CloseAction::RestoreMode))?;
            self.state.apply(actions);
            self.state.opened_region = true;
            return Ok(None);
        }

        let actions = self.state.scope.enter_scope()?;
        self.state.apply(actions);
        let header = lexeme.strip_prefix('@').unwrap_or(lexeme);
        Ok(Some(Token::MultilineOpen(header.to_string())))
    }

    fn multiline_end(&mut self, lexeme: &str) -> Result<Option<Token>, LexError> {
        let actions = self.state.scope.close_region()?;
        self.state.apply(actions);
        Ok(Some(Token::ExplicitMultilineClose(LineEnding::of(lexeme))))
    }

    fn paren_expression(&mut self, start: usize, head: &str) -> Result<Token, LexError> {
        let escape = !head.contains('!');
        let body_start = self.pos;
        let close = find_closing(self.source, body_start, '(', ')')
            .ok_or_else(|| LexError::UnterminatedExpression(Location::of(self.source, start)))?;
        self.pos = close + 1;
        Ok(Token::ParenExpression(ExprSource::new(
            &self.source[body_start..close],
            escape,
        )))
    }

    fn expression(&mut self, start: usize, head: &str) -> Token {
        let escape = !head.contains('!');
        let body_start = start + if escape { 1 } else { 2 };
        let end = expression_end(self.source, body_start);
        self.pos = end;
        Token::Expression(ExprSource::new(&self.source[body_start..end], escape))
    }

    /// Prefixes the scope's indentation when a tag starts its line.
    fn with_line_indent(&self, text: &str) -> String {
        if self.state.saw_newline && !self.ignore_whitespace {
            let (indent, _) = self.state.scope.indent_stack().current_scope_indentation();
            format!("{}{}", indent, text)
        } else {
            text.to_string()
        }
    }

    fn skip_leading_comment_lines(&mut self) {
        while let Some(caps) = COMMENT_LINE.captures(&self.source[self.pos..]) {
            if caps[1].contains("#@") {
                break;
            }
            // Keep the next line's indentation as text
            self.pos += caps[0].len() - caps[2].len();
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.next_token() {
            Ok(Some(token)) => Some(Ok(token)),
            Ok(None) => None,
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}

/// `@model T` becomes an assertion on the bound model; imports drop the `@`.
fn one_line(lexeme: &str) -> Token {
    match lexeme.strip_prefix("@model") {
        Some(type_name) => Token::OneLineDirective(format!(
            "assert isinstance(model, {:?})",
            type_name.trim()
        )),
        None => Token::OneLineDirective(lexeme[1..].to_string()),
    }
}

/// Finds the closer matching an already-consumed opener, scanning from `from`.
///
/// Gives up at the end of the line.
fn find_closing(text: &str, from: usize, open: char, close: char) -> Option<usize> {
    let mut level = 1usize;
    for (offset, c) in text[from..].char_indices() {
        if c == '\n' {
            return None;
        } else if c == open {
            level += 1;
        } else if c == close {
            level -= 1;
            if level == 0 {
                return Some(from + offset);
            }
        }
    }
    None
}

fn identifier_len(text: &str) -> usize {
    text.char_indices()
        .find(|(_, c)| !(c.is_alphanumeric() || *c == '_'))
        .map(|(idx, _)| idx)
        .unwrap_or(text.len())
}

/// End of a bare expression chain: `name`, `.attr`, `[index]` and `(args)` segments.
///
/// Bracket groups only count when they close on the same line.
fn expression_end(text: &str, start: usize) -> usize {
    let mut end = start + identifier_len(&text[start..]);
    loop {
        let rest = &text[end..];
        if rest.starts_with('[') || rest.starts_with('(') {
            let (open, close) = if rest.starts_with('[') {
                ('[', ']')
            } else {
                ('(', ')')
            };
            match find_closing(text, end + 1, open, close) {
                Some(closing) => end = closing + 1,
                None => break,
            }
        } else if let Some(attr) = rest.strip_prefix('.') {
            let starts_ident = attr
                .chars()
                .next()
                .is_some_and(|c| c.is_alphabetic() || c == '_');
            if !starts_ident {
                break;
            }
            end += 1 + identifier_len(attr);
        } else {
            break;
        }
    }
    end
}
