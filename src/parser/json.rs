//! Recursive-descent parser for JSON-family documents
//!
//! Builds a [`RawNode`] tree from the lexer's token stream. The parser never
//! aborts: on a syntax error it records an issue, skips to the next
//! synchronization point (`,` or the closing delimiter) and keeps going, so
//! one document can report several errors and still yield a partial tree.

use std::sync::Arc;

use text_size::TextSize;

use super::lexer::{Token, TokenKind, tokenize};
use super::raw::{RawMap, RawNode};
use crate::base::constants::MAX_NESTING_DEPTH;
use crate::base::{LineIndex, Position, SourceLocation};
use crate::diagnostics::{ValidationIssue, codes};

/// Parse JSON text into a raw tree plus syntax issues.
pub fn parse_json(file: &Arc<str>, text: &str) -> (Option<RawNode>, Vec<ValidationIssue>) {
    let tokens: Vec<_> = tokenize(text)
        .into_iter()
        .filter(|t| !t.kind.is_trivia())
        .collect();

    let mut parser = JsonParser {
        tokens,
        pos: 0,
        depth: 0,
        file: file.clone(),
        line_index: LineIndex::new(text),
        end: TextSize::of(text),
        issues: Vec::new(),
    };

    let root = parser.parse_document();
    (root, parser.issues)
}

struct JsonParser<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
    /// Open maps and sequences around the cursor.
    depth: usize,
    file: Arc<str>,
    line_index: LineIndex,
    end: TextSize,
    issues: Vec<ValidationIssue>,
}

impl<'a> JsonParser<'a> {
    fn parse_document(&mut self) -> Option<RawNode> {
        if self.tokens.is_empty() {
            self.error_at_end("document is empty");
            return None;
        }

        let root = self.parse_value();

        if let Some(extra) = self.peek() {
            let location = self.location_of(extra);
            self.error(
                location,
                format!(
                    "unexpected {} after the document root",
                    extra.kind.describe()
                ),
            );
        }

        root
    }

    // =========================================================================
    // VALUES
    // =========================================================================

    fn parse_value(&mut self) -> Option<RawNode> {
        let token = match self.peek() {
            Some(t) => t.clone(),
            None => {
                self.error_at_end("expected a value, found end of document");
                return None;
            }
        };
        let location = self.location_of(&token);

        if matches!(token.kind, TokenKind::LBrace | TokenKind::LBracket)
            && self.depth >= MAX_NESTING_DEPTH
        {
            self.error_with_hint(
                location,
                format!("nesting deeper than {MAX_NESTING_DEPTH} levels"),
                "flatten the document structure",
            );
            self.skip_nested();
            return None;
        }

        match token.kind {
            TokenKind::LBrace => Some(self.parse_object()),
            TokenKind::LBracket => Some(self.parse_array()),
            TokenKind::String => {
                self.bump();
                let value = self.decode_string(&token, &location);
                Some(RawNode::string(value, location))
            }
            TokenKind::Number => {
                self.bump();
                match token.text.parse::<f64>() {
                    Ok(n) => Some(RawNode::number(n, location)),
                    Err(_) => {
                        self.error(location, format!("invalid number '{}'", token.text));
                        None
                    }
                }
            }
            TokenKind::True => {
                self.bump();
                Some(RawNode::bool(true, location))
            }
            TokenKind::False => {
                self.bump();
                Some(RawNode::bool(false, location))
            }
            TokenKind::Null => {
                self.bump();
                Some(RawNode::null(location))
            }
            TokenKind::UnterminatedString => {
                self.bump();
                self.error_with_hint(
                    location,
                    "unterminated string",
                    "close the string with '\"' on the same line",
                );
                None
            }
            TokenKind::Ident => {
                self.bump();
                self.error_with_hint(
                    location,
                    format!("unexpected unquoted word '{}'", token.text),
                    format!("wrap it in quotes: \"{}\"", token.text),
                );
                None
            }
            kind => {
                self.bump();
                self.error(
                    location,
                    format!("expected a value, found {}", describe_token(kind, token.text)),
                );
                None
            }
        }
    }

    fn parse_object(&mut self) -> RawNode {
        let open = self.bump_token();
        let start = self.position_of_start(&open);
        let mut map = RawMap::new();
        self.depth += 1;

        loop {
            let Some(token) = self.peek().cloned() else {
                self.error_with_hint(
                    self.location_of(&open),
                    "unclosed '{'",
                    "add '}' to close the map",
                );
                break;
            };

            match token.kind {
                TokenKind::RBrace => {
                    self.bump();
                    break;
                }
                TokenKind::Comma => {
                    self.bump();
                    self.error(self.location_of(&token), "unexpected ','");
                }
                TokenKind::String => {
                    self.bump();
                    let key_location = self.location_of(&token);
                    let key = self.decode_string(&token, &key_location);

                    if !self.eat(TokenKind::Colon) {
                        let location = self.current_location();
                        self.error(location, format!("expected ':' after key \"{key}\""));
                        self.recover(&[TokenKind::Comma, TokenKind::RBrace]);
                        self.eat(TokenKind::Comma);
                        continue;
                    }

                    if let Some(value) = self.parse_value() {
                        if map.contains_key(&key) {
                            self.issues.push(
                                ValidationIssue::warning(
                                    codes::DUPLICATE_KEY,
                                    format!("duplicate key \"{key}\"; the last value wins"),
                                )
                                .with_location(key_location.clone()),
                            );
                        }
                        map.insert(key, key_location, value);
                    }

                    self.expect_separator(TokenKind::RBrace);
                }
                _ => {
                    let location = self.location_of(&token);
                    self.error(
                        location,
                        format!(
                            "expected a string key, found {}",
                            describe_token(token.kind, token.text)
                        ),
                    );
                    self.recover(&[TokenKind::Comma, TokenKind::RBrace]);
                    self.eat(TokenKind::Comma);
                }
            }
        }

        self.depth -= 1;
        let end = self.previous_end();
        RawNode::map(map, SourceLocation::span(self.file.clone(), start, end))
    }

    fn parse_array(&mut self) -> RawNode {
        let open = self.bump_token();
        let start = self.position_of_start(&open);
        let mut items = Vec::new();
        self.depth += 1;

        loop {
            let Some(token) = self.peek().cloned() else {
                self.error_with_hint(
                    self.location_of(&open),
                    "unclosed '['",
                    "add ']' to close the sequence",
                );
                break;
            };

            match token.kind {
                TokenKind::RBracket => {
                    self.bump();
                    break;
                }
                TokenKind::Comma => {
                    self.bump();
                    self.error(self.location_of(&token), "unexpected ','");
                }
                _ => {
                    if let Some(item) = self.parse_value() {
                        items.push(item);
                    }
                    self.expect_separator(TokenKind::RBracket);
                }
            }
        }

        self.depth -= 1;
        let end = self.previous_end();
        RawNode::sequence(items, SourceLocation::span(self.file.clone(), start, end))
    }

    /// After a member: accept `,`, or leave the closer for the caller.
    fn expect_separator(&mut self, closer: TokenKind) {
        match self.peek().map(|t| t.kind) {
            Some(TokenKind::Comma) => self.bump(),
            Some(kind) if kind == closer => {}
            None => {}
            Some(_) => {
                let location = self.current_location();
                self.error(
                    location,
                    format!("expected ',' or {}", closer.describe()),
                );
                self.recover(&[TokenKind::Comma, closer]);
                self.eat(TokenKind::Comma);
            }
        }
    }

    /// Skip tokens until one of `stop` appears at nesting depth zero.
    ///
    /// Stray closers at depth zero that are not in `stop` are consumed.
    fn recover(&mut self, stop: &[TokenKind]) {
        let mut depth = 0usize;
        while let Some(token) = self.peek() {
            match token.kind {
                TokenKind::LBrace | TokenKind::LBracket => depth += 1,
                TokenKind::RBrace | TokenKind::RBracket if depth > 0 => depth -= 1,
                kind if depth == 0 && stop.contains(&kind) => return,
                _ => {}
            }
            self.bump();
        }
    }

    /// Consume a whole map or sequence, starting at its opener, without
    /// building it.
    fn skip_nested(&mut self) {
        let mut depth = 0usize;
        while let Some(token) = self.peek() {
            match token.kind {
                TokenKind::LBrace | TokenKind::LBracket => depth += 1,
                TokenKind::RBrace | TokenKind::RBracket => depth = depth.saturating_sub(1),
                _ => {}
            }
            self.bump();
            if depth == 0 {
                return;
            }
        }
    }

    // =========================================================================
    // STRINGS
    // =========================================================================

    /// Strip quotes and decode escapes, reporting malformed escapes.
    fn decode_string(&mut self, token: &Token<'a>, location: &SourceLocation) -> String {
        let body = &token.text[1..token.text.len() - 1];
        let mut out = String::with_capacity(body.len());
        let mut chars = body.chars();

        while let Some(c) = chars.next() {
            if c != '\\' {
                out.push(c);
                continue;
            }
            match chars.next() {
                Some('"') => out.push('"'),
                Some('\\') => out.push('\\'),
                Some('/') => out.push('/'),
                Some('b') => out.push('\u{0008}'),
                Some('f') => out.push('\u{000C}'),
                Some('n') => out.push('\n'),
                Some('r') => out.push('\r'),
                Some('t') => out.push('\t'),
                Some('u') => match read_unicode_escape(&mut chars) {
                    Some(ch) => out.push(ch),
                    None => {
                        self.error(location.clone(), "invalid unicode escape in string");
                        out.push(char::REPLACEMENT_CHARACTER);
                    }
                },
                Some(other) => {
                    self.error(location.clone(), format!("invalid escape '\\{other}' in string"));
                    out.push(other);
                }
                None => {
                    self.error(location.clone(), "dangling '\\' in string");
                }
            }
        }

        out
    }

    // =========================================================================
    // TOKEN CURSOR
    // =========================================================================

    fn peek(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn bump_token(&mut self) -> Token<'a> {
        let token = self.tokens[self.pos].clone();
        self.pos += 1;
        token
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.peek().is_some_and(|t| t.kind == kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    // =========================================================================
    // LOCATIONS & ERRORS
    // =========================================================================

    fn position_of_start(&self, token: &Token<'_>) -> Position {
        self.line_index.position(token.range.start())
    }

    fn location_of(&self, token: &Token<'_>) -> SourceLocation {
        SourceLocation::span(
            self.file.clone(),
            self.line_index.position(token.range.start()),
            self.line_index.position(token.range.end()),
        )
    }

    fn current_location(&self) -> SourceLocation {
        match self.peek() {
            Some(token) => self.location_of(token),
            None => self.end_location(),
        }
    }

    fn previous_end(&self) -> Position {
        match self.pos.checked_sub(1).and_then(|i| self.tokens.get(i)) {
            Some(token) => self.line_index.position(token.range.end()),
            None => self.line_index.position(self.end),
        }
    }

    fn end_location(&self) -> SourceLocation {
        let pos = self.line_index.position(self.end);
        SourceLocation::new(self.file.clone(), pos.line, pos.column)
    }

    fn error(&mut self, location: SourceLocation, message: impl Into<String>) {
        self.issues.push(
            ValidationIssue::error(codes::SYNTAX_ERROR, message).with_location(location),
        );
    }

    fn error_with_hint(
        &mut self,
        location: SourceLocation,
        message: impl Into<String>,
        hint: impl Into<String>,
    ) {
        self.issues.push(
            ValidationIssue::error(codes::SYNTAX_ERROR, message)
                .with_location(location)
                .with_suggestion(hint),
        );
    }

    fn error_at_end(&mut self, message: &str) {
        let location = self.end_location();
        self.error(location, message);
    }
}

fn describe_token(kind: TokenKind, text: &str) -> String {
    match kind {
        TokenKind::Error => format!("invalid character '{text}'"),
        other => other.describe().to_string(),
    }
}

/// Read the 4 hex digits after `\u`, combining surrogate pairs.
fn read_unicode_escape(chars: &mut std::str::Chars<'_>) -> Option<char> {
    let first = read_hex4(chars)?;
    if (0xD800..0xDC00).contains(&first) {
        if chars.next()? != '\\' || chars.next()? != 'u' {
            return None;
        }
        let second = read_hex4(chars)?;
        if !(0xDC00..0xE000).contains(&second) {
            return None;
        }
        let combined = 0x10000 + ((first - 0xD800) << 10) + (second - 0xDC00);
        return char::from_u32(combined);
    }
    char::from_u32(first)
}

fn read_hex4(chars: &mut std::str::Chars<'_>) -> Option<u32> {
    let mut value = 0u32;
    for _ in 0..4 {
        value = value * 16 + chars.next()?.to_digit(16)?;
    }
    Some(value)
}
