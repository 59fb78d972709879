//! Brack parsing.
//!
//! This module provides the recursive-descent [`Parser`] that turns Brack
//! text into a [`Value`] tree.
//!
//! ## Overview
//!
//! - **Single-pass parsing**: one forward scan, no backtracking
//! - **Error reporting**: format errors carry line/column and a bounded
//!   snippet of the unconsumed input
//! - **Depth limiting**: nesting depth is bounded to guard against stack
//!   exhaustion on adversarial input
//! - **Macro spans**: `( ... )` spans are handed to a pluggable processor
//!
//! ## Usage
//!
//! Most users should use the high-level functions in the crate root:
//!
//! ```rust
//! use brack::parse;
//!
//! let value = parse("{name Dennis age 37 old #false}").unwrap();
//! let map = value.as_map().unwrap();
//! assert_eq!(map.get_str("name").and_then(|v| v.as_str()), Some("Dennis"));
//! assert_eq!(map.get_str("age").and_then(|v| v.as_i64()), Some(37));
//! assert_eq!(map.get_str("old").and_then(|v| v.as_bool()), Some(false));
//! ```

use crate::options::ParseOptions;
use crate::{Error, Key, Number, Result, Value, ValueMap};

/// Number of unconsumed characters attached to a format error.
const SNIPPET_LEN: usize = 128;

/// Returns `true` for characters that may start a simple string.
#[must_use]
pub fn is_simple_string_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

/// Returns `true` for characters that may continue a simple string.
#[must_use]
pub fn is_simple_string_part(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '_' | '-' | '.')
}

/// Returns `true` if the string matches the simple-string grammar and can be
/// printed without quotes.
#[must_use]
pub fn is_simple_string(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if is_simple_string_start(first) => chars.all(is_simple_string_part),
        _ => false,
    }
}

/// The Brack parser.
///
/// Parses a string slice into a [`Value`] tree. Created via
/// [`Parser::from_str`]; most users should use [`crate::parse`] or
/// [`crate::parse_with_options`] instead.
pub struct Parser<'de, 'opt> {
    input: &'de str,
    position: usize,
    line: usize,
    column: usize,
    depth: usize,
    options: &'opt ParseOptions,
}

impl<'de, 'opt> Parser<'de, 'opt> {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(input: &'de str, options: &'opt ParseOptions) -> Self {
        Parser {
            input,
            position: 0,
            line: 1,
            column: 1,
            depth: 0,
            options,
        }
    }

    /// Parses exactly one value and requires the remainder of the input to
    /// be ignorable (whitespace and comments).
    pub fn parse_document(&mut self) -> Result<Value> {
        self.skip_ignored();
        let value = self.parse_value()?;
        self.skip_ignored();
        if !self.at_end() {
            return Err(self.error("unexpected characters after value"));
        }
        Ok(value)
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.position..].chars().next()
    }

    fn next_char(&mut self) -> Option<char> {
        let ch = self.input[self.position..].chars().next()?;
        self.position += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    /// Skips whitespace (space and any control character below 0x20) and
    /// `;` line comments.
    fn skip_ignored(&mut self) {
        while let Some(ch) = self.peek_char() {
            if ch == ' ' || (ch as u32) < 0x20 {
                self.next_char();
            } else if ch == ';' {
                while let Some(ch) = self.peek_char() {
                    if ch == '\n' {
                        break;
                    }
                    self.next_char();
                }
            } else {
                break;
            }
        }
    }

    /// Builds a format error at the current position without consuming input.
    fn error(&self, msg: impl Into<String>) -> Error {
        Error::format(self.line, self.column, msg, self.snippet())
    }

    /// A bounded read-ahead of the unconsumed input, for diagnostics.
    fn snippet(&self) -> String {
        self.input[self.position..]
            .chars()
            .take(SNIPPET_LEN)
            .collect()
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        if self.depth > self.options.max_depth {
            return Err(self.error("maximum nesting depth exceeded"));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    /// Parses one value, dispatching on the first character.
    pub fn parse_value(&mut self) -> Result<Value> {
        match self.peek_char() {
            Some('#') => self.parse_marker(),
            Some('[') => self.parse_list(),
            Some('{') => self.parse_map(),
            Some('(') => self.parse_macro(),
            Some('"') => self.parse_quoted(),
            Some('\'') => self.parse_verbatim(),
            Some(ch) if ch.is_ascii_digit() || ch == '+' || ch == '-' => self.parse_number(),
            Some(ch) if is_simple_string_start(ch) => Ok(Value::String(self.read_simple_string())),
            Some(ch) => Err(self.error(format!("unexpected character '{}'", ch))),
            None => Err(self.error("unexpected end of input, expected a value")),
        }
    }

    fn read_simple_string(&mut self) -> String {
        let start = self.position;
        while let Some(ch) = self.peek_char() {
            if is_simple_string_part(ch) {
                self.next_char();
            } else {
                break;
            }
        }
        self.input[start..self.position].to_string()
    }

    /// `#true`, `#false`, `#null`; any other `#`-token is kept verbatim as a
    /// string rather than rejected.
    fn parse_marker(&mut self) -> Result<Value> {
        self.next_char(); // '#'
        let token = self.read_simple_string();
        match token.to_lowercase().as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            "null" => Ok(Value::Null),
            _ => Ok(Value::String(format!("#{}", token))),
        }
    }

    fn parse_number(&mut self) -> Result<Value> {
        let start = self.position;
        let (line, column) = (self.line, self.column);
        if matches!(self.peek_char(), Some('+') | Some('-')) {
            self.next_char();
        }
        while let Some(ch) = self.peek_char() {
            if ch.is_ascii_digit() || ch == '.' {
                self.next_char();
            } else {
                break;
            }
        }
        let token = &self.input[start..self.position];
        let number = if token.contains('.') {
            token.parse::<f64>().ok().map(Number::Float)
        } else {
            token
                .parse::<i64>()
                .ok()
                .map(Number::Int)
                .or_else(|| token.parse::<u64>().ok().map(Number::UInt))
                .or_else(|| token.parse::<f64>().ok().map(Number::Float))
        };
        match number {
            Some(n) => Ok(Value::Number(n)),
            None => Err(Error::format(
                line,
                column,
                format!("malformed number '{}'", token),
                self.snippet(),
            )),
        }
    }

    /// A `"`-delimited string with `\"`, `\\`, `\n` and `\r` escapes.
    fn parse_quoted(&mut self) -> Result<Value> {
        self.next_char(); // '"'
        let mut out = String::new();
        loop {
            match self.next_char() {
                Some('"') => return Ok(Value::String(out)),
                Some('\\') => match self.next_char() {
                    Some('n') => out.push('\n'),
                    Some('r') => out.push('\r'),
                    Some(ch @ ('"' | '\\')) => out.push(ch),
                    Some(ch) => out.push(ch),
                    None => return Err(self.error("unterminated string")),
                },
                Some(ch) => out.push(ch),
                None => return Err(self.error("unterminated string")),
            }
        }
    }

    /// A `'`-delimited string; backslashes are literal.
    fn parse_verbatim(&mut self) -> Result<Value> {
        self.next_char(); // '\''
        let mut out = String::new();
        loop {
            match self.next_char() {
                Some('\'') => return Ok(Value::String(out)),
                Some(ch) => out.push(ch),
                None => return Err(self.error("unterminated verbatim string")),
            }
        }
    }

    /// A depth-balanced `( ... )` span, handed to the macro processor with
    /// its delimiters included.
    fn parse_macro(&mut self) -> Result<Value> {
        let start = self.position;
        self.next_char(); // '('
        let mut depth = 1usize;
        loop {
            match self.next_char() {
                Some('(') => depth += 1,
                Some(')') => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                Some(_) => {}
                None => return Err(self.error("unterminated macro span")),
            }
        }
        let span = &self.input[start..self.position];
        match &self.options.macro_processor {
            Some(processor) => processor(span),
            None => Ok(Value::String(span.to_string())),
        }
    }

    fn parse_list(&mut self) -> Result<Value> {
        self.enter()?;
        self.next_char(); // '['
        let mut list = Vec::new();
        loop {
            self.skip_ignored();
            match self.peek_char() {
                Some(']') => {
                    self.next_char();
                    break;
                }
                Some(_) => list.push(self.parse_value()?),
                None => return Err(self.error("unterminated list, expected ']'")),
            }
        }
        self.leave();
        Ok(Value::List(list))
    }

    /// A map is a flat alternating sequence of values. An odd count is an
    /// error; duplicate keys resolve last-write-wins.
    fn parse_map(&mut self) -> Result<Value> {
        self.enter()?;
        let (line, column) = (self.line, self.column);
        self.next_char(); // '{'
        let mut items = Vec::new();
        loop {
            self.skip_ignored();
            match self.peek_char() {
                Some('}') => {
                    self.next_char();
                    break;
                }
                Some(_) => items.push(self.parse_value()?),
                None => return Err(self.error("unterminated map, expected '}'")),
            }
        }
        self.leave();
        if items.len() % 2 != 0 {
            let hint = items
                .first()
                .map(|v| format!("{:?}", v))
                .unwrap_or_default();
            return Err(Error::format(
                line,
                column,
                format!(
                    "map requires an even number of items, found {} (first item: {})",
                    items.len(),
                    hint
                ),
                self.snippet(),
            ));
        }
        let mut map = ValueMap::with_capacity(items.len() / 2);
        let mut items = items.into_iter();
        while let (Some(key), Some(value)) = (items.next(), items.next()) {
            let key = Key::try_from(key).map_err(|err| {
                Error::format(line, column, err.to_string(), self.snippet())
            })?;
            map.insert(key, value);
        }
        Ok(Value::Map(map))
    }
}
