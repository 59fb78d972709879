//! Brack printing.
//!
//! This module provides the canonical [`Printer`] that renders a [`Value`]
//! tree as Brack text.
//!
//! ## Overview
//!
//! - **Canonical tokens**: simple strings print unquoted, everything else is
//!   escaped and quoted; numbers never use exponential notation
//! - **Complexity heuristic**: in multiline mode, collections judged
//!   "complex" are broken one element (or entry) per line; simple ones stay
//!   inline
//! - **Order preserving**: map entries print in insertion order, so
//!   parse → print is stable
//!
//! ## Usage
//!
//! Most users should use the high-level functions in the crate root:
//!
//! ```rust
//! use brack::{brack, to_text};
//!
//! let value = brack!({ "name": "Dennis", "age": 37 });
//! assert_eq!(to_text(&value).unwrap(), "{name Dennis age 37}");
//! ```

use crate::options::PrintOptions;
use crate::parse::is_simple_string;
use crate::{Error, Key, Number, Result, Value};
use std::fmt::Write;

/// The Brack printer.
///
/// Renders a [`Value`] tree to text according to a [`PrintOptions`]. Most
/// users should use [`crate::to_text`], [`crate::to_text_pretty`] or
/// [`crate::to_text_with_options`] instead.
pub struct Printer<'opt> {
    options: &'opt PrintOptions,
    out: String,
}

impl<'opt> Printer<'opt> {
    #[must_use]
    pub fn new(options: &'opt PrintOptions) -> Self {
        Printer {
            options,
            out: String::new(),
        }
    }

    /// Renders the value and returns the accumulated text.
    pub fn print(mut self, value: &Value) -> Result<String> {
        self.write_value(value, 0)?;
        Ok(self.out)
    }

    fn write_value(&mut self, value: &Value, depth: usize) -> Result<()> {
        match value {
            Value::Null => self.out.push_str("#null"),
            Value::Bool(true) => self.out.push_str("#true"),
            Value::Bool(false) => self.out.push_str("#false"),
            Value::Number(n) => {
                let token = self.format_number(*n)?;
                self.out.push_str(&token);
            }
            Value::String(s) => self.write_string(s),
            Value::List(list) => self.write_list(list, depth)?,
            Value::Map(map) => self.write_map(map, depth)?,
        }
        Ok(())
    }

    fn write_key(&mut self, key: &Key) -> Result<()> {
        match key {
            Key::Null => self.out.push_str("#null"),
            Key::Bool(true) => self.out.push_str("#true"),
            Key::Bool(false) => self.out.push_str("#false"),
            Key::Number(n) => {
                let token = self.format_number(*n)?;
                self.out.push_str(&token);
            }
            Key::String(s) => self.write_string(s),
        }
        Ok(())
    }

    fn write_string(&mut self, s: &str) {
        if is_simple_string(s) {
            self.out.push_str(s);
            return;
        }
        self.out.push('"');
        for ch in s.chars() {
            match ch {
                '\\' => self.out.push_str("\\\\"),
                '"' => self.out.push_str("\\\""),
                '\n' => self.out.push_str("\\n"),
                '\r' => self.out.push_str("\\r"),
                ch => self.out.push(ch),
            }
        }
        self.out.push('"');
    }

    fn format_number(&self, number: Number) -> Result<String> {
        let mut token = match number {
            Number::Int(i) => i.to_string(),
            Number::UInt(u) => u.to_string(),
            Number::Float(f) => {
                if !f.is_finite() {
                    return Err(Error::unsupported_value(format!(
                        "{} has no Brack literal",
                        f
                    )));
                }
                // `Display` for floats never produces exponential notation.
                f.to_string()
            }
        };
        if self.options.max_decimal_digits >= 0 {
            if let Some(dot) = token.find('.') {
                let keep = self.options.max_decimal_digits as usize;
                token.truncate(dot + 1 + keep);
                while token.ends_with('0') {
                    token.pop();
                }
                if token.ends_with('.') {
                    token.pop();
                }
            }
        }
        Ok(token)
    }

    fn write_indent(&mut self, depth: usize) {
        let _ = write!(self.out, "{:width$}", "", width = depth * self.options.indent);
    }

    fn write_list(&mut self, list: &[Value], depth: usize) -> Result<()> {
        self.out.push('[');
        if !self.options.compressed && is_complex_list(list) {
            for element in list {
                self.out.push('\n');
                self.write_indent(depth + 1);
                self.write_value(element, depth + 1)?;
            }
            self.out.push('\n');
            self.write_indent(depth);
        } else {
            for (i, element) in list.iter().enumerate() {
                if i > 0 {
                    self.out.push(' ');
                }
                self.write_value(element, depth)?;
            }
        }
        self.out.push(']');
        Ok(())
    }

    fn write_map(&mut self, map: &crate::ValueMap, depth: usize) -> Result<()> {
        self.out.push('{');
        if !self.options.compressed && is_complex_map(map) {
            for (key, value) in map.iter() {
                self.out.push('\n');
                self.write_indent(depth + 1);
                self.write_key(key)?;
                self.out.push(' ');
                self.write_value(value, depth + 1)?;
            }
            self.out.push('\n');
            self.write_indent(depth);
        } else {
            for (i, (key, value)) in map.iter().enumerate() {
                if i > 0 {
                    self.out.push(' ');
                }
                self.write_key(key)?;
                self.out.push(' ');
                self.write_value(value, depth)?;
            }
        }
        self.out.push('}');
        Ok(())
    }
}

/// A map is complex if it has more than 3 entries or any value that is
/// neither a scalar nor itself a non-complex map.
fn is_complex_map(map: &crate::ValueMap) -> bool {
    map.len() > 3
        || map.values().any(|v| match v {
            Value::Map(inner) => is_complex_map(inner),
            Value::List(_) => true,
            _ => false,
        })
}

/// A list is complex if any element is a complex map.
fn is_complex_list(list: &[Value]) -> bool {
    list.iter().any(|v| matches!(v, Value::Map(map) if is_complex_map(map)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{brack, parse, to_text, to_text_pretty, to_text_with_options};

    #[test]
    fn test_scalars() {
        assert_eq!(to_text(&Value::Null).unwrap(), "#null");
        assert_eq!(to_text(&Value::Bool(true)).unwrap(), "#true");
        assert_eq!(to_text(&Value::from(37)).unwrap(), "37");
        assert_eq!(to_text(&Value::from(-2.5)).unwrap(), "-2.5");
        assert_eq!(to_text(&Value::from("plain")).unwrap(), "plain");
        assert_eq!(
            to_text(&Value::from("two words")).unwrap(),
            "\"two words\""
        );
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            to_text(&Value::from("a\nb\\c\"d")).unwrap(),
            r#""a\nb\\c\"d""#
        );
    }

    #[test]
    fn test_non_finite_floats_rejected() {
        assert!(to_text(&Value::from(f64::NAN)).is_err());
        assert!(to_text(&Value::from(f64::INFINITY)).is_err());
    }

    #[test]
    fn test_max_decimal_digits_truncates() {
        let options = PrintOptions::new().with_max_decimal_digits(3);
        assert_eq!(
            to_text_with_options(&Value::from(1.123456), &options).unwrap(),
            "1.123"
        );
        // Truncation, not rounding.
        assert_eq!(
            to_text_with_options(&Value::from(1.9999), &options).unwrap(),
            "1.999"
        );
        // Trailing zeros and a bare decimal point are trimmed.
        assert_eq!(
            to_text_with_options(&Value::from(1.5004), &options).unwrap(),
            "1.5"
        );
        let zero_digits = PrintOptions::new().with_max_decimal_digits(0);
        assert_eq!(
            to_text_with_options(&Value::from(1.9), &zero_digits).unwrap(),
            "1"
        );
    }

    #[test]
    fn test_compressed_layout() {
        let value = brack!({ "name": "Dennis", "tags": [1, 2, 3] });
        assert_eq!(to_text(&value).unwrap(), "{name Dennis tags [1 2 3]}");
    }

    #[test]
    fn test_pretty_simple_map_stays_inline() {
        let value = brack!({ "a": 1, "b": 2 });
        assert_eq!(to_text_pretty(&value).unwrap(), "{a 1 b 2}");
    }

    #[test]
    fn test_pretty_complex_map_breaks_lines() {
        let value = brack!({ "a": 1, "b": 2, "c": 3, "d": 4 });
        assert_eq!(
            to_text_pretty(&value).unwrap(),
            "{\n  a 1\n  b 2\n  c 3\n  d 4\n}"
        );
    }

    #[test]
    fn test_pretty_output_reparses() {
        let value = brack!({
            "name": "test",
            "sprite": { "frame-count": 3, "frame-types": [1, 3, 5] },
            "tags": [{ "a": 1, "b": 2, "c": 3, "d": 4 }]
        });
        let pretty = to_text_pretty(&value).unwrap();
        assert_eq!(parse(&pretty).unwrap(), value);
    }

    #[test]
    fn test_scalar_keys_print() {
        let value = parse("{1 one #true yes}").unwrap();
        assert_eq!(to_text(&value).unwrap(), "{1 one #true yes}");
    }
}
