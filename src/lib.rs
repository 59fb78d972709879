//! # brack
//!
//! A parser, canonical printer and reflection-based object codec for the
//! Brack data notation.
//!
//! ## What is Brack?
//!
//! Brack is a compact bracketed text format for configuration and data
//! interchange: `[ ]` delimits lists, `{ }` delimits maps (flat alternating
//! key/value sequences), `#true`/`#false`/`#null` are the marker literals,
//! `;` starts a line comment, and bare "simple strings" need no quotes.
//!
//! ```text
//! {name Dennis
//!  age 37          ; years
//!  old #false
//!  scores [1 2 3]}
//! ```
//!
//! ## Key Features
//!
//! - **Compact grammar**: unquoted barewords, marker literals and flat
//!   key/value maps keep documents small and diff-friendly
//! - **Canonical printing**: insertion-ordered output with a complexity
//!   heuristic deciding when to break collections across lines
//! - **Object codec**: convert typed Rust values to and from the dynamic
//!   tree via registered type descriptors, with polymorphic type tags,
//!   default-value elision and pluggable error recovery
//! - **Layered merge**: overlay one tree on another for configuration
//!   inheritance
//! - **No unsafe code**: written entirely in safe Rust
//!
//! ## Quick Start
//!
//! ### Parsing and printing
//!
//! ```rust
//! use brack::{parse, to_text};
//!
//! let value = parse("{name Dennis age 37 old #false}").unwrap();
//! let map = value.as_map().unwrap();
//! assert_eq!(map.get_str("age").and_then(|v| v.as_i64()), Some(37));
//!
//! // Printing is canonical and re-parseable
//! assert_eq!(to_text(&value).unwrap(), "{name Dennis age 37 old #false}");
//! ```
//!
//! ### Building values with the brack! macro
//!
//! ```rust
//! use brack::{brack, Value};
//!
//! let data = brack!({
//!     "name": "Alice",
//!     "age": 30,
//!     "tags": ["admin", "user"]
//! });
//!
//! if let Value::Map(map) = data {
//!     assert_eq!(map.get_str("name").and_then(|v| v.as_str()), Some("Alice"));
//! }
//! ```
//!
//! ### Layered configuration
//!
//! ```rust
//! use brack::{brack, merge};
//!
//! let base = brack!({ "name": "test", "sprite": { "frame-count": 3 } });
//! let patch = brack!({ "name": "test-two" });
//! let combined = merge(&base, &patch, false);
//! assert_eq!(
//!     combined,
//!     brack!({ "name": "test-two", "sprite": { "frame-count": 3 } })
//! );
//! ```
//!
//! ### The object codec
//!
//! ```rust
//! use brack::{describe_struct, Codec, CodecOptions, TypeRegistry};
//! use brack::introspect::TypeInfo;
//! use std::sync::Arc;
//!
//! #[derive(Clone, Default, PartialEq, Debug)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! let mut registry = TypeRegistry::new();
//! registry.register(TypeInfo::scalar::<i32>("Int32"));
//! registry.register(describe_struct!(Point, "Point", { x: i32, y: i32 }));
//!
//! let codec = Codec::new(Arc::new(registry), CodecOptions::new());
//! let value = codec.serialize(&Point { x: 1, y: 2 }, false).unwrap();
//! let back: Point = codec.deserialize_as(&value).unwrap().unwrap();
//! assert_eq!(back, Point { x: 1, y: 2 });
//! ```
//!
//! ## Concurrency
//!
//! Parsing, printing and merging are pure functions. A [`Codec`] carries
//! per-instance caches and is not safe for concurrent use: give each thread
//! its own codec over one shared [`TypeRegistry`].
//!
//! ## Examples
//!
//! See the `demos/` directory for runnable examples:
//!
//! - **`values.rs`** - parsing, printing and merging value trees
//! - **`codec.rs`** - describing types and round-tripping instances
//!
//! Run any example with: `cargo run --example <name>`

pub mod codec;
pub mod eq;
pub mod error;
pub mod introspect;
pub mod macros;
pub mod map;
pub mod merge;
pub mod options;
pub mod parse;
pub mod print;
pub mod registry;
pub mod value;

pub use codec::{Codec, CodecHook, DecodeHook, EncodeHook, FactoryHook};
pub use eq::deep_eq;
pub use error::{Error, Result};
pub use map::ValueMap;
pub use merge::merge;
pub use options::{
    CodecOptions, EnumEncoding, MacroProcessor, ParseOptions, PrintOptions, Recovery,
};
pub use parse::Parser;
pub use print::Printer;
pub use registry::{ImplicitNamespace, TypeRegistry};
pub use value::{Key, Number, Value};

/// Parse a string of Brack text into a [`Value`] tree.
///
/// # Examples
///
/// ```rust
/// use brack::parse;
///
/// let value = parse("[1 2 three]").unwrap();
/// assert_eq!(value.as_list().map(Vec::len), Some(3));
/// ```
///
/// # Errors
///
/// Returns a format error with line/column information and a snippet of the
/// unconsumed input if the text is malformed.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse(text: &str) -> Result<Value> {
    parse_with_options(text, &ParseOptions::default())
}

/// Parse a string of Brack text with custom options.
///
/// Options control the nesting depth limit and the macro processor invoked
/// for `( ... )` spans.
///
/// # Errors
///
/// Returns a format error if the text is malformed, exceeds the depth
/// limit, or the macro processor rejects a span.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse_with_options(text: &str, options: &ParseOptions) -> Result<Value> {
    Parser::from_str(text, options).parse_document()
}

/// Render a [`Value`] tree as single-line Brack text.
///
/// # Examples
///
/// ```rust
/// use brack::{brack, to_text};
///
/// let value = brack!({ "a": 1, "b": [2, 3] });
/// assert_eq!(to_text(&value).unwrap(), "{a 1 b [2 3]}");
/// ```
///
/// # Errors
///
/// Returns an error for values with no Brack literal (non-finite floats).
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_text(value: &Value) -> Result<String> {
    to_text_with_options(value, &PrintOptions::default())
}

/// Render a [`Value`] tree as multiline Brack text.
///
/// Collections judged complex are broken one element per line with
/// indentation; simple ones stay inline.
///
/// # Errors
///
/// Returns an error for values with no Brack literal (non-finite floats).
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_text_pretty(value: &Value) -> Result<String> {
    to_text_with_options(value, &PrintOptions::pretty())
}

/// Render a [`Value`] tree with custom printing options.
///
/// # Examples
///
/// ```rust
/// use brack::{to_text_with_options, PrintOptions, Value};
///
/// let options = PrintOptions::new().with_max_decimal_digits(3);
/// let text = to_text_with_options(&Value::from(1.123456), &options).unwrap();
/// assert_eq!(text, "1.123");
/// ```
///
/// # Errors
///
/// Returns an error for values with no Brack literal (non-finite floats).
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_text_with_options(value: &Value, options: &PrintOptions) -> Result<String> {
    Printer::new(options).print(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_print_round_trip() {
        let text = "{name Dennis age 37 old #false scores [1 2 3]}";
        let value = parse(text).unwrap();
        assert_eq!(to_text(&value).unwrap(), text);
    }

    #[test]
    fn test_pretty_round_trip() {
        let value = brack!({
            "a": { "w": 1, "x": 2, "y": 3, "z": 4 },
            "b": [1, 2, 3]
        });
        let pretty = to_text_pretty(&value).unwrap();
        assert_eq!(parse(&pretty).unwrap(), value);
    }

    #[test]
    fn test_merge_then_print() {
        let base = parse("{Name test Sprite {FrameCount 3 FrameTypes [1 3 5]}}").unwrap();
        let patch = parse("{Name test-two Sprite {FrameTypes [2 4]}}").unwrap();
        let merged = merge(&base, &patch, false);
        assert_eq!(
            to_text(&merged).unwrap(),
            "{Name test-two Sprite {FrameCount 3 FrameTypes [2 4]}}"
        );
    }
}
