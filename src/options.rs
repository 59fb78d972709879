//! Configuration options for parsing, printing and the object codec.
//!
//! This module provides the option types:
//!
//! - [`ParseOptions`]: depth limit and pluggable macro processing
//! - [`PrintOptions`]: layout and numeric formatting
//! - [`CodecOptions`]: enum encoding, type tagging, default skipping and
//!   error routing for the object codec
//!
//! ## Examples
//!
//! ```rust
//! use brack::{brack, to_text_with_options, PrintOptions};
//!
//! let value = brack!({ "ratio": 1.123456 });
//!
//! let options = PrintOptions::new().with_max_decimal_digits(3);
//! let text = to_text_with_options(&value, &options).unwrap();
//! assert_eq!(text, "{ratio 1.123}");
//! ```

use crate::{Error, Value};
use std::fmt;
use std::sync::Arc;

/// A pluggable macro processor.
///
/// Invoked by the parser for every `( ... )` span with the full span text,
/// parentheses included. The default processor returns the span unchanged as
/// a string value.
pub type MacroProcessor = Arc<dyn Fn(&str) -> crate::Result<Value> + Send + Sync>;

/// Configuration options for parsing Brack text.
#[derive(Clone)]
pub struct ParseOptions {
    /// Maximum nesting depth before parsing fails. Guards against stack
    /// exhaustion on adversarial input.
    pub max_depth: usize,
    pub macro_processor: Option<MacroProcessor>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            max_depth: 128,
            macro_processor: None,
        }
    }
}

impl ParseOptions {
    /// Creates default options (depth limit 128, identity macro processor).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum nesting depth.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Sets the macro processor invoked for `( ... )` spans.
    ///
    /// The processor receives the full span, delimiters included.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use brack::{parse_with_options, ParseOptions, Value};
    /// use std::sync::Arc;
    ///
    /// let options = ParseOptions::new()
    ///     .with_macro_processor(Arc::new(|span| Ok(Value::from(span.len() as i64))));
    /// let value = parse_with_options("(hello)", &options).unwrap();
    /// assert_eq!(value.as_i64(), Some(7));
    /// ```
    #[must_use]
    pub fn with_macro_processor(mut self, processor: MacroProcessor) -> Self {
        self.macro_processor = Some(processor);
        self
    }
}

impl fmt::Debug for ParseOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseOptions")
            .field("max_depth", &self.max_depth)
            .field("macro_processor", &self.macro_processor.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// Configuration options for printing Brack values.
///
/// # Examples
///
/// ```rust
/// use brack::PrintOptions;
///
/// // Compressed single-line output
/// let options = PrintOptions::new();
///
/// // Multiline output driven by the complexity heuristic
/// let options = PrintOptions::pretty();
///
/// // Custom configuration
/// let options = PrintOptions::pretty()
///     .with_indent(4)
///     .with_max_decimal_digits(6);
/// ```
#[derive(Clone, Debug)]
pub struct PrintOptions {
    /// Single-line output when `true`; complexity-driven layout otherwise.
    pub compressed: bool,
    /// Number of spaces per nesting level in multiline output.
    pub indent: usize,
    /// Maximum digits after the decimal point; excess digits are truncated,
    /// not rounded. Negative means unlimited.
    pub max_decimal_digits: i32,
}

impl Default for PrintOptions {
    fn default() -> Self {
        PrintOptions {
            compressed: true,
            indent: 2,
            max_decimal_digits: -1,
        }
    }
}

impl PrintOptions {
    /// Creates default options (compressed, unlimited decimal digits).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options for multiline output.
    ///
    /// Complex collections are broken across lines; simple ones stay inline.
    #[must_use]
    pub fn pretty() -> Self {
        PrintOptions {
            compressed: false,
            ..Default::default()
        }
    }

    /// Sets the indentation size (number of spaces per level).
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Sets the maximum number of digits after the decimal point.
    ///
    /// Excess digits are truncated. A negative value means unlimited.
    #[must_use]
    pub fn with_max_decimal_digits(mut self, digits: i32) -> Self {
        self.max_decimal_digits = digits;
        self
    }
}

/// How enum values are written by the codec.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum EnumEncoding {
    /// Write the variant's numeric code.
    #[default]
    AsCode,
    /// Write the variant name, lowercased.
    AsLowerName,
}

/// Outcome of a codec recovery callback.
///
/// Returned by the hooks on [`CodecOptions`] to decide whether a problem
/// aborts decoding or is papered over with a fallback value.
pub enum Recovery {
    /// Propagate the error.
    Raise,
    /// Use this instance instead (`None` for a null result).
    Substitute(Option<crate::introspect::Instance>),
}

/// Callback consulted when decoding a value fails.
pub type ErrorHook =
    Arc<dyn Fn(&Error, &Value) -> Recovery + Send + Sync>;
/// Callback consulted when a map key matches no member of the target type.
pub type SpuriousKeyHook =
    Arc<dyn Fn(&str, &str) -> Recovery + Send + Sync>;
/// Callback consulted when a type tag resolves to no registered type.
pub type UnknownTypeHook =
    Arc<dyn Fn(&str, &Value) -> Recovery + Send + Sync>;

/// Configuration options for the object codec.
///
/// # Examples
///
/// ```rust
/// use brack::{CodecOptions, EnumEncoding};
///
/// let options = CodecOptions::new()
///     .with_enum_encoding(EnumEncoding::AsLowerName)
///     .with_skip_defaults(false);
/// ```
#[derive(Clone, Default)]
pub struct CodecOptions {
    pub enum_encoding: EnumEncoding,
    /// Key under which a value's type tag is stored. Empty means the default
    /// `#type`.
    pub type_tag_key: String,
    /// Omit members whose value equals the type's default. Defaults to on;
    /// see [`CodecOptions::new`].
    pub skip_defaults: bool,
    /// Treat a null where a non-nullable value is expected as an error
    /// instead of producing a default.
    pub refuse_null: bool,
    pub on_error: Option<ErrorHook>,
    pub on_spurious_key: Option<SpuriousKeyHook>,
    pub on_unknown_type: Option<UnknownTypeHook>,
}

impl CodecOptions {
    /// Creates default options (enum codes, `#type` tags, defaults skipped,
    /// all hooks raising).
    #[must_use]
    pub fn new() -> Self {
        CodecOptions {
            skip_defaults: true,
            ..Default::default()
        }
    }

    /// Returns the effective type tag key.
    #[must_use]
    pub fn tag_key(&self) -> &str {
        if self.type_tag_key.is_empty() {
            "#type"
        } else {
            &self.type_tag_key
        }
    }

    /// Sets how enum values are written.
    #[must_use]
    pub fn with_enum_encoding(mut self, encoding: EnumEncoding) -> Self {
        self.enum_encoding = encoding;
        self
    }

    /// Sets the key under which type tags are stored.
    #[must_use]
    pub fn with_type_tag_key(mut self, key: impl Into<String>) -> Self {
        self.type_tag_key = key.into();
        self
    }

    /// Sets whether members equal to the type's default are omitted.
    #[must_use]
    pub fn with_skip_defaults(mut self, skip: bool) -> Self {
        self.skip_defaults = skip;
        self
    }

    /// Sets whether a null in a non-nullable position is an error.
    #[must_use]
    pub fn with_refuse_null(mut self, refuse: bool) -> Self {
        self.refuse_null = refuse;
        self
    }

    /// Sets the callback consulted when decoding a value fails.
    #[must_use]
    pub fn with_on_error(mut self, hook: ErrorHook) -> Self {
        self.on_error = Some(hook);
        self
    }

    /// Sets the callback consulted for map keys with no matching member.
    #[must_use]
    pub fn with_on_spurious_key(mut self, hook: SpuriousKeyHook) -> Self {
        self.on_spurious_key = Some(hook);
        self
    }

    /// Sets the callback consulted for unresolvable type tags.
    #[must_use]
    pub fn with_on_unknown_type(mut self, hook: UnknownTypeHook) -> Self {
        self.on_unknown_type = Some(hook);
        self
    }
}

impl fmt::Debug for CodecOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecOptions")
            .field("enum_encoding", &self.enum_encoding)
            .field("type_tag_key", &self.tag_key())
            .field("skip_defaults", &self.skip_defaults)
            .field("refuse_null", &self.refuse_null)
            .field("on_error", &self.on_error.as_ref().map(|_| "<fn>"))
            .field("on_spurious_key", &self.on_spurious_key.as_ref().map(|_| "<fn>"))
            .field("on_unknown_type", &self.on_unknown_type.as_ref().map(|_| "<fn>"))
            .finish()
    }
}
