//! Layered tree merge.
//!
//! This module provides [`merge`], the overlay used for configuration
//! inheritance: a child tree is laid over a parent tree, entry by entry,
//! before the combined result is handed to the codec.
//!
//! ## Examples
//!
//! ```rust
//! use brack::{brack, merge};
//!
//! let base = brack!({ "name": "test", "health": 10 });
//! let patch = brack!({ "name": "test-two" });
//!
//! let merged = merge(&base, &patch, false);
//! assert_eq!(merged, brack!({ "name": "test-two", "health": 10 }));
//! ```

use crate::{Value, ValueMap};

/// Overlays `child` onto `parent`.
///
/// Scalars from the child win outright. A child list replaces the parent
/// wholesale, unless `append_lists` is set and the parent is also a list, in
/// which case the result is the parent's elements followed by the child's.
/// A child map over a parent map merges entry-wise, recursing where a key
/// exists on both sides; over anything else it wins wholesale.
///
/// Every value kind is mergeable, so the operation is total.
#[must_use]
pub fn merge(parent: &Value, child: &Value, append_lists: bool) -> Value {
    match child {
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => child.clone(),
        Value::List(elements) => match parent {
            Value::List(base) if append_lists => {
                let mut out = Vec::with_capacity(base.len() + elements.len());
                out.extend(base.iter().cloned());
                out.extend(elements.iter().cloned());
                Value::List(out)
            }
            _ => child.clone(),
        },
        Value::Map(overlay) => match parent {
            Value::Map(base) => {
                let mut out = ValueMap::with_capacity(base.len() + overlay.len());
                for (key, value) in base.iter() {
                    out.insert(key.clone(), value.clone());
                }
                for (key, value) in overlay.iter() {
                    let merged = match out.get(key) {
                        Some(existing) => merge(existing, value, append_lists),
                        None => value.clone(),
                    };
                    out.insert(key.clone(), merged);
                }
                Value::Map(out)
            }
            _ => child.clone(),
        },
    }
}
