//! Type-name registry for polymorphic decoding.
//!
//! This module provides [`TypeRegistry`], the mapping from textual type
//! names to [`TypeInfo`] descriptors. The codec consults it when a value
//! carries an explicit type tag, and when shortening type names on the way
//! out.
//!
//! Resolution tries the literal name first, then each registered implicit
//! namespace in order. Shorthand names additionally get a dash→PascalCase
//! transform, so the tag `forty-two` can resolve a type registered as
//! `FortyTwo`.
//!
//! ## Examples
//!
//! ```rust
//! use brack::introspect::TypeInfo;
//! use brack::TypeRegistry;
//!
//! let mut registry = TypeRegistry::new();
//! registry.register(TypeInfo::scalar::<i32>("Game.Stats.Health"));
//! registry.add_namespace("Game.Stats", '.');
//!
//! let info = registry.resolve("Health").unwrap();
//! assert_eq!(info.name, "Game.Stats.Health");
//! assert_eq!(registry.shorten("Game.Stats.Health"), "Health");
//! ```

use crate::introspect::TypeInfo;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

/// A registered namespace prefix tried automatically when resolving a short
/// type name. The separator is `.` for ordinary namespaces and `+` for
/// names nested inside an enclosing type.
#[derive(Clone, Debug)]
pub struct ImplicitNamespace {
    pub prefix: String,
    pub separator: char,
}

impl ImplicitNamespace {
    fn qualify(&self, name: &str) -> String {
        format!("{}{}{}", self.prefix, self.separator, name)
    }
}

/// Maps textual type names to type descriptors.
///
/// Populate the registry up front, then share it read-only (typically
/// behind an `Arc`) with one codec per thread.
#[derive(Default)]
pub struct TypeRegistry {
    by_name: HashMap<String, Arc<TypeInfo>>,
    lower_index: HashMap<String, String>,
    by_id: HashMap<TypeId, Arc<TypeInfo>>,
    namespaces: Vec<ImplicitNamespace>,
    case_insensitive: bool,
}

impl TypeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables case-insensitive name lookup.
    #[must_use]
    pub fn with_case_insensitive(mut self, enabled: bool) -> Self {
        self.case_insensitive = enabled;
        self
    }

    /// Registers a type descriptor under its declared name, replacing any
    /// previous entry for the same name.
    pub fn register(&mut self, info: TypeInfo) -> Arc<TypeInfo> {
        let info = Arc::new(info);
        self.lower_index
            .insert(info.name.to_lowercase(), info.name.clone());
        self.by_id.insert(info.id, Arc::clone(&info));
        self.by_name.insert(info.name.clone(), Arc::clone(&info));
        info
    }

    /// Removes the entry registered under `name`.
    pub fn remove(&mut self, name: &str) -> Option<Arc<TypeInfo>> {
        let info = self.by_name.remove(name)?;
        self.lower_index.remove(&info.name.to_lowercase());
        self.by_id.remove(&info.id);
        Some(info)
    }

    /// Appends an implicit namespace tried during resolution, after all
    /// previously added ones.
    pub fn add_namespace(&mut self, prefix: impl Into<String>, separator: char) {
        self.namespaces.push(ImplicitNamespace {
            prefix: prefix.into(),
            separator,
        });
    }

    /// Looks up a name exactly as registered (or case-insensitively when
    /// enabled), with no namespace or shorthand handling.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Arc<TypeInfo>> {
        if let Some(info) = self.by_name.get(name) {
            return Some(Arc::clone(info));
        }
        if self.case_insensitive {
            let canonical = self.lower_index.get(&name.to_lowercase())?;
            return self.by_name.get(canonical).map(Arc::clone);
        }
        None
    }

    /// Resolves a type tag: the literal name first, then its PascalCase
    /// shorthand form, then both through each implicit namespace in order.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<Arc<TypeInfo>> {
        let pascal = dash_to_pascal(name);
        if let Some(info) = self.lookup(name) {
            return Some(info);
        }
        if pascal != name {
            if let Some(info) = self.lookup(&pascal) {
                return Some(info);
            }
        }
        for namespace in &self.namespaces {
            if let Some(info) = self.lookup(&namespace.qualify(name)) {
                return Some(info);
            }
            if pascal != name {
                if let Some(info) = self.lookup(&namespace.qualify(&pascal)) {
                    return Some(info);
                }
            }
        }
        None
    }

    /// Strips the longest matching implicit-namespace prefix from a full
    /// type name; returns the name unchanged if none matches.
    #[must_use]
    pub fn shorten<'a>(&self, full_name: &'a str) -> &'a str {
        let mut best: Option<&ImplicitNamespace> = None;
        for namespace in &self.namespaces {
            if full_name.len() > namespace.prefix.len() + 1
                && full_name.starts_with(&namespace.prefix)
                && full_name[namespace.prefix.len()..].starts_with(namespace.separator)
            {
                match best {
                    Some(current) if current.prefix.len() >= namespace.prefix.len() => {}
                    _ => best = Some(namespace),
                }
            }
        }
        match best {
            Some(namespace) => &full_name[namespace.prefix.len() + namespace.separator.len_utf8()..],
            None => full_name,
        }
    }

    /// Returns the descriptor registered for a type identity.
    #[must_use]
    pub fn info_of(&self, id: TypeId) -> Option<Arc<TypeInfo>> {
        self.by_id.get(&id).map(Arc::clone)
    }
}

/// `forty-two` → `FortyTwo`; segments between dashes are capitalized and
/// joined.
#[must_use]
pub fn dash_to_pascal(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for segment in name.split('-') {
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.push_str(chars.as_str());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dash_to_pascal() {
        assert_eq!(dash_to_pascal("forty-two"), "FortyTwo");
        assert_eq!(dash_to_pascal("monster"), "Monster");
        assert_eq!(dash_to_pascal("a-b-c"), "ABC");
    }

    #[test]
    fn test_literal_resolution_wins() {
        let mut registry = TypeRegistry::new();
        registry.register(TypeInfo::scalar::<i32>("Health"));
        registry.register(TypeInfo::scalar::<i64>("Game.Health"));
        registry.add_namespace("Game", '.');

        assert_eq!(registry.resolve("Health").unwrap().name, "Health");
    }

    #[test]
    fn test_namespace_order() {
        let mut registry = TypeRegistry::new();
        registry.register(TypeInfo::scalar::<i32>("A.Thing"));
        registry.register(TypeInfo::scalar::<i64>("B.Thing"));
        registry.add_namespace("B", '.');
        registry.add_namespace("A", '.');

        assert_eq!(registry.resolve("Thing").unwrap().name, "B.Thing");
    }

    #[test]
    fn test_enclosing_type_separator() {
        let mut registry = TypeRegistry::new();
        registry.register(TypeInfo::scalar::<i32>("Outer+Inner"));
        registry.add_namespace("Outer", '+');

        assert_eq!(registry.resolve("Inner").unwrap().name, "Outer+Inner");
        assert_eq!(registry.shorten("Outer+Inner"), "Inner");
    }

    #[test]
    fn test_shorthand_pascal_resolution() {
        let mut registry = TypeRegistry::new();
        registry.register(TypeInfo::scalar::<i32>("Game.FortyTwo"));
        registry.add_namespace("Game", '.');

        assert_eq!(registry.resolve("forty-two").unwrap().name, "Game.FortyTwo");
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let mut registry = TypeRegistry::new().with_case_insensitive(true);
        registry.register(TypeInfo::scalar::<i32>("Monster"));

        assert!(registry.lookup("monster").is_some());
        assert!(registry.resolve("MONSTER").is_some());
    }

    #[test]
    fn test_shorten_prefers_longest_prefix() {
        let mut registry = TypeRegistry::new();
        registry.add_namespace("Game", '.');
        registry.add_namespace("Game.Stats", '.');

        assert_eq!(registry.shorten("Game.Stats.Health"), "Health");
        assert_eq!(registry.shorten("Other.Thing"), "Other.Thing");
    }

    #[test]
    fn test_remove() {
        let mut registry = TypeRegistry::new();
        registry.register(TypeInfo::scalar::<i32>("Gone"));
        assert!(registry.remove("Gone").is_some());
        assert!(registry.resolve("Gone").is_none());
    }
}
