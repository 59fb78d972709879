//! The object codec: typed instances ⇄ [`Value`] trees.
//!
//! This module provides [`Codec`], which serializes reflected host
//! instances into the value tree and reconstructs them from it, using the
//! descriptors in a shared [`TypeRegistry`].
//!
//! ## Overview
//!
//! - **Coercion table**: leaf scalars map through [`Scalar`]; enums encode
//!   as numeric codes or lowercased names; maps and lists recurse; anything
//!   else becomes a map of member name to serialized member value
//! - **Type tags**: polymorphic values carry their (namespace-shortened)
//!   type name under a reserved key, resolved back through the registry
//! - **Skip-default elision**: members equal to the type's default are
//!   omitted, against a lazily built per-type default snapshot
//! - **Pluggable recovery**: conversion failures, spurious keys and unknown
//!   type tags each route through an independent callback
//! - **Caches**: name resolution, descriptors, default snapshots and enum
//!   token parses are memoized per codec instance
//!
//! A codec is deliberately not shareable across threads: its caches are
//! interior-mutable. Give each thread its own codec over the same shared
//! registry.
//!
//! ## Examples
//!
//! ```rust
//! use brack::introspect::TypeInfo;
//! use brack::{Codec, CodecOptions, TypeRegistry, Value};
//! use std::sync::Arc;
//!
//! let mut registry = TypeRegistry::new();
//! registry.register(TypeInfo::scalar::<i32>("Int32"));
//! let codec = Codec::new(Arc::new(registry), CodecOptions::new());
//!
//! let value = codec.serialize(&37i32, false).unwrap();
//! assert_eq!(value, Value::from(37));
//! let back: i32 = codec.deserialize_as(&value).unwrap().unwrap();
//! assert_eq!(back, 37);
//! ```

use crate::introspect::{EnumShape, Instance, Reflected, Shape, TypeInfo};
use crate::options::{CodecOptions, EnumEncoding, Recovery};
use crate::registry::TypeRegistry;
use crate::{Error, Key, Result, Value, ValueMap};
use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

/// Custom per-type encode hook; fully replaces default serialization for
/// its type.
pub type EncodeHook = Arc<dyn Fn(&Codec, &dyn Reflected) -> Result<Value>>;
/// Custom per-type decode hook; fully replaces default deserialization for
/// its type.
pub type DecodeHook = Arc<dyn Fn(&Codec, &Value) -> Result<Option<Instance>>>;
/// Custom instance factory, used instead of the type's default constructor.
pub type FactoryHook = Arc<dyn Fn() -> Instance>;

enum TagOutcome {
    Untagged,
    Resolved(Arc<TypeInfo>),
    Substituted(Option<Instance>),
}

/// A bundle of custom behavior registered for one type.
#[derive(Clone, Default)]
pub struct CodecHook {
    pub encode: Option<EncodeHook>,
    pub decode: Option<DecodeHook>,
    pub factory: Option<FactoryHook>,
}

/// Converts between typed instances and [`Value`] trees.
///
/// Not safe for concurrent use; create one codec per thread over a shared
/// registry.
pub struct Codec {
    registry: Arc<TypeRegistry>,
    options: CodecOptions,
    hooks: HashMap<TypeId, CodecHook>,
    name_cache: RefCell<HashMap<String, Option<Arc<TypeInfo>>>>,
    info_cache: RefCell<HashMap<TypeId, Option<Arc<TypeInfo>>>>,
    default_cache: RefCell<HashMap<TypeId, Arc<HashMap<&'static str, Value>>>>,
    enum_cache: RefCell<HashMap<(TypeId, String), Option<i64>>>,
}

impl Codec {
    #[must_use]
    pub fn new(registry: Arc<TypeRegistry>, options: CodecOptions) -> Self {
        Codec {
            registry,
            options,
            hooks: HashMap::new(),
            name_cache: RefCell::new(HashMap::new()),
            info_cache: RefCell::new(HashMap::new()),
            default_cache: RefCell::new(HashMap::new()),
            enum_cache: RefCell::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    #[must_use]
    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    /// Registers custom behavior for `T`, consulted before default dispatch
    /// on both the encode and decode paths.
    pub fn register_hook<T: Any>(&mut self, hook: CodecHook) {
        self.hooks.insert(TypeId::of::<T>(), hook);
    }

    /// Descriptor lookup by type identity, memoized.
    fn info(&self, id: TypeId) -> Option<Arc<TypeInfo>> {
        if let Some(cached) = self.info_cache.borrow().get(&id) {
            return cached.clone();
        }
        let info = self.registry.info_of(id);
        self.info_cache.borrow_mut().insert(id, info.clone());
        info
    }

    /// Tag resolution through the registry, memoized.
    fn resolve_name(&self, name: &str) -> Option<Arc<TypeInfo>> {
        if let Some(cached) = self.name_cache.borrow().get(name) {
            return cached.clone();
        }
        let info = self.registry.resolve(name);
        self.name_cache
            .borrow_mut()
            .insert(name.to_string(), info.clone());
        info
    }

    // ---------------------------------------------------------------- encode

    /// Serializes an instance into a [`Value`] tree.
    ///
    /// With `tag_type` set, a composite result carries the instance's
    /// (shortened) type name under the reserved tag key, allowing the type
    /// to be inferred again on the way back in.
    pub fn serialize(&self, instance: &dyn Reflected, tag_type: bool) -> Result<Value> {
        let id = instance.as_any().type_id();
        if let Some(encode) = self.hooks.get(&id).and_then(|hook| hook.encode.clone()) {
            return encode(self, instance);
        }
        let info = self
            .info(id)
            .ok_or_else(|| Error::unknown_type(format!("unregistered type (id {:?})", id)))?;
        match &info.shape {
            Shape::Scalar(shape) => (shape.encode)(instance),
            Shape::Nullable(shape) => match (shape.get)(instance)? {
                Some(inner) => self.serialize(inner.as_ref(), false),
                None if self.options.refuse_null => Err(Error::unsupported_value(format!(
                    "null is not allowed for {}",
                    info.name
                ))),
                None => Ok(Value::Null),
            },
            Shape::Enum(shape) => {
                let (code, name) = (shape.tag_of)(instance)?;
                Ok(match self.options.enum_encoding {
                    EnumEncoding::AsCode => Value::from(code),
                    EnumEncoding::AsLowerName => Value::String(name.to_lowercase()),
                })
            }
            Shape::List(shape) => {
                let items = (shape.items)(instance)?;
                let mut list = Vec::with_capacity(items.len());
                // Without a fixed element type, each element carries its own
                // tag so the concrete types travel with the data.
                let tag_elements = shape.element.is_none();
                for item in &items {
                    list.push(self.serialize(item.as_ref(), tag_elements)?);
                }
                Ok(Value::List(list))
            }
            Shape::Map(shape) => {
                let entries = (shape.entries)(instance)?;
                let mut map = ValueMap::with_capacity(entries.len());
                for (key, value) in entries {
                    map.insert(Key::try_from(key)?, self.serialize(value.as_ref(), false)?);
                }
                Ok(Value::Map(map))
            }
            Shape::Struct(shape) => {
                let defaults = if self.options.skip_defaults {
                    Some(self.default_member_values(&info)?)
                } else {
                    None
                };
                let mut map = ValueMap::with_capacity(shape.members.len() + 1);
                if tag_type {
                    map.insert(
                        Key::from(self.options.tag_key()),
                        Value::from(self.registry.shorten(&info.name)),
                    );
                }
                for member in &shape.members {
                    let current = (member.get)(instance)?;
                    let serialized = self.serialize(current.as_ref(), false)?;
                    if let Some(defaults) = &defaults {
                        if defaults.get(member.name) == Some(&serialized) {
                            continue;
                        }
                    }
                    map.insert(Key::from(member.name), serialized);
                }
                Ok(Value::Map(map))
            }
        }
    }

    /// Lazily built snapshot of a struct type's default member values, used
    /// for skip-default comparison.
    fn default_member_values(&self, info: &Arc<TypeInfo>) -> Result<Arc<HashMap<&'static str, Value>>> {
        if let Some(cached) = self.default_cache.borrow().get(&info.id) {
            return Ok(Arc::clone(cached));
        }
        let mut defaults = HashMap::new();
        if let Shape::Struct(shape) = &info.shape {
            let instance = info.default_instance();
            for member in &shape.members {
                let value = (member.get)(instance.as_ref())?;
                defaults.insert(member.name, self.serialize(value.as_ref(), false)?);
            }
        }
        let defaults = Arc::new(defaults);
        self.default_cache
            .borrow_mut()
            .insert(info.id, Arc::clone(&defaults));
        Ok(defaults)
    }

    // ---------------------------------------------------------------- decode

    /// Deserializes a [`Value`] into a typed instance.
    ///
    /// `desired` names the expected type; with `None`, bare scalars come
    /// back as their natural host types and composites must carry a type
    /// tag. A `Null` input yields `Ok(None)` unless the desired type is
    /// nullable.
    pub fn deserialize(&self, value: &Value, desired: Option<TypeId>) -> Result<Option<Instance>> {
        if let Some(id) = desired {
            if let Some(decode) = self.hooks.get(&id).and_then(|hook| hook.decode.clone()) {
                return decode(self, value);
            }
        }

        let desired_info = desired.and_then(|id| self.info(id));

        if value.is_null() {
            if let Some(info) = &desired_info {
                if let Shape::Nullable(shape) = &info.shape {
                    return Ok(Some((shape.make)(None)?));
                }
            }
            return Ok(None);
        }

        // Infer the target from an explicit tag; it wins over the declared
        // type so polymorphic values land on their concrete type.
        let tagged_info = match self.tagged_type(value)? {
            TagOutcome::Resolved(info) => Some(info),
            TagOutcome::Substituted(substitute) => return Ok(substitute),
            TagOutcome::Untagged => None,
        };
        let info = match tagged_info.or(desired_info) {
            Some(info) => info,
            None => {
                return match value {
                    Value::Bool(b) => Ok(Some(Box::new(*b) as Instance)),
                    Value::Number(n) => Ok(Some(number_instance(*n))),
                    Value::String(s) => Ok(Some(Box::new(s.clone()) as Instance)),
                    other => self.recover(
                        Error::unknown_type(format!(
                            "cannot infer a type for an untagged {}",
                            other.kind()
                        )),
                        value,
                    ),
                };
            }
        };

        match self.decode_with(&info, value) {
            Ok(result) => Ok(result),
            Err(err @ (Error::SpuriousKey { .. } | Error::UnknownType(_))) => Err(err),
            Err(err) => self.recover(err, value),
        }
    }

    /// Convenience wrapper unboxing the result to a concrete type.
    pub fn deserialize_as<T: Any>(&self, value: &Value) -> Result<Option<T>> {
        match self.deserialize(value, Some(TypeId::of::<T>()))? {
            Some(instance) => Ok(Some(crate::introspect::take::<T>(instance)?)),
            None => Ok(None),
        }
    }

    /// Structural clone through the format: serialize with type tags, then
    /// deserialize the resulting tree.
    pub fn clone_instance(&self, instance: &dyn Reflected) -> Result<Instance> {
        let value = self.serialize(instance, true)?;
        let id = instance.as_any().type_id();
        self.deserialize(&value, Some(id))?
            .ok_or_else(|| Error::custom("clone produced no instance"))
    }

    fn tagged_type(&self, value: &Value) -> Result<TagOutcome> {
        let Some(map) = value.as_map() else {
            return Ok(TagOutcome::Untagged);
        };
        let Some(tag) = map.get_str(self.options.tag_key()) else {
            return Ok(TagOutcome::Untagged);
        };
        let Some(name) = tag.as_str() else {
            return Err(Error::unknown_type(format!(
                "type tag must be a string, found {}",
                tag.kind()
            )));
        };
        match self.resolve_name(name) {
            Some(info) => Ok(TagOutcome::Resolved(info)),
            None => match &self.options.on_unknown_type {
                Some(hook) => match hook(name, value) {
                    Recovery::Raise => Err(Error::unknown_type(name)),
                    Recovery::Substitute(substitute) => Ok(TagOutcome::Substituted(substitute)),
                },
                None => Err(Error::unknown_type(name)),
            },
        }
    }

    fn decode_with(&self, info: &Arc<TypeInfo>, value: &Value) -> Result<Option<Instance>> {
        match &info.shape {
            Shape::Scalar(shape) => Ok(Some((shape.decode)(value)?)),
            Shape::Nullable(shape) => {
                let inner = self.deserialize(value, Some(shape.inner))?;
                Ok(Some((shape.make)(inner)?))
            }
            Shape::Enum(shape) => Ok(Some(self.decode_enum(info, shape, value)?)),
            Shape::List(shape) => {
                let Some(elements) = value.as_list() else {
                    return Err(Error::shape_mismatch(info.name.as_str(), value.kind()));
                };
                let mut items = Vec::with_capacity(elements.len());
                for element in elements {
                    match self.deserialize(element, shape.element)? {
                        Some(item) => items.push(item),
                        None => match shape.element.and_then(|id| self.info(id)) {
                            Some(element_info) => items.push(element_info.default_instance()),
                            None => {}
                        },
                    }
                }
                Ok(Some((shape.build)(items)?))
            }
            Shape::Map(shape) => {
                let Some(map) = value.as_map() else {
                    return Err(Error::shape_mismatch(info.name.as_str(), value.kind()));
                };
                let mut entries = Vec::with_capacity(map.len());
                for (key, entry) in map.iter() {
                    let decoded = match self.deserialize(entry, Some(shape.value))? {
                        Some(instance) => instance,
                        None => match self.info(shape.value) {
                            Some(value_info) => value_info.default_instance(),
                            None => continue,
                        },
                    };
                    entries.push((key.to_value(), decoded));
                }
                Ok(Some((shape.build)(entries)?))
            }
            Shape::Struct(shape) => {
                let Some(map) = value.as_map() else {
                    return Err(Error::shape_mismatch(info.name.as_str(), value.kind()));
                };
                let factory = self
                    .hooks
                    .get(&info.id)
                    .and_then(|hook| hook.factory.clone());
                let mut instance = match factory {
                    Some(factory) => factory(),
                    None => info.default_instance(),
                };
                for (key, entry) in map.iter() {
                    let key_name = key.to_string();
                    if key_name == self.options.tag_key() {
                        continue;
                    }
                    match shape.members.iter().find(|member| member.name == key_name) {
                        Some(member) => {
                            if let Some(decoded) =
                                self.deserialize(entry, Some(member.type_id))?
                            {
                                (member.set)(instance.as_mut(), decoded)?;
                            }
                        }
                        None => match &self.options.on_spurious_key {
                            Some(hook) => match hook(&key_name, &info.name) {
                                Recovery::Raise => {
                                    return Err(Error::spurious_key(key_name, info.name.as_str()))
                                }
                                Recovery::Substitute(_) => {}
                            },
                            None => return Err(Error::spurious_key(key_name, info.name.as_str())),
                        },
                    }
                }
                Ok(Some(instance))
            }
        }
    }

    fn decode_enum(
        &self,
        info: &Arc<TypeInfo>,
        shape: &EnumShape,
        value: &Value,
    ) -> Result<Instance> {
        let code = match value {
            Value::Number(n) => n
                .as_i64()
                .ok_or_else(|| Error::conversion(info.name.clone(), "a fractional number"))?,
            Value::String(token) => self
                .enum_code(info, shape, token)
                .ok_or_else(|| Error::unknown_variant(info.name.as_str(), token))?,
            other => return Err(Error::conversion(info.name.clone(), other.kind())),
        };
        (shape.from_code)(code)
            .ok_or_else(|| Error::unknown_variant(info.name.as_str(), code.to_string()))
    }

    /// Token → variant code, memoized. Accepts a numeric token or a variant
    /// name matched case-insensitively after stripping dashes.
    fn enum_code(&self, info: &Arc<TypeInfo>, shape: &EnumShape, token: &str) -> Option<i64> {
        let cache_key = (info.id, token.to_string());
        if let Some(cached) = self.enum_cache.borrow().get(&cache_key) {
            return *cached;
        }
        let code = token.parse::<i64>().ok().or_else(|| {
            let normalized = normalize_variant(token);
            shape
                .variants
                .iter()
                .find(|variant| normalize_variant(variant.name) == normalized)
                .map(|variant| variant.code)
        });
        self.enum_cache.borrow_mut().insert(cache_key, code);
        code
    }

    fn recover(&self, err: Error, value: &Value) -> Result<Option<Instance>> {
        match &self.options.on_error {
            Some(hook) => match hook(&err, value) {
                Recovery::Raise => Err(err),
                Recovery::Substitute(substitute) => Ok(substitute),
            },
            None => Err(err),
        }
    }
}

fn number_instance(number: crate::Number) -> Instance {
    match number {
        crate::Number::Int(i) => Box::new(i),
        crate::Number::UInt(u) => Box::new(u),
        crate::Number::Float(f) => Box::new(f),
    }
}

/// Lowercases and strips dashes, the normalization applied to both variant
/// names and incoming tokens.
fn normalize_variant(name: &str) -> String {
    name.chars()
        .filter(|ch| *ch != '-')
        .flat_map(char::to_lowercase)
        .collect()
}
