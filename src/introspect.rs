//! Type introspection for the object codec.
//!
//! This module provides the capability the codec uses to walk typed
//! instances without knowing their concrete types at compile time:
//!
//! - [`Reflected`] / [`Instance`]: a clonable `Any`, the codec's universal
//!   handle to a host value
//! - [`Scalar`]: the leaf coercion table between host scalars and [`Value`]
//! - [`TypeInfo`] / [`Shape`]: a per-type descriptor carrying the type's
//!   name, default constructor and member/element accessors
//!
//! Descriptors for composites are normally built with the
//! [`describe_struct!`](crate::describe_struct) and
//! [`describe_enum!`](crate::describe_enum) macros; the constructors on
//! [`TypeInfo`] cover scalars and containers.
//!
//! ## Examples
//!
//! ```rust
//! use brack::introspect::TypeInfo;
//!
//! let info = TypeInfo::scalar::<i32>("Int32");
//! let default = info.default_instance();
//! assert_eq!(default.as_any().downcast_ref::<i32>(), Some(&0));
//! ```

use crate::{Error, Result, Value};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use std::any::{Any, TypeId};

/// A clonable, dynamically-typed host value.
///
/// Blanket-implemented for every `T: Any + Clone`, so any ordinary owned
/// type can travel through the codec as an [`Instance`].
pub trait Reflected: Any {
    fn clone_boxed(&self) -> Instance;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T: Any + Clone> Reflected for T {
    fn clone_boxed(&self) -> Instance {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// An owned, dynamically-typed host value.
pub type Instance = Box<dyn Reflected>;

impl Clone for Instance {
    fn clone(&self) -> Self {
        (**self).clone_boxed()
    }
}

/// Borrows the concrete `T` behind a reflected handle.
pub fn downcast_ref<T: Any>(instance: &dyn Reflected) -> Result<&T> {
    instance.as_any().downcast_ref::<T>().ok_or_else(|| {
        Error::shape_mismatch(std::any::type_name::<T>(), "a different concrete type")
    })
}

/// Mutably borrows the concrete `T` behind a reflected handle.
pub fn downcast_mut<T: Any>(instance: &mut dyn Reflected) -> Result<&mut T> {
    instance.as_any_mut().downcast_mut::<T>().ok_or_else(|| {
        Error::shape_mismatch(std::any::type_name::<T>(), "a different concrete type")
    })
}

/// Unboxes an [`Instance`] into the concrete `T`.
pub fn take<T: Any>(instance: Instance) -> Result<T> {
    instance
        .into_any()
        .downcast::<T>()
        .map(|boxed| *boxed)
        .map_err(|_| Error::shape_mismatch(std::any::type_name::<T>(), "a different concrete type"))
}

/// A leaf type with a direct two-way coercion to [`Value`].
///
/// The implementations below form the codec's coercion table: booleans map
/// to `Bool`, integer widths to integer numbers, floats to doubles,
/// characters and text to `String`, and timestamps to their millisecond
/// encoding.
pub trait Scalar: Any + Clone {
    /// Short name used in diagnostics.
    fn kind_name() -> &'static str;
    /// The value used where a default instance is needed.
    fn scalar_default() -> Self;
    fn encode(&self) -> Value;
    fn decode(value: &Value) -> Result<Self>;
}

impl Scalar for bool {
    fn kind_name() -> &'static str {
        "bool"
    }

    fn scalar_default() -> Self {
        false
    }

    fn encode(&self) -> Value {
        Value::Bool(*self)
    }

    fn decode(value: &Value) -> Result<Self> {
        value
            .as_bool()
            .ok_or_else(|| Error::conversion("bool", value.kind()))
    }
}

macro_rules! scalar_signed {
    ($($ty:ty => $name:literal),*) => {$(
        impl Scalar for $ty {
            fn kind_name() -> &'static str {
                $name
            }

            fn scalar_default() -> Self {
                0
            }

            fn encode(&self) -> Value {
                Value::from(*self as i64)
            }

            fn decode(value: &Value) -> Result<Self> {
                value
                    .as_i64()
                    .and_then(|i| <$ty>::try_from(i).ok())
                    .ok_or_else(|| Error::conversion($name, value.kind()))
            }
        }
    )*};
}

macro_rules! scalar_unsigned {
    ($($ty:ty => $name:literal),*) => {$(
        impl Scalar for $ty {
            fn kind_name() -> &'static str {
                $name
            }

            fn scalar_default() -> Self {
                0
            }

            fn encode(&self) -> Value {
                Value::from(*self as u64)
            }

            fn decode(value: &Value) -> Result<Self> {
                value
                    .as_u64()
                    .and_then(|u| <$ty>::try_from(u).ok())
                    .ok_or_else(|| Error::conversion($name, value.kind()))
            }
        }
    )*};
}

scalar_signed!(i8 => "i8", i16 => "i16", i32 => "i32", i64 => "i64");
scalar_unsigned!(u8 => "u8", u16 => "u16", u32 => "u32", u64 => "u64");

macro_rules! scalar_float {
    ($($ty:ty => $name:literal),*) => {$(
        impl Scalar for $ty {
            fn kind_name() -> &'static str {
                $name
            }

            fn scalar_default() -> Self {
                0.0
            }

            fn encode(&self) -> Value {
                Value::from(*self as f64)
            }

            fn decode(value: &Value) -> Result<Self> {
                value
                    .as_f64()
                    .map(|f| f as $ty)
                    .ok_or_else(|| Error::conversion($name, value.kind()))
            }
        }
    )*};
}

scalar_float!(f32 => "f32", f64 => "f64");

impl Scalar for char {
    fn kind_name() -> &'static str {
        "char"
    }

    fn scalar_default() -> Self {
        '\0'
    }

    fn encode(&self) -> Value {
        Value::String(self.to_string())
    }

    fn decode(value: &Value) -> Result<Self> {
        let s = value
            .as_str()
            .ok_or_else(|| Error::conversion("char", value.kind()))?;
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => Ok(ch),
            _ => Err(Error::conversion("char", "a multi-character string")),
        }
    }
}

impl Scalar for String {
    fn kind_name() -> &'static str {
        "string"
    }

    fn scalar_default() -> Self {
        String::new()
    }

    fn encode(&self) -> Value {
        Value::String(self.clone())
    }

    fn decode(value: &Value) -> Result<Self> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| Error::conversion("string", value.kind()))
    }
}

/// Timestamps travel as their millisecond offset from the Unix epoch.
impl Scalar for DateTime<Utc> {
    fn kind_name() -> &'static str {
        "timestamp"
    }

    fn scalar_default() -> Self {
        DateTime::UNIX_EPOCH
    }

    fn encode(&self) -> Value {
        Value::from(self.timestamp_millis())
    }

    fn decode(value: &Value) -> Result<Self> {
        value
            .as_i64()
            .and_then(DateTime::from_timestamp_millis)
            .ok_or_else(|| Error::conversion("timestamp", value.kind()))
    }
}

/// Descriptor for one host type.
///
/// Carries the type's identity, registered name, structural [`Shape`] and a
/// default constructor. Built via the constructors below or the descriptor
/// macros, then handed to a [`TypeRegistry`](crate::TypeRegistry).
pub struct TypeInfo {
    pub id: TypeId,
    pub name: String,
    pub shape: Shape,
    default: fn() -> Instance,
}

/// The structural category of a described type, with accessors the codec
/// uses to read and build instances.
pub enum Shape {
    Scalar(ScalarShape),
    Nullable(NullableShape),
    Enum(EnumShape),
    List(ListShape),
    Map(MapShape),
    Struct(StructShape),
}

impl Shape {
    /// Short category name, used in diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Shape::Scalar(_) => "scalar",
            Shape::Nullable(_) => "nullable",
            Shape::Enum(_) => "enum",
            Shape::List(_) => "list",
            Shape::Map(_) => "map",
            Shape::Struct(_) => "struct",
        }
    }
}

pub struct ScalarShape {
    pub encode: fn(&dyn Reflected) -> Result<Value>,
    pub decode: fn(&Value) -> Result<Instance>,
}

pub struct NullableShape {
    /// The wrapped type.
    pub inner: TypeId,
    /// Clones the wrapped value out, or returns `None`.
    pub get: fn(&dyn Reflected) -> Result<Option<Instance>>,
    /// Wraps a decoded value (or its absence) back up.
    pub make: fn(Option<Instance>) -> Result<Instance>,
}

pub struct EnumVariant {
    pub name: &'static str,
    pub code: i64,
}

pub struct EnumShape {
    pub variants: Vec<EnumVariant>,
    /// Returns the numeric code and declared name of an instance's variant.
    pub tag_of: fn(&dyn Reflected) -> Result<(i64, &'static str)>,
    pub from_code: fn(i64) -> Option<Instance>,
}

pub struct ListShape {
    /// Element type; `None` for a polymorphic list whose elements travel
    /// with individual type tags.
    pub element: Option<TypeId>,
    pub items: fn(&dyn Reflected) -> Result<Vec<Instance>>,
    pub build: fn(Vec<Instance>) -> Result<Instance>,
}

pub struct MapShape {
    pub key: TypeId,
    pub value: TypeId,
    /// Entries in iteration order, keys already encoded as scalars.
    pub entries: fn(&dyn Reflected) -> Result<Vec<(Value, Instance)>>,
    pub build: fn(Vec<(Value, Instance)>) -> Result<Instance>,
}

/// One named, typed, gettable/settable data member of a struct.
pub struct Member {
    pub name: &'static str,
    pub type_id: TypeId,
    pub get: fn(&dyn Reflected) -> Result<Instance>,
    pub set: fn(&mut dyn Reflected, Instance) -> Result<()>,
}

pub struct StructShape {
    pub members: Vec<Member>,
}

impl TypeInfo {
    /// Constructs a fresh default instance of the described type.
    #[must_use]
    pub fn default_instance(&self) -> Instance {
        (self.default)()
    }

    /// Describes a leaf scalar type.
    #[must_use]
    pub fn scalar<T: Scalar>(name: impl Into<String>) -> Self {
        TypeInfo {
            id: TypeId::of::<T>(),
            name: name.into(),
            shape: Shape::Scalar(ScalarShape {
                encode: |instance| Ok(downcast_ref::<T>(instance)?.encode()),
                decode: |value| T::decode(value).map(|scalar| Box::new(scalar) as Instance),
            }),
            default: || Box::new(T::scalar_default()),
        }
    }

    /// Describes `Option<T>` for an already-describable `T`.
    #[must_use]
    pub fn nullable<T: Any + Clone>(name: impl Into<String>) -> Self {
        TypeInfo {
            id: TypeId::of::<Option<T>>(),
            name: name.into(),
            shape: Shape::Nullable(NullableShape {
                inner: TypeId::of::<T>(),
                get: |instance| {
                    Ok(downcast_ref::<Option<T>>(instance)?
                        .as_ref()
                        .map(|inner| Box::new(inner.clone()) as Instance))
                },
                make: |inner| match inner {
                    Some(instance) => Ok(Box::new(Some(take::<T>(instance)?)) as Instance),
                    None => Ok(Box::new(None::<T>) as Instance),
                },
            }),
            default: || Box::new(None::<T>),
        }
    }

    /// Describes `Vec<T>` with a fixed element type.
    #[must_use]
    pub fn list_of<T: Any + Clone>(name: impl Into<String>) -> Self {
        TypeInfo {
            id: TypeId::of::<Vec<T>>(),
            name: name.into(),
            shape: Shape::List(ListShape {
                element: Some(TypeId::of::<T>()),
                items: |instance| {
                    Ok(downcast_ref::<Vec<T>>(instance)?
                        .iter()
                        .map(|element| Box::new(element.clone()) as Instance)
                        .collect())
                },
                build: |items| {
                    let mut list = Vec::with_capacity(items.len());
                    for item in items {
                        list.push(take::<T>(item)?);
                    }
                    Ok(Box::new(list) as Instance)
                },
            }),
            default: || Box::new(Vec::<T>::new()),
        }
    }

    /// Describes `Vec<Instance>`, a polymorphic list whose elements carry
    /// their own type tags in serialized form.
    #[must_use]
    pub fn dynamic_list(name: impl Into<String>) -> Self {
        TypeInfo {
            id: TypeId::of::<Vec<Instance>>(),
            name: name.into(),
            shape: Shape::List(ListShape {
                element: None,
                items: |instance| Ok(downcast_ref::<Vec<Instance>>(instance)?.clone()),
                build: |items| Ok(Box::new(items) as Instance),
            }),
            default: || Box::new(Vec::<Instance>::new()),
        }
    }

    /// Describes `IndexMap<K, V>` with a scalar key type.
    #[must_use]
    pub fn map_of<K, V>(name: impl Into<String>) -> Self
    where
        K: Scalar + std::hash::Hash + Eq,
        V: Any + Clone,
    {
        TypeInfo {
            id: TypeId::of::<IndexMap<K, V>>(),
            name: name.into(),
            shape: Shape::Map(MapShape {
                key: TypeId::of::<K>(),
                value: TypeId::of::<V>(),
                entries: |instance| {
                    Ok(downcast_ref::<IndexMap<K, V>>(instance)?
                        .iter()
                        .map(|(key, value)| (key.encode(), Box::new(value.clone()) as Instance))
                        .collect())
                },
                build: |entries| {
                    let mut map = IndexMap::with_capacity(entries.len());
                    for (key, value) in entries {
                        map.insert(K::decode(&key)?, take::<V>(value)?);
                    }
                    Ok(Box::new(map) as Instance)
                },
            }),
            default: || Box::new(IndexMap::<K, V>::new()),
        }
    }

    /// Describes a plain struct from its members. Normally built via
    /// [`describe_struct!`](crate::describe_struct).
    #[must_use]
    pub fn structure(
        name: impl Into<String>,
        id: TypeId,
        default: fn() -> Instance,
        members: Vec<Member>,
    ) -> Self {
        TypeInfo {
            id,
            name: name.into(),
            shape: Shape::Struct(StructShape { members }),
            default,
        }
    }

    /// Describes a fieldless enum from its variants. Normally built via
    /// [`describe_enum!`](crate::describe_enum).
    #[must_use]
    pub fn enumeration(
        name: impl Into<String>,
        id: TypeId,
        default: fn() -> Instance,
        variants: Vec<EnumVariant>,
        tag_of: fn(&dyn Reflected) -> Result<(i64, &'static str)>,
        from_code: fn(i64) -> Option<Instance>,
    ) -> Self {
        TypeInfo {
            id,
            name: name.into(),
            shape: Shape::Enum(EnumShape {
                variants,
                tag_of,
                from_code,
            }),
            default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{downcast_ref, take, Instance, Scalar, Shape, TypeInfo};
    use crate::Value;
    use chrono::{DateTime, Utc};
    use indexmap::IndexMap;
    use std::any::TypeId;

    #[test]
    fn test_instance_clone_preserves_type() {
        let instance: Instance = Box::new(42i32);
        let copy = instance.clone();
        assert_eq!(copy.as_any().downcast_ref::<i32>(), Some(&42));
    }

    #[test]
    fn test_downcast_and_take() {
        let instance: Instance = Box::new(String::from("hello"));
        assert_eq!(
            downcast_ref::<String>(&*instance).unwrap(),
            &String::from("hello")
        );
        assert!(downcast_ref::<i32>(&*instance).is_err());
        assert_eq!(take::<String>(instance).unwrap(), "hello");
    }

    #[test]
    fn test_scalar_coercions() {
        assert_eq!(37i32.encode(), Value::from(37));
        assert_eq!(i32::decode(&Value::from(37)).unwrap(), 37);
        assert!(u8::decode(&Value::from(300)).is_err());
        assert!(i32::decode(&Value::from("nope")).is_err());
        assert_eq!(char::decode(&Value::from("x")).unwrap(), 'x');
        assert!(char::decode(&Value::from("xy")).is_err());
        assert_eq!(f32::decode(&Value::from(1.5)).unwrap(), 1.5);
    }

    #[test]
    fn test_timestamp_roundtrip() {
        let instant = DateTime::from_timestamp_millis(1_700_000_000_123).unwrap();
        assert_eq!(instant.encode(), Value::from(1_700_000_000_123i64));
        assert_eq!(
            <DateTime<Utc> as Scalar>::decode(&instant.encode()).unwrap(),
            instant
        );
    }

    #[test]
    fn test_scalar_info() {
        let info = TypeInfo::scalar::<i64>("Int64");
        assert_eq!(info.id, TypeId::of::<i64>());
        match &info.shape {
            Shape::Scalar(shape) => {
                let instance = info.default_instance();
                assert_eq!((shape.encode)(&*instance).unwrap(), Value::from(0));
            }
            _ => panic!("expected scalar shape"),
        }
    }

    #[test]
    fn test_nullable_info() {
        let info = TypeInfo::nullable::<i32>("MaybeInt");
        match &info.shape {
            Shape::Nullable(shape) => {
                let none = info.default_instance();
                assert!((shape.get)(&*none).unwrap().is_none());
                let some = (shape.make)(Some(Box::new(5i32))).unwrap();
                assert_eq!(
                    some.as_any().downcast_ref::<Option<i32>>(),
                    Some(&Some(5))
                );
            }
            _ => panic!("expected nullable shape"),
        }
    }

    #[test]
    fn test_list_info_rebuilds() {
        let info = TypeInfo::list_of::<i32>("IntList");
        match &info.shape {
            Shape::List(shape) => {
                let original: Instance = Box::new(vec![1i32, 2, 3]);
                let items = (shape.items)(&*original).unwrap();
                assert_eq!(items.len(), 3);
                let rebuilt = (shape.build)(items).unwrap();
                assert_eq!(
                    rebuilt.as_any().downcast_ref::<Vec<i32>>(),
                    Some(&vec![1, 2, 3])
                );
            }
            _ => panic!("expected list shape"),
        }
    }

    #[test]
    fn test_map_info_rebuilds() {
        let info = TypeInfo::map_of::<String, i32>("Counts");
        match &info.shape {
            Shape::Map(shape) => {
                let mut map = IndexMap::new();
                map.insert(String::from("a"), 1i32);
                let original: Instance = Box::new(map);
                let entries = (shape.entries)(&*original).unwrap();
                assert_eq!(entries[0].0, Value::from("a"));
                let rebuilt = (shape.build)(entries).unwrap();
                let rebuilt = rebuilt.as_any().downcast_ref::<IndexMap<String, i32>>();
                assert_eq!(rebuilt.and_then(|m| m.get("a")), Some(&1));
            }
            _ => panic!("expected map shape"),
        }
    }
}
