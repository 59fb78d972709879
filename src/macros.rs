/// Builds a [`Value`](crate::Value) tree from a JSON-like literal.
///
/// # Examples
///
/// ```rust
/// use brack::{brack, to_text};
///
/// let value = brack!({
///     "name": "Dennis",
///     "age": 37,
///     "tags": ["npc", "old"]
/// });
/// assert_eq!(to_text(&value).unwrap(), "{name Dennis age 37 tags [npc old]}");
/// ```
#[macro_export]
macro_rules! brack {
    // Handle null
    (null) => {
        $crate::Value::Null
    };

    // Handle true
    (true) => {
        $crate::Value::Bool(true)
    };

    // Handle false
    (false) => {
        $crate::Value::Bool(false)
    };

    // Handle empty list
    ([]) => {
        $crate::Value::List(vec![])
    };

    // Handle non-empty list
    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::List(vec![$($crate::brack!($elem)),*])
    };

    // Handle empty map
    ({}) => {
        $crate::Value::Map($crate::ValueMap::new())
    };

    // Handle non-empty map
    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut map = $crate::ValueMap::new();
        $(
            map.insert($crate::Key::from($key), $crate::brack!($value));
        )*
        $crate::Value::Map(map)
    }};

    // Fallback for any expression with a `Value` conversion
    ($other:expr) => {
        $crate::Value::from($other)
    };
}

/// Builds a [`TypeInfo`](crate::introspect::TypeInfo) descriptor for a plain
/// struct, listing its serializable fields and their declared types.
///
/// The struct must implement `Default` and `Clone`, and every listed field
/// type must itself be describable (registered separately).
///
/// # Examples
///
/// ```rust
/// use brack::describe_struct;
///
/// #[derive(Clone, Default)]
/// struct Monster {
///     name: String,
///     health: i32,
/// }
///
/// let info = describe_struct!(Monster, "Monster", {
///     name: String,
///     health: i32,
/// });
/// assert_eq!(info.name, "Monster");
/// ```
#[macro_export]
macro_rules! describe_struct {
    ($ty:ident, $name:expr, { $($field:ident : $fty:ty),* $(,)? }) => {
        $crate::introspect::TypeInfo::structure(
            $name,
            ::std::any::TypeId::of::<$ty>(),
            || ::std::boxed::Box::new(<$ty as ::std::default::Default>::default()),
            vec![
                $(
                    $crate::introspect::Member {
                        name: stringify!($field),
                        type_id: ::std::any::TypeId::of::<$fty>(),
                        get: |instance| {
                            let concrete = $crate::introspect::downcast_ref::<$ty>(instance)?;
                            ::std::result::Result::Ok(
                                ::std::boxed::Box::new(concrete.$field.clone())
                                    as $crate::introspect::Instance,
                            )
                        },
                        set: |instance, value| {
                            let concrete = $crate::introspect::downcast_mut::<$ty>(instance)?;
                            concrete.$field = $crate::introspect::take::<$fty>(value)?;
                            ::std::result::Result::Ok(())
                        },
                    }
                ),*
            ],
        )
    };
}

/// Builds a [`TypeInfo`](crate::introspect::TypeInfo) descriptor for a
/// fieldless enum, listing every variant with its numeric code.
///
/// The enum must implement `Default` and `Clone`, and all variants must be
/// listed.
///
/// # Examples
///
/// ```rust
/// use brack::describe_enum;
///
/// #[derive(Clone, Copy, Default, PartialEq, Debug)]
/// enum Quality {
///     #[default]
///     Poor,
///     Good,
///     FortyTwo,
/// }
///
/// let info = describe_enum!(Quality, "Quality", {
///     Poor = 0,
///     Good = 1,
///     FortyTwo = 42,
/// });
/// assert_eq!(info.name, "Quality");
/// ```
#[macro_export]
macro_rules! describe_enum {
    ($ty:ident, $name:expr, { $($variant:ident = $code:expr),* $(,)? }) => {
        $crate::introspect::TypeInfo::enumeration(
            $name,
            ::std::any::TypeId::of::<$ty>(),
            || ::std::boxed::Box::new(<$ty as ::std::default::Default>::default()),
            vec![
                $(
                    $crate::introspect::EnumVariant {
                        name: stringify!($variant),
                        code: $code as i64,
                    }
                ),*
            ],
            |instance| {
                let concrete = $crate::introspect::downcast_ref::<$ty>(instance)?;
                ::std::result::Result::Ok(match concrete {
                    $($ty::$variant => ($code as i64, stringify!($variant))),*
                })
            },
            |code| {
                $(
                    if code == $code as i64 {
                        return ::std::option::Option::Some(
                            ::std::boxed::Box::new($ty::$variant)
                                as $crate::introspect::Instance,
                        );
                    }
                )*
                ::std::option::Option::None
            },
        )
    };
}
