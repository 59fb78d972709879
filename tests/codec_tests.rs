//! End-to-end tests for the object codec: registry resolution, round trips,
//! enum normalization, skip-default elision and error recovery.

use brack::introspect::{downcast_ref, Instance, TypeInfo};
use brack::{
    brack, deep_eq, describe_enum, describe_struct, parse, to_text, Codec, CodecHook,
    CodecOptions, EnumEncoding, Error, Recovery, TypeRegistry, Value,
};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use std::sync::{Arc, Mutex};

#[derive(Clone, Copy, Default, PartialEq, Debug)]
enum Quality {
    #[default]
    Poor,
    Good,
    FortyTwo,
}

#[derive(Clone, Default, PartialEq, Debug)]
struct Sprite {
    frame_count: i32,
    frame_types: Vec<i32>,
}

#[derive(Clone, Default, PartialEq, Debug)]
struct Sword {
    damage: i32,
}

#[derive(Clone, Default, PartialEq, Debug)]
struct Shield {
    block: i32,
}

#[derive(Clone, Default)]
struct Monster {
    name: String,
    health: i32,
    quality: Quality,
    nickname: Option<String>,
    sprite: Sprite,
    stats: IndexMap<String, i32>,
    inventory: Vec<Instance>,
    seen: DateTime<Utc>,
}

fn registry() -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    registry.register(TypeInfo::scalar::<bool>("Bool"));
    registry.register(TypeInfo::scalar::<i32>("Int32"));
    registry.register(TypeInfo::scalar::<i64>("Int64"));
    registry.register(TypeInfo::scalar::<f64>("Double"));
    registry.register(TypeInfo::scalar::<String>("String"));
    registry.register(TypeInfo::scalar::<DateTime<Utc>>("Timestamp"));
    registry.register(TypeInfo::nullable::<String>("MaybeString"));
    registry.register(TypeInfo::list_of::<i32>("Int32List"));
    registry.register(TypeInfo::dynamic_list("Game.ItemList"));
    registry.register(TypeInfo::map_of::<String, i32>("Game.StatBlock"));
    registry.register(describe_enum!(Quality, "Game.Quality", {
        Poor = 0,
        Good = 1,
        FortyTwo = 42,
    }));
    registry.register(describe_struct!(Sprite, "Game.Sprite", {
        frame_count: i32,
        frame_types: Vec<i32>,
    }));
    registry.register(describe_struct!(Sword, "Game.Sword", { damage: i32 }));
    registry.register(describe_struct!(Shield, "Game.Shield", { block: i32 }));
    registry.register(describe_struct!(Monster, "Game.Monster", {
        name: String,
        health: i32,
        quality: Quality,
        nickname: Option<String>,
        sprite: Sprite,
        stats: IndexMap<String, i32>,
        inventory: Vec<Instance>,
        seen: DateTime<Utc>,
    }));
    registry.add_namespace("Game", '.');
    registry
}

fn codec() -> Codec {
    Codec::new(Arc::new(registry()), CodecOptions::new())
}

fn sample_monster() -> Monster {
    let mut stats = IndexMap::new();
    stats.insert(String::from("strength"), 12);
    stats.insert(String::from("speed"), 7);
    Monster {
        name: String::from("Dennis"),
        health: 37,
        quality: Quality::FortyTwo,
        nickname: Some(String::from("Den")),
        sprite: Sprite {
            frame_count: 3,
            frame_types: vec![1, 3, 5],
        },
        stats,
        inventory: vec![
            Box::new(Sword { damage: 9 }),
            Box::new(Shield { block: 4 }),
        ],
        seen: DateTime::from_timestamp_millis(1_700_000_000_000).unwrap(),
    }
}

#[test]
fn test_composite_round_trip() {
    let codec = codec();
    let monster = sample_monster();

    let value = codec.serialize(&monster, true).unwrap();
    let restored: Monster = codec.deserialize_as(&value).unwrap().unwrap();

    assert!(deep_eq(&monster, &restored, codec.registry()).unwrap());
}

#[test]
fn test_round_trip_through_text() {
    let codec = codec();
    let monster = sample_monster();

    let text = to_text(&codec.serialize(&monster, true).unwrap()).unwrap();
    let restored: Monster = codec.deserialize_as(&parse(&text).unwrap()).unwrap().unwrap();

    assert!(deep_eq(&monster, &restored, codec.registry()).unwrap());
}

#[test]
fn test_clone_instance() {
    let codec = codec();
    let monster = sample_monster();

    let copy = codec.clone_instance(&monster).unwrap();
    assert!(deep_eq(&monster, copy.as_ref(), codec.registry()).unwrap());
}

#[test]
fn test_type_tag_is_shortened() {
    let codec = codec();
    let value = codec.serialize(&Sword { damage: 1 }, true).unwrap();
    assert_eq!(
        value.as_map().unwrap().get_str("#type"),
        Some(&Value::from("Sword"))
    );
}

#[test]
fn test_polymorphic_elements_carry_tags() {
    let codec = codec();
    let value = codec.serialize(&sample_monster(), false).unwrap();
    let inventory = value
        .as_map()
        .unwrap()
        .get_str("inventory")
        .and_then(|v| v.as_list())
        .unwrap();
    assert_eq!(
        inventory[0].as_map().unwrap().get_str("#type"),
        Some(&Value::from("Sword"))
    );
    assert_eq!(
        inventory[1].as_map().unwrap().get_str("#type"),
        Some(&Value::from("Shield"))
    );
}

#[test]
fn test_tag_resolution_through_namespace_and_shorthand() {
    let codec = codec();
    for tag in ["Game.Sword", "Sword", "sword"] {
        let value = brack!({ "#type": (tag), "damage": 5 });
        let instance = codec.deserialize(&value, None).unwrap().unwrap();
        let sword = downcast_ref::<Sword>(instance.as_ref()).unwrap();
        assert_eq!(sword.damage, 5, "failed for tag {:?}", tag);
    }
}

#[test]
fn test_enum_normalization() {
    let codec = codec();
    for token in [
        Value::from(42),
        Value::from("42"),
        Value::from("FortyTwo"),
        Value::from("forty-two"),
        Value::from("fortytwo"),
        Value::from("FORTY-TWO"),
    ] {
        let quality: Quality = codec.deserialize_as(&token).unwrap().unwrap();
        assert_eq!(quality, Quality::FortyTwo, "failed for {:?}", token);
    }
}

#[test]
fn test_enum_encoding_modes() {
    let as_code = codec();
    assert_eq!(
        as_code.serialize(&Quality::Good, false).unwrap(),
        Value::from(1)
    );

    let as_name = Codec::new(
        Arc::new(registry()),
        CodecOptions::new().with_enum_encoding(EnumEncoding::AsLowerName),
    );
    let value = as_name.serialize(&Quality::FortyTwo, false).unwrap();
    assert_eq!(value, Value::from("fortytwo"));
    // Lower-name output feeds straight back through normalization.
    let quality: Quality = as_name.deserialize_as(&value).unwrap().unwrap();
    assert_eq!(quality, Quality::FortyTwo);
}

#[test]
fn test_unknown_variant_is_an_error() {
    let codec = codec();
    let result = codec.deserialize_as::<Quality>(&Value::from("legendary"));
    assert!(matches!(result, Err(Error::UnknownVariant { .. })));
}

#[test]
fn test_skip_defaults_elides_members() {
    let codec = codec();
    let sprite = Sprite {
        frame_count: 0,
        frame_types: vec![2],
    };
    let value = codec.serialize(&sprite, false).unwrap();
    let map = value.as_map().unwrap();
    // frame_count is at its default and is omitted entirely.
    assert!(map.get_str("frame_count").is_none());
    assert_eq!(map.get_str("frame_types"), Some(&brack!([2])));

    let verbose = Codec::new(
        Arc::new(registry()),
        CodecOptions::new().with_skip_defaults(false),
    );
    let value = verbose.serialize(&sprite, false).unwrap();
    assert_eq!(
        value.as_map().unwrap().get_str("frame_count"),
        Some(&Value::from(0))
    );
}

#[test]
fn test_skip_default_neutrality() {
    let lean = codec();
    let verbose = Codec::new(
        Arc::new(registry()),
        CodecOptions::new().with_skip_defaults(false),
    );
    let monster = sample_monster();

    let from_lean: Monster = lean
        .deserialize_as(&lean.serialize(&monster, false).unwrap())
        .unwrap()
        .unwrap();
    let from_verbose: Monster = verbose
        .deserialize_as(&verbose.serialize(&monster, false).unwrap())
        .unwrap()
        .unwrap();

    assert!(deep_eq(&from_lean, &from_verbose, lean.registry()).unwrap());
}

#[test]
fn test_spurious_key_raises_by_default() {
    let codec = codec();
    let value = brack!({ "damage": 5, "bogus": 1 });
    let result = codec.deserialize_as::<Sword>(&value);
    match result {
        Err(Error::SpuriousKey { key, .. }) => assert_eq!(key, "bogus"),
        other => panic!("expected a spurious key error, got {:?}", other),
    }
}

#[test]
fn test_spurious_key_callback_sees_exactly_the_injected_key() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let options = CodecOptions::new().with_on_spurious_key(Arc::new(move |key, _type_name| {
        sink.lock().unwrap().push(key.to_string());
        Recovery::Substitute(None)
    }));
    let codec = Codec::new(Arc::new(registry()), options);

    let mut value = codec.serialize(&sample_monster(), false).unwrap();
    if let Value::Map(map) = &mut value {
        map.insert("unexpected", 1);
    }
    let restored = codec.deserialize_as::<Monster>(&value).unwrap();
    assert!(restored.is_some());
    assert_eq!(*seen.lock().unwrap(), vec![String::from("unexpected")]);
}

#[test]
fn test_unknown_type_callback_substitutes() {
    let options = CodecOptions::new()
        .with_on_unknown_type(Arc::new(|_name, _value| Recovery::Substitute(None)));
    let codec = Codec::new(Arc::new(registry()), options);

    let value = brack!({ "#type": "NoSuchThing", "x": 1 });
    assert!(codec.deserialize(&value, None).unwrap().is_none());

    // Without the callback the same input raises.
    let strict = Codec::new(Arc::new(registry()), CodecOptions::new());
    assert!(matches!(
        strict.deserialize(&value, None),
        Err(Error::UnknownType(_))
    ));
}

#[test]
fn test_shape_mismatch_routes_through_error_callback() {
    let options = CodecOptions::new()
        .with_on_error(Arc::new(|_err, _value| Recovery::Substitute(None)));
    let codec = Codec::new(Arc::new(registry()), options);

    // A list where a struct is expected.
    let result = codec.deserialize_as::<Sprite>(&brack!([1, 2])).unwrap();
    assert!(result.is_none());

    let strict = codec_strict();
    assert!(matches!(
        strict.deserialize_as::<Sprite>(&brack!([1, 2])),
        Err(Error::ShapeMismatch { .. })
    ));
}

fn codec_strict() -> Codec {
    Codec::new(Arc::new(registry()), CodecOptions::new())
}

#[test]
fn test_custom_tag_key() {
    let options = CodecOptions::new().with_type_tag_key("$kind");
    let codec = Codec::new(Arc::new(registry()), options);

    let value = codec.serialize(&Shield { block: 2 }, true).unwrap();
    assert_eq!(
        value.as_map().unwrap().get_str("$kind"),
        Some(&Value::from("Shield"))
    );
    let shield: Shield = codec.deserialize_as(&value).unwrap().unwrap();
    assert_eq!(shield, Shield { block: 2 });
}

#[test]
fn test_custom_hook_round_trip() {
    let mut codec = codec_strict();
    // Store sprites as a compact [count types...] list instead of a map.
    codec.register_hook::<Sprite>(CodecHook {
        encode: Some(Arc::new(|_codec, instance| {
            let sprite = downcast_ref::<Sprite>(instance)?;
            let mut list = vec![Value::from(sprite.frame_count)];
            list.extend(sprite.frame_types.iter().map(|t| Value::from(*t)));
            Ok(Value::List(list))
        })),
        decode: Some(Arc::new(|_codec, value| {
            let list = value
                .as_list()
                .ok_or_else(|| Error::shape_mismatch("Sprite", value.kind()))?;
            let frame_count = list
                .first()
                .and_then(Value::as_i64)
                .ok_or_else(|| Error::custom("missing frame count"))?;
            let frame_types = list[1..]
                .iter()
                .filter_map(Value::as_i64)
                .map(|t| t as i32)
                .collect();
            Ok(Some(Box::new(Sprite {
                frame_count: frame_count as i32,
                frame_types,
            }) as Instance))
        })),
        factory: None,
    });

    let sprite = Sprite {
        frame_count: 2,
        frame_types: vec![4, 6],
    };
    let value = codec.serialize(&sprite, false).unwrap();
    assert_eq!(value, brack!([2, 4, 6]));
    let restored: Sprite = codec.deserialize_as(&value).unwrap().unwrap();
    assert_eq!(restored, sprite);
}

#[test]
fn test_factory_hook_is_used() {
    let mut codec = codec_strict();
    codec.register_hook::<Sword>(CodecHook {
        encode: None,
        decode: None,
        factory: Some(Arc::new(|| {
            Box::new(Sword { damage: 100 }) as Instance
        })),
    });

    // The factory seeds the instance; absent keys keep its values.
    let sword: Sword = codec.deserialize_as(&brack!({})).unwrap().unwrap();
    assert_eq!(sword.damage, 100);
}

#[test]
fn test_timestamp_member_round_trip() {
    let codec = codec_strict();
    let monster = sample_monster();
    let value = codec.serialize(&monster, false).unwrap();
    assert_eq!(
        value.as_map().unwrap().get_str("seen"),
        Some(&Value::from(1_700_000_000_000i64))
    );
}

#[test]
fn test_map_member_round_trip() {
    let codec = codec_strict();
    let value = codec.serialize(&sample_monster(), false).unwrap();
    let stats = value.as_map().unwrap().get_str("stats").unwrap();
    assert_eq!(stats, &brack!({ "strength": 12, "speed": 7 }));

    let restored: IndexMap<String, i32> = codec.deserialize_as(stats).unwrap().unwrap();
    assert_eq!(restored.get("speed"), Some(&7));
}

#[test]
fn test_null_member_leaves_default() {
    let codec = codec_strict();
    let value = brack!({ "damage": null });
    let sword: Sword = codec.deserialize_as(&value).unwrap().unwrap();
    assert_eq!(sword.damage, 0);
}

#[test]
fn test_nullable_member() {
    let codec = codec_strict();
    let value = brack!({ "nickname": "Den" });
    let monster: Monster = codec.deserialize_as(&value).unwrap().unwrap();
    assert_eq!(monster.nickname.as_deref(), Some("Den"));

    let value = brack!({ "nickname": null });
    let monster: Monster = codec.deserialize_as(&value).unwrap().unwrap();
    assert_eq!(monster.nickname, None);
}
