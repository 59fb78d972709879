//! Describing types and round-tripping instances through the codec.
//!
//! Run with: `cargo run --example codec`

use brack::introspect::{Instance, TypeInfo};
use brack::{
    deep_eq, describe_enum, describe_struct, parse, to_text_pretty, Codec, CodecOptions, Result,
    TypeRegistry,
};
use std::sync::Arc;

#[derive(Clone, Copy, Default, PartialEq, Debug)]
enum Quality {
    #[default]
    Poor,
    Good,
    Excellent,
}

#[derive(Clone, Default)]
struct Sword {
    damage: i32,
}

#[derive(Clone, Default)]
struct Shield {
    block: i32,
}

#[derive(Clone, Default)]
struct Monster {
    name: String,
    health: i32,
    quality: Quality,
    inventory: Vec<Instance>,
}

fn main() -> Result<()> {
    let mut registry = TypeRegistry::new();
    registry.register(TypeInfo::scalar::<i32>("Int32"));
    registry.register(TypeInfo::scalar::<String>("String"));
    registry.register(TypeInfo::dynamic_list("Game.ItemList"));
    registry.register(describe_enum!(Quality, "Game.Quality", {
        Poor = 0,
        Good = 1,
        Excellent = 2,
    }));
    registry.register(describe_struct!(Sword, "Game.Sword", { damage: i32 }));
    registry.register(describe_struct!(Shield, "Game.Shield", { block: i32 }));
    registry.register(describe_struct!(Monster, "Game.Monster", {
        name: String,
        health: i32,
        quality: Quality,
        inventory: Vec<Instance>,
    }));
    registry.add_namespace("Game", '.');

    let codec = Codec::new(Arc::new(registry), CodecOptions::new());

    let monster = Monster {
        name: String::from("fire-imp"),
        health: 14,
        quality: Quality::Good,
        inventory: vec![
            Box::new(Sword { damage: 9 }),
            Box::new(Shield { block: 4 }),
        ],
    };

    // Serialize with a type tag; polymorphic inventory elements carry
    // their own tags.
    let value = codec.serialize(&monster, true)?;
    println!("{}", to_text_pretty(&value)?);

    // Deserialize straight from text. The tag names the concrete type, so
    // no desired type is needed.
    let text = "{#type monster name lich health 99 quality excellent}";
    let restored = codec.deserialize(&parse(text)?, None)?;
    if let Some(instance) = &restored {
        let lich = brack::introspect::downcast_ref::<Monster>(instance.as_ref())?;
        println!("restored {} ({:?})", lich.name, lich.quality);
    }

    // Structural clone: serialize then deserialize.
    let copy = codec.clone_instance(&monster)?;
    println!(
        "clone deep-equal: {}",
        deep_eq(&monster, copy.as_ref(), codec.registry())?
    );

    Ok(())
}
