//! Reflective deep equality over typed instances.
//!
//! This module provides [`deep_eq`], a structural comparison that walks two
//! instances through their registered shapes. It is the verification half of
//! the codec round trip: an instance reconstructed from its serialized form
//! should compare deep-equal to the original.

use crate::introspect::{Instance, Reflected, Shape};
use crate::registry::TypeRegistry;
use crate::{Error, Result};

/// Structurally compares two instances.
///
/// Instances of different concrete types are unequal. Both types must be
/// registered; an unregistered type is an error, not an inequality.
pub fn deep_eq(a: &dyn Reflected, b: &dyn Reflected, registry: &TypeRegistry) -> Result<bool> {
    let id = a.as_any().type_id();
    if id != b.as_any().type_id() {
        return Ok(false);
    }
    let info = registry
        .info_of(id)
        .ok_or_else(|| Error::unknown_type(format!("unregistered type (id {:?})", id)))?;
    match &info.shape {
        Shape::Scalar(shape) => Ok((shape.encode)(a)? == (shape.encode)(b)?),
        Shape::Nullable(shape) => match ((shape.get)(a)?, (shape.get)(b)?) {
            (None, None) => Ok(true),
            (Some(x), Some(y)) => deep_eq(x.as_ref(), y.as_ref(), registry),
            _ => Ok(false),
        },
        Shape::Enum(shape) => Ok((shape.tag_of)(a)?.0 == (shape.tag_of)(b)?.0),
        Shape::List(shape) => {
            let xs = (shape.items)(a)?;
            let ys = (shape.items)(b)?;
            elementwise_eq(&xs, &ys, registry)
        }
        Shape::Map(shape) => {
            let xs = (shape.entries)(a)?;
            let ys = (shape.entries)(b)?;
            if xs.len() != ys.len() {
                return Ok(false);
            }
            // Entry order is not significant for equality; match by key.
            for (key, value) in &xs {
                match ys.iter().find(|(other, _)| other == key) {
                    Some((_, counterpart)) => {
                        if !deep_eq(value.as_ref(), counterpart.as_ref(), registry)? {
                            return Ok(false);
                        }
                    }
                    None => return Ok(false),
                }
            }
            Ok(true)
        }
        Shape::Struct(shape) => {
            for member in &shape.members {
                let x = (member.get)(a)?;
                let y = (member.get)(b)?;
                if !deep_eq(x.as_ref(), y.as_ref(), registry)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
    }
}

fn elementwise_eq(xs: &[Instance], ys: &[Instance], registry: &TypeRegistry) -> Result<bool> {
    if xs.len() != ys.len() {
        return Ok(false);
    }
    for (x, y) in xs.iter().zip(ys) {
        if !deep_eq(x.as_ref(), y.as_ref(), registry)? {
            return Ok(false);
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::introspect::TypeInfo;

    fn registry() -> TypeRegistry {
        let mut registry = TypeRegistry::new();
        registry.register(TypeInfo::scalar::<i32>("Int32"));
        registry.register(TypeInfo::scalar::<String>("String"));
        registry.register(TypeInfo::nullable::<i32>("MaybeInt"));
        registry.register(TypeInfo::list_of::<i32>("IntList"));
        registry
    }

    #[test]
    fn test_scalars() {
        let registry = registry();
        assert!(deep_eq(&1i32, &1i32, &registry).unwrap());
        assert!(!deep_eq(&1i32, &2i32, &registry).unwrap());
    }

    #[test]
    fn test_different_types_unequal() {
        let registry = registry();
        assert!(!deep_eq(&1i32, &String::from("1"), &registry).unwrap());
    }

    #[test]
    fn test_nullable() {
        let registry = registry();
        assert!(deep_eq(&None::<i32>, &None::<i32>, &registry).unwrap());
        assert!(deep_eq(&Some(3i32), &Some(3i32), &registry).unwrap());
        assert!(!deep_eq(&Some(3i32), &None::<i32>, &registry).unwrap());
    }

    #[test]
    fn test_lists() {
        let registry = registry();
        assert!(deep_eq(&vec![1i32, 2], &vec![1i32, 2], &registry).unwrap());
        assert!(!deep_eq(&vec![1i32, 2], &vec![2i32, 1], &registry).unwrap());
        assert!(!deep_eq(&vec![1i32], &vec![1i32, 1], &registry).unwrap());
    }

    #[test]
    fn test_unregistered_type_is_error() {
        let registry = registry();
        assert!(deep_eq(&1u16, &1u16, &registry).is_err());
    }
}
