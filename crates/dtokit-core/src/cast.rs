//! Value casting
//!
//! Moves a raw input value towards a field's declared types before it is
//! validated. Casting never rejects on its own: whatever cannot be cast is
//! returned unchanged and left for [`is_valid`](crate::is_valid) to judge.
//! The only failures come from constructing nested instances.
//!
//! # Rules
//!
//! 1. Mixed fields take the value as is
//! 2. Null stays null
//! 3. A value whose kind is already declared stays as is
//! 4. Lists of maps become lists of nested instances when an element type
//!    is a registered type; any other iterable becomes one nested instance
//!    when a declared type is registered
//! 5. Scalars are coerced to the first declared `integer`, `float` or
//!    `boolean`

use crate::error::MapResult;
use crate::mapper::Mapper;
use crate::value::Value;
use dtokit_types::{PropertyDescriptor, ScalarKind, TypeName, TypeRef};

/// Cast `value` towards the types declared by `descriptor`
///
/// `depth` is the nesting depth of the instance owning the field; nested
/// instances are built one level deeper.
pub fn cast_value(
    mapper: &Mapper,
    descriptor: &PropertyDescriptor,
    value: Value,
    depth: usize,
) -> MapResult<Value> {
    if descriptor.is_mixed() || value.is_null() {
        return Ok(value);
    }

    let types = descriptor.types();
    if types.iter().any(|ty| kind_matches(ty, &value)) {
        return Ok(value);
    }

    if value.is_iterable() {
        if should_become_collection(&value) {
            return match (first_mappable(mapper, descriptor.element_types()), value) {
                (Some(element_type), Value::List(items)) => {
                    let mut instances = Vec::with_capacity(items.len());
                    for item in &items {
                        let instance = mapper.instantiate(element_type, item, depth + 1)?;
                        instances.push(Value::from(instance));
                    }
                    Ok(Value::List(instances))
                }
                (_, value) => Ok(value),
            };
        }

        return match first_mappable(mapper, types) {
            Some(object_type) => Ok(Value::from(mapper.instantiate(object_type, &value, depth + 1)?)),
            None => Ok(value),
        };
    }

    if value.is_scalar() {
        if let Some(kind) = types.iter().find_map(TypeRef::is_coercible_scalar) {
            return Ok(coerce_scalar(value, kind));
        }
    }

    Ok(value)
}

/// Whether `value` should be promoted element-wise to a typed collection
///
/// True only for a non-empty list whose every element is itself a map or a
/// list. Maps have string keys and are never promoted.
pub fn should_become_collection(value: &Value) -> bool {
    match value {
        Value::List(items) => {
            !items.is_empty()
                && items
                    .iter()
                    .all(|item| matches!(item, Value::Map(_) | Value::List(_)))
        }
        _ => false,
    }
}

/// Coerce a scalar to `kind`
///
/// Values that have no sensible conversion (a non-numeric string to a
/// number, an out-of-range float to an integer) are returned unchanged.
/// Non-scalars are always returned unchanged.
pub fn coerce_scalar(value: Value, kind: ScalarKind) -> Value {
    if !value.is_scalar() {
        return value;
    }

    match kind {
        ScalarKind::Integer => match value {
            Value::Bool(b) => Value::Int(i64::from(b)),
            Value::Float(f) => float_to_int(f).map_or(value, Value::Int),
            Value::String(ref s) => parse_int(s).map_or(value, Value::Int),
            other => other,
        },
        ScalarKind::Float => match value {
            Value::Bool(b) => Value::Float(if b { 1.0 } else { 0.0 }),
            Value::Int(i) => Value::Float(i as f64),
            Value::String(ref s) => parse_float(s).map_or(value, Value::Float),
            other => other,
        },
        ScalarKind::Boolean => Value::Bool(value.truthy()),
        ScalarKind::String => value,
    }
}

/// Step-3 kind comparison: exact scalar kinds, and `array` for collections
fn kind_matches(ty: &TypeRef, value: &Value) -> bool {
    match (ty, value) {
        (TypeRef::Scalar(ScalarKind::Integer), Value::Int(_))
        | (TypeRef::Scalar(ScalarKind::Float), Value::Float(_))
        | (TypeRef::Scalar(ScalarKind::Boolean), Value::Bool(_))
        | (TypeRef::Scalar(ScalarKind::String), Value::String(_))
        | (TypeRef::Array, Value::List(_) | Value::Map(_)) => true,
        _ => false,
    }
}

fn first_mappable<'t>(mapper: &Mapper, types: &'t [TypeRef]) -> Option<&'t TypeName> {
    types
        .iter()
        .filter_map(TypeRef::as_object)
        .find(|name| mapper.is_mappable(name))
}

fn parse_float(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() || !s.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse::<f64>().ok().filter(|f| f.is_finite())
}

fn parse_int(s: &str) -> Option<i64> {
    let trimmed = s.trim();
    trimmed
        .parse::<i64>()
        .ok()
        .or_else(|| parse_float(trimmed).and_then(float_to_int))
}

fn float_to_int(f: f64) -> Option<i64> {
    if f.is_finite() && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f.trunc() as i64)
    } else {
        None
    }
}
