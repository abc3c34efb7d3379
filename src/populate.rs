//! Coercion of merged string values into the target's typed fields.
//!
//! Population happens in two steps. First every key present in the merged
//! mapping is coerced against the schema into a list of assignments; if
//! any value fails, the target has not been touched. Only then are the
//! assignments written into the target.

use crate::error::{CoerceError, LoadError, SchemaError};
use crate::field::Value;
use crate::schema::{Configurable, FloatWidth, Kind, Scalar, Schema, Width};
use crate::source::Mapping;
use std::fmt::Display;
use tracing::trace;

/// Separator between sequence elements
pub const SEQ_SEPARATOR: char = ',';

/// One coerced value and where it goes
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub key: String,
    /// Field indices from the root struct down to the leaf
    pub route: Vec<usize>,
    pub value: Value,
}

/// Fills `target` from `mapping`; fields without a value keep their current value
pub fn populate<T: Configurable>(
    target: &mut T,
    mapping: &Mapping,
    prefix: &str,
) -> Result<(), LoadError> {
    let assignments = plan(&T::schema(), mapping, prefix)?;
    apply(target, assignments)?;
    Ok(())
}

/// Coerces every present key into an assignment without touching any target
pub fn plan(
    schema: &Schema,
    mapping: &Mapping,
    prefix: &str,
) -> Result<Vec<Assignment>, LoadError> {
    let mut assignments = Vec::new();
    schema.walk::<LoadError>(prefix, &mut |leaf| {
        if let Kind::Unsupported(type_name) = leaf.field.kind {
            return Err(SchemaError::Unsupported {
                path: leaf.key.to_string(),
                type_name,
            }
            .into());
        }

        let Some(raw) = mapping.get(leaf.key) else {
            return Ok(());
        };

        if let Some(value) = coerce(&leaf.field.kind, raw, leaf.key)? {
            assignments.push(Assignment {
                key: leaf.key.to_string(),
                route: leaf.route.to_vec(),
                value,
            });
        }
        Ok(())
    })?;
    Ok(assignments)
}

/// Writes planned assignments into `target`
pub fn apply(
    target: &mut dyn Configurable,
    assignments: Vec<Assignment>,
) -> Result<(), SchemaError> {
    for Assignment { key, route, value } in assignments {
        trace!(key = %key, "assigning");
        assign(target, &route, value, &key)?;
    }
    Ok(())
}

fn assign(
    node: &mut dyn Configurable,
    route: &[usize],
    value: Value,
    key: &str,
) -> Result<(), SchemaError> {
    match route.split_first() {
        Some((&index, [])) => {
            if node.set_field(index, value) {
                Ok(())
            } else {
                Err(SchemaError::Mismatch {
                    path: key.to_string(),
                    index,
                })
            }
        }
        Some((&index, rest)) => match node.nested_mut(index) {
            Some(child) => assign(child, rest, value, key),
            None => Err(SchemaError::NotNested {
                path: key.to_string(),
                index,
            }),
        },
        None => Err(SchemaError::Mismatch {
            path: key.to_string(),
            index: 0,
        }),
    }
}

/// Coerces a raw value for a leaf of the given kind
///
/// An empty string for a sequence yields `None`, meaning no assignment.
pub fn coerce(kind: &Kind, raw: &str, key: &str) -> Result<Option<Value>, LoadError> {
    match kind {
        Kind::Scalar(scalar) => Ok(Some(coerce_scalar(*scalar, raw, key)?)),
        Kind::Seq(_) if raw.is_empty() => Ok(None),
        Kind::Seq(element) => {
            let items = raw
                .split(SEQ_SEPARATOR)
                .map(|part| coerce_scalar(*element, part, key))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Some(Value::Seq(items)))
        }
        Kind::Struct(schema) => Err(SchemaError::Mismatch {
            path: format!("{} ({})", key, schema.type_name),
            index: 0,
        }
        .into()),
        Kind::Unsupported(type_name) => Err(SchemaError::Unsupported {
            path: key.to_string(),
            type_name: *type_name,
        }
        .into()),
    }
}

/// Parses one string into a scalar value, enforcing the declared width
pub fn coerce_scalar(scalar: Scalar, raw: &str, key: &str) -> Result<Value, CoerceError> {
    let fail = |reason: &dyn Display| CoerceError {
        key: key.to_string(),
        value: raw.to_string(),
        expected: scalar.to_string(),
        reason: reason.to_string(),
    };

    match scalar {
        Scalar::String => Ok(Value::Str(raw.to_string())),
        Scalar::Bool => parse_bool(raw).map(Value::Bool).ok_or_else(|| {
            fail(&"expected one of 1, t, T, TRUE, true, True, 0, f, F, FALSE, false, False")
        }),
        Scalar::Int(width) => {
            let parsed = match width {
                Width::W8 => raw.parse::<i8>().map(i64::from),
                Width::W16 => raw.parse::<i16>().map(i64::from),
                Width::W32 => raw.parse::<i32>().map(i64::from),
                Width::W64 => raw.parse::<i64>(),
            };
            parsed.map(Value::Int).map_err(|e| fail(&e))
        }
        Scalar::Uint(width) => {
            let parsed = match width {
                Width::W8 => raw.parse::<u8>().map(u64::from),
                Width::W16 => raw.parse::<u16>().map(u64::from),
                Width::W32 => raw.parse::<u32>().map(u64::from),
                Width::W64 => raw.parse::<u64>(),
            };
            parsed.map(Value::Uint).map_err(|e| fail(&e))
        }
        Scalar::Float(width) => {
            let parsed = match width {
                FloatWidth::F32 => raw.parse::<f32>().map(f64::from),
                FloatWidth::F64 => raw.parse::<f64>(),
            };
            match parsed {
                Ok(v) if v.is_infinite() && !names_infinity(raw) => {
                    Err(fail(&"number too large to fit in target type"))
                }
                Ok(v) => Ok(Value::Float(v)),
                Err(e) => Err(fail(&e)),
            }
        }
    }
}

/// Finite input that parses to infinity overflowed the declared width
fn names_infinity(raw: &str) -> bool {
    let unsigned = raw.strip_prefix(['+', '-']).unwrap_or(raw);
    unsigned.eq_ignore_ascii_case("inf") || unsigned.eq_ignore_ascii_case("infinity")
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}
