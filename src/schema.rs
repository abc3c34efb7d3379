//! Explicit description of a configurable type's shape.
//!
//! A [`Schema`] is built once per target type (normally by
//! `#[derive(Configurable)]`) and is the only thing the key deriver and the
//! populator look at. Both traverse it through [`Schema::walk`], so the keys
//! that are looked up and the keys that are assigned always agree.

use crate::error::SchemaError;
use crate::field::Value;
use std::{convert::Infallible, fmt, fs, path::Path};

/// Bit width of an integer field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Width {
    W8,
    W16,
    W32,
    W64,
}

impl Width {
    /// Width of `isize`/`usize` on the current target
    pub const fn pointer() -> Self {
        match usize::BITS {
            8 => Width::W8,
            16 => Width::W16,
            32 => Width::W32,
            _ => Width::W64,
        }
    }

    pub fn bits(&self) -> u32 {
        match self {
            Width::W8 => 8,
            Width::W16 => 16,
            Width::W32 => 32,
            Width::W64 => 64,
        }
    }
}

/// Bit width of a floating point field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum FloatWidth {
    F32,
    F64,
}

/// Kinds that can be parsed from a single string value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Scalar {
    String,
    Bool,
    Int(Width),
    Uint(Width),
    Float(FloatWidth),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::String => write!(f, "string"),
            Scalar::Bool => write!(f, "bool"),
            Scalar::Int(w) => write!(f, "i{}", w.bits()),
            Scalar::Uint(w) => write!(f, "u{}", w.bits()),
            Scalar::Float(FloatWidth::F32) => write!(f, "f32"),
            Scalar::Float(FloatWidth::F64) => write!(f, "f64"),
        }
    }
}

/// Declared kind of a field
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Kind {
    Scalar(Scalar),
    /// Comma separated sequence of scalars
    Seq(Scalar),
    /// Nested struct, keys are derived from its own schema
    Struct(Schema),
    /// A type the loader cannot fill, carries the Rust type name
    Unsupported(&'static str),
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Scalar(s) => write!(f, "{}", s),
            Kind::Seq(s) => write!(f, "list of {}", s),
            Kind::Struct(schema) => write!(f, "struct {}", schema.type_name),
            Kind::Unsupported(name) => write!(f, "unsupported ({})", name),
        }
    }
}

/// One externally settable field of a struct
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct FieldSchema {
    /// Position used by [`Configurable::set_field`] and [`Configurable::nested_mut`]
    pub index: usize,
    /// Rust identifier of the field
    pub ident: &'static str,
    /// Effective key segment after renames and the struct naming policy
    pub name: &'static str,
    pub kind: Kind,
}

impl FieldSchema {
    pub fn new(index: usize, ident: &'static str, name: &'static str, kind: Kind) -> Self {
        Self {
            index,
            ident,
            name,
            kind,
        }
    }
}

/// Shape of a configurable struct
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Schema {
    pub type_name: &'static str,
    pub fields: Vec<FieldSchema>,
}

/// A leaf reached by [`Schema::walk`]
#[derive(Debug, Clone, Copy)]
pub struct Leaf<'a> {
    /// Fully qualified dotted key
    pub key: &'a str,
    /// Field indices from the root struct down to this field
    pub route: &'a [usize],
    pub field: &'a FieldSchema,
}

/// Joins a key segment onto a prefix with a dot, an empty prefix adds nothing
pub fn join_key(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

impl Schema {
    pub fn new(type_name: &'static str, fields: Vec<FieldSchema>) -> Self {
        Self { type_name, fields }
    }

    /// Visits every leaf field in declaration order, descending into nested
    /// structs. Struct nodes themselves are never visited.
    pub fn walk<E>(
        &self,
        prefix: &str,
        visit: &mut dyn FnMut(Leaf<'_>) -> Result<(), E>,
    ) -> Result<(), E> {
        let mut route = Vec::new();
        self.walk_inner(prefix, &mut route, visit)
    }

    /// Visits every leaf like [`Schema::walk`] with a visitor that cannot fail
    pub fn for_each_leaf(&self, prefix: &str, mut visit: impl FnMut(Leaf<'_>)) {
        let walked = self.walk::<Infallible>(prefix, &mut |leaf| {
            visit(leaf);
            Ok(())
        });
        match walked {
            Ok(()) => {}
            Err(never) => match never {},
        }
    }

    fn walk_inner<E>(
        &self,
        prefix: &str,
        route: &mut Vec<usize>,
        visit: &mut dyn FnMut(Leaf<'_>) -> Result<(), E>,
    ) -> Result<(), E> {
        for field in &self.fields {
            let key = join_key(prefix, field.name);
            route.push(field.index);
            let result = match &field.kind {
                Kind::Struct(child) => child.walk_inner(&key, route, visit),
                _ => visit(Leaf {
                    key: &key,
                    route: route.as_slice(),
                    field,
                }),
            };
            route.pop();
            result?;
        }
        Ok(())
    }

    /// Rejects descriptions that contain a kind the loader cannot fill
    pub fn check(&self, prefix: &str) -> Result<(), SchemaError> {
        self.walk(prefix, &mut |leaf| match leaf.field.kind {
            Kind::Unsupported(type_name) => Err(SchemaError::Unsupported {
                path: leaf.key.to_string(),
                type_name,
            }),
            _ => Ok(()),
        })
    }

    /// Renders a markdown table of every key this schema reads
    pub fn to_markdown(&self, prefix: &str) -> String {
        let mut md = String::new();

        md.push_str(&format!("## {} Configuration Keys\n\n", self.type_name));
        md.push_str("| Key | Field | Type |\n");
        md.push_str("|-----|-------|------|\n");
        self.for_each_leaf(prefix, |leaf| {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                leaf.key, leaf.field.ident, leaf.field.kind
            ));
        });

        md
    }

    /// Write configuration documentation to a markdown file
    ///
    /// # Example
    /// ```no_run
    /// use fusion_config::Configurable;
    ///
    /// #[derive(Default, Configurable)]
    /// pub struct Server {
    ///     pub host: String,
    ///     pub port: u16,
    /// }
    ///
    /// Server::schema().write_docs("CONFIG.md", "server").unwrap();
    /// ```
    pub fn write_docs(&self, path: impl AsRef<Path>, prefix: &str) -> std::io::Result<()> {
        fs::write(path, self.to_markdown(prefix))
    }
}

/// A struct that can be filled from resolved configuration values
///
/// Usually derived with `#[derive(Configurable)]`. Hand-written
/// implementations must keep `schema()` and the two accessors in agreement:
/// every leaf index in the schema is accepted by `set_field`, and every
/// [`Kind::Struct`] index is returned by `nested_mut`.
pub trait Configurable {
    /// Describes the externally settable fields of this type
    fn schema() -> Schema
    where
        Self: Sized;

    /// Assigns an already coerced value to the field at `index`
    ///
    /// Returns `false` if the value does not match the field's type.
    fn set_field(&mut self, index: usize, value: Value) -> bool;

    /// Returns the nested struct stored at `index`
    fn nested_mut(&mut self, index: usize) -> Option<&mut dyn Configurable>;
}
