use crate::schema::{Configurable, FloatWidth, Kind, Scalar, Width};

/// A coerced value ready to be stored in a field
///
/// Integers and floats are widened here; the range of the declared width
/// has already been enforced during coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Str(String),
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Seq(Vec<Value>),
}

/// A Rust type that can appear as a field of a configurable struct
///
/// Implemented for the supported primitives, `Vec` of them, and for every
/// `#[derive(Configurable)]` struct.
pub trait FieldType: Sized {
    /// Kind recorded in the schema description
    fn kind() -> Kind;

    /// Unwraps a coerced value, `None` if it has the wrong shape
    fn from_value(value: Value) -> Option<Self>;

    /// Nested structs expose themselves for recursive population
    fn as_configurable(&mut self) -> Option<&mut dyn Configurable> {
        None
    }
}

impl FieldType for String {
    fn kind() -> Kind {
        Kind::Scalar(Scalar::String)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl FieldType for bool {
    fn kind() -> Kind {
        Kind::Scalar(Scalar::Bool)
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(b),
            _ => None,
        }
    }
}

macro_rules! int_field {
    ($($ty:ty => $variant:ident($width:expr)),* $(,)?) => {
        $(
            impl FieldType for $ty {
                fn kind() -> Kind {
                    Kind::Scalar(Scalar::$variant($width))
                }

                fn from_value(value: Value) -> Option<Self> {
                    match value {
                        Value::Int(v) => <$ty>::try_from(v).ok(),
                        Value::Uint(v) => <$ty>::try_from(v).ok(),
                        _ => None,
                    }
                }
            }
        )*
    };
}

int_field! {
    i8 => Int(Width::W8),
    i16 => Int(Width::W16),
    i32 => Int(Width::W32),
    i64 => Int(Width::W64),
    isize => Int(Width::pointer()),
    u8 => Uint(Width::W8),
    u16 => Uint(Width::W16),
    u32 => Uint(Width::W32),
    u64 => Uint(Width::W64),
    usize => Uint(Width::pointer()),
}

impl FieldType for f32 {
    fn kind() -> Kind {
        Kind::Scalar(Scalar::Float(FloatWidth::F32))
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            // exact: the value was parsed as f32 before widening
            Value::Float(v) => Some(v as f32),
            _ => None,
        }
    }
}

impl FieldType for f64 {
    fn kind() -> Kind {
        Kind::Scalar(Scalar::Float(FloatWidth::F64))
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Float(v) => Some(v),
            _ => None,
        }
    }
}

impl<T: FieldType> FieldType for Vec<T> {
    fn kind() -> Kind {
        match T::kind() {
            Kind::Scalar(element) => Kind::Seq(element),
            _ => Kind::Unsupported(std::any::type_name::<Self>()),
        }
    }

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Seq(items) => items.into_iter().map(T::from_value).collect(),
            _ => None,
        }
    }
}
