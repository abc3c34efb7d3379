// Lets the derive macro's `::fusion_config` paths resolve inside this crate
extern crate self as fusion_config;

pub mod error;
pub mod field;
pub mod keys;
pub mod loader;
pub mod merge;
pub mod populate;
pub mod resolve;
pub mod schema;
pub mod source;
pub mod validate;

// Re-export main types
pub use error::{BoxError, CoerceError, LoadError, SchemaError, SourceError};
pub use field::{FieldType, Value};
pub use keys::{KeySet, derive_keys};
pub use loader::{LoadOption, Loader, load};
pub use merge::merge;
pub use populate::populate;
pub use resolve::resolve;
pub use schema::{Configurable, FieldSchema, FloatWidth, Kind, Scalar, Schema, Width};
pub use source::{DotenvFile, Environment, FnSource, LocalFile, Mapping, RemoteFile, Source};
pub use validate::Validator;

// Re-export derive macro
pub use fusion_config_macros::Configurable;

/// Trait for building a configuration value from its sources
pub trait Load: Configurable + Default {
    /// Start from `Default`, then run `loader` against it
    fn load_with(loader: &Loader<Self>) -> Result<Self, LoadError> {
        let mut target = Self::default();
        loader.load(&mut target)?;
        Ok(target)
    }

    /// Load with the environment as the only source
    fn load_from_env() -> Result<Self, LoadError> {
        Self::load_with(&Loader::new())
    }
}

impl<T: Configurable + Default> Load for T {}
