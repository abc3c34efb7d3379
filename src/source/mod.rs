//! Configuration sources.
//!
//! A source answers one question: given the requested keys, which of them
//! does it have a value for. Every source only ever reports requested keys.

mod document;
mod dotenv;
mod env;
mod file;
mod remote;

pub use document::{flatten, parse_document};
pub use dotenv::DotenvFile;
pub use env::Environment;
pub use file::LocalFile;
pub use remote::{REMOTE_TIMEOUT, RemoteFile};

use crate::error::{BoxError, SourceError};
use crate::keys::KeySet;
use std::collections::BTreeMap;

/// Flat mapping from dotted key to raw string value
pub type Mapping = BTreeMap<String, String>;

/// Trait for configuration sources
///
/// Implement this to plug in secret stores, other file formats and so on.
/// Sources run on their own thread, so `resolve` may block on I/O.
pub trait Source: Send + Sync {
    /// Human-readable name used in logs and errors
    fn name(&self) -> String;

    /// Returns the values this source holds for `keys`
    fn resolve(&self, keys: &KeySet) -> Result<Mapping, SourceError>;
}

/// A [`Source`] backed by a closure
pub struct FnSource<F> {
    name: String,
    resolve: F,
}

impl<F> FnSource<F>
where
    F: Fn(&KeySet) -> Result<Mapping, BoxError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, resolve: F) -> Self {
        Self {
            name: name.into(),
            resolve,
        }
    }
}

impl<F> Source for FnSource<F>
where
    F: Fn(&KeySet) -> Result<Mapping, BoxError> + Send + Sync,
{
    fn name(&self) -> String {
        self.name.clone()
    }

    fn resolve(&self, keys: &KeySet) -> Result<Mapping, SourceError> {
        (self.resolve)(keys).map_err(|source| SourceError::Custom {
            name: self.name.clone(),
            source,
        })
    }
}

/// Keeps only the entries of a flattened document that were requested
pub fn project(flattened: &Mapping, keys: &KeySet) -> Mapping {
    keys.iter()
        .filter_map(|key| {
            flattened
                .get(key)
                .map(|value| (key.to_string(), value.clone()))
        })
        .collect()
}
