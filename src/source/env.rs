use super::{Mapping, Source};
use crate::error::SourceError;
use crate::keys::KeySet;
use std::env;

/// Reads each requested key as an environment variable of the exact same name
///
/// Unset variables are left out. Variables that are set but not valid
/// unicode are left out as well.
#[derive(Debug, Clone, Copy, Default)]
pub struct Environment;

impl Source for Environment {
    fn name(&self) -> String {
        "environment".to_string()
    }

    fn resolve(&self, keys: &KeySet) -> Result<Mapping, SourceError> {
        Ok(keys
            .iter()
            .filter_map(|key| env::var(key).ok().map(|value| (key.to_string(), value)))
            .collect())
    }
}
