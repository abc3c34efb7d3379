use super::{Mapping, Source, project};
use crate::error::SourceError;
use crate::keys::KeySet;
use std::path::{Path, PathBuf};

/// A `.env` style file, read without touching the process environment
#[derive(Debug, Clone)]
pub struct DotenvFile {
    path: PathBuf,
}

impl DotenvFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl Source for DotenvFile {
    fn name(&self) -> String {
        format!("dotenv {}", self.path.display())
    }

    fn resolve(&self, keys: &KeySet) -> Result<Mapping, SourceError> {
        let dotenv_error = |source| SourceError::Dotenv {
            path: self.path.clone(),
            source,
        };

        let mut entries = Mapping::new();
        for item in dotenvy::from_path_iter(&self.path).map_err(dotenv_error)? {
            let (key, value) = item.map_err(dotenv_error)?;
            entries.insert(key, value);
        }

        Ok(project(&entries, keys))
    }
}
