use super::{Mapping, Source, document, project};
use crate::error::SourceError;
use crate::keys::KeySet;
use std::{
    fs,
    path::{Path, PathBuf},
};

/// A JSON document on the local filesystem
#[derive(Debug, Clone)]
pub struct LocalFile {
    path: PathBuf,
}

impl LocalFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Source for LocalFile {
    fn name(&self) -> String {
        format!("file {}", self.path.display())
    }

    fn resolve(&self, keys: &KeySet) -> Result<Mapping, SourceError> {
        let data = fs::read(&self.path).map_err(|source| SourceError::ReadFile {
            path: self.path.clone(),
            source,
        })?;

        let origin = self.path.display().to_string();
        let parsed = document::parse_document(&data, &origin)?;

        Ok(project(&document::flatten(&parsed), keys))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_reads_and_projects() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"ValString":"xyz","ValStruct":{{"ValString":"abc"}},"Other":"skip"}}"#
        )
        .unwrap();

        let keys: KeySet = ["ValString", "ValStruct.ValString"].into_iter().collect();
        let found = LocalFile::new(file.path()).resolve(&keys).unwrap();

        assert_eq!(found.len(), 2);
        assert_eq!(found["ValString"], "xyz");
        assert_eq!(found["ValStruct.ValString"], "abc");
    }

    #[test]
    fn test_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");

        let source = LocalFile::new(&path);
        let err = source.resolve(&KeySet::new()).unwrap_err();

        assert!(matches!(err, SourceError::ReadFile { path: ref p, .. } if p == source.path()));
    }

    #[test]
    fn test_malformed_file_fails() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "ValString = xyz").unwrap();

        let err = LocalFile::new(file.path()).resolve(&KeySet::new()).unwrap_err();

        assert!(matches!(err, SourceError::Parse { .. }));
    }
}
