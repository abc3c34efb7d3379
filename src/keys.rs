use crate::schema::Schema;
use std::collections::HashSet;

/// Ordered set of dotted keys requested from every source in one load
///
/// Duplicate keys produced by an ill-formed schema are kept in order; lookups
/// treat them as one key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeySet {
    keys: Vec<String>,
    lookup: HashSet<String>,
}

impl KeySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<String>) {
        let key = key.into();
        self.lookup.insert(key.clone());
        self.keys.push(key);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lookup.contains(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.keys
    }
}

impl<S: Into<String>> FromIterator<S> for KeySet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = KeySet::new();
        for key in iter {
            set.push(key);
        }
        set
    }
}

impl<'a> IntoIterator for &'a KeySet {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.keys.iter()
    }
}

/// Derives every leaf key of `schema` under `prefix`, in declaration order
pub fn derive_keys(schema: &Schema, prefix: &str) -> KeySet {
    let mut keys = KeySet::new();
    schema.for_each_leaf(prefix, |leaf| keys.push(leaf.key));
    keys
}
