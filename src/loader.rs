use crate::error::{BoxError, LoadError};
use crate::keys::{KeySet, derive_keys};
use crate::merge::merge;
use crate::populate::{apply, plan};
use crate::resolve::resolve;
use crate::schema::Configurable;
use crate::source::{DotenvFile, Environment, FnSource, LocalFile, Mapping, RemoteFile, Source};
use crate::validate::{Validator, run_validators, validator};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};
use tracing::debug;

/// One load option, applied in order
///
/// Source options append to the source list, so a source added later
/// overrides values from sources added before it.
pub enum LoadOption<T> {
    /// Enable or disable the environment source (enabled by default)
    Env(bool),
    LocalFile(PathBuf),
    RemoteFile(String),
    DotenvFile(PathBuf),
    Prefix(String),
    Source(Arc<dyn Source>),
    Validation(Validator<T>),
}

/// A builder holding everything one load needs
///
/// # Example
/// ```no_run
/// use fusion_config::{Configurable, Loader};
///
/// #[derive(Debug, Default, Configurable)]
/// pub struct Server {
///     pub host: String,
///     pub port: u16,
/// }
///
/// let mut server = Server::default();
/// Loader::new()
///     .with_prefix("server")
///     .with_local_file("config.json")
///     .with_validation(|s: &Server| if s.port != 0 { Ok(()) } else { Err("port must be set") })
///     .load(&mut server)
///     .unwrap();
/// ```
pub struct Loader<T> {
    with_env: bool,
    prefix: String,
    sources: Vec<Arc<dyn Source>>,
    validators: Vec<Validator<T>>,
}

impl<T> Loader<T> {
    /// Create a loader with only the environment source enabled
    pub fn new() -> Self {
        Self {
            with_env: true,
            prefix: String::new(),
            sources: Vec::new(),
            validators: Vec::new(),
        }
    }

    /// Apply a single option
    pub fn option(mut self, option: LoadOption<T>) -> Self {
        match option {
            LoadOption::Env(enabled) => self.with_env = enabled,
            LoadOption::LocalFile(path) => self.sources.push(Arc::new(LocalFile::new(path))),
            LoadOption::RemoteFile(url) => self.sources.push(Arc::new(RemoteFile::new(url))),
            LoadOption::DotenvFile(path) => self.sources.push(Arc::new(DotenvFile::new(path))),
            LoadOption::Prefix(prefix) => self.prefix = prefix,
            LoadOption::Source(source) => self.sources.push(source),
            LoadOption::Validation(check) => self.validators.push(check),
        }
        self
    }

    pub fn with_env(self, enabled: bool) -> Self {
        self.option(LoadOption::Env(enabled))
    }

    pub fn with_local_file(self, path: impl AsRef<Path>) -> Self {
        self.option(LoadOption::LocalFile(path.as_ref().to_path_buf()))
    }

    pub fn with_remote_file(self, url: impl Into<String>) -> Self {
        self.option(LoadOption::RemoteFile(url.into()))
    }

    pub fn with_dotenv_file(self, path: impl AsRef<Path>) -> Self {
        self.option(LoadOption::DotenvFile(path.as_ref().to_path_buf()))
    }

    /// Prefix prepended to every derived key, joined with a dot
    pub fn with_prefix(self, prefix: impl Into<String>) -> Self {
        self.option(LoadOption::Prefix(prefix.into()))
    }

    pub fn with_source(self, source: impl Source + 'static) -> Self {
        self.option(LoadOption::Source(Arc::new(source)))
    }

    /// Add a source backed by a closure
    pub fn with_source_fn<F>(self, name: impl Into<String>, resolve: F) -> Self
    where
        F: Fn(&KeySet) -> Result<Mapping, BoxError> + Send + Sync + 'static,
    {
        self.with_source(FnSource::new(name, resolve))
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Sources in precedence order, lowest first
    pub fn sources(&self) -> Vec<Arc<dyn Source>> {
        let mut sources: Vec<Arc<dyn Source>> = Vec::with_capacity(self.sources.len() + 1);
        if self.with_env {
            sources.push(Arc::new(Environment));
        }
        sources.extend(self.sources.iter().cloned());
        sources
    }
}

impl<T: 'static> Loader<T> {
    /// Add a check that runs after a successful population
    pub fn with_validation<E, F>(self, check: F) -> Self
    where
        F: Fn(&T) -> Result<(), E> + Send + Sync + 'static,
        E: Into<BoxError>,
    {
        self.option(LoadOption::Validation(validator(check)))
    }
}

impl<T: Configurable> Loader<T> {
    /// Resolve every source, merge, populate `target` and validate it
    ///
    /// The target is only modified once every source succeeded and every
    /// present value coerced. A validation failure leaves the populated
    /// values in place.
    pub fn load(&self, target: &mut T) -> Result<(), LoadError> {
        let schema = T::schema();
        schema.check(&self.prefix)?;

        let keys = Arc::new(derive_keys(&schema, &self.prefix));
        let sources = self.sources();
        debug!(
            config = schema.type_name,
            keys = keys.len(),
            sources = sources.len(),
            prefix = %self.prefix,
            "loading configuration"
        );

        let results = resolve(&sources, keys)?;
        let merged = merge(&results);
        let assignments = plan(&schema, &merged, &self.prefix)?;
        debug!(assigned = assignments.len(), "populating");
        apply(target, assignments)?;

        run_validators(target, &self.validators)
    }
}

impl<T> Default for Loader<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Load `target` using an ordered list of options
pub fn load<T: Configurable>(
    target: &mut T,
    options: impl IntoIterator<Item = LoadOption<T>>,
) -> Result<(), LoadError> {
    options
        .into_iter()
        .fold(Loader::new(), Loader::option)
        .load(target)
}
