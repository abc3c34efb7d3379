use colored::Colorize;
use std::path::PathBuf;
use thiserror::Error;

/// Boxed error used by custom sources and validators
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur during a configuration load
///
/// The variant tells which stage of the load failed.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The target's schema description cannot be loaded
    #[error(transparent)]
    Schema(#[from] SchemaError),
    /// A source failed; the whole load is aborted
    #[error(transparent)]
    Source(#[from] SourceError),
    /// A resolved value does not fit the declared field kind
    #[error(transparent)]
    Coerce(#[from] CoerceError),
    /// A validation callback rejected the populated object
    #[error("validation #{index} rejected the configuration: {source}")]
    Validation {
        index: usize,
        #[source]
        source: BoxError,
    },
}

/// Problems with the description of the target type
#[derive(Debug, Clone, Error)]
pub enum SchemaError {
    #[error("{}: unsupported field type {}", .path.magenta().bold(), .type_name.red())]
    Unsupported {
        path: String,
        type_name: &'static str,
    },
    #[error(
        "{}: field {} rejected a value of its own declared kind",
        .path.magenta().bold(),
        .index
    )]
    Mismatch { path: String, index: usize },
    #[error("{}: no nested struct at field {}", .path.magenta().bold(), .index)]
    NotNested { path: String, index: usize },
}

/// Failures reported by a source
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("error reading file {}: {source}", .path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("error parsing JSON from {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("document from {origin} is not a JSON object")]
    NotAnObject { origin: String },
    #[error("error fetching remote file {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error(
        "fetch remote config error, {url} replied with status {}",
        .status.as_u16().to_string().red()
    )]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("error reading dotenv file {}: {source}", .path.display())]
    Dotenv {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },
    #[error("source {name} failed: {source}")]
    Custom {
        name: String,
        #[source]
        source: BoxError,
    },
    #[error("source {name} panicked")]
    Panicked { name: String },
}

/// A raw string value could not be converted into its field's kind
#[derive(Debug, Clone, Error)]
#[error("{}: Invalid value '{}' for {expected}: {reason}", .key.magenta().bold(), .value.red())]
pub struct CoerceError {
    pub key: String,
    pub value: String,
    pub expected: String,
    pub reason: String,
}
