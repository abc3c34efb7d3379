use crate::error::{BoxError, LoadError};
use tracing::debug;

/// A check run against the populated configuration
pub type Validator<T> = Box<dyn Fn(&T) -> Result<(), BoxError> + Send + Sync>;

/// Wraps a closure returning any error convertible into [`BoxError`]
pub fn validator<T, E, F>(check: F) -> Validator<T>
where
    T: 'static,
    F: Fn(&T) -> Result<(), E> + Send + Sync + 'static,
    E: Into<BoxError>,
{
    Box::new(move |target: &T| check(target).map_err(Into::into))
}

/// Runs validators in registration order, stopping at the first rejection
pub fn run_validators<T>(target: &T, validators: &[Validator<T>]) -> Result<(), LoadError> {
    for (index, check) in validators.iter().enumerate() {
        check(target).map_err(|source| {
            debug!(index, error = %source, "validation failed");
            LoadError::Validation { index, source }
        })?;
    }
    Ok(())
}
