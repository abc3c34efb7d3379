//! Concurrent fan-out of one key set to every registered source.

use crate::error::SourceError;
use crate::keys::KeySet;
use crate::source::{Mapping, Source};
use std::{
    sync::{Arc, mpsc},
    thread,
};
use tracing::{debug, warn};

type Outcome = (usize, Result<Mapping, SourceError>);

/// Runs every source on its own thread against the same keys
///
/// Results come back in registration order, regardless of which source
/// finished first. If any source fails, the failure of the lowest
/// registration index is returned as soon as it is known and every
/// source before it has succeeded; sources still running are left to
/// finish on their own and their results are dropped.
pub fn resolve(
    sources: &[Arc<dyn Source>],
    keys: Arc<KeySet>,
) -> Result<Vec<Mapping>, SourceError> {
    let (tx, rx) = mpsc::channel::<Outcome>();
    let mut slots: Vec<Option<Mapping>> = vec![None; sources.len()];
    let mut failures: Vec<Option<SourceError>> = (0..sources.len()).map(|_| None).collect();
    let mut pending = sources.len();

    for (index, source) in sources.iter().enumerate() {
        let source = Arc::clone(source);
        let keys = Arc::clone(&keys);
        let tx = tx.clone();
        let name = source.name();

        let spawned = thread::Builder::new()
            .name(format!("fusion-source-{}", index))
            .spawn(move || {
                debug!(source = %source.name(), index, "resolving");
                let outcome = run_guarded(source.as_ref(), &keys);
                // receiver is gone once the load has already failed
                let _ = tx.send((index, outcome));
            });

        if let Err(err) = spawned {
            warn!(source = %name, error = %err, "could not spawn source thread");
            failures[index] = Some(SourceError::Custom {
                name,
                source: Box::new(err),
            });
            pending -= 1;
        }
    }
    drop(tx);

    loop {
        if let Some(index) = first_decided_failure(&slots, &failures) {
            if let Some(err) = failures[index].take() {
                debug!(index, error = %err, "source failed, aborting load");
                return Err(err);
            }
        }
        if pending == 0 {
            break;
        }

        let Ok((index, outcome)) = rx.recv() else {
            break;
        };
        pending -= 1;

        match outcome {
            Ok(found) => {
                let found = drop_unrequested(&sources[index].name(), found, &keys);
                debug!(index, found = found.len(), "source finished");
                slots[index] = Some(found);
            }
            Err(err) => failures[index] = Some(err),
        }
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| {
            slot.ok_or_else(|| SourceError::Panicked {
                name: sources[index].name(),
            })
        })
        .collect()
}

/// Index of the earliest failure once every source before it succeeded
fn first_decided_failure(
    slots: &[Option<Mapping>],
    failures: &[Option<SourceError>],
) -> Option<usize> {
    for (index, failure) in failures.iter().enumerate() {
        if failure.is_some() {
            return Some(index);
        }
        if slots[index].is_none() {
            return None;
        }
    }
    None
}

fn run_guarded(source: &dyn Source, keys: &KeySet) -> Result<Mapping, SourceError> {
    std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| source.resolve(keys))).unwrap_or_else(
        |_| {
            Err(SourceError::Panicked {
                name: source.name(),
            })
        },
    )
}

fn drop_unrequested(name: &str, mut found: Mapping, keys: &KeySet) -> Mapping {
    let before = found.len();
    found.retain(|key, _| keys.contains(key));
    if found.len() != before {
        warn!(
            source = %name,
            dropped = before - found.len(),
            "source returned keys that were not requested"
        );
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoxError;
    use crate::source::FnSource;
    use std::time::Duration;

    fn fixed(name: &str, pairs: &[(&str, &str)]) -> Arc<dyn Source> {
        let mapping: Mapping = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Arc::new(FnSource::new(name, move |_keys: &KeySet| Ok(mapping.clone())))
    }

    fn slow(name: &str, delay: Duration, pairs: &[(&str, &str)]) -> Arc<dyn Source> {
        let mapping: Mapping = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Arc::new(FnSource::new(name, move |_keys: &KeySet| {
            thread::sleep(delay);
            Ok(mapping.clone())
        }))
    }

    fn failing(name: &str, message: &'static str) -> Arc<dyn Source> {
        Arc::new(FnSource::new(name, move |_keys: &KeySet| -> Result<Mapping, BoxError> {
            Err(message.into())
        }))
    }

    fn keys(names: &[&str]) -> Arc<KeySet> {
        Arc::new(names.iter().copied().collect())
    }

    #[test]
    fn test_results_follow_registration_order() {
        let sources = vec![
            slow("first", Duration::from_millis(100), &[("a", "1")]),
            fixed("second", &[("a", "2")]),
        ];

        let results = resolve(&sources, keys(&["a"])).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["a"], "1");
        assert_eq!(results[1]["a"], "2");
    }

    #[test]
    fn test_no_sources() {
        let results = resolve(&[], keys(&["a"])).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_failure_aborts() {
        colored::control::set_override(false);

        let sources = vec![fixed("ok", &[("a", "1")]), failing("broken", "boom")];

        let err = resolve(&sources, keys(&["a"])).unwrap_err();
        assert_eq!(err.to_string(), "source broken failed: boom");
    }

    #[test]
    fn test_lowest_index_failure_wins() {
        colored::control::set_override(false);

        let sources = vec![
            Arc::new(FnSource::new("late", |_keys: &KeySet| -> Result<Mapping, BoxError> {
                thread::sleep(Duration::from_millis(100));
                Err("late failure".into())
            })) as Arc<dyn Source>,
            failing("early", "early failure"),
        ];

        let err = resolve(&sources, keys(&["a"])).unwrap_err();
        assert_eq!(err.to_string(), "source late failed: late failure");
    }

    #[test]
    fn test_fails_fast_without_waiting_for_later_sources() {
        let sources = vec![
            failing("broken", "boom"),
            slow("sleepy", Duration::from_secs(5), &[]),
        ];

        let started = std::time::Instant::now();
        assert!(resolve(&sources, keys(&["a"])).is_err());
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn test_unrequested_keys_are_dropped() {
        let sources = vec![fixed("leaky", &[("a", "1"), ("secret", "x")])];

        let results = resolve(&sources, keys(&["a"])).unwrap();

        assert_eq!(results[0].len(), 1);
        assert!(!results[0].contains_key("secret"));
    }

    #[test]
    fn test_panicking_source_is_reported() {
        let sources: Vec<Arc<dyn Source>> = vec![Arc::new(FnSource::new(
            "explodes",
            |_keys: &KeySet| -> Result<Mapping, BoxError> { panic!("kaboom") },
        ))];

        let err = resolve(&sources, keys(&["a"])).unwrap_err();
        assert!(matches!(err, SourceError::Panicked { ref name } if name == "explodes"));
    }

    #[test]
    fn test_sources_share_the_same_keys() {
        let echo = |name: &str| -> Arc<dyn Source> {
            Arc::new(FnSource::new(name, |keys: &KeySet| {
                Ok(keys.iter().map(|k| (k.to_string(), k.to_string())).collect())
            }))
        };
        let sources = vec![echo("one"), echo("two")];

        let results = resolve(&sources, keys(&["x", "y"])).unwrap();
        assert_eq!(results[0], results[1]);
        assert_eq!(results[0].len(), 2);
    }
}
