use crate::source::Mapping;
use tracing::trace;

/// Folds per-source results into one mapping
///
/// Later results override earlier ones key by key; a key missing from a
/// later result keeps its earlier value.
pub fn merge(results: &[Mapping]) -> Mapping {
    let mut merged = Mapping::new();
    for (index, result) in results.iter().enumerate() {
        for (key, value) in result {
            if let Some(previous) = merged.insert(key.clone(), value.clone()) {
                trace!(key = %key, index, previous = %previous, "value overridden");
            }
        }
    }
    merged
}
