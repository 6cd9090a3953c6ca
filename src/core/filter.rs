// munkireport-filter - core/filter.rs
//
// Field selection and message deduplication.
// Core layer: pure logic, no I/O.

use crate::core::model::{FilteredReport, ReportKey, SourceReport};
use plist::Value;

/// Build the filtered report from Munki's full report.
///
/// A recognised key is copied only when its value has content (see
/// `has_content`). `Errors` and `Warnings` arrays are deduplicated, keeping
/// the first occurrence of each message: Munki logs a missing catalog once
/// per processing phase, so the raw lists repeat themselves.
pub fn filter_report(source: &SourceReport) -> FilteredReport {
    let mut filtered = FilteredReport::default();

    for key in ReportKey::ALL {
        let Some(value) = source.get(key.as_str()) else {
            continue;
        };
        if !has_content(value) {
            tracing::trace!(key = key.as_str(), "Skipping empty value");
            continue;
        }

        let value = match value {
            Value::Array(items) if key.is_message_list() => {
                let unique = unique_in_order(items);
                if unique.len() != items.len() {
                    tracing::debug!(
                        key = key.as_str(),
                        before = items.len(),
                        after = unique.len(),
                        "Collapsed duplicate messages"
                    );
                }
                Value::Array(unique)
            }
            other => other.clone(),
        };
        filtered.insert(key, value);
    }

    filtered
}

/// Keep the first occurrence of each element, preserving order.
pub fn unique_in_order<T: PartialEq + Clone>(items: &[T]) -> Vec<T> {
    let mut unique: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        if !unique.contains(item) {
            unique.push(item.clone());
        }
    }
    unique
}

/// Whether a value carries anything worth reporting.
///
/// Empty strings, collections and data blobs, numeric zero and `false` are
/// treated as absent. Dates and UIDs always count.
pub fn has_content(value: &Value) -> bool {
    match value {
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Dictionary(dict) => !dict.is_empty(),
        Value::Data(bytes) => !bytes.is_empty(),
        Value::Boolean(b) => *b,
        Value::Integer(i) => i.as_signed() != Some(0) && i.as_unsigned() != Some(0),
        Value::Real(r) => *r != 0.0,
        _ => true,
    }
}
