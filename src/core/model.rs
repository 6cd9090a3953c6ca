// munkireport-filter - core/model.rs
//
// Core data model types. Pure data definitions with no I/O.
//
// Reports are kept as `plist::Dictionary` values rather than typed structs:
// Munki's report is open-ended, and every recognised value is copied through
// with its original plist type (string, date, array, ...).

use plist::{Dictionary, Value};

// =============================================================================
// Report keys
// =============================================================================

/// The fields of `ManagedInstallReport.plist` that are forwarded to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReportKey {
    EndTime,
    Errors,
    ManagedInstallVersion,
    ManifestName,
    RunType,
    StartTime,
    Warnings,
}

impl ReportKey {
    /// Every recognised key, in the order they are written to the output.
    ///
    /// Alphabetical, so the encoded output is stable across runs.
    pub const ALL: [ReportKey; 7] = [
        ReportKey::EndTime,
        ReportKey::Errors,
        ReportKey::ManagedInstallVersion,
        ReportKey::ManifestName,
        ReportKey::RunType,
        ReportKey::StartTime,
        ReportKey::Warnings,
    ];

    /// The key as it appears in the plist.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EndTime => "EndTime",
            Self::Errors => "Errors",
            Self::ManagedInstallVersion => "ManagedInstallVersion",
            Self::ManifestName => "ManifestName",
            Self::RunType => "RunType",
            Self::StartTime => "StartTime",
            Self::Warnings => "Warnings",
        }
    }

    /// Look up a key by its plist name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }

    /// True for the message lists that are deduplicated on output.
    pub fn is_message_list(self) -> bool {
        matches!(self, Self::Errors | Self::Warnings)
    }
}

// =============================================================================
// Source report
// =============================================================================

/// The report as Munki wrote it. Read-only; never modified.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceReport {
    entries: Dictionary,
}

impl SourceReport {
    pub fn new(entries: Dictionary) -> Self {
        Self { entries }
    }

    /// An empty report, used when Munki has not produced one yet.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// =============================================================================
// Filtered report
// =============================================================================

/// The subset of the source report that is written to the cache.
///
/// Only `ReportKey` entries are ever present. Instances are built by
/// `core::filter::filter_report`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredReport {
    entries: Dictionary,
}

impl FilteredReport {
    pub(crate) fn insert(&mut self, key: ReportKey, value: Value) {
        self.entries.insert(key.as_str().to_string(), value);
    }

    pub fn get(&self, key: ReportKey) -> Option<&Value> {
        self.entries.get(key.as_str())
    }

    /// Recognised keys present in this report, in output order.
    pub fn keys(&self) -> Vec<ReportKey> {
        self.entries
            .keys()
            .filter_map(|name| ReportKey::from_name(name))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Borrow the underlying dictionary for encoding.
    pub fn as_dictionary(&self) -> &Dictionary {
        &self.entries
    }

    /// Convert into a plist value for encoding.
    pub fn to_value(&self) -> Value {
        Value::Dictionary(self.entries.clone())
    }
}
