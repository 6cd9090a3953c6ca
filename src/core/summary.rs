// munkireport-filter - core/summary.rs
//
// Reporting summary derived from a filtered report: the same view the
// MunkiReport server builds when it ingests `munkireport.plist`.
//
// Errors and warnings matching a suppression pattern are dropped before
// counting. The remaining counts decide which client event is raised.
// Core layer: pure logic, no I/O.

use crate::core::model::{FilteredReport, ReportKey};
use crate::util::constants;
use crate::util::error::SummaryError;
use chrono::{DateTime, Utc};
use plist::Value;
use regex::{Regex, RegexBuilder};
use serde::Serialize;
use std::time::SystemTime;

// =============================================================================
// Suppression rules
// =============================================================================

/// Compiled, case-insensitive suppression patterns.
#[derive(Debug, Clone, Default)]
pub struct SuppressionRules {
    errors: Vec<Regex>,
    warnings: Vec<Regex>,
}

impl SuppressionRules {
    /// The built-in rules (offline network errors) plus any extra patterns.
    ///
    /// Invalid extra patterns are skipped and returned alongside the rules so
    /// the caller can surface them as warnings.
    pub fn with_extra(
        extra_errors: &[String],
        extra_warnings: &[String],
    ) -> (Self, Vec<SummaryError>) {
        let mut problems = Vec::new();

        let mut errors: Vec<&str> = constants::DEFAULT_SUPPRESSED_ERROR_PATTERNS.to_vec();
        errors.extend(extra_errors.iter().map(String::as_str));
        let mut warnings: Vec<&str> = constants::DEFAULT_SUPPRESSED_WARNING_PATTERNS.to_vec();
        warnings.extend(extra_warnings.iter().map(String::as_str));

        let rules = Self {
            errors: compile_all(&errors, &mut problems),
            warnings: compile_all(&warnings, &mut problems),
        };
        (rules, problems)
    }

    /// True if `message` matches an error suppression pattern.
    pub fn suppresses_error(&self, message: &str) -> bool {
        self.errors.iter().any(|re| re.is_match(message))
    }

    /// True if `message` matches a warning suppression pattern.
    pub fn suppresses_warning(&self, message: &str) -> bool {
        self.warnings.iter().any(|re| re.is_match(message))
    }
}

fn compile_all(patterns: &[&str], problems: &mut Vec<SummaryError>) -> Vec<Regex> {
    let mut compiled = Vec::new();
    for &pattern in patterns {
        match RegexBuilder::new(pattern).case_insensitive(true).build() {
            Ok(re) => compiled.push(re),
            Err(source) => problems.push(SummaryError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            }),
        }
    }
    compiled
}

// =============================================================================
// Summary
// =============================================================================

/// Client event raised for a run, most severe first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "level", rename_all = "snake_case")]
pub enum ReportEvent {
    /// At least one error. `message` is set only for a single error.
    Danger {
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        count: usize,
    },
    /// No errors, at least one warning. `message` is set only for a single warning.
    Warning {
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        count: usize,
    },
    /// Clean run; any previous event should be cleared.
    None,
}

impl ReportEvent {
    /// Event name as stored by the server, if an event is raised.
    pub fn kind(&self) -> Option<&'static str> {
        match self {
            Self::Danger { .. } => Some("munki.error"),
            Self::Warning { .. } => Some("munki.warning"),
            Self::None => None,
        }
    }
}

/// Server-side view of one Munki run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportSummary {
    pub version: Option<String>,
    pub manifest_name: Option<String>,
    pub run_type: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub error_count: usize,
    pub warning_count: usize,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub event: ReportEvent,
}

/// Summarise a filtered report under the given suppression rules.
pub fn summarize(report: &FilteredReport, rules: &SuppressionRules) -> ReportSummary {
    let errors: Vec<String> = messages(report, ReportKey::Errors)
        .into_iter()
        .filter(|m| !rules.suppresses_error(m))
        .collect();
    let warnings: Vec<String> = messages(report, ReportKey::Warnings)
        .into_iter()
        .filter(|m| !rules.suppresses_warning(m))
        .collect();

    let event = classify(&errors, &warnings);
    tracing::debug!(
        errors = errors.len(),
        warnings = warnings.len(),
        event = event.kind().unwrap_or("none"),
        "Report summarised"
    );

    ReportSummary {
        version: text(report, ReportKey::ManagedInstallVersion),
        manifest_name: text(report, ReportKey::ManifestName),
        run_type: text(report, ReportKey::RunType),
        start_time: timestamp(report, ReportKey::StartTime),
        end_time: timestamp(report, ReportKey::EndTime),
        error_count: errors.len(),
        warning_count: warnings.len(),
        errors,
        warnings,
        event,
    }
}

fn classify(errors: &[String], warnings: &[String]) -> ReportEvent {
    match (errors, warnings) {
        ([only], _) => ReportEvent::Danger {
            message: Some(truncate_message(only)),
            count: 1,
        },
        ([], [only]) => ReportEvent::Warning {
            message: Some(truncate_message(only)),
            count: 1,
        },
        ([], []) => ReportEvent::None,
        ([], many) => ReportEvent::Warning {
            message: None,
            count: many.len(),
        },
        (many, _) => ReportEvent::Danger {
            message: None,
            count: many.len(),
        },
    }
}

/// Shorten a message for an event payload, on a character boundary.
pub fn truncate_message(message: &str) -> String {
    if message.chars().count() <= constants::MAX_EVENT_MESSAGE_CHARS {
        return message.to_string();
    }
    let mut short: String = message
        .chars()
        .take(constants::MAX_EVENT_MESSAGE_CHARS)
        .collect();
    short.push_str(constants::TRUNCATION_MARKER);
    short
}

/// String entries of a message list. Non-string entries are ignored.
fn messages(report: &FilteredReport, key: ReportKey) -> Vec<String> {
    match report.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_string)
            .map(str::to_string)
            .collect(),
        Some(Value::String(single)) => vec![single.clone()],
        _ => Vec::new(),
    }
}

fn text(report: &FilteredReport, key: ReportKey) -> Option<String> {
    report
        .get(key)
        .and_then(Value::as_string)
        .map(str::to_string)
}

/// Munki stores run times either as plist dates or as
/// `"YYYY-MM-DD HH:MM:SS +0000"` strings; both are accepted.
fn timestamp(report: &FilteredReport, key: ReportKey) -> Option<DateTime<Utc>> {
    match report.get(key)? {
        Value::Date(date) => Some(DateTime::<Utc>::from(SystemTime::from(*date))),
        Value::String(s) => parse_timestamp(s).or_else(|| {
            tracing::debug!(key = key.as_str(), value = %s, "Unrecognised timestamp");
            None
        }),
        _ => None,
    }
}

/// Parse a Munki timestamp string, falling back to RFC 3339.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(s.trim(), constants::MUNKI_TIMESTAMP_FORMAT)
        .or_else(|_| DateTime::parse_from_rfc3339(s.trim()))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::filter::filter_report;
    use crate::core::model::SourceReport;
    use chrono::TimeZone;
    use plist::Dictionary;

    fn report(entries: Vec<(&str, Value)>) -> FilteredReport {
        let mut dict = Dictionary::new();
        for (k, v) in entries {
            dict.insert(k.to_string(), v);
        }
        filter_report(&SourceReport::new(dict))
    }

    fn strings(items: &[&str]) -> Value {
        Value::Array(items.iter().map(|s| Value::String(s.to_string())).collect())
    }

    fn default_rules() -> SuppressionRules {
        let (rules, problems) = SuppressionRules::with_extra(&[], &[]);
        assert!(problems.is_empty(), "built-in patterns must compile: {problems:?}");
        rules
    }

    const OFFLINE: &str = "Could not retrieve managed install primary manifest: \
        (-1009, 'The Internet connection appears to be offline.')";

    #[test]
    fn test_offline_errors_are_suppressed() {
        let rules = default_rules();
        assert!(rules.suppresses_error(OFFLINE));
        assert!(rules.suppresses_error(
            "Error (-1001, 'The REQUEST timed out.')"
        ));
        assert!(!rules.suppresses_error("Could not process item Firefox"));
        assert!(!rules.suppresses_warning(OFFLINE));
    }

    #[test]
    fn test_single_error_event_carries_message() {
        let summary = summarize(
            &report(vec![("Errors", strings(&["disk full", OFFLINE]))]),
            &default_rules(),
        );
        assert_eq!(summary.errors, vec!["disk full".to_string()]);
        assert_eq!(summary.error_count, 1);
        assert_eq!(
            summary.event,
            ReportEvent::Danger {
                message: Some("disk full".to_string()),
                count: 1
            }
        );
        assert_eq!(summary.event.kind(), Some("munki.error"));
    }

    #[test]
    fn test_errors_outrank_warnings() {
        let summary = summarize(
            &report(vec![
                ("Errors", strings(&["e1", "e2", "e1"])),
                ("Warnings", strings(&["w1"])),
            ]),
            &default_rules(),
        );
        assert_eq!(summary.error_count, 2);
        assert_eq!(summary.warning_count, 1);
        assert_eq!(
            summary.event,
            ReportEvent::Danger {
                message: None,
                count: 2
            }
        );
    }

    #[test]
    fn test_warning_events() {
        let rules = default_rules();
        let single = summarize(&report(vec![("Warnings", strings(&["w1"]))]), &rules);
        assert_eq!(
            single.event,
            ReportEvent::Warning {
                message: Some("w1".to_string()),
                count: 1
            }
        );

        let many = summarize(&report(vec![("Warnings", strings(&["w1", "w2"]))]), &rules);
        assert_eq!(
            many.event,
            ReportEvent::Warning {
                message: None,
                count: 2
            }
        );
        assert_eq!(many.event.kind(), Some("munki.warning"));
    }

    #[test]
    fn test_only_suppressed_errors_means_clean_run() {
        let summary = summarize(
            &report(vec![("Errors", strings(&[OFFLINE]))]),
            &default_rules(),
        );
        assert_eq!(summary.error_count, 0);
        assert_eq!(summary.event, ReportEvent::None);
        assert_eq!(summary.event.kind(), None);
    }

    #[test]
    fn test_extra_patterns_and_invalid_pattern() {
        let (rules, problems) = SuppressionRules::with_extra(
            &["^Ignored:".to_string(), "(unclosed".to_string()],
            &["^Optional update".to_string()],
        );
        assert_eq!(problems.len(), 1);
        assert!(problems[0].to_string().contains("(unclosed"));
        assert!(rules.suppresses_error("ignored: something"));
        assert!(rules.suppresses_warning("Optional update available"));
        assert!(rules.suppresses_error(OFFLINE));
    }

    #[test]
    fn test_truncate_message() {
        let short = "short message";
        assert_eq!(truncate_message(short), short);

        let long = "é".repeat(constants::MAX_EVENT_MESSAGE_CHARS + 5);
        let truncated = truncate_message(&long);
        assert!(truncated.ends_with(constants::TRUNCATION_MARKER));
        assert_eq!(
            truncated.chars().count(),
            constants::MAX_EVENT_MESSAGE_CHARS + constants::TRUNCATION_MARKER.len()
        );
    }

    #[test]
    fn test_scalar_fields_and_string_timestamps() {
        let summary = summarize(
            &report(vec![
                ("ManagedInstallVersion", Value::String("6.3.1.4580".into())),
                ("ManifestName", Value::String("site_default".into())),
                ("RunType", Value::String("auto".into())),
                ("StartTime", Value::String("2024-03-01 09:15:00 +0000".into())),
                ("EndTime", Value::String("not a time".into())),
            ]),
            &default_rules(),
        );
        assert_eq!(summary.version.as_deref(), Some("6.3.1.4580"));
        assert_eq!(summary.manifest_name.as_deref(), Some("site_default"));
        assert_eq!(summary.run_type.as_deref(), Some("auto"));
        assert_eq!(
            summary.start_time,
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 9, 15, 0).unwrap())
        );
        assert_eq!(summary.end_time, None);
        assert_eq!(summary.event, ReportEvent::None);
    }

    #[test]
    fn test_date_values_become_utc() {
        let end = Utc.with_ymd_and_hms(2024, 3, 1, 9, 20, 0).unwrap();
        let date: plist::Date = SystemTime::from(end).into();
        let summary = summarize(
            &report(vec![("EndTime", Value::Date(date))]),
            &default_rules(),
        );
        assert_eq!(summary.end_time, Some(end));
    }

    #[test]
    fn test_parse_timestamp_accepts_rfc3339() {
        assert_eq!(
            parse_timestamp("2024-03-01T09:15:00Z"),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 9, 15, 0).unwrap())
        );
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn test_summary_json_shape() {
        let summary = summarize(
            &report(vec![("Errors", strings(&["disk full"]))]),
            &default_rules(),
        );
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["error_count"], 1);
        assert_eq!(json["event"]["level"], "danger");
        assert_eq!(json["event"]["message"], "disk full");

        let clean = summarize(&report(vec![]), &default_rules());
        let json = serde_json::to_value(&clean).unwrap();
        assert_eq!(json["event"]["level"], "none");
        assert!(json["version"].is_null());
    }
}
