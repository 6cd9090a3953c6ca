// munkireport-filter - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// No string-based error propagation. All errors keep their causal chain
// so `main` can log the full context before exiting.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all munkireport-filter operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum MunkiReportError {
    /// Reading or writing a report plist failed.
    Report(ReportError),

    /// Building the reporting summary failed.
    Summary(SummaryError),

    /// Writing a report or summary to stdout failed.
    Print(PrintError),

    /// Configuration loading or validation failed.
    Config(ConfigError),

    /// I/O error with path context.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },
}

impl fmt::Display for MunkiReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Report(e) => write!(f, "Report error: {e}"),
            Self::Summary(e) => write!(f, "Summary error: {e}"),
            Self::Print(e) => write!(f, "Output error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Io {
                path,
                operation,
                source,
            } => write!(
                f,
                "I/O error during {operation} on '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for MunkiReportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Report(e) => Some(e),
            Self::Summary(e) => Some(e),
            Self::Print(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Io { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Report errors
// ---------------------------------------------------------------------------

/// Errors related to reading the Munki report and writing the filtered copy.
///
/// A missing source report is deliberately absent from this list: it is
/// reported as `Ok(None)` by the reader and treated as an empty report.
#[derive(Debug)]
pub enum ReportError {
    /// The source report exists but is not a valid property list.
    Malformed {
        path: PathBuf,
        source: plist::Error,
    },

    /// The source report parsed, but its root is not a dictionary.
    NotADictionary { path: PathBuf },

    /// The filtered report could not be encoded to the output file.
    Serialize {
        path: PathBuf,
        source: plist::Error,
    },

    /// I/O error opening, creating, or flushing a report file.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed { path, source } => write!(
                f,
                "Error creating plist from '{}': {source}",
                path.display()
            ),
            Self::NotADictionary { path } => write!(
                f,
                "Report '{}' is a property list, but its root is not a dictionary",
                path.display()
            ),
            Self::Serialize { path, source } => {
                write!(f, "Failed to write plist '{}': {source}", path.display())
            }
            Self::Io {
                path,
                operation,
                source,
            } => write!(
                f,
                "I/O error during {operation} on '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for ReportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Malformed { source, .. } => Some(source),
            Self::Serialize { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            Self::NotADictionary { .. } => None,
        }
    }
}

impl From<ReportError> for MunkiReportError {
    fn from(e: ReportError) -> Self {
        Self::Report(e)
    }
}

// ---------------------------------------------------------------------------
// Summary errors
// ---------------------------------------------------------------------------

/// Errors related to building the reporting summary.
#[derive(Debug)]
pub enum SummaryError {
    /// A suppression pattern is not a valid regex.
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },
}

impl fmt::Display for SummaryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPattern { pattern, source } => {
                write!(f, "Invalid suppression pattern '{pattern}': {source}")
            }
        }
    }
}

impl std::error::Error for SummaryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidPattern { source, .. } => Some(source),
        }
    }
}

impl From<SummaryError> for MunkiReportError {
    fn from(e: SummaryError) -> Self {
        Self::Summary(e)
    }
}

// ---------------------------------------------------------------------------
// Print errors
// ---------------------------------------------------------------------------

/// Errors writing human-facing output to stdout.
#[derive(Debug)]
pub enum PrintError {
    /// XML plist encoding of the filtered report failed.
    Plist(plist::Error),

    /// JSON encoding of the summary failed.
    Json(serde_json::Error),

    /// stdout could not be written or flushed.
    Io(io::Error),
}

impl fmt::Display for PrintError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plist(source) => write!(f, "Failed to print report plist: {source}"),
            Self::Json(source) => write!(f, "Failed to print summary JSON: {source}"),
            Self::Io(source) => write!(f, "Failed to write to stdout: {source}"),
        }
    }
}

impl std::error::Error for PrintError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Plist(source) => Some(source),
            Self::Json(source) => Some(source),
            Self::Io(source) => Some(source),
        }
    }
}

impl From<PrintError> for MunkiReportError {
    fn from(e: PrintError) -> Self {
        Self::Print(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
///
/// Config problems never abort a run; `platform::config::load_config`
/// renders them into warnings and falls back to defaults.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// A config value is not acceptable.
    InvalidValue {
        field: String,
        value: String,
        expected: String,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::InvalidValue {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is not valid. Expected: {expected}"
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for MunkiReportError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Convenience type alias for munkireport-filter results.
pub type Result<T> = std::result::Result<T, MunkiReportError>;
