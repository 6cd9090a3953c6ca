// munkireport-filter - util/constants.rs
//
// Single source of truth for all named constants, paths, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "munkireport-filter";

/// Application identifier used for the platform config directory.
pub const APP_ID: &str = "munkireport-filter";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Munki source report
// =============================================================================

/// Preference domain Munki reads its client configuration from.
pub const PREFERENCE_DOMAIN: &str = "ManagedInstalls";

/// Preference key holding the managed-install directory.
pub const MANAGED_INSTALL_DIR_KEY: &str = "ManagedInstallDir";

/// Munki's install directory when `ManagedInstallDir` is not configured.
pub const DEFAULT_MANAGED_INSTALL_DIR: &str = "/Library/Managed Installs";

/// File name of the report Munki writes at the end of every run.
pub const MANAGED_INSTALL_REPORT_FILE: &str = "ManagedInstallReport.plist";

// =============================================================================
// Preference store search path
// =============================================================================

/// Configuration-profile (MDM) preferences. Forced values win over everything.
pub const MANAGED_PREFERENCES_DIR: &str = "/Library/Managed Preferences";

/// Per-user preferences, relative to the home directory.
pub const USER_PREFERENCES_SUBDIR: &str = "Library/Preferences";

/// Machine-wide preferences.
pub const SYSTEM_PREFERENCES_DIR: &str = "/Library/Preferences";

/// File extension for preference domain files.
pub const PREFERENCE_FILE_EXTENSION: &str = "plist";

// =============================================================================
// Output
// =============================================================================

/// Cache directory name, relative to the directory holding the executable.
pub const CACHE_DIR_NAME: &str = "cache";

/// File name of the filtered report inside the cache directory.
pub const OUTPUT_FILE_NAME: &str = "munkireport.plist";

// =============================================================================
// Summary
// =============================================================================

/// Single-message events are truncated to this many characters.
pub const MAX_EVENT_MESSAGE_CHARS: usize = 100;

/// Marker appended to a truncated event message.
pub const TRUNCATION_MARKER: &str = "...";

/// Errors Munki logs while the client is offline. These are not actionable
/// by admins and are dropped from the reporting summary.
pub const DEFAULT_SUPPRESSED_ERROR_PATTERNS: &[&str] = &[
    r"\(-1009,.*Internet connection appears to be offline",
    r"\(-1001,.*request timed out",
    r"\(-1005,.*network connection was lost",
    r"\(-1004,.*Could not connect to the server",
    r"\(-1003,.*A server with the specified hostname could not be found",
];

/// Warning suppression is opt-in through `config.toml`.
pub const DEFAULT_SUPPRESSED_WARNING_PATTERNS: &[&str] = &[];

/// Timestamp layout Munki uses when it stores run times as strings.
pub const MUNKI_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

// =============================================================================
// Logging
// =============================================================================

/// Default log level. A normal run stays silent unless something is wrong.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Accepted values for `[logging] level`.
pub const VALID_LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

// =============================================================================
// Configuration
// =============================================================================

/// Config file name, looked up in the platform config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";
