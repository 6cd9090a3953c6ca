// munkireport-filter - platform/config.rs
//
// Platform path resolution and config.toml loading with startup validation.
//
// Uses the `directories` crate for the config directory (XDG on Linux,
// ~/Library/Application Support on macOS). The cache directory is derived
// from the executable's own location, since MunkiReport installs the
// filter script and its cache side by side.

use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::io;
use std::path::{Path, PathBuf};

/// Resolved platform paths.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/munkireport-filter/).
    pub config_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            tracing::debug!(config = %config_dir.display(), "Platform paths resolved");
            Self { config_dir }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            Self {
                config_dir: PathBuf::from("."),
            }
        }
    }

    /// Default location of `config.toml`.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

/// `cache/` next to the running executable, with symlinks resolved.
pub fn default_cache_dir() -> io::Result<PathBuf> {
    let exe = std::env::current_exe()?.canonicalize()?;
    let program_dir = exe.parent().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("executable '{}' has no parent directory", exe.display()),
        )
    })?;
    Ok(program_dir.join(constants::CACHE_DIR_NAME))
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// `[paths]` section.
    pub paths: PathsSection,
    /// `[logging]` section.
    pub logging: LoggingSection,
    /// `[suppression]` section.
    pub suppression: SuppressionSection,
}

/// `[paths]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct PathsSection {
    /// Overrides the `ManagedInstallDir` preference.
    pub managed_install_dir: Option<String>,
    /// Overrides the executable-relative cache directory.
    pub cache_dir: Option<String>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

/// `[suppression]` config section. Patterns are case-insensitive regexes.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct SuppressionSection {
    pub error_patterns: Option<Vec<String>>,
    pub warning_patterns: Option<Vec<String>>,
}

/// Validated application configuration derived from `config.toml`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppConfig {
    pub managed_install_dir: Option<PathBuf>,
    pub cache_dir: Option<PathBuf>,
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
    /// Extra error suppression patterns, appended to the built-in ones.
    pub error_patterns: Vec<String>,
    pub warning_patterns: Vec<String>,
}

/// Load and validate the config file at `config_path`.
///
/// Returns `AppConfig` with validated values and a list of non-fatal warnings.
/// If the file does not exist, returns defaults with no warnings.
/// If the file is unreadable or unparseable, returns defaults with a warning.
/// Warnings are returned rather than logged: this runs before logging is
/// initialised, because the config chooses the log level.
pub fn load_config(config_path: &Path) -> (AppConfig, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();

    if !config_path.exists() {
        return (AppConfig::default(), warnings);
    }

    let content = match std::fs::read_to_string(config_path) {
        Ok(c) => c,
        Err(e) => {
            let err = ConfigError::Io {
                path: config_path.to_path_buf(),
                source: e,
            };
            warnings.push(format!("{err}. Using defaults."));
            return (AppConfig::default(), warnings);
        }
    };

    let raw: RawConfig = match toml::from_str(&content) {
        Ok(r) => r,
        Err(e) => {
            let err = ConfigError::TomlParse {
                path: config_path.to_path_buf(),
                source: e,
            };
            warnings.push(format!("{err}. Using defaults."));
            return (AppConfig::default(), warnings);
        }
    };

    let mut config = AppConfig::default();

    // -- Paths --
    config.managed_install_dir =
        non_empty_path("[paths] managed_install_dir", raw.paths.managed_install_dir, &mut warnings);
    config.cache_dir = non_empty_path("[paths] cache_dir", raw.paths.cache_dir, &mut warnings);

    // -- Logging: level --
    if let Some(level) = raw.logging.level {
        let lowered = level.to_lowercase();
        if constants::VALID_LOG_LEVELS.contains(&lowered.as_str()) {
            config.log_level = Some(lowered);
        } else {
            let err = ConfigError::InvalidValue {
                field: "[logging] level".to_string(),
                value: level,
                expected: format!("one of {}", constants::VALID_LOG_LEVELS.join(", ")),
            };
            warnings.push(format!("{err}. Using default ({}).", constants::DEFAULT_LOG_LEVEL));
        }
    }

    // -- Suppression patterns --
    config.error_patterns = non_empty_patterns(
        "[suppression] error_patterns",
        raw.suppression.error_patterns,
        &mut warnings,
    );
    config.warning_patterns = non_empty_patterns(
        "[suppression] warning_patterns",
        raw.suppression.warning_patterns,
        &mut warnings,
    );

    (config, warnings)
}

fn non_empty_path(
    field: &str,
    value: Option<String>,
    warnings: &mut Vec<String>,
) -> Option<PathBuf> {
    match value {
        Some(v) if v.trim().is_empty() => {
            let err = ConfigError::InvalidValue {
                field: field.to_string(),
                value: v,
                expected: "a non-empty path".to_string(),
            };
            warnings.push(format!("{err}. Ignoring."));
            None
        }
        Some(v) => Some(PathBuf::from(v)),
        None => None,
    }
}

/// An empty pattern would suppress every message, so it is dropped.
fn non_empty_patterns(
    field: &str,
    value: Option<Vec<String>>,
    warnings: &mut Vec<String>,
) -> Vec<String> {
    let mut patterns = Vec::new();
    for pattern in value.unwrap_or_default() {
        if pattern.is_empty() {
            let err = ConfigError::InvalidValue {
                field: field.to_string(),
                value: pattern,
                expected: "a non-empty regex".to_string(),
            };
            warnings.push(format!("{err}. Skipping."));
        } else {
            patterns.push(pattern);
        }
    }
    patterns
}
