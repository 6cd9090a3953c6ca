// munkireport-filter - platform/preferences.rs
//
// Preference-domain lookup, used to find where Munki keeps its report.
//
// `PlistPreferenceStore` reads the domain's plist files directly, in the
// same precedence order macOS applies for an application domain:
// configuration-profile (forced) values, then the current user, then
// the machine-wide file. Tests use `StaticPreferenceStore`.

use crate::util::constants;
use directories::BaseDirs;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Read-only access to application preference domains.
pub trait PreferenceStore {
    /// Look up a string value under `domain`. Absent, empty, or
    /// non-string values return `None`.
    fn lookup(&self, domain: &str, key: &str) -> Option<String>;
}

// =============================================================================
// Plist-backed store
// =============================================================================

/// Preference store backed by `<dir>/<domain>.plist` files.
#[derive(Debug, Clone)]
pub struct PlistPreferenceStore {
    /// Directories searched in order; the first hit wins.
    search_dirs: Vec<PathBuf>,
}

impl PlistPreferenceStore {
    /// The standard macOS search path for the current user.
    pub fn system() -> Self {
        let mut search_dirs = vec![PathBuf::from(constants::MANAGED_PREFERENCES_DIR)];
        if let Some(base) = BaseDirs::new() {
            search_dirs.push(base.home_dir().join(constants::USER_PREFERENCES_SUBDIR));
        } else {
            tracing::debug!("No home directory; skipping user preferences");
        }
        search_dirs.push(PathBuf::from(constants::SYSTEM_PREFERENCES_DIR));
        Self { search_dirs }
    }

    /// A store that searches exactly `search_dirs`, in order.
    pub fn with_search_dirs(search_dirs: Vec<PathBuf>) -> Self {
        Self { search_dirs }
    }

    pub fn search_dirs(&self) -> &[PathBuf] {
        &self.search_dirs
    }

    fn lookup_in(path: &Path, key: &str) -> Option<String> {
        let value = match plist::Value::from_file(path) {
            Ok(v) => v,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Unreadable preference file");
                return None;
            }
        };
        value
            .as_dictionary()?
            .get(key)?
            .as_string()
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    }
}

impl PreferenceStore for PlistPreferenceStore {
    fn lookup(&self, domain: &str, key: &str) -> Option<String> {
        let file_name = format!("{domain}.{}", constants::PREFERENCE_FILE_EXTENSION);
        for dir in &self.search_dirs {
            let path = dir.join(&file_name);
            if !path.is_file() {
                continue;
            }
            if let Some(value) = Self::lookup_in(&path, key) {
                tracing::debug!(domain, key, path = %path.display(), "Preference found");
                return Some(value);
            }
        }
        tracing::debug!(domain, key, "Preference not set");
        None
    }
}

// =============================================================================
// Static store
// =============================================================================

/// Fixed in-memory preferences.
#[derive(Debug, Clone, Default)]
pub struct StaticPreferenceStore {
    values: HashMap<(String, String), String>,
}

impl StaticPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, domain: &str, key: &str, value: &str) -> Self {
        self.values
            .insert((domain.to_string(), key.to_string()), value.to_string());
        self
    }
}

impl PreferenceStore for StaticPreferenceStore {
    fn lookup(&self, domain: &str, key: &str) -> Option<String> {
        self.values
            .get(&(domain.to_string(), key.to_string()))
            .filter(|s| !s.is_empty())
            .cloned()
    }
}

// =============================================================================
// Report path resolution
// =============================================================================

/// Resolve the path of Munki's `ManagedInstallReport.plist`.
///
/// `ManagedInstallDir` from the `ManagedInstalls` domain wins; without it
/// Munki's default install directory is used. Never fails.
pub fn resolve_report_path(store: &dyn PreferenceStore) -> PathBuf {
    let install_dir = match store.lookup(
        constants::PREFERENCE_DOMAIN,
        constants::MANAGED_INSTALL_DIR_KEY,
    ) {
        Some(dir) => PathBuf::from(dir),
        None => PathBuf::from(constants::DEFAULT_MANAGED_INSTALL_DIR),
    };
    install_dir.join(constants::MANAGED_INSTALL_REPORT_FILE)
}
