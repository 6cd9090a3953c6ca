// munkireport-filter - app/pipeline.rs
//
// The single pass: resolve -> load -> filter -> write.
//
// Everything environment-dependent (preferences, cache location) comes in
// through `RunOptions` and the `PreferenceStore`, so the whole run can be
// exercised against a temp directory.

use crate::core::filter::filter_report;
use crate::core::model::{FilteredReport, SourceReport};
use crate::platform::config::default_cache_dir;
use crate::platform::fs::{read_report, write_report};
use crate::platform::preferences::{resolve_report_path, PreferenceStore};
use crate::util::constants;
use crate::util::error::{MunkiReportError, Result};
use std::path::{Path, PathBuf};

/// Overrides for one run. Everything defaults to Munki's own configuration.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Exact report file to read. Skips preference lookup.
    pub report_path: Option<PathBuf>,
    /// Directory holding `ManagedInstallReport.plist`. Skips preference lookup.
    pub managed_install_dir: Option<PathBuf>,
    /// Directory to write `munkireport.plist` into. Defaults to
    /// `cache/` next to the executable.
    pub cache_dir: Option<PathBuf>,
}

/// What a completed run read and wrote.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub report_path: PathBuf,
    pub output_path: PathBuf,
    /// False when Munki's report did not exist and an empty one was used.
    pub source_found: bool,
    pub report: FilteredReport,
}

/// Pick the source report path. CLI path > configured dir > preferences > default.
pub fn source_path(options: &RunOptions, prefs: &dyn PreferenceStore) -> PathBuf {
    if let Some(path) = &options.report_path {
        return path.clone();
    }
    if let Some(dir) = &options.managed_install_dir {
        return dir.join(constants::MANAGED_INSTALL_REPORT_FILE);
    }
    resolve_report_path(prefs)
}

/// Pick the output file path.
pub fn output_path(options: &RunOptions) -> Result<PathBuf> {
    let cache_dir = match &options.cache_dir {
        Some(dir) => dir.clone(),
        None => default_cache_dir().map_err(|e| MunkiReportError::Io {
            path: PathBuf::from(constants::CACHE_DIR_NAME),
            operation: "resolve executable directory",
            source: e,
        })?,
    };
    Ok(cache_dir.join(constants::OUTPUT_FILE_NAME))
}

/// Load the source report, substituting an empty one if it is missing.
pub fn load_source(path: &Path) -> Result<Option<SourceReport>> {
    let report = read_report(path)?;
    if report.is_none() {
        tracing::warn!(path = %path.display(), "{} is missing.", path.display());
    }
    Ok(report)
}

/// Run the full pipeline once.
pub fn run(options: &RunOptions, prefs: &dyn PreferenceStore) -> Result<RunOutcome> {
    let report_path = source_path(options, prefs);
    let output_path = output_path(options)?;
    tracing::info!(
        source = %report_path.display(),
        output = %output_path.display(),
        "Filtering Munki report"
    );

    let source = load_source(&report_path)?;
    let source_found = source.is_some();
    let source = source.unwrap_or_else(SourceReport::empty);

    let report = filter_report(&source);
    tracing::info!(
        source_keys = source.len(),
        kept_keys = report.len(),
        "Report filtered"
    );

    write_report(&output_path, &report)?;

    Ok(RunOutcome {
        report_path,
        output_path,
        source_found,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::preferences::StaticPreferenceStore;

    #[test]
    fn test_source_path_precedence() {
        let prefs = StaticPreferenceStore::new().with(
            constants::PREFERENCE_DOMAIN,
            constants::MANAGED_INSTALL_DIR_KEY,
            "/prefs/munki",
        );

        let mut options = RunOptions::default();
        assert_eq!(
            source_path(&options, &prefs),
            PathBuf::from("/prefs/munki/ManagedInstallReport.plist")
        );

        options.managed_install_dir = Some(PathBuf::from("/config/munki"));
        assert_eq!(
            source_path(&options, &prefs),
            PathBuf::from("/config/munki/ManagedInstallReport.plist")
        );

        options.report_path = Some(PathBuf::from("/cli/report.plist"));
        assert_eq!(source_path(&options, &prefs), PathBuf::from("/cli/report.plist"));
    }

    #[test]
    fn test_output_path_override() {
        let options = RunOptions {
            cache_dir: Some(PathBuf::from("/var/cache/mr")),
            ..Default::default()
        };
        assert_eq!(
            output_path(&options).unwrap(),
            PathBuf::from("/var/cache/mr/munkireport.plist")
        );
    }

    #[test]
    fn test_default_output_path_uses_cache_dir_name() {
        let path = output_path(&RunOptions::default()).unwrap();
        assert!(path.ends_with("cache/munkireport.plist"));
    }
}
