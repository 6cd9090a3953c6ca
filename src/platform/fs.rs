// munkireport-filter - platform/fs.rs
//
// Report file I/O: load Munki's plist, write the filtered copy.
//
// The output is written in place (create + truncate), not via a temp file
// and rename. A run killed mid-write can leave a truncated file; the next
// successful run replaces it.

use crate::core::model::{FilteredReport, SourceReport};
use crate::util::error::{PrintError, ReportError};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

/// Load a report plist (XML or binary).
///
/// Returns `Ok(None)` when the file does not exist: Munki has not run yet,
/// which is not an error. A file that exists but does not parse, or whose
/// root is not a dictionary, is fatal.
pub fn read_report(path: &Path) -> Result<Option<SourceReport>, ReportError> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(ReportError::Io {
                path: path.to_path_buf(),
                operation: "open report",
                source: e,
            })
        }
    };

    let value = plist::Value::from_reader(BufReader::new(file)).map_err(|e| {
        ReportError::Malformed {
            path: path.to_path_buf(),
            source: e,
        }
    })?;

    match value.into_dictionary() {
        Some(dict) => {
            tracing::debug!(path = %path.display(), keys = dict.len(), "Report loaded");
            Ok(Some(SourceReport::new(dict)))
        }
        None => Err(ReportError::NotADictionary {
            path: path.to_path_buf(),
        }),
    }
}

/// Write the filtered report as an XML plist, replacing any existing file.
///
/// The parent directory is created if needed.
pub fn write_report(path: &Path, report: &FilteredReport) -> Result<(), ReportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| ReportError::Io {
            path: parent.to_path_buf(),
            operation: "create cache directory",
            source: e,
        })?;
    }

    let file = File::create(path).map_err(|e| ReportError::Io {
        path: path.to_path_buf(),
        operation: "create output",
        source: e,
    })?;
    let mut writer = BufWriter::new(file);

    report
        .to_value()
        .to_writer_xml(&mut writer)
        .map_err(|e| ReportError::Serialize {
            path: path.to_path_buf(),
            source: e,
        })?;

    writer.flush().map_err(|e| ReportError::Io {
        path: path.to_path_buf(),
        operation: "flush output",
        source: e,
    })?;

    tracing::debug!(path = %path.display(), keys = report.len(), "Filtered report written");
    Ok(())
}

/// Print the filtered report as an XML plist to `writer` (stdout in `main`).
pub fn print_report<W: Write>(mut writer: W, report: &FilteredReport) -> Result<(), PrintError> {
    report
        .to_value()
        .to_writer_xml(&mut writer)
        .map_err(PrintError::Plist)?;
    writeln!(writer).map_err(PrintError::Io)?;
    writer.flush().map_err(PrintError::Io)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::filter::filter_report;
    use crate::core::model::ReportKey;
    use plist::{Dictionary, Value};
    use tempfile::TempDir;

    fn sample_report() -> FilteredReport {
        let mut dict = Dictionary::new();
        dict.insert("ManifestName".into(), Value::String("site_default".into()));
        dict.insert(
            "Errors".into(),
            Value::Array(vec![
                Value::String("catalog missing".into()),
                Value::String("catalog missing".into()),
            ]),
        );
        filter_report(&SourceReport::new(dict))
    }

    #[test]
    fn test_missing_report_is_none() {
        let tmp = TempDir::new().unwrap();
        let result = read_report(&tmp.path().join("ManagedInstallReport.plist")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_garbage_is_malformed() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("ManagedInstallReport.plist");
        std::fs::write(&path, b"<?xml version=\"1.0\"?><plist><dict><key>Errors").unwrap();
        let err = read_report(&path).unwrap_err();
        assert!(matches!(err, ReportError::Malformed { .. }), "got {err:?}");
        assert!(err.to_string().contains("Error creating plist from"));
    }

    #[test]
    fn test_truncated_binary_is_malformed() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("ManagedInstallReport.plist");

        let mut dict = Dictionary::new();
        dict.insert("RunType".into(), Value::String("auto".into()));
        let mut bytes = Vec::new();
        Value::Dictionary(dict).to_writer_binary(&mut bytes).unwrap();
        bytes.truncate(bytes.len() / 2);
        std::fs::write(&path, &bytes).unwrap();

        let err = read_report(&path).unwrap_err();
        assert!(matches!(err, ReportError::Malformed { .. }), "got {err:?}");
    }

    #[test]
    fn test_non_dictionary_root_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("ManagedInstallReport.plist");
        Value::Array(vec![Value::String("x".into())])
            .to_file_xml(&path)
            .unwrap();
        let err = read_report(&path).unwrap_err();
        assert!(matches!(err, ReportError::NotADictionary { .. }), "got {err:?}");
    }

    #[test]
    fn test_binary_report_is_accepted() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("ManagedInstallReport.plist");
        let mut dict = Dictionary::new();
        dict.insert("RunType".into(), Value::String("auto".into()));
        Value::Dictionary(dict).to_file_binary(&path).unwrap();

        let report = read_report(&path).unwrap().unwrap();
        assert_eq!(report.get("RunType").and_then(Value::as_string), Some("auto"));
    }

    #[test]
    fn test_write_creates_cache_dir_and_overwrites() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("cache").join("munkireport.plist");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "stale contents that are much longer than the new plist ".repeat(200))
            .unwrap();

        write_report(&path, &sample_report()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("<?xml"));
        assert!(!text.contains("stale contents"));

        let reread = read_report(&path).unwrap().unwrap();
        assert_eq!(
            reread.get(ReportKey::Errors.as_str()),
            Some(&Value::Array(vec![Value::String("catalog missing".into())]))
        );
    }

    #[test]
    fn test_write_into_missing_dir() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("cache").join("munkireport.plist");
        write_report(&path, &FilteredReport::default()).unwrap();
        let reread = read_report(&path).unwrap().unwrap();
        assert!(reread.is_empty());
    }

    #[test]
    fn test_print_report_is_xml() {
        let mut buf = Vec::new();
        print_report(&mut buf, &sample_report()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("<key>ManifestName</key>"));
        assert!(text.contains("<string>site_default</string>"));
        assert!(text.ends_with('\n'));
    }
}
