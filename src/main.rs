// munkireport-filter - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. Config loading, then logging initialisation (config picks the level)
// 3. The filter pipeline
// 4. Optional --print / --summary output on stdout

use clap::Parser;
use munkireport_filter::app::pipeline::{self, RunOptions};
use munkireport_filter::core::summary::{summarize, SuppressionRules};
use munkireport_filter::platform::config::{load_config, AppConfig, PlatformPaths};
use munkireport_filter::platform::fs::print_report;
use munkireport_filter::platform::preferences::PlistPreferenceStore;
use munkireport_filter::util;
use munkireport_filter::util::error::{PrintError, Result};
use std::io::Write;
use std::path::PathBuf;

/// munkireport-filter - Reduce Munki's ManagedInstallReport.plist to the
/// fields MunkiReport collects.
///
/// With no arguments, reads the report from Munki's configured install
/// directory and writes `cache/munkireport.plist` next to this executable.
#[derive(Parser, Debug)]
#[command(name = "munkireport-filter", version, about)]
struct Cli {
    /// Read this report instead of the one Munki's preferences point at.
    #[arg(short = 'r', long = "report")]
    report: Option<PathBuf>,

    /// Write munkireport.plist into this directory instead of ./cache.
    #[arg(short = 'o', long = "cache-dir")]
    cache_dir: Option<PathBuf>,

    /// Config file (defaults to config.toml in the platform config directory).
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Print the filtered report to stdout as an XML plist.
    #[arg(long = "print")]
    print: bool,

    /// Print the reporting summary (counts, suppressed messages, event) as JSON.
    #[arg(long = "summary")]
    summary: bool,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PlatformPaths::resolve().config_file());
    let (config, config_warnings) = load_config(&config_path);

    util::logging::init(cli.debug, config.log_level.as_deref());
    for warning in &config_warnings {
        tracing::warn!(path = %config_path.display(), "{}", warning);
    }

    tracing::debug!(
        version = util::constants::APP_VERSION,
        config = %config_path.display(),
        "munkireport-filter starting"
    );

    let options = RunOptions {
        report_path: cli.report.clone(),
        managed_install_dir: config.managed_install_dir.clone(),
        cache_dir: cli.cache_dir.clone().or_else(|| config.cache_dir.clone()),
    };

    if let Err(e) = run(&cli, &options, &config) {
        tracing::error!(error = %e, "Run failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli, options: &RunOptions, config: &AppConfig) -> Result<()> {
    let prefs = PlistPreferenceStore::system();
    let outcome = pipeline::run(options, &prefs)?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if cli.print {
        print_report(&mut out, &outcome.report)?;
    }

    if cli.summary {
        let (rules, problems) =
            SuppressionRules::with_extra(&config.error_patterns, &config.warning_patterns);
        for problem in &problems {
            tracing::warn!(error = %problem, "Suppression pattern skipped");
        }
        let summary = summarize(&outcome.report, &rules);
        serde_json::to_writer_pretty(&mut out, &summary).map_err(PrintError::Json)?;
        writeln!(out).map_err(PrintError::Io)?;
    }

    tracing::info!(
        output = %outcome.output_path.display(),
        source_found = outcome.source_found,
        keys = outcome.report.len(),
        "Done"
    );
    Ok(())
}
