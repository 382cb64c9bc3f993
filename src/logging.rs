//! Structured logging: stderr console plus a daily rolling file.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::warn;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::AppConfig;

const LOG_FILE_PREFIX: &str = "backoffice";
const MAX_LOG_FILES: usize = 14;
const DEFAULT_FILTER: &str = "info,backoffice_pos=debug";

/// Install the global subscriber. Keep the returned guard alive until exit;
/// dropping it flushes the file writer.
pub fn init(config: &AppConfig) -> Option<WorkerGuard> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let console_layer = fmt::layer().with_writer(std::io::stderr).with_target(true);

    prune_old_logs(&config.log_dir);
    let (file_writer, guard) = match fs::create_dir_all(&config.log_dir) {
        Ok(()) => {
            let appender = tracing_appender::rolling::daily(&config.log_dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(writer), Some(guard))
        }
        Err(e) => {
            eprintln!(
                "file logging disabled, cannot create {}: {e}",
                config.log_dir.display()
            );
            (None, None)
        }
    };

    let json_layer = file_writer
        .clone()
        .filter(|_| config.log_json)
        .map(|w| fmt::layer().json().with_writer(w).with_target(true));
    let text_layer = file_writer
        .filter(|_| !config.log_json)
        .map(|w| fmt::layer().with_writer(w).with_ansi(false).with_target(true));

    let installed = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(json_layer)
        .with(text_layer)
        .try_init();
    if let Err(e) = installed {
        eprintln!("logging already initialised: {e}");
    }

    guard
}

/// Remove rolled log files beyond the newest `MAX_LOG_FILES`. Returns how
/// many files were deleted.
pub fn prune_old_logs(log_dir: &Path) -> usize {
    prune_rolled(log_dir, MAX_LOG_FILES)
}

/// Daily appender files are named `backoffice.YYYY-MM-DD`, so the date
/// suffix orders them. Anything else in the directory is left alone.
fn prune_rolled(log_dir: &Path, keep: usize) -> usize {
    let Ok(entries) = fs::read_dir(log_dir) else {
        return 0;
    };
    let mut dated: Vec<(NaiveDate, PathBuf)> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .filter_map(|path| {
            let date = rolled_date(path.file_name()?.to_str()?)?;
            Some((date, path))
        })
        .collect();
    if dated.len() <= keep {
        return 0;
    }

    dated.sort_by(|a, b| b.0.cmp(&a.0));
    let mut removed = 0;
    for (_, path) in dated.into_iter().skip(keep) {
        match fs::remove_file(&path) {
            Ok(()) => removed += 1,
            Err(e) => warn!("Failed to prune log file {}: {e}", path.display()),
        }
    }
    removed
}

fn rolled_date(file_name: &str) -> Option<NaiveDate> {
    let suffix = file_name.strip_prefix(LOG_FILE_PREFIX)?.strip_prefix('.')?;
    NaiveDate::parse_from_str(suffix, "%Y-%m-%d").ok()
}
