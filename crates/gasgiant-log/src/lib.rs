//! Structured logging for the gas-giant generator.
//!
//! Console output with uptime timestamps and worker thread names, plus an
//! optional JSON log file for long offline runs. The level comes from
//! `RUST_LOG` if set, otherwise from the config's `debug.log_level`.

use gasgiant_config::Config;
use std::fs::File;
use std::path::Path;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when neither `RUST_LOG` nor the config specify one.
const DEFAULT_FILTER: &str = "info";

/// Name of the JSON log file written into the log directory.
pub const LOG_FILE_NAME: &str = "gasgiant.log";

/// Initialize the global tracing subscriber.
///
/// * `log_dir` - directory for a JSON log file; console only when `None` or
///   when the directory or file cannot be created
/// * `config` - optional configuration supplying the log level
///
/// Records emitted through the `log` facade (the config crate) are forwarded
/// to the same subscriber.
///
/// # Examples
///
/// ```no_run
/// use gasgiant_config::Config;
/// use gasgiant_log::init_logging;
///
/// let config = Config::default();
/// init_logging(Some(std::path::Path::new("./logs")), Some(&config));
/// ```
pub fn init_logging(log_dir: Option<&Path>, config: Option<&Config>) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config_filter(config));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(true) // workers are named after their phase
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    if let Some(log_file) = log_dir.and_then(open_log_file) {
        let file_layer = fmt::layer()
            .with_writer(log_file)
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::uptime())
            .json();

        subscriber.with(file_layer).init();
        return;
    }

    subscriber.init();
}

/// Filter directive derived from the config, falling back to `info`.
fn filter_string(config: Option<&Config>) -> String {
    config
        .map(|c| c.debug.log_level.trim())
        .filter(|level| !level.is_empty())
        .unwrap_or(DEFAULT_FILTER)
        .to_string()
}

fn config_filter(config: Option<&Config>) -> EnvFilter {
    EnvFilter::new(filter_string(config))
}

/// Create `log_dir` if needed and truncate the log file inside it.
fn open_log_file(log_dir: &Path) -> Option<File> {
    std::fs::create_dir_all(log_dir).ok()?;
    File::create(log_dir.join(LOG_FILE_NAME)).ok()
}
