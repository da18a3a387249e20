use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

const ENABLED_VAR: &str = "SEARCH_STREAM_OBSERVABILITY";
const LEVEL_VAR: &str = "SEARCH_STREAM_LOG_LEVEL";
const JSON_PATH_VAR: &str = "SEARCH_STREAM_JSON_LOG_PATH";
const DEFAULT_JSON_FILE: &str = "search-stream.logs.jsonl";

static INIT: OnceCell<()> = OnceCell::new();

/// Where log records are written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogOutput {
    /// Compact lines on stderr, so logs never mix with results on stdout.
    Console,
    /// JSON lines appended to a file.
    JsonFile(PathBuf),
}

/// Resolved logging settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogSettings {
    pub enabled: bool,
    /// `EnvFilter` directive string.
    pub filter: String,
    pub output: LogOutput,
}

impl LogSettings {
    /// Reads settings from the environment.
    ///
    /// - `SEARCH_STREAM_OBSERVABILITY`: enable/disable flag (default enabled).
    /// - `SEARCH_STREAM_LOG_LEVEL`, then `RUST_LOG`: filter directives. Values
    ///   that do not parse are skipped.
    /// - `SEARCH_STREAM_JSON_LOG_PATH`: write JSON lines to this file instead
    ///   of the console.
    pub fn from_env(default_level: &str) -> Self {
        Self::from_lookup(default_level, |key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(default_level: &str, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let enabled = lookup(ENABLED_VAR)
            .and_then(|v| parse_bool(&v))
            .unwrap_or(true);
        let filter = [LEVEL_VAR, "RUST_LOG"]
            .into_iter()
            .filter_map(|key| lookup(key))
            .map(|v| v.trim().to_string())
            .find(|v| !v.is_empty() && EnvFilter::try_new(v).is_ok())
            .unwrap_or_else(|| default_level.to_string());
        let output = match lookup(JSON_PATH_VAR) {
            Some(path) if !path.trim().is_empty() => LogOutput::JsonFile(PathBuf::from(path)),
            _ => LogOutput::Console,
        };
        Self {
            enabled,
            filter,
            output,
        }
    }

    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.filter).unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" | "enabled" => Some(true),
        "0" | "false" | "no" | "off" | "disabled" => Some(false),
        _ => None,
    }
}

/// Initialize logging once per process from the environment.
///
/// `default_level` applies when no filter is configured.
pub fn init_observability(default_level: &str) {
    init_with(LogSettings::from_env(default_level));
}

/// Initialize logging once per process with explicit settings. Later calls
/// are no-ops.
pub fn init_with(settings: LogSettings) {
    INIT.get_or_init(|| install(&settings));
}

fn install(settings: &LogSettings) {
    if !settings.enabled {
        return;
    }
    let registry = tracing_subscriber::registry().with(settings.env_filter());
    let _ = match &settings.output {
        LogOutput::Console => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        LogOutput::JsonFile(path) => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_target(false)
                    .with_writer(json_appender(path)),
            )
            .try_init(),
    };
}

fn json_appender(path: &Path) -> tracing_appender::rolling::RollingFileAppender {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let _ = std::fs::create_dir_all(dir);
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(DEFAULT_JSON_FILE);
    tracing_appender::rolling::never(dir, file_name)
}
