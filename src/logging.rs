use anyhow::{Context, Result};
use env_logger::{Env, Target};
use log::LevelFilter;
use std::fs::{self, OpenOptions};
use std::path::Path;

/// Filter used when `RUST_LOG` is unset: everything from this crate, only
/// warnings and errors from dependencies.
const DEFAULT_FILTER: &str = "warn,ollama_desk=trace";

/// Sends log output to `log_file` so it does not draw over the terminal UI.
///
/// The logger accepts every level of this crate; the effective level is set
/// afterwards from the config through [`apply_level`], unless `RUST_LOG`
/// is set.
pub fn init(log_file: &Path) -> Result<()> {
    if let Some(parent) = log_file.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {:?}", parent))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("Failed to open log file: {:?}", log_file))?;

    env_logger::Builder::from_env(Env::default().default_filter_or(DEFAULT_FILTER))
        .target(Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .try_init()
        .context("Logger already initialized")?;

    if std::env::var_os("RUST_LOG").is_none() {
        log::set_max_level(LevelFilter::Info);
    }
    Ok(())
}

/// Applies a configured level name. Ignored when `RUST_LOG` is set.
pub fn apply_level(level: &str) {
    if std::env::var_os("RUST_LOG").is_some() {
        return;
    }
    match parse_level(level) {
        Some(filter) => log::set_max_level(filter),
        None => log::warn!("Unknown log level {:?}, keeping {}", level, log::max_level()),
    }
}

fn parse_level(level: &str) -> Option<LevelFilter> {
    match level.trim().to_lowercase().as_str() {
        "warning" => Some(LevelFilter::Warn),
        other => other.parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dependencies_only_log_warnings() {
        let logger = env_logger::Builder::new().parse_filters(DEFAULT_FILTER).build();
        let enabled = |target: &str, level: log::Level| {
            log::Log::enabled(
                &logger,
                &log::Metadata::builder().target(target).level(level).build(),
            )
        };

        assert!(enabled("ollama_desk::app::heartbeat", log::Level::Trace));
        assert!(!enabled("hyper::proto::h1", log::Level::Debug));
        assert!(!enabled("reqwest::connect", log::Level::Info));
        assert!(enabled("notify", log::Level::Warn));
    }

    #[test]
    fn level_names() {
        assert_eq!(parse_level("info"), Some(LevelFilter::Info));
        assert_eq!(parse_level(" DEBUG "), Some(LevelFilter::Debug));
        assert_eq!(parse_level("warning"), Some(LevelFilter::Warn));
        assert_eq!(parse_level("off"), Some(LevelFilter::Off));
        assert_eq!(parse_level("loud"), None);
    }
}
