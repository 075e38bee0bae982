//! Tracing subscriber setup

use std::fs::{self, File};
use std::path::Path;
use std::sync::Mutex;

use anyhow::Context;
use revgraph_core::LoggingConfig;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber once per process.
///
/// `RUST_LOG` takes precedence over `config.level`. With `config.file` set,
/// log lines go to that file (truncated on start) instead of stderr.
pub fn init_tracing(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .with_context(|| format!("Invalid log level '{}'", config.level))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(config.include_location)
        .with_line_number(config.include_location);

    let installed = match &config.file {
        Some(path) => {
            let writer = Mutex::new(open_log_file(path)?);
            let builder = builder.with_ansi(false).with_writer(writer);
            if config.json_format {
                builder.json().try_init()
            } else {
                builder.try_init()
            }
        }
        None => {
            let builder = builder.with_writer(std::io::stderr);
            if config.json_format {
                builder.json().try_init()
            } else {
                builder.try_init()
            }
        }
    };

    installed.map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {e}"))
}

fn open_log_file(path: &Path) -> anyhow::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }

    File::create(path).with_context(|| format!("Failed to open log file {}", path.display()))
}
