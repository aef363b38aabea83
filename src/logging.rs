// Logger setup
// Library code logs through the `log` facade. This installs the env_logger
// backend according to the `logging` config group.

use std::fs::{self, OpenOptions};

use env_logger::{Builder, Target, WriteStyle};

use crate::config::Config;
use crate::error::{PfvError, Result};

/// Install the global logger. `RUST_LOG`, when set, refines the configured level.
/// Fails instead of panicking if a logger is already installed.
pub fn init_logging(config: &Config) -> Result<()> {
    let mut builder = configure_builder(config)?;
    builder
        .try_init()
        .map_err(|e| PfvError::Logging(e.to_string()))?;

    log::debug!(
        "Logging initialised at {} (file: {})",
        config.logging.effective_level(),
        config
            .resolved_log_file()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "off".to_string())
    );
    Ok(())
}

fn configure_builder(config: &Config) -> Result<Builder> {
    let settings = &config.logging;
    let mut builder = Builder::new();

    builder.filter_level(settings.effective_level());
    if let Ok(spec) = std::env::var("RUST_LOG") {
        builder.parse_filters(&spec);
    }

    if settings.enable_structured_output {
        builder.format_timestamp_secs().format_target(true);
    } else {
        builder
            .format_timestamp(None)
            .format_target(false)
            .format_module_path(false);
    }

    builder.write_style(if settings.enable_rich_console {
        WriteStyle::Auto
    } else {
        WriteStyle::Never
    });

    if let Some(path) = config.resolved_log_file() {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| PfvError::Filesystem {
                path: parent.display().to_string(),
                source,
            })?;
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        builder.target(Target::Pipe(Box::new(file)));
        builder.write_style(WriteStyle::Never);
    }

    Ok(builder)
}
