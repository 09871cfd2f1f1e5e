use anyhow::{Context, Result};
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode, WriteLogger};
use std::fs::OpenOptions;
use std::path::Path;

/// Install the global logger.
///
/// With a log file, records at `level` (default info) are appended to it.
/// Without one, only warnings and errors reach standard error so that the
/// interactive display stays clean.
pub fn init(log_file: Option<&Path>, level: Option<LevelFilter>) -> Result<()> {
    let config = ConfigBuilder::new()
        .set_target_level(LevelFilter::Off)
        .set_time_format_rfc3339()
        .build();

    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            WriteLogger::init(level.unwrap_or(LevelFilter::Info), config, file)
                .context("cannot install file logger")?;
        }
        None => {
            TermLogger::init(
                level.unwrap_or(LevelFilter::Warn),
                config,
                TerminalMode::Stderr,
                ColorChoice::Auto,
            )
            .context("cannot install terminal logger")?;
        }
    }
    Ok(())
}
