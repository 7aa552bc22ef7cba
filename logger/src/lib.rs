use std::{fs, path::Path, str::FromStr};

use colored::Colorize;
use common::env_config::Config;
use middleware::logger::LoggerMiddleware;

pub mod middleware {
    pub mod logger;
}

/// Installs the global `log` dispatcher.
///
/// Console output is coloured. When `config.log_dir` is set, every record is
/// also appended to `combined.log` and errors to `error.log` in that directory.
pub fn setup(config: &Config) -> Result<(), fern::InitError> {
    let level = log::LevelFilter::from_str(&config.log_level).unwrap_or(log::LevelFilter::Info);

    let console = fern::Dispatch::new()
        .format(|out, message, record| {
            let color = match record.level() {
                log::Level::Info => "green",
                log::Level::Warn => "yellow",
                log::Level::Error => "red",
                log::Level::Debug => "magenta",
                log::Level::Trace => "bright black",
            };
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%H:%M:%S]"),
                record.target(),
                record.level().to_string().color(color),
                message
            ))
        })
        .chain(std::io::stdout());

    let mut dispatch = fern::Dispatch::new()
        .level(level)
        .level_for("sqlx", log::LevelFilter::Warn)
        .level_for("actix_server", log::LevelFilter::Info)
        .chain(console);

    if let Some(dir) = &config.log_dir {
        fs::create_dir_all(dir)?;
        dispatch = dispatch.chain(file_dispatch(
            Path::new(dir).join("combined.log"),
            log::LevelFilter::Trace,
        )?);
        dispatch = dispatch.chain(file_dispatch(
            Path::new(dir).join("error.log"),
            log::LevelFilter::Error,
        )?);
    }

    dispatch.apply()?;
    Ok(())
}

/// Plain-text file sink with full timestamps.
fn file_dispatch(path: impl AsRef<Path>, level: log::LevelFilter) -> Result<fern::Dispatch, fern::InitError> {
    Ok(fern::Dispatch::new()
        .level(level)
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} [{}][{}] {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.target(),
                record.level(),
                message
            ))
        })
        .chain(fern::log_file(path)?))
}

/// Request logger. Bodies larger than `body_limit` are not logged.
pub fn middleware(body_limit: usize) -> LoggerMiddleware {
    LoggerMiddleware::new(body_limit)
}
