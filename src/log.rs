//! Logger set-up for appraisal runs.
//!
//! Progress messages (model loaded, batches solved, recommended investments) go to stdout, while
//! warnings such as infeasible (investment, scenario) pairs and errors go to stderr. For the `run`
//! command both streams are also copied to log files in the output folder, so the record of a run
//! sits next to its profit matrix.
use anyhow::{Context, Result, bail};
use chrono::Local;
use fern::colors::{Color, ColoredLevelConfig};
use fern::{Dispatch, FormatCallback};
use log::{LevelFilter, Record};
use std::env;
use std::fmt::{Arguments, Display};
use std::fs::{File, OpenOptions};
use std::io::IsTerminal;
use std::path::Path;
use std::sync::OnceLock;

/// A flag indicating whether the logger has been initialised
static LOGGER_INIT: OnceLock<()> = OnceLock::new();

/// The default log level for the program.
///
/// Used as a fallback if the user hasn't specified something else with the
/// `INVEST_APPRAISAL_LOG_LEVEL` environment variable or the `settings.toml` file.
const DEFAULT_LOG_LEVEL: &str = "info";

/// The environment variable used to override the log level
pub const LOG_LEVEL_ENV_VAR: &str = "INVEST_APPRAISAL_LOG_LEVEL";

/// The file name for the log file containing messages about the ordinary operation of the program
const LOG_INFO_FILE_NAME: &str = "invest_appraisal_info.log";

/// The file name for the log file containing warnings and error messages
const LOG_ERROR_FILE_NAME: &str = "invest_appraisal_error.log";

/// Whether the program logger has been initialised
pub fn is_logger_initialised() -> bool {
    LOGGER_INIT.get().is_some()
}

/// Initialise the program logger.
///
/// The level is taken from the `INVEST_APPRAISAL_LOG_LEVEL` environment variable if set, else from
/// `settings.toml`, else `info`. Valid levels are `off`, `error`, `warn`, `info`, `debug` and
/// `trace` (case-insensitive). At `debug`, each solved pair is logged and HiGHS prints its own
/// output too.
///
/// # Arguments
///
/// * `log_level_from_settings`: The log level specified in `settings.toml`
/// * `log_file_path`: The output folder of a run, in which log files will be created
pub fn init(log_level_from_settings: Option<&str>, log_file_path: Option<&Path>) -> Result<()> {
    // Environment variable beats settings file beats default
    let log_level = match env::var(LOG_LEVEL_ENV_VAR) {
        Ok(level) => parse_log_level(&level)
            .with_context(|| format!("Invalid value for {LOG_LEVEL_ENV_VAR}"))?,
        Err(_) => parse_log_level(log_level_from_settings.unwrap_or(DEFAULT_LOG_LEVEL))?,
    };

    // Set up colours for log levels
    let colours = ColoredLevelConfig::new()
        .error(Color::Red)
        .warn(Color::Yellow)
        .info(Color::Green)
        .debug(Color::Blue)
        .trace(Color::Magenta);

    // Automatically apply colours only if the output is a terminal
    let use_colour_stdout = std::io::stdout().is_terminal();
    let use_colour_stderr = std::io::stderr().is_terminal();

    // Log files are only written for runs, which have an output folder
    let log_files = log_file_path.map(open_log_files).transpose()?;

    // Configure the logger
    let mut dispatch = Dispatch::new()
        .chain(
            // Write non-error messages to stdout
            Dispatch::new()
                .filter(|metadata| metadata.level() > LevelFilter::Warn)
                .format(move |out, message, record| {
                    write_log_colour(out, message, record, use_colour_stdout, &colours);
                })
                .level(log_level)
                .chain(std::io::stdout()),
        )
        .chain(
            // Write error messages to stderr
            Dispatch::new()
                .format(move |out, message, record| {
                    write_log_colour(out, message, record, use_colour_stderr, &colours);
                })
                .level(log_level.min(LevelFilter::Warn))
                .chain(std::io::stderr()),
        );

    if let Some((info_log_file, err_log_file)) = log_files {
        // The info log always records at least progress messages, whatever the console shows
        dispatch = dispatch
            .chain(
                Dispatch::new()
                    .filter(|metadata| metadata.level() > LevelFilter::Warn)
                    .format(write_log_plain)
                    .level(log_level.max(LevelFilter::Info))
                    .chain(info_log_file),
            )
            .chain(
                Dispatch::new()
                    .format(write_log_plain)
                    .level(LevelFilter::Warn)
                    .chain(err_log_file),
            );
    }

    // Apply the logger configuration
    dispatch.apply().context("Logger already initialised")?;

    // Set a flag to indicate that the logger has been initialised
    let _ = LOGGER_INIT.set(());

    Ok(())
}

/// Create (or truncate) the info and error log files in the output folder
fn open_log_files(output_dir: &Path) -> Result<(File, File)> {
    let new_log_file = |file_name: &str| {
        let path = output_dir.join(file_name);
        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .with_context(|| format!("Could not create log file {}", path.display()))
    };

    Ok((
        new_log_file(LOG_INFO_FILE_NAME)?,
        new_log_file(LOG_ERROR_FILE_NAME)?,
    ))
}

/// Convert a log level string to a [`LevelFilter`]
fn parse_log_level(log_level: &str) -> Result<LevelFilter> {
    let filter = match log_level.to_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        unknown => bail!("Unknown log level: {unknown}"),
    };

    Ok(filter)
}

/// Write a log line as `[time level target] message`
fn write_log<T: Display>(out: FormatCallback, level: T, target: &str, message: &Arguments) {
    let timestamp = Local::now().format("%H:%M:%S");

    out.finish(format_args!("[{timestamp} {level} {target}] {message}"));
}

/// Write to the log with no colours
fn write_log_plain(out: FormatCallback, message: &Arguments, record: &Record) {
    write_log(out, record.level(), record.target(), message);
}

/// Write to the log with optional colours
fn write_log_colour(
    out: FormatCallback,
    message: &Arguments,
    record: &Record,
    use_colour: bool,
    colours: &ColoredLevelConfig,
) {
    // Format output with or without colour based on `use_colour`
    if use_colour {
        write_log(out, colours.color(record.level()), record.target(), message);
    } else {
        write_log_plain(out, message, record);
    }
}
