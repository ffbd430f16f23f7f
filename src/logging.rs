//! Process-wide logging setup.
//!
//! Log lines have the shape `<timestamp>: <LEVEL>: <module>:<line>: <message>`
//! and go to standard output and/or an append-only log file, as configured.
//! The subscriber is installed once per process; later calls are no-ops.

use crate::config::LoggingConfig;
use crate::core::{AccessError, Result};
use chrono::Local;
use once_cell::sync::OnceCell;
use std::fmt;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static LOGGING: OnceCell<()> = OnceCell::new();

/// Event formatter producing `<timestamp>: <LEVEL>: <module>:<line>: <message>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LineFormat;

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let meta = event.metadata();
        write!(
            writer,
            "{}: {}: {}:{}: ",
            Local::now().format("%Y-%m-%d %H:%M:%S,%3f"),
            meta.level(),
            meta.module_path().unwrap_or_else(|| meta.target()),
            meta.line().unwrap_or(0),
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Installs the global subscriber described by `config`.
///
/// `RUST_LOG` takes precedence over `config.level`. Returns `Ok(())` without
/// doing anything when logging was already initialized by this function.
///
/// # Errors
///
/// `AccessError::Io` if the log file cannot be opened, and
/// `AccessError::Logging` if the filter is invalid or another global
/// subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<()> {
    LOGGING.get_or_try_init(|| install(config)).map(|_| ())
}

/// True once [`init`] has installed the subscriber.
pub fn is_initialized() -> bool {
    LOGGING.get().is_some()
}

fn install(config: &LoggingConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)
            .map_err(|e| AccessError::Logging(format!("invalid level '{}': {}", config.level, e)))?,
    };

    let stdout_layer = config.stdout.then(|| {
        tracing_subscriber::fmt::layer()
            .event_format(LineFormat)
            .with_writer(std::io::stdout)
    });

    let file_layer = match file_sink(config) {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                tracing_subscriber::fmt::layer()
                    .event_format(LineFormat)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| AccessError::Logging(e.to_string()))
}

/// Path of the log file sink, if one is configured.
fn file_sink(config: &LoggingConfig) -> Option<&Path> {
    config
        .file
        .as_deref()
        .filter(|path| !path.as_os_str().is_empty())
}
