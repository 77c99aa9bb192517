//! Logging infrastructure using `tracing` and `tracing-subscriber`.
//!
//! Every event is rendered as one pipe separated line:
//!
//! ```text
//! 2024-03-15 10:42:07,123 | INFO | patients loaded rows=120
//! ```
//!
//! and written to standard output and to an append-only log file. The
//! subscriber is owned by a [`LogSink`] and is only installed while
//! [`LogSink::in_scope`] runs, so the library crates never touch global
//! logging state and can be tested with no sink at all.
//!
//! # Log Levels
//!
//! - `error`: fatal errors, with their category
//! - `warn`: data anomalies that do not stop the run (duplicate patient ids)
//! - `info`: stage banners, row counts, column lists
//! - `debug`: per-column cleaning counts, written file sizes
//!
//! # Usage
//!
//! ```ignore
//! use consult_cli::logging::{LogConfig, LogSink};
//!
//! let sink = LogSink::open(&LogConfig::default())?;
//! sink.in_scope(|| tracing::info!("hello"));
//! sink.close()?;
//! ```

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::Local;
use tracing::level_filters::LevelFilter;
use tracing::{Dispatch, Event, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;

/// Timestamp layout of every log line, milliseconds after a comma.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// Configuration for logging behavior.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Level applied to every crate unless `RUST_LOG` takes over.
    pub level_filter: LevelFilter,
    /// Whether `RUST_LOG` may replace the configured level.
    pub use_env_filter: bool,
    /// Log file, appended to. Parent directories are created on open.
    pub log_file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level_filter: LevelFilter::INFO,
            use_env_filter: true,
            log_file: None,
        }
    }
}

impl LogConfig {
    /// Set the level filter directly.
    #[must_use]
    pub fn with_level(mut self, level_filter: LevelFilter) -> Self {
        self.level_filter = level_filter;
        self
    }

    /// Set the log file path.
    #[must_use]
    pub fn with_log_file(mut self, path: Option<PathBuf>) -> Self {
        self.log_file = path;
        self
    }
}

/// Renders `timestamp | LEVEL | message key=value ...`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipeFormat;

impl<S, N> FormatEvent<S, N> for PipeFormat
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
        let timestamp = Local::now().format(TIMESTAMP_FORMAT);
        write!(writer, "{timestamp} | {} | ", event.metadata().level())?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// An open logging destination with an explicit lifecycle.
///
/// Opened once at startup, used through [`in_scope`](Self::in_scope), and
/// closed on both the success and the failure path.
pub struct LogSink {
    dispatch: Dispatch,
    file: Option<SharedWriter<File>>,
}

impl LogSink {
    /// Open a sink writing to standard output and, when configured, the log file.
    ///
    /// # Errors
    ///
    /// Returns an error if the log directory or file cannot be created.
    pub fn open(config: &LogConfig) -> io::Result<Self> {
        let file = match &config.log_file {
            Some(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent)?;
                }
                let file = OpenOptions::new().create(true).append(true).open(path)?;
                Some(SharedWriter::new(file))
            }
            None => None,
        };
        let dispatch = build_dispatch(config, io::stdout, file.clone());
        Ok(Self { dispatch, file })
    }

    /// Open a sink over a custom writer instead of standard output (useful for testing).
    pub fn with_writer<W>(config: &LogConfig, writer: W) -> Self
    where
        W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
    {
        let dispatch = build_dispatch(config, writer, None::<SharedWriter<File>>);
        Self {
            dispatch,
            file: None,
        }
    }

    /// Run `f` with this sink receiving every `tracing` event.
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, f)
    }

    /// Flush and release the log file.
    ///
    /// # Errors
    ///
    /// Returns an error if the final flush fails.
    pub fn close(self) -> io::Result<()> {
        io::stdout().flush()?;
        match &self.file {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

fn build_dispatch<P, F>(config: &LogConfig, primary: P, file: Option<F>) -> Dispatch
where
    P: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
    F: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    let primary_layer = tracing_subscriber::fmt::layer()
        .event_format(PipeFormat)
        .with_ansi(false)
        .with_writer(primary);
    let file_layer = file.map(|writer| {
        tracing_subscriber::fmt::layer()
            .event_format(PipeFormat)
            .with_ansi(false)
            .with_writer(writer)
    });

    let subscriber = tracing_subscriber::registry()
        .with(build_env_filter(config))
        .with(primary_layer)
        .with(file_layer);
    Dispatch::new(subscriber)
}

/// Cloneable writer sharing one underlying sink behind a mutex.
pub struct SharedWriter<W> {
    inner: Arc<Mutex<W>>,
}

impl<W> Clone for SharedWriter<W> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<W: Write> SharedWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner: Arc::new(Mutex::new(inner)),
        }
    }

    fn flush(&self) -> io::Result<()> {
        SharedWriterGuard {
            inner: Arc::clone(&self.inner),
        }
        .flush()
    }
}

pub struct SharedWriterGuard<W> {
    inner: Arc<Mutex<W>>,
}

impl<W: Write> Write for SharedWriterGuard<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| io::Error::other("log writer lock poisoned"))?;
        guard.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| io::Error::other("log writer lock poisoned"))?;
        guard.flush()
    }
}

impl<'a, W: Write + 'a> MakeWriter<'a> for SharedWriter<W> {
    type Writer = SharedWriterGuard<W>;

    fn make_writer(&'a self) -> Self::Writer {
        SharedWriterGuard {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Build an `EnvFilter` from the configured level, respecting `RUST_LOG` when allowed.
fn build_env_filter(config: &LogConfig) -> EnvFilter {
    if config.use_env_filter
        && let Ok(filter) = EnvFilter::try_from_default_env()
    {
        return filter;
    }
    let level = config.level_filter.to_string().to_lowercase();
    EnvFilter::new(format!(
        "{level},consult_cli={level},consult_ingest={level},consult_model={level},\
         consult_output={level},consult_transform={level}"
    ))
}
