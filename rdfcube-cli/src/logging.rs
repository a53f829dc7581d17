//! Logging initialisation for the rdfcube CLI.
//!
//! Installs a global `tracing` subscriber that prints `LEVEL: message` lines
//! on `stderr`, coloured by level when `stderr` is a terminal, or JSON lines
//! when `RDFCUBE_LOG_FORMAT=json`. Records emitted through the `log` facade
//! are bridged into the same subscriber.

use std::fmt::{self, Write as _};
use std::io::{self, IsTerminal};
use std::{env, sync::OnceLock};

use thiserror::Error;
use tracing::{Event, Level, Subscriber, warn};
use tracing_log::LogTracer;
use tracing_subscriber::{
    EnvFilter, Layer,
    filter::LevelFilter,
    fmt::{
        FmtContext, FormatEvent, FormatFields,
        format::{FmtSpan, Writer},
    },
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
};

const LOG_FORMAT_ENV: &str = "RDFCUBE_LOG_FORMAT";

const RESET: &str = "\x1b[0m";

static INITIALISED: OnceLock<()> = OnceLock::new();

/// Errors raised while initialising structured logging.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// Environment variable contained invalid UTF-8 data.
    #[error("environment variable `{name}` contained invalid UTF-8: {source}")]
    InvalidUnicode {
        /// Name of the offending environment variable.
        name: &'static str,
        /// Underlying parse failure.
        #[source]
        source: env::VarError,
    },
    /// Unsupported log format requested via `RDFCUBE_LOG_FORMAT`.
    #[error("unsupported log format `{provided}`; expected `human` or `json`")]
    UnsupportedFormat {
        /// Raw value supplied by the user.
        provided: String,
    },
    /// Failed to install the global tracing subscriber.
    #[error("failed to install tracing subscriber: {source}")]
    InstallFailed {
        /// Error raised by `tracing_subscriber`.
        #[source]
        source: tracing_subscriber::util::TryInitError,
    },
}

/// Output format of the console subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// `LEVEL: message` lines.
    Human,
    /// One JSON object per event.
    Json,
}

/// Maps the number of `-v` flags to a log level.
///
/// Exactly one flag selects DEBUG; none, or more than one, stays at INFO.
///
/// # Examples
/// ```
/// use rdfcube_cli::logging::level_for_verbosity;
/// use tracing::Level;
///
/// assert_eq!(level_for_verbosity(0), Level::INFO);
/// assert_eq!(level_for_verbosity(1), Level::DEBUG);
/// assert_eq!(level_for_verbosity(2), Level::INFO);
/// ```
#[must_use]
pub const fn level_for_verbosity(verbosity: u8) -> Level {
    if verbosity == 1 {
        Level::DEBUG
    } else {
        Level::INFO
    }
}

/// Event formatter writing `LEVEL: message`, optionally wrapped in the ANSI
/// colour of the level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelColours {
    ansi: bool,
}

impl LevelColours {
    /// Creates a formatter; `ansi` enables the colour escapes.
    #[must_use]
    pub const fn new(ansi: bool) -> Self {
        Self { ansi }
    }

    /// Colour escape and label for `level`.
    #[must_use]
    pub const fn style(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::ERROR => ("\x1b[91m", "ERROR"),
            Level::WARN => ("\x1b[93m", "WARNING"),
            Level::INFO => ("\x1b[94m", "INFO"),
            Level::DEBUG => (RESET, "DEBUG"),
            _ => (RESET, "TRACE"),
        }
    }
}

impl<S, N> FormatEvent<S, N> for LevelColours
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
        let (colour, label) = Self::style(*event.metadata().level());
        if self.ansi {
            writer.write_str(colour)?;
        }
        write!(writer, "{label}: ")?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        if self.ansi {
            writer.write_str(RESET)?;
        }
        writeln!(writer)
    }
}

/// Install global logging at the level selected by `verbosity`, unless it has
/// already been configured.
///
/// `RUST_LOG`, when set to a valid filter, replaces the verbosity-derived
/// level. Diagnostics go to `stderr` so the summary on `stdout` stays clean.
///
/// # Errors
/// Returns [`LoggingError`] if `RDFCUBE_LOG_FORMAT` contains invalid Unicode
/// or an unsupported format. An already installed foreign subscriber is
/// reported as a warning through that subscriber and is not an error.
pub fn init_logging(verbosity: u8) -> Result<(), LoggingError> {
    if INITIALISED.get().is_some() {
        return Ok(());
    }

    match install_subscriber(level_for_verbosity(verbosity)) {
        Ok(()) => {}
        Err(LoggingError::InstallFailed { source }) => {
            warn!(error = %source, "structured logging already configured elsewhere");
        }
        Err(err) => return Err(err),
    }
    let _ = INITIALISED.set(());
    Ok(())
}

fn install_subscriber(level: Level) -> Result<(), LoggingError> {
    let format = match env::var(LOG_FORMAT_ENV) {
        Ok(raw) => parse_log_format(&raw)?,
        Err(env::VarError::NotPresent) => LogFormat::Human,
        Err(err @ env::VarError::NotUnicode(_)) => Err(LoggingError::InvalidUnicode {
            name: LOG_FORMAT_ENV,
            source: err,
        })?,
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::default().add_directive(LevelFilter::from_level(level).into()));

    let fmt_layer = match format {
        LogFormat::Human => {
            let ansi = io::stderr().is_terminal();
            tracing_subscriber::fmt::layer()
                .with_ansi(ansi)
                .event_format(LevelColours::new(ansi))
                .with_writer(io::stderr)
                .boxed()
        }
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .with_span_events(FmtSpan::CLOSE)
            .with_writer(io::stderr)
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .boxed(),
    };

    // Another logger may already own the `log` slot; events still reach it.
    let _ = LogTracer::init();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|source| LoggingError::InstallFailed { source })
}

fn parse_log_format(raw: &str) -> Result<LogFormat, LoggingError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "human" => Ok(LogFormat::Human),
        "json" => Ok(LogFormat::Json),
        other => Err(LoggingError::UnsupportedFormat {
            provided: other.to_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;
    use std::sync::{Arc, Mutex};

    use rstest::rstest;
    use tracing::{debug, error, info, trace};
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn text(&self) -> String {
            let bytes = self.0.lock().expect("capture lock").clone();
            String::from_utf8(bytes).expect("utf-8 log output")
        }
    }

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().expect("capture lock").extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Self;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn capture(ansi: bool, emit: impl FnOnce()) -> String {
        let captured = Captured::default();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(Level::TRACE)
            .with_ansi(ansi)
            .event_format(LevelColours::new(ansi))
            .with_writer(captured.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, emit);
        captured.text()
    }

    #[rstest]
    #[case(0, Level::INFO)]
    #[case(1, Level::DEBUG)]
    #[case(2, Level::INFO)]
    #[case(5, Level::INFO)]
    fn verbosity_selects_debug_only_for_a_single_flag(#[case] count: u8, #[case] expected: Level) {
        assert_eq!(level_for_verbosity(count), expected);
    }

    #[rstest]
    #[case("human", LogFormat::Human)]
    #[case("HUMAN", LogFormat::Human)]
    #[case(" json ", LogFormat::Json)]
    fn parse_log_format_accepts_supported_values(#[case] raw: &str, #[case] expected: LogFormat) {
        let format = parse_log_format(raw).expect("format must parse");
        assert_eq!(format, expected);
    }

    #[test]
    fn parse_log_format_rejects_unknown_values() {
        let err = parse_log_format("xml").expect_err("xml is not supported");
        match err {
            LoggingError::UnsupportedFormat { provided } => assert_eq!(provided, "xml"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn coloured_lines_wrap_each_level() {
        let text = capture(true, || {
            debug!("preparing");
            info!("serialized");
            tracing::warn!("odd header");
            error!("failed");
        });
        assert_eq!(
            text,
            "\x1b[0mDEBUG: preparing\x1b[0m\n\
             \x1b[94mINFO: serialized\x1b[0m\n\
             \x1b[93mWARNING: odd header\x1b[0m\n\
             \x1b[91mERROR: failed\x1b[0m\n"
        );
    }

    #[test]
    fn plain_lines_keep_structured_fields() {
        let text = capture(false, || {
            info!(rows = 3, "table loaded");
            trace!("fine detail");
        });
        assert_eq!(text, "INFO: table loaded rows=3\nTRACE: fine detail\n");
    }

    #[test]
    fn init_logging_is_idempotent() {
        init_logging(0).expect("logging must initialise");
        init_logging(1).expect("subsequent calls must be no-ops");
    }
}
