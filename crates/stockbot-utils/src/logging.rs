//! Logging and tracing utilities

use tracing::Subscriber;
use tracing_subscriber::{
    EnvFilter, fmt::MakeWriter, layer::SubscriberExt, util::SubscriberInitExt,
};

/// Output format for log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human readable, one event per line
    #[default]
    Text,
    /// Newline-delimited JSON, for log collectors
    Json,
}

impl LogFormat {
    /// Parse a `LOG_FORMAT` value; anything other than `json` is text
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Text
        }
    }

    /// Read the format from the `LOG_FORMAT` environment variable
    pub fn from_env() -> Self {
        std::env::var("LOG_FORMAT")
            .map(|v| Self::parse(&v))
            .unwrap_or_default()
    }
}

/// Initialize tracing subscriber with default configuration
pub fn init_tracing() {
    init_tracing_with(LogFormat::from_env(), "info");
}

/// Initialize tracing with an explicit format and a fallback filter used
/// when `RUST_LOG` is not set.
///
/// Logs go to stderr; stdout is reserved for the serverless response body.
pub fn init_tracing_with(format: LogFormat, default_filter: &str) {
    subscriber(format, default_filter, std::io::stderr).init();
}

/// Build the subscriber used by [`init_tracing_with`], writing to `writer`
pub fn subscriber<W>(
    format: LogFormat,
    default_filter: &str,
    writer: W,
) -> Box<dyn Subscriber + Send + Sync>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Text => Box::new(
            registry.with(tracing_subscriber::fmt::layer().with_writer(writer)),
        ),
        LogFormat::Json => Box::new(
            registry.with(tracing_subscriber::fmt::layer().json().with_writer(writer)),
        ),
    }
}
