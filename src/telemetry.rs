mod interceptor;

pub use interceptor::RequestIdLayer;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, registry, EnvFilter};

use crate::configs::LogConfig;
use crate::context::Environment;

/// Installs the global subscriber: env-filtered, request-id aware, and
/// formatted for humans locally or as JSON lines everywhere else.
///
/// The returned guard must outlive the process's logging; dropping it stops
/// the background writer.
pub fn tracing_setup(env: &Environment, log: &LogConfig) -> WorkerGuard {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log.level.as_str()));

    let (writer, guard) = match &log.directory {
        Some(directory) => {
            tracing_appender::non_blocking(tracing_appender::rolling::daily(directory, "reqid.log"))
        }
        None => tracing_appender::non_blocking(std::io::stdout()),
    };

    let registry = registry().with(filter).with(RequestIdLayer);
    if env.is_local() {
        registry.with(fmt::layer().with_writer(writer)).init();
    } else {
        registry
            .with(JsonStorageLayer)
            .with(BunyanFormattingLayer::new("reqid".into(), writer))
            .init();
    }

    guard
}
