//! Telemetry setup

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn init_telemetry() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().json())
        .init();
}

/// Telemetry variant that also mirrors events to a daily-rolled log file.
/// The returned guard must be kept alive for the writer to flush.
pub fn init_telemetry_with_file(dir: &str, prefix: &str) -> WorkerGuard {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let file_appender = tracing_appender::rolling::daily(dir, prefix);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().json())
        .with(fmt::layer().json().with_writer(non_blocking))
        .init();
    guard
}
