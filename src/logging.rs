//! Tracing bootstrap.
//!
//! One subscriber, two sinks: human-readable stderr plus `run.log` in the
//! diagnostics directory, so a run stays debuggable even when the invoking
//! process swallows console output.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Initialize tracing. The returned guard must stay alive for the run or
/// buffered file output is lost.
pub fn init(artifacts_dir: &Path, verbose: u8) -> Option<WorkerGuard> {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    if std::fs::create_dir_all(artifacts_dir).is_ok() {
        let appender = tracing_appender::rolling::never(artifacts_dir, "run.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let file_layer = tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(false);
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .with(file_layer)
            .try_init();
        Some(guard)
    } else {
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(stderr_layer)
            .try_init();
        None
    }
}
