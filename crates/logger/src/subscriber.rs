use std::env::var;
use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing::{level_filters::LevelFilter, warn};
use tracing_subscriber::{
    Layer, filter::EnvFilter, fmt::writer::BoxMakeWriter, layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Initialize tracing, optionally into an append-only log file.
///
/// Terminal applications that own stdout pass a file so log lines never land
/// on top of the rendered view. Without a file, or when it cannot be opened,
/// logs go to stderr.
pub fn init_tracing(log_file: Option<&Path>) {
    initialize_tracing(LevelFilter::INFO, log_file);
}

fn initialize_tracing(level: LevelFilter, log_file: Option<&Path>) {
    let env_filter = EnvFilter::builder().with_default_directive(level.into()).from_env_lossy();

    // Unset is the common case and means the compact format.
    let log_format = var("RUST_LOG_FORMAT").unwrap_or_default();

    let mut open_error = None;
    let (writer, ansi) = match log_file {
        Some(path) => match OpenOptions::new().create(true).append(true).open(path) {
            Ok(file) => (BoxMakeWriter::new(Mutex::new(file)), false),
            Err(error) => {
                open_error = Some((path.display().to_string(), error));
                (BoxMakeWriter::new(io::stderr), true)
            }
        },
        None => (BoxMakeWriter::new(io::stderr), true),
    };

    let log_layer = match log_format.as_str() {
        "json" => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(writer)
            .with_filter(env_filter)
            .boxed(),
        _ => tracing_subscriber::fmt::layer()
            .compact()
            .with_ansi(ansi)
            .with_writer(writer)
            .with_filter(env_filter)
            .boxed(),
    };

    tracing_subscriber::registry().with(log_layer).init();

    if let Some((path, error)) = open_error {
        warn!(%path, "Failed to open log file, logging to stderr: {error}");
    }
}
