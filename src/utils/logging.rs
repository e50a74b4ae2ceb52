use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};
use std::env;
use std::fs;
use std::io;
use std::sync::Arc;

/// Initialize logging for hosts embedding the simulation loop.
///
/// Honors `RUST_LOG`; defaults to `info` with debug output for this crate.
/// Logs go to the console and to `log.txt` in the working directory.
pub fn init_logging() {
    let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

    // Remove existing log.txt file if it exists
    if let Err(e) = fs::remove_file("log.txt") {
        if e.kind() != io::ErrorKind::NotFound {
            eprintln!("Warning: Failed to remove existing log.txt: {}", e);
        }
    }

    let log_file = match fs::File::create("log.txt") {
        Ok(file) => Some(file),
        Err(e) => {
            eprintln!("Warning: Failed to create log.txt: {}", e);
            None
        }
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let mut filter = EnvFilter::new(&log_level);
        if let Ok(directive) = "kinema=debug".parse() {
            filter = filter.add_directive(directive);
        }
        filter
    });

    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_span_events(FmtSpan::CLOSE)
                .with_target(true),
        );

    let result = if let Some(file) = log_file {
        registry
            .with(fmt::layer().with_ansi(false).with_writer(Arc::new(file)))
            .try_init()
    } else {
        registry.try_init()
    };

    if result.is_err() {
        // A subscriber is already installed (e.g. by the embedding host).
        tracing::debug!("logging already initialized, keeping existing subscriber");
    }
}
