use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Maps a `LOGLEVEL` value to a tracing level, INFO when unrecognized
pub fn parse_log_level(value: Option<&str>) -> Level {
    match value.unwrap_or("INFO").to_uppercase().as_str() {
        "DEBUG" => Level::DEBUG,
        "ERROR" => Level::ERROR,
        "WARN" => Level::WARN,
        "TRACE" => Level::TRACE,
        _ => Level::INFO,
    }
}

/// Sets up the global tracing subscriber once per process
///
/// Environment variables:
/// - LOGLEVEL: Sets the log level (DEBUG, INFO, WARN, ERROR, TRACE)
/// - RUST_LOG: Extra per-target directives for the env filter
pub fn setup_logger() -> Result<(), Box<dyn std::error::Error>> {
    INIT.call_once(|| {
        let level = parse_log_level(env::var("LOGLEVEL").ok().as_deref());

        // Create the registry with fmt layer
        let registry = tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_thread_ids(true),
            )
            .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()));

        if registry.try_init().is_err() {
            // Another subscriber is already installed, e.g. by a test harness
            return;
        }

        tracing::debug!("Log level set to: {}", level);
    });

    Ok(())
}
