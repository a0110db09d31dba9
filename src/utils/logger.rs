//! Logging initialization and configuration.
//!
//! The console is embedded in a larger process, so by default logs go to
//! stderr. When a log directory is configured, each run writes its own file
//! there instead, e.g. `logs/rusty-console.2024-12-06-14-30-25.log`.
//!
//! # Configuration
//!
//! The log level can be controlled via the `RUST_LOG` environment variable:
//! - `RUST_LOG=debug` - Show dispatch details
//! - `RUST_LOG=info` - Show listener and session lifecycle (default)
//! - `RUST_LOG=warn` - Show protocol warnings and command failures only

use std::fs;
use std::path::Path;

use chrono::Local;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the logging system.
///
/// Falls back to stderr if the log directory or file cannot be created.
pub fn init_logging(log_dir: Option<&Path>) {
    // Default to "info" level if RUST_LOG is not set
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let log_file = log_dir.and_then(|dir| {
        if let Err(e) = fs::create_dir_all(dir) {
            eprintln!("Warning: Failed to create logs directory: {}", e);
            return None;
        }

        let timestamp = Local::now().format("%Y-%m-%d-%H-%M-%S");
        let log_path = dir.join(format!("rusty-console.{}.log", timestamp));
        match fs::File::create(&log_path) {
            Ok(file) => Some((file, log_path)),
            Err(e) => {
                eprintln!("Warning: Failed to create log file: {}", e);
                None
            }
        }
    });

    match log_file {
        Some((file, log_path)) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            let file_layer = fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(file_layer)
                .init();

            // The writer must outlive every log call in the process.
            std::mem::forget(guard);

            tracing::info!("Logging initialized - writing to {}", log_path.display());
        }
        None => {
            let stderr_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(stderr_layer)
                .init();
        }
    }
}
