pub mod config;
pub mod fal;

pub use config::Config;
pub use fal::{FalClient, FileStore, UploadError, upload_image};

/// Initialize tracing with support for LOG_LEVEL from .env
///
/// `RUST_LOG` wins over `LOG_LEVEL`; `default_level` applies when neither is set.
pub fn init_tracing(default_level: &str) {
    let log_level = std::env::var("LOG_LEVEL")
        .ok()
        .unwrap_or_else(|| default_level.to_string());

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .or_else(|_| tracing_subscriber::EnvFilter::try_new(&log_level))
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();
}
