//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging
//! utilities for the Skillhub workshop subsystem.

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;
use crate::utils::errors::Result;

/// Initialize logging based on configuration
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let file_appender = tracing_appender::rolling::daily(&config.file_path, "skillhub.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking))
        .init();

    info!("Logging initialized with level: {}", config.level);
    Ok(())
}

/// Log a workshop mutation with structured data
pub fn log_workshop_mutation(workshop_id: &str, action: &str, user_id: &str) {
    info!(
        workshop_id = workshop_id,
        action = action,
        user_id = user_id,
        "Workshop mutation performed"
    );
}
