// Ambient infrastructure: logging and configuration
pub mod config;
pub mod logging;

pub use config::{Config, ContentionConfig, LogFormatName, LogTarget, LoggingConfig};
pub use logging::*;
