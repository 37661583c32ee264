//! # symfetch Utilities
//!
//! Shared utilities for symfetch: logging built on `tracing` and the
//! terminal styling used for the tagged progress messages.

pub mod logging;
pub mod style;

// Re-export commonly used logging functions for convenience
pub use logging::{init_logging, init_logging_with_level, LogFormat, LogGuard, LogLevel, LoggingError};
pub use style::Tone;
pub use tracing::{debug, error, info, trace, warn};
