//! Logging setup and the two engine log channels.
//!
//! Engine internals log on the `core` channel, embedding applications on the
//! `app` channel. Both are plain `log` targets, so any `log` backend works; the
//! bundled `env_logger` setup prints the channel name with every record.

#[macro_use]
mod macros;
mod init;

pub use init::{channel_label, init_logging, LoggingConfig};

/// Log target used by engine internals.
pub const CORE_TARGET: &str = "cosmic::core";

/// Log target used by the embedding application.
pub const APP_TARGET: &str = "cosmic::app";
