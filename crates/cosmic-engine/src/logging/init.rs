use std::io::Write;
use std::sync::Once;

use log::LevelFilter;

use super::{APP_TARGET, CORE_TARGET};

/// Logger configuration.
///
/// `core_level` and `app_level` filter the two engine channels independently.
/// Records from other targets (third-party crates) are kept at `Warn`.
///
/// `env_filter` follows the `env_logger` filter syntax and replaces the
/// per-channel levels entirely (e.g. "cosmic::core=debug,cosmic::app=info").
/// When unset, `RUST_LOG` is consulted before falling back to the levels.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub core_level: LevelFilter,
    pub app_level: LevelFilter,
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            core_level: LevelFilter::Info,
            app_level: LevelFilter::Debug,
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

static INIT: Once = Once::new();

/// Initializes the global logger once.
///
/// This function is idempotent; subsequent calls are ignored. If another
/// logger was installed first, it is left in place.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        if let Some(filter) = config.env_filter {
            builder.parse_filters(&filter);
        } else if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        } else {
            builder
                .filter_level(LevelFilter::Warn)
                .filter_module(CORE_TARGET, config.core_level)
                .filter_module(APP_TARGET, config.app_level);
        }

        builder.write_style(config.write_style);
        builder.format(|buf, record| {
            writeln!(
                buf,
                "{} {} ▶ {} {}",
                buf.timestamp_millis(),
                channel_label(record.target()),
                record.level(),
                record.args()
            )
        });

        if builder.try_init().is_ok() {
            core_debug!("logging initialized");
        }
    });
}

/// Short channel name printed in front of each record.
pub fn channel_label(target: &str) -> &str {
    match target {
        CORE_TARGET => "CORE",
        APP_TARGET => "APP",
        other => other,
    }
}
