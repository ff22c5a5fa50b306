//! Tracing initialization.

use clap::ValueEnum;
use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Log line format on stderr.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

/// Initialize tracing. Safe to call multiple times; only the first call takes effect.
///
/// Logs go to stderr so they never interleave with MCP traffic on stdout.
pub fn init(format: LogFormat) {
    INIT.call_once(|| {
        let is_test =
            std::env::var("NEXTEST").is_ok() || std::env::var("CARGO_TARGET_TMPDIR").is_ok();
        let filter = EnvFilter::from_default_env().add_directive(
            if is_test {
                tracing::Level::DEBUG
            } else {
                tracing::Level::INFO
            }
            .into(),
        );

        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_target(true);

        let result = match (is_test, format) {
            (true, _) => builder.compact().with_test_writer().try_init(),
            (false, LogFormat::Compact) => builder.compact().with_writer(std::io::stderr).try_init(),
            (false, LogFormat::Json) => builder.json().with_writer(std::io::stderr).try_init(),
        };
        if let Err(e) = result {
            eprintln!("Failed to initialize tracing: {}", e)
        }
    });
}
