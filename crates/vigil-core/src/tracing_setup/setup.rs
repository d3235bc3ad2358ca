//! Tracing initialization and configuration.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Initialize the Vigil tracing/logging system.
///
/// Reads the `VIGIL_LOG` environment variable for per-module log levels.
/// Format: `VIGIL_LOG=vigil_analysis=debug,vigil_storage=warn`
///
/// Falls back to `vigil=info` if `VIGIL_LOG` is not set or is invalid.
/// Calling it more than once is a no-op.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_env("VIGIL_LOG").unwrap_or_else(|_| EnvFilter::new("vigil=info"));
        install(filter);
    });
}

/// Initialize tracing with an explicit filter string (for embedding or tests).
pub fn init_tracing_with_filter(filter: &str) {
    let filter = EnvFilter::new(filter);
    INIT.call_once(|| install(filter));
}

fn install(filter: EnvFilter) {
    // try_init: a host process may already own the global subscriber.
    let _ = tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(filter)
        .try_init();
}
