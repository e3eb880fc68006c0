use std::io;

use tracing_subscriber::{prelude::*, EnvFilter};

/// Logs go to stderr and are off unless `RUST_LOG` asks for them, so the
/// game screen on stdout stays clean.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}
