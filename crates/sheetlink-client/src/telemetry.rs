use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install a global `tracing` subscriber filtered by `RUST_LOG`
/// (default `sheetlink=info`). Safe to call more than once.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("sheetlink_core=info,sheetlink_client=info"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .try_init();
}
