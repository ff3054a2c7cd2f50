// 📜 Logging setup
// tracing-subscriber with RUST_LOG filtering. Logs go to stderr: stdout is
// reserved for the Beancount output.

use tracing_subscriber::{fmt, EnvFilter};

/// Initialize logging for the CLI
///
/// # Environment
/// - `RUST_LOG`: filter directive (default: `info`), e.g. `RUST_LOG=wacai_import=debug`
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Verbose logging captured by the test harness
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
