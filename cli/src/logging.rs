use tracing_subscriber::{EnvFilter, fmt};

pub const LOG_ENV: &str = "THALI_LOG";

/// `-v` flags win over `THALI_LOG`; with neither, only warnings are shown.
fn filter(verbosity: u8) -> EnvFilter {
    match verbosity {
        0 => EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    }
}

pub fn init(verbosity: u8) {
    // stdout is reserved for command output (tables and JSON)
    let _ = fmt()
        .with_env_filter(filter(verbosity))
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
