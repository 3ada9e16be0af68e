use tracing::info;
use tracing_subscriber::EnvFilter;

/// Initialize logging to stdout. `RUST_LOG` overrides the default filter.
pub fn init_telemetry(verbose: bool) {
    let default_filter = if verbose {
        "debug"
    } else {
        "info,camera_alarm_bridge=debug"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .init();

    info!("📊 Telemetry initialized");
}
