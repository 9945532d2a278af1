use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// `WEIGHT_TREND_LOG` (or `RUST_LOG`) sets the base filter, `info` otherwise.
/// `verbose` always raises the default level to `debug` on top of it.
fn build_filter(verbose: bool, configured: Option<String>) -> EnvFilter {
    let filter = configured.map_or_else(
        || EnvFilter::new("info"),
        |value| EnvFilter::try_new(value).unwrap_or_else(|_| EnvFilter::new("info")),
    );

    if verbose {
        filter.add_directive(LevelFilter::DEBUG.into())
    } else {
        filter
    }
}

pub fn init_logging(verbose: bool) {
    let configured = std::env::var("WEIGHT_TREND_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .ok();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(build_filter(verbose, configured))
        .with_writer(std::io::stderr)
        .finish();

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set global default subscriber: {}", err);
    }
}
