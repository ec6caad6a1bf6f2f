use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 구조화된 로깅을 초기화합니다.
/// Installs a JSON subscriber on stdout. `RUST_LOG` overrides
/// `default_filter`. `log` records (from the request logger) are bridged in.
pub fn init_telemetry(default_filter: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let formatting_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .json();

    if let Err(e) = tracing_subscriber::registry()
        .with(env_filter)
        .with(formatting_layer)
        .try_init()
    {
        eprintln!("Telemetry already initialised: {}", e);
    }
}
