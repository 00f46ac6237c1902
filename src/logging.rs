use tracing::Level;
use tracing_subscriber::FmtSubscriber;

pub const LOG_ENV: &str = "FILESDR_LOG";

pub fn parse_level(value: &str) -> Option<Level> {
    match value.trim().to_ascii_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" | "warning" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

/// `-v` flags win over the config file, which wins over `FILESDR_LOG`.
pub fn resolve_level(verbosity: u8, configured: Option<&str>) -> Level {
    match verbosity {
        0 => {}
        1 => return Level::DEBUG,
        _ => return Level::TRACE,
    }
    configured
        .and_then(parse_level)
        .or_else(|| std::env::var(LOG_ENV).ok().as_deref().and_then(parse_level))
        .unwrap_or(Level::WARN)
}

pub fn init(level: Level) -> Result<(), String> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| format!("Failed to set subscriber: {e}"))
}
