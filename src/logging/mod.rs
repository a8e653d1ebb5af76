use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `LOG_FORMAT=json` switches to JSON lines.
pub fn init() {
    let filter = EnvFilter::from_default_env().add_directive(
        "expense_config=info"
            .parse()
            .unwrap_or_else(|_| LevelFilter::INFO.into()),
    );

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
