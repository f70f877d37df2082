use tracing_subscriber::{
    fmt::{format, time::ChronoLocal},
    EnvFilter,
};

/// Installs the global subscriber. `RUST_LOG` takes precedence over `default_directives`.
pub fn init_log(default_directives: &str) {
    let format = format::format()
        .with_level(true)
        .with_target(false)
        .with_timer(ChronoLocal::new("[%m-%d %H:%M:%S%.3f]".to_string()))
        .compact();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives));
    tracing_subscriber::fmt().with_env_filter(env_filter).event_format(format).init();
}
