use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Set to `json` for one JSON object per line instead of the compact format.
pub const ENV_LOG_FORMAT: &str = "CONSORCIO_LOG_FORMAT";

const DEFAULT_FILTER: &str = "info,consorcio_admin=debug";

/// Initialize tracing with stdout and Sentry layers.
///
/// - Stdout: compact and human-readable, or JSON lines when
///   `CONSORCIO_LOG_FORMAT=json`
/// - Sentry: captures ERROR events as issues, WARN as breadcrumbs
/// - Default level: INFO (DEBUG for this crate), override via RUST_LOG env
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let json = std::env::var(ENV_LOG_FORMAT)
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let stdout_layer = if json {
        fmt::layer().json().with_current_span(false).boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(true)
            .with_line_number(true)
            .compact()
            .boxed()
    };

    // No-op when Sentry DSN is not configured.
    let sentry_layer = sentry_tracing::layer().event_filter(|meta| match *meta.level() {
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    });

    // A second init (tests, embedding hosts) keeps the first subscriber.
    if tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(sentry_layer)
        .try_init()
        .is_err()
    {
        return;
    }

    tracing::debug!(json, "Tracing initialized");
}
