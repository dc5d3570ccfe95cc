//! Logging integration for the modeladmin-rs workspace.
//!
//! Provides a helper for configuring [`tracing`]-based logging. The admin
//! layer reports non-fatal configuration problems (missing permission
//! records, missing tester capabilities) as warnings through `tracing`, so
//! hosts should install a subscriber early.

/// Sets up the global tracing subscriber.
///
/// The log level is an env-filter directive string (e.g. "debug", "info",
/// "warn", "modeladmin=debug"). With `debug` set a pretty, human-readable
/// format is used; otherwise a structured JSON format is used.
///
/// Installation is idempotent: if a subscriber is already installed this is
/// a no-op.
pub fn setup_logging(log_level: &str, debug: bool) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    if debug {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .pretty()
            .try_init()
            .ok();
    } else {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .json()
            .try_init()
            .ok();
    }
}

/// Creates a tracing span for one admin action dispatch.
///
/// Attach this span around view dispatch so log entries emitted while
/// handling the action carry the action codename.
///
/// # Examples
///
/// ```
/// use modeladmin_core::logging::action_span;
///
/// let span = action_span("edit");
/// let _guard = span.enter();
/// tracing::info!("handling action");
/// ```
pub fn action_span(codename: &str) -> tracing::Span {
    tracing::info_span!("admin_action", action = codename)
}
