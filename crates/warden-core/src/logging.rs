//! Logging integration for warden.
//!
//! Provides helpers for configuring [`tracing`]-based logging from
//! [`Settings`](crate::settings::Settings) and for creating per-attempt spans.

use crate::settings::Settings;

/// Sets up the global tracing subscriber based on the given settings.
///
/// The filter is read from `settings.log_level`. In debug mode a pretty,
/// human-readable format is used; otherwise a structured JSON format is
/// used. Events go to stderr so command output on stdout stays clean.
/// Installing a second subscriber is silently ignored.
pub fn setup_logging(settings: &Settings) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_new(&settings.log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    if settings.debug {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(true)
            .with_line_number(true)
            .with_writer(std::io::stderr)
            .pretty()
            .try_init()
            .ok();
    } else {
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .json()
            .try_init()
            .ok();
    }
}

/// Creates a tracing span for a single authentication attempt.
///
/// Only the submitted identity is recorded; secrets never enter a span.
///
/// # Examples
///
/// ```
/// use warden_core::logging::auth_span;
///
/// let span = auth_span("alice@example.com");
/// let _guard = span.enter();
/// tracing::debug!("checking credentials");
/// ```
pub fn auth_span(identity: &str) -> tracing::Span {
    tracing::debug_span!("authenticate", identity = identity)
}
