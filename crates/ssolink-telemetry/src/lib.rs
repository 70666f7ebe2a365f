//! ssolink Telemetry - audit sinks, warning notifiers and tracing setup.
//!
//! Provides the stock implementations of the `AuditSink` and `Notifier`
//! seams: tracing-backed ones for production hosts and recording ones that
//! tests and embedders can inspect.

pub mod audit;
pub mod notify;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use audit::{FanoutAuditSink, NoopAuditSink, RecordingAuditSink, TracingAuditSink};
pub use notify::{RecordingNotifier, TracingNotifier};

/// Install a global fmt subscriber.
///
/// `RUST_LOG` wins over `default_filter` when set. Calling this twice is
/// harmless; the second installation is ignored.
pub fn init_tracing(default_filter: &str) {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
