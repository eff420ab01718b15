//! Observability
//!
//! Structured JSON logs, typed lifecycle events and diagnosis counters.
//! Observability is read-only: nothing here feeds back into an interview,
//! and a failed log write is dropped silently.
//!
//! ```ignore
//! use autodiag::observability::{log_event, Event, MetricsRegistry};
//!
//! log_event(Event::SessionStarted, &[("category", "brakes")]);
//! let metrics = MetricsRegistry::new();
//! metrics.increment_sessions_started();
//! ```

mod events;
mod logger;
mod metrics;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};
pub use scope::ObservationScope;

/// Log a typed event at its default severity
pub fn log_event(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
