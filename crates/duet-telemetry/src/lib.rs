//! Prometheus metrics and structured logging for duet.
//!
//! The engine records through [`Metrics`]. The embedding process calls
//! [`init_logging`] once at startup and serves [`Metrics::render`] from its
//! scrape endpoint.

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::init_logging;
pub use metrics::Metrics;
