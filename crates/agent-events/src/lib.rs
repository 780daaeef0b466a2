//! Telemetry events for DCops agents
//!
//! Agents report noteworthy things about themselves (role changes, failed
//! actions) as core/v1 Events on their own pod. Delivery is best-effort:
//! callers never wait and never see delivery errors; failed creates are
//! retried a bounded number of times and then dropped with a logged error.
//!
//! # Example
//!
//! ```no_run
//! use agent_events::{EmitterMetrics, EventEmitter};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = prometheus::Registry::new();
//! let emitter = EventEmitter::from_env(EmitterMetrics::register(&registry)?);
//! emitter.emit("RoleChanged", "became primary");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod emitter;
pub mod error;
pub mod event;
pub mod metrics;
pub mod retry;

pub use config::{EmitterConfig, ProcessIdentity};
pub use emitter::{EventEmitter, deliver};
pub use error::DeliveryError;
pub use event::TelemetryEvent;
pub use metrics::EmitterMetrics;
pub use retry::RetryPolicy;
