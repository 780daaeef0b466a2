//! Prometheus metrics for event delivery, so telemetry loss is measurable.

use prometheus::{IntCounter, IntGauge, Registry};

/// Counters shared by the emitter, its dispatcher and delivery tasks
#[derive(Debug, Clone)]
pub struct EmitterMetrics {
    /// Events accepted into the queue
    pub enqueued: IntCounter,
    /// Events rejected because the queue was full
    pub dropped: IntCounter,
    /// Events created in the store
    pub delivered: IntCounter,
    /// Events abandoned after a connect error or exhausted attempts
    pub failed: IntCounter,
    /// Create calls made against the store
    pub attempts: IntCounter,
    /// Deliveries currently running
    pub in_flight: IntGauge,
}

impl EmitterMetrics {
    /// Create the metrics and register them in `registry`
    pub fn register(registry: &Registry) -> Result<Self, prometheus::Error> {
        let metrics = Self {
            enqueued: IntCounter::new(
                "dcops_telemetry_events_enqueued_total",
                "Telemetry events accepted for delivery",
            )?,
            dropped: IntCounter::new(
                "dcops_telemetry_events_dropped_total",
                "Telemetry events dropped because the delivery queue was full",
            )?,
            delivered: IntCounter::new(
                "dcops_telemetry_events_delivered_total",
                "Telemetry events created in the API server",
            )?,
            failed: IntCounter::new(
                "dcops_telemetry_events_failed_total",
                "Telemetry events abandoned after a terminal delivery failure",
            )?,
            attempts: IntCounter::new(
                "dcops_telemetry_event_attempts_total",
                "Event create calls made against the API server",
            )?,
            in_flight: IntGauge::new(
                "dcops_telemetry_event_deliveries_in_flight",
                "Event deliveries currently running",
            )?,
        };

        registry.register(Box::new(metrics.enqueued.clone()))?;
        registry.register(Box::new(metrics.dropped.clone()))?;
        registry.register(Box::new(metrics.delivered.clone()))?;
        registry.register(Box::new(metrics.failed.clone()))?;
        registry.register(Box::new(metrics.attempts.clone()))?;
        registry.register(Box::new(metrics.in_flight.clone()))?;

        Ok(metrics)
    }
}
