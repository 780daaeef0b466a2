//! Fire-and-forget event emitter
//!
//! `emit` builds the event on the caller's side (so the process identity is
//! read at call time) and pushes it onto a bounded queue without waiting.
//! A dispatcher task drains the queue and runs every delivery as its own
//! task, with at most `max_in_flight` deliveries running at once. A full
//! queue drops the event and counts it.
//!
//! Deliveries are independent: no ordering between events, no
//! deduplication. A delivery cannot be cancelled; it runs until the event is
//! created or its attempts are exhausted, even after the emitter is dropped.

use crate::config::{EmitterConfig, ProcessIdentity};
use crate::error::DeliveryError;
use crate::event::TelemetryEvent;
use crate::metrics::EmitterMetrics;
use crate::retry::RetryPolicy;
use k8s_openapi::api::core::v1::Event;
use kube_store::{EventStoreConnector, KubeEventConnector};
use std::sync::Arc;
use tokio::sync::{Semaphore, mpsc};
use tracing::{debug, error, warn};

type IdentitySource = Arc<dyn Fn() -> ProcessIdentity + Send + Sync>;

/// An event waiting for delivery
#[derive(Debug)]
struct PendingEvent {
    namespace: String,
    reason: String,
    event: Event,
}

/// Asynchronous, best-effort telemetry event emitter
pub struct EventEmitter {
    queue: mpsc::Sender<PendingEvent>,
    component: String,
    identity: IdentitySource,
    metrics: EmitterMetrics,
}

impl EventEmitter {
    /// Start the dispatcher and return the emitter handle.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(
        config: EmitterConfig,
        connector: Arc<dyn EventStoreConnector>,
        metrics: EmitterMetrics,
    ) -> Self {
        let (queue, pending) = mpsc::channel(config.queue_capacity.max(1));
        tokio::spawn(dispatch(
            pending,
            connector,
            config.retry,
            config.max_in_flight,
            metrics.clone(),
        ));

        Self {
            queue,
            component: config.component,
            identity: Arc::new(ProcessIdentity::from_env),
            metrics,
        }
    }

    /// Emitter configured from the environment, delivering to the cluster the
    /// process runs in
    pub fn from_env(metrics: EmitterMetrics) -> Self {
        Self::start(
            EmitterConfig::from_env(),
            Arc::new(KubeEventConnector),
            metrics,
        )
    }

    /// Replace where the process identity comes from (defaults to the environment)
    #[must_use]
    pub fn with_identity<F>(mut self, identity: F) -> Self
    where
        F: Fn() -> ProcessIdentity + Send + Sync + 'static,
    {
        self.identity = Arc::new(identity);
        self
    }

    /// Emit a Normal event about the hosting pod. Never blocks, never fails.
    pub fn emit(&self, reason: &str, message: &str) {
        let identity = (self.identity)();
        let event = TelemetryEvent::new(&identity, &self.component, reason, message).to_kube_event();

        let pending = PendingEvent {
            namespace: identity.namespace,
            reason: reason.to_string(),
            event,
        };
        match self.queue.try_send(pending) {
            Ok(()) => self.metrics.enqueued.inc(),
            Err(mpsc::error::TrySendError::Full(pending)) => {
                self.metrics.dropped.inc();
                warn!("Event queue full, dropping event {}", pending.reason);
            }
            Err(mpsc::error::TrySendError::Closed(pending)) => {
                self.metrics.dropped.inc();
                warn!("Event dispatcher stopped, dropping event {}", pending.reason);
            }
        }
    }

    /// Delivery metrics
    pub fn metrics(&self) -> &EmitterMetrics {
        &self.metrics
    }
}

async fn dispatch(
    mut pending: mpsc::Receiver<PendingEvent>,
    connector: Arc<dyn EventStoreConnector>,
    policy: RetryPolicy,
    max_in_flight: usize,
    metrics: EmitterMetrics,
) {
    let slots = Arc::new(Semaphore::new(max_in_flight.max(1)));

    while let Some(next) = pending.recv().await {
        let Ok(slot) = Arc::clone(&slots).acquire_owned().await else {
            break;
        };
        let connector = Arc::clone(&connector);
        let metrics = metrics.clone();

        metrics.in_flight.inc();
        tokio::spawn(async move {
            match deliver(connector.as_ref(), &next.namespace, &next.event, &policy, &metrics).await
            {
                Ok(attempts) => {
                    metrics.delivered.inc();
                    debug!("Sent event {} after {} attempt(s)", next.reason, attempts);
                }
                Err(e) => {
                    metrics.failed.inc();
                    error!("Send event {} failed: {}", next.reason, e);
                }
            }
            metrics.in_flight.dec();
            drop(slot);
        });
    }

    debug!("Event queue closed, dispatcher exiting");
}

/// Deliver one event with a freshly constructed store client.
///
/// Returns the number of attempts it took. A connect failure is terminal and
/// makes no attempt; otherwise create is retried per `policy`.
pub async fn deliver(
    connector: &dyn EventStoreConnector,
    namespace: &str,
    event: &Event,
    policy: &RetryPolicy,
    metrics: &EmitterMetrics,
) -> Result<u32, DeliveryError> {
    let store = connector.connect().await.map_err(DeliveryError::Connect)?;

    let mut attempt = 0;
    loop {
        attempt += 1;
        metrics.attempts.inc();

        match store.create_event(namespace, event).await {
            Ok(()) => return Ok(attempt),
            Err(e) => match policy.delay_after(attempt) {
                Some(delay) => {
                    debug!("Event create attempt {} failed: {}, retrying in {:?}", attempt, e, delay);
                    tokio::time::sleep(delay).await;
                }
                None => {
                    return Err(DeliveryError::Exhausted {
                        attempts: attempt,
                        source: e,
                    });
                }
            },
        }
    }
}
