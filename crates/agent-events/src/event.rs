//! Telemetry event construction
//!
//! Events describe the hosting pod itself: the involved object is the pod,
//! the source host is its node, and the reporting instance is the pod name.

use crate::config::ProcessIdentity;
use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1::{Event, EventSource as KubeEventSource, ObjectReference};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{MicroTime, ObjectMeta, Time};
use uuid::Uuid;

/// Length of the random suffix appended to event names
pub const NAME_SUFFIX_LEN: usize = 16;

/// Severity of every telemetry event
pub const EVENT_TYPE_NORMAL: &str = "Normal";

/// A telemetry event about the hosting process
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryEvent {
    /// `<pod name>.<random suffix>`
    pub name: String,
    pub namespace: String,
    pub reason: String,
    pub message: String,
    pub involved_object: InvolvedObject,
    pub source: EventSource,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub reporting: ReportingIdentity,
}

/// Reference to the pod the event is about
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvolvedObject {
    pub kind: String,
    pub namespace: String,
    pub name: String,
    pub uid: String,
    pub field_path: String,
}

/// Component and host that produced the event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventSource {
    pub component: String,
    pub host: String,
}

/// Reporting controller and instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportingIdentity {
    pub controller: String,
    pub instance: String,
}

impl TelemetryEvent {
    /// Build an event stamped with the current time
    pub fn new(identity: &ProcessIdentity, component: &str, reason: &str, message: &str) -> Self {
        let now = Utc::now();
        Self {
            name: format!("{}.{}", identity.pod_name, random_suffix()),
            namespace: identity.namespace.clone(),
            reason: reason.to_string(),
            message: message.to_string(),
            involved_object: InvolvedObject {
                kind: "Pod".to_string(),
                namespace: identity.namespace.clone(),
                name: identity.pod_name.clone(),
                uid: identity.pod_uid.clone(),
                field_path: format!("spec.containers{{{}}}", component),
            },
            source: EventSource {
                component: component.to_string(),
                host: identity.node_name.clone(),
            },
            first_seen: now,
            last_seen: now,
            reporting: ReportingIdentity {
                controller: component.to_string(),
                instance: identity.pod_name.clone(),
            },
        }
    }

    /// Render as a core/v1 `Event`
    pub fn to_kube_event(&self) -> Event {
        Event {
            metadata: ObjectMeta {
                name: Some(self.name.clone()),
                namespace: Some(self.namespace.clone()),
                ..Default::default()
            },
            involved_object: ObjectReference {
                kind: Some(self.involved_object.kind.clone()),
                namespace: Some(self.involved_object.namespace.clone()),
                name: Some(self.involved_object.name.clone()),
                uid: Some(self.involved_object.uid.clone()),
                field_path: Some(self.involved_object.field_path.clone()),
                ..Default::default()
            },
            reason: Some(self.reason.clone()),
            message: Some(self.message.clone()),
            source: Some(KubeEventSource {
                component: Some(self.source.component.clone()),
                host: Some(self.source.host.clone()),
            }),
            first_timestamp: Some(Time(self.first_seen)),
            last_timestamp: Some(Time(self.last_seen)),
            event_time: Some(MicroTime(self.first_seen)),
            reporting_component: Some(self.reporting.controller.clone()),
            reporting_instance: Some(self.reporting.instance.clone()),
            action: Some(self.reason.clone()),
            type_: Some(EVENT_TYPE_NORMAL.to_string()),
            ..Default::default()
        }
    }
}

fn random_suffix() -> String {
    Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(NAME_SUFFIX_LEN)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> ProcessIdentity {
        ProcessIdentity {
            pod_name: "pg-main-postgresql-0".to_string(),
            pod_uid: "5f0c3c1e-0000-4000-8000-000000000001".to_string(),
            node_name: "worker-3".to_string(),
            namespace: "databases".to_string(),
        }
    }

    #[test]
    fn test_event_derived_from_identity() {
        let event = TelemetryEvent::new(&identity(), "dcops-agent", "RoleChanged", "became primary");

        let (prefix, suffix) = event.name.rsplit_once('.').unwrap();
        assert_eq!(prefix, "pg-main-postgresql-0");
        assert_eq!(suffix.len(), NAME_SUFFIX_LEN);
        assert_eq!(event.involved_object.kind, "Pod");
        assert_eq!(event.involved_object.uid, "5f0c3c1e-0000-4000-8000-000000000001");
        assert_eq!(event.involved_object.field_path, "spec.containers{dcops-agent}");
        assert_eq!(event.source.host, "worker-3");
        assert_eq!(event.reporting.instance, "pg-main-postgresql-0");
        assert_eq!(event.first_seen, event.last_seen);
    }

    #[test]
    fn test_repeated_events_get_distinct_names() {
        let a = TelemetryEvent::new(&identity(), "dcops-agent", "RoleChanged", "m");
        let b = TelemetryEvent::new(&identity(), "dcops-agent", "RoleChanged", "m");
        assert_ne!(a.name, b.name);
    }

    #[test]
    fn test_kube_event_rendering() {
        let event = TelemetryEvent::new(&identity(), "dcops-agent", "RoleChanged", "became primary")
            .to_kube_event();

        assert_eq!(event.metadata.namespace.as_deref(), Some("databases"));
        assert_eq!(event.reason.as_deref(), Some("RoleChanged"));
        assert_eq!(event.action.as_deref(), Some("RoleChanged"));
        assert_eq!(event.message.as_deref(), Some("became primary"));
        assert_eq!(event.type_.as_deref(), Some("Normal"));
        assert_eq!(event.reporting_component.as_deref(), Some("dcops-agent"));
        assert_eq!(event.involved_object.name.as_deref(), Some("pg-main-postgresql-0"));
        assert!(event.first_timestamp.is_some());
        assert!(event.event_time.is_some());
    }

    #[test]
    fn test_kube_event_carries_telemetry_timestamps() {
        let telemetry = TelemetryEvent::new(&identity(), "dcops-agent", "RoleChanged", "m");
        let event = telemetry.to_kube_event();

        assert_eq!(event.first_timestamp, Some(Time(telemetry.first_seen)));
        assert_eq!(event.last_timestamp, Some(Time(telemetry.last_seen)));
        assert_eq!(event.event_time, Some(MicroTime(telemetry.first_seen)));
        assert_eq!(event.involved_object.field_path.as_deref(), Some("spec.containers{dcops-agent}"));
        assert_eq!(event.source.and_then(|s| s.host).as_deref(), Some("worker-3"));
    }

    #[test]
    fn test_empty_identity_still_renders() {
        let event = TelemetryEvent::new(&ProcessIdentity::default(), "dcops-agent", "Started", "")
            .to_kube_event();
        assert_eq!(event.metadata.namespace.as_deref(), Some(""));
        assert!(event.metadata.name.unwrap().starts_with('.'));
    }
}
