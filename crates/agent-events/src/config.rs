//! Emitter configuration and process identity, both read from the environment.

use crate::retry::{DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_INTERVAL, RetryPolicy};
use std::env;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// Pod name of the hosting process (downward API)
pub const POD_NAME_ENV: &str = "POD_NAME";
/// Pod UID of the hosting process (downward API)
pub const POD_UID_ENV: &str = "POD_UID";
/// Node the hosting pod runs on (downward API)
pub const NODE_NAME_ENV: &str = "NODE_NAME";
/// Namespace of the hosting pod (downward API)
pub const POD_NAMESPACE_ENV: &str = "POD_NAMESPACE";

/// Bounded queue size between `emit` callers and the dispatcher
pub const QUEUE_CAPACITY_ENV: &str = "EVENT_QUEUE_CAPACITY";
/// Maximum deliveries running at once
pub const MAX_IN_FLIGHT_ENV: &str = "EVENT_MAX_IN_FLIGHT";
/// Create attempts per event
pub const MAX_ATTEMPTS_ENV: &str = "EVENT_MAX_ATTEMPTS";
/// Seconds between failed attempts
pub const RETRY_INTERVAL_ENV: &str = "EVENT_RETRY_INTERVAL_SECS";

/// Component name reported as the event source
pub const DEFAULT_COMPONENT: &str = "dcops-agent";
/// Default bounded queue size
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;
/// Default maximum deliveries in flight
pub const DEFAULT_MAX_IN_FLIGHT: usize = 16;

/// Identity of the process emitting events
///
/// Missing variables yield empty fields; the event is still emitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessIdentity {
    pub pod_name: String,
    pub pod_uid: String,
    pub node_name: String,
    pub namespace: String,
}

impl ProcessIdentity {
    /// Read the identity from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read the identity through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            pod_name: lookup(POD_NAME_ENV).unwrap_or_default(),
            pod_uid: lookup(POD_UID_ENV).unwrap_or_default(),
            node_name: lookup(NODE_NAME_ENV).unwrap_or_default(),
            namespace: lookup(POD_NAMESPACE_ENV).unwrap_or_default(),
        }
    }
}

/// Event emitter settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitterConfig {
    /// Reported as event source component, reporting controller and in the
    /// involved object's field path
    pub component: String,
    pub queue_capacity: usize,
    pub max_in_flight: usize,
    pub retry: RetryPolicy,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            component: DEFAULT_COMPONENT.to_string(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            max_in_flight: DEFAULT_MAX_IN_FLIGHT,
            retry: RetryPolicy::default(),
        }
    }
}

impl EmitterConfig {
    /// Load settings from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load settings through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let queue_capacity = positive_or(&lookup, QUEUE_CAPACITY_ENV, DEFAULT_QUEUE_CAPACITY);
        let max_in_flight = positive_or(&lookup, MAX_IN_FLIGHT_ENV, DEFAULT_MAX_IN_FLIGHT);
        let max_attempts = positive_or(&lookup, MAX_ATTEMPTS_ENV, DEFAULT_MAX_ATTEMPTS);
        let interval_secs =
            parse_or(&lookup, RETRY_INTERVAL_ENV, DEFAULT_RETRY_INTERVAL.as_secs());

        Self {
            component: DEFAULT_COMPONENT.to_string(),
            queue_capacity,
            max_in_flight,
            retry: RetryPolicy::new(max_attempts, Duration::from_secs(interval_secs)),
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Copy + std::fmt::Display,
{
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Invalid value '{}' for {}, using default {}", raw, key, default);
            default
        }),
    }
}

fn positive_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Copy + std::fmt::Display + PartialOrd + Default,
{
    let value = parse_or(lookup, key, default);
    if value > T::default() {
        value
    } else {
        warn!("{} must be greater than zero, using default {}", key, default);
        default
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_identity_tolerates_missing_variables() {
        let identity = ProcessIdentity::from_lookup(lookup_from(&[(POD_NAME_ENV, "agent-0")]));
        assert_eq!(identity.pod_name, "agent-0");
        assert_eq!(identity.pod_uid, "");
        assert_eq!(identity.node_name, "");
        assert_eq!(identity.namespace, "");
    }

    #[test]
    fn test_config_defaults() {
        let config = EmitterConfig::from_lookup(lookup_from(&[]));
        assert_eq!(config, EmitterConfig::default());
        assert_eq!(config.retry.max_attempts(), 30);
        assert_eq!(config.retry.interval(), Duration::from_secs(10));
    }

    #[test]
    fn test_config_overrides_and_invalid_values() {
        let config = EmitterConfig::from_lookup(lookup_from(&[
            (QUEUE_CAPACITY_ENV, "8"),
            (MAX_IN_FLIGHT_ENV, "0"),
            (MAX_ATTEMPTS_ENV, "five"),
            (RETRY_INTERVAL_ENV, "2"),
        ]));
        assert_eq!(config.queue_capacity, 8);
        assert_eq!(config.max_in_flight, DEFAULT_MAX_IN_FLIGHT);
        assert_eq!(config.retry.max_attempts(), DEFAULT_MAX_ATTEMPTS);
        assert_eq!(config.retry.interval(), Duration::from_secs(2));
    }
}
