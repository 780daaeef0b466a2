//! In-memory object store for unit testing
//!
//! These mocks stand in for the Kubernetes API so controllers can be tested
//! without a cluster. Failures can be injected per kind (lists) or for a
//! number of attempts (event creation).

use crate::error::StoreError;
use crate::selector::{LabelSelector, ListScope};
use crate::store_trait::{EventStore, EventStoreConnector, ObjectStore};
use k8s_openapi::api::core::v1::Event;
use kube::core::{ApiResource, DynamicObject};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::time::Instant;

/// Mock object store holding objects in memory
#[derive(Clone, Default)]
pub struct MockObjectStore {
    objects: Arc<Mutex<Vec<DynamicObject>>>,
    // kind -> injected error message
    list_failures: Arc<Mutex<HashMap<String, String>>>,
    list_calls: Arc<Mutex<Vec<String>>>,
}

impl MockObjectStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a typed object (serialized with its apiVersion/kind)
    pub fn add<K: Serialize>(&self, object: &K) {
        let value = serde_json::to_value(object).unwrap();
        let dynamic: DynamicObject = serde_json::from_value(value).unwrap();
        self.add_dynamic(dynamic);
    }

    /// Add an unstructured object as-is
    pub fn add_dynamic(&self, object: DynamicObject) {
        self.objects.lock().unwrap().push(object);
    }

    /// Make every list of `kind` fail with `message`
    pub fn fail_lists_of(&self, kind: &str, message: &str) {
        self.list_failures
            .lock()
            .unwrap()
            .insert(kind.to_string(), message.to_string());
    }

    /// Kinds listed so far, in call order
    pub fn list_calls(&self) -> Vec<String> {
        self.list_calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl ObjectStore for MockObjectStore {
    async fn list(
        &self,
        resource: &ApiResource,
        scope: &ListScope,
        selector: &LabelSelector,
    ) -> Result<Vec<DynamicObject>, StoreError> {
        self.list_calls.lock().unwrap().push(resource.kind.clone());

        if let Some(message) = self.list_failures.lock().unwrap().get(&resource.kind) {
            return Err(StoreError::Unavailable(message.clone()));
        }

        let objects = self.objects.lock().unwrap();
        Ok(objects
            .iter()
            .filter(|obj| {
                obj.types.as_ref().is_some_and(|types| {
                    types.api_version == resource.api_version && types.kind == resource.kind
                })
            })
            .filter(|obj| match scope {
                ListScope::Namespace(ns) => obj.metadata.namespace.as_deref() == Some(ns.as_str()),
                ListScope::Cluster => true,
            })
            .filter(|obj| selector.matches(obj.metadata.labels.as_ref()))
            .cloned()
            .collect())
    }
}

/// Mock event store that fails a configurable number of times before succeeding
#[derive(Clone, Default)]
pub struct MockEventStore {
    failures_remaining: Arc<Mutex<usize>>,
    attempts: Arc<Mutex<Vec<Instant>>>,
    created: Arc<Mutex<Vec<(String, Event)>>>,
}

impl MockEventStore {
    /// Store that accepts every event
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that rejects the first `times` create calls
    pub fn failing(times: usize) -> Self {
        let store = Self::default();
        *store.failures_remaining.lock().unwrap() = times;
        store
    }

    /// Store that rejects every create call
    pub fn always_failing() -> Self {
        Self::failing(usize::MAX)
    }

    /// Number of create calls so far
    pub fn attempts(&self) -> usize {
        self.attempts.lock().unwrap().len()
    }

    /// Time of every create call, in order
    pub fn attempt_times(&self) -> Vec<Instant> {
        self.attempts.lock().unwrap().clone()
    }

    /// Successfully created events with their namespace
    pub fn created_events(&self) -> Vec<(String, Event)> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl EventStore for MockEventStore {
    async fn create_event(&self, namespace: &str, event: &Event) -> Result<(), StoreError> {
        self.attempts.lock().unwrap().push(Instant::now());

        let mut remaining = self.failures_remaining.lock().unwrap();
        if *remaining > 0 {
            if *remaining != usize::MAX {
                *remaining -= 1;
            }
            return Err(StoreError::Unavailable("injected create failure".to_string()));
        }
        drop(remaining);

        self.created
            .lock()
            .unwrap()
            .push((namespace.to_string(), event.clone()));
        Ok(())
    }
}

/// Connector handing out clones of one `MockEventStore`
#[derive(Clone, Default)]
pub struct MockEventConnector {
    store: MockEventStore,
    connect_error: Option<String>,
    connects: Arc<Mutex<usize>>,
}

impl MockEventConnector {
    /// Connector for `store`
    pub fn new(store: MockEventStore) -> Self {
        Self {
            store,
            ..Default::default()
        }
    }

    /// Connector whose `connect` always fails
    pub fn unreachable(message: &str) -> Self {
        Self {
            connect_error: Some(message.to_string()),
            ..Default::default()
        }
    }

    /// The shared store behind every connection
    pub fn store(&self) -> &MockEventStore {
        &self.store
    }

    /// Number of `connect` calls so far
    pub fn connects(&self) -> usize {
        *self.connects.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl EventStoreConnector for MockEventConnector {
    async fn connect(&self) -> Result<Box<dyn EventStore>, StoreError> {
        *self.connects.lock().unwrap() += 1;
        match &self.connect_error {
            Some(message) => Err(StoreError::Connect(message.clone())),
            None => Ok(Box::new(self.store.clone())),
        }
    }
}
