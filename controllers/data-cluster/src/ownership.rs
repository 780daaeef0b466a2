//! Owned-object indexing
//!
//! Everything a `DataCluster` controls carries its instance label. To
//! reconcile, the controller lists each kind it manages under that label and
//! indexes the results by `ObjectKey`. A build is all-or-nothing: any list,
//! decode, or resolve failure aborts it and nothing partial is returned. There
//! is no retry here; the reconcile loop requeues.

use crate::error::ControllerError;
use crate::registry::{ObjectKey, OwnedObject, TypeRegistry};
use crds::{APP_INSTANCE_LABEL, DataCluster};
use kube::api::ObjectMeta;
use kube::core::{ApiResource, DynamicObject};
use kube::{Resource, ResourceExt};
use kube_store::{LabelSelector, ListScope, ObjectStore};
use serde::de::DeserializeOwned;
use std::any::Any;
use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, error};

/// Kind of the component workload objects a cluster controls
pub const COMPONENT_KIND: &str = "Component";

/// Kind of the pod-set objects a component controls
pub const INSTANCE_SET_KIND: &str = "InstanceSet";

/// A kind that can be listed and decoded into typed objects
pub trait OwnedKind: Send + Sync {
    /// API resource to list
    fn api_resource(&self) -> ApiResource;

    /// Decode one listed item
    fn decode(&self, object: DynamicObject) -> Result<Arc<dyn OwnedObject>, ControllerError>;
}

/// `OwnedKind` for a typed kube resource `K`
pub struct KindOf<K>(PhantomData<fn() -> K>);

impl<K> fmt::Debug for KindOf<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("KindOf").field(&std::any::type_name::<K>()).finish()
    }
}

/// `OwnedKind` for `K`
pub fn kind<K>() -> KindOf<K> {
    KindOf(PhantomData)
}

impl<K> OwnedKind for KindOf<K>
where
    K: Resource<DynamicType = ()> + DeserializeOwned + Any + Send + Sync + fmt::Debug,
{
    fn api_resource(&self) -> ApiResource {
        ApiResource::erase::<K>(&())
    }

    fn decode(&self, object: DynamicObject) -> Result<Arc<dyn OwnedObject>, ControllerError> {
        let typed = object
            .try_parse::<K>()
            .map_err(|e| ControllerError::Decode {
                kind: K::kind(&()).to_string(),
                message: e.to_string(),
            })?;
        Ok(Arc::new(typed))
    }
}

/// Objects owned by a cluster, keyed by type and name
#[derive(Debug, Default, Clone)]
pub struct OwnedObjectIndex {
    objects: BTreeMap<ObjectKey, Arc<dyn OwnedObject>>,
}

impl OwnedObjectIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &ObjectKey) -> Option<&Arc<dyn OwnedObject>> {
        self.objects.get(key)
    }

    pub fn contains_key(&self, key: &ObjectKey) -> bool {
        self.objects.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &ObjectKey> {
        self.objects.keys()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, ObjectKey, Arc<dyn OwnedObject>> {
        self.objects.iter()
    }

    /// Entries whose object is a `K`
    pub fn typed<K: Any>(&self) -> impl Iterator<Item = (&ObjectKey, &K)> {
        self.objects
            .iter()
            .filter_map(|(key, obj)| obj.downcast_ref::<K>().map(|typed| (key, typed)))
    }

    /// Add every entry of `other`, replacing entries with the same key
    pub fn merge(&mut self, other: OwnedObjectIndex) {
        self.objects.extend(other.objects);
    }

    pub(crate) fn insert(&mut self, key: ObjectKey, object: Arc<dyn OwnedObject>) {
        self.objects.insert(key, object);
    }

    pub(crate) fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&ObjectKey, &dyn OwnedObject) -> bool,
    {
        self.objects.retain(|key, obj| keep(key, obj.as_ref()));
    }
}

impl<'a> IntoIterator for &'a OwnedObjectIndex {
    type Item = (&'a ObjectKey, &'a Arc<dyn OwnedObject>);
    type IntoIter = btree_map::Iter<'a, ObjectKey, Arc<dyn OwnedObject>>;

    fn into_iter(self) -> Self::IntoIter {
        self.objects.iter()
    }
}

/// List every kind in `kinds` under `scope` and `selector` and index the results.
pub async fn build_index(
    store: &dyn ObjectStore,
    registry: &TypeRegistry,
    scope: &ListScope,
    selector: &LabelSelector,
    kinds: &[&dyn OwnedKind],
) -> Result<OwnedObjectIndex, ControllerError> {
    let mut index = OwnedObjectIndex::new();

    for owned_kind in kinds {
        let resource = owned_kind.api_resource();
        let items = store.list(&resource, scope, selector).await.map_err(|e| {
            error!("Failed to list {} in {} (selector: '{}'): {}", resource.kind, scope, selector, e);
            ControllerError::Store(e)
        })?;
        debug!("Listed {} {} object(s) in {}", items.len(), resource.kind, scope);

        for item in items {
            let object = owned_kind.decode(item)?;
            let key = registry.resolve(&*object)?;
            index.insert(key, object);
        }
    }

    Ok(index)
}

/// Index the objects of `kinds` in `namespace` matching `selector`
pub async fn owning_namespaced_objects(
    store: &dyn ObjectStore,
    registry: &TypeRegistry,
    namespace: &str,
    selector: &LabelSelector,
    kinds: &[&dyn OwnedKind],
) -> Result<OwnedObjectIndex, ControllerError> {
    build_index(store, registry, &ListScope::namespace(namespace), selector, kinds).await
}

/// Index the objects of `kinds` cluster-wide matching `selector`
pub async fn owning_cluster_objects(
    store: &dyn ObjectStore,
    registry: &TypeRegistry,
    selector: &LabelSelector,
    kinds: &[&dyn OwnedKind],
) -> Result<OwnedObjectIndex, ControllerError> {
    build_index(store, registry, &ListScope::Cluster, selector, kinds).await
}

/// Selector matching everything `cluster` owns
pub fn app_instance_selector(cluster: &DataCluster) -> LabelSelector {
    LabelSelector::new().with(APP_INSTANCE_LABEL, cluster.name_any())
}

/// True if `meta` has a controlling owner reference of `kind`
pub fn is_controlled_by_kind(meta: &ObjectMeta, kind: &str) -> bool {
    meta.owner_references
        .iter()
        .flatten()
        .any(|owner| owner.controller == Some(true) && owner.kind == kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crds::DataClusterSpec;
    use k8s_openapi::api::core::v1::{ConfigMap, Secret, Service};
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
    use kube_store::MockObjectStore;

    fn labels(instance: &str) -> Option<BTreeMap<String, String>> {
        Some(BTreeMap::from([(
            APP_INSTANCE_LABEL.to_string(),
            instance.to_string(),
        )]))
    }

    fn config_map(name: &str, instance: &str) -> ConfigMap {
        ConfigMap {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some("databases".to_string()),
                labels: labels(instance),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn secret(name: &str, instance: &str) -> Secret {
        Secret {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some("databases".to_string()),
                labels: labels(instance),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn pg_main_store() -> MockObjectStore {
        let store = MockObjectStore::new();
        store.add(&config_map("pg-main-config", "pg-main"));
        store.add(&config_map("pg-main-scripts", "pg-main"));
        store.add(&config_map("pg-main-env", "pg-main"));
        // Same name as a ConfigMap above
        store.add(&secret("pg-main-config", "pg-main"));
        store.add(&secret("pg-main-account-root", "pg-main"));
        // Belongs to another cluster
        store.add(&config_map("pg-other-config", "pg-other"));
        store
    }

    fn registry() -> TypeRegistry {
        TypeRegistry::new().with::<ConfigMap>().with::<Secret>()
    }

    fn selector() -> LabelSelector {
        LabelSelector::new().with(APP_INSTANCE_LABEL, "pg-main")
    }

    #[tokio::test]
    async fn test_build_index_counts_every_kind() {
        let store = pg_main_store();
        let index = owning_namespaced_objects(
            &store,
            &registry(),
            "databases",
            &selector(),
            &[&kind::<ConfigMap>(), &kind::<Secret>()],
        )
        .await
        .unwrap();

        assert_eq!(index.len(), 5);
        assert_eq!(index.typed::<ConfigMap>().count(), 3);
        assert_eq!(index.typed::<Secret>().count(), 2);

        let names: Vec<_> = index.typed::<Secret>().map(|(key, _)| key.name.as_str()).collect();
        assert!(names.contains(&"pg-main-config"));
    }

    #[tokio::test]
    async fn test_rebuild_yields_identical_index() {
        let store = pg_main_store();
        let registry = registry();
        let secrets = kind::<Secret>();
        let config_maps = kind::<ConfigMap>();
        let kinds: [&dyn OwnedKind; 2] = [&secrets, &config_maps];

        let first = build_index(&store, &registry, &ListScope::namespace("databases"), &selector(), &kinds)
            .await
            .unwrap();
        let reversed: [&dyn OwnedKind; 2] = [kinds[1], kinds[0]];
        let second = build_index(&store, &registry, &ListScope::namespace("databases"), &selector(), &reversed)
            .await
            .unwrap();

        assert!(first.keys().eq(second.keys()));
        for (key, obj) in &first {
            let other = second.get(key).unwrap();
            assert_eq!(obj.meta(), other.meta());
        }
    }

    #[tokio::test]
    async fn test_list_failure_aborts_build() {
        let store = pg_main_store();
        store.fail_lists_of("Secret", "connection refused");

        let result = owning_namespaced_objects(
            &store,
            &registry(),
            "databases",
            &selector(),
            &[&kind::<ConfigMap>(), &kind::<Secret>(), &kind::<Service>()],
        )
        .await;

        assert!(matches!(result, Err(ControllerError::Store(_))));
        // Nothing after the failing kind is listed
        assert_eq!(store.list_calls(), vec!["ConfigMap", "Secret"]);
    }

    #[tokio::test]
    async fn test_unregistered_kind_aborts_build() {
        let store = pg_main_store();
        let registry = TypeRegistry::new().with::<ConfigMap>();

        let result = owning_namespaced_objects(
            &store,
            &registry,
            "databases",
            &selector(),
            &[&kind::<ConfigMap>(), &kind::<Secret>()],
        )
        .await;

        assert!(matches!(result, Err(ControllerError::UnregisteredKind(_))));
    }

    #[tokio::test]
    async fn test_cluster_scope_spans_namespaces() {
        let store = pg_main_store();
        let mut elsewhere = config_map("pg-main-config", "pg-main");
        elsewhere.metadata.namespace = Some("staging".to_string());
        store.add(&elsewhere);

        let index = owning_cluster_objects(&store, &registry(), &selector(), &[&kind::<ConfigMap>()])
            .await
            .unwrap();

        assert_eq!(index.len(), 4);
    }

    #[tokio::test]
    async fn test_merge_replaces_same_key() {
        let store = pg_main_store();
        let registry = registry();
        let mut index = owning_namespaced_objects(&store, &registry, "databases", &selector(), &[&kind::<ConfigMap>()])
            .await
            .unwrap();
        let secrets = owning_namespaced_objects(&store, &registry, "databases", &selector(), &[&kind::<Secret>()])
            .await
            .unwrap();

        index.merge(secrets.clone());
        assert_eq!(index.len(), 5);
        index.merge(secrets);
        assert_eq!(index.len(), 5);
    }

    #[test]
    fn test_app_instance_selector() {
        let cluster = DataCluster::new("pg-main", DataClusterSpec::default());
        assert_eq!(app_instance_selector(&cluster).to_string(), "app.kubernetes.io/instance=pg-main");
    }

    #[test]
    fn test_is_controlled_by_kind() {
        let owner = |kind: &str, controller: Option<bool>| OwnerReference {
            api_version: "apps.dcops.microscaler.io/v1alpha1".to_string(),
            kind: kind.to_string(),
            name: "pg-main-postgresql".to_string(),
            uid: "uid-1".to_string(),
            controller,
            ..Default::default()
        };

        let mut meta = ObjectMeta {
            owner_references: Some(vec![owner(INSTANCE_SET_KIND, None), owner(COMPONENT_KIND, Some(true))]),
            ..Default::default()
        };
        assert!(is_controlled_by_kind(&meta, COMPONENT_KIND));
        assert!(!is_controlled_by_kind(&meta, INSTANCE_SET_KIND));

        meta.owner_references = None;
        assert!(!is_controlled_by_kind(&meta, COMPONENT_KIND));
    }
}
