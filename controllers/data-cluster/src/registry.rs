//! Object keys and the type registry that resolves them
//!
//! A typed resource does not carry its group/version/kind at runtime once it
//! has been decoded, so the registry maps each concrete Rust type to the GVK
//! recorded from its static `kube::Resource` descriptor. Registries are built
//! explicitly by the controller at startup and passed to whoever needs them.

use crate::error::ControllerError;
use kube::Resource;
use kube::api::ObjectMeta;
use kube::core::{DynamicObject, GroupVersionKind};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

/// Identity of an object: its type plus namespace and name.
///
/// Two different kinds with the same namespace/name never collide.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectKey {
    pub group: String,
    pub version: String,
    pub kind: String,
    /// Empty for cluster-scoped objects
    pub namespace: String,
    pub name: String,
}

impl ObjectKey {
    fn new(gvk: &GroupVersionKind, meta: &ObjectMeta) -> Self {
        Self {
            group: gvk.group.clone(),
            version: gvk.version.clone(),
            kind: gvk.kind.clone(),
            namespace: meta.namespace.clone().unwrap_or_default(),
            name: meta.name.clone().unwrap_or_default(),
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group.is_empty() {
            write!(f, "{}/{}", self.version, self.kind)?;
        } else {
            write!(f, "{}/{}/{}", self.group, self.version, self.kind)?;
        }
        if self.namespace.is_empty() {
            write!(f, " {}", self.name)
        } else {
            write!(f, " {}/{}", self.namespace, self.name)
        }
    }
}

/// A decoded Kubernetes object of any kind.
///
/// Implemented for every `kube::Resource`; lets indexes hold mixed kinds.
pub trait OwnedObject: Any + Send + Sync + fmt::Debug {
    fn meta(&self) -> &ObjectMeta;
    fn as_any(&self) -> &dyn Any;
    fn type_name(&self) -> &'static str;
}

impl<K> OwnedObject for K
where
    K: Resource + Any + Send + Sync + fmt::Debug,
{
    fn meta(&self) -> &ObjectMeta {
        Resource::meta(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<K>()
    }
}

impl dyn OwnedObject {
    /// The object as its concrete type, if it is a `K`
    pub fn downcast_ref<K: Any>(&self) -> Option<&K> {
        self.as_any().downcast_ref::<K>()
    }
}

/// Registry of concrete resource types and their group/version/kind
#[derive(Debug, Default, Clone)]
pub struct TypeRegistry {
    kinds: HashMap<TypeId, GroupVersionKind>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `K`'s group/version/kind
    pub fn register<K>(&mut self) -> &mut Self
    where
        K: Resource<DynamicType = ()> + Any,
    {
        let gvk = GroupVersionKind::gvk(&K::group(&()), &K::version(&()), &K::kind(&()));
        self.kinds.insert(TypeId::of::<K>(), gvk);
        self
    }

    /// Builder form of [`register`](Self::register)
    #[must_use]
    pub fn with<K>(mut self) -> Self
    where
        K: Resource<DynamicType = ()> + Any,
    {
        self.register::<K>();
        self
    }

    /// Resolve the key of `object`.
    ///
    /// Fails with `UnregisteredKind` when the concrete type was never
    /// registered. Unstructured objects resolve from their own type meta.
    pub fn resolve(&self, object: &dyn OwnedObject) -> Result<ObjectKey, ControllerError> {
        let any = object.as_any();

        if let Some(gvk) = self.kinds.get(&Any::type_id(any)) {
            return Ok(ObjectKey::new(gvk, object.meta()));
        }

        if let Some(dynamic) = any.downcast_ref::<DynamicObject>() {
            if let Some(types) = &dynamic.types {
                let (group, version) = match types.api_version.rsplit_once('/') {
                    Some((group, version)) => (group, version),
                    None => ("", types.api_version.as_str()),
                };
                let gvk = GroupVersionKind::gvk(group, version, &types.kind);
                return Ok(ObjectKey::new(&gvk, object.meta()));
            }
        }

        Err(ControllerError::UnregisteredKind(object.type_name().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crds::{Backup, BackupSpec};
    use k8s_openapi::api::core::v1::{ConfigMap, Secret};
    use kube::core::TypeMeta;

    fn meta(name: &str, namespace: &str) -> ObjectMeta {
        ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_resolve_registered_core_kind() {
        let registry = TypeRegistry::new().with::<ConfigMap>();
        let cm = ConfigMap {
            metadata: meta("pg-main-config", "databases"),
            ..Default::default()
        };

        let key = registry.resolve(&cm).unwrap();
        assert_eq!(key.group, "");
        assert_eq!(key.version, "v1");
        assert_eq!(key.kind, "ConfigMap");
        assert_eq!(key.namespace, "databases");
        assert_eq!(key.name, "pg-main-config");
        assert_eq!(key.to_string(), "v1/ConfigMap databases/pg-main-config");
    }

    #[test]
    fn test_resolve_custom_resource() {
        let registry = TypeRegistry::new().with::<Backup>();
        let mut backup = Backup::new(
            "pg-main-20260101",
            BackupSpec {
                backup_policy_name: "pg-policy".to_string(),
                backup_method: "pg-basebackup".to_string(),
                retention_period: None,
            },
        );
        backup.metadata.namespace = Some("databases".to_string());

        let key = registry.resolve(&backup).unwrap();
        assert_eq!(key.group, "dataprotection.dcops.microscaler.io");
        assert_eq!(key.version, "v1alpha1");
        assert_eq!(key.kind, "Backup");
    }

    #[test]
    fn test_same_name_different_kind_distinct_keys() {
        let registry = TypeRegistry::new().with::<ConfigMap>().with::<Secret>();
        let cm = ConfigMap {
            metadata: meta("pg-main", "databases"),
            ..Default::default()
        };
        let secret = Secret {
            metadata: meta("pg-main", "databases"),
            ..Default::default()
        };

        assert_ne!(registry.resolve(&cm).unwrap(), registry.resolve(&secret).unwrap());
    }

    #[test]
    fn test_unregistered_kind_fails() {
        let registry = TypeRegistry::new().with::<ConfigMap>();
        let secret = Secret {
            metadata: meta("pg-main", "databases"),
            ..Default::default()
        };

        match registry.resolve(&secret) {
            Err(ControllerError::UnregisteredKind(name)) => assert!(name.ends_with("Secret")),
            other => panic!("expected UnregisteredKind, got {:?}", other),
        }
    }

    #[test]
    fn test_dynamic_object_resolves_from_type_meta() {
        let registry = TypeRegistry::new();
        let mut obj = DynamicObject {
            types: Some(TypeMeta {
                api_version: "apps/v1".to_string(),
                kind: "StatefulSet".to_string(),
            }),
            metadata: meta("pg-main-postgresql", "databases"),
            data: serde_json::Value::Null,
        };

        let key = registry.resolve(&obj).unwrap();
        assert_eq!(key.group, "apps");
        assert_eq!(key.version, "v1");
        assert_eq!(key.kind, "StatefulSet");

        obj.types = None;
        assert!(matches!(
            registry.resolve(&obj),
            Err(ControllerError::UnregisteredKind(_))
        ));
    }

    #[test]
    fn test_downcast_owned_object() {
        let cm = ConfigMap {
            metadata: meta("pg-main-config", "databases"),
            ..Default::default()
        };
        let obj: &dyn OwnedObject = &cm;

        assert!(obj.downcast_ref::<ConfigMap>().is_some());
        assert!(obj.downcast_ref::<Secret>().is_none());
    }
}
