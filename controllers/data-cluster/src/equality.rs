//! Spec comparison that treats equivalent quantities as equal
//!
//! The API server normalizes quantities it stores ("1000m" comes back as
//! "1"), so comparing a desired spec with an observed one field by field
//! would report spurious drift. Resource lists are compared by value;
//! everything else in a volume claim template is compared exactly.

use crate::quantity::quantities_equal;
use crds::ClusterVolumeClaimTemplate;
use k8s_openapi::api::core::v1::{ResourceRequirements, VolumeResourceRequirements};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use std::collections::BTreeMap;

/// Equal iff both lists have the same resource names with equal quantities.
///
/// `None` is the same as an empty list.
pub fn resource_list_equal(
    a: Option<&BTreeMap<String, Quantity>>,
    b: Option<&BTreeMap<String, Quantity>>,
) -> bool {
    let empty = BTreeMap::new();
    let a = a.unwrap_or(&empty);
    let b = b.unwrap_or(&empty);

    a.len() == b.len()
        && a.iter()
            .all(|(name, qa)| b.get(name).is_some_and(|qb| quantities_equal(qa, qb)))
}

/// Compares requests and limits only. `None` is the same as no requirements.
pub fn resource_requirements_equal(
    a: Option<&ResourceRequirements>,
    b: Option<&ResourceRequirements>,
) -> bool {
    fn requests(r: Option<&ResourceRequirements>) -> Option<&BTreeMap<String, Quantity>> {
        r.and_then(|r| r.requests.as_ref())
    }
    fn limits(r: Option<&ResourceRequirements>) -> Option<&BTreeMap<String, Quantity>> {
        r.and_then(|r| r.limits.as_ref())
    }

    resource_list_equal(requests(a), requests(b)) && resource_list_equal(limits(a), limits(b))
}

/// Compares requests and limits only
pub fn volume_resource_requirements_equal(
    a: &VolumeResourceRequirements,
    b: &VolumeResourceRequirements,
) -> bool {
    resource_list_equal(a.requests.as_ref(), b.requests.as_ref())
        && resource_list_equal(a.limits.as_ref(), b.limits.as_ref())
}

/// Position-by-position template comparison; order matters.
///
/// Storage resources are compared by value, the rest of each template exactly.
pub fn volume_claim_templates_equal(
    a: &[ClusterVolumeClaimTemplate],
    b: &[ClusterVolumeClaimTemplate],
) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(ta, tb)| template_equal(ta, tb))
}

fn template_equal(a: &ClusterVolumeClaimTemplate, b: &ClusterVolumeClaimTemplate) -> bool {
    if !volume_resource_requirements_equal(&a.spec.resources, &b.spec.resources) {
        return false;
    }

    let mut a = a.clone();
    let mut b = b.clone();
    a.spec.resources = VolumeResourceRequirements::default();
    b.spec.resources = VolumeResourceRequirements::default();
    a == b
}
