//! List scoping: namespace vs. cluster-wide, and equality-based label selectors.

use std::collections::BTreeMap;
use std::fmt;

/// Where a List call looks for objects
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListScope {
    /// Only objects in the given namespace
    Namespace(String),
    /// Objects in all namespaces, and cluster-scoped objects
    Cluster,
}

impl ListScope {
    /// Scope a list to one namespace
    pub fn namespace(namespace: impl Into<String>) -> Self {
        ListScope::Namespace(namespace.into())
    }
}

impl fmt::Display for ListScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ListScope::Namespace(ns) => write!(f, "namespace {}", ns),
            ListScope::Cluster => write!(f, "all namespaces"),
        }
    }
}

/// Equality-based label selector (`key1=value1,key2=value2`)
///
/// An empty selector matches every object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSelector {
    match_labels: BTreeMap<String, String>,
}

impl LabelSelector {
    /// Create an empty selector
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a `key=value` requirement
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.match_labels.insert(key.into(), value.into());
        self
    }

    /// Whether the selector has no requirements
    pub fn is_empty(&self) -> bool {
        self.match_labels.is_empty()
    }

    /// Check a label set against every requirement
    pub fn matches(&self, labels: Option<&BTreeMap<String, String>>) -> bool {
        self.match_labels.iter().all(|(key, value)| {
            labels
                .and_then(|labels| labels.get(key))
                .is_some_and(|actual| actual == value)
        })
    }
}

impl fmt::Display for LabelSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (key, value) in &self.match_labels {
            if !first {
                f.write_str(",")?;
            }
            write!(f, "{}={}", key, value)?;
            first = false;
        }
        Ok(())
    }
}

impl From<BTreeMap<String, String>> for LabelSelector {
    fn from(match_labels: BTreeMap<String, String>) -> Self {
        Self { match_labels }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_renders_sorted_requirements() {
        let selector = LabelSelector::new()
            .with("app.kubernetes.io/instance", "pg-main")
            .with("app.kubernetes.io/component", "postgresql");
        assert_eq!(
            selector.to_string(),
            "app.kubernetes.io/component=postgresql,app.kubernetes.io/instance=pg-main"
        );
    }

    #[test]
    fn test_selector_matching() {
        let selector = LabelSelector::new().with("app", "pg");
        let matching = BTreeMap::from([
            ("app".to_string(), "pg".to_string()),
            ("tier".to_string(), "db".to_string()),
        ]);
        let other = BTreeMap::from([("app".to_string(), "redis".to_string())]);

        assert!(selector.matches(Some(&matching)));
        assert!(!selector.matches(Some(&other)));
        assert!(!selector.matches(None));
        assert!(LabelSelector::new().matches(None));
    }
}
