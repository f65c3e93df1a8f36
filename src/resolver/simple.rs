use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;

use super::{namespace_of, qualify, strip_namespace, Resolver};
use crate::core::Value;

/// A resolver backed by a multi-map from bare key to a bag of values.
///
/// Keys passed in may carry a namespace prefix; it is stripped before
/// storage and lookup.
pub struct SimpleResolver {
    namespace: Option<String>,
    user_friendly_name: String,
    variables: RwLock<HashMap<String, Vec<Value>>>,
}

impl SimpleResolver {
    pub fn new(namespace: Option<&str>, user_friendly_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.map(str::to_string),
            user_friendly_name: user_friendly_name.into(),
            variables: RwLock::new(HashMap::new()),
        }
    }

    /// Appends `value` to the values stored under `key`.
    pub fn store(&self, key: &str, value: impl Into<Value>) {
        self.variables
            .write()
            .entry(strip_namespace(key).to_string())
            .or_default()
            .push(value.into());
    }

    /// Replaces every value stored under `key` with `value`.
    pub fn update(&self, key: &str, value: impl Into<Value>) {
        self.variables
            .write()
            .insert(strip_namespace(key).to_string(), vec![value.into()]);
    }

    pub fn remove(&self, key: &str) -> bool {
        self.variables.write().remove(strip_namespace(key)).is_some()
    }

    pub fn clear(&self) {
        self.variables.write().clear();
    }

    pub fn len(&self) -> usize {
        self.variables.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.read().is_empty()
    }

    fn accepts(&self, key: &str) -> bool {
        self.resolves_namespace(namespace_of(key))
    }

    fn values(&self, key: &str) -> Option<Vec<Value>> {
        if !self.accepts(key) {
            return None;
        }
        self.variables
            .read()
            .get(strip_namespace(key))
            .filter(|values| !values.is_empty())
            .cloned()
    }
}

impl Resolver for SimpleResolver {
    fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    fn user_friendly_name(&self) -> &str {
        &self.user_friendly_name
    }

    fn resolve(&self, key: &str, default: Value) -> Value {
        self.values(key)
            .and_then(|values| values.into_iter().next())
            .unwrap_or(default)
    }

    fn resolve_collection(&self, key: &str, default: Value) -> Vec<Value> {
        self.values(key).unwrap_or_else(|| vec![default])
    }

    fn resolves(&self, key: &str) -> bool {
        self.values(key).is_some()
    }

    fn matches(&self, key: &str, partial_value: &str) -> Vec<Value> {
        self.values(key)
            .unwrap_or_default()
            .into_iter()
            .filter(|value| value.to_string().starts_with(partial_value))
            .collect()
    }

    fn key_set(&self, namespace: Option<&str>) -> Vec<String> {
        if !self.resolves_namespace(namespace) {
            return Vec::new();
        }
        self.variables
            .read()
            .keys()
            .map(|key| qualify(self.namespace(), key))
            .collect()
    }
}

impl fmt::Debug for SimpleResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleResolver")
            .field("namespace", &self.namespace)
            .field("user_friendly_name", &self.user_friendly_name)
            .field("key_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_appends_and_collection_returns_all() {
        let resolver = SimpleResolver::new(Some("ns"), "Test");
        resolver.store("k", "v1");
        resolver.store("ns::k", "v2");

        let mut values = resolver.resolve_collection("ns::k", Value::Null);
        values.sort_by_key(|v| v.to_string());
        assert_eq!(values, vec![Value::from("v1"), Value::from("v2")]);

        let single = resolver.resolve("ns::k", Value::from("default"));
        assert!(single == Value::from("v1") || single == Value::from("v2"));
    }

    #[test]
    fn test_update_replaces_all_values() {
        let resolver = SimpleResolver::new(None, "Test");
        resolver.store("k", "a");
        resolver.store("k", "b");
        resolver.update("k", "c");
        assert_eq!(resolver.resolve_collection("k", Value::Null), vec![Value::from("c")]);
    }

    #[test]
    fn test_namespace_mismatch_returns_default() {
        let resolver = SimpleResolver::new(Some("ns"), "Test");
        resolver.store("k", "v");

        assert_eq!(resolver.resolve("other::k", Value::from("d")), Value::from("d"));
        assert_eq!(resolver.resolve("k", Value::from("d")), Value::from("d"));
        assert!(!resolver.resolves("other::k"));
        assert!(resolver.matches("other::k", "v").is_empty());
    }

    #[test]
    fn test_missing_collection_is_singleton_default_even_when_null() {
        let resolver = SimpleResolver::new(None, "Test");
        assert_eq!(resolver.resolve_collection("nothing", Value::Null), vec![Value::Null]);
    }

    #[test]
    fn test_unscoped_resolver_accepts_any_namespace() {
        let resolver = SimpleResolver::new(None, "Test");
        resolver.store("k", 5i64);
        assert!(resolver.resolves("anything::k"));
        assert!(resolver.resolves("k"));
        assert!(resolver.resolves_namespace(None));
        assert!(resolver.resolves_namespace(Some("x")));
    }

    #[test]
    fn test_namespaced_resolver_rejects_unscoped_namespace() {
        let resolver = SimpleResolver::new(Some("ns"), "Test");
        assert!(!resolver.resolves_namespace(None));
        assert!(resolver.resolves_namespace(Some("ns")));
        assert!(!resolver.resolves_namespace(Some("other")));
    }

    #[test]
    fn test_matches_is_case_sensitive_prefix() {
        let resolver = SimpleResolver::new(None, "Test");
        resolver.store("city", "Berlin");
        resolver.store("city", "Bern");
        resolver.store("city", "boston");

        let mut found = resolver.matches("city", "Ber");
        found.sort_by_key(|v| v.to_string());
        assert_eq!(found, vec![Value::from("Berlin"), Value::from("Bern")]);
        assert!(resolver.matches("city", "ber").is_empty());
    }

    #[test]
    fn test_key_set_is_namespace_qualified() {
        let resolver = SimpleResolver::new(Some("ns"), "Test");
        resolver.store("a", 1i64);
        resolver.store("b", 2i64);

        let mut keys = resolver.key_set(Some("ns"));
        keys.sort();
        assert_eq!(keys, vec!["ns::a", "ns::b"]);
        assert!(resolver.key_set(Some("other")).is_empty());
        assert!(resolver.key_set(None).is_empty());

        let unscoped = SimpleResolver::new(None, "Plain");
        unscoped.store("x", 1i64);
        assert_eq!(unscoped.key_set(Some("whatever")), vec!["x"]);
    }

    #[test]
    fn test_remove_and_clear() {
        let resolver = SimpleResolver::new(None, "Test");
        resolver.store("a", 1i64);
        resolver.store("b", 2i64);
        assert_eq!(resolver.len(), 2);
        assert!(resolver.remove("a"));
        assert!(!resolver.remove("a"));
        resolver.clear();
        assert!(resolver.is_empty());
    }
}
