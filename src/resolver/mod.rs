//! Variable resolvers.
//!
//! A resolver answers `(namespace, key)` queries with values. Keys are written
//! as `<namespace>::<key>` or as a bare `<key>` when unscoped. A resolver whose
//! own namespace is `None` is a wildcard and accepts every namespace.

mod simple;

pub use simple::SimpleResolver;

use crate::core::Value;

/// Separates the namespace from the bare key, e.g. `"report::title"`.
pub const NAMESPACE_DELIMITER: &str = "::";

/// Namespace part of `key`, `None` when the key is unscoped.
pub fn namespace_of(key: &str) -> Option<&str> {
    key.split_once(NAMESPACE_DELIMITER).map(|(namespace, _)| namespace)
}

/// `key` without its namespace prefix.
pub fn strip_namespace(key: &str) -> &str {
    key.split_once(NAMESPACE_DELIMITER)
        .map(|(_, bare)| bare)
        .unwrap_or(key)
}

/// Builds `<namespace>::<key>`, or returns `key` unchanged when unscoped.
pub fn qualify(namespace: Option<&str>, key: &str) -> String {
    match namespace {
        Some(namespace) => format!("{}{}{}", namespace, NAMESPACE_DELIMITER, key),
        None => key.to_string(),
    }
}

/// Capability for mapping namespaced keys to values.
pub trait Resolver: Send + Sync {
    /// The namespace this resolver serves; `None` serves every namespace.
    fn namespace(&self) -> Option<&str>;

    /// Display name shown when listing available variables.
    fn user_friendly_name(&self) -> &str;

    /// True if this resolver is unscoped or its namespace equals `namespace`.
    fn resolves_namespace(&self, namespace: Option<&str>) -> bool {
        match (self.namespace(), namespace) {
            (None, _) => true,
            (Some(own), Some(requested)) => own == requested,
            (Some(_), None) => false,
        }
    }

    /// A single value for `key`, or `default`.
    fn resolve(&self, key: &str, default: Value) -> Value;

    /// All values for `key`, or `[default]` when there are none.
    fn resolve_collection(&self, key: &str, default: Value) -> Vec<Value>;

    fn resolves(&self, key: &str) -> bool;

    /// Values for `key` whose string form starts with `partial_value`.
    fn matches(&self, key: &str, partial_value: &str) -> Vec<Value>;

    /// Every key this resolver answers for, qualified with its own namespace.
    fn key_set(&self, namespace: Option<&str>) -> Vec<String>;
}
