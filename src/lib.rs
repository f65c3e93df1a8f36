//! TreeVars - hierarchical variable resolution over observable node trees
//!
//! Nodes form a tree and may expose a variable resolver. A [`VariableHelper`]
//! bound to any node resolves namespaced keys such as `report::title` by
//! walking the live tree, and substitutes `${...}` placeholders in text. The
//! [`ResolverRegistry`] is a separate, explicitly populated index that
//! associates resolvers with whole trees keyed by root identity.

pub mod config;
pub mod core;
pub mod registry;
pub mod resolution;
pub mod resolver;
pub mod utils;

pub use crate::core::{Node, NodeId, NodeKind, Value};
pub use registry::ResolverRegistry;
pub use resolution::VariableHelper;
pub use resolver::{Resolver, SimpleResolver};
