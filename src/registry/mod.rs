//! 解析器注册表
//!
//! 与解析引擎相互独立：解析引擎遍历活动的树查找解析器，注册表则是一个
//! 通过 `register` / `deregister` 显式维护的索引，按树根ID把解析器集合
//! 关联到整棵树上，供需要枚举可用变量的调用方使用。

mod rename;
mod resolver_registry;

pub use rename::RenameListener;
pub use resolver_registry::ResolverRegistry;
