//! 变量解析引擎
//!
//! `VariableHelper` 绑定到树中的某个节点，每次查询都重新遍历当前的树结构，
//! 不缓存任何解析结果。除两个配置开关外没有其他状态，可在多个线程间共享。
//!
//! - 单值查询与存在性查询：先祖先、后下行，第一个能解析的解析器胜出
//! - 集合查询与前缀匹配：`aggregate_collections` 为真时合并所有能解析的解析器结果
//! - `key_set`：始终合并所有结果

use std::collections::HashSet;
use std::hash::Hash;
use std::sync::Arc;

use super::substitute;
use super::walk::ResolverWalk;
use crate::config::ResolutionConfig;
use crate::core::node::Node;
use crate::core::Value;
use crate::resolver::{namespace_of, Resolver};

#[derive(Debug, Clone)]
pub struct VariableHelper {
    context: Arc<Node>,
    walk_down: bool,
    aggregate_collections: bool,
}

impl VariableHelper {
    /// 创建绑定到 `context` 的解析引擎，默认不下行、不聚合
    pub fn new(context: Arc<Node>) -> Self {
        Self {
            context,
            walk_down: false,
            aggregate_collections: false,
        }
    }

    pub fn from_config(context: Arc<Node>, config: &ResolutionConfig) -> Self {
        Self::new(context)
            .with_walk_down(config.walk_down)
            .with_aggregate_collections(config.aggregate_collections)
    }

    /// 祖先阶段失败后是否从根节点下行遍历整棵树
    pub fn with_walk_down(mut self, walk_down: bool) -> Self {
        self.walk_down = walk_down;
        self
    }

    /// 集合查询是否合并所有能解析的解析器的结果
    pub fn with_aggregate_collections(mut self, aggregate_collections: bool) -> Self {
        self.aggregate_collections = aggregate_collections;
        self
    }

    pub fn context(&self) -> &Arc<Node> {
        &self.context
    }

    pub fn walk_down(&self) -> bool {
        self.walk_down
    }

    pub fn aggregate_collections(&self) -> bool {
        self.aggregate_collections
    }

    /// 从绑定节点出发，按遍历顺序产出满足 `capable` 的解析器
    pub fn walk<F>(&self, capable: F) -> ResolverWalk<F>
    where
        F: FnMut(&dyn Resolver) -> bool,
    {
        ResolverWalk::new(self.context.clone(), self.walk_down, capable)
    }

    fn key_walk<'a>(
        &self,
        key: &'a str,
    ) -> ResolverWalk<impl FnMut(&dyn Resolver) -> bool + 'a> {
        let namespace = namespace_of(key);
        self.walk(move |resolver| resolver.resolves_namespace(namespace) && resolver.resolves(key))
    }

    /// 解析单个值，找不到时返回 `default`
    pub fn resolve(&self, key: &str, default: Value) -> Value {
        match self.key_walk(key).next() {
            Some(resolver) => resolver.resolve(key, default),
            None => {
                log::trace!("变量未解析: {} (节点 {})", key, self.context.id());
                default
            }
        }
    }

    pub fn resolves(&self, key: &str) -> bool {
        self.key_walk(key).next().is_some()
    }

    /// 解析全部值，找不到时返回只包含 `default` 的集合
    pub fn resolve_collection(&self, key: &str, default: Value) -> Vec<Value> {
        if !self.aggregate_collections {
            return match self.key_walk(key).next() {
                Some(resolver) => resolver.resolve_collection(key, default),
                None => vec![default],
            };
        }

        let values = union(
            self.key_walk(key)
                .map(|resolver| resolver.resolve_collection(key, Value::Null)),
        );
        if values.is_empty() {
            vec![default]
        } else {
            values
        }
    }

    /// 字符串形式以 `partial_value` 开头的值，找不到时返回空集合
    pub fn matches(&self, key: &str, partial_value: &str) -> Vec<Value> {
        if !self.aggregate_collections {
            return self
                .key_walk(key)
                .next()
                .map(|resolver| resolver.matches(key, partial_value))
                .unwrap_or_default();
        }
        union(
            self.key_walk(key)
                .map(|resolver| resolver.matches(key, partial_value)),
        )
    }

    /// 所有可达解析器能回答的键，忽略 `aggregate_collections`，始终完整合并
    pub fn key_set(&self, namespace: Option<&str>) -> Vec<String> {
        union(
            self.walk(|resolver| resolver.resolves_namespace(namespace))
                .map(|resolver| resolver.key_set(namespace)),
        )
    }

    /// 第一个声明能解析 `namespace` 的解析器
    pub fn resolver_for_namespace(&self, namespace: Option<&str>) -> Option<Arc<dyn Resolver>> {
        self.walk(|resolver| resolver.resolves_namespace(namespace))
            .next()
    }

    /// 替换 `text` 中的 `${name}` 占位符，见 [`substitute::substitute`]
    pub fn substitute(&self, text: &str) -> String {
        substitute::substitute(text, self)
    }
}

/// 按首次出现顺序合并并去重
fn union<T, I>(batches: I) -> Vec<T>
where
    T: Clone + Eq + Hash,
    I: IntoIterator<Item = Vec<T>>,
{
    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    for batch in batches {
        for item in batch {
            if seen.insert(item.clone()) {
                merged.push(item);
            }
        }
    }
    merged
}
