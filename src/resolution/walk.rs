//! Two-phase tree walk yielding capable resolvers.
//!
//! The ancestor phase visits the start node and then every parent up to the
//! root. When `walk_down` is set, the descent phase then visits the whole tree
//! from the root in pre-order, children in stored order. The walk is lazy:
//! first-match queries stop after the first item, aggregating queries drain it.

use std::fmt;
use std::sync::Arc;

use crate::core::node::Node;
use crate::resolver::Resolver;

/// Traversal stage a [`ResolverWalk`] is currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkPhase {
    Ancestors,
    Descent,
    Done,
}

enum Cursor {
    Ancestors(Arc<Node>),
    Descent(Vec<Arc<Node>>),
    Done,
}

pub struct ResolverWalk<F> {
    cursor: Cursor,
    walk_down: bool,
    capable: F,
}

impl<F> ResolverWalk<F> {
    pub fn phase(&self) -> WalkPhase {
        match self.cursor {
            Cursor::Ancestors(_) => WalkPhase::Ancestors,
            Cursor::Descent(_) => WalkPhase::Descent,
            Cursor::Done => WalkPhase::Done,
        }
    }
}

impl<F> ResolverWalk<F>
where
    F: FnMut(&dyn Resolver) -> bool,
{
    pub fn new(start: Arc<Node>, walk_down: bool, capable: F) -> Self {
        Self {
            cursor: Cursor::Ancestors(start),
            walk_down,
            capable,
        }
    }

    fn next_node(&mut self) -> Option<Arc<Node>> {
        match std::mem::replace(&mut self.cursor, Cursor::Done) {
            Cursor::Ancestors(node) => {
                self.cursor = match node.parent() {
                    Some(parent) => Cursor::Ancestors(parent),
                    None if self.walk_down => Cursor::Descent(vec![node.clone()]),
                    None => Cursor::Done,
                };
                Some(node)
            }
            Cursor::Descent(mut stack) => {
                let node = stack.pop()?;
                // reversed so that earlier siblings are popped first
                stack.extend(node.children().into_iter().rev());
                self.cursor = Cursor::Descent(stack);
                Some(node)
            }
            Cursor::Done => None,
        }
    }
}

impl<F> Iterator for ResolverWalk<F>
where
    F: FnMut(&dyn Resolver) -> bool,
{
    type Item = Arc<dyn Resolver>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let node = self.next_node()?;
            if let Some(resolver) = node.as_resolver_provider() {
                if (self.capable)(resolver.as_ref()) {
                    return Some(resolver);
                }
            }
        }
    }
}

impl<F> fmt::Debug for ResolverWalk<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverWalk")
            .field("phase", &self.phase())
            .field("walk_down", &self.walk_down)
            .finish()
    }
}
