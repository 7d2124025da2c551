//! A single named state in the tree.
//!
//! A node knows its ancestor chain (root..self), owns its entry callback and
//! its emitter, and turns into a container the first time it is asked to
//! define or look up children. Promotion is plain composition: the node
//! holds an optional owned [`Graph`] that is created at most once.

use super::error::GraphError;
use super::graph::{Graph, GraphCore, Target};
use super::request::Request;
use crate::config::Config;
use crate::emitter::{signal, Callback, Emitter};
use serde::Serialize;
use std::cell::OnceCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::{Rc, Weak};
use uuid::Uuid;

/// Stable identity of a node, unique across all trees.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(Uuid);

impl NodeId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

pub(crate) struct NodeCore<A> {
    id: NodeId,
    name: String,
    qualified: String,
    depth: usize,
    parent: Option<Weak<NodeCore<A>>>,
    owner: Weak<GraphCore<A>>,
    config: Rc<Config<A>>,
    entry: Callback<A>,
    emitter: Box<dyn Emitter<A>>,
    subgraph: OnceCell<Graph<A>>,
}

/// Handle to a state.
///
/// Handles are cheap to clone and compare equal only when they refer to
/// the same state. Ancestors are referenced weakly. The chain is fixed when
/// the state is defined; once an ancestor is dropped, anything that needs
/// the whole chain ([`path`](Node::path), [`jump`](Node::jump), `go` and
/// [`emit`](Node::emit)) reports [`GraphError::Detached`] instead of acting
/// on part of it.
pub struct Node<A> {
    core: Rc<NodeCore<A>>,
}

impl<A: 'static> Node<A> {
    pub(crate) fn new(
        name: String,
        entry: Callback<A>,
        owner: &Graph<A>,
        parent: Option<&Node<A>>,
    ) -> Self {
        let config = owner.config();
        let (qualified, depth) = match parent {
            Some(parent) => (
                format!("{}.{}", parent.core.qualified, name),
                parent.core.depth + 1,
            ),
            None => (name.clone(), 1),
        };
        Self {
            core: Rc::new(NodeCore {
                id: NodeId::new(),
                name,
                qualified,
                depth,
                parent: parent.map(Node::downgrade),
                owner: owner.downgrade(),
                emitter: config.new_emitter(),
                config,
                entry,
                subgraph: OnceCell::new(),
            }),
        }
    }

    pub(crate) fn from_core(core: Rc<NodeCore<A>>) -> Self {
        Self { core }
    }

    pub(crate) fn downgrade(&self) -> Weak<NodeCore<A>> {
        Rc::downgrade(&self.core)
    }

    fn detached(&self) -> GraphError {
        GraphError::Detached {
            name: self.core.qualified.clone(),
        }
    }

    pub fn id(&self) -> NodeId {
        self.core.id
    }

    pub fn name(&self) -> &str {
        &self.core.name
    }

    /// Ancestor chain from the top-level state down to this one, inclusive.
    ///
    /// Fails with [`GraphError::Detached`] if any ancestor has been dropped;
    /// a shortened chain is never returned.
    pub fn path(&self) -> Result<Vec<Node<A>>, GraphError> {
        let mut chain = Vec::with_capacity(self.core.depth);
        chain.push(self.clone());
        let mut cursor = self.core.parent.clone();
        while let Some(parent) = cursor {
            let node = parent
                .upgrade()
                .map(Node::from_core)
                .ok_or_else(|| self.detached())?;
            cursor = node.core.parent.clone();
            chain.push(node);
        }
        chain.reverse();
        Ok(chain)
    }

    /// Number of states in the ancestor chain, this one included.
    pub fn depth(&self) -> usize {
        self.core.depth
    }

    /// Dot-joined names of the ancestor chain, e.g. `a.1`.
    pub fn qualified_name(&self) -> String {
        self.core.qualified.clone()
    }

    pub fn parent(&self) -> Option<Node<A>> {
        self.core
            .parent
            .as_ref()
            .and_then(Weak::upgrade)
            .map(Node::from_core)
    }

    /// The graph level this state belongs to.
    pub fn graph(&self) -> Option<Graph<A>> {
        self.core.owner.upgrade().map(Graph::from_core)
    }

    pub fn is_promoted(&self) -> bool {
        self.core.subgraph.get().is_some()
    }

    /// The nested graph, if this state was ever asked to hold children.
    pub fn subgraph(&self) -> Option<Graph<A>> {
        self.core.subgraph.get().cloned()
    }

    pub(crate) fn promote(&self) -> Graph<A> {
        self.core
            .subgraph
            .get_or_init(|| {
                tracing::debug!(state = %self.qualified_name(), "promoting state to sub-graph");
                Graph::nested(Rc::clone(&self.core.config), self)
            })
            .clone()
    }

    /// Define or look up children of this state.
    ///
    /// Any request other than [`Request::Current`] promotes the state first.
    /// Querying the active child of an unpromoted state answers `None`.
    pub fn state(&self, request: Request<A>) -> Result<Option<Node<A>>, GraphError> {
        match request {
            Request::Current => Ok(self.current()),
            request => self.promote().state(request),
        }
    }

    /// Active child of this state, if any.
    pub fn current(&self) -> Option<Node<A>> {
        self.subgraph().and_then(|graph| graph.current())
    }

    /// Child with the given name, without promoting.
    pub fn child(&self, name: &str) -> Option<Node<A>> {
        self.subgraph().and_then(|graph| graph.get(name))
    }

    pub fn define<F>(&self, name: impl Into<String>, entry: F) -> Result<Node<A>, GraphError>
    where
        F: Fn(&[Node<A>], &[A]) + 'static,
    {
        self.promote().define(name, entry)
    }

    /// Transition between children of this state.
    pub fn go<'t>(
        &self,
        target: impl Into<Target<'t, A>>,
        args: Vec<A>,
    ) -> Result<Node<A>, GraphError> {
        let target = target.into();
        match self.subgraph() {
            Some(graph) => graph.go(target, args),
            None => Err(GraphError::NotFound {
                name: target.name().to_string(),
                scope: self.qualified_name(),
            }),
        }
    }

    /// Leave this state if it is the active child of its level.
    ///
    /// Active descendants leave first. Ending a state that is not active
    /// does nothing.
    pub fn end(&self) {
        if let Some(graph) = self.graph() {
            if graph.is_active(self) {
                graph.end();
            }
        }
    }

    /// Activate this state and every ancestor in one call.
    ///
    /// Each level along the chain is realigned with `go`; levels that are
    /// already aligned are left alone. Only the final hop receives `args`.
    ///
    /// ```rust
    /// use stategraph::Graph;
    ///
    /// let graph = Graph::<u8>::new();
    /// graph.define("app", |_, _| {}).unwrap();
    /// let settings = graph.define_at(["app"], "settings", |_, _| {}).unwrap();
    ///
    /// settings.jump(vec![7]).unwrap();
    ///
    /// let active: Vec<_> = graph.active_path().iter().map(|n| n.name().to_string()).collect();
    /// assert_eq!(active, ["app", "settings"]);
    /// ```
    pub fn jump(&self, args: Vec<A>) -> Result<Node<A>, GraphError> {
        let chain = self.path()?;
        let (target, ancestors) = chain.split_last().ok_or_else(|| self.detached())?;
        let mut level = chain
            .first()
            .and_then(Node::graph)
            .ok_or_else(|| self.detached())?;

        tracing::debug!(state = %self.qualified_name(), "jumping to state");
        for ancestor in ancestors {
            if !level.is_active(ancestor) {
                level.go(ancestor, Vec::new())?;
            }
            level = ancestor.promote();
        }
        level.go(target, args)
    }

    /// Subscribe to a signal of this state, e.g. [`signal::LEAVE`].
    pub fn on<F>(&self, signal: &str, listener: F) -> &Self
    where
        F: Fn(&[Node<A>], &[A]) + 'static,
    {
        self.core.emitter.subscribe(signal, Rc::new(listener));
        self
    }

    /// Emit a signal with this state's chain and the given arguments.
    pub fn emit(&self, signal: &str, args: &[A]) -> Result<(), GraphError> {
        let chain = self.path()?;
        tracing::trace!(state = %self.name(), signal, "emitting");
        self.core.emitter.emit(signal, &chain, args);
        Ok(())
    }

    pub fn listener_count(&self, signal: &str) -> usize {
        self.core.emitter.listener_count(signal)
    }

    /// Active descendants below this state, outermost first.
    pub fn active_path(&self) -> Vec<Node<A>> {
        self.subgraph()
            .map(|graph| graph.active_path())
            .unwrap_or_default()
    }

    /// Emit `enter`, then run the entry callback. `chain` is this state's
    /// path, resolved by the caller before anything left.
    pub(crate) fn enter(&self, chain: &[Node<A>], args: &[A]) {
        tracing::trace!(state = %self.name(), signal = signal::ENTER, "emitting");
        self.core.emitter.emit(signal::ENTER, chain, args);
        (self.core.entry)(chain, args);
    }

    pub(crate) fn leave(&self) {
        if let Some(graph) = self.subgraph() {
            graph.end();
        }
        if let Err(err) = self.emit(signal::LEAVE, &[]) {
            tracing::warn!(error = %err, "leave signal dropped");
        }
    }
}

impl<A> Clone for Node<A> {
    fn clone(&self) -> Self {
        Self {
            core: Rc::clone(&self.core),
        }
    }
}

impl<A> PartialEq for Node<A> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.core, &other.core)
    }
}

impl<A> Eq for Node<A> {}

impl<A> Hash for Node<A> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.core.id.hash(state);
    }
}

impl<A: 'static> fmt::Debug for Node<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("path", &self.qualified_name())
            .field("promoted", &self.is_promoted())
            .finish()
    }
}
