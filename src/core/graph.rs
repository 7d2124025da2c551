//! One level of the state tree.
//!
//! A graph maps names to [`Node`]s and tracks which one is active. The root
//! graph is owned by the host; every promoted node owns the graph holding
//! its children.

use super::error::GraphError;
use super::history::{StateHistory, TransitionRecord};
use super::node::{Node, NodeCore};
use super::request::Request;
use crate::config::{Config, ReentryPolicy, Settings};
use crate::emitter::Callback;
use chrono::Utc;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

const ROOT_SCOPE: &str = "<root>";

pub(crate) struct GraphCore<A> {
    config: Rc<Config<A>>,
    owner: Option<Weak<NodeCore<A>>>,
    scope: String,
    children: RefCell<HashMap<String, Node<A>>>,
    active: RefCell<Option<Node<A>>>,
    history: RefCell<StateHistory>,
}

/// Target of a transition: a child name or a child handle.
pub enum Target<'a, A> {
    Name(&'a str),
    Node(&'a Node<A>),
}

impl<A: 'static> Target<'_, A> {
    pub fn name(&self) -> &str {
        match self {
            Target::Name(name) => name,
            Target::Node(node) => node.name(),
        }
    }
}

impl<A> Clone for Target<'_, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<A> Copy for Target<'_, A> {}

impl<'a, A> From<&'a str> for Target<'a, A> {
    fn from(name: &'a str) -> Self {
        Target::Name(name)
    }
}

impl<'a, A> From<&'a String> for Target<'a, A> {
    fn from(name: &'a String) -> Self {
        Target::Name(name)
    }
}

impl<'a, A> From<&'a Node<A>> for Target<'a, A> {
    fn from(node: &'a Node<A>) -> Self {
        Target::Node(node)
    }
}

/// Handle to a level of the state tree.
///
/// # Example
///
/// ```rust
/// use stategraph::{signal, Graph};
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// let log = Rc::new(RefCell::new(Vec::new()));
/// let graph = Graph::<&str>::new();
///
/// let on_enter = Rc::clone(&log);
/// graph
///     .define("login", move |_, args| on_enter.borrow_mut().push(format!("+login {args:?}")))
///     .unwrap();
/// let on_leave = Rc::clone(&log);
/// graph.get("login").unwrap().on(signal::LEAVE, move |_, _| {
///     on_leave.borrow_mut().push("-login".to_string())
/// });
///
/// graph.go("login", vec!["guest"]).unwrap();
/// graph.end();
///
/// assert_eq!(*log.borrow(), vec![r#"+login ["guest"]"#, "-login"]);
/// ```
pub struct Graph<A> {
    core: Rc<GraphCore<A>>,
}

impl<A: 'static> Graph<A> {
    /// Create a root graph with the default configuration.
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create a root graph; every level below it shares `config`.
    pub fn with_config(config: Config<A>) -> Self {
        Self::build(Rc::new(config), None, ROOT_SCOPE.to_string())
    }

    pub(crate) fn nested(config: Rc<Config<A>>, owner: &Node<A>) -> Self {
        Self::build(config, Some(owner.downgrade()), owner.qualified_name())
    }

    fn build(config: Rc<Config<A>>, owner: Option<Weak<NodeCore<A>>>, scope: String) -> Self {
        Self {
            core: Rc::new(GraphCore {
                config,
                owner,
                scope,
                children: RefCell::new(HashMap::new()),
                active: RefCell::new(None),
                history: RefCell::new(StateHistory::new()),
            }),
        }
    }

    pub(crate) fn from_core(core: Rc<GraphCore<A>>) -> Self {
        Self { core }
    }

    pub(crate) fn downgrade(&self) -> Weak<GraphCore<A>> {
        Rc::downgrade(&self.core)
    }

    pub(crate) fn config(&self) -> Rc<Config<A>> {
        Rc::clone(&self.core.config)
    }

    pub fn settings(&self) -> &Settings {
        self.core.config.settings()
    }

    /// The state this level belongs to; `None` for the root graph.
    pub fn owner(&self) -> Option<Node<A>> {
        self.core
            .owner
            .as_ref()
            .and_then(Weak::upgrade)
            .map(Node::from_core)
    }

    /// Qualified name of the owning state, or `<root>`.
    pub fn scope(&self) -> String {
        self.core.scope.clone()
    }

    /// The owning state, failing if this level outlived it.
    fn live_owner(&self) -> Result<Option<Node<A>>, GraphError> {
        match &self.core.owner {
            None => Ok(None),
            Some(owner) => owner
                .upgrade()
                .map(|core| Some(Node::from_core(core)))
                .ok_or_else(|| GraphError::Detached {
                    name: self.scope(),
                }),
        }
    }

    fn not_found(&self, name: &str) -> GraphError {
        GraphError::NotFound {
            name: name.to_string(),
            scope: self.scope(),
        }
    }

    /// Answer a definition/lookup request at this level.
    ///
    /// - [`Request::Current`]: the active child, or `None`
    /// - [`Request::Lookup`]: the named child, or `None`
    /// - [`Request::Define`]: the newly defined child
    /// - [`Request::Nested`]: forwarded to the named child, which fails with
    ///   [`GraphError::NotFound`] if it does not exist
    pub fn state(&self, request: Request<A>) -> Result<Option<Node<A>>, GraphError> {
        match request {
            Request::Current => Ok(self.current()),
            Request::Lookup(name) => Ok(self.get(&name)),
            Request::Define { name, entry } => self.insert(name, entry).map(Some),
            Request::Nested { name, inner } => {
                let node = self.get(&name).ok_or_else(|| self.not_found(&name))?;
                node.state(*inner)
            }
        }
    }

    pub fn current(&self) -> Option<Node<A>> {
        self.core.active.borrow().clone()
    }

    pub fn get(&self, name: &str) -> Option<Node<A>> {
        self.core.children.borrow().get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.core.children.borrow().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.core.children.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.core.children.borrow().is_empty()
    }

    /// Names of all children, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.core.children.borrow().keys().cloned().collect();
        names.sort();
        names
    }

    /// All children, sorted by name.
    pub fn children(&self) -> Vec<Node<A>> {
        let mut children: Vec<Node<A>> = self.core.children.borrow().values().cloned().collect();
        children.sort_by(|a, b| a.name().cmp(b.name()));
        children
    }

    pub fn is_active(&self, node: &Node<A>) -> bool {
        self.core.active.borrow().as_ref() == Some(node)
    }

    /// Define a child state with its entry callback.
    ///
    /// The callback receives the ancestor chain (root..new state) followed by
    /// the transition arguments.
    pub fn define<F>(&self, name: impl Into<String>, entry: F) -> Result<Node<A>, GraphError>
    where
        F: Fn(&[Node<A>], &[A]) + 'static,
    {
        self.insert(name.into(), Rc::new(entry))
    }

    /// Define a state below the existing states named by `path`.
    ///
    /// Every state along `path` must already exist; none is created.
    pub fn define_at<I, S, F>(
        &self,
        path: I,
        name: impl Into<String>,
        entry: F,
    ) -> Result<Node<A>, GraphError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: Fn(&[Node<A>], &[A]) + 'static,
    {
        let mut level = self.clone();
        for segment in path {
            let segment = segment.as_ref();
            let node = level.get(segment).ok_or_else(|| level.not_found(segment))?;
            level = node.promote();
        }
        level.define(name, entry)
    }

    fn insert(&self, name: String, entry: Callback<A>) -> Result<Node<A>, GraphError> {
        if self.contains(&name) {
            return Err(GraphError::AlreadyDefined {
                name,
                scope: self.scope(),
            });
        }
        let parent = self.live_owner()?;
        let node = Node::new(name.clone(), entry, self, parent.as_ref());
        self.core
            .children
            .borrow_mut()
            .insert(name, node.clone());
        tracing::debug!(state = %node.qualified_name(), "defined state");
        Ok(node)
    }

    /// Make `target` the active child.
    ///
    /// Any other active child (and its active descendants) leaves first,
    /// then `target` emits `enter` and runs its entry callback, both with
    /// the chain followed by `args`. Going to the already active child is a
    /// no-op under [`ReentryPolicy::Ignore`] and an error under
    /// [`ReentryPolicy::Reject`]. A target whose ancestors were dropped
    /// fails with [`GraphError::Detached`] before anything leaves.
    pub fn go<'t>(
        &self,
        target: impl Into<Target<'t, A>>,
        args: Vec<A>,
    ) -> Result<Node<A>, GraphError> {
        let node = self.resolve(target.into())?;
        let previous = self.current();

        if previous.as_ref() == Some(&node) {
            return match self.settings().reentry {
                ReentryPolicy::Ignore => {
                    tracing::debug!(state = %node.qualified_name(), "already active, ignoring");
                    Ok(node)
                }
                ReentryPolicy::Reject => Err(GraphError::AlreadyActive {
                    name: node.name().to_string(),
                }),
            };
        }

        let chain = node.path()?;
        if let Some(previous) = &previous {
            previous.leave();
        }

        *self.core.active.borrow_mut() = Some(node.clone());
        self.record(previous.as_ref().map(Node::name), Some(node.name()));
        tracing::debug!(
            scope = %self.scope(),
            from = ?previous.as_ref().map(Node::name),
            to = %node.name(),
            "transition"
        );

        node.enter(&chain, &args);
        Ok(node)
    }

    /// Leave the active child, deepest descendants first, and clear it.
    pub fn end(&self) {
        let Some(node) = self.current() else {
            return;
        };
        node.leave();
        *self.core.active.borrow_mut() = None;
        self.record(Some(node.name()), None);
        tracing::debug!(scope = %self.scope(), state = %node.name(), "ended");
    }

    /// Active states from this level down, outermost first.
    pub fn active_path(&self) -> Vec<Node<A>> {
        let mut path = Vec::new();
        let mut cursor = self.current();
        while let Some(node) = cursor {
            cursor = node.current();
            path.push(node);
        }
        path
    }

    /// Transition log of this level. Empty unless `track_history` is set.
    pub fn history(&self) -> StateHistory {
        self.core.history.borrow().clone()
    }

    /// Drop every recorded transition of this level.
    pub fn clear_history(&self) {
        self.core.history.borrow_mut().clear();
    }

    fn resolve(&self, target: Target<'_, A>) -> Result<Node<A>, GraphError> {
        let found = match target {
            Target::Name(name) => self.get(name),
            Target::Node(node) => self.get(node.name()).filter(|child| child == node),
        };
        found.ok_or_else(|| self.not_found(target.name()))
    }

    fn record(&self, from: Option<&str>, to: Option<&str>) {
        if !self.settings().track_history {
            return;
        }
        let mut history = self.core.history.borrow_mut();
        history.record(TransitionRecord {
            from: from.map(str::to_string),
            to: to.map(str::to_string),
            timestamp: Utc::now(),
        });
        if let Some(limit) = self.settings().history_limit {
            history.retain_last(limit);
        }
    }
}

impl<A: 'static> Default for Graph<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Clone for Graph<A> {
    fn clone(&self) -> Self {
        Self {
            core: Rc::clone(&self.core),
        }
    }
}

impl<A: 'static> fmt::Debug for Graph<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Graph")
            .field("scope", &self.scope())
            .field("states", &self.names())
            .field("active", &self.current().map(|node| node.name().to_string()))
            .finish()
    }
}
