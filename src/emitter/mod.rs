//! Event emission for state lifecycle signals.
//!
//! Every [`Node`] owns one [`Emitter`]. The engine only needs two things from
//! it: register a listener under a signal name, and synchronously invoke all
//! listeners for a name with the ancestor chain and an ordered argument
//! slice. [`ListenerRegistry`] is the default implementation; hosts can plug
//! in their own through [`EmitterFactory`] on the graph's
//! [`Config`](crate::config::Config).

use crate::core::Node;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Signal names emitted by the engine.
pub mod signal {
    /// Fired when a state becomes active, before its entry callback.
    pub const ENTER: &str = "enter";
    /// Fired when a state stops being active, after its descendants left.
    pub const LEAVE: &str = "leave";
}

/// Shared shape of entry callbacks and signal listeners.
///
/// The first slice is the ancestor chain (root..self), the second the
/// transition arguments.
pub type Callback<A> = Rc<dyn Fn(&[Node<A>], &[A])>;

/// Subscribe/emit capability owned by each node.
pub trait Emitter<A> {
    /// Register `listener` for `signal`.
    fn subscribe(&self, signal: &str, listener: Callback<A>);

    /// Invoke every listener for `signal`, in subscription order.
    fn emit(&self, signal: &str, chain: &[Node<A>], args: &[A]);

    /// Number of listeners registered for `signal`.
    fn listener_count(&self, signal: &str) -> usize;
}

/// Produces the emitter for each newly constructed node.
pub trait EmitterFactory<A> {
    fn create(&self) -> Box<dyn Emitter<A>>;
}

impl<A, F> EmitterFactory<A> for F
where
    F: Fn() -> Box<dyn Emitter<A>>,
{
    fn create(&self) -> Box<dyn Emitter<A>> {
        self()
    }
}

/// Default emitter: listeners grouped by signal name.
pub struct ListenerRegistry<A> {
    listeners: RefCell<HashMap<String, Vec<Callback<A>>>>,
}

impl<A> ListenerRegistry<A> {
    pub fn new() -> Self {
        Self {
            listeners: RefCell::new(HashMap::new()),
        }
    }
}

impl<A> Default for ListenerRegistry<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Emitter<A> for ListenerRegistry<A> {
    fn subscribe(&self, signal: &str, listener: Callback<A>) {
        self.listeners
            .borrow_mut()
            .entry(signal.to_string())
            .or_default()
            .push(listener);
    }

    fn emit(&self, signal: &str, chain: &[Node<A>], args: &[A]) {
        // Snapshot so listeners may subscribe while being invoked.
        let listeners = match self.listeners.borrow().get(signal) {
            Some(listeners) => listeners.clone(),
            None => return,
        };
        for listener in listeners {
            listener(chain, args);
        }
    }

    fn listener_count(&self, signal: &str) -> usize {
        self.listeners.borrow().get(signal).map_or(0, Vec::len)
    }
}

/// Factory used when no emitter is configured.
pub(crate) fn default_factory<A: 'static>() -> Rc<dyn EmitterFactory<A>> {
    Rc::new(|| Box::new(ListenerRegistry::<A>::new()) as Box<dyn Emitter<A>>)
}
