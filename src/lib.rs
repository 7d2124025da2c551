//! Stategraph: a hierarchical state graph
//!
//! States are organized as a tree. Each level is a [`Graph`] with at most one
//! active child; any [`Node`] becomes a container for its own level the first
//! time it is asked to hold children. Moving between states fires `leave`
//! on everything that stops being active (deepest first) before `enter` on
//! the new state, and every callback sees the full ancestor chain.
//!
//! # Core Concepts
//!
//! - **Graph**: a level of the tree, with definition, lookup, `go` and `end`
//! - **Node**: a named state with an entry callback and `enter`/`leave` signals
//! - **Jump**: realign every level along a state's ancestor chain in one call
//! - **Config**: tree-wide settings and the emitter each node is built with
//!
//! The engine is single-threaded and synchronous: handles are `Rc`-based and
//! callbacks run to completion inside the call that triggered them.
//!
//! # Example
//!
//! ```rust
//! use stategraph::{signal, Graph, Node};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let log = Rc::new(RefCell::new(Vec::new()));
//! let graph = Graph::<u32>::new();
//!
//! let record = |log: &Rc<RefCell<Vec<String>>>, sign: &'static str| {
//!     let log = Rc::clone(log);
//!     move |chain: &[Node<u32>], _: &[u32]| {
//!         let path: Vec<_> = chain.iter().map(Node::name).collect();
//!         log.borrow_mut().push(format!("{sign}{}", path.join(".")));
//!     }
//! };
//!
//! let a = graph.define("a", record(&log, "+")).unwrap();
//! a.on(signal::LEAVE, record(&log, "-"));
//! let one = a.define("1", record(&log, "+")).unwrap();
//! one.on(signal::LEAVE, record(&log, "-"));
//!
//! one.jump(vec![]).unwrap();
//! graph.end();
//!
//! assert_eq!(*log.borrow(), vec!["+a", "+a.1", "-a.1", "-a"]);
//! ```

pub mod config;
pub mod core;
pub mod emitter;

// Re-export commonly used types
pub use crate::config::{Config, ConfigBuilder, ReentryPolicy, Settings};
pub use crate::core::{
    Graph, GraphError, Node, NodeId, Request, StateHistory, Target, TransitionRecord,
};
pub use crate::emitter::{signal, Callback, Emitter, EmitterFactory, ListenerRegistry};
