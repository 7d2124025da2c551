//! The state tree: graphs, nodes and the requests that shape them.
//!
//! - [`Graph`]: one level of the tree, owning named children and the active pointer
//! - [`Node`]: a single state with its ancestor chain, entry callback and emitter
//! - [`Request`]: tagged define/lookup/forward request answered by `state`
//! - [`StateHistory`]: optional per-level transition log

mod error;
mod graph;
mod history;
mod node;
mod request;

pub use error::GraphError;
pub use graph::{Graph, Target};
pub use history::{StateHistory, TransitionRecord};
pub use node::{Node, NodeId};
pub use request::Request;
