//! Tagged definition/lookup requests accepted by `state`.

use super::error::GraphError;
use super::node::Node;
use crate::emitter::Callback;
use std::fmt;
use std::rc::Rc;

/// What a `state` call should do at a level.
///
/// The shape is resolved once at the call site; each level then either
/// answers the request itself or forwards the inner request one level down.
pub enum Request<A> {
    /// Return the currently active child
    Current,

    /// Return the child with this name, if any
    Lookup(String),

    /// Define a new child with an entry callback
    Define { name: String, entry: Callback<A> },

    /// Resolve `name` at this level and forward `inner` to it
    Nested { name: String, inner: Box<Request<A>> },
}

impl<A> Request<A> {
    pub fn current() -> Self {
        Request::Current
    }

    pub fn lookup(name: impl Into<String>) -> Self {
        Request::Lookup(name.into())
    }

    pub fn define<F>(name: impl Into<String>, entry: F) -> Self
    where
        F: Fn(&[Node<A>], &[A]) + 'static,
    {
        Request::Define {
            name: name.into(),
            entry: Rc::new(entry),
        }
    }

    /// Wrap `leaf` so it is forwarded through every name of `path`, outermost first.
    ///
    /// `Request::nested(["a", "b"], Request::define("c", f))` defines `c`
    /// under `b` under `a`.
    pub fn nested<I, S>(path: I, leaf: Request<A>) -> Self
    where
        I: IntoIterator<Item = S>,
        I::IntoIter: DoubleEndedIterator,
        S: Into<String>,
    {
        path.into_iter()
            .rev()
            .fold(leaf, |inner, name| Request::Nested {
                name: name.into(),
                inner: Box::new(inner),
            })
    }

    /// Resolve a request from loose parts.
    ///
    /// - no names, no entry: [`Request::Current`]
    /// - names, no entry: lookup of the last name, nested under the others
    /// - names and an entry: definition of the last name, nested under the others
    /// - an entry without any name: [`GraphError::MissingName`]
    pub fn from_parts<S>(names: &[S], entry: Option<Callback<A>>) -> Result<Self, GraphError>
    where
        S: AsRef<str>,
    {
        let Some((last, parents)) = names.split_last() else {
            return match entry {
                Some(_) => Err(GraphError::MissingName),
                None => Ok(Request::Current),
            };
        };

        let leaf = match entry {
            Some(entry) => Request::Define {
                name: last.as_ref().to_string(),
                entry,
            },
            None => Request::Lookup(last.as_ref().to_string()),
        };
        Ok(Request::nested(
            parents.iter().map(|name| name.as_ref().to_string()),
            leaf,
        ))
    }
}

impl<A> fmt::Debug for Request<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Request::Current => f.write_str("Current"),
            Request::Lookup(name) => f.debug_tuple("Lookup").field(name).finish(),
            Request::Define { name, .. } => f
                .debug_struct("Define")
                .field("name", name)
                .finish_non_exhaustive(),
            Request::Nested { name, inner } => f
                .debug_struct("Nested")
                .field("name", name)
                .field("inner", inner)
                .finish(),
        }
    }
}
