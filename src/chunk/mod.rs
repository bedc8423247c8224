//!
//! The unit of flow through a pipeline: a binary payload plus its meta variables.
//!
//! Meta variables are scoped to frames. Every entry remembers the frame depth at
//! which it was set, and closing a frame discards the entries that were set
//! inside of it. Variables set in an outer frame stay visible inside nested
//! frames; overwriting one shadows it until the frame is closed.
//!

mod value;

pub use value::Value;

use crate::error::{Error, Result};
use bytes::Bytes;
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
struct Scoped {
    value: Value,
    depth: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Parent {
    frame_index: u64,
    index: usize,
    /// The chunk was already invisible when it entered the frame.
    hidden: bool,
}

/// A binary payload with per-chunk metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    /// The binary payload.
    pub body: Bytes,
    /// Whether units should process this chunk. Invisible chunks pass through untouched.
    pub visible: bool,
    /// The frame this chunk belongs to.
    pub frame_index: u64,
    /// Position of this chunk within its frame.
    pub index: usize,
    meta: HashMap<String, Vec<Scoped>>,
    parents: Vec<Parent>,
}

impl Chunk {
    /// Creates a visible root chunk.
    pub fn new(body: impl Into<Bytes>) -> Self {
        Self {
            body: body.into(),
            visible: true,
            frame_index: 0,
            index: 0,
            meta: HashMap::new(),
            parents: Vec::new(),
        }
    }

    /// Returns the chunk with its payload replaced. Meta and frame membership are kept.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn set_body(&mut self, body: impl Into<Bytes>) {
        self.body = body.into();
    }

    /// Inserts or overwrites a meta variable in the current frame scope.
    /// A variable of an enclosing frame is shadowed, not replaced.
    pub fn set_meta(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let depth = self.depth();
        let scoped = Scoped {
            value: value.into(),
            depth,
        };
        let stack = self.meta.entry(key.into()).or_default();
        match stack.last_mut() {
            Some(top) if top.depth == depth => *top = scoped,
            _ => stack.push(scoped),
        }
    }

    fn lookup(&self, key: &str) -> Option<&Value> {
        self.meta.get(key).and_then(|stack| stack.last()).map(|s| &s.value)
    }

    ///
    /// Looks up a meta variable.
    ///
    /// ## Errors
    ///
    /// Returns `Error::KeyNotFound` if the chunk carries no variable named `key`.
    ///
    pub fn get_meta(&self, key: &str) -> Result<&Value> {
        self.lookup(key)
            .ok_or_else(|| Error::KeyNotFound(key.to_owned()))
    }

    pub fn get_meta_or<'a>(&'a self, key: &str, default: &'a Value) -> &'a Value {
        self.lookup(key).unwrap_or(default)
    }

    pub fn has_meta(&self, key: &str) -> bool {
        self.meta.contains_key(key)
    }

    /// Removes a variable from every frame scope. Returns the value that was visible.
    pub fn remove_meta(&mut self, key: &str) -> Option<Value> {
        self.meta.remove(key).and_then(|mut stack| stack.pop()).map(|s| s.value)
    }

    pub fn meta(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.meta
            .iter()
            .filter_map(|(k, stack)| stack.last().map(|s| (k.as_str(), &s.value)))
    }

    /// Number of frames enclosing this chunk.
    pub fn depth(&self) -> usize {
        self.parents.len()
    }

    /// Frame index of the enclosing frame, if any.
    pub fn parent_frame(&self) -> Option<u64> {
        self.parents.last().map(|parent| parent.frame_index)
    }

    /// Creates a child chunk in the same frame scope, inheriting meta variables.
    pub fn derive(&self, body: impl Into<Bytes>) -> Self {
        Self {
            body: body.into(),
            visible: self.visible,
            frame_index: self.frame_index,
            index: self.index,
            meta: self.meta.clone(),
            parents: self.parents.clone(),
        }
    }

    /// Whether the chunk was hidden inside its innermost frame, as opposed to
    /// entering that frame already hidden. Root chunks are never hidden in a frame.
    pub(crate) fn hidden_in_frame(&self) -> bool {
        !self.visible && self.parents.last().is_some_and(|parent| !parent.hidden)
    }

    pub(crate) fn open_frame(&mut self, frame_index: u64, index: usize) {
        self.parents.push(Parent {
            frame_index: self.frame_index,
            index: self.index,
            hidden: !self.visible,
        });
        self.frame_index = frame_index;
        self.index = index;
    }

    /// Leaves the innermost frame. Returns `false` for a chunk that is not inside any frame.
    pub(crate) fn close_frame(&mut self) -> bool {
        let Some(parent) = self.parents.pop() else {
            return false;
        };
        let depth = self.parents.len();
        self.meta.retain(|_, stack| {
            stack.retain(|s| s.depth <= depth);
            !stack.is_empty()
        });
        self.frame_index = parent.frame_index;
        self.index = parent.index;
        true
    }
}

#[cfg(test)]
#[path = "tests/chunk_tests.rs"]
mod tests;
