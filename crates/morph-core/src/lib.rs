//! Core shared vocabulary for Morph.
//!
//! This crate is intentionally small: it holds the pieces that every layer of the
//! introspection/mapping engine agrees on (handler flow signals, the persistent
//! handler chain, copy policies and metadata tags) without depending on the type
//! model itself.

mod chain;
mod policy;

pub use chain::HandlerChain;
pub use policy::{CopyLevel, ReusePolicy};

/// Outcome reported by a single handler in a [`HandlerChain`].
#[derive(Debug, Clone, PartialEq)]
pub enum Flow<T> {
    /// No opinion; the next handler runs.
    Continue,
    /// Halt the pipeline; whatever the context holds is final.
    Stop,
    /// The handler produced a result and no further handlers are invoked.
    Done(T),
}

impl<T> Flow<T> {
    #[inline]
    pub fn is_continue(&self) -> bool {
        matches!(self, Flow::Continue)
    }

    pub fn done(self) -> Option<T> {
        match self {
            Flow::Done(value) => Some(value),
            Flow::Continue | Flow::Stop => None,
        }
    }
}

/// Annotation-equivalent metadata attached to declarations (fields, methods, classes).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag {
    pub name: String,
    pub value: Option<String>,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    pub fn with_value(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }
}

/// Merge `extra` into `tags`, skipping tags that are already present.
pub fn merge_tags(tags: &mut Vec<Tag>, extra: &[Tag]) {
    for tag in extra {
        if !tags.contains(tag) {
            tags.push(tag.clone());
        }
    }
}
