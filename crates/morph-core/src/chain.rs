use std::fmt;
use std::sync::Arc;

/// An ordered, immutable sequence of handlers.
///
/// Every edit (`add_first`, `replace_last`, ...) returns a new chain; chains that were already
/// handed out keep observing the exact handler list they were built with. Cloning is a
/// reference-count bump.
pub struct HandlerChain<H: ?Sized> {
    handlers: Arc<[Arc<H>]>,
}

impl<H: ?Sized> HandlerChain<H> {
    pub fn new(handlers: Vec<Arc<H>>) -> Self {
        Self {
            handlers: handlers.into(),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<H>> + '_ {
        self.handlers.iter()
    }

    pub fn first(&self) -> Option<&Arc<H>> {
        self.handlers.first()
    }

    pub fn last(&self) -> Option<&Arc<H>> {
        self.handlers.last()
    }

    #[must_use]
    pub fn add_first(&self, handler: Arc<H>) -> Self {
        let mut handlers = Vec::with_capacity(self.len() + 1);
        handlers.push(handler);
        handlers.extend(self.handlers.iter().cloned());
        Self::new(handlers)
    }

    #[must_use]
    pub fn add_last(&self, handler: Arc<H>) -> Self {
        let mut handlers = self.to_vec();
        handlers.push(handler);
        Self::new(handlers)
    }

    /// Replace the head of the chain. An empty chain becomes a single-handler chain.
    #[must_use]
    pub fn replace_first(&self, handler: Arc<H>) -> Self {
        let mut handlers = self.to_vec();
        match handlers.first_mut() {
            Some(slot) => *slot = handler,
            None => handlers.push(handler),
        }
        Self::new(handlers)
    }

    /// Replace the tail of the chain. An empty chain becomes a single-handler chain.
    #[must_use]
    pub fn replace_last(&self, handler: Arc<H>) -> Self {
        let mut handlers = self.to_vec();
        match handlers.last_mut() {
            Some(slot) => *slot = handler,
            None => handlers.push(handler),
        }
        Self::new(handlers)
    }

    /// Replace the first handler matching `pred`; returns an unchanged chain if none matches.
    #[must_use]
    pub fn replace_where(&self, pred: impl Fn(&H) -> bool, handler: Arc<H>) -> Self {
        let mut handlers = self.to_vec();
        if let Some(slot) = handlers.iter_mut().find(|h| pred(h)) {
            *slot = handler;
        }
        Self::new(handlers)
    }

    fn to_vec(&self) -> Vec<Arc<H>> {
        self.handlers.iter().cloned().collect()
    }
}

impl<H: ?Sized> Clone for HandlerChain<H> {
    fn clone(&self) -> Self {
        Self {
            handlers: Arc::clone(&self.handlers),
        }
    }
}

impl<H: ?Sized> Default for HandlerChain<H> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<H: ?Sized> FromIterator<Arc<H>> for HandlerChain<H> {
    fn from_iter<I: IntoIterator<Item = Arc<H>>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<H: ?Sized> fmt::Debug for HandlerChain<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerChain")
            .field("len", &self.handlers.len())
            .finish()
    }
}
