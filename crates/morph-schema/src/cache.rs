use std::collections::HashMap;
use std::sync::Arc;

use morph_types::Type;
use parking_lot::RwLock;

use crate::Schema;

/// Concurrent schema cache keyed by structural type equality.
///
/// Entries are published at most once per key: when two threads race to build the same schema,
/// the first to publish wins and the other receives the published instance. There is no
/// eviction.
#[derive(Debug, Default)]
pub struct SchemaCache {
    entries: RwLock<HashMap<Type, Arc<Schema>>>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, ty: &Type) -> Option<Arc<Schema>> {
        self.entries.read().get(ty).cloned()
    }

    /// Publish `schema` for `ty` unless another schema got there first; returns the cached one.
    pub fn publish(&self, ty: Type, schema: Arc<Schema>) -> Arc<Schema> {
        let mut entries = self.entries.write();
        Arc::clone(entries.entry(ty).or_insert(schema))
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}
