//! Concurrent registry of loaded grammars

use crate::loader::SchemaLoader;
use crate::model::SchemaModel;
use crate::{Error, Result};
use dashmap::DashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, trace};

/// Thread-safe cache of grammars keyed by name or path.
///
/// Each key is constructed at most once: concurrent first requests for the
/// same key wait on the shard lock while the first caller loads it.
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: DashMap<String, Arc<SchemaModel>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an already-built grammar, replacing any previous entry
    pub fn register(&self, key: impl Into<String>, schema: SchemaModel) -> Arc<SchemaModel> {
        let schema = Arc::new(schema);
        self.schemas.insert(key.into(), Arc::clone(&schema));
        schema
    }

    pub fn get(&self, key: &str) -> Option<Arc<SchemaModel>> {
        self.schemas.get(key).map(|entry| Arc::clone(entry.value()))
    }

    /// Like [`get`](Self::get), failing with [`Error::NotFound`]
    pub fn require(&self, key: &str) -> Result<Arc<SchemaModel>> {
        self.get(key).ok_or_else(|| Error::NotFound(key.to_string()))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.schemas.contains_key(key)
    }

    /// Return the grammar under `key`, building it with `load` on first use
    pub fn get_or_load<F>(&self, key: &str, load: F) -> Result<Arc<SchemaModel>>
    where
        F: FnOnce() -> Result<SchemaModel>,
    {
        if let Some(cached) = self.get(key) {
            debug!("Cache hit for grammar: {}", key);
            return Ok(cached);
        }
        trace!("Cache miss for grammar: {}", key);
        let entry = self
            .schemas
            .entry(key.to_string())
            .or_try_insert_with(|| load().map(Arc::new))?;
        Ok(Arc::clone(entry.value()))
    }

    /// Load an XSD file once, keyed by its path
    pub fn load_path(&self, path: impl AsRef<Path>, loader: &SchemaLoader) -> Result<Arc<SchemaModel>> {
        let path = path.as_ref();
        let key = path.display().to_string();
        self.get_or_load(&key, || loader.load_from_path(path))
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
