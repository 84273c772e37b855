//! Load-once dataset cache.
//!
//! A [`DatasetCache`] loads its dataset on first use and hands out shared,
//! read-only references afterwards. There is no invalidation: the dataset
//! lives until the cache is dropped, or for the process lifetime in the
//! case of [`global_cache`], which keeps one cache per [`LoadOptions`].

use crate::error::Result;
use crate::loader::{LoadOptions, load};
use crate::record::Dataset;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

/// A dataset loaded at most once.
#[derive(Debug)]
pub struct DatasetCache {
    options: LoadOptions,
    cell: OnceLock<Arc<Dataset>>,
}

impl DatasetCache {
    /// Create an empty cache for the given load options.
    pub const fn new(options: LoadOptions) -> Self {
        Self {
            options,
            cell: OnceLock::new(),
        }
    }

    /// Options this cache loads with.
    pub const fn options(&self) -> &LoadOptions {
        &self.options
    }

    /// Whether the dataset has been loaded.
    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Return the cached dataset, loading it on first call.
    pub fn get_or_load(&self) -> Result<Arc<Dataset>> {
        self.get_or_load_with(load)
    }

    /// Like [`get_or_load`](Self::get_or_load) with a custom loader.
    ///
    /// A failed load leaves the cache empty so a later call can retry.
    pub fn get_or_load_with<F>(&self, loader: F) -> Result<Arc<Dataset>>
    where
        F: FnOnce(&LoadOptions) -> Result<Dataset>,
    {
        if let Some(dataset) = self.cell.get() {
            tracing::debug!(source = %self.options.source, "dataset cache hit");
            return Ok(Arc::clone(dataset));
        }

        let loaded = Arc::new(loader(&self.options)?);
        // a concurrent initialiser may have won; keep whichever landed first
        Ok(Arc::clone(self.cell.get_or_init(|| loaded)))
    }
}

/// Process-wide caches, one per distinct set of load options.
static GLOBAL: OnceLock<Mutex<HashMap<LoadOptions, Arc<DatasetCache>>>> = OnceLock::new();

/// The process-wide cache for `options`.
///
/// Each distinct set of options gets its own cache, so a state file and a
/// maker file can be held side by side. Equal options always return the same
/// cache and therefore load at most once.
pub fn global_cache(options: LoadOptions) -> Arc<DatasetCache> {
    let registry = GLOBAL.get_or_init(Mutex::default);
    // a poisoned lock still holds a consistent map; entries are insert-only
    let mut caches = registry.lock().unwrap_or_else(PoisonError::into_inner);
    let cache = caches
        .entry(options)
        .or_insert_with_key(|options| Arc::new(DatasetCache::new(options.clone())));
    Arc::clone(cache)
}
