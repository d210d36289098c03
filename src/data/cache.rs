use std::sync::{Arc, Mutex};

use super::model::Dataset;

/// Process-wide slot for the loaded dataset.
///
/// Filled by the first successful load and reused afterwards. A failed load
/// leaves the slot empty, so the next access tries again.
pub struct DatasetCache {
    slot: Mutex<Option<Arc<Dataset>>>,
}

static SHARED: DatasetCache = DatasetCache::new();

/// The cache used by the application.
pub fn shared() -> &'static DatasetCache {
    &SHARED
}

impl DatasetCache {
    pub const fn new() -> Self {
        DatasetCache {
            slot: Mutex::new(None),
        }
    }

    /// Return the cached dataset, running `load` only when nothing is cached.
    ///
    /// The lock is held across `load` so concurrent callers never load twice.
    pub fn get_or_load<E>(
        &self,
        load: impl FnOnce() -> Result<Dataset, E>,
    ) -> Result<Arc<Dataset>, E> {
        let mut slot = self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(dataset) = slot.as_ref() {
            log::debug!("dataset served from cache ({})", dataset.origin);
            return Ok(Arc::clone(dataset));
        }
        let dataset = Arc::new(load()?);
        *slot = Some(Arc::clone(&dataset));
        Ok(dataset)
    }
}
