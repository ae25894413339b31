use std::collections::HashMap;
use std::sync::Arc;

use super::model::Dataset;
use super::source::DataSource;
use crate::error::Result;

/// Loaded datasets keyed by normalised source address.
///
/// Entries live until [`DatasetCache::invalidate`] or
/// [`DatasetCache::clear`] is called. Failed loads are not stored.
#[derive(Debug, Default)]
pub struct DatasetCache {
    entries: HashMap<DataSource, Arc<Dataset>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached dataset for `source`, or run `load` and cache it.
    pub fn get_or_load<F>(&mut self, source: &DataSource, load: F) -> Result<Arc<Dataset>>
    where
        F: FnOnce(&DataSource) -> Result<Dataset>,
    {
        if let Some(ds) = self.entries.get(source) {
            log::debug!("Cache hit for {source}");
            return Ok(Arc::clone(ds));
        }
        log::debug!("Cache miss for {source}");
        let ds = Arc::new(load(source)?);
        self.entries.insert(source.clone(), Arc::clone(&ds));
        Ok(ds)
    }

    /// Drop the entry for `source`; returns whether one existed.
    pub fn invalidate(&mut self, source: &DataSource) -> bool {
        let removed = self.entries.remove(source).is_some();
        if removed {
            log::info!("Invalidated cached dataset for {source}");
        }
        removed
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn contains(&self, source: &DataSource) -> bool {
        self.entries.contains_key(source)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::sample_dataset;
    use crate::error::DashboardError;
    use std::cell::Cell;

    #[test]
    fn loads_once_until_invalidated() {
        let mut cache = DatasetCache::new();
        let src = DataSource::parse("data.xlsx");
        let calls = Cell::new(0);
        let load = |_: &DataSource| {
            calls.set(calls.get() + 1);
            Ok(sample_dataset())
        };

        let first = cache.get_or_load(&src, load).unwrap();
        let second = cache.get_or_load(&src, load).unwrap();
        assert_eq!(calls.get(), 1);
        assert!(Arc::ptr_eq(&first, &second));

        assert!(cache.invalidate(&src));
        assert!(!cache.invalidate(&src));
        cache.get_or_load(&src, load).unwrap();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn equivalent_addresses_share_an_entry() {
        let mut cache = DatasetCache::new();
        let blob = DataSource::parse("https://github.com/o/r/blob/main/d.xlsx");
        let raw = DataSource::parse("https://raw.githubusercontent.com/o/r/main/d.xlsx");
        cache.get_or_load(&blob, |_| Ok(sample_dataset())).unwrap();
        assert!(cache.contains(&raw));
    }

    #[test]
    fn failures_are_not_cached() {
        let mut cache = DatasetCache::new();
        let src = DataSource::parse("missing.xlsx");
        let err = cache.get_or_load(&src, |s| {
            Err(DashboardError::SourceUnavailable {
                address: s.to_string(),
                reason: "gone".into(),
            })
        });
        assert!(err.is_err());
        assert!(cache.is_empty());

        cache.get_or_load(&src, |_| Ok(sample_dataset())).unwrap();
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }
}
