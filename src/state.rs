use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use crate::data::cache::DatasetCache;
use crate::data::filter::{AgeRange, CustomerDomain, FilterCriteria};
use crate::data::loader::load_dataset;
use crate::data::model::Dataset;
use crate::data::source::DataSource;
use crate::data::view::{render_view, ViewModel};

// ---------------------------------------------------------------------------
// Multi-select filter fields
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    Gender,
    Education,
    Industry,
}

impl FilterField {
    pub const ALL: [FilterField; 3] = [FilterField::Gender, FilterField::Education, FilterField::Industry];

    pub fn label(self) -> &'static str {
        match self {
            FilterField::Gender => "Gender",
            FilterField::Education => "Education Level",
            FilterField::Industry => "Industry",
        }
    }

    pub fn options(self, domain: &CustomerDomain) -> &BTreeSet<String> {
        match self {
            FilterField::Gender => &domain.genders,
            FilterField::Education => &domain.education_levels,
            FilterField::Industry => &domain.industries,
        }
    }

    pub fn selection(self, criteria: &FilterCriteria) -> &BTreeSet<String> {
        match self {
            FilterField::Gender => &criteria.genders,
            FilterField::Education => &criteria.education,
            FilterField::Industry => &criteria.industries,
        }
    }

    fn selection_mut(self, criteria: &mut FilterCriteria) -> &mut BTreeSet<String> {
        match self {
            FilterField::Gender => &mut criteria.genders,
            FilterField::Education => &mut criteria.education,
            FilterField::Industry => &mut criteria.industries,
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Where the workbook is read from.
    pub source: DataSource,
    pub timeout: Duration,

    /// Datasets loaded this session, keyed by source.
    pub cache: DatasetCache,

    /// Loaded dataset (None until a load succeeds).
    pub dataset: Option<Arc<Dataset>>,

    /// Observed values of the customer sheet, for the filter widgets.
    pub domain: CustomerDomain,

    /// Current filter selection.
    pub criteria: FilterCriteria,

    /// View for `criteria` (cached, rebuilt on change).
    pub view: Option<ViewModel>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(source: DataSource, timeout: Duration) -> Self {
        let domain = CustomerDomain::default();
        Self {
            source,
            timeout,
            cache: DatasetCache::new(),
            dataset: None,
            criteria: FilterCriteria::initial(&domain),
            domain,
            view: None,
            status_message: None,
        }
    }

    /// Load the current source (from the cache when possible). On failure
    /// every view is cleared.
    pub fn load(&mut self) {
        let timeout = self.timeout;
        let source = self.source.clone();
        match self.cache.get_or_load(&source, |s| load_dataset(s, timeout)) {
            Ok(dataset) => {
                log::info!(
                    "Dataset from {source}: {} customers, {} competitors, {} campaigns, {} survey rows, {} enrollment rows",
                    dataset.customers.len(),
                    dataset.competitors.len(),
                    dataset.marketing.len(),
                    dataset.survey.len(),
                    dataset.enrollment.len()
                );
                self.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load {source}: {e}");
                self.dataset = None;
                self.view = None;
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }

    /// Drop the cached copy of the current source and fetch it again.
    pub fn reload(&mut self) {
        self.cache.invalidate(&self.source);
        self.load();
    }

    /// Switch to another workbook and load it.
    pub fn open_source(&mut self, source: DataSource) {
        self.source = source;
        self.load();
    }

    /// Ingest a newly loaded dataset, initialise filters and the view.
    pub fn set_dataset(&mut self, dataset: Arc<Dataset>) {
        self.domain = CustomerDomain::from_customers(&dataset.customers);
        self.criteria = FilterCriteria::initial(&self.domain);
        self.dataset = Some(dataset);
        self.status_message = None;
        self.refresh_view();
    }

    /// Recompute the view after a filter change.
    pub fn refresh_view(&mut self) {
        let Some(ds) = &self.dataset else {
            self.view = None;
            return;
        };
        self.view = Some(render_view(ds, &self.criteria));
    }

    pub fn set_age_range(&mut self, min: f64, max: f64) {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        let age = AgeRange { min, max };
        if self.criteria.age != age {
            self.criteria.age = age;
            self.refresh_view();
        }
    }

    /// Toggle a single value of a multi-select.
    pub fn toggle_filter_value(&mut self, field: FilterField, value: &str) {
        let selected = field.selection_mut(&mut self.criteria);
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
        self.refresh_view();
    }

    /// Select every observed value of a field.
    pub fn select_all(&mut self, field: FilterField) {
        *field.selection_mut(&mut self.criteria) = field.options(&self.domain).clone();
        self.refresh_view();
    }

    /// Clear a field's selection.
    pub fn select_none(&mut self, field: FilterField) {
        field.selection_mut(&mut self.criteria).clear();
        self.refresh_view();
    }

    /// Number of customers passing the current filters.
    pub fn visible_count(&self) -> usize {
        self.view.as_ref().map_or(0, |v| v.filtered.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::sample_workbook_bytes;

    fn state_with_sample() -> (tempfile::TempDir, AppState) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.xlsx");
        std::fs::write(&path, sample_workbook_bytes()).unwrap();
        let mut state = AppState::new(DataSource::Local(path), Duration::from_secs(1));
        state.load();
        (dir, state)
    }

    #[test]
    fn load_initialises_filters_and_view() {
        let (_dir, state) = state_with_sample();
        assert!(state.status_message.is_none());
        assert_eq!(state.domain.age_bounds, Some((25.0, 45.0)));
        assert_eq!(state.criteria.age, AgeRange { min: 25.0, max: 40.0 });
        assert_eq!(state.visible_count(), 3);
    }

    #[test]
    fn filter_changes_refresh_the_view() {
        let (_dir, mut state) = state_with_sample();

        state.toggle_filter_value(FilterField::Gender, "M");
        assert_eq!(state.visible_count(), 2);

        state.select_none(FilterField::Gender);
        assert_eq!(state.visible_count(), 0);

        state.select_all(FilterField::Gender);
        state.toggle_filter_value(FilterField::Industry, "Tech");
        assert_eq!(state.visible_count(), 2);

        state.select_none(FilterField::Industry);
        state.set_age_range(45.0, 25.0);
        assert_eq!(state.visible_count(), 4);
    }

    #[test]
    fn group_without_values_keeps_the_dashboard() {
        let (_dir, mut state) = state_with_sample();
        let mut ds = crate::data::fixtures::sample_dataset();
        ds.marketing[1].ctr = None;
        state.set_dataset(Arc::new(ds));

        assert!(state.status_message.is_none());
        let view = state.view.as_ref().unwrap();
        assert_eq!(view.marketing.value(&"Social".into(), "CTR"), None);
        assert_eq!(state.visible_count(), 3);
    }

    #[test]
    fn failed_load_suppresses_views() {
        let (dir, mut state) = state_with_sample();
        state.open_source(DataSource::Local(dir.path().join("absent.xlsx")));
        assert!(state.dataset.is_none());
        assert!(state.view.is_none());
        assert!(state.status_message.as_deref().unwrap_or("").contains("unavailable"));
    }

    #[test]
    fn reload_refetches_after_file_changes() {
        let (dir, mut state) = state_with_sample();
        let path = dir.path().join("sample.xlsx");
        std::fs::write(&path, b"corrupt").unwrap();

        // still served from the cache
        state.load();
        assert!(state.view.is_some());

        state.reload();
        assert!(state.view.is_none());
        assert!(!state.cache.contains(&DataSource::Local(path)));
    }
}
