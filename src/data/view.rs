use chrono::NaiveDate;
use serde::Serialize;

use super::aggregate::{aggregate_by_key, mean_of, Aggregation, Reducer, Reduction};
use super::filter::{filtered_indices, CustomerDomain, FilterCriteria};
use super::kpi::{compute_kpis, Kpis};
use super::model::{
    columns, CompetitorRecord, CustomerRecord, Dataset, EnrollmentRecord, MarketingRecord,
    SurveyRecord,
};

pub const AGE_HISTOGRAM_BINS: usize = 10;

// ---------------------------------------------------------------------------
// ViewModel – everything the UI draws for one selection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ViewModel {
    pub criteria: FilterCriteria,
    /// Indices into `Dataset::customers` passing `criteria`.
    pub filtered: Vec<usize>,
    /// Course Price (mean), Enrollment Numbers (sum) per competitor.
    pub competitors: Aggregation<String>,
    /// Ad Spend (sum), CTR (mean), Conversion Rate (mean) per campaign type.
    pub marketing: Aggregation<String>,
    pub survey: SurveySummary,
    /// Revenue Per Customer (sum), CPA (mean) per enrollment date.
    pub enrollment: Aggregation<NaiveDate>,
    pub kpis: Kpis,
    pub age_histogram: Option<Histogram>,
}

impl ViewModel {
    pub fn filtered_customers<'a>(
        &'a self,
        dataset: &'a Dataset,
    ) -> impl Iterator<Item = &'a CustomerRecord> + 'a {
        self.filtered.iter().filter_map(|&i| dataset.customers.get(i))
    }
}

/// Recompute the whole view for one filter selection.
pub fn render_view(dataset: &Dataset, criteria: &FilterCriteria) -> ViewModel {
    let filtered = filtered_indices(&dataset.customers, criteria);
    log::debug!(
        "View recomputed: {} of {} customers pass filters",
        filtered.len(),
        dataset.customers.len()
    );

    let domain = CustomerDomain::from_customers(&dataset.customers);
    let age_histogram = domain.age_bounds.map(|bounds| {
        histogram(
            filtered.iter().filter_map(|&i| dataset.customers[i].age),
            bounds,
            AGE_HISTOGRAM_BINS,
        )
    });

    ViewModel {
        criteria: criteria.clone(),
        filtered,
        competitors: competitor_summary(&dataset.competitors),
        marketing: marketing_summary(&dataset.marketing),
        survey: SurveySummary::from_records(&dataset.survey),
        enrollment: enrollment_summary(&dataset.enrollment),
        kpis: compute_kpis(&dataset.enrollment),
        age_histogram,
    }
}

/// Group key for a categorical cell; blank cells belong to no group.
fn category(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

pub fn competitor_summary(records: &[CompetitorRecord]) -> Aggregation<String> {
    aggregate_by_key(
        records,
        |r| category(&r.name),
        &[
            Reducer::new(
                columns::COURSE_PRICE,
                |r: &CompetitorRecord| r.course_price,
                Reduction::Mean,
            ),
            Reducer::new(
                columns::ENROLLMENT_NUMBERS,
                |r: &CompetitorRecord| r.enrollment_numbers,
                Reduction::Sum,
            ),
        ],
    )
}

pub fn marketing_summary(records: &[MarketingRecord]) -> Aggregation<String> {
    aggregate_by_key(
        records,
        |r| category(&r.campaign_type),
        &[
            Reducer::new(columns::AD_SPEND, |r: &MarketingRecord| r.ad_spend, Reduction::Sum),
            Reducer::new(columns::CTR, |r: &MarketingRecord| r.ctr, Reduction::Mean),
            Reducer::new(
                columns::CONVERSION_RATE,
                |r: &MarketingRecord| r.conversion_rate,
                Reduction::Mean,
            ),
        ],
    )
}

/// Undated rows are left out here; the KPIs still count them.
pub fn enrollment_summary(records: &[EnrollmentRecord]) -> Aggregation<NaiveDate> {
    aggregate_by_key(
        records,
        |r| r.enrollment_date,
        &[
            Reducer::new(
                columns::REVENUE_PER_CUSTOMER,
                |r: &EnrollmentRecord| r.revenue_per_customer,
                Reduction::Sum,
            ),
            Reducer::new(
                columns::COST_PER_ACQUISITION,
                |r: &EnrollmentRecord| r.cost_per_acquisition,
                Reduction::Mean,
            ),
        ],
    )
}

// ---------------------------------------------------------------------------
// Survey summary
// ---------------------------------------------------------------------------

/// Mean feature-importance score per feature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SurveySummary {
    pub mentorship: Option<f64>,
    pub projects: Option<f64>,
    pub job_assistance: Option<f64>,
}

impl SurveySummary {
    pub fn from_records(records: &[SurveyRecord]) -> Self {
        Self {
            mentorship: mean_of(records.iter().map(|r| r.mentorship)),
            projects: mean_of(records.iter().map(|r| r.projects)),
            job_assistance: mean_of(records.iter().map(|r| r.job_assistance)),
        }
    }

    /// `(column name, mean)` in sheet order.
    pub fn entries(&self) -> [(&'static str, Option<f64>); 3] {
        [
            (columns::FEATURE_MENTORSHIP, self.mentorship),
            (columns::FEATURE_PROJECTS, self.projects),
            (columns::FEATURE_JOB_ASSISTANCE, self.job_assistance),
        ]
    }
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

/// Equal-width bins starting at `start`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub start: f64,
    pub bin_width: f64,
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Centre of bin `i`, for plotting.
    pub fn bin_center(&self, i: usize) -> f64 {
        self.start + (i as f64 + 0.5) * self.bin_width
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Bin `values` over the closed interval `bounds`. Values outside are
/// ignored; the upper bound falls in the last bin.
pub fn histogram(values: impl IntoIterator<Item = f64>, bounds: (f64, f64), bins: usize) -> Histogram {
    let bins = bins.max(1);
    let (lo, hi) = bounds;
    let span = hi - lo;
    let bin_width = if span > 0.0 { span / bins as f64 } else { 1.0 };
    let mut counts = vec![0; bins];

    for v in values {
        if !(lo..=hi).contains(&v) {
            continue;
        }
        let idx = (((v - lo) / bin_width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }

    Histogram {
        start: lo,
        bin_width,
        counts,
    }
}
