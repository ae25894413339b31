use std::collections::BTreeSet;

use serde::Serialize;

use super::model::CustomerRecord;

// ---------------------------------------------------------------------------
// Domain: the values observed in the loaded customer sheet
// ---------------------------------------------------------------------------

/// Observed value domain of the customer sheet, used to populate widgets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomerDomain {
    /// Observed (min, max) age; `None` when no row has an age.
    pub age_bounds: Option<(f64, f64)>,
    pub genders: BTreeSet<String>,
    pub education_levels: BTreeSet<String>,
    pub industries: BTreeSet<String>,
}

impl CustomerDomain {
    pub fn from_customers(customers: &[CustomerRecord]) -> Self {
        let mut domain = CustomerDomain::default();
        for c in customers {
            if let Some(age) = c.age {
                domain.age_bounds = Some(match domain.age_bounds {
                    Some((lo, hi)) => (lo.min(age), hi.max(age)),
                    None => (age, age),
                });
            }
            domain.genders.insert(c.gender.clone());
            domain.education_levels.insert(c.education_level.clone());
            domain.industries.insert(c.industry.clone());
        }
        domain
    }
}

// ---------------------------------------------------------------------------
// Filter criteria
// ---------------------------------------------------------------------------

/// Inclusive age interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AgeRange {
    pub min: f64,
    pub max: f64,
}

impl AgeRange {
    pub fn contains(&self, age: f64) -> bool {
        self.min <= age && age <= self.max
    }
}

/// The user's filter selection.
///
/// `education` and `industries` treat an empty set as "no restriction".
/// `genders` does not: an empty gender set matches nothing. The gender
/// widget starts with every observed value selected instead.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterCriteria {
    pub age: AgeRange,
    pub genders: BTreeSet<String>,
    pub education: BTreeSet<String>,
    pub industries: BTreeSet<String>,
}

/// Default age window before the user moves the slider.
pub const DEFAULT_AGE_RANGE: (f64, f64) = (25.0, 40.0);

impl FilterCriteria {
    /// Initial selection: default age window clamped into the observed ages,
    /// all genders, no education or industry restriction.
    pub fn initial(domain: &CustomerDomain) -> Self {
        let age = match domain.age_bounds {
            Some((lo, hi)) => {
                let min = DEFAULT_AGE_RANGE.0.clamp(lo, hi);
                let max = DEFAULT_AGE_RANGE.1.clamp(lo, hi);
                AgeRange { min, max }
            }
            None => AgeRange {
                min: DEFAULT_AGE_RANGE.0,
                max: DEFAULT_AGE_RANGE.1,
            },
        };
        FilterCriteria {
            age,
            genders: domain.genders.clone(),
            education: BTreeSet::new(),
            industries: BTreeSet::new(),
        }
    }

    /// Selection that keeps every row with an age: full age domain, all
    /// genders, no other restriction.
    pub fn everything(domain: &CustomerDomain) -> Self {
        let (min, max) = domain.age_bounds.unwrap_or((f64::MIN, f64::MAX));
        FilterCriteria {
            age: AgeRange { min, max },
            genders: domain.genders.clone(),
            education: BTreeSet::new(),
            industries: BTreeSet::new(),
        }
    }

    pub fn matches(&self, c: &CustomerRecord) -> bool {
        let age_ok = c.age.is_some_and(|a| self.age.contains(a));
        age_ok
            && self.genders.contains(&c.gender)
            && (self.education.is_empty() || self.education.contains(&c.education_level))
            && (self.industries.is_empty() || self.industries.contains(&c.industry))
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Indices of customers passing `criteria`, in source order.
pub fn filtered_indices(customers: &[CustomerRecord], criteria: &FilterCriteria) -> Vec<usize> {
    customers
        .iter()
        .enumerate()
        .filter(|(_, c)| criteria.matches(c))
        .map(|(i, _)| i)
        .collect()
}

/// Borrowed view of the customers passing `criteria`, in source order.
pub fn apply_filters<'a>(
    customers: &'a [CustomerRecord],
    criteria: &FilterCriteria,
) -> Vec<&'a CustomerRecord> {
    customers.iter().filter(|c| criteria.matches(c)).collect()
}
