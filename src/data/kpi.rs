use serde::Serialize;

use super::aggregate::{mean_of, sum_of};
use super::model::EnrollmentRecord;

/// Headline metrics over the whole enrollment sheet.
///
/// The averages are `None` ("not available") when there is nothing to
/// average, e.g. an empty sheet. Total revenue is then zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Kpis {
    pub total_revenue: f64,
    pub average_cpa: Option<f64>,
    pub average_roi: Option<f64>,
}

pub fn compute_kpis(enrollment: &[EnrollmentRecord]) -> Kpis {
    Kpis {
        total_revenue: sum_of(enrollment.iter().map(|r| r.revenue_per_customer)),
        average_cpa: mean_of(enrollment.iter().map(|r| r.cost_per_acquisition)),
        average_roi: mean_of(enrollment.iter().map(|r| r.roi_by_channel)),
    }
}

impl Kpis {
    pub fn total_revenue_label(&self) -> String {
        currency(self.total_revenue)
    }

    pub fn average_cpa_label(&self) -> String {
        self.average_cpa.map_or_else(not_available, currency)
    }

    pub fn average_roi_label(&self) -> String {
        self.average_roi
            .map_or_else(not_available, |roi| format!("{:.2}%", roi * 100.0))
    }
}

fn not_available() -> String {
    "N/A".to_string()
}

/// `$1,234.56`
pub fn currency(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}${grouped}.{:02}", cents % 100)
}
