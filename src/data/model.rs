use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

// ---------------------------------------------------------------------------
// Column names as they appear in the workbook
// ---------------------------------------------------------------------------

pub mod columns {
    pub const AGE: &str = "Age";
    pub const GENDER: &str = "Gender";
    pub const EDUCATION_LEVEL: &str = "Education Level";
    pub const INDUSTRY: &str = "Industry";

    pub const COMPETITOR_NAME: &str = "Competitor Name";
    pub const COURSE_PRICE: &str = "Course Price";
    pub const ENROLLMENT_NUMBERS: &str = "Enrollment Numbers";

    pub const CAMPAIGN_TYPE: &str = "Campaign Type";
    pub const AD_SPEND: &str = "Ad Spend";
    pub const CTR: &str = "CTR";
    pub const CONVERSION_RATE: &str = "Conversion Rate";

    pub const FEATURE_MENTORSHIP: &str = "Feature Importance (Mentorship)";
    pub const FEATURE_PROJECTS: &str = "Feature Importance (Projects)";
    pub const FEATURE_JOB_ASSISTANCE: &str = "Feature Importance (Job Assistance)";

    pub const ENROLLMENT_DATE: &str = "Enrollment Date";
    pub const REVENUE_PER_CUSTOMER: &str = "Revenue Per Customer";
    pub const COST_PER_ACQUISITION: &str = "Cost Per Acquisition (CPA)";
    pub const ROI_BY_CHANNEL: &str = "ROI by Channel";
}

/// Sheet names of the marketing workbook.
pub mod sheets {
    pub const CUSTOMERS: &str = "Customer Information";
    pub const COMPETITORS: &str = "Competitor Information";
    pub const MARKETING: &str = "Marketing Data";
    pub const SURVEY: &str = "Survey Data";
    pub const ENROLLMENT: &str = "Enrollment and Revenue Metrics";
}

// ---------------------------------------------------------------------------
// CellValue – a single cell of a sheet
// ---------------------------------------------------------------------------

/// A dynamically-typed spreadsheet cell: numeric, categorical, or date.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDate),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Number(v) if v.fract() == 0.0 && v.abs() < 1e15 => write!(f, "{v:.0}"),
            CellValue::Number(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            CellValue::Null => Ok(()),
        }
    }
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

// ---------------------------------------------------------------------------
// Table – one raw sheet
// ---------------------------------------------------------------------------

/// A sheet as read from the workbook: header order plus one map per row.
#[derive(Debug, Clone, Default)]
pub struct Table {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<SheetRow>,
}

/// One non-blank data row.
#[derive(Debug, Clone, Default)]
pub struct SheetRow {
    /// 1-based row number as shown by a spreadsheet application.
    pub number: usize,
    pub cells: BTreeMap<String, CellValue>,
}

impl Table {
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }
}

// ---------------------------------------------------------------------------
// Typed records
// ---------------------------------------------------------------------------

/// One enrolled individual. Columns beyond the four filter fields are kept
/// untouched in `extra` so the filtered table can show the whole row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerRecord {
    #[serde(rename = "Age")]
    pub age: Option<f64>,
    #[serde(rename = "Gender")]
    pub gender: String,
    #[serde(rename = "Education Level")]
    pub education_level: String,
    #[serde(rename = "Industry")]
    pub industry: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, CellValue>,
}

impl CustomerRecord {
    /// Cell for any column of the source sheet, typed fields included.
    pub fn cell(&self, column: &str) -> CellValue {
        match column {
            columns::AGE => self.age.map_or(CellValue::Null, CellValue::Number),
            columns::GENDER => CellValue::Text(self.gender.clone()),
            columns::EDUCATION_LEVEL => CellValue::Text(self.education_level.clone()),
            columns::INDUSTRY => CellValue::Text(self.industry.clone()),
            other => self.extra.get(other).cloned().unwrap_or(CellValue::Null),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompetitorRecord {
    pub name: String,
    pub course_price: Option<f64>,
    pub enrollment_numbers: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketingRecord {
    pub campaign_type: String,
    pub ad_spend: Option<f64>,
    pub ctr: Option<f64>,
    pub conversion_rate: Option<f64>,
}

/// Feature importance scores from one survey response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurveyRecord {
    pub mentorship: Option<f64>,
    pub projects: Option<f64>,
    pub job_assistance: Option<f64>,
}

/// A blank date keeps the row in the KPIs but out of the per-date summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrollmentRecord {
    pub enrollment_date: Option<NaiveDate>,
    pub revenue_per_customer: Option<f64>,
    pub cost_per_acquisition: Option<f64>,
    pub roi_by_channel: Option<f64>,
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded workbook
// ---------------------------------------------------------------------------

/// All five sheets, typed. Read-only once loaded.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// Header order of the customer sheet, used for tables and CSV export.
    pub customer_columns: Vec<String>,
    pub customers: Vec<CustomerRecord>,
    pub competitors: Vec<CompetitorRecord>,
    pub marketing: Vec<MarketingRecord>,
    pub survey: Vec<SurveyRecord>,
    pub enrollment: Vec<EnrollmentRecord>,
}

impl Dataset {
    /// Number of customer rows.
    pub fn len(&self) -> usize {
        self.customers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.customers.is_empty()
    }
}
