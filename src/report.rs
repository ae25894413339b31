use std::fmt::Display;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use crate::data::aggregate::Aggregation;
use crate::data::filter::FilterCriteria;
use crate::data::kpi::Kpis;
use crate::data::model::{columns, CustomerRecord, Dataset};
use crate::data::view::ViewModel;

// ---------------------------------------------------------------------------
// JSON report
// ---------------------------------------------------------------------------

/// Everything shown on screen for one selection, ready for a presentation.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub source: String,
    pub generated_at: String,
    pub criteria: &'a FilterCriteria,
    pub filtered_customers: Vec<&'a CustomerRecord>,
    pub competitor_insights: Vec<Map<String, JsonValue>>,
    pub marketing_performance: Vec<Map<String, JsonValue>>,
    pub survey_insights: Map<String, JsonValue>,
    pub enrollment_insights: Vec<Map<String, JsonValue>>,
    pub kpis: &'a Kpis,
}

impl<'a> Report<'a> {
    pub fn new(source: impl Display, dataset: &'a Dataset, view: &'a ViewModel) -> Self {
        let survey_insights = view
            .survey
            .entries()
            .into_iter()
            .map(|(name, mean)| (name.to_string(), json_number(mean)))
            .collect();

        Report {
            source: source.to_string(),
            generated_at: chrono::Local::now().to_rfc3339(),
            criteria: &view.criteria,
            filtered_customers: view.filtered_customers(dataset).collect(),
            competitor_insights: aggregation_rows(&view.competitors, columns::COMPETITOR_NAME),
            marketing_performance: aggregation_rows(&view.marketing, columns::CAMPAIGN_TYPE),
            survey_insights,
            enrollment_insights: aggregation_rows(&view.enrollment, columns::ENROLLMENT_DATE),
            kpis: &view.kpis,
        }
    }
}

/// One JSON object per group: the key under `key_column`, then each reduced
/// column.
fn aggregation_rows<K: Ord + Display>(agg: &Aggregation<K>, key_column: &str) -> Vec<Map<String, JsonValue>> {
    agg.groups
        .iter()
        .map(|(key, values)| {
            let mut row = Map::new();
            row.insert(key_column.to_string(), JsonValue::String(key.to_string()));
            for (col, v) in agg.columns.iter().zip(values) {
                row.insert(col.clone(), json_number(*v));
            }
            row
        })
        .collect()
}

fn json_number(v: Option<f64>) -> JsonValue {
    v.and_then(serde_json::Number::from_f64)
        .map_or(JsonValue::Null, JsonValue::Number)
}

pub fn write_report(path: &Path, report: &Report<'_>) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("creating report file {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), report).context("writing JSON report")?;
    log::info!(
        "Report with {} filtered customers written to {}",
        report.filtered_customers.len(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// CSV export
// ---------------------------------------------------------------------------

/// Write the filtered customer rows in the sheet's column order. Returns the
/// number of data rows written.
pub fn export_filtered_csv(path: &Path, dataset: &Dataset, view: &ViewModel) -> Result<usize> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating CSV file {}", path.display()))?;
    writer
        .write_record(&dataset.customer_columns)
        .context("writing CSV header")?;

    let mut n = 0;
    for customer in view.filtered_customers(dataset) {
        let record: Vec<String> = dataset
            .customer_columns
            .iter()
            .map(|col| customer.cell(col).to_string())
            .collect();
        writer.write_record(&record).context("writing CSV row")?;
        n += 1;
    }
    writer.flush().context("flushing CSV")?;
    log::info!("Exported {n} customers to {}", path.display());
    Ok(n)
}
