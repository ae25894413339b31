use std::collections::BTreeMap;
use std::io::Cursor;
use std::time::Duration;

use calamine::{open_workbook_from_rs, Data, DataType, Reader, Xlsx};
use chrono::NaiveDate;

use super::model::{
    columns, sheets, CellValue, CompetitorRecord, CustomerRecord, Dataset, EnrollmentRecord,
    MarketingRecord, SheetRow, SurveyRecord, Table,
};
use super::source::DataSource;
use crate::error::{DashboardError, Result};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Fetch the workbook once and load all five sheets.
///
/// Any failure (fetch, missing sheet, malformed cell) aborts the whole load;
/// a partially loaded dataset is never returned.
pub fn load_dataset(source: &DataSource, timeout: Duration) -> Result<Dataset> {
    let bytes = source.fetch(timeout)?;
    let mut workbook = Workbook::from_bytes(bytes)?;
    dataset_from_workbook(&mut workbook)
}

pub fn dataset_from_workbook(workbook: &mut Workbook) -> Result<Dataset> {
    let customers = workbook.load_sheet(sheets::CUSTOMERS)?;
    let competitors = workbook.load_sheet(sheets::COMPETITORS)?;
    let marketing = workbook.load_sheet(sheets::MARKETING)?;
    let survey = workbook.load_sheet(sheets::SURVEY)?;
    let enrollment = workbook.load_sheet(sheets::ENROLLMENT)?;

    Ok(Dataset {
        customer_columns: customers.columns.clone(),
        customers: customers_from_table(&customers)?,
        competitors: competitors_from_table(&competitors)?,
        marketing: marketing_from_table(&marketing)?,
        survey: survey_from_table(&survey)?,
        enrollment: enrollment_from_table(&enrollment)?,
    })
}

// ---------------------------------------------------------------------------
// Workbook – raw sheet access
// ---------------------------------------------------------------------------

/// An opened `.xlsx` workbook held in memory.
pub struct Workbook {
    inner: Xlsx<Cursor<Vec<u8>>>,
}

impl Workbook {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let inner: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes))?;
        Ok(Self { inner })
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.inner.sheet_names()
    }

    /// Read one sheet. The first row is the header; fully blank rows are
    /// skipped.
    pub fn load_sheet(&mut self, name: &str) -> Result<Table> {
        if !self.sheet_names().iter().any(|s| s == name) {
            return Err(DashboardError::SheetNotFound(name.to_string()));
        }
        let range = self.inner.worksheet_range(name)?;
        // 0-based worksheet row of the header; the range starts at the first used cell.
        let header_row = range.start().map_or(0, |(row, _)| row as usize);
        let mut rows = range.rows();

        let columns: Vec<String> = match rows.next() {
            Some(header) => header
                .iter()
                .enumerate()
                .map(|(i, cell)| match cell {
                    Data::Empty => format!("Unnamed: {i}"),
                    other => other.to_string().trim().to_string(),
                })
                .collect(),
            None => Vec::new(),
        };

        let mut records = Vec::new();
        for (offset, row) in rows.enumerate() {
            let cells: Vec<CellValue> = row.iter().map(to_cell).collect();
            if cells.iter().all(CellValue::is_null) {
                continue;
            }
            let cells: BTreeMap<String, CellValue> = columns
                .iter()
                .cloned()
                .zip(cells.into_iter().chain(std::iter::repeat(CellValue::Null)))
                .collect();
            records.push(SheetRow {
                number: header_row + offset + 2,
                cells,
            });
        }

        log::info!("Loaded sheet '{name}': {} rows, columns {columns:?}", records.len());
        Ok(Table {
            name: name.to_string(),
            columns,
            rows: records,
        })
    }
}

fn to_cell(data: &Data) -> CellValue {
    match data {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                CellValue::Null
            } else if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                CellValue::Date(d)
            } else {
                CellValue::Text(s.to_string())
            }
        }
        Data::DateTime(_) | Data::DateTimeIso(_) => {
            data.as_date().map_or(CellValue::Null, CellValue::Date)
        }
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => {
            log::debug!("Cell error {e:?} read as blank");
            CellValue::Null
        }
        Data::Empty => CellValue::Null,
    }
}

// ---------------------------------------------------------------------------
// Typed conversion
// ---------------------------------------------------------------------------

/// Column-checked accessor over a raw sheet.
struct SheetReader<'a> {
    table: &'a Table,
}

impl<'a> SheetReader<'a> {
    fn new(table: &'a Table, required: &[&str]) -> Result<Self> {
        if let Some(missing) = required.iter().find(|c| !table.has_column(c)) {
            return Err(DashboardError::MissingColumn {
                sheet: table.name.clone(),
                column: missing.to_string(),
            });
        }
        Ok(Self { table })
    }

    /// `(worksheet row number, cells)` for every data row.
    fn rows(&self) -> impl Iterator<Item = (usize, &'a BTreeMap<String, CellValue>)> {
        self.table.rows.iter().map(|row| (row.number, &row.cells))
    }

    fn invalid(&self, row: usize, column: &str, reason: String) -> DashboardError {
        DashboardError::InvalidCell {
            sheet: self.table.name.clone(),
            row,
            column: column.to_string(),
            reason,
        }
    }

    /// Blank cells are absent values, not errors.
    fn number(&self, row: usize, record: &BTreeMap<String, CellValue>, column: &str) -> Result<Option<f64>> {
        match record.get(column).unwrap_or(&CellValue::Null) {
            CellValue::Null => Ok(None),
            CellValue::Number(v) => Ok(Some(*v)),
            CellValue::Text(s) => parse_number(s)
                .map(Some)
                .ok_or_else(|| self.invalid(row, column, format!("'{s}' is not a number"))),
            other => Err(self.invalid(row, column, format!("expected a number, found '{other}'"))),
        }
    }

    fn text(&self, record: &BTreeMap<String, CellValue>, column: &str) -> String {
        record
            .get(column)
            .map(|v| v.to_string())
            .unwrap_or_default()
    }

    /// Blank cells are absent dates; anything else must read as a date.
    fn date(&self, row: usize, record: &BTreeMap<String, CellValue>, column: &str) -> Result<Option<NaiveDate>> {
        match record.get(column).unwrap_or(&CellValue::Null) {
            CellValue::Null => Ok(None),
            CellValue::Date(d) => Ok(Some(*d)),
            CellValue::Number(serial) => excel_serial_to_date(*serial)
                .map(Some)
                .ok_or_else(|| self.invalid(row, column, format!("{serial} is not a date serial"))),
            CellValue::Text(s) => parse_date(s)
                .map(Some)
                .ok_or_else(|| self.invalid(row, column, format!("'{s}' is not a date"))),
            other => Err(self.invalid(row, column, format!("expected a date, found '{other}'"))),
        }
    }
}

fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim().trim_start_matches('$').replace(',', "");
    match s.strip_suffix('%') {
        Some(pct) => pct.trim().parse::<f64>().ok().map(|v| v / 100.0),
        None => s.parse::<f64>().ok(),
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s.trim(), fmt).ok())
}

/// Excel's 1900 date system, counted from 1899-12-30.
fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    NaiveDate::from_ymd_opt(1899, 12, 30)?
        .checked_add_days(chrono::Days::new(serial.trunc() as u64))
}

fn customers_from_table(table: &Table) -> Result<Vec<CustomerRecord>> {
    let typed = [
        columns::AGE,
        columns::GENDER,
        columns::EDUCATION_LEVEL,
        columns::INDUSTRY,
    ];
    let reader = SheetReader::new(table, &typed)?;
    reader
        .rows()
        .map(|(i, rec)| {
            let extra = rec
                .iter()
                .filter(|(col, _)| !typed.contains(&col.as_str()))
                .map(|(col, val)| (col.clone(), val.clone()))
                .collect();
            Ok(CustomerRecord {
                age: reader.number(i, rec, columns::AGE)?,
                gender: reader.text(rec, columns::GENDER),
                education_level: reader.text(rec, columns::EDUCATION_LEVEL),
                industry: reader.text(rec, columns::INDUSTRY),
                extra,
            })
        })
        .collect()
}

fn competitors_from_table(table: &Table) -> Result<Vec<CompetitorRecord>> {
    let reader = SheetReader::new(
        table,
        &[columns::COMPETITOR_NAME, columns::COURSE_PRICE, columns::ENROLLMENT_NUMBERS],
    )?;
    reader
        .rows()
        .map(|(i, rec)| {
            Ok(CompetitorRecord {
                name: reader.text(rec, columns::COMPETITOR_NAME),
                course_price: reader.number(i, rec, columns::COURSE_PRICE)?,
                enrollment_numbers: reader.number(i, rec, columns::ENROLLMENT_NUMBERS)?,
            })
        })
        .collect()
}

fn marketing_from_table(table: &Table) -> Result<Vec<MarketingRecord>> {
    let reader = SheetReader::new(
        table,
        &[
            columns::CAMPAIGN_TYPE,
            columns::AD_SPEND,
            columns::CTR,
            columns::CONVERSION_RATE,
        ],
    )?;
    reader
        .rows()
        .map(|(i, rec)| {
            Ok(MarketingRecord {
                campaign_type: reader.text(rec, columns::CAMPAIGN_TYPE),
                ad_spend: reader.number(i, rec, columns::AD_SPEND)?,
                ctr: reader.number(i, rec, columns::CTR)?,
                conversion_rate: reader.number(i, rec, columns::CONVERSION_RATE)?,
            })
        })
        .collect()
}

fn survey_from_table(table: &Table) -> Result<Vec<SurveyRecord>> {
    let reader = SheetReader::new(
        table,
        &[
            columns::FEATURE_MENTORSHIP,
            columns::FEATURE_PROJECTS,
            columns::FEATURE_JOB_ASSISTANCE,
        ],
    )?;
    reader
        .rows()
        .map(|(i, rec)| {
            Ok(SurveyRecord {
                mentorship: reader.number(i, rec, columns::FEATURE_MENTORSHIP)?,
                projects: reader.number(i, rec, columns::FEATURE_PROJECTS)?,
                job_assistance: reader.number(i, rec, columns::FEATURE_JOB_ASSISTANCE)?,
            })
        })
        .collect()
}

fn enrollment_from_table(table: &Table) -> Result<Vec<EnrollmentRecord>> {
    let reader = SheetReader::new(
        table,
        &[
            columns::ENROLLMENT_DATE,
            columns::REVENUE_PER_CUSTOMER,
            columns::COST_PER_ACQUISITION,
            columns::ROI_BY_CHANNEL,
        ],
    )?;
    reader
        .rows()
        .map(|(i, rec)| {
            Ok(EnrollmentRecord {
                enrollment_date: reader.date(i, rec, columns::ENROLLMENT_DATE)?,
                revenue_per_customer: reader.number(i, rec, columns::REVENUE_PER_CUSTOMER)?,
                cost_per_acquisition: reader.number(i, rec, columns::COST_PER_ACQUISITION)?,
                roi_by_channel: reader.number(i, rec, columns::ROI_BY_CHANNEL)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::{sample_workbook_bytes, workbook_bytes, Cell};

    #[test]
    fn loads_all_five_sheets() {
        let mut wb = Workbook::from_bytes(sample_workbook_bytes()).unwrap();
        let ds = dataset_from_workbook(&mut wb).unwrap();

        assert_eq!(ds.customers.len(), 4);
        assert_eq!(ds.competitors.len(), 3);
        assert_eq!(ds.marketing.len(), 3);
        assert_eq!(ds.survey.len(), 2);
        assert_eq!(ds.enrollment.len(), 3);

        let first = &ds.customers[0];
        assert_eq!(first.age, Some(25.0));
        assert_eq!(first.gender, "F");
        assert_eq!(first.extra.get("Customer ID"), Some(&CellValue::Text("C1".into())));
        assert_eq!(ds.customer_columns[0], "Customer ID");

        // first row is a formatted Excel date cell, second a date string
        assert_eq!(ds.enrollment[0].enrollment_date, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(ds.enrollment[1].enrollment_date, NaiveDate::from_ymd_opt(2024, 1, 2));
    }

    #[test]
    fn excel_date_cells_load_as_dates() {
        let bytes = workbook_bytes(&[(
            sheets::ENROLLMENT,
            &[
                "Enrollment Date",
                "Revenue Per Customer",
                "Cost Per Acquisition (CPA)",
                "ROI by Channel",
            ],
            vec![vec![Cell::Date(45352.0), Cell::N(10.0), Cell::N(1.0), Cell::N(0.5)]],
        )]);
        let mut wb = Workbook::from_bytes(bytes).unwrap();
        let table = wb.load_sheet(sheets::ENROLLMENT).unwrap();
        assert_eq!(
            table.rows[0].cells[columns::ENROLLMENT_DATE],
            CellValue::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
        );
        let rows = enrollment_from_table(&table).unwrap();
        assert_eq!(rows[0].enrollment_date, NaiveDate::from_ymd_opt(2024, 3, 1));
    }

    #[test]
    fn blank_enrollment_date_keeps_the_row() {
        let bytes = workbook_bytes(&[(
            sheets::ENROLLMENT,
            &[
                "Enrollment Date",
                "Revenue Per Customer",
                "Cost Per Acquisition (CPA)",
                "ROI by Channel",
            ],
            vec![
                vec![Cell::S("2024-01-01"), Cell::N(100.0), Cell::N(10.0), Cell::N(0.1)],
                vec![Cell::Blank, Cell::N(200.0), Cell::N(30.0), Cell::N(0.3)],
            ],
        )]);
        let mut wb = Workbook::from_bytes(bytes).unwrap();
        let table = wb.load_sheet(sheets::ENROLLMENT).unwrap();
        let rows = enrollment_from_table(&table).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].enrollment_date, None);
        assert_eq!(rows[1].revenue_per_customer, Some(200.0));
    }

    #[test]
    fn missing_sheet_is_reported_by_name() {
        let bytes = workbook_bytes(&[(
            sheets::CUSTOMERS,
            &["Age", "Gender", "Education Level", "Industry"],
            vec![],
        )]);
        let mut wb = Workbook::from_bytes(bytes).unwrap();
        match dataset_from_workbook(&mut wb) {
            Err(DashboardError::SheetNotFound(name)) => assert_eq!(name, sheets::COMPETITORS),
            other => panic!("expected SheetNotFound, got {other:?}"),
        }
    }

    #[test]
    fn missing_column_is_rejected() {
        let bytes = workbook_bytes(&[(sheets::COMPETITORS, &["Competitor Name", "Course Price"], vec![])]);
        let mut wb = Workbook::from_bytes(bytes).unwrap();
        let table = wb.load_sheet(sheets::COMPETITORS).unwrap();
        match competitors_from_table(&table) {
            Err(DashboardError::MissingColumn { column, .. }) => {
                assert_eq!(column, columns::ENROLLMENT_NUMBERS)
            }
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn blank_numbers_are_absent_and_text_numbers_parse() {
        let bytes = workbook_bytes(&[(
            sheets::MARKETING,
            &["Campaign Type", "Ad Spend", "CTR", "Conversion Rate"],
            vec![vec![Cell::S("Email"), Cell::S("$1,200"), Cell::S("4%"), Cell::Blank]],
        )]);
        let mut wb = Workbook::from_bytes(bytes).unwrap();
        let table = wb.load_sheet(sheets::MARKETING).unwrap();
        let rows = marketing_from_table(&table).unwrap();
        assert_eq!(rows[0].ad_spend, Some(1200.0));
        assert_eq!(rows[0].ctr, Some(0.04));
        assert_eq!(rows[0].conversion_rate, None);
    }

    #[test]
    fn non_numeric_cell_is_invalid_at_its_worksheet_row() {
        // header on row 1, a good row on 2, a blank row on 3
        let bytes = workbook_bytes(&[(
            sheets::COMPETITORS,
            &["Competitor Name", "Course Price", "Enrollment Numbers"],
            vec![
                vec![Cell::S("A"), Cell::N(100.0), Cell::N(3.0)],
                vec![],
                vec![Cell::S("B"), Cell::S("cheap"), Cell::N(3.0)],
            ],
        )]);
        let mut wb = Workbook::from_bytes(bytes).unwrap();
        let table = wb.load_sheet(sheets::COMPETITORS).unwrap();
        assert_eq!(table.rows.len(), 2);
        match competitors_from_table(&table) {
            Err(DashboardError::InvalidCell { row, column, .. }) => {
                assert_eq!(row, 4);
                assert_eq!(column, columns::COURSE_PRICE);
            }
            other => panic!("expected InvalidCell, got {other:?}"),
        }
    }

    #[test]
    fn excel_serials_convert_to_dates() {
        assert_eq!(
            excel_serial_to_date(45292.0),
            NaiveDate::from_ymd_opt(2024, 1, 1)
        );
        assert_eq!(excel_serial_to_date(0.0), None);
    }

    #[test]
    fn garbage_bytes_are_not_a_workbook() {
        assert!(matches!(
            Workbook::from_bytes(b"not a zip".to_vec()),
            Err(DashboardError::Workbook(_))
        ));
    }
}
