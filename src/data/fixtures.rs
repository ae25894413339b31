//! Shared test data: a small in-memory workbook and its typed equivalent.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_xlsxwriter::{Format, Workbook};

use super::model::{
    sheets, CellValue, CompetitorRecord, CustomerRecord, Dataset, EnrollmentRecord,
    MarketingRecord, SurveyRecord,
};

pub enum Cell {
    S(&'static str),
    N(f64),
    /// Excel date serial written with a date number format.
    Date(f64),
    Blank,
}

pub fn workbook_bytes(sheets: &[(&str, &[&str], Vec<Vec<Cell>>)]) -> Vec<u8> {
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let mut workbook = Workbook::new();
    for (name, header, rows) in sheets {
        let ws = workbook.add_worksheet();
        ws.set_name(*name).unwrap();
        for (c, col) in header.iter().enumerate() {
            ws.write_string(0, c as u16, *col).unwrap();
        }
        for (r, row) in rows.iter().enumerate() {
            let r = r as u32 + 1;
            for (c, cell) in row.iter().enumerate() {
                match cell {
                    Cell::S(s) => {
                        ws.write_string(r, c as u16, *s).unwrap();
                    }
                    Cell::N(n) => {
                        ws.write_number(r, c as u16, *n).unwrap();
                    }
                    Cell::Date(serial) => {
                        ws.write_number_with_format(r, c as u16, *serial, &date_format).unwrap();
                    }
                    Cell::Blank => {}
                }
            }
        }
    }
    workbook.save_to_buffer().unwrap()
}

pub fn sample_workbook_bytes() -> Vec<u8> {
    use Cell::{Date, N, S};
    workbook_bytes(&[
        (
            sheets::CUSTOMERS,
            &["Customer ID", "Age", "Gender", "Education Level", "Industry"],
            vec![
                vec![S("C1"), N(25.0), S("F"), S("BA"), S("Tech")],
                vec![S("C2"), N(45.0), S("M"), S("MA"), S("Finance")],
                vec![S("C3"), N(33.0), S("F"), S("MA"), S("Tech")],
                vec![S("C4"), N(38.0), S("M"), S("BA"), S("Retail")],
            ],
        ),
        (
            sheets::COMPETITORS,
            &["Competitor Name", "Course Price", "Enrollment Numbers"],
            vec![
                vec![S("A"), N(100.0), N(10.0)],
                vec![S("A"), N(200.0), N(20.0)],
                vec![S("B"), N(50.0), N(5.0)],
            ],
        ),
        (
            sheets::MARKETING,
            &["Campaign Type", "Ad Spend", "CTR", "Conversion Rate"],
            vec![
                vec![S("Email"), N(100.0), N(0.02), N(0.01)],
                vec![S("Social"), N(300.0), N(0.05), N(0.03)],
                vec![S("Email"), N(200.0), N(0.04), N(0.03)],
            ],
        ),
        (
            sheets::SURVEY,
            &[
                "Feature Importance (Mentorship)",
                "Feature Importance (Projects)",
                "Feature Importance (Job Assistance)",
            ],
            vec![
                vec![N(4.0), N(3.0), N(5.0)],
                vec![N(2.0), N(5.0), N(3.0)],
            ],
        ),
        (
            sheets::ENROLLMENT,
            &[
                "Enrollment Date",
                "Revenue Per Customer",
                "Cost Per Acquisition (CPA)",
                "ROI by Channel",
            ],
            vec![
                // 45292 is 2024-01-01
                vec![Date(45292.0), N(100.0), N(10.0), N(0.1)],
                vec![S("2024-01-02"), N(200.0), N(30.0), N(0.3)],
                vec![Date(45292.0), N(50.0), N(20.0), N(0.2)],
            ],
        ),
    ])
}

pub fn customer(age: f64, gender: &str, education: &str, industry: &str) -> CustomerRecord {
    CustomerRecord {
        age: Some(age),
        gender: gender.into(),
        education_level: education.into(),
        industry: industry.into(),
        extra: BTreeMap::new(),
    }
}

pub fn competitor(name: &str, price: f64, enrolled: f64) -> CompetitorRecord {
    CompetitorRecord {
        name: name.into(),
        course_price: Some(price),
        enrollment_numbers: Some(enrolled),
    }
}

pub fn campaign(kind: &str, spend: f64, ctr: f64, conversion: f64) -> MarketingRecord {
    MarketingRecord {
        campaign_type: kind.into(),
        ad_spend: Some(spend),
        ctr: Some(ctr),
        conversion_rate: Some(conversion),
    }
}

fn response(mentorship: f64, projects: f64, job_assistance: f64) -> SurveyRecord {
    SurveyRecord {
        mentorship: Some(mentorship),
        projects: Some(projects),
        job_assistance: Some(job_assistance),
    }
}

/// Enrollment row dated 2024-01-`day`, or undated for `None`.
pub fn enrollment(day: Option<u32>, revenue: f64, cpa: f64, roi: f64) -> EnrollmentRecord {
    EnrollmentRecord {
        enrollment_date: day.and_then(|d| NaiveDate::from_ymd_opt(2024, 1, d)),
        revenue_per_customer: Some(revenue),
        cost_per_acquisition: Some(cpa),
        roi_by_channel: Some(roi),
    }
}

/// Typed counterpart of [`sample_workbook_bytes`].
pub fn sample_dataset() -> Dataset {
    let mut customers = vec![
        customer(25.0, "F", "BA", "Tech"),
        customer(45.0, "M", "MA", "Finance"),
        customer(33.0, "F", "MA", "Tech"),
        customer(38.0, "M", "BA", "Retail"),
    ];
    for (i, c) in customers.iter_mut().enumerate() {
        c.extra
            .insert("Customer ID".into(), CellValue::Text(format!("C{}", i + 1)));
    }

    Dataset {
        customer_columns: ["Customer ID", "Age", "Gender", "Education Level", "Industry"]
            .map(String::from)
            .to_vec(),
        customers,
        competitors: vec![
            competitor("A", 100.0, 10.0),
            competitor("A", 200.0, 20.0),
            competitor("B", 50.0, 5.0),
        ],
        marketing: vec![
            campaign("Email", 100.0, 0.02, 0.01),
            campaign("Social", 300.0, 0.05, 0.03),
            campaign("Email", 200.0, 0.04, 0.03),
        ],
        survey: vec![response(4.0, 3.0, 5.0), response(2.0, 5.0, 3.0)],
        enrollment: vec![
            enrollment(Some(1), 100.0, 10.0, 0.1),
            enrollment(Some(2), 200.0, 30.0, 0.3),
            enrollment(Some(1), 50.0, 20.0, 0.2),
        ],
    }
}
