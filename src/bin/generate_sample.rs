use career_dash::data::model::{columns, sheets};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn header(ws: &mut Worksheet, names: &[&str]) -> Result<(), XlsxError> {
    let bold = Format::new().set_bold();
    for (c, name) in names.iter().enumerate() {
        ws.write_string_with_format(0, c as u16, *name, &bold)?;
    }
    Ok(())
}

fn customers(ws: &mut Worksheet, rng: &mut SimpleRng) -> Result<(), XlsxError> {
    ws.set_name(sheets::CUSTOMERS)?;
    header(
        ws,
        &[
            "Customer ID",
            columns::AGE,
            columns::GENDER,
            columns::EDUCATION_LEVEL,
            columns::INDUSTRY,
            "Location",
        ],
    )?;
    for r in 1..=200u32 {
        ws.write_string(r, 0, format!("CUST{r:04}"))?;
        ws.write_number(r, 1, rng.uniform(21.0, 55.0).floor())?;
        ws.write_string(r, 2, rng.pick(&["Male", "Female", "Non-binary"]))?;
        ws.write_string(r, 3, rng.pick(&["High School", "Bachelor's", "Master's", "PhD"]))?;
        ws.write_string(r, 4, rng.pick(&["Technology", "Finance", "Healthcare", "Education", "Retail"]))?;
        ws.write_string(r, 5, rng.pick(&["Mumbai", "Delhi", "Bangalore", "Pune", "Chennai"]))?;
    }
    Ok(())
}

fn competitors(ws: &mut Worksheet, rng: &mut SimpleRng) -> Result<(), XlsxError> {
    ws.set_name(sheets::COMPETITORS)?;
    header(ws, &[columns::COMPETITOR_NAME, columns::COURSE_PRICE, columns::ENROLLMENT_NUMBERS])?;
    let names = ["Upskill Academy", "CareerBoost", "SkillBridge", "NextStep Pro"];
    for r in 1..=24u32 {
        ws.write_string(r, 0, rng.pick(&names))?;
        ws.write_number(r, 1, round2(rng.uniform(300.0, 1500.0)))?;
        ws.write_number(r, 2, rng.uniform(50.0, 900.0).floor())?;
    }
    Ok(())
}

fn marketing(ws: &mut Worksheet, rng: &mut SimpleRng) -> Result<(), XlsxError> {
    ws.set_name(sheets::MARKETING)?;
    header(ws, &[columns::CAMPAIGN_TYPE, columns::AD_SPEND, columns::CTR, columns::CONVERSION_RATE])?;
    let kinds = ["Social Media", "Email", "Search Ads", "Webinar", "Referral"];
    for r in 1..=40u32 {
        ws.write_string(r, 0, rng.pick(&kinds))?;
        ws.write_number(r, 1, round2(rng.uniform(500.0, 10_000.0)))?;
        ws.write_number(r, 2, round2(rng.uniform(0.5, 8.0)) / 100.0)?;
        ws.write_number(r, 3, round2(rng.uniform(0.5, 6.0)) / 100.0)?;
    }
    Ok(())
}

fn survey(ws: &mut Worksheet, rng: &mut SimpleRng) -> Result<(), XlsxError> {
    ws.set_name(sheets::SURVEY)?;
    header(
        ws,
        &[
            columns::FEATURE_MENTORSHIP,
            columns::FEATURE_PROJECTS,
            columns::FEATURE_JOB_ASSISTANCE,
        ],
    )?;
    for r in 1..=120u32 {
        for c in 0..3u16 {
            ws.write_number(r, c, rng.uniform(1.0, 6.0).floor())?;
        }
    }
    Ok(())
}

fn enrollment(ws: &mut Worksheet, rng: &mut SimpleRng) -> Result<(), XlsxError> {
    ws.set_name(sheets::ENROLLMENT)?;
    header(
        ws,
        &[
            columns::ENROLLMENT_DATE,
            columns::REVENUE_PER_CUSTOMER,
            columns::COST_PER_ACQUISITION,
            columns::ROI_BY_CHANNEL,
        ],
    )?;
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    // 2024-01-01 in Excel's 1900 date system.
    let first_day = 45292.0;
    for r in 1..=90u32 {
        let day = first_day + (rng.next_u64() % 30) as f64;
        ws.write_number_with_format(r, 0, day, &date_format)?;
        ws.write_number(r, 1, round2(rng.uniform(400.0, 2000.0)))?;
        ws.write_number(r, 2, round2(rng.uniform(40.0, 300.0)))?;
        ws.write_number(r, 3, round2(rng.uniform(-0.2, 1.5)))?;
    }
    Ok(())
}

fn main() -> Result<(), XlsxError> {
    let mut rng = SimpleRng::new(42);
    let mut workbook = Workbook::new();

    customers(workbook.add_worksheet(), &mut rng)?;
    competitors(workbook.add_worksheet(), &mut rng)?;
    marketing(workbook.add_worksheet(), &mut rng)?;
    survey(workbook.add_worksheet(), &mut rng)?;
    enrollment(workbook.add_worksheet(), &mut rng)?;

    let output_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "sample_marketing.xlsx".to_string());
    workbook.save(&output_path)?;

    println!("Wrote sample marketing workbook to {output_path}");
    Ok(())
}
