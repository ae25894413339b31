use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::data::source::DataSource;

/// Workbook published alongside the original dashboard.
pub const DEFAULT_SOURCE: &str =
    "https://raw.githubusercontent.com/vaidyamohit/Marketing-Dashboard/main/Dataset%20Marketing.xlsx";

#[derive(Debug, Clone, Parser)]
#[command(name = "career-dash", version, about = "Career Accelerator Program dashboard")]
pub struct Config {
    /// Workbook location: a local .xlsx path, a raw URL, a GitHub blob link
    /// or a Google Sheets link.
    #[arg(long, env = "CAREER_DASH_SOURCE", default_value = DEFAULT_SOURCE)]
    pub source: String,

    /// HTTP timeout for remote workbooks, in seconds.
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Write the JSON report for the initial selection to PATH and exit
    /// without opening a window.
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,
}

impl Config {
    pub fn data_source(&self) -> DataSource {
        DataSource::parse(&self.source)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
