use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{DashboardError, Result};

// ---------------------------------------------------------------------------
// DataSource – where the workbook lives
// ---------------------------------------------------------------------------

/// Address of the marketing workbook: a local file or a URL.
///
/// Remote addresses are normalised on parse, so a GitHub blob link, its raw
/// counterpart and a Google Sheets edit link all resolve to something that
/// serves the `.xlsx` bytes directly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataSource {
    Local(PathBuf),
    Remote(String),
}

impl DataSource {
    pub fn parse(address: &str) -> Self {
        let address = address.trim();
        if address.starts_with("http://") || address.starts_with("https://") {
            DataSource::Remote(normalise_url(address))
        } else {
            DataSource::Local(PathBuf::from(address))
        }
    }

    /// Read the whole workbook in one blocking call. No retries.
    pub fn fetch(&self, timeout: Duration) -> Result<Vec<u8>> {
        let bytes = match self {
            DataSource::Local(path) => {
                std::fs::read(path).map_err(|e| self.unavailable(e.to_string()))?
            }
            DataSource::Remote(url) => {
                let client = reqwest::blocking::Client::builder()
                    .timeout(timeout)
                    .build()
                    .map_err(|e| self.unavailable(e.to_string()))?;
                let response = client
                    .get(url)
                    .send()
                    .map_err(|e| self.unavailable(e.to_string()))?;
                let status = response.status();
                if !status.is_success() {
                    return Err(self.unavailable(format!("HTTP status {status}")));
                }
                response
                    .bytes()
                    .map_err(|e| self.unavailable(e.to_string()))?
                    .to_vec()
            }
        };
        log::info!("Fetched {} bytes from {self}", bytes.len());
        Ok(bytes)
    }

    fn unavailable(&self, reason: String) -> DashboardError {
        DashboardError::SourceUnavailable {
            address: self.to_string(),
            reason,
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Local(path) => write!(f, "{}", path.display()),
            DataSource::Remote(url) => write!(f, "{url}"),
        }
    }
}

// -- URL rewriting --

fn normalise_url(url: &str) -> String {
    if let Some(rest) = url.strip_prefix("https://github.com/") {
        // <owner>/<repo>/blob/<ref>/<path>
        let parts: Vec<&str> = rest.splitn(4, '/').collect();
        if parts.len() == 4 && parts[2] == "blob" {
            let (owner, repo, tail) = (parts[0], parts[1], parts[3]);
            let tail = tail.split(['?', '#']).next().unwrap_or(tail);
            return format!("https://raw.githubusercontent.com/{owner}/{repo}/{tail}");
        }
    }

    if let Some(rest) = url.strip_prefix("https://docs.google.com/spreadsheets/d/") {
        let id = rest.split(['/', '?', '#']).next().unwrap_or("");
        if !id.is_empty() {
            return format!("https://docs.google.com/spreadsheets/d/{id}/export?format=xlsx");
        }
    }

    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn plain_paths_are_local() {
        assert_eq!(
            DataSource::parse("Dataset Marketing.xlsx"),
            DataSource::Local(PathBuf::from("Dataset Marketing.xlsx"))
        );
    }

    #[test]
    fn github_blob_links_become_raw() {
        let src = DataSource::parse(
            "https://github.com/acme/dash/blob/main/Dataset%20Marketing.xlsx?raw=true",
        );
        assert_eq!(
            src,
            DataSource::Remote(
                "https://raw.githubusercontent.com/acme/dash/main/Dataset%20Marketing.xlsx".into()
            )
        );
    }

    #[test]
    fn raw_links_are_untouched() {
        let url = "https://raw.githubusercontent.com/acme/dash/main/data.xlsx";
        assert_eq!(DataSource::parse(url), DataSource::Remote(url.into()));
    }

    #[test]
    fn google_sheet_edit_links_export_xlsx() {
        let src = DataSource::parse(
            "https://docs.google.com/spreadsheets/d/1AbC/edit?gid=18#gid=18",
        );
        assert_eq!(
            src,
            DataSource::Remote(
                "https://docs.google.com/spreadsheets/d/1AbC/export?format=xlsx".into()
            )
        );
    }

    #[test]
    fn local_fetch_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"workbook").unwrap();
        let src = DataSource::Local(file.path().to_path_buf());
        assert_eq!(src.fetch(Duration::from_secs(1)).unwrap(), b"workbook");
    }

    #[test]
    fn missing_local_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let src = DataSource::Local(dir.path().join("absent.xlsx"));
        let err = src.fetch(Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, DashboardError::SourceUnavailable { .. }));
    }
}
