use thiserror::Error;

/// Failures of the data layer. Load failures are terminal for the current
/// load; nothing is retried.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("data source '{address}' is unavailable: {reason}")]
    SourceUnavailable { address: String, reason: String },

    #[error("sheet '{0}' not found in workbook")]
    SheetNotFound(String),

    /// A mean was requested over a group with no contributing values. Only
    /// raised inside aggregation, which records the cell as not available.
    #[error("no values to reduce for column '{column}' in group '{group}'")]
    EmptyGroup { group: String, column: String },

    #[error("sheet '{sheet}' has no '{column}' column")]
    MissingColumn { sheet: String, column: String },

    #[error("sheet '{sheet}', row {row}, column '{column}': {reason}")]
    InvalidCell {
        sheet: String,
        row: usize,
        column: String,
        reason: String,
    },

    #[error("unreadable workbook: {0}")]
    Workbook(#[from] calamine::XlsxError),
}

pub type Result<T> = std::result::Result<T, DashboardError>;
