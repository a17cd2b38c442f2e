//! Saved research reports
//!
//! Renders `ReportDocument`s into the markdown file format and manages the
//! outputs directory they are written to.

mod render;
mod store;

pub use render::{render_report, report_filename, sanitize_query_prefix};
pub use store::{ReportEntry, ReportStore};

/// Errors raised by the report store
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("report I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("⚠️ Report file not found: {0}")]
    NotFound(String),

    #[error("invalid report name: {0}")]
    InvalidName(String),
}
