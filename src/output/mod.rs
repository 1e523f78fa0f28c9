mod report;
mod summary;

pub use report::{render_comparison, render_document, write_document};
pub use summary::{write_summary, ReportSummary, SummaryReport};
