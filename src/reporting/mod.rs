//! Batched reporting to the backend.

pub mod batch;
pub mod reports;

pub use batch::BatchReporter;
pub use reports::{MessageReports, ReportSink};
