pub mod extract;
pub mod grading;
pub mod prompt;
pub mod report_writer;

pub use grading::{ChatBackend, GradingService};
pub use report_writer::{GradingStats, ReportWriter};
