pub mod record;

pub use record::{GradingEvent, GradingRecord};
