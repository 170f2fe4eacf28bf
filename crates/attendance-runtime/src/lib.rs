//! Runtime layer: a caller-owned report cache over the attendance analyses.

pub mod data_manager;

pub use data_manager::{FileSetKey, ReportManager};
pub use attendance_data as data;
