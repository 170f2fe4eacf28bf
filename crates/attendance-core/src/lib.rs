//! Shared types for the attendance aggregation engine.
//!
//! Holds the data model, the floor ordering, the file-name date resolver,
//! the error taxonomy, engine configuration and the CLI settings layer.

pub mod config;
pub mod dates;
pub mod error;
pub mod floor;
pub mod models;
pub mod report;
pub mod settings;

pub use error::{AttendanceError, Result};
