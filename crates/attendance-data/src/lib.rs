//! Data layer of the attendance aggregation engine.
//!
//! Discovers and reads daily CSV sheets, normalizes their rows, and runs the
//! per-day, monthly and cross-day analyses that feed report assembly.

pub mod analysis;
pub mod calendar;
pub mod daily;
pub mod grouper;
pub mod locations;
pub mod normalizer;
pub mod reader;
pub mod reducer;
pub mod trend;

#[cfg(test)]
mod testing;

pub use attendance_core as core;
