//! Run Monitoring Module
//!
//! Renders human-readable summaries of execution records.
//!
//! # Components
//!
//! - [`RunReport`]: Per-step status table with attempts and durations

pub mod report;

pub use report::{RunReport, StepLine};
