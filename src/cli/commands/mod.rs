//! CLI Commands

pub mod analyze;
pub mod batch;
pub mod document;
