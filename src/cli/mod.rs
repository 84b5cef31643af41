//! CLI Layer
//!
//! Command handlers and console output helpers.

pub mod commands;
pub mod output;
