//! wxticker library
//!
//! Fetches current weather and equity price series, normalizes them, and
//! derives price metrics. The binary wraps this in a terminal dashboard.

pub mod analytics;
pub mod app;
pub mod cache;
pub mod cli;
pub mod dashboard;
pub mod data;
pub mod telemetry;
pub mod ui;
