//! Runtime orchestration layer for Meterline.
//!
//! Coordinates artifact caching and the batch run: per-file normalization
//! with failure isolation, followed by aggregation and the daily summary.

pub mod cache;
pub mod orchestrator;

pub use meter_core as core;
pub use meter_data as data;
