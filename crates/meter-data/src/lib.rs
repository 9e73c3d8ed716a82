//! Data ingestion layer for Meterline.
//!
//! Responsible for discovering and reading vendor CSV exports, locating and
//! validating their headers, normalizing rows into interval records, and
//! producing the aggregate and daily-summary artifacts.

pub mod aggregate;
pub mod header;
pub mod normalize;
pub mod pipeline;
pub mod reader;
pub mod summary;

pub use meter_core as core;
