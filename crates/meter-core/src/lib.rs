//! Core domain layer for Meterline.
//!
//! Defines the vendor export schema, the canonical interval record and
//! daily-total models, the shared error type, and the small time, statistics
//! and formatting helpers used by the ingestion and runtime layers.

pub mod error;
pub mod formatting;
pub mod models;
pub mod rolling;
pub mod schema;
pub mod settings;
pub mod time_utils;
