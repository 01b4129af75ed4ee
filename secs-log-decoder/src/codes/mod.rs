//! Code tables: CEID names, RPTID layouts and alarm definitions
//!
//! This module contains the static equipment tables and the unified lookup
//! structure the parser, normalizer and KPI engine share.

pub mod database;
pub mod tables;

// Re-export key types for convenience
pub use database::{
    is_alarm_set_name, AlarmDefinition, CodeTableStats, CodeTables, ReportDefinition, Severity,
};
