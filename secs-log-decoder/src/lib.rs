//! SECS Log Decoder Library
//!
//! A stateless library that turns panel-handler equipment logs (SECS/GEM
//! message traces) into a typed event table and derives operational KPIs from
//! it: job window, downtime with recovery, panel/slot/lot correlation, mapping
//! and cycle times.
//!
//! # Architecture
//!
//! Data flows one way:
//! - `formats` frames timestamped message blocks out of raw log text
//! - `message_decoder` extracts field mappings from event reports and host commands
//! - `normalize` resolves CEIDs and alarm ids through the `codes` tables
//! - `kpi` computes the summary from the resulting event table
//!
//! The library does NOT render or persist anything. All presentation lives in
//! the application layer (secs-log-cli).
//!
//! # Example Usage
//!
//! ```no_run
//! use secs_log_decoder::{AnalyzerConfig, Decoder};
//! use std::path::Path;
//!
//! let mut decoder = Decoder::new();
//! decoder.add_code_table(Path::new("site_alarms.toml")).unwrap();
//!
//! let config = AnalyzerConfig::new()
//!     .with_job_end_events(["LoadToToolCompleted"]);
//!
//! let analysis = decoder.analyze_file(Path::new("equipment.log"), &config).unwrap();
//! println!("Job: {} (lot {})", analysis.summary.job_status, analysis.summary.lot_id);
//! for incident in &analysis.summary.alarms_with_context {
//!     println!("{} {}s {}", incident.alarm_description, incident.duration_sec, incident.context);
//! }
//! ```

// Public modules
pub mod codes;
pub mod config;
pub mod decoder;
pub mod formats;
pub mod kpi;
pub mod message_decoder;
pub mod normalize;
pub mod types;

// Re-export main types for convenience
pub use codes::{CodeTableStats, CodeTables, Severity};
pub use config::{AnalyzerConfig, CycleEndPolicy};
pub use decoder::{Analysis, Decoder};
pub use kpi::{analyze, JobStatus, KpiSummary};
pub use types::{
    DecoderError, Direction, Event, EventTable, Field, FieldMap, FieldValue, LogRecord,
    RawRecord, Result, Timestamp,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
