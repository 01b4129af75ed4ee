//! Main decoder API
//!
//! This module provides the primary interface for the decoder library.
//! The Decoder struct is the entry point for loading code tables, decoding
//! log files and running the KPI engine over the result.

use crate::codes::{CodeTableStats, CodeTables};
use crate::config::AnalyzerConfig;
use crate::formats::{decode_bytes, read_log_file, RecordFramer};
use crate::kpi::{self, KpiSummary};
use crate::message_decoder::MessageDecoder;
use crate::normalize;
use crate::types::{EventTable, LogRecord, Result};
use serde::Serialize;
use std::path::Path;

/// Event table and KPI summary of one log
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub events: EventTable,
    pub summary: KpiSummary,
}

/// The main decoder struct - entry point for all decoding operations
pub struct Decoder {
    /// CEID, RPTID and alarm definitions (built-in plus loaded overrides)
    code_tables: CodeTables,
}

impl Decoder {
    /// Create a new decoder with the built-in code tables
    pub fn new() -> Self {
        Self {
            code_tables: CodeTables::builtin(),
        }
    }

    /// Create a decoder over an explicit set of code tables
    pub fn with_code_tables(code_tables: CodeTables) -> Self {
        Self { code_tables }
    }

    /// Load a TOML code-table file and merge it over the current tables
    ///
    /// # Example
    /// ```no_run
    /// use secs_log_decoder::Decoder;
    /// use std::path::Path;
    ///
    /// let mut decoder = Decoder::new();
    /// decoder.add_code_table(Path::new("site_alarms.toml")).unwrap();
    /// ```
    pub fn add_code_table(&mut self, path: &Path) -> Result<()> {
        self.code_tables.load_toml_file(path)
    }

    pub fn code_tables(&self) -> &CodeTables {
        &self.code_tables
    }

    /// Get statistics about the loaded code tables
    pub fn code_table_stats(&self) -> CodeTableStats {
        self.code_tables.stats()
    }

    /// Decode log text into records, in log order
    ///
    /// Records that fail to decode are dropped; the rest of the log is
    /// unaffected.
    pub fn decode_str(&self, text: &str) -> Vec<LogRecord> {
        let mut records = Vec::new();
        let mut dropped = 0usize;

        for raw in RecordFramer::new(text) {
            match MessageDecoder::decode_record(&raw, &self.code_tables) {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(e) => {
                    dropped += 1;
                    log::debug!("Dropping record at line {}: {}", raw.line_number, e);
                }
            }
        }

        if dropped > 0 {
            log::warn!("Dropped {} corrupt records", dropped);
        }
        records
    }

    /// Decode raw log bytes (UTF-8 with Latin-1 fallback)
    pub fn decode_bytes(&self, bytes: Vec<u8>) -> Vec<LogRecord> {
        self.decode_str(&decode_bytes(bytes))
    }

    /// Decode a log file
    ///
    /// Only failing to read the file is an error; malformed content yields
    /// fewer records, possibly none.
    pub fn decode_file(&self, path: &Path) -> Result<Vec<LogRecord>> {
        log::info!("Decoding log file: {:?}", path);
        let text = read_log_file(path)?;
        let records = self.decode_str(&text);
        log::info!("Decoded {} records from {:?}", records.len(), path);
        Ok(records)
    }

    /// Resolve names and build the event table
    pub fn normalize(&self, records: &[LogRecord]) -> EventTable {
        normalize::normalize(records, &self.code_tables)
    }

    /// Run the KPI engine over an event table
    pub fn analyze(&self, table: &EventTable, config: &AnalyzerConfig) -> KpiSummary {
        kpi::analyze(table, &self.code_tables, config)
    }

    /// Decode, normalize and analyze log text
    pub fn analyze_str(&self, text: &str, config: &AnalyzerConfig) -> Analysis {
        let events = self.normalize(&self.decode_str(text));
        let summary = self.analyze(&events, config);
        Analysis { events, summary }
    }

    /// Decode, normalize and analyze a log file
    ///
    /// # Example
    /// ```no_run
    /// use secs_log_decoder::{AnalyzerConfig, Decoder};
    /// use std::path::Path;
    ///
    /// let decoder = Decoder::new();
    /// let analysis = decoder
    ///     .analyze_file(Path::new("equipment.log"), &AnalyzerConfig::default())
    ///     .unwrap();
    /// println!("{}: {} s downtime", analysis.summary.job_status, analysis.summary.total_downtime_sec);
    /// ```
    pub fn analyze_file(&self, path: &Path, config: &AnalyzerConfig) -> Result<Analysis> {
        config.validate()?;
        let records = self.decode_file(path)?;
        let events = self.normalize(&records);
        let summary = self.analyze(&events, config);
        Ok(Analysis { events, summary })
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}
