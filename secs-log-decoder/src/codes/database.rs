//! Unified code table database
//!
//! Combines the built-in CEID/RPTID/alarm tables with any number of TOML
//! override files into a single read-only lookup structure.

use crate::codes::tables::{ALARMS, ALARM_REPORT_ID, EVENT_NAMES, REPORT_FIELDS};
use crate::types::{DecoderError, Field, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Alarm severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    #[serde(alias = "error", alias = "ERROR")]
    Error,
    #[serde(alias = "alarm", alias = "ALARM")]
    Alarm,
    #[serde(alias = "warning", alias = "WARNING")]
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "Error"),
            Severity::Alarm => write!(f, "Alarm"),
            Severity::Warning => write!(f, "Warning"),
        }
    }
}

impl FromStr for Severity {
    type Err = DecoderError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(Severity::Error),
            "alarm" => Ok(Severity::Alarm),
            "warning" | "warn" => Ok(Severity::Warning),
            other => Err(DecoderError::CodeTableError(format!(
                "Unknown alarm severity '{}'",
                other
            ))),
        }
    }
}

/// An alarm table entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlarmDefinition {
    pub id: u32,
    pub description: String,
    pub severity: Severity,
}

/// A report layout: RPTID plus the positional field names it declares
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDefinition {
    pub id: u32,
    pub fields: Vec<Field>,
}

/// True if an event name denotes an alarm being raised
///
/// The equipment reports both `Alarm Set` (GEM) and `AlarmSet` (direct CEID).
pub fn is_alarm_set_name(name: &str) -> bool {
    name.chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
        .collect::<String>()
        .eq_ignore_ascii_case("alarmset")
}

/// Event name of CEIDs that raise an alarm directly, with the CEID as alarm id
pub const DIRECT_ALARM_EVENT: &str = "AlarmSet";

/// Statistics about the loaded code tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CodeTableStats {
    pub num_events: usize,
    pub num_reports: usize,
    pub num_alarms: usize,
}

/// Read-only lookup of CEID, RPTID and alarm definitions
#[derive(Debug, Clone)]
pub struct CodeTables {
    events: HashMap<u32, String>,
    reports: HashMap<u32, ReportDefinition>,
    alarms: HashMap<u32, AlarmDefinition>,
}

/// On-disk layout of a code table override file
///
/// ```toml
/// [events]
/// 133 = "MagToMagCompleted"
///
/// [reports]
/// 160 = ["LotID", "PanelID"]
///
/// [alarms.200]
/// description = "<2000>Lifter error"
/// severity = "error"
/// ```
#[derive(Debug, Default, Deserialize)]
struct CodeTableFile {
    #[serde(default)]
    events: HashMap<String, String>,
    #[serde(default)]
    reports: HashMap<String, Vec<String>>,
    #[serde(default)]
    alarms: HashMap<String, AlarmEntry>,
}

#[derive(Debug, Deserialize)]
struct AlarmEntry {
    description: String,
    #[serde(default = "default_severity")]
    severity: String,
}

fn default_severity() -> String {
    "error".to_string()
}

fn parse_id(section: &str, key: &str) -> Result<u32> {
    key.trim().parse().map_err(|_| {
        DecoderError::CodeTableError(format!("[{}] key '{}' is not a numeric id", section, key))
    })
}

impl CodeTables {
    /// Empty tables, with no built-in definitions
    pub fn empty() -> Self {
        Self {
            events: HashMap::new(),
            reports: HashMap::new(),
            alarms: HashMap::new(),
        }
    }

    /// Tables preloaded with the equipment's built-in definitions
    pub fn builtin() -> Self {
        let mut tables = Self::empty();
        for (ceid, name) in EVENT_NAMES {
            tables.add_event(*ceid, *name);
        }
        for (rptid, fields) in REPORT_FIELDS {
            tables.add_report(*rptid, fields.iter().copied());
        }
        for (id, description, severity) in ALARMS {
            tables.add_alarm(*id, *description, *severity);
        }
        tables
    }

    pub fn add_event(&mut self, ceid: u32, name: impl Into<String>) {
        self.events.insert(ceid, name.into());
    }

    pub fn add_report<I, S>(&mut self, rptid: u32, fields: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let fields = fields.into_iter().map(|f| Field::from_name(f.as_ref())).collect();
        self.reports.insert(rptid, ReportDefinition { id: rptid, fields });
    }

    pub fn add_alarm(&mut self, id: u32, description: impl Into<String>, severity: Severity) {
        self.alarms.insert(
            id,
            AlarmDefinition {
                id,
                description: description.into(),
                severity,
            },
        );
    }

    /// Merge definitions from a TOML code table; later entries replace earlier ones
    pub fn load_toml_str(&mut self, content: &str) -> Result<()> {
        let file: CodeTableFile = toml::from_str(content)
            .map_err(|e| DecoderError::CodeTableError(format!("Invalid TOML: {}", e)))?;

        for (key, name) in &file.events {
            self.add_event(parse_id("events", key)?, name.clone());
        }
        for (key, fields) in &file.reports {
            self.add_report(parse_id("reports", key)?, fields);
        }
        for (key, entry) in &file.alarms {
            let severity = entry.severity.parse()?;
            self.add_alarm(parse_id("alarms", key)?, entry.description.clone(), severity);
        }

        log::debug!(
            "Merged code table: {} events, {} reports, {} alarms",
            file.events.len(),
            file.reports.len(),
            file.alarms.len()
        );
        Ok(())
    }

    /// Merge definitions from a TOML code table file
    pub fn load_toml_file(&mut self, path: &Path) -> Result<()> {
        log::info!("Loading code table: {:?}", path);

        let content = std::fs::read_to_string(path).map_err(|e| {
            DecoderError::CodeTableError(format!("Failed to read file {:?}: {}", path, e))
        })?;
        self.load_toml_str(&content)?;

        log::info!("Code table loaded successfully: {:?}", path);
        Ok(())
    }

    /// Event name for a CEID
    pub fn event_name(&self, ceid: i64) -> Option<&str> {
        u32::try_from(ceid)
            .ok()
            .and_then(|id| self.events.get(&id))
            .map(String::as_str)
    }

    /// True if the CEID itself is the alarm being raised
    ///
    /// Only CEIDs named exactly `AlarmSet` qualify. The GEM `Alarm Set` event
    /// carries its alarm id in the report payload instead.
    pub fn is_alarm_event(&self, ceid: i64) -> bool {
        self.event_name(ceid) == Some(DIRECT_ALARM_EVENT)
    }

    pub fn report(&self, rptid: u32) -> Option<&ReportDefinition> {
        self.reports.get(&rptid)
    }

    pub fn alarm(&self, alarm_id: i64) -> Option<&AlarmDefinition> {
        u32::try_from(alarm_id).ok().and_then(|id| self.alarms.get(&id))
    }

    /// Report id whose payload places the alarm id after the embedded clock
    pub fn alarm_report_id(&self) -> u32 {
        ALARM_REPORT_ID
    }

    pub fn stats(&self) -> CodeTableStats {
        CodeTableStats {
            num_events: self.events.len(),
            num_reports: self.reports.len(),
            num_alarms: self.alarms.len(),
        }
    }
}

impl Default for CodeTables {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookups() {
        let tables = CodeTables::builtin();

        assert_eq!(tables.event_name(120), Some("IDRead"));
        assert_eq!(tables.event_name(-1), None);
        assert!(tables.is_alarm_event(113));
        assert!(!tables.is_alarm_event(120));
        assert!(!tables.is_alarm_event(102));

        let report = tables.report(120).unwrap();
        assert_eq!(report.fields.len(), 5);
        assert_eq!(report.fields[4], Field::SlotId);

        let alarm = tables.alarm(17).unwrap();
        assert_eq!(alarm.description, "<0190>Emergency stop");
        assert_eq!(alarm.severity, Severity::Error);
        assert_eq!(tables.alarm(65).unwrap().severity, Severity::Warning);
    }

    #[test]
    fn test_alarm_set_name_variants() {
        assert!(is_alarm_set_name("Alarm Set"));
        assert!(is_alarm_set_name("AlarmSet"));
        assert!(is_alarm_set_name("ALARM_SET"));
        assert!(!is_alarm_set_name("Alarm Cleared"));
    }

    #[test]
    fn test_toml_overrides() {
        let mut tables = CodeTables::builtin();
        let before = tables.stats();

        tables
            .load_toml_str(
                r#"
                [events]
                133 = "MagToMagCompleted"
                120 = "PanelIDRead"

                [reports]
                160 = ["LotID", "Recipe"]

                [alarms.200]
                description = "<2000>Lifter error"
                severity = "alarm"
                "#,
            )
            .unwrap();

        assert_eq!(tables.event_name(133), Some("MagToMagCompleted"));
        assert_eq!(tables.event_name(120), Some("PanelIDRead"));
        assert_eq!(
            tables.report(160).unwrap().fields,
            vec![Field::LotId, Field::Other("Recipe".to_string())]
        );
        assert_eq!(tables.alarm(200).unwrap().severity, Severity::Alarm);

        let after = tables.stats();
        assert_eq!(after.num_events, before.num_events + 1);
        assert_eq!(after.num_reports, before.num_reports + 1);
        assert_eq!(after.num_alarms, before.num_alarms + 1);
    }

    #[test]
    fn test_toml_rejects_bad_ids_and_severities() {
        let mut tables = CodeTables::empty();
        assert!(tables.load_toml_str("[events]\nabc = \"X\"").is_err());
        assert!(tables
            .load_toml_str("[alarms.5]\ndescription = \"x\"\nseverity = \"fatal\"")
            .is_err());
    }
}
