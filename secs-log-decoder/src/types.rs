//! Core types for the SECS log decoder library
//!
//! This module defines the records the parser emits, the normalized events the
//! KPI engine consumes, and the shared error type. Records and events are
//! immutable once built: every derivation downstream reads them by reference.

use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Timestamp type used for all time arithmetic
pub type Timestamp = NaiveDateTime;

/// Result type for decoder operations
pub type Result<T> = std::result::Result<T, DecoderError>;

/// Format of the timestamp column in equipment logs (`2024/05/01 10:00:00.123456`)
pub const TIMESTAMP_FORMAT: &str = "%Y/%m/%d %H:%M:%S%.f";

/// Parse a log timestamp string
pub fn parse_timestamp(raw: &str) -> Option<Timestamp> {
    NaiveDateTime::parse_from_str(raw.trim(), TIMESTAMP_FORMAT).ok()
}

/// Seconds elapsed from `start` to `end`, or `None` if either side does not parse
pub fn seconds_between(start: &str, end: &str) -> Option<f64> {
    let start = parse_timestamp(start)?;
    let end = parse_timestamp(end)?;
    let delta = end.signed_duration_since(start);
    delta
        .num_microseconds()
        .map(|us| us as f64 / 1_000_000.0)
}

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Errors that can occur during decoding
#[derive(Debug, thiserror::Error)]
pub enum DecoderError {
    #[error("Failed to read log file: {0}")]
    LogReadError(String),

    #[error("Failed to load code table: {0}")]
    CodeTableError(String),

    #[error("Corrupt identifier in record: {0}")]
    CorruptIdentifier(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

/// Canonical field names carried by decoded records
///
/// Report layouts name their fields positionally; whatever the position, the
/// same value always lands under the same `Field`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    DataId,
    Ceid,
    Rptid,
    Rcmd,
    AlarmId,
    AlarmSet,
    LotId,
    PanelId,
    PanelCount,
    Orientation,
    ResultCode,
    SlotId,
    SourcePortId,
    PortId,
    PortStatus,
    MagazineId,
    OperatorId,
    OperatorCommand,
    ControlState,
    Clock,
    PpChangeName,
    PpChangeStatus,
    ProcessState,
    PreviousProcessState,
    /// Field declared by a user-supplied report layout
    Other(String),
}

impl Field {
    /// Resolve a report field name to its canonical field
    pub fn from_name(name: &str) -> Self {
        match name {
            "DATAID" => Field::DataId,
            "CEID" => Field::Ceid,
            "RPTID" => Field::Rptid,
            "RCMD" => Field::Rcmd,
            "AlarmID" => Field::AlarmId,
            "AlarmSet" => Field::AlarmSet,
            "LotID" => Field::LotId,
            "PanelID" => Field::PanelId,
            "PanelCount" => Field::PanelCount,
            "Orientation" => Field::Orientation,
            "ResultCode" => Field::ResultCode,
            "SlotID" => Field::SlotId,
            "SourcePortID" => Field::SourcePortId,
            "PortID" => Field::PortId,
            "PortStatus" => Field::PortStatus,
            "MagazineID" => Field::MagazineId,
            "OperatorID" => Field::OperatorId,
            "OperatorCommand" => Field::OperatorCommand,
            "ControlState" => Field::ControlState,
            "Clock" => Field::Clock,
            "PPChangeName" => Field::PpChangeName,
            "PPChangeStatus" => Field::PpChangeStatus,
            "ProcessState" => Field::ProcessState,
            "PreviousProcessState" => Field::PreviousProcessState,
            other => Field::Other(other.to_string()),
        }
    }

    /// Canonical display name
    pub fn as_str(&self) -> &str {
        match self {
            Field::DataId => "DATAID",
            Field::Ceid => "CEID",
            Field::Rptid => "RPTID",
            Field::Rcmd => "RCMD",
            Field::AlarmId => "AlarmID",
            Field::AlarmSet => "AlarmSet",
            Field::LotId => "LotID",
            Field::PanelId => "PanelID",
            Field::PanelCount => "PanelCount",
            Field::Orientation => "Orientation",
            Field::ResultCode => "ResultCode",
            Field::SlotId => "SlotID",
            Field::SourcePortId => "SourcePortID",
            Field::PortId => "PortID",
            Field::PortStatus => "PortStatus",
            Field::MagazineId => "MagazineID",
            Field::OperatorId => "OperatorID",
            Field::OperatorCommand => "OperatorCommand",
            Field::ControlState => "ControlState",
            Field::Clock => "Clock",
            Field::PpChangeName => "PPChangeName",
            Field::PpChangeStatus => "PPChangeStatus",
            Field::ProcessState => "ProcessState",
            Field::PreviousProcessState => "PreviousProcessState",
            Field::Other(name) => name,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A single decoded field value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Identifier parsed as an integer (DATAID, CEID, RPTID, CEID-derived alarm id)
    Integer(i64),
    /// Raw token text
    Text(String),
}

impl FieldValue {
    /// Integer view of the value; text is parsed after trimming
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(v) => Some(*v),
            FieldValue::Text(s) => s.trim().parse().ok(),
        }
    }

    /// True if the value carries no information
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Integer(_) => false,
            FieldValue::Text(s) => s.trim().is_empty(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Integer(v) => write!(f, "{}", v),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

/// Fixed-schema field mapping of one record
///
/// An absent key is the null value. Accessors return `None` for both absent
/// and blank values so sub-analyses can treat "missing" uniformly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldMap(BTreeMap<Field, FieldValue>);

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: Field, value: impl Into<FieldValue>) {
        self.0.insert(field, value.into());
    }

    pub fn get(&self, field: &Field) -> Option<&FieldValue> {
        self.0.get(field)
    }

    pub fn contains(&self, field: &Field) -> bool {
        self.0.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if no field holds a non-blank value
    pub fn is_empty(&self) -> bool {
        self.0.values().all(FieldValue::is_empty)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Field, &FieldValue)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &Field> {
        self.0.keys()
    }

    /// Non-blank text of a field, trimmed
    pub fn text(&self, field: &Field) -> Option<String> {
        self.0
            .get(field)
            .filter(|v| !v.is_empty())
            .map(|v| v.to_string().trim().to_string())
    }

    /// Integer value of a field, if it parses
    pub fn integer(&self, field: &Field) -> Option<i64> {
        self.0.get(field).and_then(FieldValue::as_i64)
    }

    pub fn ceid(&self) -> Option<i64> {
        self.integer(&Field::Ceid)
    }

    pub fn alarm_id(&self) -> Option<i64> {
        self.integer(&Field::AlarmId)
    }

    pub fn rcmd(&self) -> Option<String> {
        self.text(&Field::Rcmd)
    }

    pub fn lot_id(&self) -> Option<String> {
        self.text(&Field::LotId)
    }

    pub fn panel_id(&self) -> Option<String> {
        self.text(&Field::PanelId)
    }

    pub fn slot_id(&self) -> Option<String> {
        self.text(&Field::SlotId)
    }

    pub fn panel_count(&self) -> Option<i64> {
        self.integer(&Field::PanelCount)
    }

    pub fn operator_id(&self) -> Option<String> {
        self.text(&Field::OperatorId)
    }

    pub fn magazine_id(&self) -> Option<String> {
        self.text(&Field::MagazineId)
    }
}

impl FromIterator<(Field, FieldValue)> for FieldMap {
    fn from_iter<T: IntoIterator<Item = (Field, FieldValue)>>(iter: T) -> Self {
        FieldMap(iter.into_iter().collect())
    }
}

/// Direction of a protocol message as written in the log type column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Direction {
    Send,
    Receive,
}

impl Direction {
    /// Classify a `[LOG_TYPE]` column; `None` for non-message log types
    pub fn from_log_type(log_type: &str) -> Option<Self> {
        let lower = log_type.trim().to_ascii_lowercase();
        if lower.contains("send") || lower.contains("sent") {
            Some(Direction::Send)
        } else if lower.contains("recv") || lower.contains("receiv") {
            Some(Direction::Receive)
        } else {
            None
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Send => write!(f, "Send"),
            Direction::Receive => write!(f, "Receive"),
        }
    }
}

/// A framed message block, before message-specific extraction
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    /// 1-based line number of the header line
    pub line_number: usize,
    pub timestamp: String,
    pub log_type: String,
    pub direction: Direction,
    /// Free text after the log type column
    pub header_rest: String,
    /// Payload lines joined with `\n`, terminator excluded
    pub payload: String,
}

/// A decoded record: the primary output of the parser
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRecord {
    pub timestamp: String,
    pub message_name: String,
    pub details: FieldMap,
}

/// Normalized event: one row of the event table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    /// Position in log order
    pub index: usize,
    pub timestamp: String,
    pub event_name: String,
    pub message_name: String,
    pub fields: FieldMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alarm_description: Option<String>,
}

impl Event {
    pub fn parsed_timestamp(&self) -> Option<Timestamp> {
        parse_timestamp(&self.timestamp)
    }

    /// True if the event name is one of `names`
    pub fn is_any_of(&self, names: &[String]) -> bool {
        names.iter().any(|n| n == &self.event_name)
    }
}

/// Ordered event table handed to the KPI engine
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct EventTable {
    events: Vec<Event>,
}

impl EventTable {
    /// Build a table, re-indexing events by their position
    pub fn new(mut events: Vec<Event>) -> Self {
        for (index, event) in events.iter_mut().enumerate() {
            event.index = index;
        }
        Self { events }
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Event> {
        self.events.iter()
    }

    pub fn first(&self) -> Option<&Event> {
        self.events.first()
    }

    pub fn last(&self) -> Option<&Event> {
        self.events.last()
    }

    /// First event named in `names`, scanning in log order from `from`
    pub fn first_named_from(&self, names: &[String], from: usize) -> Option<&Event> {
        self.events.iter().skip(from).find(|e| e.is_any_of(names))
    }

    /// All events named in `names`, in log order
    pub fn named<'a>(&'a self, names: &'a [String]) -> impl Iterator<Item = &'a Event> + 'a {
        self.events.iter().filter(move |e| e.is_any_of(names))
    }
}

impl<'a> IntoIterator for &'a EventTable {
    type Item = &'a Event;
    type IntoIter = std::slice::Iter<'a, Event>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
