//! Message Decoding Engine
//!
//! Extracts field mappings from framed SECS-II message blocks. Two message
//! shapes carry the data the KPI engine needs:
//!
//! - `S6F11` event reports: `DATAID`, `CEID`, then report lists whose layout is
//!   declared by the RPTID in the code tables.
//! - `S2F49`/`S2F41` host commands: a remote command name plus named
//!   parameters (`LOTID`, `LOTPANELS`).
//!
//! Every other message decodes to nothing and is dropped by the caller.

use crate::codes::CodeTables;
use crate::types::{DecoderError, Field, FieldMap, LogRecord, RawRecord, Result};
use regex::Regex;
use std::sync::OnceLock;

/// Marker token preceding the lot id in a host command
const LOT_ID_MARKER: &str = "LOTID";

/// Marker token preceding the panel list in a host command
const LOT_PANELS_MARKER: &str = "LOTPANELS";

/// Embedded clock values are at least this many digits
const CLOCK_TOKEN_MIN_DIGITS: usize = 14;

fn token_re() -> &'static Regex {
    static TOKEN_RE: OnceLock<Regex> = OnceLock::new();
    TOKEN_RE.get_or_init(|| {
        Regex::new(r"<(?:A|B|U\d|I\d)\s*\[\d+\]\s*(?:'([^']*)'|(\d+))\s*>")
            .expect("valid token regex")
    })
}

fn message_name_re() -> &'static Regex {
    static MESSAGE_NAME_RE: OnceLock<Regex> = OnceLock::new();
    MESSAGE_NAME_RE.get_or_init(|| {
        Regex::new(r#"MessageName=\s*['"]?([A-Za-z0-9]+)|Message=\s*['"]([A-Za-z0-9]+)"#)
            .expect("valid message name regex")
    })
}

fn lot_panels_re() -> &'static Regex {
    static LOT_PANELS_RE: OnceLock<Regex> = OnceLock::new();
    LOT_PANELS_RE.get_or_init(|| {
        Regex::new(r"'LOTPANELS'\s*>\s*<L\s*\[(\d+)\]").expect("valid lot panels regex")
    })
}

/// Message shapes the decoder knows how to extract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// S6F11 event report
    EventReport,
    /// S2F49 enhanced remote command, or S2F41 host command
    CommandRequest,
    Other,
}

impl MessageKind {
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_uppercase().as_str() {
            "S6F11" => MessageKind::EventReport,
            "S2F49" | "S2F41" => MessageKind::CommandRequest,
            _ => MessageKind::Other,
        }
    }
}

/// A value token from a SECS-II structure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'t> {
    pub text: &'t str,
    /// True for `<A [n] '...'>` strings, false for bare numerics
    pub quoted: bool,
}

fn is_all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn is_clock_token(s: &str) -> bool {
    s.len() >= CLOCK_TOKEN_MIN_DIGITS && is_all_digits(s)
}

fn is_command_name(s: &str) -> bool {
    s.len() >= 5
        && s.bytes().all(|b| b.is_ascii_uppercase())
        && s != LOT_ID_MARKER
        && s != LOT_PANELS_MARKER
}

/// Message decoder - extracts fields from framed records
pub struct MessageDecoder;

impl MessageDecoder {
    /// Decode a framed record into a `LogRecord`
    ///
    /// # Returns
    /// * `Ok(Some(record))` if at least one non-blank field was extracted
    /// * `Ok(None)` for unknown messages and blocks with no usable payload
    /// * `Err(..)` if the record is corrupt (e.g. non-numeric CEID)
    pub fn decode_record(record: &RawRecord, tables: &CodeTables) -> Result<Option<LogRecord>> {
        let Some(message_name) = Self::message_name(&record.header_rest) else {
            log::trace!("Line {}: no message name in header", record.line_number);
            return Ok(None);
        };

        let details = match MessageKind::from_name(&message_name) {
            MessageKind::EventReport => Self::decode_event_report(&record.payload, tables)?,
            MessageKind::CommandRequest => Self::decode_command_request(&record.payload),
            MessageKind::Other => return Ok(None),
        };

        if details.is_empty() {
            return Ok(None);
        }

        Ok(Some(LogRecord {
            timestamp: record.timestamp.clone(),
            message_name,
            details,
        }))
    }

    /// Find the message name in the free text of a header line
    pub fn message_name(header_rest: &str) -> Option<String> {
        let caps = message_name_re().captures(header_rest)?;
        caps.get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str().to_string())
    }

    /// Flatten all value tokens of a payload block, in order
    pub fn extract_tokens(text: &str) -> Vec<Token<'_>> {
        token_re()
            .captures_iter(text)
            .filter_map(|caps| match (caps.get(1), caps.get(2)) {
                (Some(quoted), _) => Some(Token {
                    text: quoted.as_str(),
                    quoted: true,
                }),
                (None, Some(number)) => Some(Token {
                    text: number.as_str(),
                    quoted: false,
                }),
                (None, None) => None,
            })
            .collect()
    }

    /// Decode an S6F11 event report payload
    pub fn decode_event_report(text: &str, tables: &CodeTables) -> Result<FieldMap> {
        let tokens: Vec<&str> = Self::extract_tokens(text).iter().map(|t| t.text).collect();
        let mut details = FieldMap::new();
        if tokens.len() < 2 {
            return Ok(details);
        }

        let data_id: i64 = tokens[0].trim().parse().map_err(|_| {
            DecoderError::CorruptIdentifier(format!("DATAID '{}' is not an integer", tokens[0]))
        })?;
        let ceid: i64 = tokens[1].trim().parse().map_err(|_| {
            DecoderError::CorruptIdentifier(format!("CEID '{}' is not an integer", tokens[1]))
        })?;
        details.insert(Field::DataId, data_id);
        details.insert(Field::Ceid, ceid);

        let payload = &tokens[2..];
        let report = payload
            .iter()
            .position(|t| is_all_digits(t))
            .and_then(|position| {
                let rptid = payload[position];
                match rptid.parse::<u32>().ok().and_then(|id| tables.report(id)) {
                    Some(report) => Some((position, report)),
                    None => {
                        log::trace!("CEID {}: report id '{}' not in code tables", ceid, rptid);
                        None
                    }
                }
            });

        // Direct alarm CEIDs carry no report of their own
        let Some((position, report)) = report else {
            if tables.is_alarm_event(ceid) {
                details.insert(Field::AlarmId, ceid);
            }
            return Ok(details);
        };
        details.insert(Field::Rptid, i64::from(report.id));

        let data = &payload[position + 1..];
        let values = data.iter().filter(|t| !is_clock_token(t));
        for (field, value) in report.fields.iter().zip(values) {
            details.insert(field.clone(), *value);
        }

        // The alarm report places the alarm id after the embedded clock
        if report.id == tables.alarm_report_id() {
            if let Some(alarm_id) = data.get(1) {
                details.insert(Field::AlarmId, *alarm_id);
            }
        }

        Ok(details)
    }

    /// Decode an S2F49/S2F41 host command payload
    pub fn decode_command_request(text: &str) -> FieldMap {
        let tokens = Self::extract_tokens(text);
        let quoted: Vec<&str> = tokens.iter().filter(|t| t.quoted).map(|t| t.text).collect();
        let mut details = FieldMap::new();

        if let Some(rcmd) = quoted.iter().find(|t| is_command_name(t)) {
            details.insert(Field::Rcmd, *rcmd);
        }

        if let Some(lot_id) = quoted
            .iter()
            .position(|t| *t == LOT_ID_MARKER)
            .and_then(|i| quoted.get(i + 1))
        {
            details.insert(Field::LotId, *lot_id);
        }

        if let Some(count) = Self::panel_count(text, &tokens) {
            details.insert(Field::PanelCount, count);
        }

        details
    }

    /// Panel count keyed on the `LOTPANELS` marker
    ///
    /// Either the length of the list following the marker, or a numeric value
    /// directly after it.
    fn panel_count(text: &str, tokens: &[Token<'_>]) -> Option<i64> {
        if let Some(caps) = lot_panels_re().captures(text) {
            return caps[1].parse().ok();
        }
        tokens
            .iter()
            .position(|t| t.quoted && t.text == LOT_PANELS_MARKER)
            .and_then(|i| tokens.get(i + 1))
            .filter(|t| is_all_digits(t.text))
            .and_then(|t| t.text.parse().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Direction, FieldValue};

    fn raw(header_rest: &str, payload: &str) -> RawRecord {
        RawRecord {
            line_number: 1,
            timestamp: "2024/05/01 10:00:00.000000".to_string(),
            log_type: "SEND".to_string(),
            direction: Direction::Send,
            header_rest: header_rest.to_string(),
            payload: payload.to_string(),
        }
    }

    const ID_READ: &str = "<L [3]
  <U4 [1] 7>
  <U4 [1] 120>
  <L [1]
    <L [2]
      <U4 [1] 120>
      <L [5]
        <A [5] 'LOT42'>
        <A [2] 'P1'>
        <U1 [1] 0>
        <U1 [1] 1>
        <A [1] '3'>
      >
    >
  >
>";

    #[test]
    fn test_token_extraction() {
        let tokens = MessageDecoder::extract_tokens("<A [3] 'abc'> <L [2] <U4 [1] 42> <A [0] ''>");
        assert_eq!(
            tokens,
            vec![
                Token { text: "abc", quoted: true },
                Token { text: "42", quoted: false },
                Token { text: "", quoted: true },
            ]
        );
    }

    #[test]
    fn test_message_name_patterns() {
        assert_eq!(
            MessageDecoder::message_name("MessageName=S6F11, SystemBytes=3"),
            Some("S6F11".to_string())
        );
        assert_eq!(
            MessageDecoder::message_name("Message='S2F49' W"),
            Some("S2F49".to_string())
        );
        assert_eq!(MessageDecoder::message_name("Heartbeat"), None);
    }

    #[test]
    fn test_event_report_fields_in_declared_order() {
        let tables = CodeTables::builtin();
        let details = MessageDecoder::decode_event_report(ID_READ, &tables).unwrap();

        assert_eq!(details.integer(&Field::DataId), Some(7));
        assert_eq!(details.ceid(), Some(120));
        assert_eq!(details.integer(&Field::Rptid), Some(120));
        assert_eq!(details.lot_id(), Some("LOT42".to_string()));
        assert_eq!(details.panel_id(), Some("P1".to_string()));
        assert_eq!(details.text(&Field::Orientation), Some("0".to_string()));
        assert_eq!(details.text(&Field::ResultCode), Some("1".to_string()));
        assert_eq!(details.slot_id(), Some("3".to_string()));
    }

    #[test]
    fn test_event_report_truncates_to_payload() {
        let tables = CodeTables::builtin();
        let text = "<U4 [1] 1> <U4 [1] 120> <U4 [1] 120> <A [3] 'LOT'> <A [2] 'P9'>";
        let details = MessageDecoder::decode_event_report(text, &tables).unwrap();

        let keys: Vec<&Field> = details.keys().collect();
        assert_eq!(
            keys,
            vec![&Field::DataId, &Field::Ceid, &Field::Rptid, &Field::LotId, &Field::PanelId]
        );
    }

    #[test]
    fn test_alarm_report_skips_clock() {
        let tables = CodeTables::builtin();
        let text = "<U4 [1] 2> <U4 [1] 102> <U4 [1] 101> <A [16] '2024050110000012'> <U4 [1] 17> <U1 [1] 1>";
        let details = MessageDecoder::decode_event_report(text, &tables).unwrap();

        assert_eq!(details.alarm_id(), Some(17));
        assert_eq!(details.text(&Field::AlarmSet), Some("1".to_string()));
        assert!(!details.iter().any(|(_, v)| v == &FieldValue::from("2024050110000012")));
    }

    #[test]
    fn test_alarm_ceid_records_alarm_id() {
        let tables = CodeTables::builtin();
        let text = "<U4 [1] 3> <U4 [1] 113>";
        let details = MessageDecoder::decode_event_report(text, &tables).unwrap();
        assert_eq!(details.alarm_id(), Some(113));
    }

    #[test]
    fn test_gem_alarm_set_ceid_is_not_an_alarm_id() {
        let tables = CodeTables::builtin();
        let text = "<U4 [1] 4> <U4 [1] 102> <U4 [1] 999> <A [16] '2024050110000012'> <U4 [1] 17>";
        let details = MessageDecoder::decode_event_report(text, &tables).unwrap();
        assert_eq!(details.ceid(), Some(102));
        assert_eq!(details.alarm_id(), None);
    }

    #[test]
    fn test_s2f41_dispatched_as_command() {
        let tables = CodeTables::builtin();
        let record = raw(
            "Message='S2F41' W",
            "<L [2]\n  <A [9] 'LOADSTART'>\n  <L [1]\n    <L [2]\n      <A [5] 'LOTID'>\n      <A [4] 'LOT7'>\n    >\n  >\n>",
        );
        let record = MessageDecoder::decode_record(&record, &tables).unwrap().unwrap();
        assert_eq!(record.message_name, "S2F41");
        assert_eq!(record.details.rcmd(), Some("LOADSTART".to_string()));
        assert_eq!(record.details.lot_id(), Some("LOT7".to_string()));
    }

    #[test]
    fn test_corrupt_ceid_discards_record() {
        let tables = CodeTables::builtin();
        let record = raw("MessageName=S6F11", "<U4 [1] 1> <A [3] 'abc'>");
        let result = MessageDecoder::decode_record(&record, &tables);
        assert!(matches!(result, Err(DecoderError::CorruptIdentifier(_))));
    }

    #[test]
    fn test_command_request() {
        let text = "<L [4]
  <U4 [1] 0>
  <A [0] ''>
  <A [9] 'LOADSTART'>
  <L [2]
    <L [2]
      <A [5] 'LOTID'>
      <A [5] 'LOT42'>
    >
    <L [2]
      <A [9] 'LOTPANELS'>
      <L [3]
        <A [2] 'P1'>
        <A [2] 'P2'>
        <A [2] 'P3'>
      >
    >
  >
>";
        let details = MessageDecoder::decode_command_request(text);
        assert_eq!(details.rcmd(), Some("LOADSTART".to_string()));
        assert_eq!(details.lot_id(), Some("LOT42".to_string()));
        assert_eq!(details.panel_count(), Some(3));
    }

    #[test]
    fn test_command_request_numeric_panel_count() {
        let text = "<A [9] 'LOADSTART'> <A [5] 'LOTID'> <A [5] 'LOT42'> <A [9] 'LOTPANELS'> <U4 [1] 5>";
        let details = MessageDecoder::decode_command_request(text);
        assert_eq!(details.panel_count(), Some(5));
    }

    #[test]
    fn test_unknown_message_and_empty_payload_dropped() {
        let tables = CodeTables::builtin();
        let unknown = raw("MessageName=S1F1", "<L [0]>");
        assert_eq!(MessageDecoder::decode_record(&unknown, &tables).unwrap(), None);

        let empty = raw("MessageName=S2F49", "<L [1] <U4 [1] 0>>");
        assert_eq!(MessageDecoder::decode_record(&empty, &tables).unwrap(), None);
    }

    #[test]
    fn test_decode_record_keeps_timestamp_and_name() {
        let tables = CodeTables::builtin();
        let record = MessageDecoder::decode_record(&raw("MessageName=S6F11", ID_READ), &tables)
            .unwrap()
            .unwrap();
        assert_eq!(record.timestamp, "2024/05/01 10:00:00.000000");
        assert_eq!(record.message_name, "S6F11");
        assert_eq!(record.details.panel_id(), Some("P1".to_string()));
    }
}
