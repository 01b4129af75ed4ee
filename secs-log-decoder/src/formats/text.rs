//! Text log framing
//!
//! Equipment logs interleave free-text diagnostics with protocol message
//! blocks. A message block starts at a header line
//!
//! ```text
//! 2024/05/01 10:00:00.123456,[SEND],MessageName=S6F11, SystemBytes=17
//! ```
//!
//! immediately followed by a line opening a bracketed SECS-II structure, and
//! runs until a line holding a lone `.`. Everything else is skipped.

use crate::types::{DecoderError, Direction, RawRecord, Result};
use regex::Regex;
use std::iter::{Enumerate, Peekable};
use std::path::Path;
use std::str::Lines;
use std::sync::OnceLock;

fn header_re() -> &'static Regex {
    static HEADER_RE: OnceLock<Regex> = OnceLock::new();
    HEADER_RE.get_or_init(|| {
        Regex::new(r"^(\d{4}/\d{2}/\d{2} \d{2}:\d{2}:\d{2}\.\d+),\[([^\]]*)\],(.*)$")
            .expect("valid header regex")
    })
}

/// Decode raw log bytes: UTF-8 first, then byte-for-byte Latin-1, which never fails
pub fn decode_bytes(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => {
            log::warn!("Log file is not UTF-8, falling back to Latin-1 decoding");
            e.into_bytes().iter().map(|&b| b as char).collect()
        }
    }
}

/// Read and decode a log file
///
/// This is the only fatal failure of a run: once the bytes are in memory
/// decoding always succeeds.
pub fn read_log_file(path: &Path) -> Result<String> {
    log::info!("Reading log file: {:?}", path);

    let bytes = std::fs::read(path).map_err(|e| {
        DecoderError::LogReadError(format!("Failed to read file {:?}: {}", path, e))
    })?;

    log::debug!("Read {} bytes from {:?}", bytes.len(), path);
    Ok(decode_bytes(bytes))
}

/// Iterator over the message blocks of a decoded log
pub struct RecordFramer<'a> {
    lines: Peekable<Enumerate<Lines<'a>>>,
}

impl<'a> RecordFramer<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().enumerate().peekable(),
        }
    }

    fn next_starts_block(&mut self) -> bool {
        self.lines
            .peek()
            .map(|(_, line)| line.trim_start().starts_with('<'))
            .unwrap_or(false)
    }
}

impl<'a> Iterator for RecordFramer<'a> {
    type Item = RawRecord;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((index, line)) = self.lines.next() {
            let Some(caps) = header_re().captures(line.trim_end()) else {
                continue;
            };
            let Some(direction) = Direction::from_log_type(&caps[2]) else {
                log::trace!("Line {}: log type '{}' is not a message", index + 1, &caps[2]);
                continue;
            };
            if !self.next_starts_block() {
                continue;
            }

            let mut payload = Vec::new();
            while let Some((_, body)) = self.lines.next_if(|(_, l)| l.trim() != ".") {
                payload.push(body);
            }
            if self.lines.next_if(|(_, l)| l.trim() == ".").is_none() {
                log::debug!("Line {}: message block not terminated before end of log", index + 1);
            }

            return Some(RawRecord {
                line_number: index + 1,
                timestamp: caps[1].to_string(),
                log_type: caps[2].trim().to_string(),
                direction,
                header_rest: caps[3].to_string(),
                payload: payload.join("\n"),
            });
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
2024/05/01 10:00:00.000001,[INFO],Connection established
2024/05/01 10:00:01.000000,[SEND],MessageName=S6F11
<L [2]
  <U4 [1] 1>
>
.
free text between blocks
2024/05/01 10:00:02.000000,[RECV],MessageName=S6F12
no block follows this header
2024/05/01 10:00:03.500000,[Recv],Message='S2F49'
  <L [1]
    <A [9] 'LOADSTART'>
  >
.
";

    #[test]
    fn test_frames_only_message_blocks() {
        let records: Vec<RawRecord> = RecordFramer::new(SAMPLE).collect();
        assert_eq!(records.len(), 2);

        let first = &records[0];
        assert_eq!(first.line_number, 2);
        assert_eq!(first.timestamp, "2024/05/01 10:00:01.000000");
        assert_eq!(first.direction, Direction::Send);
        assert_eq!(first.header_rest, "MessageName=S6F11");
        assert_eq!(first.payload, "<L [2]\n  <U4 [1] 1>\n>");

        let second = &records[1];
        assert_eq!(second.direction, Direction::Receive);
        assert!(second.payload.contains("LOADSTART"));
        assert!(!second.payload.contains('.'));
    }

    #[test]
    fn test_block_after_non_message_header_is_skipped() {
        let text = "\
2024/05/01 10:00:00.000000,[INFO],Equipment dump
<L [1]
  <A [9] 'LOADSTART'>
>
.
2024/05/01 10:00:01.000000,[SEND],MessageName=S6F11
<U4 [1] 1>
.
";
        let records: Vec<RawRecord> = RecordFramer::new(text).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].line_number, 6);
        assert_eq!(records[0].payload, "<U4 [1] 1>");
    }

    #[test]
    fn test_unterminated_block_runs_to_end() {
        let text = "2024/05/01 10:00:01.0,[SEND],MessageName=S6F11\n<U4 [1] 1>\n<U4 [1] 2>";
        let records: Vec<RawRecord> = RecordFramer::new(text).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].payload, "<U4 [1] 1>\n<U4 [1] 2>");
    }

    #[test]
    fn test_crlf_lines() {
        let text = "2024/05/01 10:00:01.0,[SEND],MessageName=S6F11\r\n<U4 [1] 1>\r\n.\r\n";
        let records: Vec<RawRecord> = RecordFramer::new(text).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].payload, "<U4 [1] 1>");
    }

    #[test]
    fn test_latin1_fallback() {
        let bytes = vec![b'L', b'O', b'T', 0xE9, b'1'];
        assert_eq!(decode_bytes(bytes), "LOT\u{e9}1");
        assert_eq!(decode_bytes(b"plain".to_vec()), "plain");
    }

    #[test]
    fn test_read_missing_file_is_fatal() {
        let result = read_log_file(Path::new("/nonexistent/equipment.log"));
        assert!(matches!(result, Err(DecoderError::LogReadError(_))));
    }
}
