//! Log file formats
//!
//! Equipment logs are line-oriented text. This module turns raw bytes into
//! framed message blocks; message-specific decoding lives in
//! `message_decoder`.

pub mod text;

// Re-export framing types
pub use text::{decode_bytes, read_log_file, RecordFramer};
