//! acbin core library for AC binary infrared-remote captures.
//!
//! An AC binary capture is a tag table: one byte with the tag count, one
//! little-endian offset per tag, then the payload region. This crate decodes
//! the table into borrowed per-tag payload slices (`protocols::ac_binary`),
//! reads raw captures from files or memory (`source`) and aggregates decoded
//! captures into a deterministic report (`analysis`).
//!
//! Decoding is byte-oriented and side-effect free; all I/O is isolated in
//! `source`. The protocol layer follows a layout/reader/parser split so the
//! parser never indexes bytes directly.
//!
//! Invariants:
//! - Records always come back in tag index order, one per protocol tag.
//! - An absent tag has no offset, a zero length and an empty payload.
//! - A failed decode yields no records at all.
//!
//! # Examples
//! ```no_run
//! use std::path::Path;
//!
//! use acbin_core::{DecoderConfig, analyze_file};
//!
//! let report = analyze_file(Path::new("remote.bin"), &DecoderConfig::default())?;
//! println!("captures: {}", report.captures.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use serde::{Deserialize, Serialize};

mod analysis;
pub mod protocols;
mod source;

pub use analysis::{AnalysisError, analyze_file, analyze_source};
pub use protocols::ac_binary::{
    DecodeError, DecodedTags, DecoderConfig, OffsetOrder, SliceBounds, TAG_COUNT_FOR_PROTOCOL,
    TAG_INVALID, TagIndex, TagRecord, decode, decode_with_index, describe_tags,
};
pub use source::{BinaryFileSource, BufferEvent, BufferSource, MemorySource, SourceError};

/// Current report schema version.
pub const REPORT_VERSION: u32 = 1;
/// Default timestamp used until the caller stamps the report.
pub const DEFAULT_GENERATED_AT: &str = "1970-01-01T00:00:00Z";

/// Decoding report for one input.
///
/// # Examples
/// ```
/// use acbin_core::make_stub_report;
///
/// let report = make_stub_report("remote.bin", 67);
/// assert_eq!(report.report_version, acbin_core::REPORT_VERSION);
/// assert!(report.captures.is_empty());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Report schema version (not the binary version).
    pub report_version: u32,
    /// Tool identification metadata.
    pub tool: ToolInfo,
    /// RFC3339 timestamp representing the report generation time.
    pub generated_at: String,
    /// Input metadata.
    pub input: InputInfo,
    /// Decoder settings the captures were decoded with.
    pub config: DecoderConfig,
    /// One entry per buffer, in source order.
    pub captures: Vec<CaptureSummary>,
}

impl Report {
    pub fn failed_captures(&self) -> usize {
        self.captures
            .iter()
            .filter(|capture| capture.error.is_some())
            .count()
    }
}

/// Tool metadata embedded in reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub version: String,
}

/// Input metadata embedded in reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputInfo {
    /// Input path as provided to the analyzer.
    pub path: String,
    /// Input size in bytes.
    pub bytes: u64,
}

/// Result of decoding one buffer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureSummary {
    /// Position of the buffer in its source.
    pub index: u64,
    pub bytes: u64,
    /// Tag count byte as found in the buffer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub declared_tags: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_size: Option<u64>,
    pub tags_total: u64,
    pub tags_present: u64,
    /// Present tags in tag index order.
    pub tags: Vec<TagSummary>,
    /// Decode error message; set when the buffer was rejected.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One present tag.
///
/// # Examples
/// ```
/// use acbin_core::TagSummary;
///
/// let tag = TagSummary {
///     tag: 21,
///     offset: 4,
///     length: 2,
///     data_hex: "0a0b".to_string(),
/// };
/// assert_eq!(tag.data_hex.len(), 2 * tag.length as usize);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagSummary {
    pub tag: u16,
    /// Offset into the payload region.
    pub offset: u16,
    pub length: u16,
    /// Payload bytes as lowercase hex; omitted when empty.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub data_hex: String,
}

/// Build a stub report with base fields filled and no captures.
pub fn make_stub_report(input_path: &str, input_bytes: u64) -> Report {
    Report {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "acbin".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        generated_at: DEFAULT_GENERATED_AT.to_string(),
        input: InputInfo {
            path: input_path.to_string(),
            bytes: input_bytes,
        },
        config: DecoderConfig::default(),
        captures: vec![],
    }
}
