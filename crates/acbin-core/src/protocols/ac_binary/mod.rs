//! AC binary tag-table decoding.
//!
//! An AC binary capture starts with a tag count byte followed by one
//! little-endian offset per tag, then the payload region. The decoder runs
//! three passes: offset extraction, length inference (each present tag spans
//! up to the next present tag, the last one up to the end of the buffer) and
//! data resolution (borrowed payload slices).
//!
//! Absent tags carry the `0xFFFF` sentinel on the wire and decode to
//! `offset: None` with a zero length. Ordering and bounds checks are
//! controlled by [`DecoderConfig`]; both are on by default.
//!
//! Byte positions and the tag index table live in `layout`, safe reads in
//! `reader`.

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;

pub use config::{DecoderConfig, OffsetOrder, SliceBounds};
pub use diagnostics::describe_tags;
pub use error::DecodeError;
pub use layout::{AC_TAG_INDEX, TAG_COUNT_FOR_PROTOCOL, TAG_INVALID, TagIndex};
pub use parser::{
    DecodedTags, TagRecord, decode, decode_with_index, extract_offsets, infer_lengths,
    resolve_data,
};
