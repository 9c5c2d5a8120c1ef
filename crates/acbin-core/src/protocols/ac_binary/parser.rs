use tracing::{debug, warn};

use super::config::{DecoderConfig, OffsetOrder, SliceBounds};
use super::diagnostics;
use super::error::DecodeError;
use super::layout::{self, AC_TAG_INDEX, TagIndex};
use super::reader::AcBinaryReader;

/// One entry of the decoded tag table.
///
/// `offset` is `None` when the capture marks the tag absent; such records
/// always have a zero length and an empty `data` slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRecord<'a> {
    pub tag: u16,
    pub offset: Option<u16>,
    pub length: u16,
    pub data: &'a [u8],
}

impl<'a> TagRecord<'a> {
    pub fn new(tag: u16, offset: Option<u16>) -> Self {
        Self {
            tag,
            offset,
            length: 0,
            data: &[],
        }
    }

    pub fn is_present(&self) -> bool {
        self.offset.is_some()
    }

    /// Offset as stored on the wire, sentinel included.
    pub fn raw_offset(&self) -> u16 {
        self.offset.unwrap_or(layout::TAG_INVALID)
    }
}

/// Tag table decoded from one buffer, borrowing its payloads from it.
#[derive(Debug, Clone)]
pub struct DecodedTags<'a> {
    records: Vec<TagRecord<'a>>,
    header_size: usize,
    buffer_len: usize,
}

impl<'a> DecodedTags<'a> {
    /// All records in tag index order, absent tags included.
    pub fn records(&self) -> &[TagRecord<'a>] {
        &self.records
    }

    pub fn into_records(self) -> Vec<TagRecord<'a>> {
        self.records
    }

    pub fn header_size(&self) -> usize {
        self.header_size
    }

    pub fn buffer_len(&self) -> usize {
        self.buffer_len
    }

    pub fn payload_len(&self) -> usize {
        self.buffer_len - self.header_size
    }

    pub fn get(&self, tag: u16) -> Option<&TagRecord<'a>> {
        self.records.iter().find(|record| record.tag == tag)
    }

    /// Payload of `tag`, or `None` when the tag is unknown or absent.
    pub fn payload(&self, tag: u16) -> Option<&'a [u8]> {
        self.get(tag)
            .filter(|record| record.is_present())
            .map(|record| record.data)
    }

    pub fn present(&self) -> impl Iterator<Item = &TagRecord<'a>> {
        self.records.iter().filter(|record| record.is_present())
    }

    /// `(tag, length)` for every record with a non-empty payload.
    pub fn describe(&self) -> impl Iterator<Item = (u16, u16)> {
        diagnostics::describe_tags(&self.records)
    }
}

/// Decode an AC binary capture against the protocol tag index.
///
/// # Examples
/// ```
/// use acbin_core::protocols::ac_binary::{DecoderConfig, TAG_COUNT_FOR_PROTOCOL, decode};
///
/// let mut buffer = vec![TAG_COUNT_FOR_PROTOCOL as u8];
/// for slot in 0..TAG_COUNT_FOR_PROTOCOL {
///     let offset: u16 = if slot == 0 { 0 } else { 0xFFFF };
///     buffer.extend_from_slice(&offset.to_le_bytes());
/// }
/// buffer.extend_from_slice(&[0xAA, 0xBB]);
///
/// let decoded = decode(&buffer, &DecoderConfig::default())?;
/// assert_eq!(decoded.payload(1), Some(&[0xAA, 0xBB][..]));
/// assert_eq!(decoded.payload(2), None);
/// # Ok::<(), acbin_core::protocols::ac_binary::DecodeError>(())
/// ```
pub fn decode<'a>(buffer: &'a [u8], config: &DecoderConfig) -> Result<DecodedTags<'a>, DecodeError> {
    decode_with_index(buffer, AC_TAG_INDEX, config)
}

/// Decode a capture whose offset table follows `index`.
pub fn decode_with_index<'a>(
    buffer: &'a [u8],
    index: TagIndex<'_>,
    config: &DecoderConfig,
) -> Result<DecodedTags<'a>, DecodeError> {
    let mut records = extract_offsets(buffer, index)?;
    let header_size = index.header_size();
    infer_lengths(&mut records, buffer.len(), header_size, config.offset_order)?;
    resolve_data(&mut records, buffer, header_size, config.slice_bounds)?;

    debug!(
        tags = records.len(),
        present = records.iter().filter(|record| record.is_present()).count(),
        bytes = buffer.len(),
        "decoded tag table"
    );
    #[cfg(debug_assertions)]
    diagnostics::trace_tags(&records);

    Ok(DecodedTags {
        records,
        header_size,
        buffer_len: buffer.len(),
    })
}

/// Read the declared tag count and the offset table.
///
/// Lengths are left at zero and payloads empty; the payload region is not
/// touched.
pub fn extract_offsets<'a>(
    buffer: &'a [u8],
    index: TagIndex<'_>,
) -> Result<Vec<TagRecord<'a>>, DecodeError> {
    let reader = AcBinaryReader::new(buffer);
    let declared = reader.read_tag_count()?;
    if usize::from(declared) != index.len() {
        return Err(DecodeError::ProtocolMismatch {
            declared,
            expected: index.len(),
        });
    }
    reader.require_len(index.header_size())?;

    let mut records = Vec::new();
    records
        .try_reserve_exact(index.len())
        .map_err(|_| DecodeError::AllocationFailed { count: index.len() })?;
    for (slot, &tag) in index.ids().iter().enumerate() {
        let offset = reader.read_tag_offset(slot)?;
        records.push(TagRecord::new(tag, offset));
    }
    Ok(records)
}

/// Fill in lengths: each present tag runs up to the next present tag, the
/// last present tag runs to the end of the buffer.
pub fn infer_lengths(
    records: &mut [TagRecord<'_>],
    buffer_len: usize,
    header_size: usize,
    order: OffsetOrder,
) -> Result<(), DecodeError> {
    for slot in 0..records.len().saturating_sub(1) {
        let Some(offset) = records[slot].offset else {
            continue;
        };
        let tag = records[slot].tag;
        let next = records[slot + 1..]
            .iter()
            .find_map(|record| record.offset.map(|next_offset| (record.tag, next_offset)));

        match next {
            Some((next_tag, next_offset)) => {
                records[slot].length = span_length(tag, offset, next_tag, next_offset, order)?;
            }
            None => {
                records[slot].length = tail_length(tag, offset, buffer_len, header_size, order)?;
                return Ok(());
            }
        }
    }

    if let Some(last) = records.last_mut() {
        if let Some(offset) = last.offset {
            last.length = tail_length(last.tag, offset, buffer_len, header_size, order)?;
        }
    }
    Ok(())
}

/// Point every present record at its payload inside `buffer`.
pub fn resolve_data<'a>(
    records: &mut [TagRecord<'a>],
    buffer: &'a [u8],
    header_size: usize,
    bounds: SliceBounds,
) -> Result<(), DecodeError> {
    for record in records.iter_mut() {
        let Some(offset) = record.offset else {
            record.data = &[];
            continue;
        };
        let start = header_size + usize::from(offset);
        let end = start + usize::from(record.length);
        if end <= buffer.len() {
            record.data = &buffer[start..end];
            continue;
        }

        match bounds {
            SliceBounds::Reject => {
                return Err(DecodeError::SliceOutOfBounds {
                    tag: record.tag,
                    start,
                    end,
                    actual: buffer.len(),
                });
            }
            SliceBounds::Clamp => {
                record.data = &buffer[start.min(buffer.len())..];
                // Shorter than the inferred length, so it fits.
                record.length = record.data.len() as u16;
                warn!(
                    tag = record.tag,
                    start,
                    end,
                    buffer_len = buffer.len(),
                    "tag payload clamped to buffer end"
                );
            }
        }
    }
    Ok(())
}

fn span_length(
    tag: u16,
    offset: u16,
    next_tag: u16,
    next_offset: u16,
    order: OffsetOrder,
) -> Result<u16, DecodeError> {
    match order {
        OffsetOrder::Trust => Ok(next_offset.wrapping_sub(offset)),
        OffsetOrder::Strict => {
            next_offset
                .checked_sub(offset)
                .ok_or(DecodeError::OffsetNotMonotonic {
                    tag,
                    offset,
                    next_tag,
                    next_offset,
                })
        }
    }
}

fn tail_length(
    tag: u16,
    offset: u16,
    buffer_len: usize,
    header_size: usize,
    order: OffsetOrder,
) -> Result<u16, DecodeError> {
    if order == OffsetOrder::Trust {
        // 16-bit length field arithmetic, truncation intended.
        return Ok((buffer_len as u16)
            .wrapping_sub(header_size as u16)
            .wrapping_sub(offset));
    }

    let payload_len = buffer_len
        .checked_sub(header_size)
        .ok_or(DecodeError::TooShort {
            needed: header_size,
            actual: buffer_len,
        })?;
    let length = payload_len
        .checked_sub(usize::from(offset))
        .ok_or(DecodeError::OffsetOutOfRange {
            tag,
            offset,
            payload_len,
        })?;
    u16::try_from(length).map_err(|_| DecodeError::LengthOverflow { tag, length })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocols::ac_binary::layout::{TAG_COUNT_FOR_PROTOCOL, TAG_INDEX};

    const TEST_IDS: [u16; 3] = [10, 20, 30];
    const TEST_INDEX: TagIndex<'static> = TagIndex::new(&TEST_IDS);

    fn capture(offsets: &[u16], payload: &[u8]) -> Vec<u8> {
        let mut buffer = vec![offsets.len() as u8];
        for offset in offsets {
            buffer.extend_from_slice(&offset.to_le_bytes());
        }
        buffer.extend_from_slice(payload);
        buffer
    }

    fn decode_test(buffer: &[u8], config: DecoderConfig) -> Result<DecodedTags<'_>, DecodeError> {
        decode_with_index(buffer, TEST_INDEX, &config)
    }

    #[test]
    fn decode_two_present_one_absent() {
        let buffer = [3, 0x00, 0x00, 0x05, 0x00, 0xFF, 0xFF, 1, 2, 3, 4, 5, 6, 7, 8];
        assert_eq!(buffer.len(), 15);

        let decoded = decode_test(&buffer, DecoderConfig::default()).unwrap();
        assert_eq!(decoded.header_size(), 7);
        assert_eq!(decoded.payload_len(), 8);

        let records = decoded.records();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].tag, 10);
        assert_eq!(records[0].offset, Some(0));
        assert_eq!(records[0].length, 5);
        assert_eq!(records[0].data, &[1, 2, 3, 4, 5]);
        assert_eq!(records[1].offset, Some(5));
        assert_eq!(records[1].length, 3);
        assert_eq!(records[1].data, &[6, 7, 8]);
        assert_eq!(records[2].offset, None);
        assert_eq!(records[2].raw_offset(), 0xFFFF);
        assert_eq!(records[2].length, 0);
        assert!(records[2].data.is_empty());
    }

    #[test]
    fn decode_rejects_count_mismatch() {
        let mut buffer = capture(&[0, 1, 2], &[0; 4]);
        buffer[0] = 5;
        let err = decode_test(&buffer, DecoderConfig::default()).unwrap_err();
        assert_eq!(
            err,
            DecodeError::ProtocolMismatch {
                declared: 5,
                expected: 3
            }
        );
    }

    #[test]
    fn extract_offsets_rejects_count_mismatch_before_header_check() {
        let err = extract_offsets(&[4], TEST_INDEX).unwrap_err();
        assert!(matches!(err, DecodeError::ProtocolMismatch { declared: 4, .. }));
    }

    #[test]
    fn extract_offsets_empty_buffer() {
        let err = extract_offsets(&[], TEST_INDEX).unwrap_err();
        assert_eq!(err, DecodeError::TooShort { needed: 1, actual: 0 });
    }

    #[test]
    fn extract_offsets_truncated_header() {
        let err = extract_offsets(&[3, 0, 0, 5], TEST_INDEX).unwrap_err();
        assert_eq!(err, DecodeError::TooShort { needed: 7, actual: 4 });
    }

    #[test]
    fn extract_offsets_pairs_ids_with_offsets() {
        let buffer = capture(&[0x0102, 0xFFFF, 0x0300], &[]);
        let records = extract_offsets(&buffer, TEST_INDEX).unwrap();
        let pairs: Vec<_> = records.iter().map(|r| (r.tag, r.offset, r.length)).collect();
        assert_eq!(
            pairs,
            vec![(10, Some(0x0102), 0), (20, None, 0), (30, Some(0x0300), 0)]
        );
    }

    #[test]
    fn lengths_skip_absent_gaps() {
        let buffer = capture(&[0, 0xFFFF, 4], &[0; 10]);
        let decoded = decode_test(&buffer, DecoderConfig::default()).unwrap();
        let lengths: Vec<_> = decoded.records().iter().map(|r| r.length).collect();
        assert_eq!(lengths, vec![4, 0, 6]);
    }

    #[test]
    fn last_present_tag_before_trailing_absent_runs_to_end() {
        let buffer = capture(&[2, 0xFFFF, 0xFFFF], &[9; 7]);
        let decoded = decode_test(&buffer, DecoderConfig::default()).unwrap();
        assert_eq!(decoded.records()[0].length, 5);
        assert_eq!(decoded.records()[0].data, &[9; 5]);
        assert_eq!(decoded.payload(20), None);
        assert_eq!(decoded.payload(30), None);
    }

    #[test]
    fn only_trailing_tag_present() {
        let buffer = capture(&[0xFFFF, 0xFFFF, 3], &[1, 2, 3, 4, 5, 6]);
        let decoded = decode_test(&buffer, DecoderConfig::default()).unwrap();
        assert_eq!(decoded.records()[2].length, 3);
        assert_eq!(decoded.payload(30), Some(&[4, 5, 6][..]));
    }

    #[test]
    fn all_tags_absent() {
        let buffer = capture(&[0xFFFF; 3], &[1, 2, 3]);
        let decoded = decode_test(&buffer, DecoderConfig::default()).unwrap();
        assert!(decoded.records().iter().all(|r| r.length == 0 && r.data.is_empty()));
        assert_eq!(decoded.present().count(), 0);
        assert_eq!(decoded.describe().count(), 0);
    }

    #[test]
    fn equal_offsets_give_empty_payload() {
        let buffer = capture(&[0, 0, 1], &[7, 8]);
        let decoded = decode_test(&buffer, DecoderConfig::default()).unwrap();
        let lengths: Vec<_> = decoded.records().iter().map(|r| r.length).collect();
        assert_eq!(lengths, vec![0, 1, 1]);
        assert!(decoded.payload(10).unwrap().is_empty());
    }

    #[test]
    fn strict_rejects_decreasing_offsets() {
        let buffer = capture(&[5, 2, 0xFFFF], &[0; 10]);
        let err = decode_test(&buffer, DecoderConfig::default()).unwrap_err();
        assert_eq!(
            err,
            DecodeError::OffsetNotMonotonic {
                tag: 10,
                offset: 5,
                next_tag: 20,
                next_offset: 2
            }
        );
    }

    #[test]
    fn trust_wraps_decreasing_offsets() {
        let buffer = capture(&[5, 2, 0xFFFF], &[0; 10]);
        let mut records = extract_offsets(&buffer, TEST_INDEX).unwrap();
        infer_lengths(&mut records, buffer.len(), 7, OffsetOrder::Trust).unwrap();
        assert_eq!(records[0].length, 2u16.wrapping_sub(5));
        assert_eq!(records[1].length, 8);
    }

    #[test]
    fn trust_with_reject_still_refuses_overlong_slice() {
        let buffer = capture(&[5, 2, 0xFFFF], &[0; 10]);
        let config = DecoderConfig {
            offset_order: OffsetOrder::Trust,
            slice_bounds: SliceBounds::Reject,
        };
        let err = decode_test(&buffer, config).unwrap_err();
        assert!(matches!(err, DecodeError::SliceOutOfBounds { tag: 10, start: 12, .. }));
    }

    #[test]
    fn legacy_config_clamps_overlong_slice() {
        let buffer = capture(&[5, 2, 0xFFFF], &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
        let decoded = decode_test(&buffer, DecoderConfig::legacy()).unwrap();
        let first = &decoded.records()[0];
        assert_eq!(first.data, &[5, 6, 7, 8, 9]);
        assert_eq!(first.length, 5);
        assert_eq!(decoded.payload(20), Some(&[2, 3, 4, 5, 6, 7, 8, 9][..]));
    }

    #[test]
    fn strict_rejects_tail_offset_past_payload() {
        let index = TagIndex::new(&[7]);
        let buffer = capture(&[20], &[0; 4]);
        let err = decode_with_index(&buffer, index, &DecoderConfig::default()).unwrap_err();
        assert_eq!(
            err,
            DecodeError::OffsetOutOfRange {
                tag: 7,
                offset: 20,
                payload_len: 4
            }
        );
    }

    #[test]
    fn clamp_past_end_offset_yields_empty_payload() {
        let index = TagIndex::new(&[7]);
        let buffer = capture(&[20], &[0; 4]);
        let decoded = decode_with_index(&buffer, index, &DecoderConfig::legacy()).unwrap();
        assert_eq!(decoded.records()[0].length, 0);
        assert!(decoded.records()[0].data.is_empty());
    }

    #[test]
    fn strict_reports_length_overflow() {
        let index = TagIndex::new(&[7]);
        let buffer = capture(&[0], &vec![0; 0x1_0000]);
        let err = decode_with_index(&buffer, index, &DecoderConfig::default()).unwrap_err();
        assert_eq!(
            err,
            DecodeError::LengthOverflow {
                tag: 7,
                length: 0x1_0000
            }
        );
    }

    #[test]
    fn resolve_rejects_span_past_buffer() {
        let buffer = capture(&[0, 9, 0xFFFF], &[0; 4]);
        let mut records = extract_offsets(&buffer, TEST_INDEX).unwrap();
        records[0].length = 9;
        let err = resolve_data(&mut records, &buffer, 7, SliceBounds::Reject).unwrap_err();
        assert_eq!(
            err,
            DecodeError::SliceOutOfBounds {
                tag: 10,
                start: 7,
                end: 16,
                actual: 11
            }
        );
    }

    #[test]
    fn decode_full_protocol_table() {
        let mut offsets = vec![0xFFFF; TAG_COUNT_FOR_PROTOCOL];
        offsets[0] = 0;
        offsets[7] = 2;
        offsets[TAG_COUNT_FOR_PROTOCOL - 1] = 6;
        let buffer = capture(&offsets, &[1, 1, 2, 2, 2, 2, 3]);

        let decoded = decode(&buffer, &DecoderConfig::default()).unwrap();
        assert_eq!(decoded.records().len(), TAG_COUNT_FOR_PROTOCOL);
        assert_eq!(decoded.header_size(), 59);
        let tags: Vec<_> = decoded.records().iter().map(|r| r.tag).collect();
        assert_eq!(tags, TAG_INDEX.to_vec());
        assert_eq!(decoded.payload(1), Some(&[1, 1][..]));
        assert_eq!(decoded.payload(21), Some(&[2, 2, 2, 2][..]));
        assert_eq!(decoded.payload(48), Some(&[3][..]));
        assert_eq!(decoded.describe().collect::<Vec<_>>(), vec![(1, 2), (21, 4), (48, 1)]);
    }

    #[test]
    fn get_unknown_tag() {
        let buffer = capture(&[0, 1, 2], &[0; 3]);
        let decoded = decode_test(&buffer, DecoderConfig::default()).unwrap();
        assert!(decoded.get(99).is_none());
        assert_eq!(decoded.get(20).map(|r| r.length), Some(1));
    }
}
