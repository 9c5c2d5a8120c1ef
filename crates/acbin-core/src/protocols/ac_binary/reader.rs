use std::ops::Range;

use super::error::DecodeError;
use super::layout;
use crate::protocols::common::reader::u16_from_le;

pub struct AcBinaryReader<'a> {
    buffer: &'a [u8],
}

impl<'a> AcBinaryReader<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer }
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn require_len(&self, needed: usize) -> Result<(), DecodeError> {
        if self.buffer.len() < needed {
            return Err(DecodeError::TooShort {
                needed,
                actual: self.buffer.len(),
            });
        }
        Ok(())
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8, DecodeError> {
        self.buffer
            .get(offset)
            .copied()
            .ok_or(DecodeError::TooShort {
                needed: offset + 1,
                actual: self.buffer.len(),
            })
    }

    pub fn read_u16_le(&self, range: Range<usize>) -> Result<u16, DecodeError> {
        let bytes = self.read_slice(range)?;
        if bytes.len() != 2 {
            return Err(DecodeError::TooShort {
                needed: 2,
                actual: bytes.len(),
            });
        }
        Ok(u16_from_le(bytes[0], bytes[1]))
    }

    pub fn read_slice(&self, range: Range<usize>) -> Result<&'a [u8], DecodeError> {
        self.buffer.get(range.clone()).ok_or(DecodeError::TooShort {
            needed: range.end,
            actual: self.buffer.len(),
        })
    }

    pub fn read_tag_count(&self) -> Result<u8, DecodeError> {
        self.read_u8(layout::TAG_COUNT_OFFSET)
    }

    /// Offset entry for table position `slot`; `None` for the absent sentinel.
    pub fn read_tag_offset(&self, slot: usize) -> Result<Option<u16>, DecodeError> {
        let raw = self.read_u16_le(layout::offset_range(slot))?;
        Ok((raw != layout::TAG_INVALID).then_some(raw))
    }
}
