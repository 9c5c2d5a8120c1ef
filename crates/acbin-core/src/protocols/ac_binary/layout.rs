use std::ops::Range;

/// Position of the declared tag count.
pub const TAG_COUNT_OFFSET: usize = 0;
/// First byte of the offset table.
pub const OFFSET_TABLE_START: usize = 1;
/// Width of one offset table entry.
pub const OFFSET_ENTRY_SIZE: usize = 2;

/// Offset value marking a tag as absent from the capture.
pub const TAG_INVALID: u16 = 0xFFFF;

/// Protocol tag ids, in offset table order.
pub const TAG_INDEX: [u16; 29] = [
    1, 2, 3, 4, 5, 6, 7, //
    21, 22, 23, 24, 25, 26, 27, 28, 29, 30, 31, 32, 33, 34, //
    41, 42, 43, 44, 45, 46, 47, 48,
];

pub const TAG_COUNT_FOR_PROTOCOL: usize = TAG_INDEX.len();

pub const AC_TAG_INDEX: TagIndex<'static> = TagIndex::new(&TAG_INDEX);

/// Header size for a table of `tag_count` entries: count byte plus offsets.
pub const fn header_size(tag_count: usize) -> usize {
    OFFSET_TABLE_START + OFFSET_ENTRY_SIZE * tag_count
}

/// Byte range of the offset entry for table position `slot`.
pub const fn offset_range(slot: usize) -> Range<usize> {
    let start = OFFSET_TABLE_START + OFFSET_ENTRY_SIZE * slot;
    start..start + OFFSET_ENTRY_SIZE
}

/// Ordered tag ids mapping offset table positions to protocol tags.
///
/// # Examples
/// ```
/// use acbin_core::protocols::ac_binary::{AC_TAG_INDEX, TagIndex};
///
/// assert_eq!(AC_TAG_INDEX.len(), 29);
/// assert_eq!(AC_TAG_INDEX.position(21), Some(7));
///
/// let custom = TagIndex::new(&[10, 20, 30]);
/// assert_eq!(custom.header_size(), 7);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagIndex<'t> {
    ids: &'t [u16],
}

impl<'t> TagIndex<'t> {
    pub const fn new(ids: &'t [u16]) -> Self {
        Self { ids }
    }

    pub const fn len(&self) -> usize {
        self.ids.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &'t [u16] {
        self.ids
    }

    pub fn position(&self, tag: u16) -> Option<usize> {
        self.ids.iter().position(|&id| id == tag)
    }

    pub const fn header_size(&self) -> usize {
        header_size(self.ids.len())
    }
}
