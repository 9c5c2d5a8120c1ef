use thiserror::Error;

/// Errors returned by AC binary decoding.
///
/// # Examples
/// ```
/// use acbin_core::protocols::ac_binary::DecodeError;
///
/// let err = DecodeError::ProtocolMismatch { declared: 5, expected: 3 };
/// assert!(err.to_string().contains("protocol mismatch"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("buffer too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },
    #[error("protocol mismatch: declared {declared} tags, expected {expected}")]
    ProtocolMismatch { declared: u8, expected: usize },
    #[error("failed to allocate {count} tag records")]
    AllocationFailed { count: usize },
    #[error("offset not monotonic: tag {tag} at {offset}, next tag {next_tag} at {next_offset}")]
    OffsetNotMonotonic {
        tag: u16,
        offset: u16,
        next_tag: u16,
        next_offset: u16,
    },
    #[error("offset out of range: tag {tag} at {offset}, payload is {payload_len} bytes")]
    OffsetOutOfRange {
        tag: u16,
        offset: u16,
        payload_len: usize,
    },
    #[error("tag {tag} length {length} does not fit in 16 bits")]
    LengthOverflow { tag: u16, length: usize },
    #[error("tag {tag} payload {start}..{end} exceeds buffer of {actual} bytes")]
    SliceOutOfBounds {
        tag: u16,
        start: usize,
        end: usize,
        actual: usize,
    },
}
