/// Combine a low and a high byte into a little-endian `u16`.
///
/// Every offset in the tag table goes through here, so the byte order is the
/// same on every target.
pub(crate) fn u16_from_le(lo: u8, hi: u8) -> u16 {
    (u16::from(hi) << 8) | u16::from(lo)
}

/// Lowercase hex rendering of a payload slice.
pub(crate) fn hex_string(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
