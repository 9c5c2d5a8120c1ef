use super::parser::TagRecord;

/// Lazily list `(tag, length)` for records that carry payload bytes.
pub fn describe_tags(records: &[TagRecord<'_>]) -> impl Iterator<Item = (u16, u16)> {
    records
        .iter()
        .filter(|record| record.length > 0)
        .map(|record| (record.tag, record.length))
}

#[cfg(debug_assertions)]
pub(crate) fn trace_tags(records: &[TagRecord<'_>]) {
    for (tag, length) in describe_tags(records) {
        tracing::debug!(tag, length, "tag payload");
    }
}
