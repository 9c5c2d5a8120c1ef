use crate::protocols::ac_binary::{DecodedTags, DecoderConfig, decode};
use crate::protocols::common::reader::hex_string;
use crate::{CaptureSummary, TagSummary};

pub(super) fn summarize_capture(index: u64, data: &[u8], config: &DecoderConfig) -> CaptureSummary {
    match decode(data, config) {
        Ok(decoded) => decoded_summary(index, data, &decoded),
        Err(err) => {
            tracing::warn!(capture = index, error = %err, "capture rejected");
            CaptureSummary {
                index,
                bytes: data.len() as u64,
                declared_tags: data.first().copied(),
                header_size: None,
                tags_total: 0,
                tags_present: 0,
                tags: Vec::new(),
                error: Some(err.to_string()),
            }
        }
    }
}

fn decoded_summary(index: u64, data: &[u8], decoded: &DecodedTags<'_>) -> CaptureSummary {
    let tags: Vec<TagSummary> = decoded
        .present()
        .map(|record| TagSummary {
            tag: record.tag,
            offset: record.raw_offset(),
            length: record.length,
            data_hex: hex_string(record.data),
        })
        .collect();

    CaptureSummary {
        index,
        bytes: data.len() as u64,
        declared_tags: data.first().copied(),
        header_size: Some(decoded.header_size() as u64),
        tags_total: decoded.records().len() as u64,
        tags_present: tags.len() as u64,
        tags,
        error: None,
    }
}
