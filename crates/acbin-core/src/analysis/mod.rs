use std::path::Path;

use thiserror::Error;

use crate::protocols::ac_binary::DecoderConfig;
use crate::source::{BinaryFileSource, BufferEvent, BufferSource, SourceError};
use crate::{Report, make_stub_report};

mod captures;

use captures::summarize_capture;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
}

/// Decode every capture in a binary file into a report.
pub fn analyze_file(path: &Path, config: &DecoderConfig) -> Result<Report, AnalysisError> {
    let source = BinaryFileSource::open(path)?;
    let bytes = path.metadata()?.len();
    analyze_source(&path.display().to_string(), bytes, source, config)
}

/// Decode every buffer a source yields, in order.
///
/// Decode failures are recorded on the capture they belong to; only source
/// errors abort the analysis.
pub fn analyze_source<S: BufferSource>(
    input_path: &str,
    input_bytes: u64,
    mut source: S,
    config: &DecoderConfig,
) -> Result<Report, AnalysisError> {
    let mut report = make_stub_report(input_path, input_bytes);
    report.config = *config;

    let mut index = 0u64;
    while let Some(BufferEvent { data }) = source.next_buffer()? {
        report.captures.push(summarize_capture(index, &data, config));
        index += 1;
    }

    tracing::debug!(
        captures = report.captures.len(),
        failed = report.failed_captures(),
        "analysis complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;

    fn capture(offsets: &[u16], payload: &[u8]) -> Vec<u8> {
        let mut buffer = vec![offsets.len() as u8];
        for offset in offsets {
            buffer.extend_from_slice(&offset.to_le_bytes());
        }
        buffer.extend_from_slice(payload);
        buffer
    }

    fn protocol_capture(present: &[(usize, u16)], payload: &[u8]) -> Vec<u8> {
        let mut offsets = vec![0xFFFF; crate::TAG_COUNT_FOR_PROTOCOL];
        for &(slot, offset) in present {
            offsets[slot] = offset;
        }
        capture(&offsets, payload)
    }

    #[test]
    fn analyze_source_keeps_going_after_decode_error() {
        let good = protocol_capture(&[(0, 0), (1, 2)], &[0xAA, 0xBB, 0xCC]);
        let bad = capture(&[0, 1, 2], &[0; 3]);
        let source = MemorySource::new(vec![good, bad]);

        let report =
            analyze_source("memory", source.total_bytes(), source, &DecoderConfig::default())
                .expect("analysis");
        assert_eq!(report.captures.len(), 2);
        assert_eq!(report.failed_captures(), 1);

        let first = &report.captures[0];
        assert_eq!(first.index, 0);
        assert!(first.error.is_none());
        assert_eq!(first.tags_present, 2);
        assert_eq!(first.tags[0].data_hex, "aabb");
        assert_eq!(first.tags[1].data_hex, "cc");

        let second = &report.captures[1];
        assert_eq!(second.index, 1);
        assert_eq!(second.declared_tags, Some(3));
        assert!(second.tags.is_empty());
        assert!(
            second
                .error
                .as_deref()
                .is_some_and(|msg| msg.contains("protocol mismatch"))
        );
    }

    #[test]
    fn analyze_source_echoes_config() {
        let source = MemorySource::default();
        let report = analyze_source("memory", 0, source, &DecoderConfig::legacy()).unwrap();
        assert!(report.captures.is_empty());
        assert_eq!(report.config, DecoderConfig::legacy());
    }
}
