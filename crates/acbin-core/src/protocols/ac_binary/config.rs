use serde::{Deserialize, Serialize};

/// How length inference treats offsets that run backwards or past the end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OffsetOrder {
    /// Reject decreasing offsets and offsets beyond the payload region.
    #[default]
    Strict,
    /// Legacy arithmetic: 16-bit wrapping subtraction, no checks.
    Trust,
}

/// What data resolution does with a payload slice that ends past the buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SliceBounds {
    #[default]
    Reject,
    /// Truncate the slice (and the record length) at the end of the buffer.
    Clamp,
}

/// Decoder settings.
///
/// # Examples
/// ```
/// use acbin_core::protocols::ac_binary::{DecoderConfig, OffsetOrder, SliceBounds};
///
/// let config: DecoderConfig = serde_json::from_str(r#"{"offset_order":"trust"}"#)?;
/// assert_eq!(config.offset_order, OffsetOrder::Trust);
/// assert_eq!(config.slice_bounds, SliceBounds::Reject);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    pub offset_order: OffsetOrder,
    pub slice_bounds: SliceBounds,
}

impl DecoderConfig {
    /// Settings that reproduce the legacy firmware decoder as closely as a
    /// safe slice allows.
    pub fn legacy() -> Self {
        Self {
            offset_order: OffsetOrder::Trust,
            slice_bounds: SliceBounds::Clamp,
        }
    }
}
