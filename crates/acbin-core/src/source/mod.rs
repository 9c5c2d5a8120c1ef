mod file;
mod memory;

pub use file::BinaryFileSource;
pub use memory::MemorySource;

use thiserror::Error;

/// One raw capture handed to the decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferEvent {
    pub data: Vec<u8>,
}

/// Supplier of raw capture buffers.
pub trait BufferSource {
    fn next_buffer(&mut self) -> Result<Option<BufferEvent>, SourceError>;
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("empty capture: {0}")]
    Empty(String),
}
