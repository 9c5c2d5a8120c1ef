use std::collections::VecDeque;

use super::{BufferEvent, BufferSource, SourceError};

/// Yields in-memory buffers in insertion order.
#[derive(Debug, Default, Clone)]
pub struct MemorySource {
    buffers: VecDeque<Vec<u8>>,
}

impl MemorySource {
    pub fn new<I>(buffers: I) -> Self
    where
        I: IntoIterator<Item = Vec<u8>>,
    {
        Self {
            buffers: buffers.into_iter().collect(),
        }
    }

    pub fn push(&mut self, buffer: Vec<u8>) {
        self.buffers.push_back(buffer);
    }

    pub fn total_bytes(&self) -> u64 {
        self.buffers.iter().map(|buffer| buffer.len() as u64).sum()
    }
}

impl BufferSource for MemorySource {
    fn next_buffer(&mut self) -> Result<Option<BufferEvent>, SourceError> {
        Ok(self.buffers.pop_front().map(|data| BufferEvent { data }))
    }
}
