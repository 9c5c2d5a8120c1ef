use std::fs;
use std::path::{Path, PathBuf};

use super::{BufferEvent, BufferSource, SourceError};

/// Reads one binary capture file and yields it as a single buffer.
pub struct BinaryFileSource {
    path: PathBuf,
    pending: Option<Vec<u8>>,
}

impl BinaryFileSource {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let data = fs::read(path)?;
        if data.is_empty() {
            return Err(SourceError::Empty(path.display().to_string()));
        }
        tracing::debug!(path = %path.display(), bytes = data.len(), "loaded capture");
        Ok(Self {
            path: path.to_path_buf(),
            pending: Some(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BufferSource for BinaryFileSource {
    fn next_buffer(&mut self) -> Result<Option<BufferEvent>, SourceError> {
        Ok(self.pending.take().map(|data| BufferEvent { data }))
    }
}
