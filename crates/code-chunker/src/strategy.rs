use crate::error::{ChunkerError, Result};
use crate::types::{ChunkSpan, SourceLines};

/// Fixed-size line windows with overlap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowChunker {
    window_size: usize,
    overlap_size: usize,
}

impl WindowChunker {
    pub fn new(window_size: usize, overlap_size: usize) -> Result<Self> {
        if window_size == 0 {
            return Err(ChunkerError::invalid_config("window_size must be > 0"));
        }
        if overlap_size >= window_size {
            return Err(ChunkerError::invalid_config(format!(
                "overlap_size ({overlap_size}) must be less than window_size ({window_size})"
            )));
        }
        Ok(Self {
            window_size,
            overlap_size,
        })
    }

    #[must_use]
    pub const fn window_size(&self) -> usize {
        self.window_size
    }

    #[must_use]
    pub const fn overlap_size(&self) -> usize {
        self.overlap_size
    }

    /// Window the whole file
    #[must_use]
    pub fn chunk<'a>(&self, lines: &SourceLines<'a>) -> Vec<ChunkSpan<'a>> {
        self.chunk_range(lines, 1, lines.len())
    }

    /// Window lines `first..=last` (1-indexed).
    ///
    /// Stops as soon as a window reaches `last`, so the final window is
    /// truncated instead of running past the range.
    #[must_use]
    pub fn chunk_range<'a>(
        &self,
        lines: &SourceLines<'a>,
        first: usize,
        last: usize,
    ) -> Vec<ChunkSpan<'a>> {
        let last = last.min(lines.len());
        if first == 0 || first > last {
            return Vec::new();
        }

        let step = self.window_size - self.overlap_size;
        let mut chunks = Vec::with_capacity((last - first) / step + 1);
        let mut start = first;

        loop {
            let end = start.saturating_add(self.window_size - 1).min(last);
            chunks.push(lines.span(start, end, None));
            if end == last {
                break;
            }
            start = start.saturating_add(step);
        }

        chunks
    }
}
