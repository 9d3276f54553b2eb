use repochunk_chunker::{ChunkMode, Language};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A file that was walked but produced no chunks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedFile {
    pub filepath: String,
    pub reason: String,
}

/// Statistics about a chunking pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkStats {
    /// Number of files chunked
    pub files: usize,

    /// Number of chunks emitted
    pub chunks: usize,

    /// Total lines across chunked files
    pub total_lines: usize,

    /// Files split along syntax-tree definitions
    pub structural_files: usize,

    /// Files split into line windows only
    pub window_files: usize,

    /// Structural files that failed to parse and were windowed instead
    pub parse_fallbacks: usize,

    /// Time taken in milliseconds
    pub time_ms: u64,

    /// Files per language
    pub languages: BTreeMap<Language, usize>,

    /// Files skipped, with the reason
    pub skipped: Vec<SkippedFile>,
}

impl ChunkStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_file(&mut self, language: Language, lines: usize, mode: ChunkMode, chunks: usize) {
        self.files += 1;
        self.chunks += chunks;
        self.total_lines += lines;
        *self.languages.entry(language).or_insert(0) += 1;

        match mode {
            ChunkMode::Structural => self.structural_files += 1,
            ChunkMode::Window => self.window_files += 1,
            ChunkMode::Fallback => {
                self.window_files += 1;
                self.parse_fallbacks += 1;
            }
        }
    }

    pub fn add_skipped(&mut self, filepath: impl Into<String>, reason: impl Into<String>) {
        self.skipped.push(SkippedFile {
            filepath: filepath.into(),
            reason: reason.into(),
        });
    }
}

impl fmt::Display for ChunkStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} files, {} chunks, {} lines ({} structural, {} windowed, {} parse fallbacks, {} skipped) in {} ms",
            self.files,
            self.chunks,
            self.total_lines,
            self.structural_files,
            self.window_files,
            self.parse_fallbacks,
            self.skipped.len(),
            self.time_ms
        )
    }
}
