use crate::language::Language;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Line index over a source file.
///
/// Lines are separated by `\n`; a trailing newline does not open an extra
/// line and a `\r` before `\n` belongs to the terminator.
#[derive(Debug, Clone)]
pub struct SourceLines<'a> {
    content: &'a str,
    /// `(start, end)` byte offsets per line, terminator excluded
    bounds: Vec<(usize, usize)>,
}

impl<'a> SourceLines<'a> {
    #[must_use]
    pub fn new(content: &'a str) -> Self {
        let bytes = content.as_bytes();
        let mut bounds = Vec::new();
        let mut start = 0;

        for (idx, byte) in bytes.iter().enumerate() {
            if *byte != b'\n' {
                continue;
            }
            let end = if idx > start && bytes[idx - 1] == b'\r' {
                idx - 1
            } else {
                idx
            };
            bounds.push((start, end));
            start = idx + 1;
        }

        if start < bytes.len() {
            bounds.push((start, bytes.len()));
        }

        Self { content, bounds }
    }

    /// Number of lines
    #[must_use]
    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }

    /// Text of lines `start..=end` (1-indexed), an exact substring of the source.
    ///
    /// Out-of-range bounds are clamped; an empty range yields `""`.
    #[must_use]
    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        let end = end.min(self.bounds.len());
        if start == 0 || start > end {
            return "";
        }
        let from = self.bounds[start - 1].0;
        let to = self.bounds[end - 1].1;
        &self.content[from..to]
    }

    /// Build a span over lines `start..=end`
    #[must_use]
    pub fn span(&self, start: usize, end: usize, node_count: Option<usize>) -> ChunkSpan<'a> {
        ChunkSpan {
            start_line: start,
            end_line: end,
            content: self.slice(start, end),
            node_count,
        }
    }
}

/// A contiguous run of lines produced by one of the inner chunkers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkSpan<'a> {
    /// Start line (1-indexed)
    pub start_line: usize,

    /// End line (1-indexed, inclusive)
    pub end_line: usize,

    /// Exact text of the covered lines
    pub content: &'a str,

    /// Syntax nodes spanned; `None` for line windows
    pub node_count: Option<usize>,
}

impl ChunkSpan<'_> {
    /// Get the number of lines in this span
    #[must_use]
    pub const fn line_count(&self) -> usize {
        self.end_line.saturating_sub(self.start_line) + 1
    }

    /// Whether this span came from the syntax tree
    #[must_use]
    pub const fn is_structural(&self) -> bool {
        self.node_count.is_some()
    }
}

/// The unit of output handed to the vectorization pipeline.
///
/// Every line of a file lands in some record, so a run of blank lines
/// between two definitions comes out as its own record with empty or
/// whitespace-only `content`. Consumers that embed text may want to drop
/// records where `content.trim().is_empty()`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChunkRecord {
    /// Raw text of the chunk
    pub content: String,

    /// Unique within one chunking run
    pub chunk_id: Uuid,

    /// Path relative to the repository root, `/`-separated
    pub filepath: String,

    /// Base name of `filepath`
    pub file_name: String,

    /// Start line (1-indexed)
    pub start_line_no: usize,

    /// End line (1-indexed, inclusive)
    pub end_line_no: usize,

    /// Character count of `content`
    pub chunk_size: usize,

    /// `end_line_no - start_line_no + 1`
    pub line_count: usize,

    /// Syntax nodes spanned (AST chunks only, `null` for windows)
    pub node_count: Option<usize>,

    /// Classified language tag, `text` when unclassified
    pub language: Language,
}

impl ChunkRecord {
    /// Normalize a span into a record with a fresh id
    #[must_use]
    pub fn from_span(span: &ChunkSpan<'_>, filepath: &str, language: Language) -> Self {
        let file_name = filepath
            .rsplit('/')
            .next()
            .unwrap_or(filepath)
            .to_string();

        Self {
            content: span.content.to_string(),
            chunk_id: Uuid::new_v4(),
            filepath: filepath.to_string(),
            file_name,
            start_line_no: span.start_line,
            end_line_no: span.end_line,
            chunk_size: span.content.chars().count(),
            line_count: span.line_count(),
            node_count: span.node_count,
            language,
        }
    }

    /// Check if chunk contains a specific line
    #[must_use]
    pub const fn contains_line(&self, line: usize) -> bool {
        line >= self.start_line_no && line <= self.end_line_no
    }

    /// Whether this record came from the syntax tree
    #[must_use]
    pub const fn is_structural(&self) -> bool {
        self.node_count.is_some()
    }
}
