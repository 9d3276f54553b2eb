use crate::error::{IndexerError, Result};
use crate::scanner::{FileDescriptor, RepositoryWalker, Walk};
use crate::stats::ChunkStats;
use rayon::prelude::*;
use repochunk_chunker::{
    ChunkMode, ChunkRecord, Chunker, Classification, Language, LanguageClassifier, SourceLines,
};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use std::time::Instant;

/// Bytes inspected for NUL when sniffing binary content
const BINARY_SNIFF_LEN: usize = 8192;

/// Chunks produced for one file
#[derive(Debug, Clone)]
pub struct FileChunks {
    pub records: Vec<ChunkRecord>,
    pub language: Language,
    pub mode: ChunkMode,
    pub line_count: usize,
}

/// What happened to one admitted file
#[derive(Debug, Clone)]
pub enum FileOutcome {
    Chunked(FileChunks),
    /// NUL byte found; nothing emitted
    Binary,
}

/// Routes each admitted file to structural or window chunking
#[derive(Debug, Clone)]
pub struct ChunkerRouter {
    walker: RepositoryWalker,
    classifier: LanguageClassifier,
    chunker: Chunker,
}

impl ChunkerRouter {
    pub fn new(walker: RepositoryWalker, classifier: LanguageClassifier, chunker: Chunker) -> Self {
        Self {
            walker,
            classifier,
            chunker,
        }
    }

    pub fn walker(&self) -> &RepositoryWalker {
        &self.walker
    }

    pub fn classifier(&self) -> &LanguageClassifier {
        &self.classifier
    }

    pub fn chunker(&self) -> &Chunker {
        &self.chunker
    }

    /// Admitted files with the classification `process_file` would use.
    ///
    /// Only files whose path names no language are opened, and only their
    /// first line is read (for a shebang).
    pub fn files(
        &self,
        root: impl AsRef<Path>,
    ) -> Result<impl Iterator<Item = (FileDescriptor, Classification)> + '_> {
        let walk = self.walker.walk(root)?;
        Ok(walk.map(move |mut descriptor| {
            let classification = self.classify_descriptor(&descriptor);
            descriptor.language = Some(classification.language);
            (descriptor, classification)
        }))
    }

    fn classify_descriptor(&self, descriptor: &FileDescriptor) -> Classification {
        let path = &descriptor.relative_path;
        if self.classifier.detect_language(path).is_some() {
            return self.classifier.classify(path);
        }
        let first_line = read_first_line(&descriptor.path).unwrap_or_else(|e| {
            log::debug!("Cannot sniff {}: {e}", descriptor.filepath);
            String::new()
        });
        self.classifier.classify_source(path, &first_line)
    }

    /// Chunk one file. Binary files yield no records.
    pub fn chunk_file(&self, descriptor: &FileDescriptor) -> Result<Vec<ChunkRecord>> {
        match self.process_file(descriptor)? {
            FileOutcome::Chunked(chunks) => Ok(chunks.records),
            FileOutcome::Binary => Ok(Vec::new()),
        }
    }

    /// Read, classify and chunk one file
    pub fn process_file(&self, descriptor: &FileDescriptor) -> Result<FileOutcome> {
        let bytes = std::fs::read(&descriptor.path)
            .map_err(|e| IndexerError::file_read(&descriptor.relative_path, e))?;

        if bytes.iter().take(BINARY_SNIFF_LEN).any(|byte| *byte == 0) {
            return Ok(FileOutcome::Binary);
        }

        let content = String::from_utf8(bytes).map_err(|e| {
            IndexerError::file_read(
                &descriptor.relative_path,
                std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            )
        })?;

        let classification = self
            .classifier
            .classify_source(&descriptor.relative_path, &content);
        let lines = SourceLines::new(&content);
        let outcome = self.chunker.chunk(&lines, &content, classification.strategy);
        if outcome.mode == ChunkMode::Fallback {
            log::debug!("{} windowed after parse failure", descriptor.filepath);
        }

        let records = outcome
            .spans
            .iter()
            .map(|span| ChunkRecord::from_span(span, &descriptor.filepath, classification.language))
            .collect();

        Ok(FileOutcome::Chunked(FileChunks {
            records,
            language: classification.language,
            mode: outcome.mode,
            line_count: lines.len(),
        }))
    }

    /// Lazily chunk every admitted file under `root`, in walk order
    pub fn chunk_repository(&self, root: impl AsRef<Path>) -> Result<RepositoryChunks<'_>> {
        let walk = self.walker.walk(root)?;
        log::info!("Chunking repository at {}", walk.root().display());
        Ok(RepositoryChunks {
            router: self,
            walk,
            pending: Vec::new().into_iter(),
            stats: ChunkStats::new(),
            started: Instant::now(),
            finished: false,
        })
    }

    /// Chunk files on the rayon pool; records keep walk order
    pub fn chunk_repository_parallel(
        &self,
        root: impl AsRef<Path>,
    ) -> Result<(Vec<ChunkRecord>, ChunkStats)> {
        let started = Instant::now();
        let mut walk = self.walker.walk(root)?;
        log::info!(
            "Chunking repository at {} in parallel",
            walk.root().display()
        );

        let descriptors: Vec<FileDescriptor> = walk.by_ref().collect();
        let mut stats = ChunkStats::new();
        stats.skipped.extend(walk.drain_skipped());

        let outcomes: Vec<Result<FileOutcome>> = descriptors
            .par_iter()
            .map(|descriptor| self.process_file(descriptor))
            .collect();

        let mut records = Vec::new();
        for (descriptor, outcome) in descriptors.iter().zip(outcomes) {
            records.extend(account(&mut stats, descriptor, outcome));
        }

        stats.time_ms = started.elapsed().as_millis() as u64;
        log::info!("Chunking completed: {stats}");
        Ok((records, stats))
    }
}

fn read_first_line(path: &Path) -> std::io::Result<String> {
    let file = File::open(path)?;
    let mut line = Vec::new();
    BufReader::new(file.take(BINARY_SNIFF_LEN as u64)).read_until(b'\n', &mut line)?;
    Ok(String::from_utf8_lossy(&line).into_owned())
}

/// Fold one file's outcome into the running statistics
fn account(
    stats: &mut ChunkStats,
    descriptor: &FileDescriptor,
    outcome: Result<FileOutcome>,
) -> Vec<ChunkRecord> {
    match outcome {
        Ok(FileOutcome::Chunked(chunks)) => {
            stats.add_file(
                chunks.language,
                chunks.line_count,
                chunks.mode,
                chunks.records.len(),
            );
            chunks.records
        }
        Ok(FileOutcome::Binary) => {
            log::debug!("Skipping binary file {}", descriptor.filepath);
            stats.add_skipped(&descriptor.filepath, "binary content");
            Vec::new()
        }
        Err(e) => {
            log::warn!("Failed to process file: {e}");
            stats.add_skipped(&descriptor.filepath, e.to_string());
            Vec::new()
        }
    }
}

/// Lazy, single-pass sequence of records across a repository.
///
/// Statistics accumulate as the iterator is pulled; they are final once it
/// returns `None`.
pub struct RepositoryChunks<'r> {
    router: &'r ChunkerRouter,
    walk: Walk,
    pending: std::vec::IntoIter<ChunkRecord>,
    stats: ChunkStats,
    started: Instant,
    finished: bool,
}

impl RepositoryChunks<'_> {
    pub fn stats(&self) -> &ChunkStats {
        &self.stats
    }

    pub fn into_stats(self) -> ChunkStats {
        self.stats
    }
}

impl Iterator for RepositoryChunks<'_> {
    type Item = ChunkRecord;

    fn next(&mut self) -> Option<ChunkRecord> {
        loop {
            if let Some(record) = self.pending.next() {
                return Some(record);
            }
            if self.finished {
                return None;
            }

            let next = self.walk.next();
            self.stats.skipped.extend(self.walk.drain_skipped());

            let Some(descriptor) = next else {
                self.finished = true;
                self.stats.time_ms = self.started.elapsed().as_millis() as u64;
                log::info!("Chunking completed: {}", self.stats);
                return None;
            };

            let outcome = self.router.process_file(&descriptor);
            self.pending = account(&mut self.stats, &descriptor, outcome).into_iter();
        }
    }
}
