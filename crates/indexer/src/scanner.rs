use crate::error::{IndexerError, Result};
use crate::filter::PathFilter;
use crate::stats::SkippedFile;
use ignore::WalkBuilder;
use repochunk_chunker::Language;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Files larger than this are skipped unless configured otherwise
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1_048_576; // 1 MB

/// A file admitted by the walker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    /// Absolute path on disk
    pub path: PathBuf,

    /// Path relative to the repository root
    pub relative_path: PathBuf,

    /// `relative_path` with `/` separators
    pub filepath: String,

    /// Lowercased extension without the dot
    pub extension: Option<String>,

    /// Size in bytes
    pub size: u64,

    /// Filled in once the file is classified
    pub language: Option<Language>,
}

impl FileDescriptor {
    /// Base name of the file
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.filepath.rsplit('/').next().unwrap_or(&self.filepath)
    }
}

/// Deterministic traversal of a repository tree
#[derive(Debug, Clone)]
pub struct RepositoryWalker {
    filter: Arc<PathFilter>,
    max_file_size: u64,
    respect_gitignore: bool,
}

impl RepositoryWalker {
    pub fn new(filter: PathFilter) -> Self {
        Self {
            filter: Arc::new(filter),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            respect_gitignore: false,
        }
    }

    #[must_use]
    pub const fn max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    #[must_use]
    pub const fn respect_gitignore(mut self, enabled: bool) -> Self {
        self.respect_gitignore = enabled;
        self
    }

    pub fn filter(&self) -> &PathFilter {
        &self.filter
    }

    /// Walk `root`, yielding admitted files sorted by path components.
    ///
    /// Excluded directories are pruned and never read.
    pub fn walk(&self, root: impl AsRef<Path>) -> Result<Walk> {
        let root = root.as_ref();
        let root = std::fs::canonicalize(root).map_err(|e| {
            IndexerError::InvalidPath(format!("{}: {e}", root.display()))
        })?;
        if !root.is_dir() {
            return Err(IndexerError::InvalidPath(format!(
                "{} is not a directory",
                root.display()
            )));
        }

        let mut builder = WalkBuilder::new(&root);
        builder
            .standard_filters(false)
            .git_ignore(self.respect_gitignore)
            .git_exclude(self.respect_gitignore)
            .require_git(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b));

        let filter = Arc::clone(&self.filter);
        let filter_root = root.clone();
        builder.filter_entry(move |entry| {
            let Ok(relative) = entry.path().strip_prefix(&filter_root) else {
                return true;
            };
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            let admitted = filter.admit(relative, is_dir);
            if !admitted && is_dir {
                log::debug!("Pruning excluded directory {}", relative.display());
            }
            admitted
        });

        Ok(Walk {
            inner: builder.build(),
            root,
            max_file_size: self.max_file_size,
            skipped: Vec::new(),
        })
    }
}

/// Lazy, single-pass sequence of admitted files
pub struct Walk {
    inner: ignore::Walk,
    root: PathBuf,
    max_file_size: u64,
    skipped: Vec<SkippedFile>,
}

impl Walk {
    /// Canonical repository root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Files skipped since the last call
    pub fn drain_skipped(&mut self) -> Vec<SkippedFile> {
        std::mem::take(&mut self.skipped)
    }

    fn normalize_path(&self, path: &Path) -> (PathBuf, String) {
        let relative = path.strip_prefix(&self.root).unwrap_or(path).to_path_buf();
        let mut normalized = relative.to_string_lossy().to_string();
        if normalized.contains('\\') {
            normalized = normalized.replace('\\', "/");
        }
        (relative, normalized)
    }

    fn skip(&mut self, filepath: String, reason: String) {
        self.skipped.push(SkippedFile { filepath, reason });
    }
}

impl Iterator for Walk {
    type Item = FileDescriptor;

    fn next(&mut self) -> Option<FileDescriptor> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("Skipping unreadable entry: {e}");
                    continue;
                }
            };

            let Some(file_type) = entry.file_type() else {
                continue;
            };
            if !file_type.is_file() {
                continue;
            }

            let (relative_path, filepath) = self.normalize_path(entry.path());
            let size = match entry.metadata() {
                Ok(meta) => meta.len(),
                Err(e) => {
                    log::warn!("Skipping {filepath}: {e}");
                    self.skip(filepath, format!("metadata unavailable: {e}"));
                    continue;
                }
            };

            if size == 0 {
                log::warn!("Skipping empty file {filepath}");
                self.skip(filepath, "empty file".to_string());
                continue;
            }
            if size > self.max_file_size {
                log::debug!(
                    "Skipping large file {filepath} ({size} bytes > {})",
                    self.max_file_size
                );
                self.skip(filepath, format!("larger than {} bytes", self.max_file_size));
                continue;
            }

            let extension = relative_path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(str::to_lowercase);

            return Some(FileDescriptor {
                path: entry.path().to_path_buf(),
                relative_path,
                filepath,
                extension,
                size,
                language: None,
            });
        }
    }
}
