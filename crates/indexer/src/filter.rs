use crate::error::{IndexerError, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::BTreeSet;
use std::path::{Component, Path};

/// Directory names excluded when `default_excludes` is on
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    // VCS / tooling
    ".git",
    ".hg",
    ".svn",
    ".idea",
    ".vscode",
    ".husky",
    ".yarn",
    ".npm",
    // caches / builds
    ".cache",
    "node_modules",
    ".next",
    ".nuxt",
    ".turbo",
    ".parcel-cache",
    ".svelte-kit",
    ".vite",
    ".gradle",
    ".terraform",
    "build",
    "dist",
    "coverage",
    "target",
    // python environments
    ".venv",
    "venv",
    "__pycache__",
    ".mypy_cache",
    ".pytest_cache",
    ".ruff_cache",
    ".tox",
    ".eggs",
];

/// Binary and media extensions excluded when `default_excludes` is on
pub const DEFAULT_EXCLUDED_EXTENSIONS: &[&str] = &[
    // images
    "png", "jpg", "jpeg", "gif", "bmp", "ico", "icns", "webp", "tif", "tiff", "psd",
    // audio / video
    "mp3", "mp4", "wav", "ogg", "flac", "avi", "mov", "mkv", "webm",
    // fonts
    "woff", "woff2", "ttf", "otf", "eot",
    // archives
    "zip", "tar", "gz", "tgz", "bz2", "xz", "7z", "rar", "jar", "war", "whl", "egg",
    // compiled artifacts
    "exe", "dll", "so", "dylib", "a", "o", "obj", "lib", "bin", "class", "pyc", "pyo", "wasm",
    // data blobs
    "pdf", "db", "sqlite", "sqlite3", "parquet", "npy", "npz", "pkl", "onnx", "pt", "safetensors",
];

/// Decides traversal pruning and file admission.
///
/// Three rule kinds are supported:
/// - a bare name (`node_modules`) excludes any path with an equal component;
///   a trailing `/` (`tests/`) limits it to directories
/// - a glob (`*.lock`, `docs/gen/**`) is matched against the relative path
///   and against the base name
/// - an extension denylist, compared case-insensitively
///
/// A path is excluded if any ancestor is, so pruning a directory and
/// rejecting each of its files agree.
#[derive(Debug, Clone, Default)]
pub struct PathFilter {
    names: BTreeSet<String>,
    dir_names: BTreeSet<String>,
    globs: GlobSet,
    dir_globs: GlobSet,
    extensions: BTreeSet<String>,
}

#[derive(Debug, Default)]
pub struct PathFilterBuilder {
    patterns: Vec<String>,
    extensions: Vec<String>,
}

impl PathFilterBuilder {
    /// Prepend the built-in directory and binary-extension excludes
    #[must_use]
    pub fn default_excludes(mut self) -> Self {
        self.patterns
            .extend(DEFAULT_EXCLUDED_DIRS.iter().map(|dir| format!("{dir}/")));
        self.extensions
            .extend(DEFAULT_EXCLUDED_EXTENSIONS.iter().map(|ext| (*ext).to_string()));
        self
    }

    #[must_use]
    pub fn patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.patterns
            .extend(patterns.into_iter().map(|p| p.as_ref().to_string()));
        self
    }

    #[must_use]
    pub fn extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions
            .extend(extensions.into_iter().map(|e| e.as_ref().to_string()));
        self
    }

    pub fn build(self) -> Result<PathFilter> {
        let mut names = BTreeSet::new();
        let mut dir_names = BTreeSet::new();
        let mut globs = GlobSetBuilder::new();
        let mut dir_globs = GlobSetBuilder::new();

        for raw in &self.patterns {
            let trimmed = raw.trim();
            let dir_only = trimmed.ends_with('/');
            let pattern = trimmed.trim_end_matches('/').trim_start_matches("./");
            let pattern = pattern.strip_prefix('/').unwrap_or(pattern);
            if pattern.is_empty() {
                continue;
            }

            if is_glob(pattern) {
                let glob = Glob::new(pattern).map_err(|e| {
                    IndexerError::config(format!("invalid exclude pattern `{raw}`: {e}"))
                })?;
                if dir_only {
                    dir_globs.add(glob);
                } else {
                    globs.add(glob);
                }
            } else if dir_only {
                dir_names.insert(pattern.to_string());
            } else {
                names.insert(pattern.to_string());
            }
        }

        let compile = |builder: GlobSetBuilder| {
            builder
                .build()
                .map_err(|e| IndexerError::config(format!("invalid exclude patterns: {e}")))
        };

        Ok(PathFilter {
            names,
            dir_names,
            globs: compile(globs)?,
            dir_globs: compile(dir_globs)?,
            extensions: self
                .extensions
                .iter()
                .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
                .filter(|ext| !ext.is_empty())
                .collect(),
        })
    }
}

impl PathFilter {
    pub fn builder() -> PathFilterBuilder {
        PathFilterBuilder::default()
    }

    /// Whether `relative_path` (relative to the repository root) may be
    /// descended into (`is_dir`) or chunked.
    #[must_use]
    pub fn admit(&self, relative_path: &Path, is_dir: bool) -> bool {
        let components: Vec<String> = relative_path
            .components()
            .filter_map(|component| match component {
                Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();

        let mut prefix = String::new();
        for (idx, name) in components.iter().enumerate() {
            let is_last = idx + 1 == components.len();
            let component_is_dir = !is_last || is_dir;

            if !prefix.is_empty() {
                prefix.push('/');
            }
            prefix.push_str(name);

            if self.names.contains(name.as_str()) {
                return false;
            }
            if component_is_dir && self.dir_names.contains(name.as_str()) {
                return false;
            }
            if self.globs.is_match(&prefix) || self.globs.is_match(name) {
                return false;
            }
            if component_is_dir && (self.dir_globs.is_match(&prefix) || self.dir_globs.is_match(name))
            {
                return false;
            }
            if !component_is_dir && self.extension_excluded(name) {
                return false;
            }
        }

        true
    }

    fn extension_excluded(&self, file_name: &str) -> bool {
        if self.extensions.is_empty() {
            return false;
        }
        Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.contains(&ext.to_lowercase()))
    }
}

fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '[', '{']) || pattern.contains('/')
}
