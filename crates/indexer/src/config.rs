use crate::error::{IndexerError, Result};
use crate::filter::PathFilter;
use crate::router::ChunkerRouter;
use crate::scanner::{RepositoryWalker, DEFAULT_MAX_FILE_SIZE};
use repochunk_chunker::{
    Chunker, ChunkerConfig, Language, LanguageClassifier, DEFAULT_OVERLAP_SIZE,
    DEFAULT_WINDOW_SIZE,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Languages routed to structural chunking by default
pub const DEFAULT_AST_LANGUAGES: &[&str] = &[
    "python",
    "rust",
    "javascript",
    "typescript",
    "java",
    "go",
    "csharp",
];

/// Per-language settings under the `languages` key
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LanguageSettings {
    /// Overrides the global `nesting_depth`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nesting_depth: Option<usize>,
}

/// Repository chunking configuration, usually loaded from YAML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RepoChunkerConfig {
    /// Exclusion patterns: bare names, `name/` for directories only, or globs
    pub exclude: Vec<String>,

    /// Extra extensions never chunked
    pub exclude_extensions: Vec<String>,

    /// Prepend the built-in VCS/cache/build directories and binary extensions
    pub default_excludes: bool,

    /// Language tags chunked along syntax-tree definitions
    pub ast_chunker_languages: Vec<String>,

    /// Lines per window
    pub window_size: usize,

    /// Lines shared by consecutive windows
    pub overlap_size: usize,

    /// Definition levels opened to emit nested definitions
    pub nesting_depth: usize,

    /// Per-language overrides keyed by language tag
    pub languages: BTreeMap<String, LanguageSettings>,

    /// Extension to language tag overrides
    pub extensions: BTreeMap<String, String>,

    /// Files larger than this many bytes are skipped
    pub max_file_size: u64,

    /// Honor `.gitignore` files while walking
    pub respect_gitignore: bool,
}

impl Default for RepoChunkerConfig {
    fn default() -> Self {
        Self {
            exclude: Vec::new(),
            exclude_extensions: Vec::new(),
            default_excludes: true,
            ast_chunker_languages: DEFAULT_AST_LANGUAGES
                .iter()
                .map(|tag| (*tag).to_string())
                .collect(),
            window_size: DEFAULT_WINDOW_SIZE,
            overlap_size: DEFAULT_OVERLAP_SIZE,
            nesting_depth: 0,
            languages: BTreeMap::new(),
            extensions: BTreeMap::new(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            respect_gitignore: false,
        }
    }
}

impl RepoChunkerConfig {
    /// Load configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            IndexerError::config(format!("failed to read {}: {e}", path.display()))
        })?;
        let config = Self::from_yaml_str(&content)?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        // An empty document means "all defaults".
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Write configuration back as YAML
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_yaml_string()?)?;
        Ok(())
    }

    /// Check every setting without touching the filesystem
    pub fn validate(&self) -> Result<()> {
        self.chunker_config()?;
        self.classifier()?;
        self.path_filter()?;
        Ok(())
    }

    /// Window and nesting settings for the per-file chunker
    pub fn chunker_config(&self) -> Result<ChunkerConfig> {
        let mut language_nesting = BTreeMap::new();
        for (tag, settings) in &self.languages {
            let language = parse_tag(tag, "languages")?;
            if language_nesting.contains_key(&language) {
                return Err(IndexerError::config(format!(
                    "language `{language}` is configured more than once under `languages`"
                )));
            }
            if let Some(depth) = settings.nesting_depth {
                language_nesting.insert(language, depth);
            }
        }

        let config = ChunkerConfig {
            window_size: self.window_size,
            overlap_size: self.overlap_size,
            nesting_depth: self.nesting_depth,
            language_nesting,
        };
        config.validate().map_err(IndexerError::config)?;
        Ok(config)
    }

    pub fn classifier(&self) -> Result<LanguageClassifier> {
        let mut ast_languages = BTreeSet::new();
        for tag in &self.ast_chunker_languages {
            let language = parse_tag(tag, "ast_chunker_languages")?;
            if !ast_languages.insert(language) {
                return Err(IndexerError::config(format!(
                    "language `{language}` is listed more than once in `ast_chunker_languages`"
                )));
            }
        }

        let mut classifier = LanguageClassifier::new(ast_languages)
            .map_err(|e| IndexerError::config(e.to_string()))?;
        for (ext, tag) in &self.extensions {
            if ext.trim_start_matches('.').is_empty() {
                return Err(IndexerError::config("empty extension under `extensions`"));
            }
            classifier = classifier.with_extension(ext, parse_tag(tag, "extensions")?);
        }
        Ok(classifier)
    }

    pub fn path_filter(&self) -> Result<PathFilter> {
        let mut builder = PathFilter::builder();
        if self.default_excludes {
            builder = builder.default_excludes();
        }
        builder
            .patterns(&self.exclude)
            .extensions(&self.exclude_extensions)
            .build()
    }

    /// Validate and wire a router
    pub fn build_router(&self) -> Result<ChunkerRouter> {
        let chunker = Chunker::new(self.chunker_config()?)?;
        let walker = RepositoryWalker::new(self.path_filter()?)
            .max_file_size(self.max_file_size)
            .respect_gitignore(self.respect_gitignore);
        Ok(ChunkerRouter::new(walker, self.classifier()?, chunker))
    }
}

fn parse_tag(tag: &str, key: &str) -> Result<Language> {
    Language::from_tag(tag)
        .ok_or_else(|| IndexerError::config(format!("unknown language tag `{tag}` in `{key}`")))
}
