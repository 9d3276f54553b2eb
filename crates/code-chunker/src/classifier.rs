use crate::error::{ChunkerError, Result};
use crate::language::{AstLanguage, Language};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

/// How a file is split
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChunkStrategy {
    /// Definitions from the syntax tree, residual lines windowed
    Structural(AstLanguage),
    /// Line windows only
    Window,
}

impl ChunkStrategy {
    #[must_use]
    pub const fn is_structural(self) -> bool {
        matches!(self, Self::Structural(_))
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Structural(_) => "structural",
            Self::Window => "window",
        }
    }
}

/// Result of classifying one file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub language: Language,
    pub strategy: ChunkStrategy,
}

impl Classification {
    /// Unrecognized content
    pub const TEXT: Self = Self {
        language: Language::Text,
        strategy: ChunkStrategy::Window,
    };
}

/// Maps paths to language tags and a chunking strategy
#[derive(Debug, Clone)]
pub struct LanguageClassifier {
    ast_languages: BTreeSet<Language>,
    extension_overrides: HashMap<String, Language>,
}

impl Default for LanguageClassifier {
    fn default() -> Self {
        Self {
            ast_languages: Language::ALL
                .iter()
                .copied()
                .filter(|lang| lang.supports_ast())
                .collect(),
            extension_overrides: HashMap::new(),
        }
    }
}

impl LanguageClassifier {
    /// Create a classifier that routes `ast_languages` to structural chunking.
    ///
    /// Fails when a language has no bundled grammar.
    pub fn new(ast_languages: impl IntoIterator<Item = Language>) -> Result<Self> {
        let mut enabled = BTreeSet::new();
        for language in ast_languages {
            if !language.supports_ast() {
                return Err(ChunkerError::unsupported_language(format!(
                    "{language} has no syntax grammar for AST chunking"
                )));
            }
            enabled.insert(language);
        }

        Ok(Self {
            ast_languages: enabled,
            extension_overrides: HashMap::new(),
        })
    }

    /// Builder: map an extension to a language ahead of the fixed table
    #[must_use]
    pub fn with_extension(mut self, ext: &str, language: Language) -> Self {
        self.extension_overrides
            .insert(ext.trim_start_matches('.').to_lowercase(), language);
        self
    }

    /// Languages routed to structural chunking
    pub fn ast_languages(&self) -> impl Iterator<Item = Language> + '_ {
        self.ast_languages.iter().copied()
    }

    /// Classify from the path alone
    #[must_use]
    pub fn classify(&self, path: impl AsRef<Path>) -> Classification {
        let path = path.as_ref();
        self.detect_language(path)
            .map_or(Classification::TEXT, |language| self.route(path, language))
    }

    /// Classify from the path, falling back to the shebang line of `content`
    #[must_use]
    pub fn classify_source(&self, path: impl AsRef<Path>, content: &str) -> Classification {
        let path = path.as_ref();
        let language = self.detect_language(path).or_else(|| {
            content
                .lines()
                .next()
                .and_then(Language::from_shebang)
        });
        language.map_or(Classification::TEXT, |language| self.route(path, language))
    }

    /// Language from extension overrides, the extension table, then file name
    #[must_use]
    pub fn detect_language(&self, path: &Path) -> Option<Language> {
        let from_extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| {
                self.extension_overrides
                    .get(&ext.to_lowercase())
                    .copied()
                    .or_else(|| Language::from_extension(ext))
            });

        from_extension.or_else(|| {
            path.file_name()
                .and_then(|name| name.to_str())
                .and_then(Language::from_file_name)
        })
    }

    fn route(&self, path: &Path, language: Language) -> Classification {
        let strategy = if self.ast_languages.contains(&language) {
            AstLanguage::for_path(language, path).map_or(ChunkStrategy::Window, ChunkStrategy::Structural)
        } else {
            ChunkStrategy::Window
        };
        Classification { language, strategy }
    }
}
