use crate::ast_analyzer::StructuralChunker;
use crate::classifier::ChunkStrategy;
use crate::config::ChunkerConfig;
use crate::error::{ChunkerError, Result};
use crate::language::AstLanguage;
use crate::strategy::WindowChunker;
use crate::types::{ChunkSpan, SourceLines};

/// Which path produced a file's chunks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChunkMode {
    /// Syntax-tree definitions plus windowed residual lines
    Structural,
    /// Line windows only
    Window,
    /// Structural chunking was requested but the source did not parse
    Fallback,
}

/// Spans for one file, sorted by line
#[derive(Debug, Clone)]
pub struct ChunkOutcome<'a> {
    pub spans: Vec<ChunkSpan<'a>>,
    pub mode: ChunkMode,
}

/// Composes structural and window chunking for a single file
#[derive(Debug, Clone)]
pub struct Chunker {
    config: ChunkerConfig,
    structural: StructuralChunker,
    window: WindowChunker,
}

impl Chunker {
    /// Create a new chunker with configuration
    pub fn new(config: ChunkerConfig) -> Result<Self> {
        config.validate().map_err(ChunkerError::invalid_config)?;
        let window = WindowChunker::new(config.window_size, config.overlap_size)?;
        Ok(Self {
            config,
            structural: StructuralChunker::new(),
            window,
        })
    }

    /// Chunk a whole file with the given strategy.
    ///
    /// Structural failures degrade to line windows, so this never fails.
    pub fn chunk<'a>(
        &self,
        lines: &SourceLines<'a>,
        content: &'a str,
        strategy: ChunkStrategy,
    ) -> ChunkOutcome<'a> {
        let ChunkStrategy::Structural(language) = strategy else {
            return ChunkOutcome {
                spans: self.window.chunk(lines),
                mode: ChunkMode::Window,
            };
        };

        match self.chunk_structural(lines, content, language) {
            Ok(spans) => ChunkOutcome {
                spans,
                mode: ChunkMode::Structural,
            },
            Err(e) => {
                log::debug!("AST chunking failed, falling back to line windows: {e}");
                ChunkOutcome {
                    spans: self.window.chunk(lines),
                    mode: ChunkMode::Fallback,
                }
            }
        }
    }

    /// Definition chunks plus windows over every line they leave uncovered
    pub fn chunk_structural<'a>(
        &self,
        lines: &SourceLines<'a>,
        content: &'a str,
        language: AstLanguage,
    ) -> Result<Vec<ChunkSpan<'a>>> {
        let depth = self.config.nesting_depth_for(language.language());
        let definitions = self.structural.chunk(lines, content, language, depth)?;

        let mut spans = Vec::with_capacity(definitions.len() * 2 + 1);
        let mut next_uncovered = 1;
        for definition in definitions {
            if definition.start_line > next_uncovered {
                spans.extend(self.window.chunk_range(
                    lines,
                    next_uncovered,
                    definition.start_line - 1,
                ));
            }
            next_uncovered = definition.end_line + 1;
            spans.push(definition);
        }
        spans.extend(self.window.chunk_range(lines, next_uncovered, lines.len()));

        Ok(spans)
    }

    /// Line windows over the whole file
    #[must_use]
    pub fn chunk_windows<'a>(&self, lines: &SourceLines<'a>) -> Vec<ChunkSpan<'a>> {
        self.window.chunk(lines)
    }

    /// Get configuration
    #[must_use]
    pub const fn config(&self) -> &ChunkerConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Language;
    use pretty_assertions::assert_eq;

    fn chunker(window_size: usize, overlap_size: usize) -> Chunker {
        Chunker::new(ChunkerConfig {
            window_size,
            overlap_size,
            ..Default::default()
        })
        .unwrap()
    }

    fn ranges(spans: &[ChunkSpan<'_>]) -> Vec<(usize, usize, bool)> {
        spans
            .iter()
            .map(|s| (s.start_line, s.end_line, s.is_structural()))
            .collect()
    }

    /// Five import lines, blank padding, a function on lines 10-25, trailer
    fn function_with_preamble() -> String {
        let mut code = String::new();
        for module in ["os", "sys", "json", "re", "math"] {
            code.push_str(&format!("import {module}\n"));
        }
        code.push_str("\n\n\n\n");
        code.push_str("def compute(values):\n");
        for i in 0..14 {
            code.push_str(&format!("    values.append({i})\n"));
        }
        code.push_str("    return values\n");
        code.push_str("\n\nRESULT = compute([])\n");
        code
    }

    #[test]
    fn test_preamble_and_trailer_are_swept_into_windows() {
        let code = function_with_preamble();
        let lines = SourceLines::new(&code);
        let outcome = chunker(100, 20).chunk(
            &lines,
            &code,
            ChunkStrategy::Structural(AstLanguage::Python),
        );

        assert_eq!(outcome.mode, ChunkMode::Structural);
        assert_eq!(
            ranges(&outcome.spans),
            vec![(1, 9, false), (10, 25, true), (26, 28, false)]
        );
        assert!(outcome.spans[1].node_count.unwrap() > 0);
        assert!(outcome.spans[1].content.starts_with("def compute"));
    }

    #[test]
    fn test_every_line_attributed_to_exactly_one_kind() {
        let code = function_with_preamble();
        let lines = SourceLines::new(&code);
        let spans = chunker(3, 1)
            .chunk_structural(&lines, &code, AstLanguage::Python)
            .unwrap();

        let mut structural = vec![0usize; lines.len() + 1];
        let mut windowed = vec![0usize; lines.len() + 1];
        for span in &spans {
            for line in span.start_line..=span.end_line {
                if span.is_structural() {
                    structural[line] += 1;
                } else {
                    windowed[line] += 1;
                }
            }
        }

        for line in 1..=lines.len() {
            assert!(
                (structural[line] == 1) != (windowed[line] > 0),
                "line {line} attributed to both or neither"
            );
        }
    }

    #[test]
    fn test_spans_are_sorted() {
        let code = "import a\n\ndef f():\n    pass\n\nX = 1\n\ndef g():\n    pass\n";
        let lines = SourceLines::new(code);
        let spans = chunker(100, 20)
            .chunk_structural(&lines, code, AstLanguage::Python)
            .unwrap();

        assert_eq!(
            ranges(&spans),
            vec![
                (1, 2, false),
                (3, 4, true),
                (5, 7, false),
                (8, 9, true),
            ]
        );
    }

    #[test]
    fn test_parse_failure_falls_back_to_windows() {
        let code = "def broken(:\n    pass\n";
        let lines = SourceLines::new(code);
        let outcome = chunker(100, 20).chunk(
            &lines,
            code,
            ChunkStrategy::Structural(AstLanguage::Python),
        );

        assert_eq!(outcome.mode, ChunkMode::Fallback);
        assert_eq!(ranges(&outcome.spans), vec![(1, 2, false)]);
    }

    #[test]
    fn test_window_strategy() {
        let code: String = (0..250).map(|i| format!("X_{i} = {i}\n")).collect();
        let lines = SourceLines::new(&code);
        let outcome = chunker(100, 20).chunk(&lines, &code, ChunkStrategy::Window);

        assert_eq!(outcome.mode, ChunkMode::Window);
        assert_eq!(
            ranges(&outcome.spans),
            vec![(1, 100, false), (81, 180, false), (161, 250, false)]
        );
    }

    #[test]
    fn test_python_without_definitions_is_windowed() {
        let code: String = (0..250).map(|i| format!("X_{i} = {i}\n")).collect();
        let lines = SourceLines::new(&code);
        let outcome = chunker(100, 20).chunk(
            &lines,
            &code,
            ChunkStrategy::Structural(AstLanguage::Python),
        );

        assert_eq!(outcome.mode, ChunkMode::Structural);
        assert_eq!(
            ranges(&outcome.spans),
            vec![(1, 100, false), (81, 180, false), (161, 250, false)]
        );
    }

    #[test]
    fn test_language_nesting_override() {
        let mut config = ChunkerConfig::default();
        config.language_nesting.insert(Language::Python, 1);
        let chunker = Chunker::new(config).unwrap();

        let code = "class A:\n    def a(self):\n        pass\n";
        let lines = SourceLines::new(code);
        let spans = chunker
            .chunk_structural(&lines, code, AstLanguage::Python)
            .unwrap();

        assert_eq!(ranges(&spans), vec![(1, 1, false), (2, 3, true)]);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let result = Chunker::new(ChunkerConfig {
            window_size: 5,
            overlap_size: 5,
            ..Default::default()
        });
        assert!(matches!(result, Err(ChunkerError::InvalidConfig(_))));
    }
}
