//! # Repochunk Chunker
//!
//! Syntax-aware chunking of a single source file into line-addressed spans.
//!
//! Files whose language has a bundled tree-sitter grammar are split along
//! function and class definitions; every line no definition claims is swept
//! into fixed-size windows. Everything else is windowed directly.
//!
//! ## Architecture
//!
//! ```text
//! Source File
//!     │
//!     ├──> LanguageClassifier (extension / file name / shebang)
//!     │    └─> ChunkStrategy::Structural(grammar) | ChunkStrategy::Window
//!     │
//!     ├──> StructuralChunker
//!     │    ├─> Tree-sitter parse (syntax errors → fallback)
//!     │    └─> Definition spans, opened up to the nesting depth
//!     │
//!     ├──> WindowChunker
//!     │    └─> Residual gaps (or the whole file) in overlapping windows
//!     │
//!     └──> ChunkRecord[] with a fresh chunk_id each
//! ```
//!
//! ## Example
//!
//! ```rust
//! use repochunk_chunker::{Chunker, ChunkerConfig, LanguageClassifier, SourceLines};
//!
//! let chunker = Chunker::new(ChunkerConfig::default()).unwrap();
//! let classifier = LanguageClassifier::default();
//!
//! let code = "import os\n\ndef main():\n    print(os.getcwd())\n";
//! let classification = classifier.classify_source("tool.py", code);
//! let lines = SourceLines::new(code);
//! let outcome = chunker.chunk(&lines, code, classification.strategy);
//!
//! for span in &outcome.spans {
//!     println!("lines {}-{}", span.start_line, span.end_line);
//! }
//! ```

mod ast_analyzer;
mod chunker;
mod classifier;
mod config;
mod error;
mod language;
mod strategy;
mod types;

pub use ast_analyzer::StructuralChunker;
pub use chunker::{ChunkMode, ChunkOutcome, Chunker};
pub use classifier::{ChunkStrategy, Classification, LanguageClassifier};
pub use config::{ChunkerConfig, DEFAULT_OVERLAP_SIZE, DEFAULT_WINDOW_SIZE};
pub use error::{ChunkerError, Result};
pub use language::{AstLanguage, Language};
pub use strategy::WindowChunker;
pub use types::{ChunkRecord, ChunkSpan, SourceLines};
