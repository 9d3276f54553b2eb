//! # Repochunk Indexer
//!
//! Repository-level chunking: walk a source tree, route each file to the
//! right chunker and stream normalized records.
//!
//! ## Pipeline
//!
//! ```text
//! RepoChunkerConfig (YAML)
//!     │
//!     └──> build_router()
//!            │
//!            ├──> RepositoryWalker + PathFilter
//!            │      └─> FileDescriptor (sorted, pruned)
//!            │
//!            ├──> LanguageClassifier
//!            │      └─> Structural | Window
//!            │
//!            └──> Chunker
//!                   └─> ChunkRecord stream + ChunkStats
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use repochunk_indexer::{export, RepoChunkerConfig};
//!
//! fn main() -> repochunk_indexer::Result<()> {
//!     let router = RepoChunkerConfig::load("repochunk.yaml")?.build_router()?;
//!     let mut chunks = router.chunk_repository("/path/to/repo")?;
//!
//!     export::write_jsonl(chunks.by_ref(), std::io::stdout().lock())?;
//!     println!("{}", chunks.stats());
//!     Ok(())
//! }
//! ```

mod config;
mod error;
pub mod export;
mod filter;
mod router;
mod scanner;
mod stats;

pub use config::{LanguageSettings, RepoChunkerConfig, DEFAULT_AST_LANGUAGES};
pub use error::{IndexerError, Result};
pub use filter::{PathFilter, PathFilterBuilder, DEFAULT_EXCLUDED_DIRS, DEFAULT_EXCLUDED_EXTENSIONS};
pub use router::{ChunkerRouter, FileChunks, FileOutcome, RepositoryChunks};
pub use scanner::{FileDescriptor, RepositoryWalker, Walk, DEFAULT_MAX_FILE_SIZE};
pub use stats::{ChunkStats, SkippedFile};

pub use repochunk_chunker::{ChunkRecord, Language};
