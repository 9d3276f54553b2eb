use crate::language::Language;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default window length in lines
pub const DEFAULT_WINDOW_SIZE: usize = 100;

/// Default number of lines repeated between consecutive windows
pub const DEFAULT_OVERLAP_SIZE: usize = 20;

/// Configuration for code chunking behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkerConfig {
    /// Lines per window for line-based chunking
    pub window_size: usize,

    /// Lines shared by consecutive windows (strictly less than `window_size`)
    pub overlap_size: usize,

    /// How many definition levels may be opened to emit nested definitions.
    /// `0` emits only top-level definitions.
    pub nesting_depth: usize,

    /// Per-language nesting depth overrides
    pub language_nesting: BTreeMap<Language, usize>,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            overlap_size: DEFAULT_OVERLAP_SIZE,
            nesting_depth: 0,
            language_nesting: BTreeMap::new(),
        }
    }
}

impl ChunkerConfig {
    /// Nesting depth in effect for a language
    #[must_use]
    pub fn nesting_depth_for(&self, language: Language) -> usize {
        self.language_nesting
            .get(&language)
            .copied()
            .unwrap_or(self.nesting_depth)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.window_size == 0 {
            return Err("window_size must be > 0".to_string());
        }

        if self.overlap_size >= self.window_size {
            return Err(format!(
                "overlap_size ({}) must be less than window_size ({})",
                self.overlap_size, self.window_size
            ));
        }

        Ok(())
    }
}
