//! Baseline FM-Index
//!
//! Expands the parse against the dictionary and indexes the resulting text
//! directly with one [`CharIndex`]. Memory grows with the full text, so this
//! is the reference the accelerated index is checked and measured against.

use core::ops::Range;
use std::path::Path;

use crate::config::IndexConfig;
use crate::error::Result;
use crate::pfp::{reconstruct_text, Dictionary, Params, DELIMITER};
use crate::search::CharIndex;

const DEFAULT_SAMPLE_STEP: usize = 16;

#[derive(Debug, Clone)]
pub struct BaselineIndex {
    index: CharIndex,
}

impl BaselineIndex {
    /// Materialize the padded text `DOLLAR · T · DOLLAR^w` and index it.
    pub fn build(params: Params, dictionary: &Dictionary, parse: &[u32]) -> Result<Self> {
        Self::build_with_sample_step(params, dictionary, parse, DEFAULT_SAMPLE_STEP)
    }

    pub fn with_config(config: &IndexConfig, dictionary: &Dictionary, parse: &[u32]) -> Result<Self> {
        config.validate()?;
        Self::build_with_sample_step(config.params(), dictionary, parse, config.sample_step)
    }

    pub fn build_with_sample_step(
        params: Params,
        dictionary: &Dictionary,
        parse: &[u32],
        sample_step: usize,
    ) -> Result<Self> {
        params.validate()?;
        let text = reconstruct_text(dictionary, parse, params.w)?;
        let index = CharIndex::build(&text, sample_step);

        tracing::info!(
            text_len = text.len(),
            size_bytes = index.size_bytes(),
            "baseline index built"
        );
        Ok(Self { index })
    }

    /// Number of occurrences of `pattern` in the padded text.
    #[inline]
    pub fn count(&self, pattern: &[u8]) -> usize {
        self.search(pattern).len()
    }

    /// Suffix-array interval of `pattern`. The empty pattern and patterns
    /// holding a sentinel or delimiter byte yield `0..0`.
    pub fn search(&self, pattern: &[u8]) -> Range<usize> {
        if pattern.is_empty() || pattern.contains(&DELIMITER) {
            return 0..0;
        }
        self.index.search(pattern)
    }

    /// Length of the materialized text.
    #[inline]
    pub fn text_len(&self) -> usize {
        self.index.text_len()
    }

    pub fn index(&self) -> &CharIndex {
        &self.index
    }

    pub fn size_bytes(&self) -> usize {
        self.index.size_bytes()
    }

    /// Persist as `<prefix>_{sa,bwt,c_array}.bin`.
    pub fn save(&self, prefix: impl AsRef<Path>) -> Result<()> {
        self.index.save(prefix)
    }

    pub fn load(prefix: impl AsRef<Path>) -> Result<Self> {
        Ok(Self {
            index: CharIndex::load(prefix)?,
        })
    }
}
