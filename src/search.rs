//! FM-Index Search Implementation (generic over the alphabet)
//!
//! **Architecture**:
//! - Wavelet Matrix: BWT + rank support, width follows the alphabet
//! - C-Table: cumulative symbol counts
//! - Sampled SA: every `sample_step`-th text position, marked in a BitVector
//!
//! **Core Algorithm**: Backward Search
//! - Process pattern from right to left
//! - Use LF-mapping: `new_pos = C[c] + Rank(c, old_pos)`
//! - Complexity: O(M × width) where M = pattern length
//!
//! Besides plain `count`/`search`, the index exposes its interval algebra
//! (`extend`, `lf_step`, `symbol_range`) so a caller can start a backward
//! search from an interval it computed elsewhere.

use core::marker::PhantomData;
use core::ops::Range;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::bitvec::BitVector;
use crate::bwt::{build_bwt, build_c_table, build_suffix_array, Symbol};
use crate::error::{Error, Result};
use crate::storage::{read_blob, with_suffix, write_blob};
use crate::wavelet::WaveletMatrix;

/// Blob suffixes written by [`FmIndex::save`].
pub const SA_SUFFIX: &str = "_sa.bin";
pub const BWT_SUFFIX: &str = "_bwt.bin";
pub const C_ARRAY_SUFFIX: &str = "_c_array.bin";

/// Sampled suffix array: SA values at text positions divisible by `step`.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct SampledSuffixArray {
    step: usize,
    samples: Vec<usize>,
    /// One bit per row, set where the row's SA value is sampled
    marks: BitVector,
}

/// Backward-search index over a sequence of `S` symbols.
#[derive(Clone, Debug)]
pub struct FmIndex<S: Symbol> {
    /// Wavelet Matrix (stores BWT codes + Rank support)
    wm: WaveletMatrix,
    /// C-Table: `c_table[c]` = number of BWT symbols with code < c
    c_table: Vec<usize>,
    sa: SampledSuffixArray,
    _symbol: PhantomData<S>,
}

/// Byte-alphabet index (dictionary text, materialized text).
pub type CharIndex = FmIndex<u8>;
/// Phrase-rank index (parse).
pub type RankIndex = FmIndex<u32>;

impl<S: Symbol> FmIndex<S> {
    /// Build index from text
    ///
    /// `text` must not contain the sentinel, except as its final symbol: a
    /// trailing sentinel is accepted and not duplicated.
    ///
    /// # Arguments
    /// - `text`: Input sequence to index
    /// - `sample_step`: SA sampling interval (lower = faster locate, more memory)
    pub fn build(text: &[S], sample_step: usize) -> Self {
        let text = match text.split_last() {
            Some((&last, body)) if last == S::SENTINEL => body,
            _ => text,
        };
        let sa = build_suffix_array(text);
        Self::from_suffix_array(text, &sa, sample_step)
    }

    /// Build from a precomputed suffix array (as returned by
    /// [`build_suffix_array`] for the same `text`).
    pub fn from_suffix_array(text: &[S], sa: &[usize], sample_step: usize) -> Self {
        debug_assert_eq!(sa.len(), text.len() + 1);
        let step = sample_step.max(1);

        let bwt = build_bwt(text, sa);
        let c_table = build_c_table(&bwt);
        let codes: Vec<u32> = bwt.iter().map(|s| s.code()).collect();
        drop(bwt);
        let wm = WaveletMatrix::build(&codes);

        let mut samples = Vec::with_capacity(sa.len() / step + 1);
        let mut marks = BitVector::new();
        for &pos in sa {
            let sampled = pos % step == 0;
            if sampled {
                samples.push(pos);
            }
            marks.push(sampled);
        }
        marks.build_index();

        tracing::debug!(
            rows = wm.len(),
            sigma = c_table.len() - 1,
            width = wm.width(),
            sample_step = step,
            "fm-index built"
        );

        FmIndex {
            wm,
            c_table,
            sa: SampledSuffixArray {
                step,
                samples,
                marks,
            },
            _symbol: PhantomData,
        }
    }

    /// Count occurrences of a pattern in O(M) rank steps
    ///
    /// # Example
    /// ```
    /// use alice_afm::CharIndex;
    ///
    /// let index = CharIndex::build(b"abracadabra", 4);
    /// assert_eq!(index.count(b"abra"), 2);
    /// ```
    #[inline]
    pub fn count(&self, pattern: &[S]) -> usize {
        self.search(pattern).len()
    }

    /// Suffix-array interval `[sp, ep)` of the suffixes prefixed by `pattern`.
    ///
    /// An empty pattern matches every row; a pattern with a symbol outside
    /// the alphabet yields `0..0`.
    #[inline]
    pub fn search(&self, pattern: &[S]) -> Range<usize> {
        self.extend(self.full_range(), pattern)
    }

    /// Check if pattern exists in text
    #[inline]
    pub fn contains(&self, pattern: &[S]) -> bool {
        !self.search(pattern).is_empty()
    }

    /// Continue a backward search: narrow `range` by prepending `pattern`.
    ///
    /// `range` is the interval of suffixes prefixed by some string X; the
    /// result is the interval of suffixes prefixed by `pattern · X`.
    pub fn extend(&self, mut range: Range<usize>, pattern: &[S]) -> Range<usize> {
        for &s in pattern.iter().rev() {
            range = self.lf_step(range, s);
            if range.is_empty() {
                return 0..0;
            }
        }
        range
    }

    /// One LF-mapping step of backward search.
    #[inline]
    pub fn lf_step(&self, range: Range<usize>, symbol: S) -> Range<usize> {
        if symbol == S::SENTINEL || range.is_empty() {
            return 0..0;
        }
        let c = symbol.code() as usize;
        if c + 1 >= self.c_table.len() {
            return 0..0;
        }

        let sp = self.c_table[c] + self.wm.rank(symbol.code(), range.start);
        let ep = self.c_table[c] + self.wm.rank(symbol.code(), range.end);

        if sp >= ep {
            0..0
        } else {
            sp..ep
        }
    }

    /// Rows whose suffix starts with a symbol of code in `[lo, hi)`.
    pub fn symbol_range(&self, lo: S, hi: S) -> Range<usize> {
        let last = self.c_table.len() - 1;
        let lo = (lo.code() as usize).min(last);
        let hi = (hi.code() as usize).min(last);
        if lo >= hi {
            return 0..0;
        }
        self.c_table[lo]..self.c_table[hi]
    }

    /// Occurrences of a single symbol in the text.
    #[inline]
    pub fn occurrences(&self, symbol: S) -> usize {
        let c = symbol.code() as usize;
        if c + 1 >= self.c_table.len() {
            return 0;
        }
        self.c_table[c + 1] - self.c_table[c]
    }

    /// BWT symbol at `row`: the symbol preceding that row's suffix.
    #[inline]
    pub fn bwt_symbol(&self, row: usize) -> S {
        S::from_code(self.wm.get(row))
    }

    /// Locate all positions where pattern occurs (lazy iterator)
    ///
    /// # Example
    /// ```
    /// use alice_afm::CharIndex;
    ///
    /// let index = CharIndex::build(b"abracadabra", 1);
    /// let mut positions: Vec<_> = index.locate(b"abra").collect();
    /// positions.sort();
    /// assert_eq!(positions, vec![0, 7]);
    /// ```
    #[inline]
    pub fn locate<'a>(&'a self, pattern: &[S]) -> LocateIter<'a, S> {
        let range = self.search(pattern);
        LocateIter { index: self, range }
    }

    /// Locate all positions (collecting into Vec for convenience)
    pub fn locate_all(&self, pattern: &[S]) -> Vec<usize> {
        self.locate(pattern).collect()
    }

    /// Resolve SA[row] using LF-mapping walk to the nearest sample.
    /// O(sample_step) rank steps.
    pub fn resolve(&self, mut row: usize) -> usize {
        let mut steps = 0;

        loop {
            if self.sa.marks.get(row) {
                let idx = self.sa.marks.rank1(row);
                return self.sa.samples[idx] + steps;
            }

            let c = self.wm.get(row);
            if c == S::SENTINEL.code() {
                return steps; // Hit the start of text
            }

            row = self.c_table[c as usize] + self.wm.rank(c, row);
            steps += 1;
        }
    }

    /// Number of rows (text length + sentinel).
    #[inline]
    pub fn len(&self) -> usize {
        self.wm.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.wm.is_empty()
    }

    /// Original text length (excluding sentinel)
    #[inline]
    pub fn text_len(&self) -> usize {
        self.wm.len().saturating_sub(1)
    }

    /// Get the SA sampling step
    #[inline]
    pub fn sample_step(&self) -> usize {
        self.sa.step
    }

    /// Index size in bytes (approximate)
    pub fn size_bytes(&self) -> usize {
        self.wm.size_bytes()
            + self.c_table.len() * core::mem::size_of::<usize>()
            + self.sa.marks.size_bytes()
            + self.sa.samples.len() * core::mem::size_of::<usize>()
    }

    /// Persist the three blobs `<prefix>_sa.bin`, `<prefix>_bwt.bin` and
    /// `<prefix>_c_array.bin`.
    pub fn save(&self, prefix: impl AsRef<Path>) -> Result<()> {
        let prefix = prefix.as_ref();
        self.save_sa(with_suffix(prefix, SA_SUFFIX))?;
        self.save_bwt(with_suffix(prefix, BWT_SUFFIX))?;
        self.save_c_array(with_suffix(prefix, C_ARRAY_SUFFIX))
    }

    pub fn save_sa(&self, path: impl AsRef<Path>) -> Result<()> {
        write_blob(path.as_ref(), &self.sa)
    }

    pub fn save_bwt(&self, path: impl AsRef<Path>) -> Result<()> {
        write_blob(path.as_ref(), &self.wm)
    }

    pub fn save_c_array(&self, path: impl AsRef<Path>) -> Result<()> {
        write_blob(path.as_ref(), &self.c_table)
    }

    /// Reload an index written by [`FmIndex::save`] under the same prefix.
    pub fn load(prefix: impl AsRef<Path>) -> Result<Self> {
        let prefix = prefix.as_ref();
        let sa: SampledSuffixArray = read_blob(&with_suffix(prefix, SA_SUFFIX))?;
        let wm: WaveletMatrix = read_blob(&with_suffix(prefix, BWT_SUFFIX))?;
        let c_table: Vec<usize> = read_blob(&with_suffix(prefix, C_ARRAY_SUFFIX))?;

        if c_table.last() != Some(&wm.len()) {
            return Err(Error::Corrupted(format!(
                "C-table total {:?} does not match BWT length {}",
                c_table.last(),
                wm.len()
            )));
        }
        if sa.marks.len() != wm.len() || sa.marks.count_ones() != sa.samples.len() {
            return Err(Error::Corrupted(format!(
                "suffix array samples ({} marked of {}) do not match BWT length {}",
                sa.marks.count_ones(),
                sa.marks.len(),
                wm.len()
            )));
        }
        if sa.step == 0 {
            return Err(Error::Corrupted("suffix array sample step is zero".into()));
        }

        Ok(FmIndex {
            wm,
            c_table,
            sa,
            _symbol: PhantomData,
        })
    }

    #[inline]
    fn full_range(&self) -> Range<usize> {
        0..self.wm.len()
    }
}

/// Iterator for locate results.
pub struct LocateIter<'a, S: Symbol> {
    index: &'a FmIndex<S>,
    range: Range<usize>,
}

impl<S: Symbol> Iterator for LocateIter<'_, S> {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let row = self.range.next()?;
        Some(self.index.resolve(row))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.range.size_hint()
    }
}

impl<S: Symbol> ExactSizeIterator for LocateIter<'_, S> {}
