//! Accelerated FM-Index (two-level)
//!
//! **Architecture**:
//! - Dictionary level: [`CharIndex`] over `phrase_1 \x01 phrase_2 \x01 ... phrase_d \x01`
//! - Parse level: [`RankIndex`] over the sequence of phrase ranks
//! - Boundary bitvector: [`SparseBitVector`] over dictionary rows, set where
//!   the row's suffix starts a phrase
//!
//! **Ordering**: the delimiter sorts below every content byte and phrases
//! are distinct, so phrase-start rows appear in phrase-rank order. The k-th
//! set boundary bit is rank k+1, and `rank1` turns any dictionary interval
//! into a contiguous range of phrase ranks.
//!
//! **Query**: a pattern without triggers lies inside one phrase and is
//! answered at the dictionary level, weighted by phrase frequency. Otherwise
//! its triggers cut it into `Q_pre`, whole phrases and `Q_suf`:
//! 1. `Q_suf` is matched as a phrase prefix and mapped to a parse interval
//! 2. whole phrases are LF-steps in the parse index
//! 3. `Q_pre` is matched as a phrase suffix, one final LF-step per phrase
//!
//! The full text is never materialized.

use core::ops::Range;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::bwt::build_suffix_array;
use crate::config::IndexConfig;
use crate::error::{Error, Result};
use crate::parser::{trigger_positions, PatternParser, PhraseLookup};
use crate::pfp::{Dictionary, Params, DELIMITER, SENTINEL};
use crate::search::{CharIndex, RankIndex};
use crate::sparse::SparseBitVector;
use crate::storage::{read_blob, with_suffix, write_blob};

/// Prefix suffix of the parse-level blobs.
pub const PARSE_PREFIX_SUFFIX: &str = "_pars";
/// Blob holding the boundary bitvectors and parameters.
pub const BOUNDARY_SUFFIX: &str = "_boundary.bin";

const DEFAULT_SAMPLE_STEP: usize = 16;

/// Occurrences of a pattern, as intervals of the parse-level index.
///
/// Each interval contributes its length; the total is the number of
/// occurrences of the pattern in the (never materialized) text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Occurrences {
    ranges: Vec<Range<usize>>,
}

impl Occurrences {
    /// Number of occurrences.
    #[inline]
    pub fn len(&self) -> usize {
        self.ranges.iter().map(|r| r.len()).sum()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Parse-level intervals, sorted by start.
    #[inline]
    pub fn ranges(&self) -> &[Range<usize>] {
        &self.ranges
    }

    pub fn into_ranges(self) -> Vec<Range<usize>> {
        self.ranges
    }

    fn from_unsorted(mut ranges: Vec<Range<usize>>) -> Self {
        ranges.sort_unstable_by_key(|r| (r.start, r.end));
        Self { ranges }
    }
}

/// Everything besides the two FM-indexes.
#[derive(Serialize, Deserialize)]
struct BoundaryBlob {
    params: Params,
    boundaries: SparseBitVector,
    phrase_starts: SparseBitVector,
    last_phrase: u32,
}

/// Two-level index over a prefix-free parse.
///
/// Immutable once built; `&AcceleratedIndex` can be shared across threads.
#[derive(Debug, Clone)]
pub struct AcceleratedIndex {
    params: Params,
    dict_index: CharIndex,
    parse_index: RankIndex,
    /// Dictionary rows whose suffix starts a phrase
    boundaries: SparseBitVector,
    /// Dictionary-text offsets of phrase starts
    phrase_starts: SparseBitVector,
    /// Rank of the final phrase of the parse (the only one without a trigger)
    last_phrase: u32,
}

impl AcceleratedIndex {
    /// Build from a dictionary and parse produced with `params`.
    ///
    /// # Example
    /// ```
    /// use alice_afm::pfp::{parse_text, Params};
    /// use alice_afm::AcceleratedIndex;
    ///
    /// let params = Params::new(4, 10).unwrap();
    /// let text = b"ACGTTCCAACGTATACGGGT".repeat(8);
    /// let (dictionary, parse) = parse_text(&text, params).unwrap();
    ///
    /// let index = AcceleratedIndex::build(params, &dictionary, &parse).unwrap();
    /// assert_eq!(index.count(b"GT"), 24);
    /// assert_eq!(index.count(b"ACGTTCCAACGTATACGGGTACGT"), 7);
    /// ```
    pub fn build(params: Params, dictionary: &Dictionary, parse: &[u32]) -> Result<Self> {
        Self::build_with_sample_step(params, dictionary, parse, DEFAULT_SAMPLE_STEP)
    }

    /// Build with parameters and sampling taken from `config`.
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
        validate_inputs(dictionary, parse)?;

        // Dictionary text: phrase_1 DELIM phrase_2 DELIM ... phrase_d DELIM
        let mut dict_text = Vec::with_capacity(dictionary.total_len() + dictionary.len());
        let mut starts = Vec::with_capacity(dictionary.len());
        for phrase in dictionary.iter() {
            starts.push(dict_text.len());
            dict_text.extend_from_slice(phrase);
            dict_text.push(DELIMITER);
        }

        let sa = build_suffix_array(&dict_text);
        let dict_index = CharIndex::from_suffix_array(&dict_text, &sa, sample_step);

        let phrase_starts = SparseBitVector::from_positions(&starts, dict_text.len());
        let boundary_rows: Vec<usize> = sa
            .iter()
            .enumerate()
            .filter(|&(_, &pos)| pos < dict_text.len() && phrase_starts.get(pos))
            .map(|(row, _)| row)
            .collect();
        let boundaries = SparseBitVector::from_positions(&boundary_rows, sa.len());
        debug_assert_eq!(boundaries.count_ones(), dictionary.len());
        tracing::debug!(
            dict_len = dict_text.len(),
            boundaries = boundaries.count_ones(),
            "dictionary level built"
        );
        drop(sa);
        drop(dict_text);

        let parse_index = RankIndex::build(parse, sample_step);
        let last_phrase = parse[parse.len() - 1];

        let index = Self {
            params,
            dict_index,
            parse_index,
            boundaries,
            phrase_starts,
            last_phrase,
        };
        tracing::info!(
            phrases = dictionary.len(),
            parse_len = parse.len(),
            w = params.w,
            p = params.p,
            size_bytes = index.size_bytes(),
            "accelerated index built"
        );
        Ok(index)
    }

    /// Number of occurrences of `pattern` in the indexed text.
    #[inline]
    pub fn count(&self, pattern: &[u8]) -> usize {
        self.search(pattern).len()
    }

    /// Occurrences of `pattern` as parse-level intervals.
    ///
    /// The empty pattern and patterns holding a sentinel or delimiter byte
    /// never occur.
    pub fn search(&self, pattern: &[u8]) -> Occurrences {
        if pattern.is_empty() || pattern.iter().any(|&c| c == SENTINEL || c == DELIMITER) {
            return Occurrences::default();
        }

        let triggers = trigger_positions(pattern, self.params);
        if triggers.is_empty() {
            self.search_within_phrase(pattern)
        } else {
            self.search_across_phrases(pattern, &triggers)
        }
    }

    /// Pattern without triggers: each occurrence sits inside exactly one
    /// phrase, before that phrase's trailer (or anywhere in the last phrase).
    fn search_within_phrase(&self, pattern: &[u8]) -> Occurrences {
        let w = self.params.w;
        let rows = self.dict_index.search(pattern);

        let mut ranges = Vec::with_capacity(rows.len());
        for row in rows {
            let pos = self.dict_index.resolve(row);
            let (rank, start, len) = self.phrase_at(pos);
            let offset = pos - start;
            if rank != self.last_phrase && offset >= len.saturating_sub(w) {
                continue;
            }
            let range = self.parse_index.symbol_range(rank, rank + 1);
            if !range.is_empty() {
                ranges.push(range);
            }
        }

        Occurrences::from_unsorted(ranges)
    }

    fn search_across_phrases(&self, pattern: &[u8], triggers: &[usize]) -> Occurrences {
        let fragments = PatternParser::new(self.params, self).fragments(pattern, triggers);
        let (q_pre, middle, q_suf) = match fragments.as_slice() {
            [first, middle @ .., last] => (first.slice(pattern), middle, last.slice(pattern)),
            _ => return Occurrences::default(),
        };

        // Phrases starting with Q_suf form a contiguous rank block.
        let rows = self.dict_index.search(q_suf);
        let lo = self.boundaries.rank1(rows.start) as u32 + 1;
        let hi = self.boundaries.rank1(rows.end) as u32 + 1;
        let mut range = self.parse_index.symbol_range(lo, hi);

        for fragment in middle.iter().rev() {
            if !fragment.is_known() {
                tracing::trace!(
                    start = fragment.start,
                    end = fragment.end,
                    "whole phrase not in dictionary"
                );
                return Occurrences::default();
            }
            range = self.parse_index.lf_step(range, fragment.rank);
            if range.is_empty() {
                return Occurrences::default();
            }
        }
        if range.is_empty() {
            return Occurrences::default();
        }

        // Phrases ending with Q_pre: Q_pre followed by a delimiter.
        let rows = self
            .dict_index
            .extend(self.dict_index.symbol_range(DELIMITER, DELIMITER + 1), q_pre);
        let mut preceding: Vec<u32> = rows
            .map(|row| self.phrase_at(self.dict_index.resolve(row)).0)
            .collect();
        preceding.sort_unstable();
        preceding.dedup();

        let ranges = preceding
            .into_iter()
            .map(|rank| self.parse_index.lf_step(range.clone(), rank))
            .filter(|r| !r.is_empty())
            .collect();
        Occurrences::from_unsorted(ranges)
    }

    /// Rank, start offset and length of the phrase covering dictionary
    /// offset `pos`.
    fn phrase_at(&self, pos: usize) -> (u32, usize, usize) {
        let idx = self.phrase_starts.rank1(pos + 1) - 1;
        let start = self.phrase_starts.select1(idx).unwrap_or(0);
        let end = self
            .phrase_starts
            .select1(idx + 1)
            .unwrap_or(self.phrase_starts.len());
        (idx as u32 + 1, start, end - start - 1)
    }

    #[inline]
    pub fn params(&self) -> Params {
        self.params
    }

    /// Number of dictionary phrases.
    #[inline]
    pub fn phrase_count(&self) -> usize {
        self.boundaries.count_ones()
    }

    /// Number of phrases in the parse.
    #[inline]
    pub fn parse_len(&self) -> usize {
        self.parse_index.text_len()
    }

    pub fn dictionary_index(&self) -> &CharIndex {
        &self.dict_index
    }

    pub fn parse_index(&self) -> &RankIndex {
        &self.parse_index
    }

    /// Heap bytes held by both levels and the boundary structures.
    pub fn size_bytes(&self) -> usize {
        self.dict_index.size_bytes()
            + self.parse_index.size_bytes()
            + self.boundaries.size_bytes()
            + self.phrase_starts.size_bytes()
    }

    /// Persist both levels and the boundary blob under `prefix`.
    ///
    /// Writes `<prefix>_{sa,bwt,c_array}.bin`,
    /// `<prefix>_pars_{sa,bwt,c_array}.bin` and `<prefix>_boundary.bin`.
    pub fn save(&self, prefix: impl AsRef<Path>) -> Result<()> {
        let prefix = prefix.as_ref();
        self.save_dictionary_level(prefix)?;
        self.save_parse_level(prefix)?;
        write_blob(
            &with_suffix(prefix, BOUNDARY_SUFFIX),
            &BoundaryBlob {
                params: self.params,
                boundaries: self.boundaries.clone(),
                phrase_starts: self.phrase_starts.clone(),
                last_phrase: self.last_phrase,
            },
        )?;
        tracing::debug!(prefix = %prefix.display(), "accelerated index saved");
        Ok(())
    }

    pub fn save_dictionary_level(&self, prefix: impl AsRef<Path>) -> Result<()> {
        self.dict_index.save(prefix)
    }

    pub fn save_parse_level(&self, prefix: impl AsRef<Path>) -> Result<()> {
        self.parse_index
            .save(with_suffix(prefix.as_ref(), PARSE_PREFIX_SUFFIX))
    }

    /// Reload an index written by [`AcceleratedIndex::save`].
    pub fn load(prefix: impl AsRef<Path>) -> Result<Self> {
        let prefix = prefix.as_ref();
        let dict_index = CharIndex::load(prefix)?;
        let parse_index = RankIndex::load(with_suffix(prefix, PARSE_PREFIX_SUFFIX))?;
        let blob: BoundaryBlob = read_blob(&with_suffix(prefix, BOUNDARY_SUFFIX))?;
        blob.params
            .validate()
            .map_err(|e| Error::Corrupted(e.to_string()))?;

        if blob.boundaries.len() != dict_index.len()
            || blob.phrase_starts.len() != dict_index.text_len()
            || blob.boundaries.count_ones() != blob.phrase_starts.count_ones()
        {
            return Err(Error::Corrupted(format!(
                "boundary bitvectors ({} rows, {} phrases) do not match dictionary index ({} rows)",
                blob.boundaries.len(),
                blob.phrase_starts.count_ones(),
                dict_index.len()
            )));
        }
        if blob.last_phrase == 0 || blob.last_phrase as usize > blob.phrase_starts.count_ones() {
            return Err(Error::Corrupted(format!(
                "final phrase rank {} out of range",
                blob.last_phrase
            )));
        }

        tracing::debug!(prefix = %prefix.display(), "accelerated index loaded");
        Ok(Self {
            params: blob.params,
            dict_index,
            parse_index,
            boundaries: blob.boundaries,
            phrase_starts: blob.phrase_starts,
            last_phrase: blob.last_phrase,
        })
    }
}

/// Whole-phrase lookup against the dictionary level: a phrase is the
/// delimiter-terminated match that starts on a boundary row.
impl PhraseLookup for AcceleratedIndex {
    fn rank_of(&self, phrase: &[u8]) -> Option<u32> {
        if phrase.is_empty() || phrase.iter().any(|&c| c == SENTINEL || c == DELIMITER) {
            return None;
        }
        let rows = self
            .dict_index
            .extend(self.dict_index.symbol_range(DELIMITER, DELIMITER + 1), phrase);
        let lo = self.boundaries.rank1(rows.start);
        let hi = self.boundaries.rank1(rows.end);
        (hi > lo).then_some(lo as u32 + 1)
    }
}

fn validate_inputs(dictionary: &Dictionary, parse: &[u32]) -> Result<()> {
    if dictionary.is_empty() {
        return Err(Error::InvalidDictionary("dictionary is empty".into()));
    }
    if let Some(rank) = dictionary
        .iter()
        .position(|p| p.is_empty() || p.iter().any(|&c| c == SENTINEL || c == DELIMITER))
    {
        return Err(Error::InvalidDictionary(format!(
            "phrase {} is empty or holds a reserved byte",
            rank + 1
        )));
    }
    if parse.is_empty() {
        return Err(Error::InvalidParse("parse is empty".into()));
    }
    let d = dictionary.len() as u32;
    if let Some(&rank) = parse.iter().find(|&&r| r == 0 || r > d) {
        return Err(Error::InvalidParse(format!(
            "rank {} outside 1..={}",
            rank, d
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baseline::BaselineIndex;
    use crate::pfp::{parse_text, reconstruct_text, DOLLAR};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use tempfile::tempdir;

    fn repetitive_dna(base_len: usize, copies: usize, seed: u64) -> Vec<u8> {
        let mut rng = StdRng::seed_from_u64(seed);
        let base: Vec<u8> = (0..base_len).map(|_| b"ACGT"[rng.gen_range(0..4)]).collect();
        let mut text = Vec::with_capacity(base_len * copies);
        for _ in 0..copies {
            let mut copy = base.clone();
            for _ in 0..3 {
                let at = rng.gen_range(0..base_len);
                copy[at] = b"ACGT"[rng.gen_range(0..4)];
            }
            text.extend_from_slice(&copy);
        }
        text
    }

    fn brute_count(text: &[u8], pattern: &[u8]) -> usize {
        if pattern.is_empty() || pattern.len() > text.len() {
            return 0;
        }
        text.windows(pattern.len()).filter(|w| *w == pattern).count()
    }

    /// Hand-made parse of the padded text `\x02ACGTTCCAACGTATACGGGT\n\x02\x02\x02\x02`, w = 4.
    fn hand_parse() -> (Params, Dictionary, Vec<u32>) {
        let params = Params { w: 4, p: 10 };
        let dictionary = Dictionary::from_phrases([
            &b"\x02ACGTTC"[..],
            b"AACGTAT",
            b"CCAACG",
            b"GTATACGGGT\n\x02\x02\x02\x02",
            b"GTTCCAA",
        ]);
        (params, dictionary, vec![1, 5, 3, 2, 4])
    }

    #[test]
    fn test_hand_parse_short_patterns() {
        let (params, dictionary, parse) = hand_parse();
        let index = AcceleratedIndex::build(params, &dictionary, &parse).unwrap();

        assert_eq!(index.count(b"GT"), 3);
        assert_eq!(index.count(b"A"), 5);
        assert_eq!(index.count(b"CC"), 1);
        assert_eq!(index.count(b"GGG"), 1);
        assert_eq!(index.count(b"\x02"), 5);
        assert_eq!(index.count(b"TTT"), 0);
        assert_eq!(index.phrase_count(), 5);
        assert_eq!(index.parse_len(), 5);
    }

    #[test]
    fn test_reserved_and_empty_patterns() {
        let (params, dictionary, parse) = hand_parse();
        let index = AcceleratedIndex::build(params, &dictionary, &parse).unwrap();

        assert_eq!(index.count(b""), 0);
        assert_eq!(index.count(b"\x01"), 0);
        assert_eq!(index.count(b"AC\x00GT"), 0);
        assert!(index.search(b"\x01AC").is_empty());
    }

    #[test]
    fn test_matches_brute_force_and_baseline() {
        let params = Params::new(4, 7).unwrap();
        let text = repetitive_dna(300, 6, 17);
        let (dictionary, parse) = parse_text(&text, params).unwrap();
        let padded = reconstruct_text(&dictionary, &parse, params.w).unwrap();

        let index = AcceleratedIndex::build(params, &dictionary, &parse).unwrap();
        let baseline = BaselineIndex::build(params, &dictionary, &parse).unwrap();

        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..300 {
            let len = rng.gen_range(1..40);
            let at = rng.gen_range(0..padded.len() - len);
            let pattern = &padded[at..at + len];

            let expected = brute_count(&padded, pattern);
            assert_eq!(index.count(pattern), expected, "pattern {:?}", pattern);
            assert_eq!(baseline.count(pattern), expected, "pattern {:?}", pattern);
        }
    }

    #[test]
    fn test_absent_patterns() {
        let params = Params::new(4, 7).unwrap();
        let text = repetitive_dna(200, 4, 5);
        let (dictionary, parse) = parse_text(&text, params).unwrap();
        let index = AcceleratedIndex::build(params, &dictionary, &parse).unwrap();

        let mut padded = vec![DOLLAR];
        padded.extend_from_slice(&text);
        padded.extend_from_slice(&[DOLLAR; 4]);

        let mut rng = StdRng::seed_from_u64(6);
        for _ in 0..100 {
            let len = rng.gen_range(1..30);
            let pattern: Vec<u8> = (0..len).map(|_| b"ACGTN"[rng.gen_range(0..5)]).collect();
            assert_eq!(index.count(&pattern), brute_count(&padded, &pattern));
        }
    }

    #[test]
    fn test_search_len_equals_count() {
        let params = Params::new(3, 5).unwrap();
        let text = repetitive_dna(150, 5, 8);
        let (dictionary, parse) = parse_text(&text, params).unwrap();
        let index = AcceleratedIndex::build(params, &dictionary, &parse).unwrap();

        for pattern in [&text[10..14], &text[0..40], &text[100..101], &text[50..90]] {
            let occurrences = index.search(pattern);
            assert_eq!(occurrences.len(), index.count(pattern));
            assert!(occurrences.ranges().iter().all(|r| !r.is_empty()));
            assert!(occurrences.ranges().windows(2).all(|p| p[0].start <= p[1].start));
            // Idempotent
            assert_eq!(index.search(pattern), occurrences);
        }
    }

    #[test]
    fn test_unknown_whole_phrase_is_absent() {
        let params = Params::new(3, 5).unwrap();
        let text = repetitive_dna(200, 3, 21);
        let (dictionary, parse) = parse_text(&text, params).unwrap();
        let index = AcceleratedIndex::build(params, &dictionary, &parse).unwrap();

        // A real occurrence spanning four triggers, with a byte no phrase
        // holds planted inside the second whole phrase.
        let triggers = trigger_positions(&text, params);
        let i = (1..triggers.len() - 2)
            .find(|&i| triggers[i + 1] > triggers[i] + params.w + 1)
            .unwrap();
        let mut pattern = text[triggers[i - 1]..triggers[i + 2] + params.w].to_vec();
        assert!(index.count(&pattern) >= 1);

        pattern[triggers[i] + params.w - triggers[i - 1]] = b'N';
        let fragments = PatternParser::new(params, &index).parse(&pattern);
        let (_, middle) = fragments.split_first().unwrap();
        assert!(middle[..middle.len() - 1].iter().any(|f| !f.is_known()));
        assert_eq!(index.count(&pattern), 0);
        assert!(index.search(&pattern).is_empty());
    }

    #[test]
    fn test_phrase_lookup_matches_dictionary() {
        let params = Params::new(4, 10).unwrap();
        let text = repetitive_dna(250, 4, 13);
        let (dictionary, parse) = parse_text(&text, params).unwrap();
        let index = AcceleratedIndex::build(params, &dictionary, &parse).unwrap();

        for (rank0, phrase) in dictionary.iter().enumerate() {
            assert_eq!(PhraseLookup::rank_of(&index, phrase), Some(rank0 as u32 + 1));
            // A proper suffix of a phrase is not a phrase (unless it is one).
            let tail = &phrase[1..];
            assert_eq!(PhraseLookup::rank_of(&index, tail), dictionary.rank_of(tail));
        }
        assert_eq!(PhraseLookup::rank_of(&index, b""), None);
    }

    #[test]
    fn test_invalid_inputs() {
        let params = Params { w: 4, p: 10 };
        let dictionary = Dictionary::from_phrases([&b"ACGTA"[..], b"GTAC"]);

        assert!(matches!(
            AcceleratedIndex::build(params, &Dictionary::default(), &[1]),
            Err(Error::InvalidDictionary(_))
        ));
        assert!(matches!(
            AcceleratedIndex::build(params, &dictionary, &[]),
            Err(Error::InvalidParse(_))
        ));
        assert!(matches!(
            AcceleratedIndex::build(params, &dictionary, &[1, 3]),
            Err(Error::InvalidParse(_))
        ));
        assert!(matches!(
            AcceleratedIndex::build(params, &dictionary, &[0]),
            Err(Error::InvalidParse(_))
        ));
        let bad = Dictionary::from_phrases([&b"AC\x01GT"[..]]);
        assert!(matches!(
            AcceleratedIndex::build(params, &bad, &[1]),
            Err(Error::InvalidDictionary(_))
        ));
        assert!(matches!(
            AcceleratedIndex::build(Params { w: 1, p: 10 }, &dictionary, &[1]),
            Err(Error::InvalidParams(_))
        ));
    }

    #[test]
    fn test_save_load() {
        let dir = tempdir().unwrap();
        let prefix = dir.path().join("chr");

        let params = Params::new(4, 7).unwrap();
        let text = repetitive_dna(200, 5, 31);
        let (dictionary, parse) = parse_text(&text, params).unwrap();
        let index = AcceleratedIndex::build(params, &dictionary, &parse).unwrap();
        index.save(&prefix).unwrap();

        for suffix in [
            "_sa.bin",
            "_bwt.bin",
            "_c_array.bin",
            "_pars_sa.bin",
            "_pars_bwt.bin",
            "_pars_c_array.bin",
            "_boundary.bin",
        ] {
            assert!(with_suffix(&prefix, suffix).exists(), "missing {}", suffix);
        }

        let loaded = AcceleratedIndex::load(&prefix).unwrap();
        assert_eq!(loaded.params(), params);
        for pattern in [&text[..3], &text[20..60], &text[300..333]] {
            assert_eq!(loaded.search(pattern), index.search(pattern));
        }
    }

    #[test]
    fn test_load_missing_boundary() {
        let dir = tempdir().unwrap();
        let prefix = dir.path().join("partial");

        let (params, dictionary, parse) = hand_parse();
        let index = AcceleratedIndex::build(params, &dictionary, &parse).unwrap();
        index.save_dictionary_level(&prefix).unwrap();
        index.save_parse_level(&prefix).unwrap();

        let err = AcceleratedIndex::load(&prefix).unwrap_err();
        assert!(matches!(err, Error::MissingArtifact(p) if p == with_suffix(&prefix, BOUNDARY_SUFFIX)));
    }

    #[test]
    fn test_concurrent_queries() {
        let params = Params::new(4, 7).unwrap();
        let text = repetitive_dna(300, 4, 77);
        let (dictionary, parse) = parse_text(&text, params).unwrap();
        let index = AcceleratedIndex::build(params, &dictionary, &parse).unwrap();

        let patterns: Vec<&[u8]> = (0..8).map(|i| &text[i * 50..i * 50 + 25]).collect();
        let expected: Vec<usize> = patterns.iter().map(|p| index.count(p)).collect();

        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for (pattern, &want) in patterns.iter().zip(&expected) {
                        assert_eq!(index.count(pattern), want);
                    }
                });
            }
        });
    }
}
