//! Prefix-Free Parsing (PFP) inputs
//!
//! A text `T` is parsed as `DOLLAR · T · DOLLAR^w` into overlapping phrases:
//! every trigger window (see [`crate::parser`]) closes a phrase and opens the
//! next one, so consecutive phrases share exactly `w` symbols. The distinct
//! phrases form the [`Dictionary`]; the sequence of their ranks is the parse.
//!
//! Parsing large inputs is normally done by an upstream pipeline; this module
//! reads its artifacts and also provides an in-memory construction-mode
//! parser used by tests, demos and small inputs.

use std::io::Write;
use std::path::Path;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::parser::trigger_positions;
use crate::storage::read_artifact;

/// Terminal symbol of every indexed text; end-of-dictionary marker on disk.
pub const SENTINEL: u8 = 0x00;
/// Separates phrases in the dictionary text; end-of-word marker on disk.
pub const DELIMITER: u8 = 0x01;
/// Opens the first phrase and pads the last one.
pub const DOLLAR: u8 = 0x02;

/// Supported window lengths.
pub const WINDOW_RANGE: core::ops::RangeInclusive<usize> = 3..=200;
/// Supported trigger moduli.
pub const MODULUS_RANGE: core::ops::RangeInclusive<u64> = 5..=20_000;

/// Bytes that never occur as text content.
#[inline(always)]
pub fn is_reserved(c: u8) -> bool {
    c <= DOLLAR
}

/// Parsing parameters. Must be identical at construction and query time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Params {
    /// Window length: trigger size and phrase overlap
    pub w: usize,
    /// Trigger modulus: a window is a trigger when its hash is divisible by `p`
    pub p: u64,
}

impl Params {
    pub fn new(w: usize, p: u64) -> Result<Self> {
        let params = Self { w, p };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        if !WINDOW_RANGE.contains(&self.w) {
            return Err(Error::InvalidParams(format!(
                "window size {} outside [{}, {}]",
                self.w,
                WINDOW_RANGE.start(),
                WINDOW_RANGE.end()
            )));
        }
        if !MODULUS_RANGE.contains(&self.p) {
            return Err(Error::InvalidParams(format!(
                "modulus {} outside [{}, {}]",
                self.p,
                MODULUS_RANGE.start(),
                MODULUS_RANGE.end()
            )));
        }
        Ok(())
    }
}

/// Distinct phrases in lexicographic order. Ranks are 1-based.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dictionary {
    phrases: Vec<Vec<u8>>,
}

impl Dictionary {
    /// Collect phrases into canonical order, dropping duplicates.
    pub fn from_phrases<I, P>(phrases: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Vec<u8>>,
    {
        let mut phrases: Vec<Vec<u8>> = phrases.into_iter().map(Into::into).collect();
        phrases.sort_unstable();
        phrases.dedup();
        Self { phrases }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    /// Phrase with the given 1-based rank.
    pub fn phrase(&self, rank: u32) -> Option<&[u8]> {
        let idx = (rank as usize).checked_sub(1)?;
        self.phrases.get(idx).map(Vec::as_slice)
    }

    /// 1-based rank of `phrase`, if present.
    pub fn rank_of(&self, phrase: &[u8]) -> Option<u32> {
        self.phrases
            .binary_search_by(|p| p.as_slice().cmp(phrase))
            .ok()
            .map(|idx| idx as u32 + 1)
    }

    /// Phrases in rank order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &[u8]> + '_ {
        self.phrases.iter().map(Vec::as_slice)
    }

    /// Sum of phrase lengths.
    pub fn total_len(&self) -> usize {
        self.phrases.iter().map(Vec::len).sum()
    }
}

/// Parse `text` into a dictionary and a parse (construction mode).
///
/// The text is framed as `DOLLAR · text · DOLLAR^w`; every trigger window
/// closes the current phrase, and the remainder (with its padding) becomes
/// the final phrase. Phrases are interned on first sight and ranked after the
/// whole text is consumed.
///
/// # Example
/// ```
/// use alice_afm::pfp::{parse_text, reconstruct_text, Params, DOLLAR};
///
/// let params = Params::new(4, 10).unwrap();
/// let text = b"ACGTTCCAACGTATACGGGT".repeat(4);
/// let (dictionary, parse) = parse_text(&text, params).unwrap();
///
/// let rebuilt = reconstruct_text(&dictionary, &parse, params.w).unwrap();
/// assert_eq!(rebuilt[0], DOLLAR);
/// assert_eq!(&rebuilt[1..rebuilt.len() - params.w], text.as_slice());
/// ```
pub fn parse_text(text: &[u8], params: Params) -> Result<(Dictionary, Vec<u32>)> {
    params.validate()?;
    if text.is_empty() {
        return Err(Error::InvalidText("text is empty".into()));
    }
    if let Some(pos) = text.iter().position(|&c| is_reserved(c)) {
        return Err(Error::InvalidText(format!(
            "reserved byte {:#04x} at offset {}",
            text[pos], pos
        )));
    }

    let mut framed = Vec::with_capacity(text.len() + params.w + 1);
    framed.push(DOLLAR);
    framed.extend_from_slice(text);
    framed.resize(framed.len() + params.w, DOLLAR);

    let triggers = trigger_positions(&framed, params);

    let mut ids: FxHashMap<&[u8], u32> = FxHashMap::default();
    let mut phrases: Vec<&[u8]> = Vec::new();
    let mut ids_parse: Vec<u32> = Vec::with_capacity(triggers.len() + 1);

    let mut start = 0;
    let ends = triggers
        .iter()
        .map(|&t| t + params.w)
        .chain(core::iter::once(framed.len()));
    for (i, end) in ends.enumerate() {
        let phrase = &framed[start..end];
        let id = *ids.entry(phrase).or_insert_with(|| {
            phrases.push(phrase);
            (phrases.len() - 1) as u32
        });
        ids_parse.push(id);
        if let Some(&t) = triggers.get(i) {
            start = t;
        }
    }

    // Rank = position in lexicographic order, 1-based.
    let mut order: Vec<u32> = (0..phrases.len() as u32).collect();
    order.sort_unstable_by(|&a, &b| phrases[a as usize].cmp(phrases[b as usize]));
    let mut rank_of_id = vec![0u32; phrases.len()];
    for (rank0, &id) in order.iter().enumerate() {
        rank_of_id[id as usize] = rank0 as u32 + 1;
    }

    let dictionary = Dictionary {
        phrases: order.iter().map(|&id| phrases[id as usize].to_vec()).collect(),
    };
    let parse: Vec<u32> = ids_parse.iter().map(|&id| rank_of_id[id as usize]).collect();

    tracing::debug!(
        text_len = text.len(),
        phrases = dictionary.len(),
        parse_len = parse.len(),
        "text parsed"
    );

    Ok((dictionary, parse))
}

/// Concatenate the phrases of `parse`, trimming the trailing `w` symbols of
/// every phrase but the last.
///
/// For a parse produced by [`parse_text`] the result is `DOLLAR · T · DOLLAR^w`.
pub fn reconstruct_text(dictionary: &Dictionary, parse: &[u32], w: usize) -> Result<Vec<u8>> {
    let (&last, body) = parse
        .split_last()
        .ok_or_else(|| Error::InvalidParse("parse is empty".into()))?;

    let lookup = |rank: u32| {
        dictionary
            .phrase(rank)
            .ok_or_else(|| Error::InvalidParse(format!("rank {} not in dictionary", rank)))
    };

    let mut text = Vec::new();
    for &rank in body {
        let phrase = lookup(rank)?;
        if phrase.len() < w {
            return Err(Error::InvalidDictionary(format!(
                "phrase {} is shorter than the window ({} < {})",
                rank,
                phrase.len(),
                w
            )));
        }
        text.extend_from_slice(&phrase[..phrase.len() - w]);
    }
    text.extend_from_slice(lookup(last)?);

    Ok(text)
}

/// Read a `.dict` artifact: phrases each followed by [`DELIMITER`], the whole
/// file terminated by [`SENTINEL`].
pub fn read_dictionary(path: impl AsRef<Path>) -> Result<Dictionary> {
    let path = path.as_ref();
    let bytes = read_artifact(path)?;

    let body = match bytes.split_last() {
        Some((&SENTINEL, body)) => body,
        _ => {
            return Err(Error::InvalidDictionary(format!(
                "{}: missing end-of-dictionary marker",
                path.display()
            )))
        }
    };
    let phrases: Vec<&[u8]> = match body.strip_suffix(&[DELIMITER]) {
        Some(words) => words.split(|&c| c == DELIMITER).collect(),
        None if body.is_empty() => Vec::new(),
        None => {
            return Err(Error::InvalidDictionary(format!(
                "{}: last phrase is not terminated",
                path.display()
            )))
        }
    };
    if let Some(empty) = phrases.iter().position(|p| p.is_empty()) {
        return Err(Error::InvalidDictionary(format!(
            "{}: phrase {} is empty",
            path.display(),
            empty + 1
        )));
    }

    // Ranks in the parse refer to file order, which must already be sorted.
    if let Some(i) = phrases.windows(2).position(|pair| pair[0] >= pair[1]) {
        return Err(Error::InvalidDictionary(format!(
            "{}: phrases {} and {} are not in increasing order",
            path.display(),
            i + 1,
            i + 2
        )));
    }

    tracing::debug!(path = %path.display(), phrases = phrases.len(), "dictionary read");
    Ok(Dictionary {
        phrases: phrases.into_iter().map(<[u8]>::to_vec).collect(),
    })
}

/// Write a `.dict` artifact in rank order.
pub fn write_dictionary(path: impl AsRef<Path>, dictionary: &Dictionary) -> Result<()> {
    let mut writer = std::io::BufWriter::new(std::fs::File::create(path.as_ref())?);
    for phrase in dictionary.iter() {
        writer.write_all(phrase)?;
        writer.write_all(&[DELIMITER])?;
    }
    writer.write_all(&[SENTINEL])?;
    writer.flush()?;
    Ok(())
}

/// Read a `.parse` artifact: little-endian `u32` phrase ranks.
pub fn read_parse(path: impl AsRef<Path>) -> Result<Vec<u32>> {
    let path = path.as_ref();
    let bytes = read_artifact(path)?;
    if bytes.len() % 4 != 0 {
        return Err(Error::InvalidParse(format!(
            "{}: length {} is not a multiple of 4",
            path.display(),
            bytes.len()
        )));
    }

    let parse: Vec<u32> = bytes
        .chunks_exact(4)
        .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect();

    tracing::debug!(path = %path.display(), len = parse.len(), "parse read");
    Ok(parse)
}

/// Write a `.parse` artifact.
pub fn write_parse(path: impl AsRef<Path>, parse: &[u32]) -> Result<()> {
    let mut writer = std::io::BufWriter::new(std::fs::File::create(path.as_ref())?);
    for &rank in parse {
        writer.write_all(&rank.to_le_bytes())?;
    }
    writer.flush()?;
    Ok(())
}
