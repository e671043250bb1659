//! Pattern Parser (rolling-hash phrase boundaries)
//!
//! A window of `w` symbols is a *trigger* when it holds no reserved byte and
//! its Karp-Rabin hash is divisible by `p`. The hash depends only on the
//! window content, so the triggers found inside a query pattern are phrase
//! boundaries at every place the pattern occurs in the parsed text.
//!
//! **Query mode**: [`PatternParser`] cuts a pattern at its triggers into
//! overlapping [`Fragment`]s and resolves the whole phrases between two
//! triggers to dictionary ranks through a [`PhraseLookup`].

use crate::pfp::{is_reserved, Dictionary, Params};

/// Mersenne prime 2^61 - 1
const MODULUS: u64 = (1 << 61) - 1;
/// Polynomial base
const BASE: u64 = 1_000_000_007;

/// Rank marker for a fragment that is not a known dictionary phrase.
pub const UNKNOWN: u32 = 0;

#[inline(always)]
fn mul_mod(a: u64, b: u64) -> u64 {
    ((a as u128 * b as u128) % MODULUS as u128) as u64
}

#[inline(always)]
fn add_mod(a: u64, b: u64) -> u64 {
    let sum = a + b;
    if sum >= MODULUS {
        sum - MODULUS
    } else {
        sum
    }
}

/// Karp-Rabin rolling hash over a fixed-size window.
///
/// `hash(c_0 .. c_{w-1}) = Σ c_i · B^(w-1-i) mod (2^61 - 1)`
#[derive(Debug, Clone)]
pub struct KarpRabin {
    window: usize,
    /// B^(w-1), weight of the outgoing symbol
    msb_weight: u64,
    hash: u64,
}

impl KarpRabin {
    pub fn new(window: usize) -> Self {
        let msb_weight = (1..window).fold(1, |acc, _| mul_mod(acc, BASE));
        Self {
            window,
            msb_weight,
            hash: 0,
        }
    }

    /// Hash of a single window.
    pub fn of(window: &[u8]) -> u64 {
        let mut kr = Self::new(window.len());
        kr.init(window);
        kr.hash
    }

    /// Reset to the hash of `window` (must be `window` symbols long).
    pub fn init(&mut self, window: &[u8]) {
        debug_assert_eq!(window.len(), self.window);
        self.hash = window
            .iter()
            .fold(0, |acc, &c| add_mod(mul_mod(acc, BASE), c as u64));
    }

    /// Slide the window by one: drop `outgoing`, append `incoming`.
    #[inline]
    pub fn roll(&mut self, outgoing: u8, incoming: u8) {
        let drop = mul_mod(outgoing as u64, self.msb_weight);
        let kept = add_mod(self.hash, MODULUS - drop);
        self.hash = add_mod(mul_mod(kept, BASE), incoming as u64);
    }

    #[inline]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    #[inline]
    pub fn window(&self) -> usize {
        self.window
    }
}

/// True if `window` is a trigger under `params`.
pub fn is_trigger(window: &[u8], params: Params) -> bool {
    window.len() == params.w
        && !window.iter().any(|&c| is_reserved(c))
        && KarpRabin::of(window) % params.p == 0
}

/// Start offsets of every trigger window in `symbols`, in increasing order.
pub fn trigger_positions(symbols: &[u8], params: Params) -> Vec<usize> {
    let w = params.w;
    if symbols.len() < w {
        return Vec::new();
    }

    let mut kr = KarpRabin::new(w);
    kr.init(&symbols[..w]);
    let mut last_reserved = symbols[..w].iter().rposition(|&c| is_reserved(c));
    let mut triggers = Vec::new();

    for start in 0..=symbols.len() - w {
        if start > 0 {
            let incoming = symbols[start + w - 1];
            kr.roll(symbols[start - 1], incoming);
            if is_reserved(incoming) {
                last_reserved = Some(start + w - 1);
            }
        }

        let clean = last_reserved.map_or(true, |r| r < start);
        if clean && kr.hash() % params.p == 0 {
            triggers.push(start);
        }
    }

    triggers
}

/// Rank lookup for whole phrases met while parsing a pattern.
pub trait PhraseLookup {
    /// 1-based dictionary rank of `phrase`, `None` if it is not a phrase.
    fn rank_of(&self, phrase: &[u8]) -> Option<u32>;
}

impl PhraseLookup for Dictionary {
    #[inline]
    fn rank_of(&self, phrase: &[u8]) -> Option<u32> {
        Dictionary::rank_of(self, phrase)
    }
}

/// A piece of a parsed pattern: `pattern[start..end]`.
///
/// Only fragments enclosed by two triggers are whole phrases and carry a
/// rank. The leading and trailing fragments are partial phrases and are
/// always [`UNKNOWN`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fragment {
    pub start: usize,
    pub end: usize,
    pub rank: u32,
}

impl Fragment {
    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    #[inline]
    pub fn is_known(&self) -> bool {
        self.rank != UNKNOWN
    }

    /// The bytes of this fragment within `pattern`.
    #[inline]
    pub fn slice<'p>(&self, pattern: &'p [u8]) -> &'p [u8] {
        &pattern[self.start..self.end]
    }
}

/// Query-mode parser: cuts a pattern at its triggers.
///
/// # Example
/// ```
/// use alice_afm::pfp::{parse_text, Params};
/// use alice_afm::parser::PatternParser;
///
/// let params = Params::new(3, 5).unwrap();
/// let text = b"GATTACAGATTACATTAGACCAGATTGCA".repeat(3);
/// let (dictionary, _) = parse_text(&text, params).unwrap();
///
/// let fragments = PatternParser::new(params, &dictionary).parse(&text);
/// let covered: usize = fragments.iter().map(|f| f.len()).sum();
/// assert_eq!(covered - (fragments.len() - 1) * params.w, text.len());
/// ```
pub struct PatternParser<'a, L: PhraseLookup + ?Sized> {
    params: Params,
    lookup: &'a L,
}

impl<'a, L: PhraseLookup + ?Sized> PatternParser<'a, L> {
    pub fn new(params: Params, lookup: &'a L) -> Self {
        Self { params, lookup }
    }

    /// Fragments of `pattern` in order. Consecutive fragments overlap by
    /// exactly `w` symbols; a pattern without triggers is one fragment.
    pub fn parse(&self, pattern: &[u8]) -> Vec<Fragment> {
        let triggers = trigger_positions(pattern, self.params);
        self.fragments(pattern, &triggers)
    }

    /// Fragments for precomputed trigger offsets of `pattern`.
    pub fn fragments(&self, pattern: &[u8], triggers: &[usize]) -> Vec<Fragment> {
        let w = self.params.w;
        let (first, last) = match (triggers.first(), triggers.last()) {
            (Some(&first), Some(&last)) => (first, last),
            _ => {
                return vec![Fragment {
                    start: 0,
                    end: pattern.len(),
                    rank: UNKNOWN,
                }]
            }
        };

        let mut fragments = Vec::with_capacity(triggers.len() + 1);
        fragments.push(Fragment {
            start: 0,
            end: first + w,
            rank: UNKNOWN,
        });
        for pair in triggers.windows(2) {
            let (start, end) = (pair[0], pair[1] + w);
            let rank = self
                .lookup
                .rank_of(&pattern[start..end])
                .unwrap_or(UNKNOWN);
            fragments.push(Fragment { start, end, rank });
        }
        fragments.push(Fragment {
            start: last,
            end: pattern.len(),
            rank: UNKNOWN,
        });

        fragments
    }
}
