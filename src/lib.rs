//! # ALICE-AFM
//!
//! **Accelerated FM-Index over prefix-free parsed text**
//!
//! > "Index the phrases, not the text. Repetition is free."
//!
//! A highly repetitive text is split by a rolling hash into a small
//! dictionary of distinct phrases and a parse (the sequence of their ranks).
//! Two compact FM-indexes, one per level, plus a sparse boundary bitvector
//! answer `count`/`search` against the full text without ever building it.
//!
//! ## Architecture
//!
//! | Layer | Structure | Module |
//! |-------|-----------|--------|
//! | Bits | Interleaved rank/select BitVector, Elias-Fano SparseBitVector | [`bitvec`], [`sparse`] |
//! | Sequence | Wavelet Matrix over integer codes | [`wavelet`] |
//! | Text | Suffix array, BWT, C-table, backward search | [`bwt`], [`search`] |
//! | Parse | Karp-Rabin triggers, dictionary, pattern parser | [`pfp`], [`parser`] |
//! | Index | Accelerated (two-level) and Baseline (materialized) | [`afm`], [`baseline`] |
//!
//! ## Complexity
//!
//! | Operation | Accelerated | Baseline |
//! |-----------|-------------|----------|
//! | Build | O(D log² D + P log² P) | O(N log² N) |
//! | Count | O(M + phrases(M) × log P) | O(M) |
//! | Space | dictionary + parse | full text |
//!
//! D = dictionary length, P = parse length, N = text length, M = pattern length.
//!
//! ## Example
//!
//! ```
//! use alice_afm::{AcceleratedIndex, BaselineIndex, Params};
//! use alice_afm::pfp::parse_text;
//!
//! let params = Params::new(4, 10).unwrap();
//! let text = b"GATTACAGATTACATTAGACCAGATTGCA".repeat(20);
//! let (dictionary, parse) = parse_text(&text, params).unwrap();
//!
//! let afm = AcceleratedIndex::build(params, &dictionary, &parse).unwrap();
//! let baseline = BaselineIndex::build(params, &dictionary, &parse).unwrap();
//!
//! for pattern in [&b"GATTACA"[..], b"TTAGACCAGATTGCAGATTACAGA", b"CC"] {
//!     assert_eq!(afm.count(pattern), baseline.count(pattern));
//! }
//! assert_eq!(afm.count(b"GATTACA"), 40);
//! ```

pub mod afm;
pub mod baseline;
pub mod bitvec;
pub mod bwt;
pub mod config;
pub mod error;
pub mod parser;
pub mod pfp;
pub mod search;
pub mod sparse;
pub mod storage;
pub mod wavelet;

pub use afm::{AcceleratedIndex, Occurrences};
pub use baseline::BaselineIndex;
pub use config::IndexConfig;
pub use error::{Error, Result};
pub use parser::{Fragment, PatternParser, PhraseLookup, UNKNOWN};
pub use pfp::{Dictionary, Params};
pub use search::{CharIndex, FmIndex, RankIndex};

/// Version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
