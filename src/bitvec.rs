//! Succinct BitVector with rank and select
//!
//! **Interleaved Memory Layout**: [RankHeader(u64) | Body(8 x u64)]
//! Rank is a single header fetch plus at most 8 popcounts. Select binary
//! searches the headers, then scans one block.

use serde::{Deserialize, Serialize};

/// 512 bits of body + 64 bits of header = 576 bits per block
const BLOCK_BITS: usize = 512;
const WORDS_PER_BLOCK: usize = 8;
const BLOCK_STRIDE: usize = WORDS_PER_BLOCK + 1; // 1 Header + 8 Body

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitVector {
    /// Interleaved data: [Rank0, Word0..7, Rank1, Word8..15, ...]
    data: Vec<u64>,
    len: usize,
    /// Total set bits, valid after `build_index()`
    ones: usize,
}

impl BitVector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a bit to the vector.
    /// Header placeholders are written during push, finalized by build_index().
    #[inline]
    pub fn push(&mut self, bit: bool) {
        let bit_idx = self.len % BLOCK_BITS;

        if bit_idx == 0 {
            self.data.push(0);
        }

        let word_offset = bit_idx / 64;
        let bit_offset = bit_idx % 64;

        let block_base = (self.len / BLOCK_BITS) * BLOCK_STRIDE;
        let target_idx = block_base + 1 + word_offset;

        if target_idx >= self.data.len() {
            self.data.push(0);
        }

        if bit {
            self.data[target_idx] |= 1 << bit_offset;
        }

        self.len += 1;
    }

    /// Push `count` copies of `bit`.
    pub fn push_run(&mut self, bit: bool, count: usize) {
        for _ in 0..count {
            self.push(bit);
        }
    }

    /// Finalize the index. Must be called after all pushes.
    /// Calculates the Rank Headers in-place.
    pub fn build_index(&mut self) {
        let mut sum = 0usize;

        for b in 0..self.num_blocks() {
            let base = b * BLOCK_STRIDE;
            self.data[base] = sum as u64;

            for w in 0..self.words_in_block(b) {
                sum += self.data[base + 1 + w].count_ones() as usize;
            }
        }

        self.ones = sum;
    }

    /// Access bit at index
    #[inline(always)]
    pub fn get(&self, i: usize) -> bool {
        let block = i / BLOCK_BITS;
        let offset = i % BLOCK_BITS;
        let word = offset / 64;
        let bit = offset % 64;

        let idx = block * BLOCK_STRIDE + 1 + word;
        (self.data[idx] >> bit) & 1 != 0
    }

    /// Rank1(i): Count 1s in [0..i)
    #[inline(always)]
    pub fn rank1(&self, i: usize) -> usize {
        let i = i.min(self.len);
        if i == 0 {
            return 0;
        }
        if i == self.len {
            return self.ones;
        }

        let block = i / BLOCK_BITS;
        let offset = i % BLOCK_BITS;
        let base = block * BLOCK_STRIDE;

        let mut r = self.data[base] as usize;

        let word_idx = offset / 64;
        let bit_idx = offset % 64;

        for w in 0..word_idx {
            r += self.data[base + 1 + w].count_ones() as usize;
        }

        if bit_idx > 0 {
            r += (self.data[base + 1 + word_idx] & low_mask(bit_idx)).count_ones() as usize;
        }

        r
    }

    /// Rank0(i): Count 0s in [0..i)
    #[inline(always)]
    pub fn rank0(&self, i: usize) -> usize {
        i.min(self.len) - self.rank1(i)
    }

    /// Rank(bit, i): Generalized rank query
    #[inline(always)]
    pub fn rank(&self, bit: bool, i: usize) -> usize {
        if bit {
            self.rank1(i)
        } else {
            self.rank0(i)
        }
    }

    /// Position of the k-th set bit (0-based k).
    pub fn select1(&self, k: usize) -> Option<usize> {
        if k >= self.ones {
            return None;
        }

        let block = self.last_block_where(|b| self.header(b) <= k);
        let base = block * BLOCK_STRIDE;
        let mut remaining = k - self.header(block);

        for w in 0..self.words_in_block(block) {
            let word = self.data[base + 1 + w];
            let ones = word.count_ones() as usize;
            if remaining < ones {
                return Some(block * BLOCK_BITS + w * 64 + select_in_word(word, remaining));
            }
            remaining -= ones;
        }
        None
    }

    /// Position of the k-th unset bit (0-based k).
    pub fn select0(&self, k: usize) -> Option<usize> {
        if k >= self.len - self.ones {
            return None;
        }

        let zeros_before = |b: usize| b * BLOCK_BITS - self.header(b);
        let block = self.last_block_where(|b| zeros_before(b) <= k);
        let base = block * BLOCK_STRIDE;
        let mut remaining = k - zeros_before(block);

        for w in 0..self.words_in_block(block) {
            let first_bit = block * BLOCK_BITS + w * 64;
            let valid = (self.len - first_bit).min(64);
            let inverted = !self.data[base + 1 + w] & low_mask(valid);
            let zeros = inverted.count_ones() as usize;
            if remaining < zeros {
                return Some(first_bit + select_in_word(inverted, remaining));
            }
            remaining -= zeros;
        }
        None
    }

    /// Total number of set bits.
    #[inline]
    pub fn count_ones(&self) -> usize {
        self.ones
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Heap bytes held by the vector.
    pub fn size_bytes(&self) -> usize {
        self.data.len() * core::mem::size_of::<u64>()
    }

    #[inline]
    fn header(&self, block: usize) -> usize {
        self.data[block * BLOCK_STRIDE] as usize
    }

    #[inline]
    fn num_blocks(&self) -> usize {
        self.len.div_ceil(BLOCK_BITS)
    }

    fn words_in_block(&self, block: usize) -> usize {
        let bits = (self.len - block * BLOCK_BITS).min(BLOCK_BITS);
        bits.div_ceil(64)
    }

    /// Largest block index satisfying a predicate that holds for block 0 and
    /// is monotone (true..true, false..false) over the blocks.
    fn last_block_where(&self, pred: impl Fn(usize) -> bool) -> usize {
        let (mut lo, mut hi) = (0, self.num_blocks());
        while hi - lo > 1 {
            let mid = lo + (hi - lo) / 2;
            if pred(mid) {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        lo
    }
}

impl FromIterator<bool> for BitVector {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        let mut bv = BitVector::new();
        for bit in iter {
            bv.push(bit);
        }
        bv.build_index();
        bv
    }
}

#[inline]
fn low_mask(bits: usize) -> u64 {
    if bits >= 64 {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

/// Offset of the r-th set bit inside a word (0-based r, must exist).
#[inline]
fn select_in_word(mut word: u64, r: usize) -> usize {
    for _ in 0..r {
        word &= word - 1;
    }
    word.trailing_zeros() as usize
}
