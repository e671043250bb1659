//! Sparse BitVector (Elias-Fano)
//!
//! Stores only the set positions: each position is split into `low_width`
//! low bits (packed verbatim) and a high part written in unary into a
//! [`BitVector`]. Space is about `2 + log(universe / ones)` bits per set bit,
//! so a bitvector with one bit per phrase over a text-sized universe stays
//! proportional to the dictionary.

use serde::{Deserialize, Serialize};

use crate::bitvec::BitVector;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparseBitVector {
    universe: usize,
    ones: usize,
    low_width: u32,
    low_bits: Vec<u64>,
    high_bits: BitVector,
}

impl SparseBitVector {
    /// Build from strictly increasing positions, all `< universe`.
    ///
    /// # Panics
    /// Panics if the positions are unsorted or out of range; both are
    /// construction bugs, not data errors.
    pub fn from_positions(positions: &[usize], universe: usize) -> Self {
        assert!(
            positions.windows(2).all(|w| w[0] < w[1]),
            "positions must be strictly increasing"
        );
        assert!(
            positions.last().map_or(true, |&p| p < universe),
            "position out of range"
        );

        let ones = positions.len();
        let low_width = if ones == 0 || universe <= ones {
            0
        } else {
            (universe / ones).ilog2()
        };

        let mut low_bits = vec![0u64; (ones * low_width as usize).div_ceil(64)];
        let mut high_bits = BitVector::new();

        for (k, &pos) in positions.iter().enumerate() {
            write_bits(&mut low_bits, k * low_width as usize, low_width, pos as u64);
            let target = (pos >> low_width) + k;
            high_bits.push_run(false, target - high_bits.len());
            high_bits.push(true);
        }
        // One terminating zero per possible high value keeps select0 total.
        let high_len = (universe >> low_width) + ones + 1;
        high_bits.push_run(false, high_len - high_bits.len());
        high_bits.build_index();

        Self {
            universe,
            ones,
            low_width,
            low_bits,
            high_bits,
        }
    }

    /// Rank1(i): number of set positions in [0..i)
    pub fn rank1(&self, i: usize) -> usize {
        if i >= self.universe {
            return self.ones;
        }

        let high = i >> self.low_width;
        let low = (i as u64) & low_mask(self.low_width);

        // Elements whose high part is below `high` precede the (high-1)-th zero.
        let (mut k, mut bit) = if high == 0 {
            (0, 0)
        } else {
            match self.high_bits.select0(high - 1) {
                Some(zero) => (zero + 1 - high, zero + 1),
                None => return self.ones,
            }
        };

        while bit < self.high_bits.len() && self.high_bits.get(bit) && self.low(k) < low {
            k += 1;
            bit += 1;
        }
        k
    }

    /// Position of the k-th set bit (0-based k).
    pub fn select1(&self, k: usize) -> Option<usize> {
        if k >= self.ones {
            return None;
        }
        let bit = self.high_bits.select1(k)?;
        let high = bit - k;
        Some((high << self.low_width) | self.low(k) as usize)
    }

    /// Access bit at index
    pub fn get(&self, i: usize) -> bool {
        self.rank1(i + 1) > self.rank1(i)
    }

    /// Length in bits (the universe).
    #[inline]
    pub fn len(&self) -> usize {
        self.universe
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.universe == 0
    }

    #[inline]
    pub fn count_ones(&self) -> usize {
        self.ones
    }

    /// Iterate over the set positions in increasing order.
    pub fn ones(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.ones).filter_map(move |k| self.select1(k))
    }

    /// Heap bytes held by the structure.
    pub fn size_bytes(&self) -> usize {
        self.low_bits.len() * core::mem::size_of::<u64>() + self.high_bits.size_bytes()
    }

    #[inline]
    fn low(&self, k: usize) -> u64 {
        read_bits(&self.low_bits, k * self.low_width as usize, self.low_width)
    }
}

#[inline]
fn low_mask(width: u32) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

fn write_bits(words: &mut [u64], offset: usize, width: u32, value: u64) {
    if width == 0 {
        return;
    }
    let value = value & low_mask(width);
    let (word, shift) = (offset / 64, (offset % 64) as u32);
    words[word] |= value << shift;
    if shift + width > 64 {
        words[word + 1] |= value >> (64 - shift);
    }
}

fn read_bits(words: &[u64], offset: usize, width: u32) -> u64 {
    if width == 0 {
        return 0;
    }
    let (word, shift) = (offset / 64, (offset % 64) as u32);
    let mut value = words[word] >> shift;
    if shift + width > 64 {
        value |= words[word + 1] << (64 - shift);
    }
    value & low_mask(width)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive_rank(positions: &[usize], i: usize) -> usize {
        positions.iter().filter(|&&p| p < i).count()
    }

    #[test]
    fn test_rank_select_small() {
        let positions = [1, 4, 5, 9, 30];
        let sv = SparseBitVector::from_positions(&positions, 32);

        assert_eq!(sv.count_ones(), 5);
        for i in 0..=32 {
            assert_eq!(sv.rank1(i), naive_rank(&positions, i), "rank1({})", i);
        }
        for (k, &p) in positions.iter().enumerate() {
            assert_eq!(sv.select1(k), Some(p));
        }
        assert_eq!(sv.select1(5), None);
        assert!(sv.get(9));
        assert!(!sv.get(10));
    }

    #[test]
    fn test_very_sparse() {
        let positions: Vec<usize> = (0..50).map(|i| i * 9_973 + 17).collect();
        let sv = SparseBitVector::from_positions(&positions, 600_000);

        assert!(sv.low_width > 0);
        for (k, &p) in positions.iter().enumerate() {
            assert_eq!(sv.select1(k), Some(p));
            assert_eq!(sv.rank1(p), k);
            assert_eq!(sv.rank1(p + 1), k + 1);
        }
        assert_eq!(sv.rank1(599_999), 50);
        assert_eq!(sv.ones().collect::<Vec<_>>(), positions);
    }

    #[test]
    fn test_dense() {
        // More ones than half the universe: low width collapses to zero.
        let positions: Vec<usize> = (0..100).filter(|i| i % 4 != 0).collect();
        let sv = SparseBitVector::from_positions(&positions, 100);

        assert_eq!(sv.low_width, 0);
        for i in 0..=100 {
            assert_eq!(sv.rank1(i), naive_rank(&positions, i));
        }
    }

    #[test]
    fn test_shared_high_parts() {
        // Consecutive positions share their high part.
        let positions = [64, 65, 66, 67, 200, 201, 1023];
        let sv = SparseBitVector::from_positions(&positions, 1024);

        for i in 0..=1024 {
            assert_eq!(sv.rank1(i), naive_rank(&positions, i), "rank1({})", i);
        }
        for (k, &p) in positions.iter().enumerate() {
            assert_eq!(sv.select1(k), Some(p));
        }
    }

    #[test]
    fn test_empty() {
        let sv = SparseBitVector::from_positions(&[], 10);
        assert_eq!(sv.count_ones(), 0);
        assert_eq!(sv.rank1(5), 0);
        assert_eq!(sv.select1(0), None);
        assert!(!sv.get(3));
    }

    #[test]
    fn test_bit_packing() {
        let mut words = vec![0u64; 2];
        write_bits(&mut words, 60, 9, 0b1_0110_1011);
        assert_eq!(read_bits(&words, 60, 9), 0b1_0110_1011);
        write_bits(&mut words, 3, 5, 0b10101);
        assert_eq!(read_bits(&words, 3, 5), 0b10101);
        assert_eq!(read_bits(&words, 60, 9), 0b1_0110_1011);
    }
}
