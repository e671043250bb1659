//! Wavelet Matrix over integer codes
//!
//! **Double-buffered build**: two auxiliary buffers of size N, swapped
//! between layers. One interleaved [`BitVector`] per bit of the widest code,
//! so a byte alphabet costs 8 layers and a phrase-rank alphabet of size σ
//! costs ⌈log2 σ⌉ layers.

use serde::{Deserialize, Serialize};

use crate::bitvec::BitVector;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct WaveletMatrix {
    /// `layers[d]` routes on bit `d` of the code (MSB layer is built first)
    layers: Vec<BitVector>,
    /// Number of zeros in each layer, used for routing
    zeros: Vec<usize>,
    len: usize,
}

impl WaveletMatrix {
    /// Build with Double Buffering (Ping-Pong)
    pub fn build(codes: &[u32]) -> Self {
        let n = codes.len();
        let max = codes.iter().copied().max().unwrap_or(0);
        let width = (u32::BITS - max.leading_zeros()).max(1) as usize;

        let mut layers: Vec<BitVector> = (0..width).map(|_| BitVector::new()).collect();
        let mut zeros = vec![0usize; width];

        if n == 0 {
            return Self { layers, zeros, len: 0 };
        }

        let mut current = codes.to_vec();
        let mut next = vec![0u32; n];

        for d in (0..width).rev() {
            let layer = &mut layers[d];
            let bit_mask = 1u32 << d;

            let zero_count = current.iter().filter(|&&c| c & bit_mask == 0).count();
            zeros[d] = zero_count;

            let mut z_ptr = 0;
            let mut o_ptr = zero_count;

            for &c in current.iter() {
                let bit = c & bit_mask != 0;
                layer.push(bit);

                if bit {
                    next[o_ptr] = c;
                    o_ptr += 1;
                } else {
                    next[z_ptr] = c;
                    z_ptr += 1;
                }
            }

            layer.build_index();
            core::mem::swap(&mut current, &mut next);
        }

        Self { layers, zeros, len: n }
    }

    /// Code at position i. O(width).
    #[inline]
    pub fn get(&self, mut i: usize) -> u32 {
        let mut c = 0u32;

        for d in (0..self.width()).rev() {
            let layer = &self.layers[d];
            let bit = layer.get(i);
            c |= (bit as u32) << d;

            i = if bit {
                self.zeros[d] + layer.rank1(i)
            } else {
                layer.rank0(i)
            };
        }
        c
    }

    /// Rank(c, i): occurrences of code c in [0..i). O(width).
    #[inline]
    pub fn rank(&self, c: u32, mut i: usize) -> usize {
        if self.len == 0 || (self.width() < u32::BITS as usize && c >> self.width() != 0) {
            return 0;
        }
        i = i.min(self.len);
        let mut start = 0;

        for d in (0..self.width()).rev() {
            let layer = &self.layers[d];
            let bit = (c >> d) & 1 != 0;

            let rank_start = layer.rank(bit, start);
            let rank_end = layer.rank(bit, i);

            if bit {
                start = self.zeros[d] + rank_start;
                i = self.zeros[d] + rank_end;
            } else {
                start = rank_start;
                i = rank_end;
            }
        }

        i - start
    }

    /// Number of layers (bits per code).
    #[inline]
    pub fn width(&self) -> usize {
        self.layers.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Heap bytes held by the layers.
    pub fn size_bytes(&self) -> usize {
        self.layers.iter().map(BitVector::size_bytes).sum::<usize>()
            + self.zeros.len() * core::mem::size_of::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(text: &[u8]) -> Vec<u32> {
        text.iter().map(|&c| c as u32).collect()
    }

    #[test]
    fn test_wavelet_get() {
        let text = b"abracadabra";
        let wm = WaveletMatrix::build(&codes(text));

        assert_eq!(wm.width(), 7);
        for (i, &c) in text.iter().enumerate() {
            assert_eq!(wm.get(i), c as u32, "Mismatch at position {}", i);
        }
    }

    #[test]
    fn test_wavelet_rank() {
        let wm = WaveletMatrix::build(&codes(b"abracadabra"));

        // 'a' at 0, 3, 5, 7, 10
        assert_eq!(wm.rank(b'a' as u32, 0), 0);
        assert_eq!(wm.rank(b'a' as u32, 1), 1);
        assert_eq!(wm.rank(b'a' as u32, 4), 2);
        assert_eq!(wm.rank(b'a' as u32, 11), 5);

        // 'b' at 1, 8
        assert_eq!(wm.rank(b'b' as u32, 2), 1);
        assert_eq!(wm.rank(b'b' as u32, 11), 2);

        // Outside the code width
        assert_eq!(wm.rank(0x1ff, 11), 0);
    }

    #[test]
    fn test_wavelet_all_same() {
        let wm = WaveletMatrix::build(&codes(b"aaaaaaaaaa"));

        assert_eq!(wm.rank(b'a' as u32, 5), 5);
        assert_eq!(wm.rank(b'a' as u32, 10), 10);
        assert_eq!(wm.rank(b'b' as u32, 10), 0);
    }

    #[test]
    fn test_wavelet_empty() {
        let wm = WaveletMatrix::build(&[]);

        assert!(wm.is_empty());
        assert_eq!(wm.len(), 0);
        assert_eq!(wm.rank(3, 0), 0);
    }

    #[test]
    fn test_wavelet_phrase_ranks() {
        // Parse-sized alphabet: codes wider than a byte
        let seq: Vec<u32> = (0..3000u32).map(|i| (i * 7919) % 1500).collect();
        let wm = WaveletMatrix::build(&seq);

        assert_eq!(wm.width(), 11);
        for (i, &c) in seq.iter().enumerate().step_by(37) {
            assert_eq!(wm.get(i), c);
        }
        for c in [0u32, 1, 749, 1499] {
            let expected = seq.iter().filter(|&&x| x == c).count();
            assert_eq!(wm.rank(c, seq.len()), expected);
        }
        let prefix = 1234;
        let expected = seq[..prefix].iter().filter(|&&x| x == 42).count();
        assert_eq!(wm.rank(42, prefix), expected);
    }
}
