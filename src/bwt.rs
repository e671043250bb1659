//! Burrows-Wheeler Transform (BWT)
//!
//! Suffix array, BWT and C-table construction for any dense integer
//! alphabet. The same code serves the byte-level dictionary text and the
//! phrase-rank parse.

use core::fmt::Debug;
use core::hash::Hash;

/// A symbol of an indexed sequence.
///
/// Symbols map to dense `u32` codes. Code 0 is the sentinel: it terminates
/// every indexed text and is never content.
pub trait Symbol: Copy + Ord + Hash + Debug + Send + Sync + 'static {
    /// Terminal symbol, lexicographically smallest.
    const SENTINEL: Self;

    fn code(self) -> u32;

    fn from_code(code: u32) -> Self;
}

impl Symbol for u8 {
    const SENTINEL: u8 = 0;

    #[inline(always)]
    fn code(self) -> u32 {
        self as u32
    }

    #[inline(always)]
    fn from_code(code: u32) -> Self {
        code as u8
    }
}

impl Symbol for u32 {
    const SENTINEL: u32 = 0;

    #[inline(always)]
    fn code(self) -> u32 {
        self
    }

    #[inline(always)]
    fn from_code(code: u32) -> Self {
        code
    }
}

/// Build Suffix Array by prefix doubling. O(N log^2 N).
///
/// The result has `text.len() + 1` entries: position `text.len()` stands for
/// the implicit sentinel suffix and always sorts first.
pub fn build_suffix_array<S: Symbol>(text: &[S]) -> Vec<usize> {
    let n = text.len();
    let mut sa: Vec<usize> = (0..=n).collect();

    // Sentinel suffix gets rank 0, content codes are shifted past it.
    let mut rank: Vec<usize> = text
        .iter()
        .map(|s| s.code() as usize + 1)
        .chain(core::iter::once(0))
        .collect();
    let mut next_rank = vec![0usize; n + 1];

    let mut k = 1;
    loop {
        {
            let key = |i: usize| (rank[i], if i + k <= n { rank[i + k] } else { 0 });
            sa.sort_unstable_by_key(|&i| key(i));

            next_rank[sa[0]] = 0;
            for j in 1..=n {
                let bump = usize::from(key(sa[j - 1]) != key(sa[j]));
                next_rank[sa[j]] = next_rank[sa[j - 1]] + bump;
            }
        }
        core::mem::swap(&mut rank, &mut next_rank);

        if rank[sa[n]] == n {
            break;
        }
        k <<= 1;
    }

    sa
}

/// Build BWT from text and suffix array
/// BWT[i] = text[SA[i] - 1] (or sentinel if SA[i] == 0)
pub fn build_bwt<S: Symbol>(text: &[S], sa: &[usize]) -> Vec<S> {
    sa.iter()
        .map(|&idx| if idx == 0 { S::SENTINEL } else { text[idx - 1] })
        .collect()
}

/// Build C-Table: C[c] = count of symbols with code smaller than c.
///
/// The table has `sigma + 1` entries where `sigma` is one past the largest
/// code, so `C[c]..C[c + 1]` is the block of rows starting with `c`.
pub fn build_c_table<S: Symbol>(bwt: &[S]) -> Vec<usize> {
    let sigma = bwt.iter().map(|s| s.code() as usize + 1).max().unwrap_or(1);
    let mut counts = vec![0usize; sigma];

    for s in bwt {
        counts[s.code() as usize] += 1;
    }

    let mut c_table = Vec::with_capacity(sigma + 1);
    let mut sum = 0;
    for count in counts {
        c_table.push(sum);
        sum += count;
    }
    c_table.push(sum);

    c_table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn naive_suffix_array<S: Symbol>(text: &[S]) -> Vec<usize> {
        let n = text.len();
        let mut sa: Vec<usize> = (0..=n).collect();
        sa.sort_by(|&a, &b| text[a..].cmp(&text[b..]));
        sa
    }

    #[test]
    fn test_suffix_array() {
        let sa = build_suffix_array(b"banana".as_slice());

        // 6: $, 5: a$, 3: ana$, 1: anana$, 0: banana$, 4: na$, 2: nana$
        assert_eq!(sa, vec![6, 5, 3, 1, 0, 4, 2]);
    }

    #[test]
    fn test_suffix_array_repetitive() {
        let text = b"ACGTACGTACGTTACGTACGTACGA".repeat(6);
        assert_eq!(build_suffix_array(text.as_slice()), naive_suffix_array(&text));

        let runs = vec![b'A'; 300];
        assert_eq!(build_suffix_array(runs.as_slice()), naive_suffix_array(&runs));
    }

    #[test]
    fn test_suffix_array_integers() {
        let seq: Vec<u32> = vec![1, 5, 2, 5, 4, 3, 4, 2, 6, 5, 2, 3, 3, 4, 3, 4, 4];
        assert_eq!(build_suffix_array(&seq), naive_suffix_array(&seq));
    }

    #[test]
    fn test_bwt() {
        let text = b"banana";
        let sa = build_suffix_array(text.as_slice());
        let bwt = build_bwt(text.as_slice(), &sa);

        // SA=[6,5,3,1,0,4,2] -> "annb$aa"
        assert_eq!(bwt, vec![b'a', b'n', b'n', b'b', 0, b'a', b'a']);
    }

    #[test]
    fn test_c_table() {
        let bwt = vec![0u8, b'a', b'a', b'b', b'a'];
        let c_table = build_c_table(&bwt);

        assert_eq!(c_table.len(), b'b' as usize + 2);
        assert_eq!(c_table[0], 0);
        assert_eq!(c_table[b'a' as usize], 1);
        assert_eq!(c_table[b'b' as usize], 4);
        assert_eq!(c_table[b'b' as usize + 1], 5);
    }
}
