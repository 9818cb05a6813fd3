//! The bit-packed sliding window and its value layer.
//!
//! Window membership is tracked as one bit per *rank* of a block's
//! samples. [`BitWindow`] answers order-statistic queries with popcount
//! scans around a pivot word; [`WindowRank`] translates between cell
//! slots and ranks so that the bit layer never sees a sample value.

use crate::definitions::Sample;
use crate::error::MedianFilterError;

const WORD_SHIFT: usize = 6;
const WORD_BITS: usize = 1 << WORD_SHIFT;
const WORD_MASK: usize = WORD_BITS - 1;

/// Rank sentinel for NaN cells.
///
/// This conflates with "unused slot", which is fine: every slot of the
/// rank table is rewritten during block initialisation before any read.
const NAN_MARKER: i32 = -1;

/// Whether a window update adds or drops cells.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum WindowOp {
    Insert,
    Remove,
}

/// Index of the (n+1)-th set bit of `word`.
///
/// Requires `n < word.count_ones()`; with no such bit the result is
/// meaningless.
#[cfg(all(target_arch = "x86_64", target_feature = "bmi2"))]
#[inline]
fn nth_set_bit(word: u64, n: u32) -> u32 {
    // JUSTIFICATION
    //  Benefit
    //      PDEP collapses the order-statistic scan within a word to a
    //      single instruction, on the hot path of every median query.
    //  Correctness
    //      Compiled only when target_feature = "bmi2" guarantees the
    //      instruction exists; no memory is touched.
    let deposited = unsafe { std::arch::x86_64::_pdep_u64(1u64 << n, word) };
    deposited.trailing_zeros()
}

#[cfg(not(all(target_arch = "x86_64", target_feature = "bmi2")))]
#[inline]
fn nth_set_bit(mut word: u64, n: u32) -> u32 {
    for _ in 0..n {
        word &= word - 1;
    }
    word.trailing_zeros()
}

/// A multiset over the integer interval `[0, bb)`, one bit per element.
///
/// `half0` and `half1` cache the popcounts of the words below and from the
/// pivot word `p`. A median query walks `p` towards the goal rank; the two
/// queries made for one output cell target neighbouring ranks, so the walk
/// almost always stops in the word it starts in, and each query costs one
/// word scan plus a handful of popcounts.
pub(crate) struct BitWindow {
    /// Bit `s` is set iff rank `s` is currently inside the window.
    buf: Vec<u64>,
    /// Popcount of `buf[..p]`.
    half0: usize,
    /// Popcount of `buf[p..]`.
    half1: usize,
    p: usize,
}

impl BitWindow {
    /// Fallible constructor; the driver surfaces allocation failure
    /// before any block work starts.
    pub fn try_new(bb: usize) -> Result<BitWindow, MedianFilterError> {
        assert!(bb >= 1);
        let words = bb.div_ceil(WORD_BITS);
        let mut buf = Vec::new();
        buf.try_reserve_exact(words)
            .map_err(|_| MedianFilterError::AllocationFailed)?;
        buf.resize(words, 0);
        Ok(BitWindow {
            buf,
            half0: 0,
            half1: 0,
            p: words / 2,
        })
    }

    /// Empties the window.
    pub fn clear(&mut self) {
        self.buf.fill(0);
        self.half0 = 0;
        self.half1 = 0;
        self.p = self.buf.len() / 2;
    }

    /// Number of elements currently in the window.
    pub fn len(&self) -> usize {
        self.half0 + self.half1
    }

    /// Adds element `s`. Requires that `s` is absent.
    pub fn insert(&mut self, s: usize) {
        let i = s >> WORD_SHIFT;
        let bit = 1u64 << (s & WORD_MASK);
        debug_assert!(self.buf[i] & bit == 0);
        self.buf[i] |= bit;
        if i < self.p {
            self.half0 += 1;
        } else {
            self.half1 += 1;
        }
    }

    /// Drops element `s`. Requires that `s` is present.
    pub fn remove(&mut self, s: usize) {
        let i = s >> WORD_SHIFT;
        let bit = 1u64 << (s & WORD_MASK);
        debug_assert!(self.buf[i] & bit != 0);
        self.buf[i] ^= bit;
        if i < self.p {
            self.half0 -= 1;
        } else {
            self.half1 -= 1;
        }
    }

    /// Returns the (goal+1)-th smallest element of the window.
    ///
    /// Requires `goal < self.len()`.
    pub fn find(&mut self, goal: usize) -> usize {
        while self.half0 > goal {
            self.p -= 1;
            let ones = self.buf[self.p].count_ones() as usize;
            self.half0 -= ones;
            self.half1 += ones;
        }
        loop {
            let ones = self.buf[self.p].count_ones() as usize;
            if self.half0 + ones > goal {
                break;
            }
            self.half0 += ones;
            self.half1 -= ones;
            self.p += 1;
        }
        let n = goal - self.half0;
        debug_assert!(n < self.buf[self.p].count_ones() as usize);
        (self.p << WORD_SHIFT) | nth_set_bit(self.buf[self.p], n as u32) as usize
    }
}

/// The value layer over [`BitWindow`].
///
/// A block's non-NaN samples are sorted once into `sorted`; `rank` maps
/// each packed cell slot to its position in that order. The sliding window
/// then inserts and removes ranks, and median values are read back through
/// `sorted`. One instance is reused for every block a worker processes.
pub(crate) struct WindowRank<T> {
    /// The block's non-NaN samples as `(value, slot)`, ascending.
    sorted: Vec<(T, u32)>,
    /// Packed slot -> rank in `sorted`, or `NAN_MARKER`.
    rank: Vec<i32>,
    window: BitWindow,
}

impl<T: Sample> WindowRank<T> {
    pub fn new(bb: usize) -> WindowRank<T> {
        Self::try_new(bb).expect("scratch allocation failed")
    }

    /// Fallible constructor, used by the driver to probe the scratch
    /// allocation before any block work starts.
    pub fn try_new(bb: usize) -> Result<WindowRank<T>, MedianFilterError> {
        let mut sorted = Vec::new();
        sorted
            .try_reserve_exact(bb)
            .map_err(|_| MedianFilterError::AllocationFailed)?;
        let mut rank = Vec::new();
        rank.try_reserve_exact(bb)
            .map_err(|_| MedianFilterError::AllocationFailed)?;
        rank.resize(bb, NAN_MARKER);
        Ok(WindowRank {
            sorted,
            rank,
            window: BitWindow::try_new(bb)?,
        })
    }

    /// Starts initialisation for a new block.
    pub fn init_begin(&mut self) {
        self.sorted.clear();
    }

    /// Feeds the sample held by packed cell `slot`.
    pub fn init_feed(&mut self, value: T, slot: u32) {
        if value.is_nan() {
            self.rank[slot as usize] = NAN_MARKER;
        } else {
            self.sorted.push((value, slot));
        }
    }

    /// Sorts the fed samples and assigns each slot its rank.
    ///
    /// Ties on value are broken by slot so that ranks are reproducible;
    /// any deterministic order yields the same medians, since equal values
    /// are interchangeable in the sorted array.
    pub fn init_finish(&mut self) {
        self.sorted
            .sort_unstable_by(|a, b| a.0.total_order(b.0).then(a.1.cmp(&b.1)));
        for (i, &(_, slot)) in self.sorted.iter().enumerate() {
            self.rank[slot as usize] = i as i32;
        }
    }

    /// Empties the sliding window.
    pub fn clear(&mut self) {
        self.window.clear();
    }

    /// Applies `op` to the cell at `slot`. NaN cells are not part of the
    /// multiset and are skipped.
    pub fn update(&mut self, op: WindowOp, slot: u32) {
        let s = self.rank[slot as usize];
        if s != NAN_MARKER {
            match op {
                WindowOp::Insert => self.window.insert(s as usize),
                WindowOp::Remove => self.window.remove(s as usize),
            }
        }
    }

    /// Median of the samples currently in the window.
    ///
    /// An even-sized window yields the mean of the two middle values; a
    /// window with no non-NaN samples yields NaN.
    pub fn median(&mut self) -> T {
        let n = self.window.len();
        if n == 0 {
            return T::nan();
        }
        let lower = (n - 1) / 2;
        let upper = n / 2;
        let value = self.sorted[self.window.find(lower)].0;
        if upper == lower {
            value
        } else {
            let value2 = self.sorted[self.window.find(upper)].0;
            (value + value2) / (T::one() + T::one())
        }
    }
}
