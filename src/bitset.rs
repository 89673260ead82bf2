//! Fixed-size bit vector covering every cell of the padded board.

use std::ops::{BitOr, BitOrAssign};

use crate::constants::BOARDSIZE;
use crate::geometry::Point;

const WORDS: usize = BOARDSIZE.div_ceil(64);

/// One bit per cell of the padded grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BitSet {
    bits: [u64; WORDS],
}

impl BitSet {
    /// Create an empty set.
    pub const fn new() -> Self {
        Self { bits: [0; WORDS] }
    }

    #[inline]
    pub fn get(&self, pt: Point) -> bool {
        (self.bits[pt / 64] >> (pt % 64)) & 1 == 1
    }

    #[inline]
    pub fn set(&mut self, pt: Point) {
        self.bits[pt / 64] |= 1u64 << (pt % 64);
    }

    #[inline]
    pub fn clear(&mut self, pt: Point) {
        self.bits[pt / 64] &= !(1u64 << (pt % 64));
    }

    /// A copy of this set with `pt` cleared.
    ///
    /// Used to look at the board as if a piece had already left its square,
    /// without touching the original.
    #[inline]
    pub fn without(&self, pt: Point) -> Self {
        let mut copy = *self;
        copy.clear(pt);
        copy
    }

    /// Number of set bits.
    #[inline]
    pub fn count(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits.iter().all(|&w| w == 0)
    }

    /// Whether the two sets share any cell.
    #[inline]
    pub fn intersects(&self, other: &BitSet) -> bool {
        self.bits.iter().zip(&other.bits).any(|(a, b)| a & b != 0)
    }

    /// Whether every cell of `self` is also in `other`.
    #[inline]
    pub fn is_subset(&self, other: &BitSet) -> bool {
        self.bits.iter().zip(&other.bits).all(|(a, b)| a & !b == 0)
    }

    /// Iterate over set cells in increasing index order.
    pub fn iter(&self) -> Iter {
        Iter {
            bits: self.bits,
            word: 0,
        }
    }
}

impl BitOr for BitSet {
    type Output = BitSet;

    fn bitor(mut self, rhs: BitSet) -> BitSet {
        self |= rhs;
        self
    }
}

impl BitOrAssign for BitSet {
    fn bitor_assign(&mut self, rhs: BitSet) {
        for (a, b) in self.bits.iter_mut().zip(rhs.bits) {
            *a |= b;
        }
    }
}

impl FromIterator<Point> for BitSet {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        let mut set = BitSet::new();
        for pt in iter {
            set.set(pt);
        }
        set
    }
}

/// Iterator over the set cells of a [`BitSet`].
pub struct Iter {
    bits: [u64; WORDS],
    word: usize,
}

impl Iterator for Iter {
    type Item = Point;

    fn next(&mut self) -> Option<Point> {
        while self.word < WORDS {
            let w = self.bits[self.word];
            if w != 0 {
                let bit = w.trailing_zeros() as usize;
                // clear lowest set bit
                self.bits[self.word] = w & (w - 1);
                return Some(self.word * 64 + bit);
            }
            self.word += 1;
        }
        None
    }
}
