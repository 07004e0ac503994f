use std::ops::{Add, AddAssign, Sub, SubAssign};

use num_traits::{NumCast, PrimInt};

use crate::alphabet::{ALPHABET_SIZE, Symbol};

/// Absolute per-symbol counts, as stored in large markers and returned by rank queries.
pub type AlphaCount64 = AlphaCount<u64>;

/// Per-symbol counts relative to a large marker, as stored in small markers.
pub type AlphaCount16 = AlphaCount<u16>;

/// One counter per symbol of the alphabet.
#[cfg_attr(feature = "savefile", derive(savefile::savefile_derive::Savefile))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AlphaCount<T> {
    counts: [T; ALPHABET_SIZE],
}

impl<T: PrimInt> AlphaCount<T> {
    pub fn new() -> Self {
        Self {
            counts: [T::zero(); ALPHABET_SIZE],
        }
    }

    #[inline(always)]
    pub fn get(&self, symbol: Symbol) -> T {
        self.counts[symbol as usize]
    }

    #[inline(always)]
    pub fn get_by_rank(&self, rank: u8) -> T {
        self.counts[rank as usize]
    }

    pub fn set(&mut self, symbol: Symbol, value: T) {
        self.counts[symbol as usize] = value;
    }

    pub fn set_by_rank(&mut self, rank: u8, value: T) {
        self.counts[rank as usize] = value;
    }

    #[inline(always)]
    pub fn increment(&mut self, symbol: Symbol) {
        self.increment_by_rank(symbol.rank());
    }

    #[inline(always)]
    pub fn increment_by_rank(&mut self, rank: u8) {
        let count = &mut self.counts[rank as usize];
        *count = *count + T::one();
    }

    /// Sum over all symbols. Computed in 64 bits, so it never overflows for the narrow variant.
    pub fn sum(&self) -> u64 {
        self.counts
            .iter()
            .map(|&count| <u64 as NumCast>::from(count).unwrap_or(u64::MAX))
            .sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Symbol, T)> + '_ {
        Symbol::ALL.into_iter().zip(self.counts.iter().copied())
    }
}

impl<T: PrimInt> Default for AlphaCount<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl AlphaCount64 {
    /// Adds counts that are relative to a marker to these absolute counts.
    #[inline(always)]
    pub fn add_relative(&mut self, relative: &AlphaCount16) {
        for (count, &relative_count) in self.counts.iter_mut().zip(&relative.counts) {
            *count += relative_count as u64;
        }
    }

    /// Converts into narrow counts.
    ///
    /// Returns the first symbol whose count does not fit into 16 bits, together with that count.
    pub fn try_narrow(&self) -> Result<AlphaCount16, (Symbol, u64)> {
        let mut narrow = AlphaCount16::new();

        for (symbol, count) in self.iter() {
            let value = u16::try_from(count).map_err(|_| (symbol, count))?;
            narrow.set(symbol, value);
        }

        Ok(narrow)
    }
}

impl<T: PrimInt> AddAssign for AlphaCount<T> {
    fn add_assign(&mut self, rhs: Self) {
        for (count, other) in self.counts.iter_mut().zip(rhs.counts) {
            *count = *count + other;
        }
    }
}

impl<T: PrimInt> SubAssign for AlphaCount<T> {
    fn sub_assign(&mut self, rhs: Self) {
        for (count, other) in self.counts.iter_mut().zip(rhs.counts) {
            *count = *count - other;
        }
    }
}

impl<T: PrimInt> Add for AlphaCount<T> {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

impl<T: PrimInt> Sub for AlphaCount<T> {
    type Output = Self;

    fn sub(mut self, rhs: Self) -> Self {
        self -= rhs;
        self
    }
}

impl<T: PrimInt + std::fmt::Display> std::fmt::Display for AlphaCount<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, (symbol, count)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{symbol}:{count}")?;
        }

        Ok(())
    }
}
