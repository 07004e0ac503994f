use crate::FmIndex;
use crate::construction::{self, SymbolSource};
use crate::error::BuildError;

/// Builder for the FM-Index.
///
/// Both sample rates must be powers of two, and the small sample rate must not exceed the
/// large one. Smaller sample rates lead to faster queries and a larger index.
#[derive(Debug, Clone, Copy)]
pub struct FmIndexConfig {
    small_sample_rate: usize,
    large_sample_rate: usize,
}

impl FmIndexConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of symbols per segment, the distance between two small markers.
    pub fn small_sample_rate(&mut self, small_sample_rate: usize) -> &mut Self {
        self.small_sample_rate = small_sample_rate;
        self
    }

    /// Distance between two large markers.
    pub fn large_sample_rate(&mut self, large_sample_rate: usize) -> &mut Self {
        self.large_sample_rate = large_sample_rate;
        self
    }

    /// Builds the index from a stream of BWT symbols. The source is read twice.
    pub fn construct_from_source(
        &self,
        source: &mut impl SymbolSource,
    ) -> Result<FmIndex, BuildError> {
        let sample_rates = SampleRates::new(self.small_sample_rate, self.large_sample_rate)?;

        FmIndex::new(source, sample_rates)
    }

    /// Computes the BWT of the texts in memory and builds the index from it.
    ///
    /// The texts may only contain the characters `ACGT` (upper or lower case).
    pub fn construct_from_texts<T: AsRef<[u8]>>(
        &self,
        texts: impl IntoIterator<Item = T>,
    ) -> Result<FmIndex, BuildError> {
        let sample_rates = SampleRates::new(self.small_sample_rate, self.large_sample_rate)?;
        let mut bwt = construction::bwt_from_texts(texts)?;

        FmIndex::new(&mut bwt, sample_rates)
    }
}

impl Default for FmIndexConfig {
    fn default() -> Self {
        Self {
            small_sample_rate: 128,
            large_sample_rate: 16384,
        }
    }
}

/// Validated sample rates together with their base two logarithms.
#[cfg_attr(feature = "savefile", derive(savefile::savefile_derive::Savefile))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SampleRates {
    pub(crate) small: usize,
    pub(crate) large: usize,
    pub(crate) small_shift: u32,
    pub(crate) large_shift: u32,
}

impl SampleRates {
    pub(crate) fn new(small: usize, large: usize) -> Result<Self, BuildError> {
        if !small.is_power_of_two() {
            return Err(BuildError::InvalidSampleRate {
                name: "small",
                value: small,
            });
        }

        if !large.is_power_of_two() {
            return Err(BuildError::InvalidSampleRate {
                name: "large",
                value: large,
            });
        }

        if small > large {
            return Err(BuildError::SampleRatesOutOfOrder { small, large });
        }

        Ok(Self {
            small,
            large,
            small_shift: small.trailing_zeros(),
            large_shift: large.trailing_zeros(),
        })
    }

    /// Index of the large marker that governs the small marker with the given index.
    #[inline(always)]
    pub(crate) fn large_marker_for(&self, small_marker_idx: usize) -> usize {
        (small_marker_idx << self.small_shift) >> self.large_shift
    }
}
