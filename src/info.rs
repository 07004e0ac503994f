use std::fmt;

use crate::FmIndex;
use crate::markers::{LARGE_MARKER_RECORD_BYTES, SMALL_MARKER_RECORD_BYTES};

/// Size statistics of an index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexInfo {
    pub small_sample_rate: usize,
    pub large_sample_rate: usize,
    pub num_symbols: usize,
    pub num_sequences: usize,
    pub num_compressed_bytes: usize,
    pub num_small_markers: usize,
    pub num_large_markers: usize,
}

impl IndexInfo {
    pub(crate) fn new(index: &FmIndex) -> Self {
        Self {
            small_sample_rate: index.small_sample_rate(),
            large_sample_rate: index.large_sample_rate(),
            num_symbols: index.len(),
            num_sequences: index.num_sequences(),
            num_compressed_bytes: index.num_compressed_bytes(),
            num_small_markers: index.small_markers().len(),
            num_large_markers: index.large_markers().len(),
        }
    }

    pub fn small_marker_bytes(&self) -> usize {
        self.num_small_markers * SMALL_MARKER_RECORD_BYTES
    }

    pub fn large_marker_bytes(&self) -> usize {
        self.num_large_markers * LARGE_MARKER_RECORD_BYTES
    }

    pub fn total_bytes(&self) -> usize {
        self.num_compressed_bytes + self.small_marker_bytes() + self.large_marker_bytes()
    }

    pub fn bits_per_symbol(&self) -> f64 {
        (self.total_bytes() * 8) as f64 / self.num_symbols as f64
    }

    pub fn compressed_bits_per_symbol(&self) -> f64 {
        (self.num_compressed_bytes * 8) as f64 / self.num_symbols as f64
    }
}

impl fmt::Display for IndexInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "sample rates: {} small, {} large",
            self.small_sample_rate, self.large_sample_rate
        )?;
        writeln!(
            f,
            "symbols: {} in {} sequences",
            self.num_symbols, self.num_sequences
        )?;
        writeln!(
            f,
            "compressed BWT: {} bytes ({:.2} bits per symbol)",
            self.num_compressed_bytes,
            self.compressed_bits_per_symbol()
        )?;
        writeln!(
            f,
            "small markers: {} ({} bytes)",
            self.num_small_markers,
            self.small_marker_bytes()
        )?;
        writeln!(
            f,
            "large markers: {} ({} bytes)",
            self.num_large_markers,
            self.large_marker_bytes()
        )?;
        write!(
            f,
            "total: {} bytes ({:.2} bits per symbol)",
            self.total_bytes(),
            self.bits_per_symbol()
        )
    }
}
