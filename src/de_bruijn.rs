//! A de Bruijn graph of the indexed texts, answered by the FM-Index without building it.
//!
//! A k-mer is a vertex if it occurs in the texts or its reverse complement does. Edges
//! connect k-mers that overlap by `k - 1` symbols.

use crate::FmIndex;
use crate::alphabet::{self, BASES};

#[derive(Clone, Copy)]
pub struct DeBruijnGraph<'a> {
    index: &'a FmIndex,
}

impl<'a> DeBruijnGraph<'a> {
    pub fn new(index: &'a FmIndex) -> Self {
        Self { index }
    }

    pub fn index(&self) -> &'a FmIndex {
        self.index
    }

    pub fn is_vertex(&self, kmer: &[u8]) -> bool {
        self.index.count(kmer) > 0 || self.index.count(&alphabet::reverse_complement(kmer)) > 0
    }

    /// Whether `kmer[1..] + base` is a vertex.
    pub fn is_suffix_neighbor(&self, kmer: &[u8], base: u8) -> bool {
        let mut neighbor = kmer.get(1..).unwrap_or_default().to_vec();
        neighbor.push(base);

        self.is_vertex(&neighbor)
    }

    /// Whether `base + kmer[..k - 1]` is a vertex.
    pub fn is_prefix_neighbor(&self, kmer: &[u8], base: u8) -> bool {
        let mut neighbor = Vec::with_capacity(kmer.len());
        neighbor.push(base);
        neighbor.extend_from_slice(&kmer[..kmer.len().saturating_sub(1)]);

        self.is_vertex(&neighbor)
    }

    /// Returns the bases `b` for which `kmer[1..] + b` is a vertex, in `ACGT` order.
    pub fn suffix_neighbors(&self, kmer: &[u8]) -> Vec<u8> {
        BASES
            .map(|base| base.to_ascii())
            .into_iter()
            .filter(|&base| self.is_suffix_neighbor(kmer, base))
            .collect()
    }

    /// Returns the bases `b` for which `b + kmer[..k - 1]` is a vertex, in `ACGT` order.
    pub fn prefix_neighbors(&self, kmer: &[u8]) -> Vec<u8> {
        BASES
            .map(|base| base.to_ascii())
            .into_iter()
            .filter(|&base| self.is_prefix_neighbor(kmer, base))
            .collect()
    }

    /// Reads up to `len` symbols of the text that precedes the suffix at row `idx`.
    ///
    /// The walk stops early at the end-of-text row. Returns the symbols in text order and the
    /// row reached, which can be passed to the next call to continue further to the left.
    pub fn extract_substring_and_index(&self, mut idx: usize, len: usize) -> (Vec<u8>, usize) {
        let mut substring = Vec::with_capacity(len);

        while substring.len() < len {
            let Some(symbol) = self.index.char_at(idx) else {
                break;
            };

            substring.push(symbol.to_ascii());
            idx = self.index.lf_map(idx);
        }

        substring.reverse();

        (substring, idx)
    }
}
