//! A Huffman-compressed FM-Index over DNA with an implicit de Bruijn graph query layer.
//!
//! The BWT over the alphabet `{$, A, C, G, T}` is split into segments of `small_sample_rate`
//! symbols, each segment is entropy coded on its own, and two levels of markers store the
//! symbol counts before every segment. A rank query decodes at most one segment.
//!
//! ```
//! use dbgfm::{DeBruijnGraph, FmIndexConfig};
//!
//! let index = FmIndexConfig::new()
//!     .construct_from_texts([b"ACGT", b"ACGA"])
//!     .unwrap();
//!
//! assert_eq!(index.count(b"ACG"), 2);
//!
//! let graph = DeBruijnGraph::new(&index);
//! assert_eq!(graph.suffix_neighbors(b"ACG"), b"AT");
//! ```

pub mod alpha_count;
/// The fixed DNA alphabet with its sentinel.
pub mod alphabet;
pub mod codec;
pub mod config;
pub mod construction;
pub mod cursor;
pub mod de_bruijn;
pub mod error;
pub mod info;
pub mod markers;

use rayon::prelude::*;

#[doc(inline)]
pub use alpha_count::{AlphaCount16, AlphaCount64};
#[doc(inline)]
pub use alphabet::Symbol;
#[doc(inline)]
pub use config::FmIndexConfig;
#[doc(inline)]
pub use construction::{InMemoryBwt, SymbolSource};
#[doc(inline)]
pub use cursor::Cursor;
#[doc(inline)]
pub use de_bruijn::DeBruijnGraph;
#[doc(inline)]
pub use error::{BuildError, VerifyError};
#[doc(inline)]
pub use info::IndexInfo;

use alphabet::ALPHABET_SIZE;
use codec::{HuffmanCodec, PackedDecodeTable};
use config::SampleRates;
use construction::DataStructures;
use markers::{InterpolatedMarker, LargeMarker, SmallMarker};

/// The compressed FM-Index.
///
/// The indexed BWT has `len()` symbols. Row `eof_pos()` is the end-of-text row; it is stored
/// as `$` but is not part of any sequence, so rank queries never count it.
#[cfg_attr(feature = "savefile", derive(savefile::savefile_derive::Savefile))]
#[derive(Debug, Clone)]
pub struct FmIndex {
    predecessor_counts: [usize; ALPHABET_SIZE],
    symbol_totals: AlphaCount64,
    codec: HuffmanCodec,
    decode_table: PackedDecodeTable,
    compressed: Vec<u8>,
    large_markers: Vec<LargeMarker>,
    small_markers: Vec<SmallMarker>,
    sample_rates: SampleRates,
    num_symbols: usize,
    num_sequences: usize,
    eof_pos: usize,
}

impl FmIndex {
    fn new(source: &mut impl SymbolSource, sample_rates: SampleRates) -> Result<Self, BuildError> {
        log::info!(
            "building FM-Index with sample rates {}/{}",
            sample_rates.small,
            sample_rates.large
        );

        let DataStructures {
            symbol_totals,
            predecessor_counts,
            codec,
            decode_table,
            compressed,
            large_markers,
            small_markers,
            num_symbols,
            num_sequences,
            eof_pos,
        } = construction::create_data_structures(source, sample_rates)?;

        let index = FmIndex {
            predecessor_counts,
            symbol_totals,
            codec,
            decode_table,
            compressed,
            large_markers,
            small_markers,
            sample_rates,
            num_symbols,
            num_sequences,
            eof_pos,
        };

        log::info!("built FM-Index\n{}", index.info());

        Ok(index)
    }

    /// Returns the number of occurrences of `query` in the indexed texts.
    ///
    /// Queries containing characters outside of `$ACGTacgt` never occur. The empty query
    /// occurs at every row.
    pub fn count(&self, query: &[u8]) -> usize {
        self.cursor_for_query(query).count()
    }

    /// Counts many queries in parallel, using the currently installed rayon thread pool.
    pub fn count_many<Q: AsRef<[u8]> + Sync>(&self, queries: &[Q]) -> Vec<usize> {
        queries
            .par_iter()
            .map(|query| self.count(query.as_ref()))
            .collect()
    }

    /// Returns the half open interval of BWT rows whose suffixes start with `query`.
    pub fn backward_search_interval(&self, query: &[u8]) -> HalfOpenInterval {
        self.cursor_for_query(query).interval()
    }

    pub fn cursor_empty<'a>(&'a self) -> Cursor<'a> {
        Cursor {
            index: self,
            interval: HalfOpenInterval {
                start: 0,
                end: self.num_symbols,
            },
            query_len: 0,
        }
    }

    pub fn cursor_for_query<'a>(&'a self, query: &[u8]) -> Cursor<'a> {
        let mut cursor = self.cursor_empty();

        let Some(reversed_ranks) = alphabet::query_to_reversed_ranks(query) else {
            cursor.interval = HalfOpenInterval { start: 0, end: 0 };
            return cursor;
        };

        for rank in reversed_ranks {
            cursor.extend_front(Symbol::from_rank(rank));

            if cursor.is_empty() {
                break;
            }
        }

        cursor
    }

    /// Number of rows whose suffix starts with a symbol smaller than `symbol`.
    ///
    /// Row 0 belongs to the end-of-text terminator, so the value for `$` is 1.
    pub fn predecessor_count(&self, symbol: Symbol) -> usize {
        self.predecessor_counts[symbol as usize]
    }

    /// Returns the BWT symbol at `idx`, or `None` at the end-of-text row.
    pub fn char_at(&self, idx: usize) -> Option<Symbol> {
        assert!(idx < self.num_symbols, "BWT index {idx} out of bounds");

        if idx == self.eof_pos {
            None
        } else {
            Some(Symbol::from_rank(self.raw_rank_at(idx)))
        }
    }

    /// Number of occurrences of `symbol` in the BWT range `[0, idx]`.
    pub fn occurrence(&self, symbol: Symbol, idx: usize) -> usize {
        assert!(idx < self.num_symbols, "BWT index {idx} out of bounds");
        self.rank(symbol, idx + 1)
    }

    /// Number of occurrences of every symbol in the BWT range `[0, idx]`.
    pub fn full_occurrence(&self, idx: usize) -> AlphaCount64 {
        assert!(idx < self.num_symbols, "BWT index {idx} out of bounds");
        self.full_rank(idx + 1)
    }

    /// Number of occurrences of every symbol in the BWT range `(start, end]`.
    pub fn occurrence_range(&self, start: usize, end: usize) -> AlphaCount64 {
        assert!(start <= end, "invalid range ({start}, {end}]");
        self.full_occurrence(end) - self.full_occurrence(start)
    }

    /// Number of occurrences of `symbol` in the BWT range `[0, idx)`.
    pub fn rank(&self, symbol: Symbol, idx: usize) -> usize {
        assert!(idx <= self.num_symbols, "BWT index {idx} out of bounds");

        let count = self.uncorrected_rank(symbol.rank(), idx);

        if symbol == Symbol::Sentinel && idx > self.eof_pos {
            count - 1
        } else {
            count
        }
    }

    /// Number of occurrences of every symbol in the BWT range `[0, idx)`.
    pub fn full_rank(&self, idx: usize) -> AlphaCount64 {
        assert!(idx <= self.num_symbols, "BWT index {idx} out of bounds");

        let mut counts = self.uncorrected_full_rank(idx);

        if idx > self.eof_pos {
            let sentinels = counts.get(Symbol::Sentinel);
            counts.set(Symbol::Sentinel, sentinels - 1);
        }

        counts
    }

    /// Maps the row `idx` to the row of the suffix that is one symbol longer.
    ///
    /// Panics at the end-of-text row, which has no predecessor in the text.
    pub fn lf_map(&self, idx: usize) -> usize {
        assert!(idx < self.num_symbols, "BWT index {idx} out of bounds");
        assert_ne!(idx, self.eof_pos, "LF mapping of the end-of-text row");

        self.lf_mapping_step(Symbol::from_rank(self.raw_rank_at(idx)), idx)
    }

    /// Returns the first symbol of the suffix at row `idx`, or `None` for the terminator's row 0.
    pub fn first_char_of_suffix(&self, idx: usize) -> Option<Symbol> {
        assert!(idx < self.num_symbols, "BWT index {idx} out of bounds");

        if idx == 0 {
            return None;
        }

        // the last symbol whose block starts at or before idx, empty blocks are skipped this way
        Symbol::ALL
            .into_iter()
            .rev()
            .find(|&symbol| self.predecessor_count(symbol) <= idx)
    }

    /// Decodes the whole BWT to ASCII. The end-of-text row is written as `$`.
    pub fn decode_bwt(&self) -> Vec<u8> {
        let mut bwt = Vec::with_capacity(self.num_symbols);

        for segment_start in (0..self.num_symbols).step_by(self.sample_rates.small) {
            let marker = self.interpolated_marker(segment_start);
            let segment_len = self.sample_rates.small.min(self.num_symbols - segment_start);

            codec::decode_symbols(
                &self.decode_table,
                &self.compressed[marker.byte_offset..],
                segment_len,
                |rank| bwt.push(Symbol::from_rank(rank).to_ascii()),
            );
        }

        bwt
    }

    /// Checks every position of the index against the symbols of `source`.
    ///
    /// This decodes a segment per position and symbol and is meant for testing.
    pub fn verify(&self, source: &mut impl SymbolSource) -> Result<(), VerifyError> {
        source.rewind()?;

        let mut expected_counts = AlphaCount64::new();
        let mut position = 0;

        while let Some(symbol) = source.read_symbol()? {
            if position >= self.num_symbols {
                return Err(VerifyError::LengthMismatch {
                    index_len: self.num_symbols,
                    stream_len: position + 1,
                });
            }

            let expected = (position != self.eof_pos).then_some(symbol);
            let found = self.char_at(position);

            if expected != found {
                return Err(VerifyError::SymbolMismatch {
                    position,
                    expected,
                    found,
                });
            }

            if expected.is_some() {
                expected_counts.increment(symbol);
            }

            let full_occurrence = self.full_occurrence(position);

            for (symbol, expected) in expected_counts.iter() {
                let found = self.occurrence(symbol, position) as u64;

                for found in [found, full_occurrence.get(symbol)] {
                    if found != expected {
                        return Err(VerifyError::OccurrenceMismatch {
                            position,
                            symbol,
                            expected,
                            found,
                        });
                    }
                }
            }

            position += 1;
        }

        if position != self.num_symbols {
            return Err(VerifyError::LengthMismatch {
                index_len: self.num_symbols,
                stream_len: position,
            });
        }

        log::info!("verified {position} symbols");

        Ok(())
    }

    pub fn info(&self) -> IndexInfo {
        IndexInfo::new(self)
    }

    /// Number of symbols of the BWT, including the end-of-text row.
    pub fn len(&self) -> usize {
        self.num_symbols
    }

    /// Always `false`, an index contains at least the end-of-text row.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn num_sequences(&self) -> usize {
        self.num_sequences
    }

    pub fn num_compressed_bytes(&self) -> usize {
        self.compressed.len()
    }

    pub fn small_sample_rate(&self) -> usize {
        self.sample_rates.small
    }

    pub fn large_sample_rate(&self) -> usize {
        self.sample_rates.large
    }

    pub fn eof_pos(&self) -> usize {
        self.eof_pos
    }

    pub fn large_markers(&self) -> &[LargeMarker] {
        &self.large_markers
    }

    pub fn small_markers(&self) -> &[SmallMarker] {
        &self.small_markers
    }

    /// Number of occurrences of every symbol in the whole BWT, including the end-of-text row.
    pub fn symbol_totals(&self) -> &AlphaCount64 {
        &self.symbol_totals
    }

    pub fn codec(&self) -> &HuffmanCodec {
        &self.codec
    }

    pub(crate) fn lf_mapping_step(&self, symbol: Symbol, idx: usize) -> usize {
        self.predecessor_count(symbol) + self.rank(symbol, idx)
    }

    #[inline(always)]
    fn interpolated_marker(&self, idx: usize) -> InterpolatedMarker {
        let small_marker_idx = idx >> self.sample_rates.small_shift;
        let large_marker_idx = self.sample_rates.large_marker_for(small_marker_idx);

        InterpolatedMarker::new(
            &self.large_markers[large_marker_idx],
            &self.small_markers[small_marker_idx],
            small_marker_idx << self.sample_rates.small_shift,
        )
    }

    #[inline(always)]
    fn segment_bytes(&self, marker: &InterpolatedMarker) -> &[u8] {
        &self.compressed[marker.byte_offset..]
    }

    // the stored symbol, which is $ at the end-of-text row
    fn raw_rank_at(&self, idx: usize) -> u8 {
        let marker = self.interpolated_marker(idx);
        let mut last = 0;

        codec::decode_symbols(
            &self.decode_table,
            self.segment_bytes(&marker),
            idx - marker.position + 1,
            |rank| last = rank,
        );

        last
    }

    // counts in [0, idx) including the end-of-text row
    fn uncorrected_rank(&self, symbol_rank: u8, idx: usize) -> usize {
        let marker = self.interpolated_marker(idx);
        let mut count = marker.counts.get_by_rank(symbol_rank) as usize;

        codec::decode_symbols(
            &self.decode_table,
            self.segment_bytes(&marker),
            idx - marker.position,
            |rank| count += (rank == symbol_rank) as usize,
        );

        count
    }

    fn uncorrected_full_rank(&self, idx: usize) -> AlphaCount64 {
        let marker = self.interpolated_marker(idx);
        let mut counts = marker.counts;

        codec::decode_symbols(
            &self.decode_table,
            self.segment_bytes(&marker),
            idx - marker.position,
            |rank| counts.increment_by_rank(rank),
        );

        counts
    }
}

#[cfg(feature = "savefile")]
impl FmIndex {
    const VERSION_FOR_SAVEFILE: u32 = 0;

    pub fn load_from_reader(
        reader: &mut impl std::io::Read,
    ) -> Result<Self, savefile::SavefileError> {
        savefile::load(reader, Self::VERSION_FOR_SAVEFILE)
    }

    pub fn load_from_file(
        filepath: impl AsRef<std::path::Path>,
    ) -> Result<Self, savefile::SavefileError> {
        savefile::load_file(filepath, Self::VERSION_FOR_SAVEFILE)
    }

    pub fn save_to_writer(
        &self,
        writer: &mut impl std::io::Write,
    ) -> Result<(), savefile::SavefileError> {
        savefile::save(writer, Self::VERSION_FOR_SAVEFILE, self)
    }

    pub fn save_to_file(
        &self,
        filepath: impl AsRef<std::path::Path>,
    ) -> Result<(), savefile::SavefileError> {
        savefile::save_file(filepath, Self::VERSION_FOR_SAVEFILE, self)
    }
}

/// A half open interval `[start, end)` of BWT rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HalfOpenInterval {
    pub start: usize,
    pub end: usize,
}

impl HalfOpenInterval {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}
