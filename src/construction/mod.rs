mod bwt;
mod source;

#[doc(inline)]
pub use bwt::bwt_from_texts;
#[doc(inline)]
pub use source::{InMemoryBwt, SymbolSource};

use crate::alpha_count::AlphaCount64;
use crate::alphabet::{ALPHABET_SIZE, Symbol};
use crate::codec::{self, HuffmanCodec, PackedDecodeTable};
use crate::config::SampleRates;
use crate::error::BuildError;
use crate::markers::{LargeMarker, SmallMarker};

pub(crate) struct DataStructures {
    pub(crate) symbol_totals: AlphaCount64,
    pub(crate) predecessor_counts: [usize; ALPHABET_SIZE],
    pub(crate) codec: HuffmanCodec,
    pub(crate) decode_table: PackedDecodeTable,
    pub(crate) compressed: Vec<u8>,
    pub(crate) large_markers: Vec<LargeMarker>,
    pub(crate) small_markers: Vec<SmallMarker>,
    pub(crate) num_symbols: usize,
    pub(crate) num_sequences: usize,
    pub(crate) eof_pos: usize,
}

pub(crate) fn create_data_structures(
    source: &mut impl SymbolSource,
    sample_rates: SampleRates,
) -> Result<DataStructures, BuildError> {
    let histogram = count_symbols(source)?;
    let eof_pos = histogram.end_of_text_position(source.end_of_text_position())?;
    let num_symbols = histogram.num_symbols;

    let codec = HuffmanCodec::from_frequencies(&histogram.counts).ok_or(BuildError::EmptyStream)?;
    let decode_table = PackedDecodeTable::new(&codec);

    log::info!(
        "symbol histogram {}, {} bits required",
        histogram.counts,
        codec.required_bits(&histogram.counts)
    );

    for symbol in Symbol::ALL.into_iter().filter(|&s| codec.contains(s)) {
        let code_word = codec.encode(symbol);
        log::debug!(
            "code of {symbol}: {:0width$b}",
            code_word.code,
            width = code_word.len as usize
        );
    }

    source.rewind()?;

    let mut encoder = SegmentEncoder::new(&codec, &decode_table, sample_rates, num_symbols);
    let mut segment = Vec::with_capacity(sample_rates.small);

    while let Some(symbol) = source.read_symbol()? {
        let num_read = encoder.symbols_written + segment.len() + 1;

        if num_read > num_symbols || !codec.contains(symbol) {
            return Err(BuildError::StreamChanged {
                first_pass: num_symbols,
                second_pass: num_read,
            });
        }

        segment.push(symbol.rank());

        if segment.len() == sample_rates.small {
            encoder.encode_segment(&segment)?;
            segment.clear();
        }
    }

    // the last segment is either partial or empty, in the latter case it only places the
    // markers for the end of the stream
    encoder.encode_segment(&segment)?;

    let (compressed, large_markers, small_markers, second_pass_counts) = encoder.finish();

    if second_pass_counts != histogram.counts {
        return Err(BuildError::StreamChanged {
            first_pass: num_symbols,
            second_pass: second_pass_counts.sum() as usize,
        });
    }

    log::debug!(
        "placed {} large and {} small markers",
        large_markers.len(),
        small_markers.len()
    );

    Ok(DataStructures {
        predecessor_counts: predecessor_counts(&histogram.counts),
        symbol_totals: histogram.counts,
        codec,
        decode_table,
        compressed,
        large_markers,
        small_markers,
        num_symbols,
        num_sequences: histogram.num_sentinels,
        eof_pos,
    })
}

struct Histogram {
    counts: AlphaCount64,
    num_symbols: usize,
    num_sentinels: usize,
    first_sentinel: Option<usize>,
    symbol_at_explicit_end_of_text: Option<Symbol>,
}

impl Histogram {
    fn end_of_text_position(&self, explicit: Option<usize>) -> Result<usize, BuildError> {
        if let Some(position) = explicit {
            return match self.symbol_at_explicit_end_of_text {
                Some(Symbol::Sentinel) => Ok(position),
                _ => Err(BuildError::EndOfTextMismatch { position }),
            };
        }

        match (self.num_sentinels, self.first_sentinel) {
            (1, Some(position)) => Ok(position),
            (num_sentinels, _) => Err(BuildError::AmbiguousEndOfText { num_sentinels }),
        }
    }
}

fn count_symbols(source: &mut impl SymbolSource) -> Result<Histogram, BuildError> {
    let explicit_end_of_text = source.end_of_text_position();

    let mut histogram = Histogram {
        counts: AlphaCount64::new(),
        num_symbols: 0,
        num_sentinels: 0,
        first_sentinel: None,
        symbol_at_explicit_end_of_text: None,
    };

    while let Some(symbol) = source.read_symbol()? {
        let position = histogram.num_symbols;

        if symbol == Symbol::Sentinel {
            histogram.num_sentinels += 1;
            histogram.first_sentinel.get_or_insert(position);
        }

        if explicit_end_of_text == Some(position) {
            histogram.symbol_at_explicit_end_of_text = Some(symbol);
        }

        histogram.counts.increment(symbol);
        histogram.num_symbols += 1;
    }

    if histogram.num_symbols == 0 {
        return Err(BuildError::EmptyStream);
    }

    Ok(histogram)
}

// Row 0 of the sorted rotations belongs to the end-of-text terminator, which is streamed as
// a sentinel. The rows of real sentinels therefore start at 1, and the rows of every other
// symbol start after all sentinel rows including the terminator's.
fn predecessor_counts(totals: &AlphaCount64) -> [usize; ALPHABET_SIZE] {
    let mut predecessor_counts = [0; ALPHABET_SIZE];
    let mut sum = 0;

    for (rank, (_, total)) in totals.iter().enumerate() {
        predecessor_counts[rank] = sum as usize;
        sum += total;
    }

    predecessor_counts[Symbol::Sentinel as usize] = 1;

    predecessor_counts
}

struct SegmentEncoder<'a> {
    codec: &'a HuffmanCodec,
    decode_table: &'a PackedDecodeTable,
    sample_rates: SampleRates,
    compressed: Vec<u8>,
    large_markers: Vec<LargeMarker>,
    small_markers: Vec<SmallMarker>,
    counts: AlphaCount64,
    symbols_written: usize,
}

impl<'a> SegmentEncoder<'a> {
    fn new(
        codec: &'a HuffmanCodec,
        decode_table: &'a PackedDecodeTable,
        sample_rates: SampleRates,
        num_symbols: usize,
    ) -> Self {
        let num_segments = num_symbols / sample_rates.small + 1;
        let num_large_markers = num_symbols / sample_rates.large + 2;

        Self {
            codec,
            decode_table,
            sample_rates,
            compressed: Vec::with_capacity(codec.max_code_len() as usize * num_symbols / 8),
            large_markers: Vec::with_capacity(num_large_markers),
            small_markers: Vec::with_capacity(num_segments),
            counts: AlphaCount64::new(),
            symbols_written: 0,
        }
    }

    fn place_markers(&mut self) -> Result<(), BuildError> {
        while self.symbols_written / self.sample_rates.large + 1 > self.large_markers.len() {
            self.large_markers
                .push(LargeMarker::new(self.compressed.len() as u64, self.counts));
        }

        let segment_idx = self.small_markers.len();
        let large_marker = &self.large_markers[self.sample_rates.large_marker_for(segment_idx)];

        let relative_counts = (self.counts - *large_marker.counts())
            .try_narrow()
            .map_err(|(symbol, value)| BuildError::SampleRateTooCoarse {
                segment: segment_idx,
                symbol,
                value,
            })?;

        let byte_count = self.compressed.len() - large_marker.byte_offset() as usize;
        let byte_count =
            u16::try_from(byte_count).map_err(|_| BuildError::SegmentBytesTooLarge {
                segment: segment_idx,
                value: byte_count,
            })?;

        self.small_markers
            .push(SmallMarker::new(byte_count, relative_counts));

        Ok(())
    }

    fn encode_segment(&mut self, segment: &[u8]) -> Result<(), BuildError> {
        self.place_markers()?;

        for &rank in segment {
            self.counts.increment_by_rank(rank);
        }

        let segment_start = self.compressed.len();
        codec::encode_symbols(segment, self.codec, &mut self.compressed);

        if cfg!(debug_assertions) {
            let mut decoded = Vec::with_capacity(segment.len());
            codec::decode_symbols(
                self.decode_table,
                &self.compressed[segment_start..],
                segment.len(),
                |rank| decoded.push(rank),
            );
            assert_eq!(
                decoded,
                segment,
                "segment {} decodes",
                self.small_markers.len() - 1
            );
        }

        self.symbols_written += segment.len();

        Ok(())
    }

    fn finish(mut self) -> (Vec<u8>, Vec<LargeMarker>, Vec<SmallMarker>, AlphaCount64) {
        if self.symbols_written % self.sample_rates.large != 0 {
            self.large_markers
                .push(LargeMarker::new(self.compressed.len() as u64, self.counts));
        }

        (
            self.compressed,
            self.large_markers,
            self.small_markers,
            self.counts,
        )
    }
}
