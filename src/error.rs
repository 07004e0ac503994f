use thiserror::Error;

use crate::alphabet::Symbol;

/// Fatal errors of index construction. None of them can be fixed by retrying.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("{name} sample rate must be a power of two, got {value}")]
    InvalidSampleRate { name: &'static str, value: usize },

    #[error("small sample rate {small} exceeds the large sample rate {large}")]
    SampleRatesOutOfOrder { small: usize, large: usize },

    #[error(
        "sample rate too coarse: segment {segment} needs {value} for symbol {symbol}, \
         but small markers hold at most {}",
        u16::MAX
    )]
    SampleRateTooCoarse {
        segment: usize,
        symbol: Symbol,
        value: u64,
    },

    #[error("sample rate too coarse: segment {segment} starts {value} compressed bytes after its large marker")]
    SegmentBytesTooLarge { segment: usize, value: usize },

    #[error("the symbol stream is empty")]
    EmptyStream,

    #[error("text {text_id} contains the invalid symbol {byte:#04x} at position {position}")]
    InvalidSymbol {
        text_id: usize,
        position: usize,
        byte: u8,
    },

    #[error("BWT contains the invalid symbol {byte:#04x} at position {position}")]
    InvalidBwtSymbol { position: usize, byte: u8 },

    #[error("cannot determine the end-of-text position from a stream with {num_sentinels} sentinels")]
    AmbiguousEndOfText { num_sentinels: usize },

    #[error("the end-of-text position {position} does not hold a sentinel")]
    EndOfTextMismatch { position: usize },

    #[error("the symbol stream changed between passes ({first_pass} symbols, then {second_pass})")]
    StreamChanged { first_pass: usize, second_pass: usize },

    #[error("text collection of {len} symbols is too large for suffix array construction")]
    TextTooLarge { len: usize },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// First disagreement between an index and the stream it was built from.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("symbol mismatch at position {position}: expected {expected:?}, found {found:?}")]
    SymbolMismatch {
        position: usize,
        expected: Option<Symbol>,
        found: Option<Symbol>,
    },

    #[error("occurrence mismatch for {symbol} at position {position}: expected {expected}, found {found}")]
    OccurrenceMismatch {
        position: usize,
        symbol: Symbol,
        expected: u64,
        found: u64,
    },

    #[error("length mismatch: index holds {index_len} symbols, stream holds {stream_len}")]
    LengthMismatch { index_len: usize, stream_len: usize },

    #[error(transparent)]
    Source(#[from] BuildError),
}
