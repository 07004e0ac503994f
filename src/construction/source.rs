use crate::alphabet::Symbol;
use crate::error::BuildError;

/// A stream of BWT symbols that the index is built from.
///
/// The builder reads the stream twice, calling [`rewind`](SymbolSource::rewind) in between,
/// and expects the same symbols both times. The end-of-text row of the BWT is streamed as `$`.
pub trait SymbolSource {
    /// Returns the next symbol, or `None` at the end of the stream.
    fn read_symbol(&mut self) -> Result<Option<Symbol>, BuildError>;

    /// Restarts the stream at the first symbol.
    fn rewind(&mut self) -> Result<(), BuildError>;

    /// Position of the end-of-text row, if the source knows it.
    ///
    /// Without it, the stream must contain exactly one `$`.
    fn end_of_text_position(&self) -> Option<usize> {
        None
    }
}

/// A BWT held in memory as symbol ranks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InMemoryBwt {
    ranks: Vec<u8>,
    end_of_text: Option<usize>,
    cursor: usize,
}

impl InMemoryBwt {
    /// Reads an ASCII BWT over `$ACGT` (lower case nucleotides are accepted).
    pub fn from_ascii(bwt: &[u8]) -> Result<Self, BuildError> {
        let ranks = bwt
            .iter()
            .enumerate()
            .map(|(position, &byte)| {
                Symbol::from_ascii(byte)
                    .map(Symbol::rank)
                    .ok_or(BuildError::InvalidBwtSymbol { position, byte })
            })
            .collect::<Result<_, _>>()?;

        Ok(Self::from_ranks(ranks, None))
    }

    pub(crate) fn from_ranks(ranks: Vec<u8>, end_of_text: Option<usize>) -> Self {
        Self {
            ranks,
            end_of_text,
            cursor: 0,
        }
    }

    /// Sets the end-of-text row, needed when the BWT contains more than one `$`.
    pub fn with_end_of_text_position(mut self, position: usize) -> Self {
        self.end_of_text = Some(position);
        self
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    pub fn to_ascii(&self) -> Vec<u8> {
        self.ranks
            .iter()
            .map(|&rank| Symbol::from_rank(rank).to_ascii())
            .collect()
    }
}

impl SymbolSource for InMemoryBwt {
    fn read_symbol(&mut self) -> Result<Option<Symbol>, BuildError> {
        let symbol = self.ranks.get(self.cursor).map(|&rank| Symbol::from_rank(rank));

        if symbol.is_some() {
            self.cursor += 1;
        }

        Ok(symbol)
    }

    fn rewind(&mut self) -> Result<(), BuildError> {
        self.cursor = 0;
        Ok(())
    }

    fn end_of_text_position(&self) -> Option<usize> {
        self.end_of_text
    }
}
