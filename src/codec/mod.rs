//! The entropy coder of the compressed BWT.
//!
//! A Huffman code over the five symbols of the alphabet is derived once from the symbol
//! histogram of the whole BWT. Symbols are written MSB-first into byte-aligned segments,
//! and decoded with a [`PackedDecodeTable`] that maps a fixed-width bit window directly
//! to a symbol and its code length.

mod packed_table;
mod stream;

#[doc(inline)]
pub use packed_table::PackedDecodeTable;

#[doc(inline)]
pub use stream::{decode_symbols, encode_symbols};

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::alpha_count::AlphaCount64;
use crate::alphabet::{ALPHABET_SIZE, Symbol};

/// Codes are written into bytes, so a code must never be longer than one byte.
pub const MAX_CODE_LEN: u8 = 8;

/// A code of `len` bits, stored in the lowest bits of `code`. Symbols that do not
/// occur in the histogram have a code word of length 0.
#[cfg_attr(feature = "savefile", derive(savefile::savefile_derive::Savefile))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CodeWord {
    pub code: u8,
    pub len: u8,
}

impl CodeWord {
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Canonical Huffman code over the BWT alphabet.
#[cfg_attr(feature = "savefile", derive(savefile::savefile_derive::Savefile))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HuffmanCodec {
    code_words: [CodeWord; ALPHABET_SIZE],
    max_code_len: u8,
}

impl HuffmanCodec {
    /// Builds the code for the given symbol frequencies.
    ///
    /// Returns `None` if all frequencies are zero. A histogram with a single distinct
    /// symbol gets a one bit code, so that every symbol advances the bit cursor.
    pub fn from_frequencies(frequencies: &AlphaCount64) -> Option<Self> {
        let code_lens = huffman_code_lens(frequencies)?;

        let mut symbols_by_len: Vec<_> = Symbol::ALL
            .into_iter()
            .filter(|&symbol| code_lens[symbol as usize] > 0)
            .collect();
        symbols_by_len.sort_by_key(|&symbol| (code_lens[symbol as usize], symbol));

        let mut code_words = [CodeWord::default(); ALPHABET_SIZE];
        let mut code = 0u8;
        let mut previous_len = code_lens[symbols_by_len[0] as usize];

        for symbol in symbols_by_len {
            let len = code_lens[symbol as usize];
            code <<= len - previous_len;
            code_words[symbol as usize] = CodeWord { code, len };

            code = code.wrapping_add(1);
            previous_len = len;
        }

        let max_code_len = previous_len;
        assert!(max_code_len <= MAX_CODE_LEN);

        Some(Self {
            code_words,
            max_code_len,
        })
    }

    #[inline(always)]
    pub fn encode(&self, symbol: Symbol) -> CodeWord {
        self.code_words[symbol as usize]
    }

    #[inline(always)]
    pub(crate) fn encode_rank(&self, rank: u8) -> CodeWord {
        self.code_words[rank as usize]
    }

    pub fn contains(&self, symbol: Symbol) -> bool {
        !self.encode(symbol).is_empty()
    }

    pub fn max_code_len(&self) -> u8 {
        self.max_code_len
    }

    /// Number of bits needed to encode a stream with the given frequencies.
    pub fn required_bits(&self, frequencies: &AlphaCount64) -> u64 {
        frequencies
            .iter()
            .map(|(symbol, frequency)| frequency * self.encode(symbol).len as u64)
            .sum()
    }
}

// returns the code length of every symbol, 0 for symbols that do not occur
fn huffman_code_lens(frequencies: &AlphaCount64) -> Option<[u8; ALPHABET_SIZE]> {
    // the node id breaks ties between equal weights, so the tree does not depend on heap internals
    let mut heap: BinaryHeap<Reverse<(u64, usize, Vec<Symbol>)>> = frequencies
        .iter()
        .filter(|&(_, frequency)| frequency > 0)
        .enumerate()
        .map(|(node_id, (symbol, frequency))| Reverse((frequency, node_id, vec![symbol])))
        .collect();

    let mut code_lens = [0u8; ALPHABET_SIZE];

    match heap.len() {
        0 => return None,
        1 => {
            let Reverse((_, _, symbols)) = heap.pop()?;
            code_lens[symbols[0] as usize] = 1;
            return Some(code_lens);
        }
        _ => {}
    }

    let mut next_node_id = heap.len();

    while heap.len() > 1 {
        let Reverse((first_weight, _, mut symbols)) = heap.pop()?;
        let Reverse((second_weight, _, second_symbols)) = heap.pop()?;

        symbols.extend(second_symbols);

        // every symbol below the merged node moves one level deeper
        for &symbol in &symbols {
            code_lens[symbol as usize] += 1;
        }

        heap.push(Reverse((first_weight + second_weight, next_node_id, symbols)));
        next_node_id += 1;
    }

    Some(code_lens)
}
