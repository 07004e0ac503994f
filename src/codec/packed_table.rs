use super::HuffmanCodec;
use crate::alphabet::Symbol;

const SYMBOL_SHIFT: u8 = 4;
const BITS_MASK: u8 = 0b0000_1111;

/// Maps every value of a `read_length` bit window to the symbol whose code is a prefix
/// of the window, together with the length of that code.
///
/// `read_length` is the maximum code length, so a window always contains one complete code.
/// Each entry is packed into a single byte, the symbol rank in the upper half and the
/// number of consumed bits in the lower half.
#[cfg_attr(feature = "savefile", derive(savefile::savefile_derive::Savefile))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackedDecodeTable {
    read_length: u8,
    entries: Vec<u8>,
}

impl PackedDecodeTable {
    pub fn new(codec: &HuffmanCodec) -> Self {
        let read_length = codec.max_code_len();
        let mut entries = vec![0; 1 << read_length];

        for symbol in Symbol::ALL {
            let code_word = codec.encode(symbol);

            if code_word.is_empty() {
                continue;
            }

            // all windows that start with this code decode to this symbol
            let num_free_bits = read_length - code_word.len;
            let first_window = (code_word.code as usize) << num_free_bits;
            let num_windows = 1usize << num_free_bits;

            entries[first_window..first_window + num_windows]
                .fill(pack(symbol.rank(), code_word.len));
        }

        Self {
            read_length,
            entries,
        }
    }

    /// Width of the bit window in bits.
    #[inline(always)]
    pub fn read_length(&self) -> u8 {
        self.read_length
    }

    /// Returns the symbol rank and code length for the window value.
    #[inline(always)]
    pub fn lookup(&self, window: usize) -> (u8, u8) {
        unpack(self.entries[window])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[inline(always)]
fn pack(rank: u8, len: u8) -> u8 {
    (rank << SYMBOL_SHIFT) | (len & BITS_MASK)
}

#[inline(always)]
fn unpack(entry: u8) -> (u8, u8) {
    (entry >> SYMBOL_SHIFT, entry & BITS_MASK)
}
