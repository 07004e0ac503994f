/// Number of symbols of the BWT alphabet `{$, A, C, G, T}`.
pub const ALPHABET_SIZE: usize = 5;

/// The four nucleotides, in the order in which neighbor queries report them.
pub const BASES: [Symbol; 4] = [Symbol::A, Symbol::C, Symbol::G, Symbol::T];

const INVALID_RANK: u8 = 255;

const ASCII_TO_RANK_TRANSLATION_TABLE: [u8; 256] = {
    let mut table = [INVALID_RANK; 256];

    table[b'$' as usize] = 0;

    table[b'A' as usize] = 1;
    table[b'a' as usize] = 1;

    table[b'C' as usize] = 2;
    table[b'c' as usize] = 2;

    table[b'G' as usize] = 3;
    table[b'g' as usize] = 3;

    table[b'T' as usize] = 4;
    table[b't' as usize] = 4;

    table
};

const RANK_TO_ASCII: [u8; ALPHABET_SIZE] = *b"$ACGT";

const ASCII_COMPLEMENT_TABLE: [u8; 256] = {
    let mut table = [0; 256];

    let mut i = 0;
    while i < 256 {
        table[i] = i as u8;
        i += 1;
    }

    table[b'A' as usize] = b'T';
    table[b'a' as usize] = b't';

    table[b'C' as usize] = b'G';
    table[b'c' as usize] = b'g';

    table[b'G' as usize] = b'C';
    table[b'g' as usize] = b'c';

    table[b'T' as usize] = b'A';
    table[b't' as usize] = b'a';

    table
};

/// A symbol of the BWT alphabet. The discriminant is the symbol's rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Symbol {
    /// The end-of-string sentinel `$`.
    Sentinel = 0,
    A = 1,
    C = 2,
    G = 3,
    T = 4,
}

impl Symbol {
    /// All symbols in alphabet order.
    pub const ALL: [Symbol; ALPHABET_SIZE] =
        [Symbol::Sentinel, Symbol::A, Symbol::C, Symbol::G, Symbol::T];

    /// Panics if `rank` is not smaller than [`ALPHABET_SIZE`].
    #[inline(always)]
    pub fn from_rank(rank: u8) -> Self {
        Self::ALL[rank as usize]
    }

    /// Translates an ASCII character, accepting lower case nucleotides.
    #[inline(always)]
    pub fn from_ascii(c: u8) -> Option<Self> {
        match ASCII_TO_RANK_TRANSLATION_TABLE[c as usize] {
            INVALID_RANK => None,
            rank => Some(Self::from_rank(rank)),
        }
    }

    #[inline(always)]
    pub fn rank(self) -> u8 {
        self as u8
    }

    /// Upper case ASCII representation.
    #[inline(always)]
    pub fn to_ascii(self) -> u8 {
        RANK_TO_ASCII[self as usize]
    }

    /// Watson-Crick complement. The sentinel is its own complement.
    pub fn complement(self) -> Self {
        match self {
            Symbol::Sentinel => Symbol::Sentinel,
            Symbol::A => Symbol::T,
            Symbol::C => Symbol::G,
            Symbol::G => Symbol::C,
            Symbol::T => Symbol::A,
        }
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_ascii() as char)
    }
}

/// Returns the reverse complement of an ASCII DNA string.
///
/// Characters other than `ACGTacgt` are kept as they are, so that a string containing
/// them keeps failing every lookup after the transformation.
pub fn reverse_complement(sequence: &[u8]) -> Vec<u8> {
    sequence
        .iter()
        .rev()
        .map(|&c| ASCII_COMPLEMENT_TABLE[c as usize])
        .collect()
}

// translates a query into ranks, in reverse order, as consumed by the backward search
pub(crate) fn query_to_reversed_ranks(query: &[u8]) -> Option<Vec<u8>> {
    query
        .iter()
        .rev()
        .map(|&c| match ASCII_TO_RANK_TRANSLATION_TABLE[c as usize] {
            INVALID_RANK => None,
            rank => Some(rank),
        })
        .collect()
}
