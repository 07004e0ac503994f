use super::{HuffmanCodec, PackedDecodeTable};

const BITS_PER_BYTE: u32 = 8;
const WINDOW_BITS: u32 = u64::BITS;

/// Appends the codes of `symbols` (given as ranks) to `output`, starting on a fresh byte.
///
/// Bits are written MSB-first and the last byte is padded with zeroes.
/// Returns the number of bytes written.
pub fn encode_symbols(symbols: &[u8], codec: &HuffmanCodec, output: &mut Vec<u8>) -> usize {
    let start = output.len();
    let max_num_bytes =
        (codec.max_code_len() as usize * symbols.len()).div_ceil(BITS_PER_BYTE as usize);
    output.reserve(max_num_bytes);

    // at most 7 pending bits plus one code of at most 8 bits are ever buffered
    let mut pending: u64 = 0;
    let mut num_pending_bits = 0;

    for &rank in symbols {
        let code_word = codec.encode_rank(rank);
        assert!(!code_word.is_empty(), "symbol rank {rank} has no code");

        pending = (pending << code_word.len) | code_word.code as u64;
        num_pending_bits += code_word.len as u32;

        while num_pending_bits >= BITS_PER_BYTE {
            num_pending_bits -= BITS_PER_BYTE;
            output.push((pending >> num_pending_bits) as u8);
        }
    }

    if num_pending_bits > 0 {
        output.push((pending << (BITS_PER_BYTE - num_pending_bits)) as u8);
    }

    output.len() - start
}

/// Decodes exactly `num_symbols` symbols from the start of `input` and passes their ranks
/// to `consumer`.
///
/// The bits are buffered in a 64-bit window that is topped up byte-wise. Bytes beyond the
/// end of `input` are read as zeroes, so decoding never indexes out of bounds; the caller
/// is responsible for not asking for more symbols than were encoded.
#[inline(always)]
pub fn decode_symbols(
    table: &PackedDecodeTable,
    input: &[u8],
    num_symbols: usize,
    mut consumer: impl FnMut(u8),
) {
    if num_symbols == 0 {
        return;
    }

    let read_length = table.read_length() as u32;
    let mask = (1u64 << read_length) - 1;

    let mut window: u64 = 0;
    let mut num_buffered_bits = 0;
    let mut bytes = input.iter().copied();

    for _ in 0..num_symbols {
        while num_buffered_bits <= WINDOW_BITS - BITS_PER_BYTE {
            window = (window << BITS_PER_BYTE) | bytes.next().unwrap_or(0) as u64;
            num_buffered_bits += BITS_PER_BYTE;
        }

        let code = (window >> (num_buffered_bits - read_length)) & mask;
        let (rank, len) = table.lookup(code as usize);
        num_buffered_bits -= len as u32;

        consumer(rank);
    }
}
