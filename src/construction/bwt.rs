use rayon::prelude::*;

use super::source::InMemoryBwt;
use crate::alphabet::Symbol;
use crate::error::BuildError;

// dense representation for the suffix array construction, the terminator is 0 and never
// part of the text, it only appears in the BWT
const TERMINATOR: u8 = 0;
const DENSE_SENTINEL: u8 = Symbol::Sentinel as u8 + 1;

/// Computes the BWT of `t_1 $ t_2 $ ... $ t_k` followed by a unique terminator that is
/// smaller than every symbol.
///
/// The BWT has one more symbol than the concatenated text. The terminator's row is streamed
/// as `$` and recorded as the end-of-text position of the returned source.
pub fn bwt_from_texts<T: AsRef<[u8]>>(
    texts: impl IntoIterator<Item = T>,
) -> Result<InMemoryBwt, BuildError> {
    let text = create_concatenated_densely_encoded_text(texts)?;

    if text.is_empty() {
        // a single empty text, the BWT only holds the terminator
        return Ok(InMemoryBwt::from_ranks(vec![Symbol::Sentinel.rank()], Some(0)));
    }

    if text.len() > i32::MAX as usize {
        return Err(BuildError::TextTooLarge { len: text.len() });
    }

    log::debug!("computing suffix array of {} symbols", text.len());

    let suffix_array = libsais::SuffixArrayConstruction::for_text(&text)
        .in_owned_buffer32()
        .single_threaded()
        .run()
        .expect("libsais suffix array construction")
        .into_vec();

    let dense_bwt = bwt_from_suffix_array(&suffix_array, &text);

    let end_of_text = memchr::memchr(TERMINATOR, &dense_bwt)
        .expect("the terminator occurs exactly once in the BWT");

    let ranks = dense_bwt
        .into_par_iter()
        .map(|dense| dense.saturating_sub(1))
        .collect();

    Ok(InMemoryBwt::from_ranks(ranks, Some(end_of_text)))
}

fn create_concatenated_densely_encoded_text<T: AsRef<[u8]>>(
    texts: impl IntoIterator<Item = T>,
) -> Result<Vec<u8>, BuildError> {
    let mut text = Vec::new();
    let mut num_texts = 0;

    for (text_id, t) in texts.into_iter().enumerate() {
        if text_id > 0 {
            text.push(DENSE_SENTINEL);
        }

        for (position, &byte) in t.as_ref().iter().enumerate() {
            match Symbol::from_ascii(byte) {
                Some(symbol) if symbol != Symbol::Sentinel => text.push(symbol.rank() + 1),
                _ => {
                    return Err(BuildError::InvalidSymbol {
                        text_id,
                        position,
                        byte,
                    });
                }
            }
        }

        num_texts += 1;
    }

    if num_texts == 0 {
        return Err(BuildError::EmptyStream);
    }

    Ok(text)
}

// row 0 is the terminator's suffix, the suffix array rows are shifted down by one
fn bwt_from_suffix_array(suffix_array: &[i32], text: &[u8]) -> Vec<u8> {
    let mut bwt = vec![0; text.len() + 1];
    bwt[0] = text[text.len() - 1];

    bwt[1..]
        .par_iter_mut()
        .zip(suffix_array.par_iter())
        .for_each(|(bwt_symbol, &text_idx)| {
            *bwt_symbol = match text_idx as usize {
                0 => TERMINATOR,
                text_idx => text[text_idx - 1],
            };
        });

    bwt
}
