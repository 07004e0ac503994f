use dbgfm::{
    AlphaCount64, BuildError, FmIndex, FmIndexConfig, InMemoryBwt, Symbol, VerifyError,
    construction::bwt_from_texts,
};
use proptest::prelude::*;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn create_index() -> FmIndex {
    FmIndexConfig::new()
        .small_sample_rate(2)
        .large_sample_rate(4)
        .construct_from_texts([b"ACGT", b"ACGA"])
        .unwrap()
}

#[test]
fn two_sequences() {
    let index = create_index();

    assert_eq!(index.decode_bwt(), b"ATG$$AACCG");
    assert_eq!(index.len(), 10);
    assert_eq!(index.eof_pos(), 4);
    assert_eq!(index.num_sequences(), 2);
    assert!(!index.is_empty());

    assert_eq!(index.count(b"ACG"), 2);
    assert_eq!(index.count(b"CGT"), 1);
    assert_eq!(index.count(b"CGA"), 1);
    assert_eq!(index.count(b"acg"), 2);
    assert_eq!(index.count(b"GGG"), 0);
    assert_eq!(index.count(b"T$A"), 1);
    assert_eq!(index.count(b"$"), index.num_sequences());
    assert_eq!(index.count(b"A$"), 1);
    assert_eq!(index.count(b"T$"), 1);
    assert_eq!(index.count(b"A$A"), 0);
    assert_eq!(index.count(b"$$"), 0);
    assert_eq!(index.count(b"ACNG"), 0);

    assert_eq!(index.first_char_of_suffix(0), None);
    assert_eq!(index.first_char_of_suffix(1), Some(Symbol::Sentinel));
    assert_eq!(index.first_char_of_suffix(3), Some(Symbol::A));
    assert_eq!(index.first_char_of_suffix(9), Some(Symbol::T));
}

#[test]
fn lf_cycle() {
    let index = create_index();

    let mut rows = vec![0];
    let mut idx = 0;
    while idx != index.eof_pos() {
        idx = index.lf_map(idx);
        rows.push(idx);
    }

    assert_eq!(rows, [0, 2, 7, 5, 3, 1, 9, 8, 6, 4]);
    assert_eq!(rows.len() - 1, index.len() - 1);
}

#[test]
fn sentinel_correction() {
    let index = create_index();

    assert_eq!(index.occurrence(Symbol::Sentinel, 2), 0);
    assert_eq!(index.occurrence(Symbol::Sentinel, 3), 1);
    assert_eq!(index.occurrence(Symbol::Sentinel, 4), 1);
    assert_eq!(index.occurrence(Symbol::Sentinel, 9), 1);
    assert_eq!(index.full_occurrence(9).get(Symbol::Sentinel), 1);

    // the stored symbols still contain the end-of-text row
    assert_eq!(index.symbol_totals().get(Symbol::Sentinel), 2);
    assert_eq!(
        index.occurrence_range(3, 9).get(Symbol::Sentinel),
        0,
        "the end-of-text row is not a sentinel"
    );
}

#[test]
fn occurrence_range() {
    let index = create_index();

    let range = index.occurrence_range(0, 5);
    assert_eq!(range.get(Symbol::A), 1);
    assert_eq!(range.get(Symbol::T), 1);
    assert_eq!(range.get(Symbol::G), 1);
    assert_eq!(range.get(Symbol::Sentinel), 1);
    assert_eq!(range.sum(), 4);
}

#[test]
fn from_ascii_bwt() {
    let mut source = InMemoryBwt::from_ascii(b"ATG$$AACCG")
        .unwrap()
        .with_end_of_text_position(4);

    let index = FmIndexConfig::new()
        .small_sample_rate(4)
        .large_sample_rate(8)
        .construct_from_source(&mut source)
        .unwrap();

    assert_eq!(index.count(b"ACG"), 2);
    index.verify(&mut source).unwrap();

    let mut other = InMemoryBwt::from_ascii(b"ATG$$AACCGA").unwrap();
    assert!(matches!(
        index.verify(&mut other),
        Err(VerifyError::LengthMismatch {
            index_len: 10,
            stream_len: 11
        })
    ));

    let mut other = InMemoryBwt::from_ascii(b"ATG$$AACGC").unwrap();
    assert!(matches!(
        index.verify(&mut other),
        Err(VerifyError::SymbolMismatch { position: 8, .. })
    ));
}

#[test]
fn default_sample_rates() {
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    let texts: Vec<Vec<u8>> = (0..3)
        .map(|_| random_text(&mut rng, 40_000))
        .collect();

    let index = FmIndexConfig::new().construct_from_texts(&texts).unwrap();

    let n = texts.iter().map(Vec::len).sum::<usize>() + texts.len();
    assert_eq!(index.len(), n);
    assert_eq!(index.small_markers().len(), n / 128 + 1);
    assert_eq!(
        index.large_markers().len(),
        n / 16384 + if n % 16384 == 0 { 1 } else { 2 }
    );

    let concatenated = texts.join(&b'$');
    for query in [&texts[1][100..120], &texts[2][39_990..], b"ACGTACGTAC".as_slice()] {
        assert_eq!(index.count(query), naive_count(&concatenated, query));
    }
}

#[test]
fn errors() {
    assert!(matches!(
        FmIndexConfig::new().construct_from_texts([b"ACGU"]),
        Err(BuildError::InvalidSymbol {
            text_id: 0,
            position: 3,
            byte: b'U'
        })
    ));

    let mut source = InMemoryBwt::from_ascii(b"").unwrap();
    assert!(matches!(
        FmIndexConfig::new().construct_from_source(&mut source),
        Err(BuildError::EmptyStream)
    ));
}

#[test]
fn segment_bytes_overflow() {
    // all five symbols equally frequent: about 2.4 bits per symbol, so the byte offset
    // inside a large block passes 16 bits while every symbol count still fits
    let mut source = InMemoryBwt::from_ascii(&b"$ACGT".repeat(60_000))
        .unwrap()
        .with_end_of_text_position(0);

    let result = FmIndexConfig::new()
        .small_sample_rate(1 << 10)
        .large_sample_rate(1 << 19)
        .construct_from_source(&mut source);

    match result {
        Err(BuildError::SegmentBytesTooLarge { segment, value }) => {
            assert!(value > usize::from(u16::MAX));
            // no single symbol count can have overflowed yet
            assert!(segment << 10 < 5 * 65_535);
        }
        other => panic!("expected SegmentBytesTooLarge, got {other:?}"),
    }
}

#[cfg(feature = "savefile")]
#[test]
fn save_and_load() {
    let index = create_index();

    let mut buffer = Vec::new();
    index.save_to_writer(&mut buffer).unwrap();
    let loaded = FmIndex::load_from_reader(&mut buffer.as_slice()).unwrap();

    assert_eq!(loaded.decode_bwt(), index.decode_bwt());
    assert_eq!(loaded.eof_pos(), index.eof_pos());
    assert_eq!(loaded.large_markers(), index.large_markers());
    assert_eq!(loaded.small_markers(), index.small_markers());
    assert_eq!(loaded.codec(), index.codec());
    assert_eq!(loaded.count(b"ACG"), 2);
    assert_eq!(loaded.info(), index.info());
}

fn random_text(rng: &mut ChaCha8Rng, len: usize) -> Vec<u8> {
    (0..len).map(|_| b"ACGT"[rng.random_range(0..4)]).collect()
}

fn naive_count(text: &[u8], query: &[u8]) -> usize {
    text.windows(query.len())
        .filter(|window| window.eq_ignore_ascii_case(query))
        .count()
}

// raw counts of the stored symbols in [0, idx), the end-of-text row counts as a sentinel
fn naive_raw_counts(bwt: &[u8], idx: usize) -> AlphaCount64 {
    let mut counts = AlphaCount64::new();
    for &c in &bwt[..idx] {
        counts.increment(Symbol::from_ascii(c).unwrap());
    }
    counts
}

struct QuerySampler<'t, 'r> {
    text: &'t [u8],
    rng: &'r mut ChaCha8Rng,
    max_extent: usize,
}

impl<'t, 'r> Iterator for QuerySampler<'t, 'r> {
    type Item = &'t [u8];

    fn next(&mut self) -> Option<Self::Item> {
        if self.text.is_empty() {
            return None;
        }

        let position = self.rng.random_range(0..self.text.len());
        let extent_range = 1..std::cmp::min(self.max_extent, self.text.len() - position + 1);
        let extent = self.rng.random_range(extent_range);

        Some(&self.text[position..position + extent])
    }
}

struct RandomQueryGenerator<'r> {
    max_len: usize,
    rng: &'r mut ChaCha8Rng,
}

impl<'r> Iterator for RandomQueryGenerator<'r> {
    type Item = Vec<u8>;

    fn next(&mut self) -> Option<Self::Item> {
        let len = self.rng.random_range(1..self.max_len);
        let mut query = vec![0; len];
        for q in query.iter_mut() {
            *q = b"ACGTN$"[self.rng.random_range(0..6)];
        }

        Some(query)
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_failure_persistence(prop::test_runner::FileFailurePersistence::WithSource("proptest-regressions")))]

    #[test]
    fn correctness_random_texts(
        texts in prop::collection::vec(
            prop::collection::vec((0usize..8).prop_map(|i| b"ACGTacgt"[i]), 0..1500),
            1..5
        ),
        small_shift in 0u32..6,
        large_shift_difference in 0u32..4,
        num_threads in 1usize..4,
        seed in any::<u64>()
    ) {
        let small_sample_rate = 1 << small_shift;
        let large_sample_rate = small_sample_rate << large_shift_difference;

        let index = FmIndexConfig::new()
            .small_sample_rate(small_sample_rate)
            .large_sample_rate(large_sample_rate)
            .construct_from_texts(&texts)
            .unwrap();

        let concatenated = texts.join(&b'$');
        let n = concatenated.len() + 1;
        prop_assert_eq!(index.len(), n);

        // the terminator ends the last sequence like a sentinel
        let mut terminated = concatenated.clone();
        terminated.push(b'$');
        prop_assert_eq!(index.num_sequences(), texts.len());

        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let existing_queries: Vec<_> = QuerySampler { text: &concatenated, max_extent: 100, rng: &mut rng }.take(20).collect();
        let random_queries: Vec<_> = RandomQueryGenerator { max_len: 12, rng: &mut rng }.take(100).collect();

        for query in &existing_queries {
            prop_assert!(index.count(query) > 0);
            prop_assert_eq!(index.count(query), naive_count(&terminated, query));
        }

        let expected: Vec<_> = random_queries.iter().map(|q| naive_count(&terminated, q)).collect();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build()
            .unwrap();

        let counts = pool.install(|| index.count_many(&random_queries));
        prop_assert_eq!(counts, expected);

        // every row is reached exactly once from row 0 before the end-of-text row
        let mut visited = vec![false; n];
        let mut idx = 0;
        let mut text_reversed = Vec::new();
        while let Some(symbol) = index.char_at(idx) {
            prop_assert!(!visited[idx]);
            visited[idx] = true;
            text_reversed.push(symbol.to_ascii());
            idx = index.lf_map(idx);
        }
        prop_assert_eq!(idx, index.eof_pos());
        prop_assert_eq!(text_reversed.len(), n - 1);
        text_reversed.reverse();
        prop_assert!(text_reversed.eq_ignore_ascii_case(&concatenated));

        let mut bwt_source = bwt_from_texts(&texts).unwrap();
        index.verify(&mut bwt_source).unwrap();
    }

    #[test]
    fn marker_consistency(
        texts in prop::collection::vec(
            prop::collection::vec((0usize..4).prop_map(|i| b"ACGT"[i]), 0..600),
            1..4
        ),
        small_shift in 0u32..5,
        large_shift_difference in 0u32..4,
    ) {
        let small_sample_rate = 1usize << small_shift;
        let large_sample_rate = small_sample_rate << large_shift_difference;

        let index = FmIndexConfig::new()
            .small_sample_rate(small_sample_rate)
            .large_sample_rate(large_sample_rate)
            .construct_from_texts(&texts)
            .unwrap();

        let bwt = index.decode_bwt();
        let n = bwt.len();
        prop_assert_eq!(n, index.len());

        prop_assert_eq!(index.small_markers().len(), n / small_sample_rate + 1);
        let expected_num_large_markers = n / large_sample_rate + if n % large_sample_rate == 0 { 1 } else { 2 };
        prop_assert_eq!(index.large_markers().len(), expected_num_large_markers);

        for (i, large_marker) in index.large_markers().iter().enumerate() {
            let position = std::cmp::min(i * large_sample_rate, n);
            prop_assert_eq!(large_marker.position() as usize, position);
            prop_assert_eq!(large_marker.counts(), &naive_raw_counts(&bwt, position));
        }

        for (i, small_marker) in index.small_markers().iter().enumerate() {
            let position = i * small_sample_rate;
            let mut counts = *index.large_markers()[position / large_sample_rate].counts();
            counts.add_relative(small_marker.counts());

            prop_assert_eq!(counts, naive_raw_counts(&bwt, position));
        }

        // occurrence agrees with full_occurrence and never decreases
        let mut previous = AlphaCount64::new();
        for idx in 0..n {
            let full = index.full_occurrence(idx);

            for symbol in Symbol::ALL {
                prop_assert_eq!(index.occurrence(symbol, idx) as u64, full.get(symbol));
                prop_assert!(full.get(symbol) >= previous.get(symbol));
            }

            prop_assert!(full.sum() <= idx as u64 + 1);
            previous = full;
        }

        let mut sentinels_at_end = naive_raw_counts(&bwt, n);
        sentinels_at_end.set(Symbol::Sentinel, sentinels_at_end.get(Symbol::Sentinel) - 1);
        prop_assert_eq!(index.full_rank(n), sentinels_at_end);
    }
}
