use dbgfm::FmIndexConfig;

fn main() {
    // This example shows how to build the compressed FM-Index and count queries.

    let texts = [b"ACGTACGT".as_slice(), b"acgaTTGA", b"GATTACA"];

    let index = FmIndexConfig::new()
        .small_sample_rate(4)
        .large_sample_rate(64)
        .construct_from_texts(texts)
        .unwrap();

    println!("{}", index.info());

    let query = b"ACG";
    assert_eq!(index.count(query), 3);

    // a query ending in the sentinel matches the end of a sequence
    assert_eq!(index.count(b"CA$"), 1);

    // for many queries, count_many can be used to count in parallel
    let many_queries = [b"AC".as_slice(), b"GT", b"TTGA", b"NNN"];

    for (query_id, count) in index.count_many(&many_queries).into_iter().enumerate() {
        println!("Query {query_id} occurs {count} times.");
    }

    // the cursor extends a query symbol by symbol at the front
    let mut cursor = index.cursor_for_query(b"GA");
    assert_eq!(cursor.count(), 3);

    cursor.extend_query_front(b'T');
    assert_eq!(cursor.count(), 1);
}
