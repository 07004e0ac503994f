use dbgfm::{DeBruijnGraph, FmIndexConfig};

fn main() {
    // This example queries the implicit de Bruijn graph of the indexed sequences.
    // A k-mer is a vertex if it or its reverse complement occurs in a sequence.

    let texts = [b"ACGT".as_slice(), b"ACGA"];

    let index = FmIndexConfig::new().construct_from_texts(texts).unwrap();
    let graph = DeBruijnGraph::new(&index);

    assert!(graph.is_vertex(b"ACG"));
    // reverse complement of CGA
    assert!(graph.is_vertex(b"TCG"));

    for &base in &graph.suffix_neighbors(b"ACG") {
        println!("ACG -> CG{}", base as char);
    }

    for &base in &graph.prefix_neighbors(b"CGA") {
        println!("{}CG -> CGA", base as char);
    }

    // walk backwards through the index, starting from the row of the first suffix
    let (substring, row) = graph.extract_substring_and_index(0, 100);
    println!(
        "Extracted {} ending at row {row}.",
        String::from_utf8_lossy(&substring)
    );
}
