use crate::{EntryEdgeSet, Graph, SuperGraph};
use crate::graph::{Edge, Node};
use crate::kmer;

use simple_sds::serialize;

//-----------------------------------------------------------------------------

// A bubble with k = 3.
//
// Both sequences share the prefix TGAGCC and the suffix CTTTAT.
// The second one has GA inserted between them, creating two paths from GCC to CTT.
// Entry edges in rank order (forward segments marked with *):
//
//    0 AAGG (3 edges)   rc of 4
//    1 AAGT (5 edges)   rc of 5
//    2 ATAA (3 edges)   rc of 3
//  * 3 CTTT (3 edges)   CTT -> TAT
//  * 4 GCCC (3 edges)   GCC -> CTT
//  * 5 GCCG (5 edges)   GCC -> CTT
//    6 GGCT (3 edges)   rc of 7
//  * 7 TGAG (3 edges)   TGA -> GCC

pub(crate) const BUBBLE_K: usize = 3;

pub(crate) const BUBBLE_SEQUENCES: [&str; 2] = ["TGAGCCCTTTAT", "TGAGCCGACTTTAT"];

pub(crate) const BUBBLE_EDGES: usize = 28;

// (entry edge, length, multiplicity, end rank)
pub(crate) const BUBBLE_ENTRIES: [(&str, u64, u64, usize); 8] = [
    ("AAGG", 3, 1, 4),
    ("AAGT", 5, 1, 5),
    ("ATAA", 3, 2, 3),
    ("CTTT", 3, 2, 2),
    ("GCCC", 3, 1, 0),
    ("GCCG", 5, 1, 1),
    ("GGCT", 3, 2, 7),
    ("TGAG", 3, 2, 6),
];

pub(crate) fn node(kmer: &str) -> Node {
    let value = kmer::from_bytes(kmer.as_bytes());
    assert!(value.is_some(), "Invalid k-mer {}", kmer);
    Node(value.unwrap())
}

pub(crate) fn edge(kmer: &str) -> Edge {
    let value = kmer::from_bytes(kmer.as_bytes());
    assert!(value.is_some(), "Invalid edge {}", kmer);
    Edge(value.unwrap())
}

pub(crate) fn build_graph(k: usize, sequences: &[&str]) -> Graph {
    let sequences: Vec<Vec<u8>> = sequences.iter().map(|s| s.as_bytes().to_vec()).collect();
    let graph = Graph::from_sequences(k, &sequences, 1);
    assert!(graph.is_ok(), "Failed to build the graph: {}", graph.unwrap_err());
    graph.unwrap()
}

pub(crate) fn build_entries(graph: &Graph) -> EntryEdgeSet {
    let entries = EntryEdgeSet::build(graph, false);
    assert!(entries.is_ok(), "Failed to build the entry edge set: {}", entries.unwrap_err());
    entries.unwrap()
}

pub(crate) fn bubble_graph() -> Graph {
    build_graph(BUBBLE_K, &BUBBLE_SEQUENCES)
}

pub(crate) fn bubble_supergraph() -> (Graph, SuperGraph) {
    let graph = bubble_graph();
    let entries = build_entries(&graph);
    (graph, SuperGraph::new(entries))
}

// Returns the edges of the linear path starting from the given edge with their ranks.
pub(crate) fn linear_path_edges(graph: &Graph, begin: Edge) -> Vec<(Edge, usize)> {
    let mut result = Vec::new();
    graph.linear_path(begin, |edge, rank| {
        result.push((edge, rank));
        true
    });
    result
}

//-----------------------------------------------------------------------------

// Temporary files.

pub(crate) fn temp_base(name_part: &str) -> String {
    serialize::temp_file_name(name_part).to_string_lossy().into_owned()
}

//-----------------------------------------------------------------------------
