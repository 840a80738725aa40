use super::*;

use crate::internal::{self, edge, node};

//-----------------------------------------------------------------------------

#[test]
fn bubble_entries() {
    let graph = internal::bubble_graph();
    let entries = internal::build_entries(&graph);
    assert_eq!(entries.K(), graph.K(), "Wrong k");
    assert_eq!(entries.count(), internal::BUBBLE_ENTRIES.len(), "Wrong number of segments");

    let mut total = 0;
    for (rank, (kmer, length, count, end)) in internal::BUBBLE_ENTRIES.iter().enumerate() {
        assert_eq!(entries.select(rank), edge(kmer), "Wrong entry edge {}", rank);
        assert_eq!(entries.rank(edge(kmer)), rank, "Wrong rank for entry edge {}", kmer);
        assert_eq!(entries.access_and_rank(edge(kmer)), Some(rank), "Entry edge {} not found", kmer);
        assert_eq!(entries.length(rank), *length, "Wrong length for segment {}", rank);
        assert_eq!(entries.multiplicity(rank), *count, "Wrong multiplicity for segment {}", rank);
        assert_eq!(entries.end_rank(rank), *end, "Wrong end rank for segment {}", rank);
        assert_eq!(entries.end_rank(*end), rank, "End ranks are not symmetric for segment {}", rank);
        total += entries.length(rank);
    }
    assert_eq!(total as usize, graph.count(), "Segments do not cover the graph");

    // Inner edges are not entry edges.
    assert_eq!(entries.access_and_rank(edge("GAGC")), None, "An inner edge is an entry edge");
    assert_eq!(entries.from(edge("GCCG")), node("GCC"), "Wrong from node");
    assert_eq!(entries.to(edge("GCCG")), node("CCG"), "Wrong to node");
}

#[test]
fn segment_ends() {
    let graph = internal::bubble_graph();
    let entries = internal::build_entries(&graph);
    for rank in 0..entries.count() {
        let path = internal::linear_path_edges(&graph, entries.select(rank));
        let (last, _) = path[path.len() - 1];
        let rc_first = entries.select(entries.end_rank(rank));
        assert_eq!(entries.reverse_complement_edge(rc_first), last, "End rank of segment {} does not match its last edge", rank);
    }
}

#[test]
fn multiplicity_histogram() {
    let graph = internal::bubble_graph();
    let entries = internal::build_entries(&graph);
    let histogram = entries.count_histogram();
    let expected: BTreeMap<u64, usize> = [(1, 4), (2, 4)].into_iter().collect();
    assert_eq!(histogram, expected, "Wrong multiplicity histogram");
}

#[test]
fn empty_graph() {
    let graph = Graph::from_edges(3, &[]).unwrap();
    let entries = internal::build_entries(&graph);
    assert!(entries.is_empty(), "Empty graph has segments");
}

#[test]
fn serialize_entries() {
    let graph = internal::bubble_graph();
    let entries = internal::build_entries(&graph);
    let base = internal::temp_base("entries");
    let result = entries.write(&base);
    assert!(result.is_ok(), "Failed to write the entry edge set: {}", result.unwrap_err());
    let loaded = EntryEdgeSet::read(&base);
    assert_eq!(loaded, Ok(entries), "Wrong entry edge set loaded");

    // Inconsistent component sizes.
    formats::write_array(formats::component_name(&base, EntryEdgeSet::SUFFIX, "ends"), &vec![0u64]).unwrap();
    let loaded = EntryEdgeSet::read(&base);
    assert!(matches!(loaded, Err(FormatError::Invalid { .. })), "Loaded an inconsistent entry edge set");

    EntryEdgeSet::remove(&base);
    let loaded = EntryEdgeSet::read(&base);
    assert!(matches!(loaded, Err(FormatError::MissingFile { .. })), "Loaded a removed entry edge set");
}

//-----------------------------------------------------------------------------
