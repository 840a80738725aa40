//! # Supergraph: an assembly graph of superpaths over a de Bruijn graph.
//!
//! A genome assembler starts from a de Bruijn [`Graph`] and repeatedly joins its linear segments into longer paths as evidence from reads and read pairs accumulates.
//! This crate provides the graph those paths live in.
//!
//! ### Basic concepts
//!
//! The de Bruijn graph stores `(k + 1)`-mer edges between `k`-mer nodes.
//! The edge set is closed under reverse complement.
//! A *linear segment* is a maximal non-branching run of edges, and it is identified by the rank of its first edge in the [`EntryEdgeSet`].
//!
//! A *superpath* is a sequence of [`Segment`]s: linear segments, and gaps or overlaps of known length between them.
//! Every superpath has a reverse complement, and the two are always created and erased together.
//! The [`SuperGraph`] stores the superpaths in an arena indexed by [`SuperPathId`], along with the superpaths starting from each node.
//! Initially each linear segment is a superpath of its own.
//! [`SuperGraph::link`] creates longer superpaths by concatenation, and [`SuperGraph::erase`] removes superpaths that are no longer needed.
//!
//! ### Queries
//!
//! * [`SuperGraph::shortest_paths`] and [`ShortestPathIterator`] find paths between two nodes in order of increasing length.
//!   See also [`find_paths`] for paths between two superpaths.
//! * [`EdgeIndex`] maps an edge to its linear segment and the only superpath using that segment.
//! * [`UniquenessCache`] decides which superpaths are likely to be repeat-free.
//! * [`ContigBuilder`] and [`SuperGraph::print_contigs`] reconstruct the sequences of the superpaths.
//!
//! ### File formats
//!
//! Each structure is stored as a set of files sharing a base name, such as `<base>-graph.header`.
//! The header file starts with a version number, and loading fails if the version does not match.
//! See [`formats`] for the details.

pub mod contig;
pub mod edge_index;
pub mod entry_edges;
pub mod formats;
pub mod graph;
pub mod heap;
pub mod kmer;
pub mod segment;
pub mod shortest_path;
pub mod supergraph;
pub mod uniqueness;
pub mod utils;

#[cfg(test)]
mod internal;

pub use contig::{ContigBuilder, ContigParams, print_linear_segments};
pub use edge_index::{EdgeIndex, EdgeIndexParams};
pub use entry_edges::EntryEdgeSet;
pub use formats::FormatError;
pub use graph::{Edge, Graph, Node};
pub use heap::{HeapItem, IndexedBinaryHeap};
pub use segment::{Segment, SuperPath, SuperPathId};
pub use shortest_path::{PathDir, PathSearchParams, ShortestPathIterator, find_paths};
pub use supergraph::SuperGraph;
pub use uniqueness::UniquenessCache;
