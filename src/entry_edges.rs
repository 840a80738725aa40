//! Entry edges: the first edges of the maximal linear segments of a de Bruijn graph.
//!
//! An edge is an entry edge if its `from` node has in-degree or out-degree other than 1.
//! Following [`Graph::linear_path`] from each entry edge partitions the edges of the graph into linear segments.
//! The entry edge set stores the entry edges in sorted order, and for each of them:
//!
//! * the length of the segment in edges;
//! * the rounded mean multiplicity of the edges in the segment;
//! * the end rank: the rank of the entry edge of the reverse complement segment.
//!
//! Entry edges are identified by their rank, which is also the identifier of the segment.

use crate::formats::{self, FormatError};
use crate::graph::{Edge, Graph, Node};
use crate::kmer;

use std::collections::BTreeMap;

use simple_sds::ops::{BitVec, Rank, Select};
use simple_sds::sparse_vector::{SparseBuilder, SparseVector};

#[cfg(test)]
mod tests;

//-----------------------------------------------------------------------------

/// The linear segments of a de Bruijn graph, identified by the ranks of their entry edges.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryEdgeSet {
    k: usize,
    edges: SparseVector,
    lengths: Vec<u64>,
    counts: Vec<u64>,
    ends: Vec<u64>,
}

impl EntryEdgeSet {
    /// Current file format version.
    pub const VERSION: u64 = 2011041901;

    /// Suffix of the file family.
    pub const SUFFIX: &'static str = "-entries";

    /// Finds the linear segments of the graph.
    ///
    /// Prints progress information to stderr if `verbose` is set.
    /// Returns an error if the graph is not closed under reverse complement.
    pub fn build(graph: &Graph, verbose: bool) -> Result<Self, String> {
        if verbose {
            eprintln!("Locating entry edges in {} graph edges", graph.count());
        }

        // (entry edge, length, count, last edge)
        let mut segments: Vec<(Edge, u64, u64, Edge)> = Vec::new();
        for rank in 0..graph.count() {
            let edge = graph.select(rank);
            let from = graph.from(edge);
            if graph.in_degree(from) == 1 && graph.out_degree(from) == 1 {
                continue;
            }
            let mut length = 0;
            let mut sum = 0;
            let last = graph.linear_path(edge, |_, r| {
                length += 1;
                sum += graph.multiplicity(r);
                true
            });
            let mean = (sum as f64 / length as f64).round() as u64;
            segments.push((edge, length, mean, last));
        }
        if verbose {
            eprintln!("Found {} linear segments", segments.len());
        }

        let universe = 1usize << (2 * (graph.K() + 1));
        let mut builder = SparseBuilder::new(universe, segments.len())?;
        for (edge, _, _, _) in segments.iter() {
            builder.set(edge.0 as usize);
        }
        let edges = SparseVector::try_from(builder)?;

        let mut ends = Vec::with_capacity(segments.len());
        for (edge, _, _, last) in segments.iter() {
            let rc = graph.reverse_complement_edge(*last);
            if rc.0 as usize >= edges.len() || !edges.get(rc.0 as usize) {
                return Err(format!(
                    "The reverse complement of the segment starting with {} does not start with an entry edge",
                    kmer::to_string(edge.0, graph.K() + 1)
                ));
            }
            ends.push(edges.rank(rc.0 as usize) as u64);
        }

        let lengths = segments.iter().map(|(_, len, _, _)| *len).collect();
        let counts = segments.iter().map(|(_, _, count, _)| *count).collect();
        Ok(EntryEdgeSet { k: graph.K(), edges, lengths, counts, ends })
    }

    /// Returns the length of the nodes.
    #[inline]
    #[allow(non_snake_case)]
    pub fn K(&self) -> usize {
        self.k
    }

    /// Returns the number of linear segments.
    #[inline]
    pub fn count(&self) -> usize {
        self.edges.count_ones()
    }

    /// Returns `true` if there are no segments.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Returns the number of entry edges preceding the given edge.
    #[inline]
    pub fn rank(&self, edge: Edge) -> usize {
        let index = (edge.0 as usize).min(self.edges.len());
        self.edges.rank(index)
    }

    /// Returns the entry edge of the given rank.
    ///
    /// # Panics
    ///
    /// Will panic if `rank >= self.count()`.
    pub fn select(&self, rank: usize) -> Edge {
        match self.edges.select(rank) {
            Some(value) => Edge(value as u64),
            None => panic!("EntryEdgeSet: segment rank {} out of range ({} segments)", rank, self.count()),
        }
    }

    /// Returns the rank of the edge, or [`None`] if it is not an entry edge.
    pub fn access_and_rank(&self, edge: Edge) -> Option<usize> {
        if edge.0 as usize >= self.edges.len() || !self.edges.get(edge.0 as usize) {
            return None;
        }
        Some(self.rank(edge))
    }

    /// Returns the number of edges in the segment.
    #[inline]
    pub fn length(&self, rank: usize) -> u64 {
        self.lengths[rank]
    }

    /// Returns the rounded mean multiplicity of the edges in the segment.
    #[inline]
    pub fn multiplicity(&self, rank: usize) -> u64 {
        self.counts[rank]
    }

    /// Returns the rank of the reverse complement segment.
    ///
    /// This is the rank of the reverse complement of the last edge in the segment.
    #[inline]
    pub fn end_rank(&self, rank: usize) -> usize {
        self.ends[rank] as usize
    }

    /// Returns the node the edge starts from.
    #[inline]
    pub fn from(&self, edge: Edge) -> Node {
        Node(edge.0 >> 2)
    }

    /// Returns the node the edge points to.
    #[inline]
    pub fn to(&self, edge: Edge) -> Node {
        Node(edge.0 & kmer::mask(self.k))
    }

    /// Returns the reverse complement of the edge.
    #[inline]
    pub fn reverse_complement_edge(&self, edge: Edge) -> Edge {
        Edge(kmer::reverse_complement(edge.0, self.k + 1))
    }

    /// Returns the reverse complement of the node.
    #[inline]
    pub fn reverse_complement_node(&self, node: Node) -> Node {
        Node(kmer::reverse_complement(node.0, self.k))
    }

    /// Returns a histogram of segment multiplicities.
    pub fn count_histogram(&self) -> BTreeMap<u64, usize> {
        let mut result = BTreeMap::new();
        for count in self.counts.iter() {
            *result.entry(*count).or_insert(0) += 1;
        }
        result
    }
}

//-----------------------------------------------------------------------------

/// Persistence.
impl EntryEdgeSet {
    const COMPONENTS: [&'static str; 5] = ["header", "edges", "lengths", "counts", "ends"];

    /// Writes the entry edge set to files with the given base name.
    pub fn write(&self, base: &str) -> Result<(), FormatError> {
        let name = |component| formats::component_name(base, Self::SUFFIX, component);
        formats::write_words(name("header"), &[Self::VERSION, self.k as u64])?;
        formats::write_array(name("edges"), &self.edges)?;
        formats::write_array(name("lengths"), &self.lengths)?;
        formats::write_array(name("counts"), &self.counts)?;
        formats::write_array(name("ends"), &self.ends)?;
        Ok(())
    }

    /// Reads an entry edge set written with [`EntryEdgeSet::write`].
    pub fn read(base: &str) -> Result<Self, FormatError> {
        let name = |component| formats::component_name(base, Self::SUFFIX, component);
        let header = formats::read_header(name("header"), Self::VERSION, 2)?;
        let k = header[1] as usize;
        if k == 0 || k + 1 > kmer::MAX_RHO {
            return Err(FormatError::invalid(name("header"), &format!("Unsupported k: {}", k)));
        }

        let edges: SparseVector = formats::read_array(name("edges"))?;
        let n = edges.count_ones();
        let lengths: Vec<u64> = formats::read_array(name("lengths"))?;
        let counts: Vec<u64> = formats::read_array(name("counts"))?;
        let ends: Vec<u64> = formats::read_array(name("ends"))?;
        for (component, len) in [("lengths", lengths.len()), ("counts", counts.len()), ("ends", ends.len())] {
            if len != n {
                return Err(FormatError::invalid(name(component), &format!("Expected {} values, found {}", n, len)));
            }
        }
        if ends.iter().any(|end| *end as usize >= n) {
            return Err(FormatError::invalid(name("ends"), "End rank out of range"));
        }

        Ok(EntryEdgeSet { k, edges, lengths, counts, ends })
    }

    /// Removes the files with the given base name, ignoring missing files.
    pub fn remove(base: &str) {
        for component in Self::COMPONENTS {
            let _ = std::fs::remove_file(formats::component_name(base, Self::SUFFIX, component));
        }
    }
}

//-----------------------------------------------------------------------------
