//! A succinct de Bruijn graph.
//!
//! The graph is a set of edges, each of which is a `(k + 1)`-mer.
//! An edge connects the node formed by its first `k` bases to the node formed by its last `k` bases.
//! Nodes are not stored explicitly.
//! The edge set is closed under reverse complement, so `in_degree(v) == out_degree(rc(v))` for every node `v`.
//!
//! Edges are stored in sorted order in a [`SparseVector`], which provides rank and select.
//! Because the first `k` bases form the most significant bits of an edge, the outgoing edges of a node occupy a contiguous rank range.

use crate::formats::{self, FormatError};
use crate::kmer;

use std::collections::HashMap;
use std::fmt;

use simple_sds::ops::{BitVec, Rank, Select};
use simple_sds::sparse_vector::{SparseBuilder, SparseVector};


//-----------------------------------------------------------------------------

/// An edge in a de Bruijn graph: a packed `(k + 1)`-mer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Edge(pub u64);

/// A node in a de Bruijn graph: a packed `k`-mer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Node(pub u64);

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

//-----------------------------------------------------------------------------

/// A de Bruijn graph with edge multiplicities.
///
/// # Examples
///
/// ```
/// use supergraph::{Graph, Edge, kmer};
///
/// let graph = Graph::from_sequences(3, &[b"ACGTTGCA".to_vec()], 1).unwrap();
/// let edge = Edge(kmer::from_bytes(b"ACGT").unwrap());
/// assert!(graph.access_and_rank(edge).is_some());
/// assert_eq!(graph.multiplicity(graph.rank(edge)), 1);
///
/// // Reverse complements are included.
/// let rc = graph.reverse_complement_edge(edge);
/// assert!(graph.access_and_rank(rc).is_some());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Graph {
    k: usize,
    edges: SparseVector,
    counts: Vec<u64>,
}

impl Graph {
    /// Current file format version.
    pub const VERSION: u64 = 2011092301;

    /// Suffix of the file family.
    pub const SUFFIX: &'static str = "-graph";

    /// Builds a graph from edges with multiplicities.
    ///
    /// The edges must be sorted and distinct.
    /// Returns an error if `k` is too large or the edges are not a valid sorted set.
    pub fn from_edges(k: usize, edges: &[(u64, u64)]) -> Result<Self, String> {
        if k == 0 || k + 1 > kmer::MAX_RHO {
            return Err(format!("Unsupported k: {} (must be between 1 and {})", k, kmer::MAX_RHO - 1));
        }
        let universe = 1usize << (2 * (k + 1));
        let mut builder = SparseBuilder::new(universe, edges.len())?;
        let mut counts = Vec::with_capacity(edges.len());
        let mut prev: Option<u64> = None;
        for (edge, count) in edges.iter() {
            if prev.is_some_and(|p| p >= *edge) {
                return Err(format!("Edges are not sorted and distinct at {}", edge));
            }
            if *edge as usize >= universe {
                return Err(format!("Edge {} is too large for k = {}", edge, k));
            }
            builder.set(*edge as usize);
            counts.push(*count);
            prev = Some(*edge);
        }
        let edges = SparseVector::try_from(builder)?;
        Ok(Graph { k, edges, counts })
    }

    /// Builds a graph from the `(k + 1)`-mers of the sequences and their reverse complements.
    ///
    /// Edges observed fewer than `min_count` times are discarded.
    /// Bases outside `acgtACGT` break the sequences.
    pub fn from_sequences(k: usize, sequences: &[Vec<u8>], min_count: u64) -> Result<Self, String> {
        if k == 0 || k + 1 > kmer::MAX_RHO {
            return Err(format!("Unsupported k: {} (must be between 1 and {})", k, kmer::MAX_RHO - 1));
        }
        let rho = k + 1;
        let mut counts: HashMap<u64, u64> = HashMap::new();
        for sequence in sequences.iter() {
            for edge in kmer::kmers(sequence, rho) {
                *counts.entry(edge).or_insert(0) += 1;
                *counts.entry(kmer::reverse_complement(edge, rho)).or_insert(0) += 1;
            }
        }
        let mut edges: Vec<(u64, u64)> = counts.into_iter().filter(|(_, count)| *count >= min_count).collect();
        edges.sort_unstable();
        Self::from_edges(k, &edges)
    }

    /// Returns the length of the nodes.
    #[inline]
    #[allow(non_snake_case)]
    pub fn K(&self) -> usize {
        self.k
    }

    /// Returns the number of edges.
    #[inline]
    pub fn count(&self) -> usize {
        self.edges.count_ones()
    }

    /// Returns the number of edges preceding the given edge in sorted order.
    #[inline]
    pub fn rank(&self, edge: Edge) -> usize {
        let index = (edge.0 as usize).min(self.edges.len());
        self.edges.rank(index)
    }

    /// Returns the edge of the given rank.
    ///
    /// # Panics
    ///
    /// Will panic if `rank >= self.count()`.
    pub fn select(&self, rank: usize) -> Edge {
        match self.edges.select(rank) {
            Some(value) => Edge(value as u64),
            None => panic!("Graph: edge rank {} out of range ({} edges)", rank, self.count()),
        }
    }

    /// Returns the rank of the edge, or [`None`] if the edge is not in the graph.
    pub fn access_and_rank(&self, edge: Edge) -> Option<usize> {
        if edge.0 as usize >= self.edges.len() || !self.edges.get(edge.0 as usize) {
            return None;
        }
        Some(self.rank(edge))
    }

    /// Returns the multiplicity of the edge of the given rank.
    #[inline]
    pub fn multiplicity(&self, rank: usize) -> u64 {
        self.counts[rank]
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

    /// Returns `true` if the node is not larger than its reverse complement.
    #[inline]
    pub fn canonical(&self, node: Node) -> bool {
        node.0 == kmer::normalize(node.0, self.k)
    }

    /// Returns the rank range `(begin, end)` of the outgoing edges of the node.
    pub fn begin_end_rank(&self, node: Node) -> (usize, usize) {
        let first = node.0 << 2;
        (self.rank(Edge(first)), self.rank(Edge(first + 4)))
    }

    /// Returns the number of edges starting from the node.
    #[inline]
    pub fn out_degree(&self, node: Node) -> usize {
        let (begin, end) = self.begin_end_rank(node);
        end - begin
    }

    /// Returns the number of edges pointing to the node.
    #[inline]
    pub fn in_degree(&self, node: Node) -> usize {
        self.out_degree(self.reverse_complement_node(node))
    }

    /// Returns the outgoing edges of the node with their ranks.
    pub fn successors(&self, node: Node) -> impl Iterator<Item = (Edge, usize)> + '_ {
        let (begin, end) = self.begin_end_rank(node);
        (begin..end).map(move |rank| (self.select(rank), rank))
    }

    /// Follows the linear path starting from the given edge and returns its last edge.
    ///
    /// The path continues as long as the current edge points to a node with exactly one predecessor and one successor.
    /// It also stops before returning to `begin`.
    /// The visitor is called with each edge and its rank; returning `false` stops the traversal at that edge.
    ///
    /// # Panics
    ///
    /// Will panic if `begin` is not in the graph.
    pub fn linear_path<F: FnMut(Edge, usize) -> bool>(&self, begin: Edge, mut visitor: F) -> Edge {
        let mut rank = match self.access_and_rank(begin) {
            Some(rank) => rank,
            None => panic!("Graph: linear path from a missing edge {}", kmer::to_string(begin.0, self.k + 1)),
        };
        let mut edge = begin;
        loop {
            if !visitor(edge, rank) {
                return edge;
            }
            let node = self.to(edge);
            if self.in_degree(node) != 1 || self.out_degree(node) != 1 {
                return edge;
            }
            let (next_rank, _) = self.begin_end_rank(node);
            let next = self.select(next_rank);
            if next == begin {
                return edge;
            }
            edge = next;
            rank = next_rank;
        }
    }

    /// Returns the number of edges on the linear path starting from the given edge.
    pub fn linear_path_len(&self, begin: Edge) -> usize {
        let mut len = 0;
        self.linear_path(begin, |_, _| {
            len += 1;
            true
        });
        len
    }
}

//-----------------------------------------------------------------------------

/// Persistence.
impl Graph {
    /// Writes the graph to files with the given base name.
    pub fn write(&self, base: &str) -> Result<(), FormatError> {
        formats::write_words(formats::component_name(base, Self::SUFFIX, "header"), &[Self::VERSION, self.k as u64])?;
        formats::write_array(formats::component_name(base, Self::SUFFIX, "edges"), &self.edges)?;
        formats::write_array(formats::component_name(base, Self::SUFFIX, "counts"), &self.counts)?;
        Ok(())
    }

    /// Reads a graph written with [`Graph::write`].
    pub fn read(base: &str) -> Result<Self, FormatError> {
        let header_file = formats::component_name(base, Self::SUFFIX, "header");
        let header = formats::read_header(&header_file, Self::VERSION, 2)?;
        let k = header[1] as usize;
        if k == 0 || k + 1 > kmer::MAX_RHO {
            return Err(FormatError::invalid(&header_file, &format!("Unsupported k: {}", k)));
        }

        let edges_file = formats::component_name(base, Self::SUFFIX, "edges");
        let edges: SparseVector = formats::read_array(&edges_file)?;
        if edges.len() != 1usize << (2 * (k + 1)) {
            return Err(FormatError::invalid(&edges_file, "Edge universe does not match k"));
        }
        let counts_file = formats::component_name(base, Self::SUFFIX, "counts");
        let counts: Vec<u64> = formats::read_array(&counts_file)?;
        if counts.len() != edges.count_ones() {
            return Err(FormatError::invalid(&counts_file, "Multiplicity count does not match edge count"));
        }

        Ok(Graph { k, edges, counts })
    }

    /// Removes the files with the given base name, ignoring missing files.
    pub fn remove(base: &str) {
        for component in ["header", "edges", "counts"] {
            let _ = std::fs::remove_file(formats::component_name(base, Self::SUFFIX, component));
        }
    }
}

//-----------------------------------------------------------------------------
