//! Shortest paths between supergraph nodes.
//!
//! The superpaths starting from a node act as its outgoing edges, with the size of the path as the weight.
//! [`SuperGraph::shortest_paths`] builds a shortest path tree towards a sink node, and [`ShortestPathIterator`] enumerates the paths from a source to the sink in order of non-decreasing length by taking single-edge deviations from the tree.
//! [`find_paths`] wraps the iterator with the length limits used when connecting two superpaths.

use crate::graph::Node;
use crate::heap::{HeapItem, IndexedBinaryHeap};
use crate::segment::SuperPathId;
use crate::supergraph::SuperGraph;

use std::collections::{BTreeMap, BTreeSet};


//-----------------------------------------------------------------------------

/// The next step on a shortest path to the sink.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PathDir {
    /// The superpath to follow.
    pub edge: SuperPathId,
    /// Distance to the sink.
    pub dist: i64,
}

impl PathDir {
    /// Creates a new path direction.
    pub fn new(edge: SuperPathId, dist: i64) -> Self {
        PathDir { edge, dist }
    }
}

// A node in the search heap, along with the edge it was reached by.
#[derive(Clone, Copy, Debug)]
struct NodePathDir {
    node: Node,
    dir: PathDir,
}

impl HeapItem for NodePathDir {
    type Key = Node;
    type Priority = i64;

    fn key(&self) -> Node {
        self.node
    }

    fn priority(&self) -> i64 {
        self.dir.dist
    }
}

//-----------------------------------------------------------------------------

/// Path search.
impl SuperGraph {
    /// Inserts the superpaths within `radius` steps of the node into the set.
    ///
    /// If `rc` is set, the reverse complements of the paths are inserted instead.
    /// The search does not continue from paths that are already in the set.
    pub fn find_subgraph(&self, node: Node, paths: &mut BTreeSet<SuperPathId>, radius: usize, rc: bool) {
        if radius == 0 {
            return;
        }
        for id in self.successors(node).iter() {
            let recorded = if rc { self.reverse_complement(*id) } else { *id };
            if paths.insert(recorded) {
                self.find_subgraph(self.end(*id), paths, radius - 1, rc);
            }
        }
    }

    /// Returns the shortest path tree towards `sink`, or [`None`] if `sink` cannot be reached from `source` within `max_length`.
    ///
    /// The tree maps each node to the superpath starting a shortest path from it to the sink, along with the distance.
    /// It contains the nodes with distance at most `max_length` that can reach the sink, with the exception of the sink itself.
    /// It may also contain nodes not reachable from the source.
    ///
    /// If `valid` is given, the reverse complements of the paths in the set are the only edges that can be used.
    /// Path sizes are assumed to be non-negative.
    pub fn shortest_paths(&self, source: Node, sink: Node, max_length: i64, valid: Option<&BTreeSet<SuperPathId>>) -> Option<BTreeMap<Node, PathDir>> {
        // Search from the reverse complement of the sink, so that we get distances to the sink.
        let start = self.reverse_complement_node(sink);
        let target = self.reverse_complement_node(source);

        let mut heap: IndexedBinaryHeap<NodePathDir> = IndexedBinaryHeap::new();
        let mut visited: BTreeMap<Node, PathDir> = BTreeMap::new();
        // The edge from the start node is a placeholder.
        heap.push(NodePathDir { node: start, dir: PathDir::new(SuperPathId(0), 0) });

        let mut found = false;
        while let Some(curr) = heap.pop() {
            if curr.dir.dist > max_length {
                break;
            }
            if curr.node == target {
                found = true;
            }
            visited.insert(curr.node, curr.dir);

            for id in self.successors(curr.node).iter() {
                if let Some(valid) = valid {
                    if !valid.contains(id) {
                        continue;
                    }
                }
                let next = self.end(*id);
                let dist = curr.dir.dist + self.size(*id);
                if let Some(item) = heap.get_mut(&next) {
                    if dist < item.dir.dist {
                        item.dir = PathDir::new(*id, dist);
                        heap.up(&next);
                    }
                } else if !visited.contains_key(&next) {
                    heap.push(NodePathDir { node: next, dir: PathDir::new(*id, dist) });
                }
            }
        }

        if !found {
            return None;
        }

        // Reverse the results and skip the start node.
        let mut result = BTreeMap::new();
        for (node, dir) in visited.iter() {
            if dir.dist == 0 {
                continue;
            }
            result.insert(self.reverse_complement_node(*node), PathDir::new(self.reverse_complement(dir.edge), dir.dist));
        }
        Some(result)
    }
}

//-----------------------------------------------------------------------------

// A path defined by a sequence of deviations from the shortest path tree.
#[derive(Clone, Debug)]
struct DevPath {
    serial: usize,
    length: i64,
    devs: Vec<SuperPathId>,
}

impl HeapItem for DevPath {
    type Key = usize;
    type Priority = (i64, usize);

    fn key(&self) -> usize {
        self.serial
    }

    fn priority(&self) -> (i64, usize) {
        (self.length, self.serial)
    }
}

/// An iterator over the paths from a source node to a sink node in order of non-decreasing length.
///
/// Each path is a sequence of superpath identifiers.
/// The first path is a shortest path with length at most `max_length`.
/// Later paths are single-edge deviations from earlier ones, and their lengths are not bounded by `max_length`.
/// Paths that leave the part of the graph known to the shortest path tree are skipped.
/// If the graph has cycles, the iterator may be infinite.
///
/// If the source is the sink, the iterator is empty.
pub struct ShortestPathIterator<'a> {
    graph: &'a SuperGraph,
    source: Node,
    sink: Node,
    tree: BTreeMap<Node, PathDir>,
    candidates: IndexedBinaryHeap<DevPath>,
    serial: usize,
}

impl<'a> ShortestPathIterator<'a> {
    /// Creates an iterator over the paths from `source` to `sink`.
    ///
    /// If `search_radius` is non-zero, the search is restricted to superpaths within that many steps of the source.
    pub fn new(graph: &'a SuperGraph, source: Node, sink: Node, max_length: i64, search_radius: usize) -> Self {
        let valid = if search_radius > 0 {
            let mut valid = BTreeSet::new();
            graph.find_subgraph(source, &mut valid, search_radius, true);
            Some(valid)
        } else {
            None
        };

        let tree = graph.shortest_paths(source, sink, max_length, valid.as_ref()).unwrap_or_default();
        let mut result = ShortestPathIterator {
            graph, source, sink, tree,
            candidates: IndexedBinaryHeap::new(),
            serial: 0,
        };
        if let Some(dir) = result.tree.get(&source).copied() {
            result.push_candidate(dir.dist, Vec::new());
        }
        result
    }

    /// Returns the shortest path tree used by the iterator.
    ///
    /// The tree is empty if there was no path from the source to the sink.
    pub fn tree(&self) -> &BTreeMap<Node, PathDir> {
        &self.tree
    }

    fn push_candidate(&mut self, length: i64, devs: Vec<SuperPathId>) {
        self.candidates.push(DevPath { serial: self.serial, length, devs });
        self.serial += 1;
    }

    // Adds all single-edge deviations after the last deviation of the candidate.
    fn extend(&mut self, candidate: &DevPath) {
        let graph = self.graph;
        let mut curr = self.source;
        let mut len = 0;
        if let Some(last) = candidate.devs.last() {
            curr = graph.end(*last);
            match self.tree.get(&curr) {
                Some(dir) => len = candidate.length - dir.dist,
                None => return,
            }
        }

        let mut deviations = Vec::new();
        while curr != self.sink {
            let Some(min_dir) = self.tree.get(&curr).copied() else {
                break;
            };
            for id in graph.successors(curr).iter() {
                if *id == min_dir.edge {
                    continue;
                }
                let dev_node = graph.end(*id);
                let known = self.tree.get(&dev_node);
                if known.is_some() || dev_node == self.sink {
                    let dev_len = len + graph.size(*id) + known.map_or(0, |dir| dir.dist);
                    let mut devs = candidate.devs.clone();
                    devs.push(*id);
                    deviations.push((dev_len, devs));
                }
            }
            curr = graph.end(min_dir.edge);
            len += graph.size(min_dir.edge);
        }

        for (length, devs) in deviations {
            self.push_candidate(length, devs);
        }
    }

    // Returns the full path for the candidate, or `None` if it leaves the tree.
    fn materialize(&self, candidate: &DevPath) -> Option<Vec<SuperPathId>> {
        let mut result = Vec::new();
        let mut curr = self.source;
        let mut next_dev = 0;
        while curr != self.sink {
            let id = if next_dev < candidate.devs.len() && self.graph.start(candidate.devs[next_dev]) == curr {
                next_dev += 1;
                candidate.devs[next_dev - 1]
            } else {
                self.tree.get(&curr)?.edge
            };
            result.push(id);
            curr = self.graph.end(id);
        }
        Some(result)
    }
}

impl Iterator for ShortestPathIterator<'_> {
    type Item = Vec<SuperPathId>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let candidate = self.candidates.pop()?;
            self.extend(&candidate);
            if let Some(path) = self.materialize(&candidate) {
                return Some(path);
            }
        }
    }
}

//-----------------------------------------------------------------------------

/// Parameters for [`find_paths`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathSearchParams {
    /// Minimum length of an accepted path, including the initial length.
    pub min_length: i64,

    /// Maximum length of an accepted path, including the initial length.
    pub max_length: i64,

    /// Restrict the search to superpaths within this many steps (0 for no restriction).
    pub search_radius: usize,

    /// Maximum number of candidate paths to examine.
    pub max_paths: usize,

    /// Print progress information to stderr.
    pub verbose: bool,
}

impl PathSearchParams {
    /// Default minimum length.
    pub const DEFAULT_MIN_LENGTH: i64 = 0;

    /// Default maximum length.
    pub const DEFAULT_MAX_LENGTH: i64 = 1000;

    /// Default search radius.
    pub const DEFAULT_SEARCH_RADIUS: usize = 0;

    /// Default number of candidate paths.
    pub const DEFAULT_MAX_PATHS: usize = 100;
}

impl Default for PathSearchParams {
    fn default() -> Self {
        PathSearchParams {
            min_length: Self::DEFAULT_MIN_LENGTH,
            max_length: Self::DEFAULT_MAX_LENGTH,
            search_radius: Self::DEFAULT_SEARCH_RADIUS,
            max_paths: Self::DEFAULT_MAX_PATHS,
            verbose: false,
        }
    }
}

/// Finds paths connecting the end of superpath `begin` to the start of superpath `end`.
///
/// The length of a path is `init_len` plus the total size of the superpaths on it.
/// Candidates come from a [`ShortestPathIterator`] in order of non-decreasing length.
/// Candidates shorter than the minimum length are skipped, and the search stops at the first candidate longer than the maximum length.
///
/// # Panics
///
/// Will panic if either superpath is a gap path.
pub fn find_paths(graph: &SuperGraph, begin: SuperPathId, end: SuperPathId, init_len: i64, params: &PathSearchParams) -> Vec<Vec<SuperPathId>> {
    if params.verbose {
        eprintln!("Searching for paths from {} to {}", begin, end);
    }
    let source = graph.end(begin);
    let sink = graph.start(end);

    let mut result = Vec::new();
    let iter = ShortestPathIterator::new(graph, source, sink, params.max_length, params.search_radius);
    for path in iter.take(params.max_paths) {
        let len = init_len + path.iter().map(|id| graph.size(*id)).sum::<i64>();
        if params.verbose {
            let ids: Vec<String> = path.iter().map(|id| id.to_string()).collect();
            eprintln!("Found a path of length {} with {} segments: {}", len, path.len(), ids.join(" "));
        }
        if len > params.max_length {
            break;
        }
        if len < params.min_length {
            continue;
        }
        result.push(path);
    }

    if params.verbose {
        eprintln!("Found {} paths from {} to {}", result.len(), begin, end);
    }
    result
}

//-----------------------------------------------------------------------------
