//! The assembly supergraph.
//!
//! A [`SuperGraph`] is a graph over the nodes of a de Bruijn graph, where each edge is a superpath.
//! A superpath is a sequence of [`Segment`]s: linear segments of the de Bruijn graph and gaps between them.
//! Initially there is one superpath for each linear segment.
//! Superpaths can then be concatenated with [`SuperGraph::link`] and removed with [`SuperGraph::erase`].
//!
//! Every superpath has a reverse complement with its own identifier.
//! Identifiers are always allocated and freed in pairs, so `rc(rc(id)) == id` for every live `id`.
//!
//! ### Identifier arena
//!
//! Slot `i` of the arena stores the segments of path `i` and a link word.
//! For a live path, the link word is the identifier of the reverse complement.
//! For a free slot, it is the next free slot, and the list of free slots ends with a trailing slot that stores a sentinel.
//! The segments of a slot are empty if and only if the slot is free.

use crate::entry_edges::EntryEdgeSet;
use crate::formats::{self, FormatError};
use crate::graph::{Edge, Node};
use crate::kmer;
use crate::segment::{Segment, SuperPath, SuperPathId};

use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, Write};


//-----------------------------------------------------------------------------

/// A mutable graph of superpaths over a fixed [`EntryEdgeSet`].
///
/// # Examples
///
/// ```
/// use supergraph::{Graph, EntryEdgeSet, SuperGraph};
///
/// let sequences = vec![b"TGAGCCCTTTAT".to_vec()];
/// let graph = Graph::from_sequences(3, &sequences, 1).unwrap();
/// let entries = EntryEdgeSet::build(&graph, false).unwrap();
/// let mut sg = SuperGraph::new(entries);
/// assert_eq!(sg.count(), 2);
///
/// // Link one of the paths with itself over a gap.
/// let path = sg.paths().next().unwrap();
/// let gap = sg.gap_path(5);
/// let (fd, rc) = sg.link(&[path, gap, path]);
/// assert_eq!(sg.reverse_complement(fd), rc);
/// assert_eq!(sg.reverse_complement(rc), fd);
/// assert_eq!(sg.size(fd), 2 * sg.size(path) + 5);
/// assert_eq!(sg.count(), 6);
///
/// sg.erase(fd);
/// assert!(!sg.valid(fd) && !sg.valid(rc));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SuperGraph {
    entries: EntryEdgeSet,

    // Head of the free list.
    next_free: u64,

    // Number of live paths.
    count: u64,

    // Start node -> paths starting from it. Every node has at least one path.
    succ: BTreeMap<Node, Vec<SuperPathId>>,

    // Segments for each slot.
    segs: Vec<Vec<Segment>>,

    // Reverse complement, next free slot, or the sentinel.
    rcs: Vec<u64>,
}

impl SuperGraph {
    /// Current file format version.
    pub const VERSION: u64 = 2011082301;

    /// Suffix of the file family.
    pub const SUFFIX: &'static str = "-supergraph";

    /// Link word marking the end of the free list.
    pub const SENTINEL: u64 = u64::MAX;

    /// Minimum length of a unique path in bases, including `K`.
    pub const MIN_UNIQUE_LENGTH: i64 = 50;

    /// Score threshold for a unique path.
    pub const UNIQUE_THRESHOLD: f64 = 5.0;

    /// Creates a supergraph with a singleton path for each segment in the entry edge set.
    ///
    /// Path `i` consists of segment `i`, and its reverse complement is [`EntryEdgeSet::end_rank`]`(i)`.
    pub fn new(entries: EntryEdgeSet) -> Self {
        let n = entries.count();
        let mut succ: BTreeMap<Node, Vec<SuperPathId>> = BTreeMap::new();
        let mut segs = Vec::with_capacity(n + 1);
        let mut rcs = Vec::with_capacity(n + 1);
        for i in 0..n {
            let from = entries.from(entries.select(i));
            succ.entry(from).or_default().push(SuperPathId(i as u64));
            segs.push(vec![Segment::LinearPath(i as u64)]);
            rcs.push(entries.end_rank(i) as u64);
        }
        segs.push(Vec::new());
        rcs.push(Self::SENTINEL);

        SuperGraph {
            entries,
            next_free: n as u64,
            count: n as u64,
            succ, segs, rcs,
        }
    }

    /// Returns the entry edge set.
    #[inline]
    pub fn entries(&self) -> &EntryEdgeSet {
        &self.entries
    }

    /// Returns the number of identifier slots, including free slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.rcs.len()
    }

    /// Returns the number of live paths.
    #[inline]
    pub fn count(&self) -> usize {
        self.count as usize
    }

    /// Returns `true` if there are no live paths.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Returns `true` if the identifier refers to a live path.
    #[inline]
    pub fn valid(&self, id: SuperPathId) -> bool {
        id.index() < self.segs.len() && !self.segs[id.index()].is_empty()
    }

    /// Returns a view of the path.
    ///
    /// # Panics
    ///
    /// Will panic if the identifier is beyond the arena.
    pub fn path(&self, id: SuperPathId) -> SuperPath<'_> {
        SuperPath::new(id, &self.segs[id.index()], SuperPathId(self.rcs[id.index()]))
    }

    /// Returns the reverse complement of the path.
    #[inline]
    pub fn reverse_complement(&self, id: SuperPathId) -> SuperPathId {
        SuperPathId(self.rcs[id.index()])
    }

    /// Returns `true` if the path consists of a single gap.
    #[inline]
    pub fn is_gap(&self, id: SuperPathId) -> bool {
        self.path(id).is_gap()
    }

    /// Returns the length of the path in edges.
    #[inline]
    pub fn size(&self, id: SuperPathId) -> i64 {
        self.path(id).size(&self.entries)
    }

    /// Returns the length of the path in bases.
    #[inline]
    pub fn base_size(&self, id: SuperPathId) -> i64 {
        self.path(id).base_size(&self.entries)
    }

    /// Returns the first edge of the path.
    #[inline]
    pub fn first_edge(&self, id: SuperPathId) -> Edge {
        self.path(id).first_edge(&self.entries)
    }

    /// Returns the last edge of the path.
    #[inline]
    pub fn last_edge(&self, id: SuperPathId) -> Edge {
        self.path(id).last_edge(&self.entries)
    }

    /// Returns the start node of the path.
    ///
    /// # Panics
    ///
    /// Will panic if the path has no linear segments.
    #[inline]
    pub fn start(&self, id: SuperPathId) -> Node {
        self.path(id).start(&self.entries)
    }

    /// Returns the end node of the path.
    ///
    /// # Panics
    ///
    /// Will panic if the path has no linear segments.
    #[inline]
    pub fn end(&self, id: SuperPathId) -> Node {
        self.path(id).end(&self.entries)
    }

    /// Returns the reverse complement of the node.
    #[inline]
    pub fn reverse_complement_node(&self, node: Node) -> Node {
        self.entries.reverse_complement_node(node)
    }
}

//-----------------------------------------------------------------------------

/// Adjacency.
impl SuperGraph {
    /// Returns the paths starting from the node.
    pub fn successors(&self, node: Node) -> &[SuperPathId] {
        self.succ.get(&node).map(|ids| ids.as_slice()).unwrap_or(&[])
    }

    /// Returns an iterator over the nodes with at least one successor in sorted order.
    pub fn nodes(&self) -> impl Iterator<Item = Node> + '_ {
        self.succ.keys().copied()
    }

    /// Returns the number of paths starting from the node.
    #[inline]
    pub fn num_out(&self, node: Node) -> usize {
        self.successors(node).len()
    }

    /// Returns the number of paths ending at the node.
    #[inline]
    pub fn num_in(&self, node: Node) -> usize {
        self.num_out(self.reverse_complement_node(node))
    }

    /// Returns the only path starting from the node.
    ///
    /// # Panics
    ///
    /// Will panic if the number of successors is not 1.
    pub fn only_out(&self, node: Node) -> SuperPathId {
        let successors = self.successors(node);
        assert_eq!(successors.len(), 1, "SuperGraph: node {} has {} successors", kmer::to_string(node.0, self.entries.K()), successors.len());
        successors[0]
    }

    /// Returns an iterator over the live non-gap paths in node order.
    pub fn paths(&self) -> impl Iterator<Item = SuperPathId> + '_ {
        self.succ.values().flat_map(|ids| ids.iter().copied())
    }
}

//-----------------------------------------------------------------------------

/// Mutation.
impl SuperGraph {
    /// Creates a new path by concatenating the given paths, along with its reverse complement.
    ///
    /// The segments of the reverse complement are the segments of the reverse complements of the components in reverse order.
    /// Returns `(forward, reverse)`.
    /// The components are not removed.
    ///
    /// # Panics
    ///
    /// Will panic if the list is empty or if any of the paths is not live.
    /// Will also panic if the resulting path has no linear segments.
    pub fn link(&mut self, paths: &[SuperPathId]) -> (SuperPathId, SuperPathId) {
        assert!(!paths.is_empty(), "SuperGraph: cannot link an empty list of paths");
        for id in paths.iter() {
            assert!(self.valid(*id), "SuperGraph: cannot link a free path {}", id);
        }

        let len: usize = paths.iter().map(|id| self.segs[id.index()].len()).sum();
        let mut fd_segs = Vec::with_capacity(len);
        let mut rc_segs = Vec::with_capacity(len);
        for id in paths.iter() {
            fd_segs.extend_from_slice(&self.segs[id.index()]);
            let rc = self.reverse_complement(*id);
            rc_segs.splice(0..0, self.segs[rc.index()].iter().copied());
        }
        debug_assert_eq!(fd_segs.len(), rc_segs.len());

        let (fd, rc) = self.alloc_rc_ids();
        self.segs[fd.index()] = fd_segs;
        self.segs[rc.index()] = rc_segs;
        let fd_start = self.start(fd);
        let rc_start = self.start(rc);
        self.succ.entry(fd_start).or_default().push(fd);
        self.succ.entry(rc_start).or_default().push(rc);
        self.count += 2;

        (fd, rc)
    }

    /// Creates a gap path of the given length and returns its identifier.
    ///
    /// Both the path and its reverse complement consist of the same gap.
    /// Gap paths have no start node, so they are not successors of any node.
    pub fn gap_path(&mut self, len: i64) -> SuperPathId {
        let (fd, rc) = self.alloc_rc_ids();
        self.segs[fd.index()] = vec![Segment::Gap(len)];
        self.segs[rc.index()] = vec![Segment::Gap(len)];
        self.count += 2;
        fd
    }

    /// Erases the path and its reverse complement.
    ///
    /// Paths using the erased path as a component are not affected.
    ///
    /// # Panics
    ///
    /// Will panic if the path is not live.
    pub fn erase(&mut self, id: SuperPathId) {
        assert!(self.valid(id), "SuperGraph: cannot erase a free path {}", id);
        let rc = self.reverse_complement(id);
        self.half_erase(id);
        if rc != id {
            self.half_erase(rc);
        }
    }

    fn half_erase(&mut self, id: SuperPathId) {
        if !self.is_gap(id) {
            let start = self.start(id);
            let Some(ids) = self.succ.get_mut(&start) else {
                panic!("SuperGraph: no successors for the start node of path {}", id);
            };
            let Some(offset) = ids.iter().position(|x| *x == id) else {
                panic!("SuperGraph: path {} is not a successor of its start node", id);
            };
            ids.remove(offset);
            if ids.is_empty() {
                self.succ.remove(&start);
            }
        }
        self.segs[id.index()] = Vec::new();
        self.free_id(id);
        self.count -= 1;
    }

    fn alloc_rc_ids(&mut self) -> (SuperPathId, SuperPathId) {
        let fd = self.alloc_id();
        let rc = self.alloc_id();
        self.rcs[fd.index()] = rc.0;
        self.rcs[rc.index()] = fd.0;
        (fd, rc)
    }

    fn alloc_id(&mut self) -> SuperPathId {
        let id = self.next_free;
        self.next_free = self.rcs[id as usize];
        if self.next_free == Self::SENTINEL {
            self.segs.push(Vec::new());
            self.rcs.push(Self::SENTINEL);
            self.next_free = (self.rcs.len() - 1) as u64;
        }
        SuperPathId(id)
    }

    fn free_id(&mut self, id: SuperPathId) {
        self.rcs[id.index()] = self.next_free;
        self.next_free = id.0;
    }
}

//-----------------------------------------------------------------------------

/// Statistics.
impl SuperGraph {
    /// Returns `true` if the path looks unique given the expected coverage.
    ///
    /// This is the A-statistic of Zerbino et al. (2009): the log-odds ratio of the path occurring once vs. twice, assuming Poisson-distributed coverage.
    /// Gap paths and paths shorter than [`Self::MIN_UNIQUE_LENGTH`] bases are never unique.
    pub fn unique(&self, id: SuperPathId, expected_coverage: f64) -> bool {
        if self.is_gap(id) {
            return false;
        }
        if self.size(id) + (self.entries.K() as i64) < Self::MIN_UNIQUE_LENGTH {
            return false;
        }

        let mut n = 0.0;
        let mut c = 0.0;
        for segment in self.path(id).segments() {
            if segment.is_gap() {
                continue;
            }
            let len = segment.length(&self.entries) as f64;
            n += len;
            if let Some(rank) = segment.linear_path() {
                c += len * self.entries.multiplicity(rank) as f64;
            }
        }
        if n == 0.0 {
            return false;
        }
        c /= n;

        let rho = expected_coverage;
        let f = std::f64::consts::LN_2 / 2.0 + (n / (2.0 * rho)) * (rho * rho - (c * c) / 2.0);
        f >= Self::UNIQUE_THRESHOLD
    }
}

//-----------------------------------------------------------------------------

/// Text output.
impl SuperGraph {
    /// Writes a text dump of the arena, the adjacency map, and the live paths.
    pub fn dump<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "elements")?;
        for (i, segs) in self.segs.iter().enumerate() {
            write!(out, "{} [", i)?;
            for segment in segs.iter() {
                write!(out, " {}", segment)?;
            }
            writeln!(out, "] {}", self.rcs[i] as i64)?;
        }
        writeln!(out, "succs")?;
        for (node, ids) in self.succ.iter() {
            write!(out, "{}:", kmer::to_string(node.0, self.entries.K()))?;
            for id in ids.iter() {
                write!(out, " {}", id)?;
            }
            writeln!(out)?;
        }
        writeln!(out, "paths")?;
        for id in self.paths() {
            writeln!(out, "{}", self.path(id))?;
        }
        Ok(())
    }

    /// Writes the graph in DOT format.
    ///
    /// Nodes are labeled with their k-mers and edges with path identifiers.
    pub fn write_dot<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let k = self.entries.K();
        let mut written: BTreeSet<Node> = BTreeSet::new();
        writeln!(out, "digraph {{")?;
        for (from, ids) in self.succ.iter() {
            for id in ids.iter() {
                let to = self.end(*id);
                for node in [*from, to] {
                    if written.insert(node) {
                        writeln!(out, "\t{} [shape=\"point\", label=\"\"];", kmer::to_string(node.0, k))?;
                    }
                }
                writeln!(out, "\t{} -> {} [label=\" {}\"];", kmer::to_string(from.0, k), kmer::to_string(to.0, k), id)?;
            }
        }
        writeln!(out, "}}")?;
        Ok(())
    }
}

//-----------------------------------------------------------------------------

/// Persistence.
impl SuperGraph {
    const COMPONENTS: [&'static str; 9] = [
        "header", "next-id", "count",
        "succ.nodes", "succ.num-path-ids", "succ.path-ids",
        "segs.num-segments", "segs.segments",
        "rcs.rc-path-ids",
    ];

    /// Writes the supergraph to files with the given base name.
    ///
    /// The entry edge set is not written.
    pub fn write(&self, base: &str) -> Result<(), FormatError> {
        let name = |component| formats::component_name(base, Self::SUFFIX, component);
        formats::write_words(name("header"), &[Self::VERSION])?;
        formats::write_scalar(name("next-id"), self.next_free)?;
        formats::write_scalar(name("count"), self.count)?;

        let mut nodes: Vec<u64> = Vec::with_capacity(self.succ.len());
        let mut num_path_ids: Vec<u64> = Vec::with_capacity(self.succ.len());
        let mut path_ids: Vec<u64> = Vec::new();
        for (node, ids) in self.succ.iter() {
            nodes.push(node.0);
            num_path_ids.push(ids.len() as u64);
            path_ids.extend(ids.iter().map(|id| id.0));
        }
        formats::write_array(name("succ.nodes"), &nodes)?;
        formats::write_array(name("succ.num-path-ids"), &num_path_ids)?;
        formats::write_array(name("succ.path-ids"), &path_ids)?;

        let num_segments: Vec<u64> = self.segs.iter().map(|segs| segs.len() as u64).collect();
        let segments: Vec<u64> = self.segs.iter().flat_map(|segs| segs.iter().map(|s| s.pack())).collect();
        formats::write_array(name("segs.num-segments"), &num_segments)?;
        formats::write_array(name("segs.segments"), &segments)?;

        formats::write_array(name("rcs.rc-path-ids"), &self.rcs)?;
        Ok(())
    }

    /// Reads a supergraph written with [`SuperGraph::write`] over the given entry edge set.
    pub fn read(base: &str, entries: EntryEdgeSet) -> Result<Self, FormatError> {
        let name = |component| formats::component_name(base, Self::SUFFIX, component);
        formats::read_header(name("header"), Self::VERSION, 1)?;
        let next_free = formats::read_scalar(name("next-id"))?;
        let count = formats::read_scalar(name("count"))?;

        let nodes: Vec<u64> = formats::read_array(name("succ.nodes"))?;
        let num_path_ids: Vec<u64> = formats::read_array(name("succ.num-path-ids"))?;
        let path_ids: Vec<u64> = formats::read_array(name("succ.path-ids"))?;
        if nodes.len() != num_path_ids.len() {
            return Err(FormatError::invalid(name("succ.num-path-ids"), "Node and count arrays have different lengths"));
        }
        if num_path_ids.iter().sum::<u64>() != path_ids.len() as u64 {
            return Err(FormatError::invalid(name("succ.path-ids"), "Wrong number of path ids"));
        }
        let mut succ: BTreeMap<Node, Vec<SuperPathId>> = BTreeMap::new();
        let mut offset = 0;
        for (node, num) in nodes.iter().zip(num_path_ids.iter()) {
            let ids = &path_ids[offset..offset + *num as usize];
            succ.insert(Node(*node), ids.iter().map(|id| SuperPathId(*id)).collect());
            offset += *num as usize;
        }

        let num_segments: Vec<u64> = formats::read_array(name("segs.num-segments"))?;
        let segments: Vec<u64> = formats::read_array(name("segs.segments"))?;
        if num_segments.iter().sum::<u64>() != segments.len() as u64 {
            return Err(FormatError::invalid(name("segs.segments"), "Wrong number of segments"));
        }
        let mut segs: Vec<Vec<Segment>> = Vec::with_capacity(num_segments.len());
        let mut offset = 0;
        for num in num_segments.iter() {
            let packed = &segments[offset..offset + *num as usize];
            segs.push(packed.iter().map(|x| Segment::unpack(*x)).collect());
            offset += *num as usize;
        }

        let rcs: Vec<u64> = formats::read_array(name("rcs.rc-path-ids"))?;
        if rcs.len() != segs.len() {
            return Err(FormatError::invalid(name("rcs.rc-path-ids"), "Reverse complement and segment tables have different lengths"));
        }
        if next_free as usize >= rcs.len() {
            return Err(FormatError::invalid(name("next-id"), "Free list head out of range"));
        }
        let live = segs.iter().filter(|segs| !segs.is_empty()).count() as u64;
        if live != count {
            return Err(FormatError::invalid(name("count"), &format!("Expected {} live paths, found {}", count, live)));
        }

        // Live paths must refer to existing segments and mates.
        let len = rcs.len() as u64;
        for (i, path) in segs.iter().enumerate() {
            if path.is_empty() {
                continue;
            }
            if let Some(rank) = path.iter().filter_map(|s| s.linear_path()).find(|rank| *rank >= entries.count()) {
                return Err(FormatError::invalid(name("segs.segments"), &format!("Path {} uses segment {} of {}", i, rank, entries.count())));
            }
            let rc = rcs[i];
            if rc >= len || segs[rc as usize].is_empty() || rcs[rc as usize] != i as u64 {
                return Err(FormatError::invalid(name("rcs.rc-path-ids"), &format!("Path {} has an invalid reverse complement {}", i, rc)));
            }
        }
        for ids in succ.values() {
            if let Some(id) = ids.iter().find(|id| id.0 >= len || segs[id.index()].is_empty()) {
                return Err(FormatError::invalid(name("succ.path-ids"), &format!("Successor {} is not a live path", id)));
            }
        }

        // The free list must visit free slots only and end at the sentinel.
        let mut free = 0;
        let mut curr = next_free;
        loop {
            if curr >= len || !segs[curr as usize].is_empty() || free >= len {
                return Err(FormatError::invalid(name("next-id"), &format!("Invalid free list entry {}", curr)));
            }
            free += 1;
            curr = rcs[curr as usize];
            if curr == Self::SENTINEL {
                break;
            }
        }
        if free + count != len {
            return Err(FormatError::invalid(name("next-id"), &format!("Free list has {} slots, expected {}", free, len - count)));
        }

        Ok(SuperGraph { entries, next_free, count, succ, segs, rcs })
    }

    /// Removes the files with the given base name, ignoring missing files.
    pub fn remove(base: &str) {
        for component in Self::COMPONENTS {
            let _ = std::fs::remove_file(formats::component_name(base, Self::SUFFIX, component));
        }
    }
}

//-----------------------------------------------------------------------------
