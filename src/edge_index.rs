//! An index from graph edges to linear segments and superpaths.
//!
//! The segment index stores `(segment rank, offset)` for every edge rank that is a multiple of `2^div`.
//! Lookups for other edges fail, and the caller is expected to walk the graph to the nearest sampled edge.
//! The path index stores `(superpath id, offset)` for each linear segment referenced by exactly one superpath.
//!
//! The index is built for a fixed snapshot of a [`SuperGraph`].
//! It must be rebuilt after the supergraph changes.
//!
//! ### File format
//!
//! The index is stored as components `header` (version, `div`), `segs`, `paths`, and `multi`.
//! Both `segs` and `paths` store their pairs as flattened [`u64`] arrays, so superpath identifiers and offsets are not narrowed to 32 bits.

use crate::formats::{self, FormatError};
use crate::graph::{Edge, Graph};
use crate::kmer;
use crate::segment::{Segment, SuperPathId};
use crate::supergraph::SuperGraph;

use std::ops::Range;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;

use simple_sds::raw_vector::{AccessRaw, RawVector};


//-----------------------------------------------------------------------------

/// Parameters for building an [`EdgeIndex`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdgeIndexParams {
    /// Sample every `2^div` edges.
    pub div: usize,

    /// Number of worker threads for the segment index.
    pub threads: usize,

    /// Number of segments in a work item.
    pub batch_size: usize,

    /// Print progress information to stderr.
    pub verbose: bool,
}

impl EdgeIndexParams {
    /// Default sampling rate.
    pub const DEFAULT_DIV: usize = 4;

    /// Default number of worker threads.
    pub const DEFAULT_THREADS: usize = 1;

    /// Default work item size.
    pub const DEFAULT_BATCH_SIZE: usize = 1024;

    /// Largest supported sampling rate.
    pub const MAX_DIV: usize = 32;
}

impl Default for EdgeIndexParams {
    fn default() -> Self {
        EdgeIndexParams {
            div: Self::DEFAULT_DIV,
            threads: Self::DEFAULT_THREADS,
            batch_size: Self::DEFAULT_BATCH_SIZE,
            verbose: false,
        }
    }
}

//-----------------------------------------------------------------------------

/// Sampled positions of graph edges in linear segments and of linear segments in superpaths.
///
/// # Examples
///
/// ```
/// use supergraph::{EdgeIndex, EdgeIndexParams, EntryEdgeSet, Graph, SuperGraph, SuperPathId};
///
/// let sequences = vec![b"TGAGCCCTTTAT".to_vec()];
/// let graph = Graph::from_sequences(3, &sequences, 1).unwrap();
/// let entries = EntryEdgeSet::build(&graph, false).unwrap();
/// let sg = SuperGraph::new(entries);
///
/// let params = EdgeIndexParams { div: 1, ..Default::default() };
/// let index = EdgeIndex::create(&graph, &sg, &params).unwrap();
/// assert!(index.segment(0).is_some());
/// assert!(index.segment(1).is_none());
///
/// // Each segment is its own superpath.
/// assert_eq!(index.superpath(0), Some((SuperPathId(0), 0)));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdgeIndex {
    div: usize,
    // (segment rank, offset) or NO_SEGMENT.
    segments: Vec<(u64, u64)>,
    // (superpath id, offset) for each segment.
    paths: Vec<(u64, u64)>,
    // Segment is not referenced by exactly one superpath.
    multi: RawVector,
}

impl EdgeIndex {
    /// Current file format version.
    pub const VERSION: u64 = 2011092301;

    /// Suffix of the file family.
    pub const SUFFIX: &'static str = "-edge-index";

    /// Marker for a sampled edge not covered by any linear segment.
    pub const NO_SEGMENT: u64 = u64::MAX;

    /// Builds the index for the supergraph over the given graph.
    ///
    /// The segment index is built in parallel using `params.threads` worker threads.
    /// Returns an error if the parameters are invalid or if the graph does not match the supergraph.
    /// The graph matches if it has the same `k` and contains the first edge of every linear segment.
    pub fn create(graph: &Graph, sg: &SuperGraph, params: &EdgeIndexParams) -> Result<Self, String> {
        let entries = sg.entries();
        if graph.K() != entries.K() {
            return Err(format!("Graph has k = {} but the supergraph has k = {}", graph.K(), entries.K()));
        }
        if params.div > EdgeIndexParams::MAX_DIV {
            return Err(format!("Sampling rate {} is too large (maximum {})", params.div, EdgeIndexParams::MAX_DIV));
        }
        if params.threads == 0 {
            return Err(String::from("The number of threads must be positive"));
        }
        if params.batch_size == 0 {
            return Err(String::from("Batch size must be positive"));
        }
        for rank in 0..entries.count() {
            let edge = entries.select(rank);
            if graph.access_and_rank(edge).is_none() {
                return Err(format!("Linear segment {} starts with edge {} that is not in the graph", rank, kmer::to_string(edge.0, entries.K() + 1)));
            }
        }

        if params.verbose {
            eprintln!("Building the segment index for {} edges with {} threads", graph.count(), params.threads);
        }
        let segments = Self::segment_index(graph, sg, params);

        if params.verbose {
            eprintln!("Building the path index for {} segments", entries.count());
        }
        let (paths, multi) = Self::path_index(sg);
        if params.verbose {
            let unique = (0..multi.len()).filter(|i| !multi.bit(*i)).count();
            eprintln!("{} segments belong to a single superpath", unique);
        }

        Ok(EdgeIndex { div: params.div, segments, paths, multi })
    }

    fn segment_index(graph: &Graph, sg: &SuperGraph, params: &EdgeIndexParams) -> Vec<(u64, u64)> {
        let entries = sg.entries();
        let div = params.div;
        let mask = (1usize << div) - 1;
        let slots = (graph.count() + mask) >> div;
        let mut segments = vec![(Self::NO_SEGMENT, 0); slots];

        // The main thread sends ranges of segment ranks to the workers through a bounded queue.
        // Each worker traces the segments and sends the sampled positions back.
        // Segments partition the edges, so no two workers produce the same slot.
        // The workers own the receiver, so sending fails once all of them have exited.
        let (to_workers, from_main) = mpsc::sync_channel::<Range<usize>>(2 * params.threads);
        let from_main = Arc::new(Mutex::new(from_main));
        let (to_main, from_workers) = mpsc::channel::<Vec<(usize, u64, u64)>>();

        thread::scope(|scope| {
            for _ in 0..params.threads {
                let from_main = Arc::clone(&from_main);
                let to_main = to_main.clone();
                scope.spawn(move || {
                    loop {
                        let batch = match from_main.lock() {
                            Ok(receiver) => receiver.recv(),
                            Err(_) => return,
                        };
                        // The sender has been dropped.
                        let Ok(batch) = batch else {
                            return;
                        };
                        let mut found = Vec::new();
                        for rank in batch {
                            let mut offset = 0;
                            graph.linear_path(entries.select(rank), |_, edge_rank| {
                                if edge_rank & mask == 0 {
                                    found.push((edge_rank >> div, rank as u64, offset));
                                }
                                offset += 1;
                                true
                            });
                        }
                        if to_main.send(found).is_err() {
                            return;
                        }
                    }
                });
            }
            drop(to_main);
            drop(from_main);

            let mut start = 0;
            while start < entries.count() {
                let end = (start + params.batch_size).min(entries.count());
                if to_workers.send(start..end).is_err() {
                    break;
                }
                start = end;
            }
            drop(to_workers);

            for found in from_workers {
                for (slot, rank, offset) in found {
                    debug_assert_eq!(segments[slot].0, Self::NO_SEGMENT, "EdgeIndex: slot {} is covered by multiple segments", slot);
                    segments[slot] = (rank, offset);
                }
            }
        });

        segments
    }

    fn path_index(sg: &SuperGraph) -> (Vec<(u64, u64)>, RawVector) {
        let entries = sg.entries();
        let k = entries.K() as i64;

        let mut refs = vec![0usize; entries.count()];
        for id in sg.paths() {
            for segment in sg.path(id).segments() {
                if let Some(rank) = segment.linear_path() {
                    refs[rank] += 1;
                }
            }
        }

        let mut paths = vec![(0, 0); entries.count()];
        let mut multi = RawVector::with_len(entries.count(), false);
        for (rank, count) in refs.iter().enumerate() {
            if *count != 1 {
                multi.set_bit(rank, true);
            }
        }
        for id in sg.paths() {
            let mut offset: i64 = 0;
            for segment in sg.path(id).segments() {
                match segment {
                    Segment::LinearPath(rank) => {
                        let rank = *rank as usize;
                        if refs[rank] == 1 {
                            paths[rank] = (id.0, offset as u64);
                        }
                    },
                    Segment::Gap(_) => offset += k,
                    _ => {},
                }
                // An overlap longer than the path so far restarts the offsets.
                let len = segment.length(entries);
                if len < 0 && -len > offset {
                    offset = 0;
                    continue;
                }
                offset += len;
            }
        }

        (paths, multi)
    }

    //-------------------------------------------------------------------------

    /// Returns the sampling rate: every `2^div` edges are sampled.
    #[inline]
    pub fn div(&self) -> usize {
        self.div
    }

    /// Returns the number of sampled edges.
    #[inline]
    pub fn samples(&self) -> usize {
        self.segments.len()
    }

    /// Returns the number of linear segments in the path index.
    #[inline]
    pub fn segments(&self) -> usize {
        self.paths.len()
    }

    /// Returns `(segment rank, offset)` for the edge with the given rank, or [`None`] if the edge is not sampled.
    ///
    /// The offset is the number of edges before the given edge in the segment.
    pub fn segment(&self, edge_rank: usize) -> Option<(usize, u64)> {
        let mask = (1usize << self.div) - 1;
        if edge_rank & mask != 0 {
            return None;
        }
        let (rank, offset) = *self.segments.get(edge_rank >> self.div)?;
        if rank == Self::NO_SEGMENT {
            return None;
        }
        Some((rank as usize, offset))
    }

    /// Returns `(segment rank, offset)` for the edge, or [`None`] if the edge is not in the graph or not sampled.
    pub fn segment_of_edge(&self, graph: &Graph, edge: Edge) -> Option<(usize, u64)> {
        let rank = graph.access_and_rank(edge)?;
        self.segment(rank)
    }

    /// Returns `(superpath id, offset)` for the linear segment, or [`None`] if the segment is not used by exactly one superpath.
    ///
    /// The offset is the position of the segment in the superpath in edges.
    ///
    /// # Panics
    ///
    /// Will panic if the segment rank is out of range.
    pub fn superpath(&self, segment: usize) -> Option<(SuperPathId, u64)> {
        assert!(segment < self.paths.len(), "EdgeIndex: segment rank {} out of range", segment);
        if self.multi.bit(segment) {
            return None;
        }
        let (id, offset) = self.paths[segment];
        Some((SuperPathId(id), offset))
    }
}

//-----------------------------------------------------------------------------

/// Persistence.
impl EdgeIndex {
    const COMPONENTS: [&'static str; 4] = ["header", "segs", "paths", "multi"];

    /// Writes the index to files with the given base name.
    pub fn write(&self, base: &str) -> Result<(), FormatError> {
        let name = |component| formats::component_name(base, Self::SUFFIX, component);
        formats::write_words(name("header"), &[Self::VERSION, self.div as u64])?;
        let segs: Vec<u64> = self.segments.iter().flat_map(|(rank, offset)| [*rank, *offset]).collect();
        formats::write_array(name("segs"), &segs)?;
        let paths: Vec<u64> = self.paths.iter().flat_map(|(id, offset)| [*id, *offset]).collect();
        formats::write_array(name("paths"), &paths)?;
        formats::write_array(name("multi"), &self.multi)?;
        Ok(())
    }

    /// Reads an index written with [`EdgeIndex::write`].
    pub fn read(base: &str) -> Result<Self, FormatError> {
        let name = |component| formats::component_name(base, Self::SUFFIX, component);
        let header = formats::read_header(name("header"), Self::VERSION, 2)?;
        let div = header[1] as usize;
        if div > EdgeIndexParams::MAX_DIV {
            return Err(FormatError::invalid(name("header"), &format!("Unsupported sampling rate: {}", div)));
        }

        let segs: Vec<u64> = formats::read_array(name("segs"))?;
        if segs.len() % 2 != 0 {
            return Err(FormatError::invalid(name("segs"), "Odd number of values"));
        }
        let segments: Vec<(u64, u64)> = segs.chunks_exact(2).map(|pair| (pair[0], pair[1])).collect();

        let raw_paths: Vec<u64> = formats::read_array(name("paths"))?;
        if raw_paths.len() % 2 != 0 {
            return Err(FormatError::invalid(name("paths"), "Odd number of values"));
        }
        let paths: Vec<(u64, u64)> = raw_paths.chunks_exact(2).map(|pair| (pair[0], pair[1])).collect();

        let multi: RawVector = formats::read_array(name("multi"))?;
        if multi.len() != paths.len() {
            return Err(FormatError::invalid(name("multi"), &format!("Expected {} flags, found {}", paths.len(), multi.len())));
        }

        Ok(EdgeIndex { div, segments, paths, multi })
    }

    /// Removes the files with the given base name, ignoring missing files.
    pub fn remove(base: &str) {
        for component in Self::COMPONENTS {
            let _ = std::fs::remove_file(formats::component_name(base, Self::SUFFIX, component));
        }
    }
}

//-----------------------------------------------------------------------------
