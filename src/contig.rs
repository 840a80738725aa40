//! Contig sequences for superpaths and linear segments.
//!
//! [`ContigBuilder`] reconstructs the base sequence of a superpath by tracing its linear segments in the [`Graph`].
//! [`SuperGraph::print_contigs`] writes the contigs of a supergraph in FASTA or tabular format, and [`print_linear_segments`] does the same for the linear segments of a graph without a supergraph.
//!
//! A linear segment between two branching nodes shares `k` bases with each neighboring segment.
//! To avoid printing the shared bases twice, the first node of a contig is included only if it has no predecessors or if it is canonical, and the last node only if it has no successors or if it is not canonical.

use crate::entry_edges::EntryEdgeSet;
use crate::graph::{Edge, Graph};
use crate::kmer;
use crate::segment::{Segment, SuperPathId};
use crate::supergraph::SuperGraph;

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::io::{self, Write};

#[cfg(test)]
mod tests;

//-----------------------------------------------------------------------------

/// Parameters for printing contigs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContigParams {
    /// Minimum length of a printed contig in bases.
    pub min_length: usize,

    /// Minimum coverage of the edges in a printed linear segment.
    pub min_coverage: u64,

    /// Width of sequence lines (0 for no line breaks).
    pub line_width: usize,

    /// Print both orientations of each superpath.
    pub print_rcs: bool,

    /// Print superpaths contained in other superpaths.
    pub print_entailed: bool,

    /// Print a table of contig statistics instead of sequences.
    pub omit_sequence: bool,

    /// Include contig statistics in FASTA headers.
    pub verbose_headers: bool,
}

impl ContigParams {
    /// Default minimum length.
    pub const DEFAULT_MIN_LENGTH: usize = 0;

    /// Default minimum coverage.
    pub const DEFAULT_MIN_COVERAGE: u64 = 0;

    /// Default line width.
    pub const DEFAULT_LINE_WIDTH: usize = 60;
}

impl Default for ContigParams {
    fn default() -> Self {
        ContigParams {
            min_length: Self::DEFAULT_MIN_LENGTH,
            min_coverage: Self::DEFAULT_MIN_COVERAGE,
            line_width: Self::DEFAULT_LINE_WIDTH,
            print_rcs: false,
            print_entailed: false,
            omit_sequence: false,
            verbose_headers: false,
        }
    }
}

//-----------------------------------------------------------------------------

/// Accumulates the sequence and coverage statistics of a contig.
///
/// Feed the segments of the contig in order with [`ContigBuilder::add_segment`], or the edges and gaps directly with [`ContigBuilder::visit`] and [`ContigBuilder::add_gap`].
///
/// # Examples
///
/// ```
/// use supergraph::{ContigBuilder, EntryEdgeSet, Graph, Segment};
///
/// let sequences = vec![b"TGAGCCCTTTAT".to_vec()];
/// let graph = Graph::from_sequences(3, &sequences, 1).unwrap();
/// let entries = EntryEdgeSet::build(&graph, false).unwrap();
///
/// // Find the segment starting with the first edge of the sequence.
/// let rank = (0..entries.count()).find(|r| supergraph::kmer::to_string(entries.select(*r).0, 4) == "TGAG").unwrap();
/// let mut builder = ContigBuilder::new(&graph);
/// builder.add_segment(&entries, Segment::LinearPath(rank as u64));
/// assert_eq!(builder.sequence(), "TGAGCCCTTTAT");
/// assert_eq!(builder.min(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct ContigBuilder<'a> {
    graph: &'a Graph,
    // Waiting for the first emitted edge.
    start: bool,
    // The next edge follows a gap.
    restart: bool,
    // Number of bases of the next edge that are new after a gap.
    restart_num: i64,
    contig: String,
    last: Option<Edge>,

    min: u64,
    max: u64,
    sum: u64,
    sum2: u64,
    edges: u64,
}

impl<'a> ContigBuilder<'a> {
    /// Creates an empty contig.
    pub fn new(graph: &'a Graph) -> Self {
        ContigBuilder {
            graph,
            start: true,
            restart: false,
            restart_num: 0,
            contig: String::new(),
            last: None,
            min: u64::MAX,
            max: 0,
            sum: 0,
            sum2: 0,
            edges: 0,
        }
    }

    /// Adds the edge with the given rank to the contig.
    pub fn visit(&mut self, edge: Edge, rank: usize) {
        let count = self.graph.multiplicity(rank);
        self.min = self.min.min(count);
        self.max = self.max.max(count);
        self.sum += count;
        self.sum2 += count * count;
        self.edges += 1;

        if self.start || self.restart {
            let from = self.graph.from(edge);
            if self.restart || self.graph.in_degree(from) == 0 || self.graph.canonical(from) {
                let k = self.graph.K() as i64;
                let rho = self.graph.K() + 1;
                let skip = if self.restart { (k - self.restart_num).clamp(0, rho as i64) as usize } else { 0 };
                self.start = false;
                self.restart = false;
                let bases = kmer::to_string(edge.0, rho);
                self.contig.push_str(&bases[skip..]);
            }
        } else {
            self.contig.push(char::from(kmer::base(edge.0, self.graph.K() + 1, self.graph.K())));
        }
        self.last = Some(edge);
    }

    /// Adds a gap of `len` bases.
    ///
    /// A positive gap adds `len` `N`s.
    /// A non-positive gap is an overlap: the first `-len` bases after it are not added.
    pub fn add_gap(&mut self, len: i64) {
        self.restart = true;
        let k = self.graph.K() as i64;
        if len > 0 {
            self.contig.extend(std::iter::repeat('N').take(len as usize));
            self.restart_num = k;
        } else {
            self.restart_num = k + len;
        }
    }

    /// Adds the segment to the contig.
    ///
    /// Linear paths are traced in the graph.
    /// Segments other than linear paths and gaps are ignored.
    pub fn add_segment(&mut self, entries: &EntryEdgeSet, segment: Segment) {
        match segment {
            Segment::LinearPath(rank) => {
                let graph = self.graph;
                let begin = entries.select(rank as usize);
                graph.linear_path(begin, |edge, rank| {
                    self.visit(edge, rank);
                    true
                });
            },
            Segment::Gap(len) => self.add_gap(len),
            _ => {},
        }
    }

    /// Returns the full sequence accumulated so far.
    #[inline]
    pub fn sequence(&self) -> &str {
        &self.contig
    }

    /// Returns the sequence without the last `k` bases, unless the last node should be included.
    ///
    /// The last node is included if it has no successors or if it is not canonical.
    /// Returns an empty string if the sequence is shorter than `k` and the last node is not included.
    pub fn truncated(&self) -> String {
        let Some(last) = self.last else {
            return String::new();
        };
        if self.contig.is_empty() {
            return String::new();
        }
        let to = self.graph.to(last);
        if self.graph.out_degree(to) == 0 || !self.graph.canonical(to) {
            return self.contig.clone();
        }
        let k = self.graph.K();
        if self.contig.len() < k {
            return String::new();
        }
        self.contig[..self.contig.len() - k].to_string()
    }

    /// Returns the number of edges visited.
    #[inline]
    pub fn edges(&self) -> u64 {
        self.edges
    }

    /// Returns the minimum edge coverage, or `0` if no edges were visited.
    pub fn min(&self) -> u64 {
        if self.edges == 0 { 0 } else { self.min }
    }

    /// Returns the maximum edge coverage.
    #[inline]
    pub fn max(&self) -> u64 {
        self.max
    }

    /// Returns the mean edge coverage, or `0.0` if no edges were visited.
    pub fn mean(&self) -> f64 {
        if self.edges == 0 {
            return 0.0;
        }
        self.sum as f64 / self.edges as f64
    }

    /// Returns the standard deviation of edge coverage, or `0.0` if no edges were visited.
    pub fn std_dev(&self) -> f64 {
        if self.edges == 0 {
            return 0.0;
        }
        let n = self.edges as f64;
        let sum = self.sum as f64;
        (n * self.sum2 as f64 - sum * sum).max(0.0).sqrt() / n
    }
}

//-----------------------------------------------------------------------------

/// Contigs.
impl SuperGraph {
    /// Returns a contig builder that has visited all segments of the path.
    pub fn contig<'a>(&self, graph: &'a Graph, id: SuperPathId) -> ContigBuilder<'a> {
        let mut builder = ContigBuilder::new(graph);
        for segment in self.path(id).segments() {
            builder.add_segment(self.entries(), *segment);
        }
        builder
    }

    /// Returns the truncated contig sequence of the path, its reverse complement, and its mean coverage.
    pub fn contig_info(&self, graph: &Graph, id: SuperPathId) -> (String, SuperPathId, f64) {
        let builder = self.contig(graph, id);
        (builder.truncated(), self.reverse_complement(id), builder.mean())
    }

    /// Returns the paths whose segment lists are contained in the segment list of another path.
    ///
    /// If two paths have identical segment lists, the one with the larger identifier is considered contained.
    pub fn entailed_paths(&self) -> BTreeSet<SuperPathId> {
        // Find the segments used more than once.
        let mut seen: HashSet<Segment> = HashSet::new();
        let mut shared: BTreeMap<u64, Vec<SuperPathId>> = BTreeMap::new();
        for id in self.paths() {
            for segment in self.path(id).segments() {
                if let Segment::LinearPath(rank) = segment {
                    if !seen.insert(*segment) {
                        shared.entry(*rank).or_default();
                    }
                }
            }
        }
        for id in self.paths() {
            for segment in self.path(id).segments() {
                if let Segment::LinearPath(rank) = segment {
                    if let Some(ids) = shared.get_mut(rank) {
                        ids.push(id);
                    }
                }
            }
        }

        let mut result = BTreeSet::new();
        for ids in shared.values_mut() {
            ids.sort_unstable();
            ids.dedup();
            for j in 0..ids.len() {
                let u = self.path(ids[j]).segments();
                for k in (j + 1)..ids.len() {
                    let v = self.path(ids[k]).segments();
                    if entails(u, v) {
                        result.insert(ids[k]);
                    } else if entails(v, u) {
                        result.insert(ids[j]);
                    }
                }
            }
        }
        result
    }

    /// Writes the contigs of the paths.
    ///
    /// Paths shorter than `params.min_length` bases are skipped.
    /// Unless `params.print_rcs` is set, only the orientation with the smaller identifier is printed.
    /// Unless `params.print_entailed` is set, paths contained in other paths are skipped.
    /// The output is FASTA, or a tab-separated table of statistics if `params.omit_sequence` is set.
    pub fn print_contigs<W: Write>(&self, graph: &Graph, params: &ContigParams, out: &mut W) -> io::Result<()> {
        let entailed = if params.print_entailed { BTreeSet::new() } else { self.entailed_paths() };
        if params.omit_sequence {
            writeln!(out, "Id\tLength\tSegmentLengths\tSegmentStarts\tRevCompId\tSuccessorIds\tMinCov\tMaxCov\tMeanCov\tStdDevCov")?;
        }

        for id in self.paths() {
            if entailed.contains(&id) {
                continue;
            }
            let rc = self.reverse_complement(id);
            if !params.print_rcs && id > rc {
                continue;
            }
            self.print_contig(graph, id, params, out)?;
        }
        Ok(())
    }

    fn print_contig<W: Write>(&self, graph: &Graph, id: SuperPathId, params: &ContigParams, out: &mut W) -> io::Result<()> {
        let entries = self.entries();
        let mut builder = ContigBuilder::new(graph);
        let mut lengths: Vec<String> = Vec::new();
        let mut starts: Vec<String> = Vec::new();
        for segment in self.path(id).segments() {
            builder.add_segment(entries, *segment);
            let len = segment.length(entries);
            lengths.push(len.to_string());
            if segment.is_gap() {
                starts.push(format!("{}g", len));
            } else {
                starts.push(segment.to_string());
            }
        }
        let contig = builder.truncated();
        if contig.len() < params.min_length {
            return Ok(());
        }

        let rc = self.reverse_complement(id);
        let successors: Vec<String> = self.successors(self.end(id)).iter().map(|x| x.to_string()).collect();
        let stats = [
            builder.min().to_string(), builder.max().to_string(),
            format_float(builder.mean()), format_float(builder.std_dev()),
        ];
        if params.omit_sequence {
            writeln!(
                out, "{}\t{}\t[{}]\t[{}]\t{}\t[{}]\t{}",
                id, contig.len(), lengths.join(":"), starts.join(":"), rc, successors.join(":"), stats.join("\t")
            )?;
        } else {
            write!(out, ">{}", id)?;
            if params.verbose_headers {
                write!(
                    out, " {},[{}],[{}],{},[{}],{}",
                    contig.len(), lengths.join(":"), starts.join(":"), rc, successors.join(":"), stats.join(",")
                )?;
            }
            writeln!(out)?;
            write_sequence(out, contig.as_bytes(), params.line_width)?;
        }
        Ok(())
    }
}

// Returns `true` if `rhs` occurs in `lhs` as a contiguous run.
fn entails(lhs: &[Segment], rhs: &[Segment]) -> bool {
    if rhs.is_empty() || rhs.len() > lhs.len() {
        return false;
    }
    lhs.windows(rhs.len()).any(|window| window == rhs)
}

//-----------------------------------------------------------------------------

/// Writes the linear segments of the graph as contigs.
///
/// This is used when there is no supergraph.
/// Contigs are numbered from 1.
/// The reverse complement of a printed segment is never printed.
/// Segments are skipped if they are shorter than `params.min_length` bases or if any edge has coverage below `params.min_coverage`.
/// The output is FASTA, or a tab-separated table of statistics if `params.omit_sequence` is set.
pub fn print_linear_segments<W: Write>(graph: &Graph, params: &ContigParams, out: &mut W) -> io::Result<()> {
    let k = graph.K();
    let mut seen = vec![false; graph.count()];
    if params.omit_sequence {
        writeln!(out, "Number\tLength\tMinCov\tMaxCov\tMeanCov\tStdDevCov")?;
    }

    let mut contig_id = 1;
    for rank in 0..graph.count() {
        let begin = graph.select(rank);
        let from = graph.from(begin);
        if graph.in_degree(from) == 1 && graph.out_degree(from) == 1 {
            continue;
        }
        if seen[rank] {
            continue;
        }

        let mut edges: Vec<(Edge, usize)> = Vec::new();
        let end = graph.linear_path(begin, |edge, r| {
            edges.push((edge, r));
            true
        });
        seen[rank] = true;
        seen[graph.rank(graph.reverse_complement_edge(end))] = true;

        let mut min = u64::MAX;
        let mut max = 0;
        let mut sum = 0;
        let mut sum2 = 0;
        for (edge, r) in edges.iter() {
            seen[*r] = true;
            if !params.print_rcs {
                seen[graph.rank(graph.reverse_complement_edge(*edge))] = true;
            }
            let count = graph.multiplicity(*r);
            min = min.min(count);
            max = max.max(count);
            sum += count;
            sum2 += count * count;
        }

        let first = graph.from(edges[0].0);
        let include_first = graph.in_degree(first) == 0 || graph.canonical(first);
        let last = graph.to(edges[edges.len() - 1].0);
        let include_last = graph.out_degree(last) == 0 || !graph.canonical(last);
        let mut len = edges.len() + k;
        if len >= k && !include_first {
            len -= k;
        }
        if len >= k && !include_last {
            len -= k;
        }
        if len < params.min_length || min < params.min_coverage {
            continue;
        }

        let n = edges.len() as f64;
        let mean = sum as f64 / n;
        let std_dev = (sum2 as f64 / n - mean * mean).max(0.0).sqrt();
        if params.omit_sequence {
            writeln!(out, "{}\t{}\t{}\t{}\t{}\t{}", contig_id, edges.len() + k, min, max, format_float(mean), format_float(std_dev))?;
        } else {
            write!(out, ">{}", contig_id)?;
            if params.verbose_headers {
                write!(out, " {}:{}:{}:{}:{}", edges.len() + k, min, max, format_float(mean), format_float(std_dev))?;
            }
            writeln!(out)?;
            let mut sequence = kmer::to_string(edges[0].0.0, k + 1).into_bytes();
            for (edge, _) in edges.iter().skip(1) {
                sequence.push(kmer::base(edge.0, k + 1, k));
            }
            let offset = if include_first { 0 } else { k };
            write_sequence(out, &sequence[offset..offset + len], params.line_width)?;
        }
        contig_id += 1;
    }
    Ok(())
}

//-----------------------------------------------------------------------------

// Writes the sequence in lines of `width` bases, or on a single line if `width` is 0.
fn write_sequence<W: Write>(out: &mut W, sequence: &[u8], width: usize) -> io::Result<()> {
    let width = if width == 0 { sequence.len().max(1) } else { width };
    for line in sequence.chunks(width) {
        out.write_all(line)?;
        writeln!(out)?;
    }
    Ok(())
}

// Formats the value with six significant digits without trailing zeros.
fn format_float(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    if value == 0.0 {
        return String::from("0");
    }
    let magnitude = value.abs().log10().floor() as i64;
    let precision = (5 - magnitude).max(0) as usize;
    let result = format!("{:.*}", precision, value);
    if result.contains('.') {
        result.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        result
    }
}

//-----------------------------------------------------------------------------
