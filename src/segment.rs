//! Superpath segments and the [`SuperPath`] view.
//!
//! A [`Segment`] is the basic component of a superpath: either a linear segment of the de Bruijn graph or a gap.
//! On disk, a segment is a packed [`u64`].
//! The two high bits select the variant:
//!
//! * `00`: linear segment; the low 62 bits are its rank in the [`EntryEdgeSet`].
//! * `01`: gap; the low 62 bits store the signed gap length biased by `MASK >> 1`.
//! * `10`: explicit sequence; the low 62 bits are stored as is.
//! * `11`: unknown; kept as the raw value.
//!
//! A gap may have a negative length.
//! When building contigs, a gap of length `n <= 0` means that the next segment overlaps the previous one by `-n` bases.

use crate::entry_edges::EntryEdgeSet;
use crate::graph::{Edge, Node};

use std::fmt;


//-----------------------------------------------------------------------------

/// Identifier of a superpath.
///
/// Identifiers are allocated in reverse complement pairs.
/// An identifier of a free slot is not a valid superpath.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SuperPathId(pub u64);

impl SuperPathId {
    /// Returns the identifier as an index into per-path arrays.
    #[inline]
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SuperPathId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for SuperPathId {
    fn from(value: u64) -> Self {
        SuperPathId(value)
    }
}

//-----------------------------------------------------------------------------

/// A component of a superpath.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Segment {
    /// A linear segment identified by its rank in the [`EntryEdgeSet`].
    LinearPath(u64),
    /// A run of unknown bases, or an overlap if the length is not positive.
    Gap(i64),
    /// An explicit sequence (payload only).
    Sequence(u64),
    /// A packed value with an unknown tag.
    Other(u64),
}

impl Segment {
    /// Mask for the payload bits.
    pub const MASK: u64 = 0x3FFF_FFFF_FFFF_FFFF;

    /// Bias added to gap lengths.
    pub const GAP_BIAS: i64 = (Self::MASK >> 1) as i64;

    const TAG_LINEAR: u64 = 0;
    const TAG_GAP: u64 = 1;
    const TAG_SEQUENCE: u64 = 2;

    /// Returns the packed 64-bit representation.
    ///
    /// # Panics
    ///
    /// Will panic if the payload does not fit in 62 bits.
    pub fn pack(&self) -> u64 {
        match self {
            Segment::LinearPath(rank) => {
                assert!(*rank <= Self::MASK, "Segment: linear path rank {} does not fit in 62 bits", rank);
                *rank
            },
            Segment::Gap(len) => {
                let biased = len.checked_add(Self::GAP_BIAS).filter(|x| *x >= 0 && *x as u64 <= Self::MASK);
                match biased {
                    Some(biased) => (Self::TAG_GAP << 62) | biased as u64,
                    None => panic!("Segment: gap length {} out of range", len),
                }
            },
            Segment::Sequence(value) => (Self::TAG_SEQUENCE << 62) | (value & Self::MASK),
            Segment::Other(value) => *value,
        }
    }

    /// Decodes a packed segment.
    pub fn unpack(value: u64) -> Self {
        match value >> 62 {
            Self::TAG_LINEAR => Segment::LinearPath(value & Self::MASK),
            Self::TAG_GAP => Segment::Gap((value & Self::MASK) as i64 - Self::GAP_BIAS),
            Self::TAG_SEQUENCE => Segment::Sequence(value & Self::MASK),
            _ => Segment::Other(value),
        }
    }

    /// Returns `true` if the segment is a gap.
    #[inline]
    pub fn is_gap(&self) -> bool {
        matches!(self, Segment::Gap(_))
    }

    /// Returns the rank of the linear segment, or [`None`] for other variants.
    #[inline]
    pub fn linear_path(&self) -> Option<usize> {
        match self {
            Segment::LinearPath(rank) => Some(*rank as usize),
            _ => None,
        }
    }

    /// Returns the length of the segment in edges.
    ///
    /// This is the segment length for a linear segment, the gap length for a gap, and 0 otherwise.
    pub fn length(&self, entries: &EntryEdgeSet) -> i64 {
        match self {
            Segment::LinearPath(rank) => entries.length(*rank as usize) as i64,
            Segment::Gap(len) => *len,
            _ => 0,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::LinearPath(rank) => write!(f, "{}", rank),
            Segment::Gap(len) => write!(f, "{}g", len),
            Segment::Sequence(value) => write!(f, "{}s", value),
            Segment::Other(value) => write!(f, "{:#x}", value),
        }
    }
}

//-----------------------------------------------------------------------------

/// A view of a superpath in a [`crate::SuperGraph`].
///
/// The view borrows the segments from the graph.
/// Operations that need the underlying segments take the [`EntryEdgeSet`] as an argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SuperPath<'a> {
    id: SuperPathId,
    segments: &'a [Segment],
    rc: SuperPathId,
}

impl<'a> SuperPath<'a> {
    /// Creates a new view.
    pub fn new(id: SuperPathId, segments: &'a [Segment], rc: SuperPathId) -> Self {
        SuperPath { id, segments, rc }
    }

    /// Returns the identifier of the path.
    #[inline]
    pub fn id(&self) -> SuperPathId {
        self.id
    }

    /// Returns the identifier of the reverse complement path.
    #[inline]
    pub fn reverse_complement(&self) -> SuperPathId {
        self.rc
    }

    /// Returns the segments of the path.
    #[inline]
    pub fn segments(&self) -> &'a [Segment] {
        self.segments
    }

    /// Returns `true` if the path consists of a single gap.
    pub fn is_gap(&self) -> bool {
        self.segments.len() == 1 && self.segments[0].is_gap()
    }

    /// Returns the length of the path in edges.
    pub fn size(&self, entries: &EntryEdgeSet) -> i64 {
        self.segments.iter().map(|segment| segment.length(entries)).sum()
    }

    /// Returns the length of the path in bases.
    ///
    /// Each gap is padded with `K` bases.
    pub fn base_size(&self, entries: &EntryEdgeSet) -> i64 {
        let k = entries.K() as i64;
        let mut result = k;
        for segment in self.segments.iter() {
            result += segment.length(entries);
            if segment.is_gap() {
                result += k;
            }
        }
        result
    }

    /// Returns the first edge of the path.
    ///
    /// This is the first edge of the first linear segment, so leading gaps are ignored.
    ///
    /// # Panics
    ///
    /// Will panic if the path has no linear segments.
    pub fn first_edge(&self, entries: &EntryEdgeSet) -> Edge {
        let first = self.segments.iter().find_map(|segment| segment.linear_path());
        match first {
            Some(rank) => entries.select(rank),
            None => panic!("SuperPath: path {} has no first edge", self.id),
        }
    }

    /// Returns the last edge of the path.
    ///
    /// This is the last edge of the last linear segment, so trailing gaps are ignored.
    ///
    /// # Panics
    ///
    /// Will panic if the path has no linear segments.
    pub fn last_edge(&self, entries: &EntryEdgeSet) -> Edge {
        let last = self.segments.iter().rev().find_map(|segment| segment.linear_path());
        match last {
            Some(rank) => entries.reverse_complement_edge(entries.select(entries.end_rank(rank))),
            None => panic!("SuperPath: path {} has no last edge", self.id),
        }
    }

    /// Returns the node the path starts from.
    pub fn start(&self, entries: &EntryEdgeSet) -> Node {
        entries.from(self.first_edge(entries))
    }

    /// Returns the node the path ends at.
    pub fn end(&self, entries: &EntryEdgeSet) -> Node {
        entries.to(self.last_edge(entries))
    }
}

impl fmt::Display for SuperPath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [", self.id)?;
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", segment)?;
        }
        write!(f, "] {}", self.rc)
    }
}

//-----------------------------------------------------------------------------
