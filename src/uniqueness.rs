//! A thread-safe cache for the uniqueness test of superpaths.

use crate::segment::SuperPathId;
use crate::supergraph::SuperGraph;

use std::sync::Mutex;

use simple_sds::raw_vector::{AccessRaw, RawVector};

#[cfg(test)]
mod tests;

//-----------------------------------------------------------------------------

/// Caches the results of [`SuperGraph::unique`] for a fixed expected coverage.
///
/// The cache can be shared between threads that only read the supergraph.
/// The test itself runs outside the lock, so concurrent queries for the same path may both compute it.
///
/// # Examples
///
/// ```
/// use supergraph::{EntryEdgeSet, Graph, SuperGraph, SuperPathId, UniquenessCache};
///
/// let sequences = vec![b"TGAGCCCTTTAT".to_vec()];
/// let graph = Graph::from_sequences(3, &sequences, 1).unwrap();
/// let sg = SuperGraph::new(EntryEdgeSet::build(&graph, false).unwrap());
///
/// let cache = UniquenessCache::new(&sg, 20.0);
/// // The paths are too short to be unique.
/// assert!(!cache.unique(SuperPathId(0)));
/// assert_eq!(cache.known(), 1);
/// ```
#[derive(Debug)]
pub struct UniquenessCache<'a> {
    graph: &'a SuperGraph,
    expected_coverage: f64,
    // (known, unique)
    state: Mutex<(RawVector, RawVector)>,
}

impl<'a> UniquenessCache<'a> {
    /// Creates an empty cache for the current identifier space of the supergraph.
    pub fn new(graph: &'a SuperGraph, expected_coverage: f64) -> Self {
        let len = graph.len();
        UniquenessCache {
            graph, expected_coverage,
            state: Mutex::new((RawVector::with_len(len, false), RawVector::with_len(len, false))),
        }
    }

    /// Returns the expected coverage used in the test.
    #[inline]
    pub fn expected_coverage(&self) -> f64 {
        self.expected_coverage
    }

    /// Returns `true` if the path looks unique.
    ///
    /// Results for identifiers beyond the identifier space at construction are not cached.
    pub fn unique(&self, id: SuperPathId) -> bool {
        if let Ok(state) = self.state.lock() {
            let (known, unique) = &*state;
            if id.index() < known.len() && known.bit(id.index()) {
                return unique.bit(id.index());
            }
        }

        let result = self.graph.unique(id, self.expected_coverage);
        if let Ok(mut state) = self.state.lock() {
            let (known, unique) = &mut *state;
            if id.index() < known.len() {
                known.set_bit(id.index(), true);
                unique.set_bit(id.index(), result);
            }
        }
        result
    }

    /// Returns the number of paths with a cached result.
    pub fn known(&self) -> usize {
        match self.state.lock() {
            Ok(state) => (0..state.0.len()).filter(|i| state.0.bit(*i)).count(),
            Err(_) => 0,
        }
    }
}

//-----------------------------------------------------------------------------
