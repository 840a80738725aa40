use super::*;

use crate::internal;

use std::thread;

//-----------------------------------------------------------------------------

// Returns the supergraph and the identifier of a long path that is unique with expected coverage 2.
fn long_path() -> (SuperGraph, SuperPathId) {
    let (_, mut sg) = internal::bubble_supergraph();
    let components = vec![SuperPathId(7), SuperPathId(4), SuperPathId(3)];
    let (fd, _) = sg.link(&components.repeat(6));
    (sg, fd)
}

//-----------------------------------------------------------------------------

#[test]
fn cached_results() {
    let (sg, fd) = long_path();
    let cache = UniquenessCache::new(&sg, 2.0);
    assert_eq!(cache.expected_coverage(), 2.0, "Wrong expected coverage");
    assert_eq!(cache.known(), 0, "New cache has results");

    for _ in 0..2 {
        assert!(cache.unique(fd), "The long path should be unique");
        assert!(!cache.unique(SuperPathId(7)), "A short path should not be unique");
    }
    assert_eq!(cache.known(), 2, "Wrong number of cached results");

    let cache = UniquenessCache::new(&sg, 1.0);
    assert!(!cache.unique(fd), "The long path should not be unique with expected coverage 1");
}

#[test]
fn matches_supergraph() {
    let (sg, _) = long_path();
    let cache = UniquenessCache::new(&sg, 2.0);
    for id in sg.paths() {
        assert_eq!(cache.unique(id), sg.unique(id, 2.0), "Wrong result for path {}", id);
    }
}

#[test]
fn gap_paths() {
    let (mut sg, _) = long_path();
    let gap = sg.gap_path(100);
    let cache = UniquenessCache::new(&sg, 2.0);
    assert!(!cache.unique(gap), "A gap path should not be unique");
    assert!(!cache.unique(sg.reverse_complement(gap)), "A gap path should not be unique");
    assert_eq!(cache.known(), 2, "Gap results were not cached");
}

#[test]
fn shared_between_threads() {
    let (sg, fd) = long_path();
    let cache = UniquenessCache::new(&sg, 2.0);
    let ids: Vec<SuperPathId> = sg.paths().collect();
    thread::scope(|scope| {
        for _ in 0..4 {
            let cache = &cache;
            let ids = &ids;
            scope.spawn(move || {
                for id in ids.iter() {
                    let _ = cache.unique(*id);
                }
            });
        }
    });
    assert_eq!(cache.known(), ids.len(), "Wrong number of cached results");
    assert!(cache.unique(fd), "Wrong cached result for the long path");
}

//-----------------------------------------------------------------------------
