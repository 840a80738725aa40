use super::*;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

//-----------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Item {
    key: usize,
    priority: u64,
}

impl HeapItem for Item {
    type Key = usize;
    type Priority = u64;

    fn key(&self) -> usize {
        self.key
    }

    fn priority(&self) -> u64 {
        self.priority
    }
}

fn check_heap(heap: &IndexedBinaryHeap<Item>, reference: &HashMap<usize, u64>, step: usize) {
    assert_eq!(heap.len(), reference.len(), "Wrong heap size at step {}", step);
    for slot in 2..=heap.len() {
        assert!(heap.priority_at(slot / 2) <= heap.priority_at(slot), "Heap property violated at slot {}, step {}", slot, step);
    }
    for (key, priority) in reference.iter() {
        let item = heap.get(key);
        assert_eq!(item, Some(&Item { key: *key, priority: *priority }), "Wrong item for key {} at step {}", key, step);
    }
    for (key, slot) in heap.slots.iter() {
        assert_eq!(heap.heap[slot - 1].key, *key, "Wrong slot for key {} at step {}", key, step);
    }
}

//-----------------------------------------------------------------------------

#[test]
fn empty_heap() {
    let mut heap: IndexedBinaryHeap<Item> = IndexedBinaryHeap::new();
    assert!(heap.is_empty(), "New heap is not empty");
    assert_eq!(heap.top(), None, "Empty heap has a top item");
    assert_eq!(heap.pop(), None, "Popped an item from an empty heap");
    assert_eq!(heap.remove(&3), None, "Removed an item from an empty heap");
    assert!(!heap.contains(&3), "Empty heap contains an item");
    heap.up(&3);
    heap.down(&3);
    assert!(heap.is_empty(), "Up/down created items");
}

#[test]
fn pop_in_order() {
    let mut heap = IndexedBinaryHeap::new();
    let priorities = [5, 1, 9, 3, 3, 7, 0, 8];
    for (key, priority) in priorities.iter().enumerate() {
        heap.push(Item { key, priority: *priority });
    }
    let mut popped = Vec::new();
    while let Some(item) = heap.pop() {
        assert!(!heap.contains(&item.key), "Popped item {} still in the heap", item.key);
        popped.push(item.priority);
    }
    let mut expected = priorities.to_vec();
    expected.sort_unstable();
    assert_eq!(popped, expected, "Items were not popped in priority order");
}

#[test]
#[should_panic]
fn duplicate_key() {
    let mut heap = IndexedBinaryHeap::new();
    heap.push(Item { key: 1, priority: 2 });
    heap.push(Item { key: 1, priority: 3 });
}

#[test]
fn change_priority() {
    let mut heap = IndexedBinaryHeap::new();
    for key in 0..10 {
        heap.push(Item { key, priority: 10 * key as u64 });
    }

    // Decrease.
    if let Some(item) = heap.get_mut(&7) {
        item.priority = 5;
    }
    heap.up(&7);
    assert_eq!(heap.pop(), Some(Item { key: 0, priority: 0 }), "Wrong first item");
    assert_eq!(heap.pop(), Some(Item { key: 7, priority: 5 }), "Decreased item did not move up");

    // Increase.
    if let Some(item) = heap.get_mut(&1) {
        item.priority = 1000;
    }
    heap.down(&1);
    assert_eq!(heap.top(), Some(&Item { key: 2, priority: 20 }), "Increased item did not move down");
}

#[test]
fn remove_moves_replacement_up() {
    // The last item replaces a removed item in a different subtree and must move up.
    let mut heap = IndexedBinaryHeap::new();
    let priorities = [0, 100, 1, 101, 102, 2, 3];
    for (key, priority) in priorities.iter().enumerate() {
        heap.push(Item { key, priority: *priority });
    }
    assert_eq!(heap.remove(&3), Some(Item { key: 3, priority: 101 }), "Wrong removed item");
    let mut reference: HashMap<usize, u64> = priorities.iter().copied().enumerate().collect();
    reference.remove(&3);
    check_heap(&heap, &reference, 0);
}

#[test]
fn random_operations() {
    let mut rng = StdRng::seed_from_u64(0x5EED);
    let mut heap = IndexedBinaryHeap::new();
    let mut reference: HashMap<usize, u64> = HashMap::new();
    let universe = 64;

    for step in 0..5000 {
        let key = rng.gen_range(0..universe);
        match rng.gen_range(0..5) {
            0 => {
                if !reference.contains_key(&key) {
                    let priority = rng.gen_range(0..1000);
                    heap.push(Item { key, priority });
                    reference.insert(key, priority);
                }
            },
            1 => {
                let expected = reference.values().min().copied();
                let popped = heap.pop();
                assert_eq!(popped.map(|item| item.priority), expected, "Wrong popped priority at step {}", step);
                if let Some(item) = popped {
                    reference.remove(&item.key);
                }
            },
            2 => {
                let expected = reference.remove(&key).map(|priority| Item { key, priority });
                assert_eq!(heap.remove(&key), expected, "Wrong removed item at step {}", step);
            },
            3 => {
                if let Some(priority) = reference.get_mut(&key) {
                    *priority /= 2;
                    if let Some(item) = heap.get_mut(&key) {
                        item.priority = *priority;
                    }
                    heap.up(&key);
                }
            },
            _ => {
                if let Some(priority) = reference.get_mut(&key) {
                    *priority += rng.gen_range(0..500);
                    if let Some(item) = heap.get_mut(&key) {
                        item.priority = *priority;
                    }
                    heap.down(&key);
                }
            },
        }
        check_heap(&heap, &reference, step);
    }
}

//-----------------------------------------------------------------------------
