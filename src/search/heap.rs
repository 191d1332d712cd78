use std::cmp::{Ordering, Reverse};
use std::collections::{BTreeMap, BinaryHeap};

use clap::ValueEnum;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

/// Priority queue used as an open list. Lower keys come out first.
pub trait Heap<T> {
    fn add(&mut self, key: f64, value: T);

    fn remove_min(&mut self) -> Option<T>;

    fn size(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.size() == 0
    }

    fn clear(&mut self);

    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum HeapKind {
    #[default]
    #[serde(rename = "binary")]
    #[value(name = "binary")]
    Binary,
    #[serde(rename = "btree")]
    #[value(name = "btree")]
    BTree,
}

impl HeapKind {
    pub fn create<T: 'static>(self) -> Box<dyn Heap<T>> {
        match self {
            HeapKind::Binary => Box::new(BinaryHeapQueue::new()),
            HeapKind::BTree => Box::new(BTreeQueue::new()),
        }
    }
}

// Entries with equal keys leave in insertion order.
#[derive(Debug)]
struct HeapEntry<T> {
    key: OrderedFloat<f64>,
    sequence: u64,
    value: T,
}

impl<T> PartialEq for HeapEntry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.sequence == other.sequence
    }
}

impl<T> Eq for HeapEntry<T> {}

impl<T> PartialOrd for HeapEntry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for HeapEntry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key
            .cmp(&other.key)
            .then_with(|| self.sequence.cmp(&other.sequence))
    }
}

/// Binary heap over `std::collections::BinaryHeap`.
#[derive(Debug)]
pub struct BinaryHeapQueue<T> {
    heap: BinaryHeap<Reverse<HeapEntry<T>>>,
    sequence: u64,
}

impl<T> BinaryHeapQueue<T> {
    pub fn new() -> Self {
        BinaryHeapQueue {
            heap: BinaryHeap::new(),
            sequence: 0,
        }
    }
}

impl<T> Default for BinaryHeapQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Heap<T> for BinaryHeapQueue<T> {
    fn add(&mut self, key: f64, value: T) {
        self.heap.push(Reverse(HeapEntry {
            key: OrderedFloat(key),
            sequence: self.sequence,
            value,
        }));
        self.sequence += 1;
    }

    fn remove_min(&mut self) -> Option<T> {
        self.heap.pop().map(|Reverse(entry)| entry.value)
    }

    fn size(&self) -> usize {
        self.heap.len()
    }

    fn clear(&mut self) {
        self.heap.clear();
        self.sequence = 0;
    }

    fn name(&self) -> &'static str {
        "binary heap"
    }
}

/// Ordered-map open list.
#[derive(Debug)]
pub struct BTreeQueue<T> {
    entries: BTreeMap<(OrderedFloat<f64>, u64), T>,
    sequence: u64,
}

impl<T> BTreeQueue<T> {
    pub fn new() -> Self {
        BTreeQueue {
            entries: BTreeMap::new(),
            sequence: 0,
        }
    }
}

impl<T> Default for BTreeQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Heap<T> for BTreeQueue<T> {
    fn add(&mut self, key: f64, value: T) {
        self.entries
            .insert((OrderedFloat(key), self.sequence), value);
        self.sequence += 1;
    }

    fn remove_min(&mut self) -> Option<T> {
        self.entries.pop_first().map(|(_, value)| value)
    }

    fn size(&self) -> usize {
        self.entries.len()
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.sequence = 0;
    }

    fn name(&self) -> &'static str {
        "btree"
    }
}

/// Last in, first out; keys are ignored. Gives depth-first order.
#[derive(Debug)]
pub struct LifoStack<T> {
    stack: Vec<T>,
}

impl<T> LifoStack<T> {
    pub fn new() -> Self {
        LifoStack { stack: Vec::new() }
    }
}

impl<T> Default for LifoStack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Heap<T> for LifoStack<T> {
    fn add(&mut self, _key: f64, value: T) {
        self.stack.push(value);
    }

    fn remove_min(&mut self) -> Option<T> {
        self.stack.pop()
    }

    fn size(&self) -> usize {
        self.stack.len()
    }

    fn clear(&mut self) {
        self.stack.clear();
    }

    fn name(&self) -> &'static str {
        "stack"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(heap: &mut dyn Heap<&'static str>) -> Vec<&'static str> {
        let mut values = Vec::new();
        while let Some(value) = heap.remove_min() {
            values.push(value);
        }
        values
    }

    fn fill(heap: &mut dyn Heap<&'static str>) {
        heap.add(3.0, "c");
        heap.add(1.5, "a");
        heap.add(2.0, "b1");
        heap.add(2.0, "b2");
    }

    #[test]
    fn test_heaps_order_by_key_then_insertion() {
        for kind in [HeapKind::Binary, HeapKind::BTree] {
            let mut heap = kind.create::<&'static str>();
            fill(heap.as_mut());
            assert_eq!(heap.size(), 4);
            assert_eq!(drain(heap.as_mut()), vec!["a", "b1", "b2", "c"]);
            assert!(heap.is_empty());
        }
    }

    #[test]
    fn test_clear() {
        let mut heap = BinaryHeapQueue::new();
        fill(&mut heap);
        heap.clear();
        assert_eq!(heap.size(), 0);
        assert_eq!(heap.remove_min(), None);
    }

    #[test]
    fn test_lifo_stack_ignores_keys() {
        let mut stack = LifoStack::new();
        fill(&mut stack);
        assert_eq!(drain(&mut stack), vec!["b2", "b1", "a", "c"]);
    }
}
