use std::collections::VecDeque;

use crate::reading::Reading;

// Upfront allocation ceiling; larger buffers grow on demand.
const PREALLOC_LIMIT: usize = 64;

/// Fixed-capacity FIFO of readings, oldest first.
#[derive(Debug, Clone)]
pub struct ReadingBuffer {
    items: VecDeque<Reading>,
    capacity: usize,
}

impl ReadingBuffer {
    /// `capacity` is clamped to at least 1; configs are validated before this.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity.min(PREALLOC_LIMIT)),
            capacity,
        }
    }

    /// Appends `reading`, returning the evicted oldest entry once past capacity.
    pub fn push(&mut self, reading: Reading) -> Option<Reading> {
        self.items.push_back(reading);
        if self.items.len() > self.capacity {
            self.items.pop_front()
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn first(&self) -> Option<&Reading> {
        self.items.front()
    }

    pub fn last(&self) -> Option<&Reading> {
        self.items.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Reading> {
        self.items.iter()
    }

    pub fn snapshot(&self) -> Vec<Reading> {
        self.items.iter().cloned().collect()
    }
}
