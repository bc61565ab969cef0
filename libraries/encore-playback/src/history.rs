//! Playback history tracking
//!
//! Bounded record of previously current queue indices, used by "previous"
//! while shuffling.

use std::collections::VecDeque;

/// Playback history with bounded size
///
/// Most recent entry is at the back; the oldest is discarded when full.
#[derive(Debug, Clone)]
pub struct History {
    indices: VecDeque<usize>,
    max_size: usize,
}

impl History {
    /// Create new history with specified maximum size
    pub fn new(max_size: usize) -> Self {
        Self {
            indices: VecDeque::with_capacity(max_size),
            max_size,
        }
    }

    /// Record an index; the oldest entry is dropped when full
    pub fn push(&mut self, index: usize) {
        if self.max_size == 0 {
            return;
        }
        if self.indices.len() >= self.max_size {
            self.indices.pop_front();
        }
        self.indices.push_back(index);
    }

    /// Pop the most recent index
    pub fn pop(&mut self) -> Option<usize> {
        self.indices.pop_back()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn clear(&mut self) {
        self.indices.clear();
    }

    /// Rewrite every entry after the queue changed shape
    ///
    /// Entries mapped to `None` are dropped.
    pub fn remap(&mut self, mut map: impl FnMut(usize) -> Option<usize>) {
        self.indices = self.indices.drain(..).filter_map(&mut map).collect();
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(50)
    }
}
