/*!
 * Size-Ordered Free List
 * Capacity-bounded binary min-heap of free blocks
 */

use crate::core::types::{Address, Size};
use crate::memory::types::{MemoryError, MemoryResult};

/// Free block awaiting reuse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeBlock {
    /// Payload address
    pub address: Address,
    /// Usable payload bytes
    pub size: Size,
}

/// Array-backed binary min-heap keyed by block size
///
/// - push: O(log n), rejected once `capacity` entries are held
/// - pop: O(log n), always yields the smallest block
///
/// Equal sizes come out in whatever order the heap array yields.
#[derive(Debug)]
pub struct MinHeapFreeList {
    blocks: Vec<FreeBlock>,
    capacity: usize,
}

impl MinHeapFreeList {
    pub fn new(capacity: usize) -> Self {
        Self {
            // Unbounded configurations must not reserve their whole capacity
            blocks: Vec::with_capacity(capacity.min(crate::core::limits::DEFAULT_FREE_LIST_CAPACITY)),
            capacity,
        }
    }

    pub fn push(&mut self, block: FreeBlock) -> MemoryResult<()> {
        if self.is_full() {
            return Err(MemoryError::FreeListOverflow {
                capacity: self.capacity,
                address: block.address,
                size: block.size,
            });
        }

        self.blocks.push(block);
        self.sift_up(self.blocks.len() - 1);
        Ok(())
    }

    pub fn pop(&mut self) -> Option<FreeBlock> {
        if self.blocks.is_empty() {
            return None;
        }

        let min = self.blocks.swap_remove(0);
        if !self.blocks.is_empty() {
            self.sift_down(0);
        }
        Some(min)
    }

    pub fn peek(&self) -> Option<&FreeBlock> {
        self.blocks.first()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.blocks.len() >= self.capacity
    }

    /// Entries in heap array order
    pub fn iter(&self) -> impl Iterator<Item = &FreeBlock> {
        self.blocks.iter()
    }

    /// Size of the largest entry, O(n)
    pub fn largest(&self) -> Option<Size> {
        self.blocks.iter().map(|b| b.size).max()
    }

    fn sift_up(&mut self, mut idx: usize) {
        while idx > 0 {
            let parent = (idx - 1) / 2;
            if self.blocks[parent].size <= self.blocks[idx].size {
                break;
            }
            self.blocks.swap(parent, idx);
            idx = parent;
        }
    }

    fn sift_down(&mut self, mut idx: usize) {
        let len = self.blocks.len();
        loop {
            let left = 2 * idx + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            let smallest = if right < len && self.blocks[right].size < self.blocks[left].size {
                right
            } else {
                left
            };
            if self.blocks[idx].size <= self.blocks[smallest].size {
                break;
            }
            self.blocks.swap(idx, smallest);
            idx = smallest;
        }
    }
}
