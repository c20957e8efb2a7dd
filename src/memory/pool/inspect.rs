/*!
 * Pool Introspection
 * Statistics, block walks and integrity checks
 */

use super::PoolState;
use crate::core::types::{Address, Size};
use crate::memory::types::{
    BlockInfo, MemoryError, MemoryPressure, MemoryResult, PoolStats, HEADER_SIZE,
};
use ahash::RandomState;
use log::error;
use std::collections::HashSet;

impl PoolState {
    /// Pool bytes not reachable through the free list
    pub(super) fn used(&self) -> Size {
        self.pool_size() - self.free_bytes
    }

    pub(super) fn pressure(&self) -> MemoryPressure {
        self.stats().memory_pressure()
    }

    pub(super) fn stats(&self) -> PoolStats {
        let pool_size = self.pool_size();
        PoolStats {
            pool_size,
            header_size: HEADER_SIZE,
            allocated_blocks: self.allocated_blocks,
            allocated_bytes: self.allocated_bytes,
            // Leaked blocks are still free, just unreachable
            free_blocks: self.free_list.len() + self.leaked_blocks,
            free_bytes: self.free_bytes,
            largest_free_block: self.free_list.largest().unwrap_or(0),
            leaked_blocks: self.leaked_blocks,
            leaked_bytes: self.leaked_bytes,
            failed_allocations: self.failed_allocations,
            free_list_len: self.free_list.len(),
            free_list_capacity: self.free_list.capacity(),
            usage_percentage: (self.used() as f64 / pool_size as f64) * 100.0,
            warning_threshold: self.config.warning_threshold,
            critical_threshold: self.config.critical_threshold,
        }
    }

    fn free_list_addresses(&self) -> HashSet<Address, RandomState> {
        let mut addresses = HashSet::with_hasher(RandomState::new());
        addresses.extend(self.free_list.iter().map(|block| block.address));
        addresses
    }

    pub(super) fn blocks(&self) -> Vec<BlockInfo> {
        let listed = self.free_list_addresses();
        let mut blocks: Vec<BlockInfo> = self
            .headers
            .iter()
            .map(|(&address, header)| BlockInfo {
                address,
                size: header.size,
                is_free: header.is_free,
                in_free_list: listed.contains(&address),
            })
            .collect();
        blocks.sort_unstable_by_key(|block| block.address);
        blocks
    }

    pub(super) fn check_integrity(&self) -> MemoryResult<()> {
        // Blocks must tile [0, pool_size) with no gaps or overlaps
        let mut cursor: Size = 0;
        for block in self.blocks() {
            if block.address < HEADER_SIZE || block.address - HEADER_SIZE != cursor {
                return Err(corruption(block.address, "block does not start where the previous one ends"));
            }
            cursor = match block.address.checked_add(block.size) {
                Some(end) if end <= self.pool_size() => end,
                _ => return Err(corruption(block.address, "block extends past the end of the pool")),
            };
        }
        if cursor != self.pool_size() {
            return Err(corruption(cursor, "blocks do not cover the whole pool"));
        }

        // Free-list entries must mirror free headers exactly once
        let mut seen = HashSet::with_hasher(RandomState::new());
        let mut listed_bytes: Size = 0;
        for entry in self.free_list.iter() {
            match self.headers.get(&entry.address) {
                Some(header) if header.is_free && header.size == entry.size => {}
                _ => return Err(corruption(entry.address, "free list entry does not match a free block")),
            }
            if !seen.insert(entry.address) {
                return Err(corruption(entry.address, "block listed twice in the free list"));
            }
            listed_bytes += entry.size;
        }
        if listed_bytes != self.free_bytes {
            return Err(corruption(0, "free byte count out of sync with the free list"));
        }

        // Free blocks missing from the free list are exactly the leaked ones
        let free_headers = self.headers.values().filter(|h| h.is_free).count();
        if free_headers != self.free_list.len() + self.leaked_blocks {
            return Err(corruption(0, "unlisted free blocks do not match the leak count"));
        }

        let (in_use, in_use_bytes) = self
            .headers
            .values()
            .filter(|h| !h.is_free)
            .fold((0, 0), |(count, bytes), h| (count + 1, bytes + h.size));
        if in_use != self.allocated_blocks || in_use_bytes != self.allocated_bytes {
            return Err(corruption(0, "allocation counters out of sync with block headers"));
        }

        Ok(())
    }
}

fn corruption(address: Address, reason: &str) -> MemoryError {
    error!("Pool integrity check failed at 0x{:x}: {}", address, reason);
    MemoryError::CorruptionDetected(address)
}
