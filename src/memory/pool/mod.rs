/*!
 * Fixed-Size Memory Pool
 *
 * Serves sub-allocations out of one pre-reserved backing region.
 *
 * ## Layout
 *
 * Every block, allocated or free, occupies `HEADER_SIZE + size` bytes of the
 * pool. Headers live in a side table keyed by payload address, so recovering a
 * header from a payload address is a hash lookup rather than pointer arithmetic.
 * Walking the blocks in address order tiles the whole region.
 *
 * ## Allocation
 *
 * - **Size-ordered free list**: a capacity-bounded binary min-heap
 * - **Block splitting**: an oversized block gives back its tail as a new free block
 * - **No coalescing**: adjacent free blocks stay separate entries
 * - **Overflow**: a block that cannot be pushed onto a full free list is dropped
 *   and counted as leaked
 *
 * ## Concurrency
 *
 * One mutex per pool serializes every public operation end to end. Clones share
 * the same pool.
 */

mod allocator;
mod free_list;
mod inspect;
mod storage;

pub use free_list::{FreeBlock, MinHeapFreeList};

use super::config::PoolConfig;
use super::traits::{Allocator, MemoryInfo};
use super::types::{
    BlockHeader, BlockInfo, MemoryError, MemoryPressure, MemoryResult, PoolStats, HEADER_SIZE,
};
use crate::core::types::{Address, Size};
use ahash::RandomState;
use log::{error, info};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Unsynchronized pool bookkeeping. Callers hold the pool lock.
pub(super) struct PoolState {
    memory: Box<[u8]>,
    headers: HashMap<Address, BlockHeader, RandomState>,
    free_list: MinHeapFreeList,
    config: PoolConfig,
    // Payload bytes reachable through the free list
    free_bytes: Size,
    allocated_blocks: usize,
    allocated_bytes: Size,
    leaked_blocks: usize,
    leaked_bytes: Size,
    failed_allocations: u64,
}

impl PoolState {
    fn new(config: PoolConfig) -> MemoryResult<Self> {
        let size = config.pool_size;
        if size <= HEADER_SIZE {
            return Err(MemoryError::PoolTooSmall {
                size,
                header: HEADER_SIZE,
            });
        }

        let mut memory = Vec::new();
        memory
            .try_reserve_exact(size)
            .map_err(|_| MemoryError::PoolReservation { requested: size })?;
        memory.resize(size, 0u8);

        let mut state = Self {
            memory: memory.into_boxed_slice(),
            headers: HashMap::with_hasher(RandomState::new()),
            free_list: MinHeapFreeList::new(config.free_list_capacity),
            config,
            free_bytes: 0,
            allocated_blocks: 0,
            allocated_bytes: 0,
            leaked_blocks: 0,
            leaked_bytes: 0,
            failed_allocations: 0,
        };

        let initial = FreeBlock {
            address: HEADER_SIZE,
            size: size - HEADER_SIZE,
        };
        state
            .headers
            .insert(initial.address, BlockHeader::free(initial.size));
        state.push_free(initial);

        Ok(state)
    }

    fn pool_size(&self) -> Size {
        self.memory.len()
    }
}

/// Fixed-size memory pool allocator
///
/// # Example
///
/// ```
/// use heap_pool::PoolAllocator;
///
/// let pool = PoolAllocator::try_initialize(2048).unwrap();
/// let addr = pool.allocate(100).unwrap();
/// assert_eq!(pool.block_size(addr), Some(100));
///
/// pool.write_bytes(addr, 0, b"hello").unwrap();
/// let addr = pool.resize(addr, 400).unwrap().unwrap();
/// assert_eq!(pool.read_bytes(addr, 0, 5).unwrap(), b"hello");
///
/// pool.release(addr).unwrap();
/// ```
pub struct PoolAllocator {
    state: Arc<Mutex<PoolState>>,
}

impl PoolAllocator {
    /// Reserve a pool of `size` bytes, terminating the process on failure
    ///
    /// A pool that cannot secure its backing region has no recovery path.
    /// Use [`PoolAllocator::try_initialize`] to handle the error instead.
    pub fn initialize(size: Size) -> Self {
        Self::initialize_with(PoolConfig::new(size))
    }

    /// Reserve a pool described by `config`, terminating the process on failure
    pub fn initialize_with(config: PoolConfig) -> Self {
        match Self::with_config(config) {
            Ok(pool) => pool,
            Err(e) => {
                error!("Failed to initialize memory pool: {}", e);
                std::process::exit(1);
            }
        }
    }

    /// Reserve a pool of `size` bytes with default settings
    pub fn try_initialize(size: Size) -> MemoryResult<Self> {
        Self::with_config(PoolConfig::new(size))
    }

    /// Reserve a pool described by `config`
    pub fn with_config(config: PoolConfig) -> MemoryResult<Self> {
        config.validate()?;
        let state = PoolState::new(config)?;

        info!(
            "Memory pool initialized with {} bytes (free list capacity {}, {:?} selection)",
            state.pool_size(),
            state.config.free_list_capacity,
            state.config.policy
        );

        Ok(Self {
            state: Arc::new(Mutex::new(state)),
        })
    }

    pub fn config(&self) -> PoolConfig {
        self.state.lock().config.clone()
    }

    /// Total size of the backing region
    pub fn pool_size(&self) -> Size {
        self.state.lock().pool_size()
    }

    /// Check if an address is a live allocation
    pub fn is_valid(&self, address: Address) -> bool {
        self.state
            .lock()
            .headers
            .get(&address)
            .map_or(false, |header| !header.is_free)
    }

    /// Usable size of a live allocation
    pub fn block_size(&self, address: Address) -> Option<Size> {
        self.state
            .lock()
            .headers
            .get(&address)
            .filter(|header| !header.is_free)
            .map(|header| header.size)
    }

    /// Every block in address order
    pub fn blocks(&self) -> Vec<BlockInfo> {
        self.state.lock().blocks()
    }

    /// Verify the block layout and free-list bookkeeping
    pub fn check_integrity(&self) -> MemoryResult<()> {
        self.state.lock().check_integrity()
    }
}

impl Allocator for PoolAllocator {
    fn allocate(&self, size: Size) -> MemoryResult<Address> {
        PoolAllocator::allocate(self, size)
    }

    fn release(&self, address: Option<Address>) -> MemoryResult<()> {
        PoolAllocator::release(self, address)
    }

    fn resize(&self, address: Option<Address>, new_size: Size) -> MemoryResult<Option<Address>> {
        PoolAllocator::resize(self, address, new_size)
    }

    fn is_valid(&self, address: Address) -> bool {
        PoolAllocator::is_valid(self, address)
    }

    fn block_size(&self, address: Address) -> Option<Size> {
        PoolAllocator::block_size(self, address)
    }
}

impl MemoryInfo for PoolAllocator {
    fn stats(&self) -> PoolStats {
        self.state.lock().stats()
    }

    fn info(&self) -> (Size, Size, Size) {
        let state = self.state.lock();
        (state.pool_size(), state.used(), state.free_bytes)
    }

    fn pressure(&self) -> MemoryPressure {
        self.state.lock().pressure()
    }
}

impl Clone for PoolAllocator {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}
