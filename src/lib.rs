/*!
 * Heap Pool Library
 * Fixed-size memory pool allocator with a size-ordered free list
 */

pub mod core;
pub mod memory;
pub mod monitoring;

// Re-exports
pub use crate::core::types::{Address, Size};
pub use memory::{
    Allocator, BlockInfo, MemoryError, MemoryInfo, MemoryPressure, MemoryResult, PoolAllocator,
    PoolConfig, PoolStats, SelectionPolicy, HEADER_SIZE,
};
pub use monitoring::init_tracing;
