/*!
 * Memory Traits
 * Allocator abstractions
 */

use super::types::*;
use crate::core::types::{Address, Size};

/// Allocator interface
pub trait Allocator: Send + Sync {
    /// Allocate a zero-filled payload of at least `size` bytes
    fn allocate(&self, size: Size) -> MemoryResult<Address>;

    /// Return a payload to the allocator. `None` is a no-op
    fn release(&self, address: Option<Address>) -> MemoryResult<()>;

    /// Grow a payload, or allocate/release at the edges
    ///
    /// `None` behaves as `allocate`, a zero size behaves as `release`.
    fn resize(&self, address: Option<Address>, new_size: Size) -> MemoryResult<Option<Address>>;

    /// Check if an address is a live allocation
    fn is_valid(&self, address: Address) -> bool;

    /// Get the usable size of a live allocation
    fn block_size(&self, address: Address) -> Option<Size>;
}

/// Memory statistics provider
pub trait MemoryInfo: Send + Sync {
    /// Get overall pool statistics
    fn stats(&self) -> PoolStats;

    /// Get memory info as (total, used, available)
    fn info(&self) -> (Size, Size, Size);

    /// Get memory pressure level
    fn pressure(&self) -> MemoryPressure {
        self.stats().memory_pressure()
    }
}
