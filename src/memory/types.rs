/*!
 * Memory Types
 * Common types for pool management
 */

use crate::core::types::{Address, Size};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Memory operation result
pub type MemoryResult<T> = Result<T, MemoryError>;

/// Memory errors
#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum MemoryError {
    #[error("Failed to reserve {requested} bytes for the memory pool")]
    #[diagnostic(
        code(pool::reservation_failed),
        help("The backing region could not be reserved. Try a smaller pool size.")
    )]
    PoolReservation { requested: usize },

    #[error("Pool size {size} bytes cannot hold a single {header} byte block header")]
    #[diagnostic(code(pool::too_small))]
    PoolTooSmall { size: usize, header: usize },

    #[error("Invalid pool configuration: {0}")]
    #[diagnostic(code(pool::invalid_config))]
    InvalidConfig(String),

    #[error("No block available for size {requested}")]
    #[diagnostic(
        code(pool::no_block_available),
        help("The pool is exhausted or too fragmented. Release blocks and retry.")
    )]
    NoBlockAvailable { requested: usize },

    #[error("Invalid memory address: 0x{0:x}")]
    #[diagnostic(code(pool::invalid_address))]
    InvalidAddress(usize),

    #[error("Block at 0x{0:x} is already free")]
    #[diagnostic(code(pool::already_free), help("Each allocation may be released only once."))]
    AlreadyFree(usize),

    #[error("Free list overflow: capacity {capacity} reached, block at 0x{address:x} ({size} bytes) dropped")]
    #[diagnostic(code(pool::free_list_overflow))]
    FreeListOverflow {
        capacity: usize,
        address: usize,
        size: usize,
    },

    #[error("Access out of bounds: offset {offset} + {len} bytes exceeds block at 0x{address:x} ({size} bytes)")]
    #[diagnostic(code(pool::out_of_bounds))]
    OutOfBounds {
        address: usize,
        offset: usize,
        len: usize,
        size: usize,
    },

    #[error("Memory corruption detected at 0x{0:x}")]
    #[diagnostic(code(pool::corruption))]
    CorruptionDetected(usize),
}

/// Bookkeeping for one block, allocated or free
///
/// Kept in a side table keyed by payload address. The pool still reserves
/// `HEADER_SIZE` bytes in front of every payload for it.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
    /// Usable payload bytes, header excluded
    pub size: Size,
    pub is_free: bool,
}

/// Bytes reserved in front of every payload
pub const HEADER_SIZE: Size = std::mem::size_of::<BlockHeader>();

impl BlockHeader {
    pub fn free(size: Size) -> Self {
        Self {
            size,
            is_free: true,
        }
    }

    pub fn in_use(size: Size) -> Self {
        Self {
            size,
            is_free: false,
        }
    }

    /// Bytes of pool address space the block occupies, header included
    pub fn extent(&self) -> Size {
        self.size + HEADER_SIZE
    }
}

/// Snapshot of one block, as seen walking the pool in address order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockInfo {
    pub address: Address,
    pub size: Size,
    pub is_free: bool,
    /// False for a free block that was dropped from the free list
    pub in_free_list: bool,
}

/// Pool statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolStats {
    pub pool_size: usize,
    pub header_size: usize,
    pub allocated_blocks: usize,
    pub allocated_bytes: usize,
    pub free_blocks: usize,
    pub free_bytes: usize,
    pub largest_free_block: usize,
    pub leaked_blocks: usize,
    pub leaked_bytes: usize,
    pub failed_allocations: u64,
    pub free_list_len: usize,
    pub free_list_capacity: usize,
    pub usage_percentage: f64,
    pub warning_threshold: f64,
    pub critical_threshold: f64,
}

impl PoolStats {
    /// Pressure level under the pool's configured thresholds
    pub fn memory_pressure(&self) -> MemoryPressure {
        MemoryPressure::from_ratio(
            self.usage_percentage / 100.0,
            self.warning_threshold,
            self.critical_threshold,
        )
    }
}

/// Memory pressure levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemoryPressure {
    Low,
    Medium,
    High,
    Critical,
}

impl MemoryPressure {
    pub fn from_ratio(ratio: f64, warning: f64, critical: f64) -> Self {
        if ratio >= critical {
            MemoryPressure::Critical
        } else if ratio >= warning {
            MemoryPressure::High
        } else if ratio >= crate::core::limits::MEDIUM_PRESSURE_RATIO {
            MemoryPressure::Medium
        } else {
            MemoryPressure::Low
        }
    }
}

impl std::fmt::Display for MemoryPressure {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            MemoryPressure::Low => write!(f, "LOW"),
            MemoryPressure::Medium => write!(f, "MEDIUM"),
            MemoryPressure::High => write!(f, "HIGH"),
            MemoryPressure::Critical => write!(f, "CRITICAL"),
        }
    }
}
