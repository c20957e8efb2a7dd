/*!
 * Memory Module
 * Fixed-size pool allocation
 */

pub mod config;
pub mod pool;
pub mod traits;
pub mod types;

// Re-export for convenience
pub use config::{PoolConfig, SelectionPolicy};
pub use pool::PoolAllocator;
pub use traits::*;
pub use types::*;
