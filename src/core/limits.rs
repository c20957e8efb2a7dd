/*!
 * Pool Limits and Constants
 *
 * Centralized location for allocator-wide limits and thresholds.
 */

// =============================================================================
// ALLOCATION
// =============================================================================

/// Payload size granularity (4 bytes)
/// Every request is rounded up to a multiple of this
pub const ALIGNMENT: usize = 4;

// =============================================================================
// POOL DEFAULTS
// =============================================================================

/// Default backing region size (2KB)
pub const DEFAULT_POOL_SIZE: usize = 2048;

/// Default free-list heap capacity (512 entries)
/// Pushes beyond this are dropped and accounted as leaked blocks
pub const DEFAULT_FREE_LIST_CAPACITY: usize = 512;

// =============================================================================
// MEMORY PRESSURE
// =============================================================================

/// Usage ratio at which pressure is reported as HIGH
pub const DEFAULT_WARNING_THRESHOLD: f64 = 0.80;

/// Usage ratio at which pressure is reported as CRITICAL
pub const DEFAULT_CRITICAL_THRESHOLD: f64 = 0.95;

/// Usage ratio at which pressure is reported as MEDIUM
pub const MEDIUM_PRESSURE_RATIO: f64 = 0.60;
