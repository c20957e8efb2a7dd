/*!
 * Core Types
 * Common types used across the allocator
 */

/// Payload address: byte offset of a payload inside the pool
pub type Address = usize;

/// Size type for memory operations
pub type Size = usize;

/// Round `size` up to the next multiple of `alignment` (a power of two).
/// Returns `None` when the rounded value does not fit in a `Size`.
#[inline]
pub const fn align_up(size: Size, alignment: Size) -> Option<Size> {
    match size.checked_add(alignment - 1) {
        Some(padded) => Some(padded & !(alignment - 1)),
        None => None,
    }
}
