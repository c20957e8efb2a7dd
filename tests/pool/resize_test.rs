/*!
 * Resize Tests
 * Growth, identity and edge cases of resize
 */

use heap_pool::{MemoryError, MemoryInfo, PoolAllocator, HEADER_SIZE};
use pretty_assertions::assert_eq;

fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8 + 1).collect()
}

#[test]
fn test_growth_preserves_contents() {
    let pool = PoolAllocator::try_initialize(4096).unwrap();
    let n = 128;

    let addr = pool.allocate(n).unwrap();
    pool.write_bytes(addr, 0, &pattern(n)).unwrap();

    let grown = pool.resize(addr, n * 2).unwrap().expect("resize returned a block");
    assert_ne!(grown, addr);
    assert_eq!(pool.read_bytes(grown, 0, n).unwrap(), pattern(n));
    assert_eq!(pool.read_bytes(grown, n, n).unwrap(), vec![0u8; n]);
    assert!(!pool.is_valid(addr));
    assert!(pool.check_integrity().is_ok());
}

#[test]
fn test_shrink_or_equal_returns_same_address() {
    let pool = PoolAllocator::try_initialize(2048).unwrap();
    let addr = pool.allocate(100).unwrap();
    pool.write_bytes(addr, 0, b"keep").unwrap();

    for size in [100, 64, 1] {
        assert_eq!(pool.resize(addr, size).unwrap(), Some(addr));
    }
    // No shrink happens in place
    assert_eq!(pool.block_size(addr), Some(100));
    assert_eq!(pool.read_bytes(addr, 0, 4).unwrap(), b"keep");
}

#[test]
fn test_resize_within_rounding_slack_is_in_place() {
    let pool = PoolAllocator::try_initialize(2048).unwrap();
    let addr = pool.allocate(5).unwrap();
    assert_eq!(pool.resize(addr, 8).unwrap(), Some(addr));
}

#[test]
fn test_resize_none_allocates() {
    let pool = PoolAllocator::try_initialize(2048).unwrap();

    let addr = pool.resize(None, 50).unwrap().expect("resize(None) allocates");
    assert_eq!(pool.block_size(addr), Some(52));
    assert_eq!(pool.read_bytes(addr, 0, 52).unwrap(), vec![0u8; 52]);
}

#[test]
fn test_resize_to_zero_releases() {
    let pool = PoolAllocator::try_initialize(2048).unwrap();
    let addr = pool.allocate(64).unwrap();

    assert_eq!(pool.resize(addr, 0).unwrap(), None);
    assert!(!pool.is_valid(addr));
    assert_eq!(pool.stats().allocated_blocks, 0);
}

#[test]
fn test_failed_growth_leaves_block_untouched() {
    let pool = PoolAllocator::try_initialize(512).unwrap();
    let addr = pool.allocate(64).unwrap();
    pool.write_bytes(addr, 0, &pattern(64)).unwrap();

    let err = pool.resize(addr, 4096).unwrap_err();
    assert_eq!(err, MemoryError::NoBlockAvailable { requested: 4096 });

    assert!(pool.is_valid(addr));
    assert_eq!(pool.block_size(addr), Some(64));
    assert_eq!(pool.read_bytes(addr, 0, 64).unwrap(), pattern(64));
}

#[test]
fn test_resize_released_address_is_rejected() {
    let pool = PoolAllocator::try_initialize(2048).unwrap();
    let addr = pool.allocate(64).unwrap();
    pool.release(addr).unwrap();

    assert_eq!(
        pool.resize(addr, 128),
        Err(MemoryError::InvalidAddress(addr))
    );
}

#[test]
fn test_resize_growth_cycle_matches_example_harness() {
    let pool = PoolAllocator::try_initialize(2048).unwrap();

    let addr = pool.allocate(128).unwrap();
    let addr = pool.resize(addr, 256).unwrap().unwrap();
    assert_eq!(pool.block_size(addr), Some(256));
    assert_eq!(addr, 128 + 2 * HEADER_SIZE);
    pool.release(addr).unwrap();
    assert!(pool.check_integrity().is_ok());
}
