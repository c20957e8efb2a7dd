/*!
 * Pool Allocator Tests
 * Initialization, allocation, release and exhaustion behavior
 */

use heap_pool::{
    Allocator, MemoryError, MemoryInfo, PoolAllocator, PoolConfig, SelectionPolicy, HEADER_SIZE,
};
use pretty_assertions::assert_eq;

#[test]
fn test_pool_initialization() {
    let pool = PoolAllocator::try_initialize(2048).unwrap();
    let (total, used, available) = pool.info();

    assert_eq!(total, 2048);
    assert_eq!(used, HEADER_SIZE);
    assert_eq!(available, 2048 - HEADER_SIZE);

    let blocks = pool.blocks();
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].address, HEADER_SIZE);
    assert_eq!(blocks[0].size, 2048 - HEADER_SIZE);
    assert!(blocks[0].is_free);
}

#[test]
fn test_pool_too_small() {
    let result = PoolAllocator::try_initialize(HEADER_SIZE);
    assert!(matches!(result, Err(MemoryError::PoolTooSmall { .. })));
}

#[test]
fn test_pool_reservation_failure() {
    let result = PoolAllocator::try_initialize(usize::MAX);
    assert!(matches!(
        result,
        Err(MemoryError::PoolReservation {
            requested: usize::MAX
        })
    ));
}

#[test]
fn test_invalid_config_rejected() {
    let result = PoolAllocator::with_config(PoolConfig::new(4096).with_free_list_capacity(0));
    assert!(matches!(result, Err(MemoryError::InvalidConfig(_))));
}

#[test]
fn test_allocate_release_allocate_cycle() {
    let pool = PoolAllocator::try_initialize(2048).unwrap();

    let first = pool.allocate(128).expect("allocate 128");
    let second = pool.allocate(256).expect("allocate 256");
    assert_ne!(first, second);

    pool.release(first).unwrap();
    pool.release(second).unwrap();

    let again = pool.allocate(128).expect("allocate 128 after release");
    assert_eq!(again, first);
    assert!(pool.check_integrity().is_ok());
}

#[test]
fn test_allocation_rounds_to_four() {
    let pool = PoolAllocator::try_initialize(64 * 1024).unwrap();

    for size in 1..=64 {
        let addr = pool.allocate(size).unwrap();
        let usable = pool.block_size(addr).unwrap();
        assert_eq!(usable % 4, 0, "size {} gave usable {}", size, usable);
        assert!(usable >= size);
        assert!(usable < size + 4);
    }
    assert!(pool.check_integrity().is_ok());
}

#[test]
fn test_reused_block_is_zero_filled() {
    let pool = PoolAllocator::try_initialize(2048).unwrap();

    let addr = pool.allocate(64).unwrap();
    pool.with_payload_mut(addr, |payload| payload.fill(0xFF)).unwrap();
    pool.release(addr).unwrap();

    let reused = pool.allocate(64).unwrap();
    assert_eq!(reused, addr);
    assert_eq!(pool.read_bytes(reused, 0, 64).unwrap(), vec![0u8; 64]);
}

#[test]
fn test_release_none_is_noop() {
    let pool = PoolAllocator::try_initialize(2048).unwrap();
    let before = pool.stats();

    assert!(pool.release(None).is_ok());
    assert_eq!(pool.stats().free_blocks, before.free_blocks);
    assert_eq!(pool.stats().free_bytes, before.free_bytes);
}

#[test]
fn test_release_invalid_and_double_free() {
    let pool = PoolAllocator::try_initialize(2048).unwrap();
    let addr = pool.allocate(32).unwrap();

    assert_eq!(
        pool.release(addr + 4),
        Err(MemoryError::InvalidAddress(addr + 4))
    );

    pool.release(addr).unwrap();
    assert!(!pool.is_valid(addr));
    assert_eq!(pool.release(addr), Err(MemoryError::AlreadyFree(addr)));
    assert!(pool.check_integrity().is_ok());
}

#[test]
fn test_adjacent_free_blocks_are_not_coalesced() {
    let pool =
        PoolAllocator::with_config(PoolConfig::new(1024).with_policy(SelectionPolicy::BestFit))
            .unwrap();

    let a = pool.allocate(200).unwrap();
    let b = pool.allocate(200).unwrap();
    let rest = 1024 - 3 * HEADER_SIZE - 400;
    let c = pool.allocate(rest).unwrap();
    assert_eq!(b, a + 200 + HEADER_SIZE);
    assert_eq!(pool.stats().free_blocks, 0);

    pool.release(a).unwrap();
    pool.release(b).unwrap();

    // Merged, a and b would hold 400 + HEADER_SIZE bytes
    assert_eq!(
        pool.allocate(400),
        Err(MemoryError::NoBlockAvailable { requested: 400 })
    );

    let free: Vec<_> = pool.blocks().into_iter().filter(|b| b.is_free).collect();
    assert_eq!(free.len(), 2);
    assert!(free.iter().all(|block| block.size == 200));

    pool.release(c).unwrap();
    assert!(pool.check_integrity().is_ok());
}

#[test]
fn test_exhaustion_then_recovery() {
    let pool = PoolAllocator::try_initialize(4096).unwrap();

    let mut live = Vec::new();
    let err = loop {
        match pool.allocate(64) {
            Ok(addr) => live.push(addr),
            Err(e) => break e,
        }
        assert!(live.len() < 4096, "pool never reported exhaustion");
    };
    assert!(matches!(err, MemoryError::NoBlockAvailable { .. }));
    assert!(live.len() * (64 + HEADER_SIZE) <= 4096);
    assert!(pool.stats().failed_allocations >= 1);
    assert!(pool.check_integrity().is_ok());

    let count = live.len();
    for addr in live.drain(..) {
        pool.release(addr).unwrap();
    }

    for _ in 0..count {
        live.push(pool.allocate(64).expect("allocation after release"));
    }
    assert!(pool.check_integrity().is_ok());
}

#[test]
fn test_smallest_block_too_small_is_dropped() {
    let pool = PoolAllocator::try_initialize(1024).unwrap();
    let small = pool.allocate(8).unwrap();
    let _big = pool.allocate(512).unwrap();
    pool.release(small).unwrap();

    assert!(pool.allocate(64).is_err());

    let stats = pool.stats();
    assert_eq!(stats.leaked_blocks, 1);
    assert_eq!(stats.leaked_bytes, 8);

    let dropped = pool
        .blocks()
        .into_iter()
        .find(|block| block.address == small)
        .unwrap();
    assert!(dropped.is_free);
    assert!(!dropped.in_free_list);
    assert!(pool.check_integrity().is_ok());
}

#[test]
fn test_free_list_overflow_degrades_capacity() {
    let pool =
        PoolAllocator::with_config(PoolConfig::new(8192).with_free_list_capacity(4)).unwrap();

    let addrs: Vec<_> = (0..8).map(|_| pool.allocate(32).unwrap()).collect();
    for addr in &addrs {
        pool.release(*addr).unwrap();
    }

    let stats = pool.stats();
    assert_eq!(stats.free_list_len, 4);
    assert_eq!(stats.leaked_blocks, 5);
    assert_eq!(stats.allocated_blocks, 0);
    assert!(pool.check_integrity().is_ok());
}

#[test]
fn test_zero_size_allocation() {
    let pool = PoolAllocator::try_initialize(1024).unwrap();
    let a = pool.allocate(0).unwrap();
    let b = pool.allocate(0).unwrap();

    assert_ne!(a, b);
    assert_eq!(pool.block_size(a), Some(0));
    assert!(pool.check_integrity().is_ok());
}

#[test]
fn test_oversized_request_fails_cleanly() {
    let pool = PoolAllocator::try_initialize(1024).unwrap();

    assert!(matches!(
        pool.allocate(usize::MAX),
        Err(MemoryError::NoBlockAvailable { .. })
    ));
    assert!(pool.check_integrity().is_ok());
}

#[test]
fn test_allocator_trait_object() {
    let pool = PoolAllocator::try_initialize(2048).unwrap();
    let allocator: &dyn Allocator = &pool;

    let addr = allocator.allocate(10).unwrap();
    assert!(allocator.is_valid(addr));
    assert_eq!(allocator.block_size(addr), Some(12));
    assert_eq!(allocator.resize(Some(addr), 8).unwrap(), Some(addr));
    allocator.release(Some(addr)).unwrap();
    assert!(!allocator.is_valid(addr));
}

#[test]
fn test_clones_share_the_pool() {
    let pool = PoolAllocator::try_initialize(2048).unwrap();
    let other = pool.clone();

    let addr = pool.allocate(40).unwrap();
    assert!(other.is_valid(addr));
    other.release(addr).unwrap();
    assert!(!pool.is_valid(addr));
}
