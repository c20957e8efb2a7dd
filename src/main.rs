/*!
 * Heap Pool - Demo Entry Point
 *
 * Runs the allocate/release and resize scenarios against a pool built from
 * the environment, then prints the final pool statistics as JSON.
 */

use anyhow::Context;
use heap_pool::{init_tracing, monitoring::span_operation, MemoryInfo, PoolAllocator, PoolConfig};
use tracing::{error, info};

fn allocate_release_scenario(pool: &PoolAllocator) -> bool {
    let (first, second) = match (pool.allocate(128), pool.allocate(256)) {
        (Ok(first), Ok(second)) => (first, second),
        (first, second) => {
            error!(?first, ?second, "allocate/release scenario FAILED (allocate returned no block)");
            return false;
        }
    };

    if let Err(e) = pool.release(first).and_then(|_| pool.release(second)) {
        error!(error = %e, "allocate/release scenario FAILED (release)");
        return false;
    }

    info!("allocate/release scenario PASSED");
    true
}

fn resize_scenario(pool: &PoolAllocator) -> bool {
    let addr = match pool.allocate(128) {
        Ok(addr) => addr,
        Err(e) => {
            error!(error = %e, "resize scenario FAILED (allocate returned no block)");
            return false;
        }
    };

    let addr = match pool.resize(addr, 256) {
        Ok(Some(addr)) => addr,
        Ok(None) | Err(_) => {
            error!("resize scenario FAILED (resize returned no block)");
            return false;
        }
    };

    if let Err(e) = pool.release(addr) {
        error!(error = %e, "resize scenario FAILED (release)");
        return false;
    }

    info!("resize scenario PASSED");
    true
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = PoolConfig::from_env();
    info!(
        pool_size = config.pool_size,
        free_list_capacity = config.free_list_capacity,
        policy = ?config.policy,
        "Using fixed-size memory pool"
    );
    let pool = PoolAllocator::initialize_with(config);

    let scenarios: [(&str, fn(&PoolAllocator) -> bool); 2] = [
        ("allocate_release", allocate_release_scenario),
        ("resize", resize_scenario),
    ];

    let mut passed = true;
    for (name, scenario) in scenarios {
        let span = span_operation(name);
        let ok = span.in_scope(|| scenario(&pool));
        span.record_result(ok);
        passed &= ok;
    }

    let stats = serde_json::to_string_pretty(&pool.stats()).context("serializing pool stats")?;
    println!("{}", stats);

    if !passed {
        anyhow::bail!("one or more pool scenarios failed");
    }
    Ok(())
}
