/*!
 * Pool Allocator Implementation
 * Allocation, release and resize logic
 */

use super::free_list::FreeBlock;
use super::{PoolAllocator, PoolState};
use crate::core::limits::ALIGNMENT;
use crate::core::types::{align_up, Address, Size};
use crate::memory::config::SelectionPolicy;
use crate::memory::types::{BlockHeader, MemoryError, MemoryPressure, MemoryResult, HEADER_SIZE};
use log::{debug, error, warn};

impl PoolAllocator {
    /// Allocate a zero-filled payload of `size` bytes rounded up to a multiple of 4
    pub fn allocate(&self, size: Size) -> MemoryResult<Address> {
        self.state.lock().allocate(size)
    }

    /// Return a payload to the free list. `None` is a no-op
    ///
    /// Adjacent free blocks are never merged.
    pub fn release<A: Into<Option<Address>>>(&self, address: A) -> MemoryResult<()> {
        match address.into() {
            Some(address) => self.state.lock().release(address),
            None => Ok(()),
        }
    }

    /// Grow an allocation, moving it when it does not already fit
    ///
    /// - `None` address: same as `allocate(new_size)`
    /// - `new_size == 0`: same as `release(address)`, yields `None`
    /// - block already holds `new_size` bytes: same address, no shrink
    ///
    /// On failure the original allocation is left untouched.
    pub fn resize<A: Into<Option<Address>>>(
        &self,
        address: A,
        new_size: Size,
    ) -> MemoryResult<Option<Address>> {
        self.state.lock().resize(address.into(), new_size)
    }
}

impl PoolState {
    pub(super) fn allocate(&mut self, requested: Size) -> MemoryResult<Address> {
        let size = match align_up(requested, ALIGNMENT) {
            Some(size) => size,
            None => return Err(self.allocation_failed(requested)),
        };

        let block = match self.take_block(size) {
            Some(block) => block,
            None => return Err(self.allocation_failed(size)),
        };

        if !self.headers.contains_key(&block.address) {
            error!("Free list entry 0x{:x} has no block header", block.address);
            return Err(MemoryError::CorruptionDetected(block.address));
        }

        let mut block_size = block.size;
        if block.size > size + HEADER_SIZE {
            let remainder = FreeBlock {
                address: block.address + size + HEADER_SIZE,
                size: block.size - size - HEADER_SIZE,
            };
            self.headers
                .insert(remainder.address, BlockHeader::free(remainder.size));
            self.push_free(remainder);
            block_size = size;

            debug!(
                "Split block at 0x{:x}: keeping {} bytes, returning {} bytes at 0x{:x} to free list",
                block.address, size, remainder.size, remainder.address
            );
        }

        self.headers
            .insert(block.address, BlockHeader::in_use(block_size));
        self.allocated_blocks += 1;
        self.allocated_bytes += block_size;
        self.memory[block.address..block.address + block_size].fill(0);

        self.report_allocation(block.address, block_size);
        Ok(block.address)
    }

    pub(super) fn release(&mut self, address: Address) -> MemoryResult<()> {
        let header = match self.headers.get_mut(&address) {
            Some(header) => header,
            None => {
                warn!("Attempted to release invalid address 0x{:x}", address);
                return Err(MemoryError::InvalidAddress(address));
            }
        };

        if header.is_free {
            warn!("Attempted to release already free block at 0x{:x}", address);
            return Err(MemoryError::AlreadyFree(address));
        }

        header.is_free = true;
        let size = header.size;
        self.allocated_blocks -= 1;
        self.allocated_bytes -= size;
        self.push_free(FreeBlock { address, size });

        debug!("Freed block at 0x{:x} ({} bytes)", address, size);
        Ok(())
    }

    pub(super) fn resize(
        &mut self,
        address: Option<Address>,
        new_size: Size,
    ) -> MemoryResult<Option<Address>> {
        let address = match address {
            Some(address) => address,
            None => return self.allocate(new_size).map(Some),
        };

        if new_size == 0 {
            self.release(address)?;
            return Ok(None);
        }

        let current = self.live_header(address)?.size;
        if current >= new_size {
            return Ok(Some(address));
        }

        let new_address = self.allocate(new_size)?;
        self.memory
            .copy_within(address..address + current, new_address);
        self.release(address)?;

        debug!(
            "Reallocated block from 0x{:x} to 0x{:x} with {} bytes",
            address, new_address, new_size
        );
        Ok(Some(new_address))
    }

    /// Header of a live allocation
    pub(super) fn live_header(&self, address: Address) -> MemoryResult<BlockHeader> {
        match self.headers.get(&address) {
            Some(header) if !header.is_free => Ok(*header),
            _ => Err(MemoryError::InvalidAddress(address)),
        }
    }

    /// Pick a free block of at least `size` bytes according to the policy
    fn take_block(&mut self, size: Size) -> Option<FreeBlock> {
        match self.config.policy {
            SelectionPolicy::SmallestOnly => {
                let block = self.pop_free()?;
                if block.size < size {
                    // The undersized block does not go back on the free list
                    self.record_leak(block);
                    return None;
                }
                Some(block)
            }
            SelectionPolicy::BestFit => {
                let mut undersized = Vec::new();
                let found = loop {
                    match self.pop_free() {
                        Some(block) if block.size >= size => break Some(block),
                        Some(block) => undersized.push(block),
                        None => break None,
                    }
                };
                for block in undersized {
                    self.push_free(block);
                }
                found
            }
        }
    }

    fn pop_free(&mut self) -> Option<FreeBlock> {
        let block = self.free_list.pop()?;
        self.free_bytes -= block.size;
        Some(block)
    }

    /// Push onto the free list; a full list drops the block
    pub(super) fn push_free(&mut self, block: FreeBlock) -> bool {
        match self.free_list.push(block) {
            Ok(()) => {
                self.free_bytes += block.size;
                true
            }
            Err(e) => {
                error!("{}", e);
                self.record_leak(block);
                false
            }
        }
    }

    fn record_leak(&mut self, block: FreeBlock) {
        self.leaked_blocks += 1;
        self.leaked_bytes += block.size;
        warn!(
            "Block at 0x{:x} ({} bytes) is no longer reachable from the free list ({} leaked blocks, {} bytes)",
            block.address, block.size, self.leaked_blocks, self.leaked_bytes
        );
    }

    fn allocation_failed(&mut self, size: Size) -> MemoryError {
        self.failed_allocations += 1;
        error!(
            "No block available for size {} ({} bytes free in {} blocks)",
            size,
            self.free_bytes,
            self.free_list.len()
        );
        MemoryError::NoBlockAvailable { requested: size }
    }

    fn report_allocation(&self, address: Address, size: Size) {
        let pressure = self.pressure();
        match pressure {
            MemoryPressure::High | MemoryPressure::Critical => warn!(
                "Memory pressure {}: allocated {} bytes at 0x{:x} ({} / {} bytes used)",
                pressure,
                size,
                address,
                self.used(),
                self.pool_size()
            ),
            _ => debug!("Allocated {} bytes at 0x{:x}", size, address),
        }
    }
}
