/*!
 * Payload Storage Operations
 * Read/write access to allocated payloads
 */

use super::{PoolAllocator, PoolState};
use crate::core::types::{Address, Size};
use crate::memory::types::{MemoryError, MemoryResult};
use std::ops::Range;

impl PoolState {
    /// Byte range of `len` bytes at `offset` inside a live payload
    fn payload_range(&self, address: Address, offset: Size, len: Size) -> MemoryResult<Range<usize>> {
        let size = self.live_header(address)?.size;
        match offset.checked_add(len) {
            Some(end) if end <= size => Ok(address + offset..address + end),
            _ => Err(MemoryError::OutOfBounds {
                address,
                offset,
                len,
                size,
            }),
        }
    }

    fn payload(&self, address: Address) -> MemoryResult<&[u8]> {
        let size = self.live_header(address)?.size;
        Ok(&self.memory[address..address + size])
    }

    fn payload_mut(&mut self, address: Address) -> MemoryResult<&mut [u8]> {
        let size = self.live_header(address)?.size;
        Ok(&mut self.memory[address..address + size])
    }
}

impl PoolAllocator {
    /// Copy `data` into a live allocation starting at `offset`
    pub fn write_bytes(&self, address: Address, offset: Size, data: &[u8]) -> MemoryResult<()> {
        let mut state = self.state.lock();
        let range = state.payload_range(address, offset, data.len())?;
        state.memory[range].copy_from_slice(data);
        Ok(())
    }

    /// Read `len` bytes from a live allocation starting at `offset`
    pub fn read_bytes(&self, address: Address, offset: Size, len: Size) -> MemoryResult<Vec<u8>> {
        let state = self.state.lock();
        let range = state.payload_range(address, offset, len)?;
        Ok(state.memory[range].to_vec())
    }

    /// Run `f` over the whole payload of a live allocation
    ///
    /// The pool stays locked while `f` runs; `f` must not call back into the pool.
    pub fn with_payload<R>(&self, address: Address, f: impl FnOnce(&[u8]) -> R) -> MemoryResult<R> {
        let state = self.state.lock();
        state.payload(address).map(f)
    }

    /// Run `f` over the whole payload of a live allocation, mutably
    ///
    /// The pool stays locked while `f` runs; `f` must not call back into the pool.
    pub fn with_payload_mut<R>(
        &self,
        address: Address,
        f: impl FnOnce(&mut [u8]) -> R,
    ) -> MemoryResult<R> {
        let mut state = self.state.lock();
        state.payload_mut(address).map(f)
    }
}
