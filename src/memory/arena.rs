//! Block-structured memory shared by globals, locals, string literals and the heap
//!
//! Every object gets its own [`Block`] of byte-sized cells. A scalar occupies
//! the cell at its offset plus `size - 1` trailing cells that stay
//! [`Value::Uninitialized`]; structs and arrays are laid out contiguously.
//!
//! Blocks are never reused. When a scope ends or `free` is called the block
//! is marked dead but kept, so later accesses through stale pointers are
//! reported as use-after-free instead of silently touching another object.

use super::value::{Address, BlockId, Value};
use crate::interpreter::constants::{
    GLOBAL_ADDRESS_START, HEAP_ADDRESS_START, LITERAL_ADDRESS_START, STACK_ADDRESS_START,
};
use thiserror::Error;

/// Where a block lives; decides its lifetime rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Global,
    Stack,
    Heap,
    Literal,
}

impl Region {
    fn base_address(self) -> u64 {
        match self {
            Region::Global => GLOBAL_ADDRESS_START,
            Region::Stack => STACK_ADDRESS_START,
            Region::Heap => HEAP_ADDRESS_START,
            Region::Literal => LITERAL_ADDRESS_START,
        }
    }
}

/// One allocated object
#[derive(Debug, Clone)]
pub struct Block {
    pub cells: Vec<Value>,
    pub region: Region,
    /// Variable name, or a description such as `heap block #3`
    pub label: String,
    pub live: bool,
    pub read_only: bool,
    /// Synthetic address printed by `%p`
    pub base: u64,
}

/// Errors raised by memory accesses
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
    #[error("use after free of {label}")]
    UseAfterFree { label: String },

    #[error("dangling pointer to '{label}' whose scope has ended")]
    DanglingStack { label: String },

    #[error("buffer overrun: byte offset {offset} (access of {size}) is outside '{label}' of {len} bytes")]
    OutOfBounds {
        label: String,
        offset: i64,
        size: usize,
        len: usize,
    },

    #[error("attempted to modify read-only {label}")]
    ReadOnly { label: String },

    #[error("double free of {label}")]
    DoubleFree { label: String },

    #[error("invalid free: {reason}")]
    InvalidFree { reason: String },

    #[error("out of memory: requested {requested} bytes with {in_use} in use, limit is {limit}")]
    OutOfMemory {
        requested: usize,
        in_use: usize,
        limit: usize,
    },
}

/// All memory of one program run
#[derive(Debug, Clone)]
pub struct Memory {
    blocks: Vec<Block>,
    next_base: [u64; 4],
    bytes_in_use: usize,
    limit: usize,
    heap_allocations: usize,
}

impl Memory {
    pub fn new(limit: usize) -> Self {
        Memory {
            blocks: Vec::new(),
            next_base: [
                Region::Global.base_address(),
                Region::Stack.base_address(),
                Region::Heap.base_address(),
                Region::Literal.base_address(),
            ],
            bytes_in_use: 0,
            limit,
            heap_allocations: 0,
        }
    }

    fn region_slot(region: Region) -> usize {
        match region {
            Region::Global => 0,
            Region::Stack => 1,
            Region::Heap => 2,
            Region::Literal => 3,
        }
    }

    /// Allocate a fresh, uninitialized block of `size` bytes
    pub fn allocate(&mut self, size: usize, region: Region, label: impl Into<String>) -> Result<BlockId, MemoryError> {
        if size > self.limit.saturating_sub(self.bytes_in_use) {
            return Err(MemoryError::OutOfMemory {
                requested: size,
                in_use: self.bytes_in_use,
                limit: self.limit,
            });
        }

        let mut label = label.into();
        if region == Region::Heap {
            self.heap_allocations += 1;
            label = format!("heap block #{}", self.heap_allocations);
        }

        let slot = Self::region_slot(region);
        let base = self.next_base[slot];
        // Keep distinct objects visibly apart in `%p` output
        self.next_base[slot] += (size as u64).max(1).next_multiple_of(16);

        self.bytes_in_use += size;
        self.blocks.push(Block {
            cells: vec![Value::Uninitialized; size],
            region,
            label,
            live: true,
            read_only: false,
            base,
        });
        Ok(self.blocks.len() - 1)
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(id)
    }

    pub fn set_read_only(&mut self, id: BlockId) {
        if let Some(block) = self.blocks.get_mut(id) {
            block.read_only = true;
        }
    }

    /// End the lifetime of a stack block (scope exit)
    pub fn release(&mut self, id: BlockId) {
        if let Some(block) = self.blocks.get_mut(id) {
            if block.live {
                block.live = false;
                self.bytes_in_use -= block.cells.len();
            }
        }
    }

    /// `free()` semantics: only live heap blocks, only at their start
    pub fn free(&mut self, addr: Address) -> Result<(), MemoryError> {
        let block = self.blocks.get_mut(addr.block).ok_or_else(|| MemoryError::InvalidFree {
            reason: "pointer does not refer to any allocation".to_string(),
        })?;

        if block.region != Region::Heap {
            return Err(MemoryError::InvalidFree {
                reason: format!("'{}' was not allocated with malloc", block.label),
            });
        }
        if !block.live {
            return Err(MemoryError::DoubleFree {
                label: block.label.clone(),
            });
        }
        if addr.offset != 0 {
            return Err(MemoryError::InvalidFree {
                reason: format!("pointer is {} bytes into {}", addr.offset, block.label),
            });
        }

        block.live = false;
        self.bytes_in_use -= block.cells.len();
        Ok(())
    }

    /// Validate an access of `size` bytes and return the block and start index
    fn check(&self, addr: Address, size: usize) -> Result<(&Block, usize), MemoryError> {
        let block = self.blocks.get(addr.block).ok_or_else(|| MemoryError::InvalidFree {
            reason: "pointer does not refer to any allocation".to_string(),
        })?;

        if !block.live {
            return Err(match block.region {
                Region::Stack => MemoryError::DanglingStack {
                    label: block.label.clone(),
                },
                _ => MemoryError::UseAfterFree {
                    label: block.label.clone(),
                },
            });
        }

        let len = block.cells.len();
        if addr.offset < 0 || addr.offset as usize + size > len {
            return Err(MemoryError::OutOfBounds {
                label: block.label.clone(),
                offset: addr.offset,
                size,
                len,
            });
        }

        Ok((block, addr.offset as usize))
    }

    /// Read the head cell of a scalar occupying `size` bytes
    pub fn read(&self, addr: Address, size: usize) -> Result<&Value, MemoryError> {
        let (block, start) = self.check(addr, size.max(1))?;
        Ok(&block.cells[start])
    }

    /// Copy `size` raw cells (struct copies)
    pub fn read_range(&self, addr: Address, size: usize) -> Result<Vec<Value>, MemoryError> {
        let (block, start) = self.check(addr, size)?;
        Ok(block.cells[start..start + size].to_vec())
    }

    /// Write a scalar; its trailing cells are cleared
    pub fn write(&mut self, addr: Address, size: usize, value: Value) -> Result<(), MemoryError> {
        let start = self.writable(addr, size.max(1))?;
        let cells = &mut self.blocks[addr.block].cells;
        cells[start] = value;
        for cell in &mut cells[start + 1..start + size.max(1)] {
            *cell = Value::Uninitialized;
        }
        Ok(())
    }

    /// Overwrite a run of raw cells (struct copies)
    pub fn write_range(&mut self, addr: Address, values: Vec<Value>) -> Result<(), MemoryError> {
        let start = self.writable(addr, values.len())?;
        let cells = &mut self.blocks[addr.block].cells;
        for (i, value) in values.into_iter().enumerate() {
            cells[start + i] = value;
        }
        Ok(())
    }

    fn writable(&self, addr: Address, size: usize) -> Result<usize, MemoryError> {
        let (block, start) = self.check(addr, size)?;
        if block.read_only {
            return Err(MemoryError::ReadOnly {
                label: block.label.clone(),
            });
        }
        Ok(start)
    }

    /// Number of bytes in live blocks
    pub fn bytes_in_use(&self) -> usize {
        self.bytes_in_use
    }

    /// Numeric address for `%p`
    pub fn numeric_address(&self, addr: Address) -> u64 {
        self.blocks
            .get(addr.block)
            .map(|b| (b.base as i64 + addr.offset) as u64)
            .unwrap_or(0)
    }

    /// Live heap blocks, for leak reporting in tests and logs
    pub fn live_heap_blocks(&self) -> usize {
        self.blocks
            .iter()
            .filter(|b| b.region == Region::Heap && b.live)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read() {
        let mut memory = Memory::new(1024);
        let id = memory.allocate(8, Region::Stack, "pair").unwrap();
        memory.write(Address::new(id, 4), 4, Value::Int(7)).unwrap();
        assert_eq!(memory.read(Address::new(id, 4), 4).unwrap(), &Value::Int(7));
        assert_eq!(memory.read(Address::new(id, 0), 4).unwrap(), &Value::Uninitialized);
    }

    #[test]
    fn test_out_of_bounds() {
        let mut memory = Memory::new(1024);
        let id = memory.allocate(4, Region::Stack, "x").unwrap();
        let err = memory.read(Address::new(id, 4), 4).unwrap_err();
        assert!(matches!(err, MemoryError::OutOfBounds { offset: 4, len: 4, .. }));
    }

    #[test]
    fn test_free_rules() {
        let mut memory = Memory::new(1024);
        let heap = memory.allocate(16, Region::Heap, "").unwrap();
        let stack = memory.allocate(4, Region::Stack, "local").unwrap();

        assert!(matches!(
            memory.free(Address::new(heap, 4)),
            Err(MemoryError::InvalidFree { .. })
        ));
        assert!(matches!(
            memory.free(Address::new(stack, 0)),
            Err(MemoryError::InvalidFree { .. })
        ));
        memory.free(Address::new(heap, 0)).unwrap();
        assert!(matches!(
            memory.free(Address::new(heap, 0)),
            Err(MemoryError::DoubleFree { .. })
        ));
        assert!(matches!(
            memory.read(Address::new(heap, 0), 4),
            Err(MemoryError::UseAfterFree { .. })
        ));
        assert_eq!(memory.live_heap_blocks(), 0);
    }

    #[test]
    fn test_released_stack_block_is_dangling() {
        let mut memory = Memory::new(1024);
        let id = memory.allocate(4, Region::Stack, "tmp").unwrap();
        memory.release(id);
        let err = memory.read(Address::new(id, 0), 4).unwrap_err();
        assert_eq!(err, MemoryError::DanglingStack { label: "tmp".to_string() });
        assert_eq!(memory.bytes_in_use(), 0);
    }

    #[test]
    fn test_limit() {
        let mut memory = Memory::new(10);
        memory.allocate(8, Region::Heap, "").unwrap();
        assert!(matches!(
            memory.allocate(4, Region::Heap, ""),
            Err(MemoryError::OutOfMemory { requested: 4, in_use: 8, limit: 10 })
        ));
    }

    #[test]
    fn test_read_only_literal() {
        let mut memory = Memory::new(64);
        let id = memory.allocate(3, Region::Literal, "string literal").unwrap();
        memory.write_range(Address::new(id, 0), vec![Value::Char(104), Value::Char(105), Value::Char(0)]).unwrap();
        memory.set_read_only(id);
        assert!(matches!(
            memory.write(Address::new(id, 0), 1, Value::Char(72)),
            Err(MemoryError::ReadOnly { .. })
        ));
    }
}
