// Constants for the snippet interpreter

/// Starting address for heap allocations
/// Heap addresses start at 0x10000000 to clearly distinguish them from stack addresses
pub const HEAP_ADDRESS_START: u64 = 0x1000_0000;

/// Starting address for stack variable addresses
pub const STACK_ADDRESS_START: u64 = 0x7ff0_0000;

/// Starting address for global and `static` variables
pub const GLOBAL_ADDRESS_START: u64 = 0x0060_0000;

/// Starting address for string literals
pub const LITERAL_ADDRESS_START: u64 = 0x0040_0000;

/// Total bytes a snippet may have live at once (globals, stack and heap)
pub const MEMORY_LIMIT: usize = 1024 * 1024;

/// Nested function calls allowed before reporting a stack overflow
pub const MAX_CALL_DEPTH: usize = 128;


/// Widest `printf` field width accepted
pub const MAX_PRINTF_WIDTH: usize = MEMORY_LIMIT;
