//! Geometry constants fixed across every preset.

/// Cache block (line) size in bytes. Every cache level uses 64-byte blocks.
pub const BLOCK_BYTES: usize = 64;

/// Bytes per KiB; preset sizes are given in KiB.
pub const KIB: usize = 1024;

/// Size of the architectural integer register file.
///
/// The physical register file must be strictly larger for renaming to make progress.
pub const ARCH_INT_REGS: usize = 32;
