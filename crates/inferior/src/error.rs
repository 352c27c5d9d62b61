use thiserror::Error;

use crate::memory::Addr;

/// Failure to read from the inspected process.
///
/// Reads are all-or-nothing: a read that returns fewer bytes than requested is
/// reported as [`MemoryError::Short`] and never handed to a decoder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
	/// The range is not mapped or the process refused the read.
	#[error("memory at {addr:#x} ({len} bytes) is not readable")]
	Unreadable { addr: Addr, len: usize },

	/// The process returned fewer bytes than requested.
	#[error("short read at {addr:#x}: expected {expected} bytes, got {actual}")]
	Short {
		addr: Addr,
		expected: usize,
		actual: usize,
	},

	/// An integer read wider than 8 bytes, or of zero width.
	#[error("unsupported integer width: {0} bytes")]
	UnsupportedWidth(usize),

	/// Slot address computation left the address space.
	#[error("address overflow computing {base:#x} + {index} * {stride}")]
	AddressOverflow { base: Addr, index: u64, stride: u64 },
}

/// Result type for memory operations.
pub type Result<T> = std::result::Result<T, MemoryError>;
