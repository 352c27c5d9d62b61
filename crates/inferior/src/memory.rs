use std::fmt;
use std::sync::Arc;

use bytes::Bytes;

use crate::error::{MemoryError, Result};
use crate::foreign::ForeignRuntime;

/// Virtual address in the inspected process.
pub type Addr = u64;

/// Sentinel for an address that could not be resolved.
pub const INVALID_ADDRESS: Addr = u64::MAX;

/// Byte order of the inspected process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ByteOrder {
	#[default]
	Little,
	Big,
}

impl ByteOrder {
	/// Decodes an unsigned integer of 1 to 8 bytes.
	pub fn decode_unsigned(self, bytes: &[u8]) -> Result<u64> {
		let width = bytes.len();
		if width == 0 || width > 8 {
			return Err(MemoryError::UnsupportedWidth(width));
		}
		let mut buf = [0u8; 8];
		match self {
			Self::Little => {
				buf[..width].copy_from_slice(bytes);
				Ok(u64::from_le_bytes(buf))
			}
			Self::Big => {
				buf[8 - width..].copy_from_slice(bytes);
				Ok(u64::from_be_bytes(buf))
			}
		}
	}

	/// Encodes the low `width` bytes of `value`.
	pub fn encode_unsigned(self, value: u64, width: usize) -> Result<Vec<u8>> {
		if width == 0 || width > 8 {
			return Err(MemoryError::UnsupportedWidth(width));
		}
		Ok(match self {
			Self::Little => value.to_le_bytes()[..width].to_vec(),
			Self::Big => value.to_be_bytes()[8 - width..].to_vec(),
		})
	}
}

/// Computes `base + index * stride`, failing instead of wrapping.
pub fn offset_address(base: Addr, index: u64, stride: u64) -> Result<Addr> {
	index
		.checked_mul(stride)
		.and_then(|offset| base.checked_add(offset))
		.ok_or(MemoryError::AddressOverflow { base, index, stride })
}

/// Blocking, read-only access to the memory of an inspected process.
///
/// Implementations must tolerate arbitrary addresses: a read of garbage must come back
/// as an error, never a trap.
pub trait Process: fmt::Debug {
	/// Pointer size in bytes.
	fn address_byte_size(&self) -> usize;

	/// Byte order used for integers in target memory.
	fn byte_order(&self) -> ByteOrder;

	/// Reads exactly `len` bytes at `addr`.
	fn read_memory(&self, addr: Addr, len: usize) -> Result<Bytes>;

	/// Reads an unsigned integer of `byte_size` bytes.
	fn read_unsigned(&self, addr: Addr, byte_size: usize) -> Result<u64> {
		let bytes = self.read_memory(addr, byte_size)?;
		if bytes.len() != byte_size {
			return Err(MemoryError::Short {
				addr,
				expected: byte_size,
				actual: bytes.len(),
			});
		}
		self.byte_order().decode_unsigned(&bytes)
	}

	/// Reads one pointer-sized word.
	fn read_pointer(&self, addr: Addr) -> Result<u64> {
		self.read_unsigned(addr, self.address_byte_size())
	}

	/// Runtime of the foreign object model the process bridges collections to, if any.
	fn foreign_runtime(&self) -> Option<Arc<dyn ForeignRuntime>> {
		None
	}
}

/// Shared handle to an inspected process.
pub type ProcessRef = Arc<dyn Process>;
