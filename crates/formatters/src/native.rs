//! Native hash table storage decoder.
//!
//! # Role
//!
//! Turns a storage object (capacity, count, bitmask and the key/value arrays) into
//! logically indexed elements. Index `n` is the `n`-th occupied slot in slot order.
//!
//! # Invariants
//!
//! - A usable table always has a readable bitmask word for its last slot; construction
//!   reads that word up front so a garbage storage pointer cannot produce a flood of
//!   bogus children.
//! - No cursor survives between [`NativeStorageBuffer::element_at`] calls; every lookup
//!   rescans from slot 0, reusing only the cached bitmask words.

use bytes::{Bytes, BytesMut};
use hoard_inferior::{Addr, ConstValue, INVALID_ADDRESS, MemoryError, ProcessRef, TypeRef, ValueRef, offset_address};

use crate::bitmask::OccupancyBitmap;
use crate::error::{DecodeError, Result};
use crate::layout::ElementLayout;
use crate::profile::{FieldSchema, split_path};

/// Decoder over a native storage object.
#[derive(Debug)]
pub struct NativeStorageBuffer {
	capacity: u64,
	count: u64,
	table: Option<Table>,
}

/// Everything needed to read elements, present only when the storage checked out.
#[derive(Debug)]
struct Table {
	process: ProcessRef,
	layout: ElementLayout,
	bitmap: OccupancyBitmap,
	keys: Addr,
	values: Addr,
}

struct Header {
	capacity: u64,
	count: u64,
}

impl NativeStorageBuffer {
	/// Opens `storage` with the container's key and, for dictionaries, value type.
	///
	/// Fails only when the element layout cannot be resolved from the types. Storage that
	/// is unusable for any other reason yields a handler whose
	/// [`is_valid`](Self::is_valid) is false; it keeps the header count whenever the
	/// header was read, matching what the storage itself claims.
	pub fn new(
		storage: &ValueRef,
		key: Option<TypeRef>,
		value: Option<TypeRef>,
		fields: &FieldSchema,
	) -> Result<Self> {
		let has_value_type = value.is_some();
		let layout = ElementLayout::resolve(key, value)?;
		Ok(Self::open(storage, layout, has_value_type, fields).unwrap_or_else(|err| {
			tracing::debug!(storage = storage.name(), error = %err, "native storage unusable");
			Self::unusable(0, 0)
		}))
	}

	fn unusable(capacity: u64, count: u64) -> Self {
		Self {
			capacity,
			count,
			table: None,
		}
	}

	fn open(storage: &ValueRef, layout: ElementLayout, has_value_type: bool, fields: &FieldSchema) -> Result<Self> {
		let process = storage.process().ok_or(DecodeError::NoProcess)?;
		let Header { capacity, count } = read_header(storage, &process, fields)?;

		let bitmask = address_of(storage, &fields.bitmask);
		let values = match storage.child_by_path(&split_path(&fields.values)) {
			Some(child) if has_value_type => child.as_unsigned(INVALID_ADDRESS),
			Some(_) => {
				tracing::debug!(capacity, count, "value array present without a value type");
				return Ok(Self::unusable(capacity, count));
			}
			None => INVALID_ADDRESS,
		};
		let keys = address_of(storage, &fields.keys);

		let mut bitmap = OccupancyBitmap::new(process.clone(), bitmask, capacity);
		if !bitmap.is_valid() || keys == INVALID_ADDRESS || capacity < count {
			tracing::debug!(bitmask, keys, capacity, count, "native storage header inconsistent");
			return Ok(Self::unusable(capacity, count));
		}
		if capacity > 0
			&& let Err(err) = bitmap.is_occupied(capacity - 1)
		{
			tracing::debug!(bitmask, capacity, error = %err, "bitmask check failed");
			bitmap.invalidate();
			return Ok(Self::unusable(capacity, count));
		}

		tracing::trace!(capacity, count, bitmask, keys, values, "native storage opened");
		Ok(Self {
			capacity,
			count,
			table: Some(Table {
				process,
				layout,
				bitmap,
				keys,
				values,
			}),
		})
	}

	/// Element count as stored in the header.
	pub fn count(&self) -> usize {
		usize::try_from(self.count).unwrap_or(usize::MAX)
	}

	pub fn capacity(&self) -> u64 {
		self.capacity
	}

	pub fn is_valid(&self) -> bool {
		self.table.is_some()
	}

	/// Key type for sets, the `(key, value)` tuple for dictionaries.
	pub fn element_type(&self) -> Option<TypeRef> {
		self.table.as_ref().map(|table| table.layout.element_type.clone())
	}

	/// Bitmask words read so far.
	pub fn cached_words(&self) -> usize {
		self.table.as_ref().map_or(0, |table| table.bitmap.cached_words())
	}

	/// Slot holding the `index`-th element, if the bitmask has that many occupied slots.
	pub fn slot_for_index(&mut self, index: usize) -> Result<Option<u64>> {
		let table = self.table.as_mut().ok_or(DecodeError::InvalidHandler)?;
		table.slot_for_index(index)
	}

	/// Materializes element `index` as a constant value named `[index]`.
	pub fn element_at(&mut self, index: usize) -> Result<ValueRef> {
		let count = self.count();
		if index >= count {
			return Err(DecodeError::IndexOutOfRange { index, count });
		}
		let table = self.table.as_mut().ok_or(DecodeError::InvalidHandler)?;
		let slot = table
			.slot_for_index(index)?
			.ok_or(DecodeError::IndexOutOfRange { index, count })?;
		table.read_element(index, slot)
	}
}

impl Table {
	fn slot_for_index(&mut self, index: usize) -> Result<Option<u64>> {
		let mut seen = 0usize;
		for slot in 0..self.bitmap.capacity() {
			if !self.bitmap.is_occupied(slot)? {
				continue;
			}
			if seen == index {
				return Ok(Some(slot));
			}
			seen += 1;
		}
		tracing::trace!(index, occupied = seen, "bitmask has fewer elements than requested");
		Ok(None)
	}

	fn read_element(&self, index: usize, slot: u64) -> Result<ValueRef> {
		let layout = &self.layout;
		let mut buffer = BytesMut::zeroed(layout.element_size() as usize);

		let key = self.read_exact(self.keys, slot, layout.key_stride)?;
		buffer[..key.len()].copy_from_slice(&key);
		if !layout.is_set() {
			let value = self.read_exact(self.values, slot, layout.value_stride)?;
			let start = layout.padded_key_stride as usize;
			buffer[start..start + value.len()].copy_from_slice(&value);
		}

		tracing::trace!(index, slot, "element materialized");
		Ok(ConstValue::new(
			format!("[{index}]"),
			layout.element_type.clone(),
			buffer.freeze(),
			Some(self.process.clone()),
		)
		.into_ref())
	}

	fn read_exact(&self, base: Addr, slot: u64, stride: u64) -> Result<Bytes> {
		let addr = offset_address(base, slot, stride)?;
		let len = stride as usize;
		let bytes = self.process.read_memory(addr, len)?;
		if bytes.len() != len {
			return Err(MemoryError::Short {
				addr,
				expected: len,
				actual: bytes.len(),
			}
			.into());
		}
		Ok(bytes)
	}
}

fn read_header(storage: &ValueRef, process: &ProcessRef, fields: &FieldSchema) -> Result<Header> {
	if let Some(buffer) = storage.child_by_name(&fields.header_buffer) {
		let base = buffer.as_unsigned(INVALID_ADDRESS);
		if base == 0 || base == INVALID_ADDRESS {
			return Err(DecodeError::NullStorage(base));
		}
		let ptr = process.address_byte_size() as u64;
		let capacity = process.read_pointer(offset_address(base, 2, ptr)?)?;
		let count = process.read_pointer(offset_address(base, 3, ptr)?)?;
		return Ok(Header { capacity, count });
	}

	let member = |path: &str| {
		storage
			.child_by_path(&split_path(path))
			.map(|child| child.as_unsigned(0))
			.ok_or_else(|| DecodeError::MissingField { field: path.to_owned() })
	};
	Ok(Header {
		capacity: member(&fields.capacity)?,
		count: member(&fields.count)?,
	})
}

fn address_of(storage: &ValueRef, path: &str) -> Addr {
	storage
		.child_by_path(&split_path(path))
		.map_or(INVALID_ADDRESS, |child| child.as_unsigned(INVALID_ADDRESS))
}
