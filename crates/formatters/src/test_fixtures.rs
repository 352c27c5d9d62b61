//! Hash table images shared by unit tests.
//!
//! Key bytes of slot `n` are all `key_byte(n)` and value bytes all `value_byte(n)`, so a
//! decoded element names the slot it came from.

use hoard_inferior::mock::{MockProcess, MockType, MockValue};
use hoard_inferior::{Addr, ProcessRef, TypeRef};

use crate::profile::{ContainerKind, ContainerProfile};

pub(crate) const BITMASK_ADDR: Addr = 0x1000;
pub(crate) const KEYS_ADDR: Addr = 0x2000;
pub(crate) const VALUES_ADDR: Addr = 0x3000;
pub(crate) const HEADER_ADDR: Addr = 0x4000;

pub(crate) fn key_byte(slot: u64) -> u8 {
	0xA0u8.wrapping_add(slot as u8)
}

pub(crate) fn value_byte(slot: u64) -> u8 {
	0x50u8.wrapping_add(slot as u8)
}

/// Dictionary type whose generic arguments the type system could not resolve.
pub(crate) fn unresolved_dictionary_type() -> TypeRef {
	MockType::generic("Swift.Dictionary<?, ?>", Vec::new()).into_ref()
}

/// A native table laid out in mock memory.
#[derive(Debug, Clone)]
pub(crate) struct TableFixture {
	pub capacity: u64,
	pub count: u64,
	pub occupied: Vec<u64>,
	pub key_stride: u64,
	pub value_stride: Option<u64>,
	pub pointer_size: usize,
}

impl TableFixture {
	/// Dictionary with 8-byte keys and values.
	pub fn map(capacity: u64, occupied: &[u64]) -> Self {
		Self {
			capacity,
			count: occupied.len() as u64,
			occupied: occupied.to_vec(),
			key_stride: 8,
			value_stride: Some(8),
			pointer_size: 8,
		}
	}

	/// Set with 8-byte keys.
	pub fn set(capacity: u64, occupied: &[u64]) -> Self {
		Self {
			value_stride: None,
			..Self::map(capacity, occupied)
		}
	}

	pub fn with_strides(mut self, key_stride: u64, value_stride: Option<u64>) -> Self {
		self.key_stride = key_stride;
		self.value_stride = value_stride;
		self
	}

	pub fn with_count(mut self, count: u64) -> Self {
		self.count = count;
		self
	}

	pub fn with_pointer_size(mut self, pointer_size: usize) -> Self {
		self.pointer_size = pointer_size;
		self
	}

	pub fn kind(&self) -> ContainerKind {
		if self.value_stride.is_some() {
			ContainerKind::Dictionary
		} else {
			ContainerKind::Set
		}
	}

	pub fn profile(&self) -> ContainerProfile {
		ContainerProfile::for_kind(self.kind())
	}

	pub fn key_type(&self) -> TypeRef {
		MockType::scalar(format!("Key{}", self.key_stride), self.key_stride).into_ref()
	}

	pub fn value_type(&self) -> Option<TypeRef> {
		self.value_stride
			.map(|stride| MockType::scalar(format!("Value{stride}"), stride).into_ref())
	}

	pub fn container_type(&self) -> TypeRef {
		let key = self.key_type();
		match self.value_type() {
			Some(value) => MockType::generic(
				format!("Swift.Dictionary<{}, {}>", key.name(), value.name()),
				vec![key, value],
			)
			.into_ref(),
			None => MockType::generic(format!("Swift.Set<{}>", key.name()), vec![key]).into_ref(),
		}
	}

	fn bits_per_word(&self) -> u64 {
		8 * self.pointer_size as u64
	}

	/// Bitmask words, header and both element arrays.
	pub fn memory(&self) -> MockProcess {
		let bits = self.bits_per_word();
		let word_count = self.capacity.div_ceil(bits).max(1);
		let mut words = vec![0u64; word_count as usize];
		for &slot in &self.occupied {
			words[(slot / bits) as usize] |= 1 << (slot % bits);
		}

		let ptr = self.pointer_size as u64;
		let mut process = MockProcess::new(self.pointer_size)
			.with_word(HEADER_ADDR + 2 * ptr, self.capacity)
			.with_word(HEADER_ADDR + 3 * ptr, self.count);
		for (index, word) in words.into_iter().enumerate() {
			process = process.with_word(BITMASK_ADDR + index as u64 * ptr, word);
		}
		for slot in 0..self.capacity {
			let key = vec![key_byte(slot); self.key_stride as usize];
			process = process.with_bytes(KEYS_ADDR + slot * self.key_stride, &key);
			if let Some(stride) = self.value_stride {
				let value = vec![value_byte(slot); stride as usize];
				process = process.with_bytes(VALUES_ADDR + slot * stride, &value);
			}
		}
		process
	}

	/// Storage object reporting capacity and count through member fields.
	pub fn storage(&self, name: &str) -> MockValue {
		self.storage_arrays(name)
			.child(MockValue::path(&["bucketCount", "_value"], self.capacity))
			.child(MockValue::path(&["count", "_value"], self.count))
	}

	/// Storage object reporting capacity and count through a header pointer.
	pub fn storage_with_header(&self, name: &str) -> MockValue {
		self.storage_arrays(name)
			.child(MockValue::new("buffer").unsigned(HEADER_ADDR))
	}

	fn storage_arrays(&self, name: &str) -> MockValue {
		let storage = MockValue::new(name)
			.child(MockValue::path(&["initializedEntries", "values", "_rawValue"], BITMASK_ADDR))
			.child(MockValue::path(&["keys", "_rawValue"], KEYS_ADDR));
		if self.value_stride.is_some() {
			storage.child(MockValue::path(&["values", "_rawValue"], VALUES_ADDR))
		} else {
			storage
		}
	}

	/// Container wrapper whose `_variant` discriminator selects native storage.
	pub fn native_container(&self, process: &ProcessRef) -> MockValue {
		self.native_container_typed(self.container_type(), process)
	}

	/// Like [`native_container`](Self::native_container) with a declared type of the
	/// caller's choosing.
	pub fn native_container_typed(&self, ty: TypeRef, process: &ProcessRef) -> MockValue {
		MockValue::new("container")
			.typed(ty)
			.process(process.clone())
			.child(
				MockValue::new("_variant")
					.string("native")
					.child(MockValue::new("native").child(self.storage("_storage"))),
			)
	}
}
