use hoard_inferior::{Addr, INVALID_ADDRESS, MemoryError, ProcessRef, offset_address};
use rustc_hash::FxHashMap;

/// Reader for the packed occupancy bitmask of a native hash table.
///
/// One bit per slot, packed into pointer-sized words in target byte order. Each word is
/// read at most once: the cache is a snapshot for the lifetime of one buffer handler and
/// is never refreshed, since handlers are rebuilt rather than updated.
#[derive(Debug)]
pub struct OccupancyBitmap {
	process: ProcessRef,
	base: Addr,
	word_size: usize,
	capacity: u64,
	words: FxHashMap<Addr, u64>,
}

impl OccupancyBitmap {
	/// Creates a reader over `capacity` slots whose bitmask starts at `base`.
	pub fn new(process: ProcessRef, base: Addr, capacity: u64) -> Self {
		let word_size = process.address_byte_size();
		Self {
			process,
			base,
			word_size,
			capacity,
			words: FxHashMap::default(),
		}
	}

	pub fn base(&self) -> Addr {
		self.base
	}

	pub fn capacity(&self) -> u64 {
		self.capacity
	}

	/// Whether the bitmask address resolved and has not been invalidated.
	pub fn is_valid(&self) -> bool {
		self.base != INVALID_ADDRESS
	}

	/// Forces the bitmask address to the invalid sentinel.
	pub fn invalidate(&mut self) {
		self.base = INVALID_ADDRESS;
	}

	/// Number of distinct words read so far.
	pub fn cached_words(&self) -> usize {
		self.words.len()
	}

	/// Whether `slot` holds an element.
	///
	/// Slots at or past the capacity are unoccupied and cost no read.
	pub fn is_occupied(&mut self, slot: u64) -> Result<bool, MemoryError> {
		if slot >= self.capacity {
			return Ok(false);
		}
		if self.word_size == 0 || self.word_size > 8 {
			return Err(MemoryError::UnsupportedWidth(self.word_size));
		}
		let bits_per_word = 8 * self.word_size as u64;
		let addr = offset_address(self.base, slot / bits_per_word, self.word_size as u64)?;
		let word = match self.words.get(&addr) {
			Some(&word) => word,
			None => {
				let word = self
					.process
					.read_unsigned(addr, self.word_size)
					.inspect_err(|err| tracing::trace!(addr, slot, error = %err, "bitmask word unreadable"))?;
				self.words.insert(addr, word);
				word
			}
		};
		Ok(word & (1u64 << (slot % bits_per_word)) != 0)
	}
}
