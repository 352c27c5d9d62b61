//! Error types for hashed-container decoding.
//!
//! None of these reach the user: the presentation surface turns them into absent
//! children or a missing summary after logging them.

use hoard_inferior::MemoryError;
use thiserror::Error;

/// Failure to derive strides and the element type from type metadata.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
	/// The container type has no key type argument.
	#[error("container type has no key type argument")]
	MissingKeyType,

	/// The type system cannot size a type.
	#[error("type `{type_name}` has no known stride")]
	UnknownStride { type_name: String },

	/// The `(key, value)` tuple type could not be synthesized.
	#[error("cannot synthesize (key, value) tuple for `{key}` and `{value}`")]
	TupleUnavailable { key: String, value: String },

	/// The tuple is smaller than its parts.
	#[error("tuple stride {element} is smaller than key stride {key} plus value stride {value}")]
	InconsistentStride { element: u64, key: u64, value: u64 },
}

/// Failure to decode a container value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
	#[error("memory read failed: {0}")]
	Memory(#[from] MemoryError),

	#[error("layout resolution failed: {0}")]
	Layout(#[from] LayoutError),

	/// No classification rule matched the value.
	#[error("unrecognized container representation for `{type_name}`")]
	Unrecognized { type_name: String },

	/// A field required by the matched representation is absent.
	#[error("missing field `{field}`")]
	MissingField { field: String },

	/// The value is not attached to a live process.
	#[error("value has no process")]
	NoProcess,

	/// The storage header pointer is null or unresolved.
	#[error("storage buffer pointer {0:#x} is not usable")]
	NullStorage(u64),

	/// The bridged collection could not be resolved or decoded.
	#[error("bridged collection unavailable: {reason}")]
	ForeignUnavailable { reason: &'static str },

	/// Logical index past the element count.
	#[error("index {index} out of range for {count} elements")]
	IndexOutOfRange { index: usize, count: usize },

	/// The handler failed its validity checks and refuses reads.
	#[error("buffer handler is invalid")]
	InvalidHandler,
}

/// Result type for decoding operations.
pub type Result<T> = std::result::Result<T, DecodeError>;
