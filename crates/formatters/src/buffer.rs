use hoard_inferior::{TypeRef, ValueRef};

use crate::classify::{Representation, classify};
use crate::error::{DecodeError, Result};
use crate::foreign::ForeignDelegateBuffer;
use crate::native::NativeStorageBuffer;
use crate::profile::ContainerProfile;

/// Decoder for whichever representation a container value currently uses.
#[derive(Debug)]
pub enum BufferHandler {
	Native(NativeStorageBuffer),
	Foreign(ForeignDelegateBuffer),
}

impl BufferHandler {
	/// Classifies `value` and opens a decoder for it, or `None` when the value is not a
	/// container this profile understands.
	pub fn create(value: &ValueRef, profile: &ContainerProfile) -> Option<Self> {
		Self::try_create(value, profile)
			.inspect_err(|err| {
				tracing::debug!(value = value.name(), kind = profile.kind.as_str(), error = %err, "no buffer handler");
			})
			.ok()
	}

	/// Like [`create`](Self::create), reporting why no handler could be built.
	///
	/// Unresolvable key or value types are an error. Past that point a native handler is
	/// returned even when its storage failed validation; it reports the stored count but
	/// yields no elements.
	pub fn try_create(value: &ValueRef, profile: &ContainerProfile) -> Result<Self> {
		match classify(value, profile)? {
			Representation::Native { container, storage } => {
				let container_type = container.compiler_type();
				let argument = |index| container_type.as_ref().and_then(|ty| ty.generic_argument(index));
				let value_type = if profile.kind.is_map() { argument(1) } else { None };
				let native = NativeStorageBuffer::new(&storage, argument(0), value_type, &profile.fields)?;
				Ok(Self::Native(native))
			}
			Representation::Foreign { runtime, object } => {
				let delegate = ForeignDelegateBuffer::new(runtime.as_ref(), object);
				if !delegate.is_valid() {
					return Err(DecodeError::ForeignUnavailable {
						reason: "foreign runtime has no front end for the instance",
					});
				}
				Ok(Self::Foreign(delegate))
			}
		}
	}

	pub fn count(&mut self) -> usize {
		match self {
			Self::Native(native) => native.count(),
			Self::Foreign(foreign) => foreign.count(),
		}
	}

	/// Element `index` in logical order.
	pub fn element_at(&mut self, index: usize) -> Result<ValueRef> {
		match self {
			Self::Native(native) => native.element_at(index),
			Self::Foreign(foreign) => foreign.element_at(index),
		}
	}

	/// Element type, unknown for bridged collections.
	pub fn element_type(&self) -> Option<TypeRef> {
		match self {
			Self::Native(native) => native.element_type(),
			Self::Foreign(_) => None,
		}
	}

	pub fn is_valid(&self) -> bool {
		match self {
			Self::Native(native) => native.is_valid(),
			Self::Foreign(foreign) => foreign.is_valid(),
		}
	}
}
