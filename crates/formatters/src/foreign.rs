use hoard_inferior::{ChildrenFrontEnd, ForeignObject, ForeignRuntime, ValueRef};

use crate::error::{DecodeError, Result};

/// Decoder that forwards to the foreign runtime's own collection front end.
///
/// The wrapped front end is updated once, at construction; later calls only read from
/// it.
#[derive(Debug)]
pub struct ForeignDelegateBuffer {
	object: ForeignObject,
	front_end: Option<Box<dyn ChildrenFrontEnd>>,
}

impl ForeignDelegateBuffer {
	pub fn new(runtime: &dyn ForeignRuntime, object: ForeignObject) -> Self {
		let mut front_end = runtime.create_front_end(&object);
		match front_end.as_mut() {
			Some(front_end) => {
				front_end.update();
			}
			None => tracing::debug!(
				address = object.address,
				class = %object.class.name,
				"foreign runtime has no front end for class"
			),
		}
		Self { object, front_end }
	}

	pub fn object(&self) -> &ForeignObject {
		&self.object
	}

	pub fn is_valid(&self) -> bool {
		self.front_end.is_some()
	}

	pub fn count(&mut self) -> usize {
		self.front_end.as_mut().map_or(0, |front_end| front_end.num_children())
	}

	pub fn element_at(&mut self, index: usize) -> Result<ValueRef> {
		let front_end = self.front_end.as_mut().ok_or(DecodeError::InvalidHandler)?;
		front_end.child_at_index(index).ok_or_else(|| {
			let count = front_end.num_children();
			DecodeError::IndexOutOfRange { index, count }
		})
	}
}
