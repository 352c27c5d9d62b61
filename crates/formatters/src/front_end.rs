//! Synthetic children front end.
//!
//! The presentation layer owns one [`HashedContainerFrontEnd`] per displayed container
//! and drives it through [`ChildrenFrontEnd`]. Children are only available after an
//! [`update`](ChildrenFrontEnd::update); each update throws the previous handler away.

use hoard_inferior::{CacheState, ChildrenFrontEnd, ValueRef};

use crate::buffer::BufferHandler;
use crate::profile::ContainerProfile;

/// Children provider presenting a container's elements as `[0]`, `[1]`, ...
#[derive(Debug)]
pub struct HashedContainerFrontEnd {
	value: ValueRef,
	profile: ContainerProfile,
	state: State,
}

#[derive(Debug)]
enum State {
	/// Not updated since construction.
	Stale,
	/// Updated; `None` when the value could not be decoded.
	Ready(Option<BufferHandler>),
}

impl HashedContainerFrontEnd {
	pub fn new(value: ValueRef, profile: ContainerProfile) -> Self {
		Self {
			value,
			profile,
			state: State::Stale,
		}
	}

	pub fn value(&self) -> &ValueRef {
		&self.value
	}

	pub fn profile(&self) -> &ContainerProfile {
		&self.profile
	}

	pub fn is_stale(&self) -> bool {
		matches!(self.state, State::Stale)
	}

	/// Current handler, if updated and decodable.
	pub fn handler(&self) -> Option<&BufferHandler> {
		match &self.state {
			State::Ready(handler) => handler.as_ref(),
			State::Stale => None,
		}
	}

	fn handler_mut(&mut self) -> Option<&mut BufferHandler> {
		match &mut self.state {
			State::Ready(handler) => handler.as_mut(),
			State::Stale => None,
		}
	}
}

impl ChildrenFrontEnd for HashedContainerFrontEnd {
	fn update(&mut self) -> CacheState {
		let handler = BufferHandler::create(&self.value, &self.profile);
		tracing::trace!(value = self.value.name(), decoded = handler.is_some(), "front end updated");
		self.state = State::Ready(handler);
		CacheState::NotCached
	}

	fn num_children(&mut self) -> usize {
		self.handler_mut().map_or(0, BufferHandler::count)
	}

	fn child_at_index(&mut self, index: usize) -> Option<ValueRef> {
		let handler = self.handler_mut()?;
		match handler.element_at(index) {
			Ok(child) => {
				child.set_synthetic_generated(true);
				Some(child)
			}
			Err(err) => {
				tracing::trace!(index, error = %err, "child unavailable");
				None
			}
		}
	}

	fn index_of_child(&mut self, name: &str) -> Option<usize> {
		let count = self.handler_mut()?.count();
		parse_child_index(name).filter(|index| *index < count)
	}
}

/// Parses a synthetic child name of the form `[N]`.
///
/// The closing bracket is optional; anything else besides decimal digits is rejected.
pub fn parse_child_index(name: &str) -> Option<usize> {
	let rest = name.strip_prefix('[')?;
	let digits = rest.strip_suffix(']').unwrap_or(rest);
	if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
		return None;
	}
	digits.parse().ok()
}

#[cfg(test)]
mod tests;
