use std::fmt;

use crate::value::ValueRef;

/// Whether a front end's children survived an update unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
	/// Previously fetched children are still valid.
	Cached,
	/// Children must be fetched again.
	NotCached,
}

/// Synthetic children provider driven by the presentation layer.
///
/// One front end exists per displayed value. The presentation layer calls
/// [`update`](Self::update) whenever the backing value may have changed and serializes
/// all calls, so implementations keep plain `&mut self` state.
pub trait ChildrenFrontEnd: fmt::Debug {
	/// Refreshes internal state from the backing value.
	fn update(&mut self) -> CacheState;

	/// Number of synthetic children.
	fn num_children(&mut self) -> usize;

	/// Materializes the child at `index`.
	fn child_at_index(&mut self, index: usize) -> Option<ValueRef>;

	/// Index of the child named `name`.
	fn index_of_child(&mut self, name: &str) -> Option<usize>;

	fn might_have_children(&self) -> bool {
		true
	}
}
