use std::fmt;

use crate::front_end::ChildrenFrontEnd;
use crate::memory::Addr;

/// Dynamic class of a foreign object, as reported by its runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDescriptor {
	pub name: String,
}

/// A foreign collection instance located in target memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignObject {
	/// Instance address with tag bits already stripped.
	pub address: Addr,
	pub class: ClassDescriptor,
}

/// Object model the inspected process bridges native collections into.
pub trait ForeignRuntime: fmt::Debug {
	/// Resolves the dynamic class of the object at `addr`.
	fn class_of(&self, addr: Addr) -> Option<ClassDescriptor>;

	/// Builds the runtime's own children front end for a collection instance.
	///
	/// The returned front end has not been updated yet.
	fn create_front_end(&self, object: &ForeignObject) -> Option<Box<dyn ChildrenFrontEnd>>;
}
