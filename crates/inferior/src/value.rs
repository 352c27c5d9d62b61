use std::cell::Cell;
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;

use crate::memory::{ByteOrder, ProcessRef};
use crate::types::TypeRef;

/// A node of the debugger's value tree.
///
/// Values may be invalidated between calls (the process resumed and stopped again); all
/// accessors degrade to `None` or the supplied fallback instead of failing.
pub trait ValueNode: fmt::Debug {
	/// Display name of this value, e.g. a variable or field name.
	fn name(&self) -> &str;

	/// Declared type.
	fn compiler_type(&self) -> Option<TypeRef>;

	/// Runtime type name, which may be more specific than the declared type.
	fn type_name(&self) -> Option<String> {
		self.compiler_type().map(|ty| ty.name().to_owned())
	}

	/// Process the value lives in.
	fn process(&self) -> Option<ProcessRef>;

	/// Member field named `name`.
	fn child_by_name(&self, name: &str) -> Option<ValueRef>;

	/// Child at positional `index`.
	fn child_at_index(&self, index: usize) -> Option<ValueRef>;

	/// Scalar interpretation of the value, or `fail_value` when it has none.
	fn as_unsigned(&self, fail_value: u64) -> u64;

	/// String rendering of the value, e.g. the active case of an enum.
	fn as_str(&self) -> Option<String>;

	/// Most specific dynamic representation, when it differs from this value.
	fn dynamic_representation(&self) -> Option<ValueRef> {
		None
	}

	/// Raw bytes backing a value materialized from memory.
	fn data(&self) -> Option<Bytes> {
		None
	}

	/// Marks the value as produced by a synthetic children provider.
	fn set_synthetic_generated(&self, generated: bool);

	fn is_synthetic_generated(&self) -> bool;

	/// Follows a chain of member names.
	fn child_by_path(&self, path: &[&str]) -> Option<ValueRef> {
		let (first, rest) = path.split_first()?;
		let mut node = self.child_by_name(first)?;
		for name in rest {
			match node.child_by_name(name) {
				Some(child) => node = child,
				None => {
					tracing::trace!(parent = node.name(), child = %name, "missing path component");
					return None;
				}
			}
		}
		Some(node)
	}
}

/// Shared handle to a value node.
pub type ValueRef = Arc<dyn ValueNode>;

/// A value materialized from bytes copied out of the process.
///
/// Snapshots never track target memory; reading the same element again yields a new
/// value.
#[derive(Debug)]
pub struct ConstValue {
	name: String,
	ty: TypeRef,
	data: Bytes,
	process: Option<ProcessRef>,
	synthetic: Cell<bool>,
}

impl ConstValue {
	/// Creates a constant value of type `ty` over `data`.
	pub fn new(name: impl Into<String>, ty: TypeRef, data: Bytes, process: Option<ProcessRef>) -> Self {
		Self {
			name: name.into(),
			ty,
			data,
			process,
			synthetic: Cell::new(false),
		}
	}

	/// Wraps the value in a shared handle.
	pub fn into_ref(self) -> ValueRef {
		Arc::new(self)
	}
}

impl ValueNode for ConstValue {
	fn name(&self) -> &str {
		&self.name
	}

	fn compiler_type(&self) -> Option<TypeRef> {
		Some(Arc::clone(&self.ty))
	}

	fn process(&self) -> Option<ProcessRef> {
		self.process.clone()
	}

	fn child_by_name(&self, _name: &str) -> Option<ValueRef> {
		None
	}

	fn child_at_index(&self, _index: usize) -> Option<ValueRef> {
		None
	}

	fn as_unsigned(&self, fail_value: u64) -> u64 {
		let order = self
			.process
			.as_ref()
			.map_or(ByteOrder::default(), |process| process.byte_order());
		order.decode_unsigned(&self.data).unwrap_or(fail_value)
	}

	fn as_str(&self) -> Option<String> {
		None
	}

	fn data(&self) -> Option<Bytes> {
		Some(self.data.clone())
	}

	fn set_synthetic_generated(&self, generated: bool) {
		self.synthetic.set(generated);
	}

	fn is_synthetic_generated(&self) -> bool {
		self.synthetic.get()
	}
}
