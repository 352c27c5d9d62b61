use std::fmt;
use std::sync::Arc;

/// Compile-time type metadata for a value in the inspected process.
pub trait TypeInfo: fmt::Debug {
	/// Fully qualified, demangled type name.
	fn name(&self) -> &str;

	/// Size of one element of this type in an array, including trailing padding.
	///
	/// `None` when the type system cannot lay the type out.
	fn byte_stride(&self) -> Option<u64>;

	/// Generic argument at `index`, e.g. the key type of a dictionary at index 0.
	fn generic_argument(&self, index: usize) -> Option<TypeRef>;

	/// Type system that owns this type, used to synthesize related types.
	fn type_system(&self) -> Option<Arc<dyn TypeSystem>>;
}

/// Shared handle to a type descriptor.
pub type TypeRef = Arc<dyn TypeInfo>;

/// One labelled member of a synthesized tuple type.
#[derive(Debug, Clone)]
pub struct TupleElement {
	pub name: String,
	pub ty: TypeRef,
}

impl TupleElement {
	/// Creates a labelled tuple member.
	pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
		Self { name: name.into(), ty }
	}
}

/// Type construction services of the debugger's symbol layer.
pub trait TypeSystem: fmt::Debug {
	/// Builds a tuple type laid out the way the target language lays out tuples.
	fn tuple_type(&self, elements: &[TupleElement]) -> Option<TypeRef>;
}

/// Maps historical mangled runtime names onto the mangling scheme of the target.
pub trait NameMangler {
	/// Returns the mangled name the running target uses for `legacy`.
	fn current_mangled_name(&self, legacy: &str) -> String;
}
