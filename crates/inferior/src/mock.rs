//! In-memory target for exercising formatters without a live process.
//!
//! Everything here records what was asked of it, so tests can assert on read counts and
//! call order as well as on decoded results.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::ops::Range;
use std::rc::Rc;
use std::sync::Arc;

use bytes::Bytes;

use crate::error::{MemoryError, Result};
use crate::foreign::{ClassDescriptor, ForeignObject, ForeignRuntime};
use crate::front_end::{CacheState, ChildrenFrontEnd};
use crate::memory::{Addr, ByteOrder, Process, ProcessRef};
use crate::types::{TupleElement, TypeInfo, TypeRef, TypeSystem};
use crate::value::{ValueNode, ValueRef};

/// Sparse byte-addressed memory with read logging and fault injection.
#[derive(Debug)]
pub struct MockProcess {
	pointer_size: usize,
	byte_order: ByteOrder,
	memory: BTreeMap<Addr, u8>,
	unreadable: Vec<Range<Addr>>,
	foreign: Option<Arc<dyn ForeignRuntime>>,
	reads: RefCell<Vec<(Addr, usize)>>,
}

impl MockProcess {
	/// Creates an empty little-endian process.
	pub fn new(pointer_size: usize) -> Self {
		Self {
			pointer_size,
			byte_order: ByteOrder::Little,
			memory: BTreeMap::new(),
			unreadable: Vec::new(),
			foreign: None,
			reads: RefCell::new(Vec::new()),
		}
	}

	pub fn big_endian(mut self) -> Self {
		self.byte_order = ByteOrder::Big;
		self
	}

	/// Maps `bytes` starting at `addr`.
	pub fn with_bytes(mut self, addr: Addr, bytes: &[u8]) -> Self {
		for (offset, byte) in (0u64..).zip(bytes) {
			self.memory.insert(addr + offset, *byte);
		}
		self
	}

	/// Maps one pointer-sized word in target byte order.
	pub fn with_word(self, addr: Addr, value: u64) -> Self {
		let bytes = self
			.byte_order
			.encode_unsigned(value, self.pointer_size)
			.expect("mock pointer size must be 1..=8 bytes");
		self.with_bytes(addr, &bytes)
	}

	/// Makes every read touching `range` fail, mapped or not.
	pub fn with_unreadable(mut self, range: Range<Addr>) -> Self {
		self.unreadable.push(range);
		self
	}

	pub fn with_foreign_runtime(mut self, runtime: Arc<dyn ForeignRuntime>) -> Self {
		self.foreign = Some(runtime);
		self
	}

	/// Number of `read_memory` calls so far, failed ones included.
	pub fn read_count(&self) -> usize {
		self.reads.borrow().len()
	}

	/// Every `(addr, len)` requested so far, in order.
	pub fn reads(&self) -> Vec<(Addr, usize)> {
		self.reads.borrow().clone()
	}

	pub fn clear_reads(&self) {
		self.reads.borrow_mut().clear();
	}

	/// Shares the mock, returning it alongside a process handle to the same instance.
	pub fn shared(self) -> (Arc<Self>, ProcessRef) {
		let mock = Arc::new(self);
		let handle: ProcessRef = mock.clone();
		(mock, handle)
	}

	fn is_poisoned(&self, addr: Addr) -> bool {
		self.unreadable.iter().any(|range| range.contains(&addr))
	}
}

impl Process for MockProcess {
	fn address_byte_size(&self) -> usize {
		self.pointer_size
	}

	fn byte_order(&self) -> ByteOrder {
		self.byte_order
	}

	fn read_memory(&self, addr: Addr, len: usize) -> Result<Bytes> {
		self.reads.borrow_mut().push((addr, len));
		let unreadable = MemoryError::Unreadable { addr, len };
		let mut out = Vec::with_capacity(len);
		for offset in 0..len as u64 {
			let at = addr.checked_add(offset).ok_or_else(|| unreadable.clone())?;
			if self.is_poisoned(at) {
				return Err(unreadable);
			}
			out.push(*self.memory.get(&at).ok_or_else(|| unreadable.clone())?);
		}
		Ok(Bytes::from(out))
	}

	fn foreign_runtime(&self) -> Option<Arc<dyn ForeignRuntime>> {
		self.foreign.clone()
	}
}

/// Type system that lays tuples out with natural alignment.
///
/// Alignment is inferred from strides: the largest power of two dividing the stride,
/// capped at 8.
#[derive(Debug, Clone, Default)]
pub struct MockTypeSystem {
	refuse_tuples: bool,
}

impl MockTypeSystem {
	/// A type system whose tuple construction always fails.
	pub fn refusing_tuples() -> Self {
		Self { refuse_tuples: true }
	}
}

fn natural_alignment(stride: u64) -> u64 {
	if stride == 0 { 1 } else { (1u64 << stride.trailing_zeros()).min(8) }
}

fn align_up(offset: u64, align: u64) -> u64 {
	offset.div_ceil(align) * align
}

impl TypeSystem for MockTypeSystem {
	fn tuple_type(&self, elements: &[TupleElement]) -> Option<TypeRef> {
		if self.refuse_tuples {
			return None;
		}
		let mut offset = 0;
		let mut max_align = 1;
		let mut labels = Vec::with_capacity(elements.len());
		for element in elements {
			let stride = element.ty.byte_stride()?;
			let align = natural_alignment(stride);
			max_align = max_align.max(align);
			offset = align_up(offset, align) + stride;
			labels.push(format!("{}: {}", element.name, element.ty.name()));
		}
		let tuple = MockType {
			name: format!("({})", labels.join(", ")),
			stride: Some(align_up(offset, max_align)),
			generics: Vec::new(),
			system: Some(Arc::new(self.clone())),
		};
		Some(tuple.into_ref())
	}
}

/// Type descriptor with an explicit stride and generic arguments.
#[derive(Debug)]
pub struct MockType {
	name: String,
	stride: Option<u64>,
	generics: Vec<TypeRef>,
	system: Option<Arc<dyn TypeSystem>>,
}

impl MockType {
	/// A fixed-size type attached to a default [`MockTypeSystem`].
	pub fn scalar(name: impl Into<String>, stride: u64) -> Self {
		Self {
			name: name.into(),
			stride: Some(stride),
			generics: Vec::new(),
			system: Some(Arc::new(MockTypeSystem::default())),
		}
	}

	/// A pointer-sized generic type such as `Swift.Dictionary<K, V>`.
	pub fn generic(name: impl Into<String>, arguments: Vec<TypeRef>) -> Self {
		Self {
			generics: arguments,
			..Self::scalar(name, 8)
		}
	}

	/// A type the layout engine cannot size.
	pub fn unsized_type(name: impl Into<String>) -> Self {
		Self {
			stride: None,
			..Self::scalar(name, 0)
		}
	}

	pub fn with_type_system(mut self, system: Arc<dyn TypeSystem>) -> Self {
		self.system = Some(system);
		self
	}

	pub fn without_type_system(mut self) -> Self {
		self.system = None;
		self
	}

	pub fn into_ref(self) -> TypeRef {
		Arc::new(self)
	}
}

impl TypeInfo for MockType {
	fn name(&self) -> &str {
		&self.name
	}

	fn byte_stride(&self) -> Option<u64> {
		self.stride
	}

	fn generic_argument(&self, index: usize) -> Option<TypeRef> {
		self.generics.get(index).cloned()
	}

	fn type_system(&self) -> Option<Arc<dyn TypeSystem>> {
		self.system.clone()
	}
}

/// Declarative description of a value tree.
///
/// [`build`](Self::build) seals it into shared nodes, handing the root's process down
/// to every descendant that does not name its own.
#[derive(Debug, Clone, Default)]
pub struct MockValue {
	name: String,
	type_name: Option<String>,
	ty: Option<TypeRef>,
	process: Option<ProcessRef>,
	children: Vec<MockValue>,
	unsigned: Option<u64>,
	string: Option<String>,
	dynamic: Option<Box<MockValue>>,
}

impl MockValue {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			..Self::default()
		}
	}

	pub fn typed(mut self, ty: TypeRef) -> Self {
		self.ty = Some(ty);
		self
	}

	/// Overrides the runtime type name reported independently of the declared type.
	pub fn type_name(mut self, name: impl Into<String>) -> Self {
		self.type_name = Some(name.into());
		self
	}

	pub fn process(mut self, process: ProcessRef) -> Self {
		self.process = Some(process);
		self
	}

	pub fn child(mut self, child: MockValue) -> Self {
		self.children.push(child);
		self
	}

	pub fn unsigned(mut self, value: u64) -> Self {
		self.unsigned = Some(value);
		self
	}

	pub fn string(mut self, value: impl Into<String>) -> Self {
		self.string = Some(value.into());
		self
	}

	pub fn dynamic(mut self, value: MockValue) -> Self {
		self.dynamic = Some(Box::new(value));
		self
	}

	/// Builds a chain of single-child nodes ending in an unsigned leaf.
	pub fn path(names: &[&str], leaf: u64) -> Self {
		let (last, parents) = names.split_last().expect("path needs at least one name");
		let mut node = Self::new(*last).unsigned(leaf);
		for name in parents.iter().rev() {
			node = Self::new(*name).child(node);
		}
		node
	}

	pub fn build(self) -> ValueRef {
		self.seal(None)
	}

	fn seal(self, inherited: Option<ProcessRef>) -> Arc<MockNode> {
		let process = self.process.or(inherited);
		Arc::new(MockNode {
			children: self
				.children
				.into_iter()
				.map(|child| child.seal(process.clone()))
				.collect(),
			dynamic: self.dynamic.map(|value| value.seal(process.clone())),
			name: self.name,
			type_name: self.type_name,
			ty: self.ty,
			process,
			unsigned: self.unsigned,
			string: self.string,
			synthetic: Cell::new(false),
		})
	}
}

/// Sealed node produced by [`MockValue::build`].
#[derive(Debug)]
pub struct MockNode {
	name: String,
	type_name: Option<String>,
	ty: Option<TypeRef>,
	process: Option<ProcessRef>,
	children: Vec<Arc<MockNode>>,
	unsigned: Option<u64>,
	string: Option<String>,
	dynamic: Option<Arc<MockNode>>,
	synthetic: Cell<bool>,
}

impl ValueNode for MockNode {
	fn name(&self) -> &str {
		&self.name
	}

	fn compiler_type(&self) -> Option<TypeRef> {
		self.ty.clone()
	}

	fn type_name(&self) -> Option<String> {
		self.type_name
			.clone()
			.or_else(|| self.ty.as_ref().map(|ty| ty.name().to_owned()))
	}

	fn process(&self) -> Option<ProcessRef> {
		self.process.clone()
	}

	fn child_by_name(&self, name: &str) -> Option<ValueRef> {
		self.children
			.iter()
			.find(|child| child.name == name)
			.map(|child| Arc::clone(child) as ValueRef)
	}

	fn child_at_index(&self, index: usize) -> Option<ValueRef> {
		self.children.get(index).map(|child| Arc::clone(child) as ValueRef)
	}

	fn as_unsigned(&self, fail_value: u64) -> u64 {
		self.unsigned.unwrap_or(fail_value)
	}

	fn as_str(&self) -> Option<String> {
		self.string.clone()
	}

	fn dynamic_representation(&self) -> Option<ValueRef> {
		self.dynamic.as_ref().map(|value| Arc::clone(value) as ValueRef)
	}

	fn set_synthetic_generated(&self, generated: bool) {
		self.synthetic.set(generated);
	}

	fn is_synthetic_generated(&self) -> bool {
		self.synthetic.get()
	}
}

/// One interaction with [`MockForeignRuntime`] or a front end it created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForeignCall {
	ClassOf(Addr),
	Create(Addr),
	Update,
	NumChildren,
	ChildAt(usize),
}

type CallLog = Rc<RefCell<Vec<ForeignCall>>>;

/// Foreign runtime backed by fixed class and collection tables.
#[derive(Debug, Default)]
pub struct MockForeignRuntime {
	classes: BTreeMap<Addr, ClassDescriptor>,
	collections: BTreeMap<Addr, Vec<ValueRef>>,
	calls: CallLog,
}

impl MockForeignRuntime {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a class without a collection, so front end creation fails.
	pub fn with_class(mut self, addr: Addr, class_name: impl Into<String>) -> Self {
		self.classes.insert(
			addr,
			ClassDescriptor {
				name: class_name.into(),
			},
		);
		self
	}

	/// Registers a collection instance and its class.
	pub fn with_collection(self, addr: Addr, class_name: impl Into<String>, children: Vec<ValueRef>) -> Self {
		let mut runtime = self.with_class(addr, class_name);
		runtime.collections.insert(addr, children);
		runtime
	}

	/// Every call made so far, front ends included.
	pub fn calls(&self) -> Vec<ForeignCall> {
		self.calls.borrow().clone()
	}
}

impl ForeignRuntime for MockForeignRuntime {
	fn class_of(&self, addr: Addr) -> Option<ClassDescriptor> {
		self.calls.borrow_mut().push(ForeignCall::ClassOf(addr));
		self.classes.get(&addr).cloned()
	}

	fn create_front_end(&self, object: &ForeignObject) -> Option<Box<dyn ChildrenFrontEnd>> {
		self.calls.borrow_mut().push(ForeignCall::Create(object.address));
		let children = self.collections.get(&object.address)?.clone();
		Some(Box::new(MockForeignFrontEnd {
			children,
			updated: false,
			calls: Rc::clone(&self.calls),
		}))
	}
}

/// Front end that only reports children after its first update.
#[derive(Debug)]
pub struct MockForeignFrontEnd {
	children: Vec<ValueRef>,
	updated: bool,
	calls: CallLog,
}

impl ChildrenFrontEnd for MockForeignFrontEnd {
	fn update(&mut self) -> CacheState {
		self.calls.borrow_mut().push(ForeignCall::Update);
		self.updated = true;
		CacheState::NotCached
	}

	fn num_children(&mut self) -> usize {
		self.calls.borrow_mut().push(ForeignCall::NumChildren);
		if self.updated { self.children.len() } else { 0 }
	}

	fn child_at_index(&mut self, index: usize) -> Option<ValueRef> {
		self.calls.borrow_mut().push(ForeignCall::ChildAt(index));
		if !self.updated {
			return None;
		}
		self.children.get(index).cloned()
	}

	fn index_of_child(&mut self, name: &str) -> Option<usize> {
		self.children.iter().position(|child| child.name() == name)
	}
}
