//! Read-only interfaces to an inspected process.
//!
//! Formatters reach the target exclusively through the traits in this crate: raw
//! memory reads ([`Process`]), type metadata ([`TypeInfo`], [`TypeSystem`]), the value
//! tree the debugger already built ([`ValueNode`]), and the bridged foreign runtime
//! ([`ForeignRuntime`]). Nothing here executes code in the inspected process.

/// Error types for memory access.
pub mod error;
/// Bridged foreign-collection runtime.
pub mod foreign;
/// Synthetic children front end contract shared with the presentation layer.
pub mod front_end;
/// Process memory access.
pub mod memory;
/// In-memory target used by tests.
#[cfg(any(test, feature = "test-support"))]
pub mod mock;
/// Type metadata.
pub mod types;
/// Value tree navigation and materialized constant values.
pub mod value;

pub use error::{MemoryError, Result};
pub use foreign::{ClassDescriptor, ForeignObject, ForeignRuntime};
pub use front_end::{CacheState, ChildrenFrontEnd};
pub use memory::{Addr, ByteOrder, INVALID_ADDRESS, Process, ProcessRef, offset_address};
pub use types::{NameMangler, TupleElement, TypeInfo, TypeRef, TypeSystem};
pub use value::{ConstValue, ValueNode, ValueRef};
