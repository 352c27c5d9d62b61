//! Container profiles.
//!
//! A profile carries everything that differs between container families and runtime
//! releases: the storage type names to recognize and the field names to look for. The
//! built-in profiles describe the standard library layouts; hosts can deserialize their
//! own to follow a newer runtime without touching the decoder.

use hoard_inferior::NameMangler;
use serde::{Deserialize, Serialize};

/// Container family a profile decodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerKind {
	/// Key/value container.
	Dictionary,
	/// Keys only.
	Set,
}

impl ContainerKind {
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Dictionary => "dictionary",
			Self::Set => "set",
		}
	}

	/// Whether elements carry a value next to the key.
	pub const fn is_map(self) -> bool {
		matches!(self, Self::Dictionary)
	}
}

/// Historical field names, each list ordered newest release first.
///
/// Paths are dotted member chains (`native._storage`). Lookups try candidates in order and
/// take the first that resolves, so retiring or adding a runtime release only edits
/// these lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldSchema {
	/// Enum field holding the active representation.
	pub discriminators: Vec<String>,
	/// Discriminator case for native storage.
	pub native_tag: String,
	/// Discriminator case for a bridged foreign collection.
	pub bridged_tag: String,
	/// Native storage, relative to the discriminator.
	pub native_storage: Vec<String>,
	/// Bridged collection wrapper, relative to the discriminator.
	pub bridged_object: Vec<String>,
	/// Native storage inside a deferred-bridging placeholder.
	pub deferred_storage: Vec<String>,
	/// Pointer to a storage header holding capacity and count.
	pub header_buffer: String,
	pub capacity: String,
	pub count: String,
	pub bitmask: String,
	pub keys: String,
	pub values: String,
}

impl Default for FieldSchema {
	fn default() -> Self {
		Self {
			discriminators: strings(&["_variant", "_variantBuffer", "_variantStorage"]),
			native_tag: "native".into(),
			bridged_tag: "cocoa".into(),
			native_storage: strings(&["native._storage", "native.nativeStorage"]),
			bridged_object: strings(&["cocoa.object", "cocoa.cocoaDictionary"]),
			deferred_storage: strings(&["base._storage", "nativeBuffer._storage"]),
			header_buffer: "buffer".into(),
			capacity: "bucketCount._value".into(),
			count: "count._value".into(),
			bitmask: "initializedEntries.values._rawValue".into(),
			keys: "keys._rawValue".into(),
			values: "values._rawValue".into(),
		}
	}
}

fn strings(items: &[&str]) -> Vec<String> {
	items.iter().map(|item| (*item).to_owned()).collect()
}

/// Splits a dotted member path for [`ValueNode::child_by_path`](hoard_inferior::ValueNode::child_by_path).
pub(crate) fn split_path(path: &str) -> Vec<&str> {
	path.split('.').collect()
}

/// Decoding profile for one container family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerProfile {
	pub kind: ContainerKind,
	/// Mangled runtime name prefix of the native storage class.
	pub mangled_storage_name: String,
	/// Demangled runtime name prefix of the native storage class.
	pub demangled_storage_name: String,
	/// Type name prefix of the deferred-bridging placeholder.
	pub deferred_prefix: String,
	/// Type name prefix of typed native storage from older runtimes.
	pub typed_storage_prefix: String,
	#[serde(default)]
	pub fields: FieldSchema,
}

impl ContainerProfile {
	/// Standard library dictionary layout.
	pub fn dictionary() -> Self {
		Self {
			kind: ContainerKind::Dictionary,
			mangled_storage_name: "_TtGCs37_HashableTypedNativeDictionaryStorage".into(),
			demangled_storage_name: "Swift._HashableTypedNativeDictionaryStorage<".into(),
			deferred_prefix: "Swift._SwiftDeferredNSDictionary<".into(),
			typed_storage_prefix: "Swift._HashableTypedNativeDictionaryStorage".into(),
			fields: FieldSchema::default(),
		}
	}

	/// Standard library set layout.
	pub fn set() -> Self {
		Self {
			kind: ContainerKind::Set,
			mangled_storage_name: "_TtCs22_NativeSetStorageOwner".into(),
			demangled_storage_name: "Swift._NativeSetStorageOwner with unmangled suffix".into(),
			deferred_prefix: "Swift._SwiftDeferredNSSet<".into(),
			typed_storage_prefix: "Swift._HashableTypedNativeSetStorage".into(),
			fields: FieldSchema {
				bridged_object: strings(&["cocoa.object", "cocoa.cocoaSet"]),
				..FieldSchema::default()
			},
		}
	}

	pub fn for_kind(kind: ContainerKind) -> Self {
		match kind {
			ContainerKind::Dictionary => Self::dictionary(),
			ContainerKind::Set => Self::set(),
		}
	}

	/// Rewrites the mangled storage name for the running target's mangling scheme.
	pub fn with_mangler(mut self, mangler: &dyn NameMangler) -> Self {
		self.mangled_storage_name = mangler.current_mangled_name(&self.mangled_storage_name);
		self
	}

	/// Whether `type_name` names the native storage class itself.
	pub fn is_storage_type(&self, type_name: &str) -> bool {
		starts_with_nonempty(type_name, &self.mangled_storage_name)
			|| starts_with_nonempty(type_name, &self.demangled_storage_name)
	}

	pub fn is_deferred_type(&self, type_name: &str) -> bool {
		starts_with_nonempty(type_name, &self.deferred_prefix)
	}

	pub fn is_typed_storage_type(&self, type_name: &str) -> bool {
		starts_with_nonempty(type_name, &self.typed_storage_prefix)
	}
}

impl Default for ContainerProfile {
	fn default() -> Self {
		Self::dictionary()
	}
}

fn starts_with_nonempty(name: &str, prefix: &str) -> bool {
	!prefix.is_empty() && name.starts_with(prefix)
}
