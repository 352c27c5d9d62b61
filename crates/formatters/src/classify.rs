//! Representation classification.
//!
//! A container value is, at any moment, in one of three shapes: its own native storage
//! object, a wrapper whose discriminator selects native storage or a bridged foreign
//! collection, or a legacy placeholder type from older runtimes. Rules are tried in
//! that order; the first that matches decides.

use std::sync::Arc;

use hoard_inferior::{ForeignObject, ForeignRuntime, INVALID_ADDRESS, ValueRef};

use crate::error::{DecodeError, Result};
use crate::profile::{ContainerProfile, split_path};

/// Tag bits the foreign runtime keeps in the top byte of object pointers.
///
/// Bridged instance references carry runtime flags in their most significant byte;
/// only the low 56 bits address the object.
pub const FOREIGN_POINTER_MASK: u64 = 0x00FF_FFFF_FFFF_FFFF;

/// Clears the foreign runtime's tag bits from an object pointer.
pub const fn strip_tag_bits(pointer: u64) -> u64 {
	pointer & FOREIGN_POINTER_MASK
}

/// Physical representation a container currently uses.
#[derive(Debug)]
pub enum Representation {
	/// Native hash table storage.
	Native {
		/// Value whose declared type supplies the key and value generic arguments.
		container: ValueRef,
		/// Storage object holding the header, bitmask and element arrays.
		storage: ValueRef,
	},
	/// Collection bridged into the foreign runtime.
	Foreign {
		runtime: Arc<dyn ForeignRuntime>,
		object: ForeignObject,
	},
}

/// Classifies `value` against `profile`.
pub fn classify(value: &ValueRef, profile: &ContainerProfile) -> Result<Representation> {
	let process = value.process().ok_or(DecodeError::NoProcess)?;
	let dynamic = value.dynamic_representation().unwrap_or_else(|| Arc::clone(value));
	let type_name = value.type_name().unwrap_or_default();

	if profile.is_storage_type(&type_name) {
		tracing::trace!(%type_name, "value is native storage");
		return Ok(Representation::Native {
			container: Arc::clone(value),
			storage: dynamic,
		});
	}

	let fields = &profile.fields;
	let Some(variant) = fields
		.discriminators
		.iter()
		.find_map(|name| dynamic.child_by_name(name))
	else {
		return classify_legacy(dynamic, type_name, profile);
	};

	let tag = variant.as_str().ok_or_else(|| DecodeError::Unrecognized {
		type_name: type_name.clone(),
	})?;
	if tag == fields.native_tag {
		let storage = first_child(&variant, &fields.native_storage)?;
		tracing::trace!(%type_name, "discriminator selects native storage");
		Ok(Representation::Native {
			container: dynamic,
			storage,
		})
	} else if tag == fields.bridged_tag {
		let runtime = process.foreign_runtime().ok_or(DecodeError::ForeignUnavailable {
			reason: "process has no foreign runtime",
		})?;
		let object = locate_bridged_object(&variant, runtime.as_ref(), profile)?;
		tracing::debug!(%type_name, address = object.address, class = %object.class.name, "container bridged to foreign collection");
		Ok(Representation::Foreign { runtime, object })
	} else {
		tracing::debug!(%type_name, %tag, "unknown discriminator case");
		Err(DecodeError::Unrecognized { type_name })
	}
}

/// Rules for values without any discriminator field.
fn classify_legacy(dynamic: ValueRef, type_name: String, profile: &ContainerProfile) -> Result<Representation> {
	if profile.is_deferred_type(&type_name) {
		let storage = first_child(&dynamic, &profile.fields.deferred_storage)?;
		tracing::trace!(%type_name, "deferred bridging placeholder");
		return Ok(Representation::Native {
			container: dynamic,
			storage,
		});
	}
	if profile.is_typed_storage_type(&type_name) {
		tracing::trace!(%type_name, "typed native storage");
		return Ok(Representation::Native {
			container: Arc::clone(&dynamic),
			storage: dynamic,
		});
	}
	Err(DecodeError::Unrecognized { type_name })
}

fn locate_bridged_object(
	variant: &ValueRef,
	runtime: &dyn ForeignRuntime,
	profile: &ContainerProfile,
) -> Result<ForeignObject> {
	let wrapper = first_child(variant, &profile.fields.bridged_object)?;
	let instance = wrapper
		.child_at_index(0)
		.ok_or(DecodeError::ForeignUnavailable {
			reason: "bridged wrapper has no instance reference",
		})?;
	let pointer = instance.as_unsigned(INVALID_ADDRESS);
	if pointer == INVALID_ADDRESS {
		return Err(DecodeError::ForeignUnavailable {
			reason: "bridged instance pointer unreadable",
		});
	}
	let address = strip_tag_bits(pointer);
	let class = runtime.class_of(address).ok_or(DecodeError::ForeignUnavailable {
		reason: "bridged instance has no class",
	})?;
	Ok(ForeignObject { address, class })
}

/// First candidate path that resolves under `parent`.
fn first_child(parent: &ValueRef, candidates: &[String]) -> Result<ValueRef> {
	candidates
		.iter()
		.find_map(|path| parent.child_by_path(&split_path(path)))
		.ok_or_else(|| DecodeError::MissingField {
			field: candidates.join(" | "),
		})
}
