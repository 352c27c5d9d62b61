//! Built-in formatter registrations.
//!
//! Registers the standard library dictionary and set families under the `swift`
//! language, keyed by the public generic type, the native storage classes and the
//! legacy placeholder types.

use hoard_inferior::{NameMangler, ValueRef};

use crate::front_end::HashedContainerFrontEnd;
use crate::matcher::FormatterTable;
use crate::profile::{ContainerKind, ContainerProfile};
use crate::summary::summarize;

/// Language the built-in entries are registered under.
pub const LANGUAGE: &str = "swift";

fn public_prefix(kind: ContainerKind) -> &'static str {
	match kind {
		ContainerKind::Dictionary => "Swift.Dictionary<",
		ContainerKind::Set => "Swift.Set<",
	}
}

/// Adds the dictionary and set entries to `table`.
///
/// With a `mangler`, storage classes are matched under the target's current mangling
/// instead of the legacy one.
pub fn register(table: &mut FormatterTable<ContainerProfile>, mangler: Option<&dyn NameMangler>) {
	for kind in [ContainerKind::Dictionary, ContainerKind::Set] {
		let mut profile = ContainerProfile::for_kind(kind);
		if let Some(mangler) = mangler {
			profile = profile.with_mangler(mangler);
		}
		let names = [
			public_prefix(kind).to_owned(),
			profile.mangled_storage_name.clone(),
			profile.demangled_storage_name.clone(),
			profile.deferred_prefix.clone(),
			profile.typed_storage_prefix.clone(),
		];
		for name in names {
			table.add_prefix(LANGUAGE, name, profile.clone());
		}
		tracing::trace!(kind = kind.as_str(), "registered built-in container formatters");
	}
}

/// A table holding only the built-in entries, under legacy mangling.
pub fn builtin_table() -> FormatterTable<ContainerProfile> {
	let mut table = FormatterTable::new();
	register(&mut table, None);
	table
}

fn profile_for<'a>(table: &'a FormatterTable<ContainerProfile>, value: &ValueRef) -> Option<&'a ContainerProfile> {
	let type_name = value.type_name()?;
	let profile = table.lookup(&type_name);
	if profile.is_none() {
		tracing::trace!(%type_name, "no container formatter registered");
	}
	profile
}

/// Children front end for `value`, if its type has a registered profile.
///
/// The front end is returned stale; the caller updates it before reading children.
pub fn front_end_for(table: &FormatterTable<ContainerProfile>, value: &ValueRef) -> Option<HashedContainerFrontEnd> {
	let profile = profile_for(table, value)?;
	Some(HashedContainerFrontEnd::new(value.clone(), profile.clone()))
}

/// Summary line for `value`, if its type has a registered profile and decodes.
pub fn summary_for(table: &FormatterTable<ContainerProfile>, value: &ValueRef) -> Option<String> {
	summarize(value, profile_for(table, value)?)
}
