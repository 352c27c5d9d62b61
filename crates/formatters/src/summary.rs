use hoard_inferior::ValueRef;

use crate::buffer::BufferHandler;
use crate::profile::{ContainerKind, ContainerProfile};

/// One-line summary such as `4 key/value pairs`, or `None` when `value` cannot be
/// decoded as this profile's container.
pub fn summarize(value: &ValueRef, profile: &ContainerProfile) -> Option<String> {
	let mut handler = BufferHandler::create(value, profile)?;
	Some(format_count(profile.kind, handler.count()))
}

pub fn format_count(kind: ContainerKind, count: usize) -> String {
	let noun = match kind {
		ContainerKind::Dictionary => "key/value pair",
		ContainerKind::Set => "value",
	};
	let plural = if count == 1 { "" } else { "s" };
	format!("{count} {noun}{plural}")
}

#[cfg(test)]
mod tests {
	use hoard_inferior::mock::{MockProcess, MockValue};
	use pretty_assertions::assert_eq;
	use rstest::rstest;

	use super::*;
	use crate::test_fixtures::{TableFixture, unresolved_dictionary_type};

	#[rstest]
	#[case(ContainerKind::Dictionary, 0, "0 key/value pairs")]
	#[case(ContainerKind::Dictionary, 1, "1 key/value pair")]
	#[case(ContainerKind::Dictionary, 4, "4 key/value pairs")]
	#[case(ContainerKind::Set, 1, "1 value")]
	#[case(ContainerKind::Set, 3, "3 values")]
	fn counts(#[case] kind: ContainerKind, #[case] count: usize, #[case] expected: &str) {
		assert_eq!(format_count(kind, count), expected);
	}

	fn summary_of(fixture: &TableFixture) -> Option<String> {
		let (_, process) = fixture.memory().shared();
		summarize(&fixture.native_container(&process).build(), &fixture.profile())
	}

	#[test]
	fn dictionary_summary() {
		assert_eq!(summary_of(&TableFixture::map(8, &[1, 3, 4, 6])).as_deref(), Some("4 key/value pairs"));
		assert_eq!(summary_of(&TableFixture::map(8, &[5])).as_deref(), Some("1 key/value pair"));
	}

	#[test]
	fn set_summary() {
		assert_eq!(summary_of(&TableFixture::set(8, &[0, 2, 7])).as_deref(), Some("3 values"));
	}

	#[test]
	fn summary_reports_header_count_of_unreadable_table() {
		let fixture = TableFixture::set(8, &[0, 2]);
		let (_, process) = fixture.memory().with_unreadable(0x1000..0x1008).shared();
		let value = fixture.native_container(&process).build();
		assert_eq!(summarize(&value, &fixture.profile()).as_deref(), Some("2 values"));
	}

	#[test]
	fn no_summary_when_element_types_are_unresolved() {
		let fixture = TableFixture::map(8, &[1, 3, 4, 6]);
		let (_, process) = fixture.memory().shared();
		let value = fixture
			.native_container_typed(unresolved_dictionary_type(), &process)
			.build();
		assert_eq!(summarize(&value, &fixture.profile()), None);
	}

	#[test]
	fn no_summary_without_handler() {
		let (_, process) = MockProcess::new(8).shared();
		let value = MockValue::new("x").type_name("Swift.Int").process(process).build();
		assert_eq!(summarize(&value, &ContainerProfile::set()), None);
	}
}
