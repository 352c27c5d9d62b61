use std::sync::Arc;

use hoard_inferior::ForeignRuntime;
use hoard_inferior::mock::{ForeignCall, MockForeignRuntime, MockProcess, MockValue};
use pretty_assertions::assert_eq;
use rstest::rstest;

use super::*;
use crate::test_fixtures::{
	BITMASK_ADDR, TableFixture, VALUES_ADDR, key_byte, unresolved_dictionary_type, value_byte,
};

#[rstest]
#[case("[0]", Some(0))]
#[case("[42]", Some(42))]
#[case("[7", Some(7))]
#[case("[]", None)]
#[case("[", None)]
#[case("3", None)]
#[case("[-1]", None)]
#[case("[0x10]", None)]
#[case("[1]]", None)]
#[case("key", None)]
fn child_names(#[case] name: &str, #[case] expected: Option<usize>) {
	assert_eq!(parse_child_index(name), expected);
}

fn native_front_end(fixture: &TableFixture) -> HashedContainerFrontEnd {
	front_end_over(fixture, fixture.memory())
}

fn front_end_over(fixture: &TableFixture, memory: MockProcess) -> HashedContainerFrontEnd {
	let (_, process) = memory.shared();
	HashedContainerFrontEnd::new(fixture.native_container(&process).build(), fixture.profile())
}

fn bridged_value(runtime: &Arc<MockForeignRuntime>, pointer: u64) -> ValueRef {
	let handle: Arc<dyn ForeignRuntime> = runtime.clone();
	let (_, process) = MockProcess::new(8).with_foreign_runtime(handle).shared();
	MockValue::new("dict")
		.type_name("Swift.Dictionary<Swift.String, Swift.Int>")
		.process(process)
		.child(
			MockValue::new("_variant").string("cocoa").child(
				MockValue::new("cocoa").child(MockValue::new("object").child(MockValue::new("rawValue").unsigned(pointer))),
			),
		)
		.build()
}

#[test]
fn stale_front_end_has_no_children() {
	let mut front_end = native_front_end(&TableFixture::map(8, &[1, 3]));
	assert!(front_end.is_stale());
	assert!(front_end.might_have_children());
	assert_eq!(front_end.num_children(), 0);
	assert!(front_end.child_at_index(0).is_none());
	assert_eq!(front_end.index_of_child("[0]"), None);
}

#[test]
fn native_children_after_update() {
	// 0b0101_1010
	let mut front_end = native_front_end(&TableFixture::map(8, &[1, 3, 4, 6]));
	assert_eq!(front_end.update(), CacheState::NotCached);
	assert!(!front_end.is_stale());
	assert_eq!(front_end.num_children(), 4);

	let child = front_end.child_at_index(3).unwrap();
	assert_eq!(child.name(), "[3]");
	assert!(child.is_synthetic_generated());
	let data = child.data().unwrap();
	assert_eq!((data[0], data[8]), (key_byte(6), value_byte(6)));

	assert!(front_end.child_at_index(4).is_none());
	assert_eq!(front_end.index_of_child("[3]"), Some(3));
	assert_eq!(front_end.index_of_child("[4]"), None);
	assert_eq!(front_end.index_of_child("count"), None);
}

#[test]
fn front_end_keeps_the_value_it_decodes() {
	let fixture = TableFixture::map(8, &[1]);
	let (_, process) = fixture.memory().shared();
	let value = fixture.native_container(&process).build();
	let mut front_end = HashedContainerFrontEnd::new(value.clone(), fixture.profile());
	front_end.update();
	assert!(Arc::ptr_eq(front_end.value(), &value));
	assert_eq!(front_end.value().name(), "container");
}

#[test]
fn unresolved_element_types_have_no_children() {
	let fixture = TableFixture::map(8, &[1, 3, 4, 6]);
	let (_, process) = fixture.memory().shared();
	let value = fixture
		.native_container_typed(unresolved_dictionary_type(), &process)
		.build();
	let mut front_end = HashedContainerFrontEnd::new(value, fixture.profile());
	assert_eq!(front_end.update(), CacheState::NotCached);
	assert!(front_end.handler().is_none());
	assert_eq!(front_end.num_children(), 0);
	assert!(front_end.child_at_index(0).is_none());
}

#[test]
fn unreadable_value_hides_child() {
	let fixture = TableFixture::map(4, &[1, 2]);
	let memory = fixture.memory().with_unreadable(VALUES_ADDR + 16..VALUES_ADDR + 17);
	let mut front_end = front_end_over(&fixture, memory);
	front_end.update();
	assert_eq!(front_end.num_children(), 2);
	assert!(front_end.child_at_index(0).is_some());
	assert!(front_end.child_at_index(1).is_none());
}

#[test]
fn unreadable_bitmask_word_hides_later_children() {
	let fixture = TableFixture::map(192, &[0, 100, 150]);
	let memory = fixture.memory().with_unreadable(BITMASK_ADDR + 8..BITMASK_ADDR + 16);
	let mut front_end = front_end_over(&fixture, memory);
	front_end.update();
	assert_eq!(front_end.num_children(), 3);
	assert!(front_end.child_at_index(0).is_some());
	assert!(front_end.child_at_index(1).is_none());
	assert!(front_end.child_at_index(2).is_none());
}

#[test]
fn update_never_reports_cached() {
	let mut front_end = native_front_end(&TableFixture::set(4, &[0]));
	assert_eq!(front_end.update(), CacheState::NotCached);
	assert_eq!(front_end.update(), CacheState::NotCached);
	assert_eq!(front_end.num_children(), 1);
}

#[test]
fn bridged_front_end_is_updated_before_use() {
	let children = vec![MockValue::new("k0").build(), MockValue::new("k1").build()];
	let runtime = Arc::new(MockForeignRuntime::new().with_collection(0x6000, "__NSDictionaryM", children));
	let mut front_end = HashedContainerFrontEnd::new(bridged_value(&runtime, 0x2000_0000_0000_6000), ContainerProfile::dictionary());
	front_end.update();

	assert_eq!(front_end.num_children(), 2);
	let child = front_end.child_at_index(0).unwrap();
	assert_eq!(child.name(), "k0");
	assert!(child.is_synthetic_generated());
	assert_eq!(
		runtime.calls(),
		vec![
			ForeignCall::ClassOf(0x6000),
			ForeignCall::Create(0x6000),
			ForeignCall::Update,
			ForeignCall::NumChildren,
			ForeignCall::ChildAt(0),
		]
	);
}

#[test]
fn each_update_rebuilds_bridged_delegate() {
	let runtime = Arc::new(MockForeignRuntime::new().with_collection(0x6000, "__NSDictionaryM", Vec::new()));
	let mut front_end = HashedContainerFrontEnd::new(bridged_value(&runtime, 0x6000), ContainerProfile::dictionary());
	front_end.update();
	front_end.update();
	let updates = runtime.calls().into_iter().filter(|call| *call == ForeignCall::Update).count();
	assert_eq!(updates, 2);
}

#[test]
fn undecodable_value_after_update() {
	let (_, process) = MockProcess::new(8).shared();
	let value = MockValue::new("x").type_name("Swift.Int").process(process).build();
	let mut front_end = HashedContainerFrontEnd::new(value, ContainerProfile::dictionary());
	assert_eq!(front_end.update(), CacheState::NotCached);
	assert!(front_end.handler().is_none());
	assert_eq!(front_end.num_children(), 0);
	assert!(front_end.child_at_index(0).is_none());
	assert_eq!(front_end.index_of_child("[0]"), None);
	assert!(front_end.might_have_children());
}
