use hoard_inferior::{TupleElement, TypeRef};

use crate::error::LayoutError;

/// Byte layout of one logical element.
///
/// Keys and values live in separate arrays, but an element is presented as a single
/// `(key: K, value: V)` record. The record may carry alignment padding between the two
/// members, so value bytes are placed at `padded_key_stride`, not at `key_stride`.
#[derive(Debug, Clone)]
pub struct ElementLayout {
	/// Key type for sets, `(key: K, value: V)` for dictionaries.
	pub element_type: TypeRef,
	pub key_stride: u64,
	/// Zero for sets.
	pub value_stride: u64,
	/// Element stride minus value stride.
	pub padded_key_stride: u64,
}

impl ElementLayout {
	/// Resolves the layout from the container's key and optional value type.
	pub fn resolve(key: Option<TypeRef>, value: Option<TypeRef>) -> Result<Self, LayoutError> {
		let key = key.ok_or(LayoutError::MissingKeyType)?;
		let key_stride = stride_of(&key)?;
		let Some(value) = value else {
			return Ok(Self {
				element_type: key,
				key_stride,
				value_stride: 0,
				padded_key_stride: key_stride,
			});
		};

		let value_stride = stride_of(&value)?;
		let tuple_unavailable = || LayoutError::TupleUnavailable {
			key: key.name().to_owned(),
			value: value.name().to_owned(),
		};
		let element_type = key
			.type_system()
			.and_then(|system| {
				system.tuple_type(&[
					TupleElement::new("key", key.clone()),
					TupleElement::new("value", value.clone()),
				])
			})
			.ok_or_else(tuple_unavailable)?;
		let element_stride = stride_of(&element_type)?;
		let padded_key_stride = element_stride
			.checked_sub(value_stride)
			.filter(|padded| *padded >= key_stride)
			.ok_or(LayoutError::InconsistentStride {
				element: element_stride,
				key: key_stride,
				value: value_stride,
			})?;

		Ok(Self {
			element_type,
			key_stride,
			value_stride,
			padded_key_stride,
		})
	}

	/// Whether elements are bare keys.
	pub fn is_set(&self) -> bool {
		self.value_stride == 0
	}

	/// Size of one materialized element buffer.
	pub fn element_size(&self) -> u64 {
		self.padded_key_stride + self.value_stride
	}
}

fn stride_of(ty: &TypeRef) -> Result<u64, LayoutError> {
	ty.byte_stride().ok_or_else(|| LayoutError::UnknownStride {
		type_name: ty.name().to_owned(),
	})
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use hoard_inferior::mock::{MockType, MockTypeSystem};
	use pretty_assertions::assert_eq;

	use super::*;

	fn int(stride: u64) -> TypeRef {
		MockType::scalar(format!("Int{}", stride * 8), stride).into_ref()
	}

	#[test]
	fn set_layout_is_the_key() {
		let layout = ElementLayout::resolve(Some(int(8)), None).unwrap();
		assert!(layout.is_set());
		assert_eq!(layout.element_type.name(), "Int64");
		assert_eq!((layout.key_stride, layout.padded_key_stride, layout.element_size()), (8, 8, 8));
	}

	#[test]
	fn dictionary_layout_same_width() {
		let layout = ElementLayout::resolve(Some(int(8)), Some(int(8))).unwrap();
		assert!(!layout.is_set());
		assert_eq!(layout.element_type.name(), "(key: Int64, value: Int64)");
		assert_eq!((layout.key_stride, layout.value_stride, layout.padded_key_stride), (8, 8, 8));
		assert_eq!(layout.element_size(), 16);
	}

	#[test]
	fn narrow_key_is_padded_to_value_alignment() {
		let layout = ElementLayout::resolve(Some(int(1)), Some(int(8))).unwrap();
		assert_eq!(layout.key_stride, 1);
		assert_eq!(layout.padded_key_stride, 8);
		assert_eq!(layout.element_size(), 16);
	}

	#[test]
	fn missing_key_type() {
		assert_eq!(
			ElementLayout::resolve(None, Some(int(8))).unwrap_err(),
			LayoutError::MissingKeyType
		);
	}

	#[test]
	fn unsized_value_type() {
		let value = MockType::unsized_type("Opaque").into_ref();
		assert_eq!(
			ElementLayout::resolve(Some(int(8)), Some(value)).unwrap_err(),
			LayoutError::UnknownStride {
				type_name: "Opaque".into()
			}
		);
	}

	#[test]
	fn key_without_type_system_cannot_pair() {
		let key = MockType::scalar("Int64", 8).without_type_system().into_ref();
		assert!(matches!(
			ElementLayout::resolve(Some(key), Some(int(8))),
			Err(LayoutError::TupleUnavailable { .. })
		));
	}

	#[test]
	fn refusing_type_system_cannot_pair() {
		let key = MockType::scalar("Int64", 8)
			.with_type_system(Arc::new(MockTypeSystem::refusing_tuples()))
			.into_ref();
		assert!(matches!(
			ElementLayout::resolve(Some(key), Some(int(8))),
			Err(LayoutError::TupleUnavailable { .. })
		));
	}
}
