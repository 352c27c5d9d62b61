//! Passive decoders for hashed containers living in an inspected process.
//!
//! A dictionary or set is stored as an open-addressed table: an occupancy bitmask plus
//! parallel key and value arrays. This crate reconstructs the logical collection from
//! raw memory reads and type metadata alone, without running code in the target.
//!
//! # Layers
//!
//! - [`matcher`] picks a [`ContainerProfile`] for a runtime type name.
//! - [`classify`] decides which physical representation a value currently uses.
//! - [`BufferHandler`] decodes that representation, either natively
//!   ([`NativeStorageBuffer`]) or through the bridged runtime ([`ForeignDelegateBuffer`]).
//! - [`HashedContainerFrontEnd`] and [`summarize`] are what the presentation layer sees.
//!
//! Every failure is local: the worst outcome is a container shown with no children or
//! without a summary line.

/// Occupancy bitmask reader with per-word caching.
pub mod bitmask;
/// Buffer handler variants.
pub mod buffer;
/// Built-in formatter registrations.
pub mod builtin;
/// Representation classification.
pub mod classify;
/// Error types for decoding.
pub mod error;
/// Bridged foreign-collection delegate.
pub mod foreign;
/// Synthetic children front end.
pub mod front_end;
/// Element stride and padding resolution.
pub mod layout;
/// Type name matchers and the formatter table.
pub mod matcher;
/// Native hash table storage decoder.
pub mod native;
/// Container profiles: storage type names and historical field layouts.
pub mod profile;
/// One-line summaries.
pub mod summary;

#[cfg(test)]
pub(crate) mod test_fixtures;

pub use bitmask::OccupancyBitmap;
pub use buffer::BufferHandler;
pub use classify::{FOREIGN_POINTER_MASK, Representation, classify, strip_tag_bits};
pub use error::{DecodeError, LayoutError, Result};
pub use foreign::ForeignDelegateBuffer;
pub use front_end::{HashedContainerFrontEnd, parse_child_index};
pub use layout::ElementLayout;
pub use matcher::{FormatterTable, TypeNameMatcher};
pub use native::NativeStorageBuffer;
pub use profile::{ContainerKind, ContainerProfile, FieldSchema};
pub use summary::{format_count, summarize};
