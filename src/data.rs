//! Attribute blocks carried by every object.
//!
//! [`ObjectData`] is the root block. Each kind-specific block embeds it as its
//! first field, so its encoding always starts with the exact root layout and
//! a reader that knows only the root can decode the prefix.

use std::fmt::Debug;

use deku::{ctx::Endian, prelude::*};

use crate::{
	object::ObjectKind,
	primitives::{Color, Quat, Vec3},
};

pub use image::{ImageData, UvRect, IMAGE_DATA_SIZE};
pub use label::{LabelData, LABEL_DATA_SIZE};

mod image;
mod label;

/// Common capability set of the attribute blocks.
pub trait DataBlock:
	Debug + Clone + PartialEq + Default + for<'a> DekuReader<'a, Endian> + DekuWriter<Endian>
{
	/// The object kind that owns this block.
	const KIND: ObjectKind;

	/// Encoded width in bytes.
	const WIRE_SIZE: usize;

	fn base(&self) -> &ObjectData;

	fn base_mut(&mut self) -> &mut ObjectData;
}

#[derive(Debug, Default, Clone, PartialEq, DekuRead, DekuWrite)]
#[deku(endian = "endian", ctx = "endian: deku::ctx::Endian")]
pub struct ObjectData {
	pub color: Color,   // 4 = 4
	pub pivot: Vec3,    // 12 = 16
	pub position: Vec3, // 12 = 28
	pub rotation: Quat, // 16 = 44
	pub size: Vec3,     // 12 = 56
}

pub const OBJECT_DATA_SIZE: usize = std::mem::size_of::<ObjectData>();
const _: [(); OBJECT_DATA_SIZE] = [(); 56];

impl DataBlock for ObjectData {
	const KIND: ObjectKind = ObjectKind::Element;
	const WIRE_SIZE: usize = OBJECT_DATA_SIZE;

	fn base(&self) -> &ObjectData {
		self
	}

	fn base_mut(&mut self) -> &mut ObjectData {
		self
	}
}
