use deku::prelude::*;

use super::{DataBlock, ObjectData};
use crate::object::ObjectKind;

/// Texture-space rectangle sampled by an image.
#[derive(Debug, Copy, Clone, PartialEq, DekuRead, DekuWrite)]
#[deku(endian = "endian", ctx = "endian: deku::ctx::Endian")]
pub struct UvRect {
	pub u0: f32,
	pub v0: f32,
	pub u1: f32,
	pub v1: f32,
}

impl Default for UvRect {
	fn default() -> Self {
		Self {
			u0: 0.0,
			v0: 0.0,
			u1: 1.0,
			v1: 1.0,
		}
	}
}

#[derive(Debug, Default, Clone, PartialEq, DekuRead, DekuWrite)]
#[deku(endian = "endian", ctx = "endian: deku::ctx::Endian")]
pub struct ImageData {
	pub base: ObjectData, // 56 = 56
	pub uv: UvRect,       // 16 = 72

	/// Index into the package's texture table.
	pub texture: u32, // 4 = 76
}

pub const IMAGE_DATA_SIZE: usize = std::mem::size_of::<ImageData>();
const _: [(); IMAGE_DATA_SIZE] = [(); 76];

impl DataBlock for ImageData {
	const KIND: ObjectKind = ObjectKind::Image;
	const WIRE_SIZE: usize = IMAGE_DATA_SIZE;

	fn base(&self) -> &ObjectData {
		&self.base
	}

	fn base_mut(&mut self) -> &mut ObjectData {
		&mut self.base
	}
}
