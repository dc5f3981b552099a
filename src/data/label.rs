use deku::prelude::*;

use super::{DataBlock, ObjectData};
use crate::{object::ObjectKind, primitives::Color};

#[derive(Debug, Clone, PartialEq, DekuRead, DekuWrite)]
#[deku(endian = "endian", ctx = "endian: deku::ctx::Endian")]
pub struct LabelData {
	pub base: ObjectData,  // 56 = 56
	pub font_size: f32,    // 4 = 60
	pub line_spacing: f32, // 4 = 64
	pub text_color: Color, // 4 = 68
}

pub const LABEL_DATA_SIZE: usize = std::mem::size_of::<LabelData>();
const _: [(); LABEL_DATA_SIZE] = [(); 68];

impl Default for LabelData {
	fn default() -> Self {
		Self {
			base: ObjectData::default(),
			font_size: 16.0,
			line_spacing: 1.0,
			text_color: Color::rgba(0, 0, 0, 255),
		}
	}
}

impl DataBlock for LabelData {
	const KIND: ObjectKind = ObjectKind::Label;
	const WIRE_SIZE: usize = LABEL_DATA_SIZE;

	fn base(&self) -> &ObjectData {
		&self.base
	}

	fn base_mut(&mut self) -> &mut ObjectData {
		&mut self.base
	}
}
