//! Scripts attached to objects.
//!
//! Each object kind holds one script type. [`Script`] is the object-safe view
//! shared by all of them; [`ScriptBlock`] adds what the typed storage needs.

use std::fmt::Debug;

use bstr::BString;
use deku::{ctx::Endian, prelude::*};

use crate::{error::Result, object::ObjectKind, primitives::Vec3};

/// Stable script identifier, unique within one object.
pub type ScriptId = u32;

pub trait Script: Debug {
	fn id(&self) -> ScriptId;

	/// Kind of object this script belongs to.
	fn kind(&self) -> ObjectKind;

	fn clone_script(&self) -> Box<dyn Script>;

	/// Encode the script on its own.
	fn to_bytes(&self) -> Result<Vec<u8>>;
}

impl Clone for Box<dyn Script> {
	fn clone(&self) -> Self {
		self.clone_script()
	}
}

pub trait ScriptBlock:
	Script + Clone + PartialEq + for<'a> DekuReader<'a, Endian> + DekuWriter<Endian> + 'static
{
	/// A default script with the given id.
	fn with_id(id: ScriptId) -> Self;
}

macro_rules! script_impl {
	($ty:ty, $kind:expr) => {
		impl Script for $ty {
			fn id(&self) -> ScriptId {
				self.id
			}

			fn kind(&self) -> ObjectKind {
				$kind
			}

			fn clone_script(&self) -> Box<dyn Script> {
				Box::new(self.clone())
			}

			fn to_bytes(&self) -> Result<Vec<u8>> {
				crate::primitives::encode(self)
			}
		}

		impl ScriptBlock for $ty {
			fn with_id(id: ScriptId) -> Self {
				Self {
					id,
					..Default::default()
				}
			}
		}
	};
}

#[derive(Debug, Default, Copy, Clone, PartialEq, DekuRead, DekuWrite)]
#[deku(endian = "endian", ctx = "endian: deku::ctx::Endian")]
pub struct Keyframe {
	/// Seconds from the start of the script.
	pub time: f32,
	pub position: Vec3,
}

/// Moves an element through a list of keyframes.
#[derive(Debug, Default, Clone, PartialEq, DekuRead, DekuWrite)]
#[deku(endian = "endian", ctx = "endian: deku::ctx::Endian")]
pub struct ElementScript {
	pub id: ScriptId,
	pub looped: bool,

	#[deku(
		reader = "crate::deku_helpers::reader_vec(deku::reader)",
		writer = "crate::deku_helpers::writer_vec(deku::writer, &self.keyframes)"
	)]
	pub keyframes: Vec<Keyframe>,
}

script_impl!(ElementScript, ObjectKind::Element);

/// Flip-book animation over texture frames.
#[derive(Debug, Default, Clone, PartialEq, DekuRead, DekuWrite)]
#[deku(endian = "endian", ctx = "endian: deku::ctx::Endian")]
pub struct ImageScript {
	pub id: ScriptId,
	pub frame_rate: f32,

	#[deku(
		reader = "crate::deku_helpers::reader_vec(deku::reader)",
		writer = "crate::deku_helpers::writer_vec(deku::writer, &self.frames)"
	)]
	pub frames: Vec<u32>,
}

script_impl!(ImageScript, ObjectKind::Image);

/// Swaps a label's text after a delay.
#[derive(Debug, Default, Clone, PartialEq, DekuRead, DekuWrite)]
#[deku(endian = "endian", ctx = "endian: deku::ctx::Endian")]
pub struct LabelScript {
	pub id: ScriptId,
	pub delay: f32,

	#[deku(
		reader = "crate::deku_helpers::reader_bstring(deku::reader)",
		writer = "crate::deku_helpers::writer_bstring(deku::writer, &self.text)"
	)]
	pub text: BString,
}

script_impl!(LabelScript, ObjectKind::Label);

#[cfg(test)]
mod tests {
	use super::*;
	use crate::primitives::decode;

	#[test]
	fn scripts_round_trip() {
		let element = ElementScript {
			id: 4,
			looped: true,
			keyframes: vec![
				Keyframe {
					time: 0.0,
					position: Vec3::ZERO,
				},
				Keyframe {
					time: 0.5,
					position: Vec3::new(10.0, 0.0, 0.0),
				},
			],
		};
		assert_eq!(
			decode::<ElementScript>(&element.to_bytes().unwrap()).unwrap(),
			element
		);

		let image = ImageScript {
			id: 1,
			frame_rate: 24.0,
			frames: vec![0, 1, 2, 1],
		};
		assert_eq!(
			decode::<ImageScript>(&image.to_bytes().unwrap()).unwrap(),
			image
		);

		let label = LabelScript {
			id: 9,
			delay: 2.5,
			text: "Game over".into(),
		};
		assert_eq!(
			decode::<LabelScript>(&label.to_bytes().unwrap()).unwrap(),
			label
		);
	}

	#[test]
	fn boxed_clone_keeps_concrete_type() {
		let script: Box<dyn Script> = Box::new(ImageScript::with_id(12));
		let copy = script.clone();
		assert_eq!(copy.id(), 12);
		assert_eq!(copy.kind(), ObjectKind::Image);
		assert_eq!(copy.to_bytes().unwrap(), script.to_bytes().unwrap());
	}

	#[test]
	fn with_id_is_otherwise_default() {
		let script = LabelScript::with_id(3);
		assert_eq!(script.id, 3);
		assert_eq!(script.delay, 0.0);
		assert!(script.text.is_empty());
	}
}
