use bstr::BString;
use deku::prelude::*;

use crate::hash::name_hash;

/// What an object does when a message reaches it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, DekuRead, DekuWrite)]
#[deku(id_type = "u8", endian = "endian", ctx = "endian: deku::ctx::Endian")]
#[repr(u8)]
pub enum ResponseAction {
	Show = 1,
	Hide = 2,

	/// Start the object's scripts.
	Play = 3,

	/// Stop the object's scripts.
	Stop = 4,

	/// Re-send the message to the target.
	Forward = 5,
}

/// A rule binding an incoming message to an action on a target object.
#[derive(Debug, Clone, PartialEq, DekuRead, DekuWrite)]
#[deku(endian = "endian", ctx = "endian: deku::ctx::Endian")]
pub struct MessageResponse {
	/// Hash of the message name.
	pub message: u64, // 8 = 8

	/// Name hash of the object acted upon.
	pub target: u64, // 8 = 16

	pub action: ResponseAction, // 1 = 17

	/// Seconds to wait before acting.
	pub delay: f32, // 4 = 21
}

pub const MESSAGE_RESPONSE_SIZE: usize = 21;

impl MessageResponse {
	pub fn new(message: &str, target: &str, action: ResponseAction) -> Self {
		Self {
			message: name_hash(message),
			target: name_hash(target),
			action,
			delay: 0.0,
		}
	}

	pub fn with_delay(mut self, delay: f32) -> Self {
		self.delay = delay;
		self
	}
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, DekuRead, DekuWrite)]
#[deku(id_type = "u8", endian = "endian", ctx = "endian: deku::ctx::Endian")]
#[repr(u8)]
pub enum ResourceKind {
	Texture = 1,
	Font = 2,
	Sound = 3,
}

/// Reference to an external resource an object needs loaded.
#[derive(Debug, Clone, PartialEq, Eq, DekuRead, DekuWrite)]
#[deku(endian = "endian", ctx = "endian: deku::ctx::Endian")]
pub struct ResourceRequest {
	pub kind: ResourceKind,

	#[deku(
		reader = "crate::deku_helpers::reader_bstring(deku::reader)",
		writer = "crate::deku_helpers::writer_bstring(deku::writer, &self.path)"
	)]
	pub path: BString,
}

impl ResourceRequest {
	pub fn new(kind: ResourceKind, path: impl Into<BString>) -> Self {
		Self {
			kind,
			path: path.into(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		error::Error,
		primitives::{decode, encode},
	};

	#[test]
	fn response_has_fixed_width() {
		let response =
			MessageResponse::new("click", "menu", ResponseAction::Forward).with_delay(0.25);
		let bytes = encode(&response).unwrap();
		assert_eq!(bytes.len(), MESSAGE_RESPONSE_SIZE);
		assert_eq!(decode::<MessageResponse>(&bytes).unwrap(), response);
	}

	#[test]
	fn resource_round_trips() {
		let request = ResourceRequest::new(ResourceKind::Font, "fonts/body.ttf");
		let bytes = encode(&request).unwrap();
		assert_eq!(bytes[0], 2);
		assert_eq!(&bytes[1..3], &14u16.to_le_bytes());
		assert_eq!(decode::<ResourceRequest>(&bytes).unwrap(), request);
	}

	#[test]
	fn unknown_action_is_malformed() {
		let mut bytes = encode(&MessageResponse::new("a", "b", ResponseAction::Show)).unwrap();
		bytes[16] = 0xee;
		assert!(matches!(
			decode::<MessageResponse>(&bytes),
			Err(Error::Malformed(_))
		));
	}
}
