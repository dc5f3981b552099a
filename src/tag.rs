//! Tag framing inside a chunk.
//!
//! A tag is a `u16` kind followed by its payload. When the active
//! [`TagRegistry`] gives the kind a fixed length, the payload follows the kind
//! directly; otherwise a `u32` length comes first. Kinds a registry does not
//! know are always length-prefixed, so a reader can step over them.

use bstr::BString;

use crate::{
	error::{Error, Result},
	message::MessageResponse,
	object::ObjectRecord,
	primitives::encode,
};

pub use registry::{TagLength, TagRegistry, TagSpec};
pub use stream::{StreamState, TagStream};

mod registry;
mod stream;

pub type TagKind = u16;

pub const TAG_KIND_SIZE: usize = std::mem::size_of::<TagKind>();
pub const TAG_LENGTH_SIZE: usize = std::mem::size_of::<u32>();

/// Expected object count, used to size buffers.
pub const TAG_COUNT_HINT: TagKind = 0x0001;

/// Name hashes of objects that messages may be sent to.
pub const TAG_TARGETS: TagKind = 0x0002;

pub const TAG_OBJECT: TagKind = 0x0010;

/// A message response for the most recent object.
pub const TAG_RESPONSE: TagKind = 0x0011;

pub const TAG_TITLE: TagKind = 0x0100;

#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
	CountHint(u32),
	Targets(Vec<u64>),
	Object(Box<ObjectRecord>),
	Response(MessageResponse),
	Title(BString),

	/// Payload of a kind the registry does not know.
	Raw(Vec<u8>),
}

impl TagValue {
	/// Encode the value as a tag payload.
	pub fn to_payload(&self) -> Result<Vec<u8>> {
		match self {
			Self::CountHint(count) => encode(count),
			Self::Targets(targets) => Ok(targets
				.iter()
				.flat_map(|target| target.to_le_bytes())
				.collect()),
			Self::Object(record) => record.to_bytes(),
			Self::Response(response) => encode(response),
			Self::Title(title) => Ok(title.to_vec()),
			Self::Raw(bytes) => Ok(bytes.clone()),
		}
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
	pub kind: TagKind,

	/// Offset of the tag's kind in the buffer it was read from.
	pub offset: usize,

	/// Payload length in bytes.
	pub length: u32,

	pub value: TagValue,
}

impl Tag {
	pub fn write(&self, registry: &TagRegistry, out: &mut Vec<u8>) -> Result<()> {
		write_tag(out, registry, self.kind, &self.value.to_payload()?)
	}
}

/// Append one tag to `out`, framed the way `registry` expects.
pub fn write_tag(
	out: &mut Vec<u8>,
	registry: &TagRegistry,
	kind: TagKind,
	payload: &[u8],
) -> Result<()> {
	match registry.get(kind).map(|spec| spec.length) {
		Some(TagLength::Fixed(expected)) => {
			if payload.len() != expected as usize {
				return Err(Error::TagLengthMismatch {
					kind,
					expected,
					actual: payload.len(),
				});
			}
			out.extend_from_slice(&kind.to_le_bytes());
		}
		_ => {
			let length: u32 = payload.len().try_into().map_err(|_| {
				Error::Malformed(format!("tag {kind:#06x} payload is too long"))
			})?;
			out.extend_from_slice(&kind.to_le_bytes());
			out.extend_from_slice(&length.to_le_bytes());
		}
	}
	out.extend_from_slice(payload);
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		message::ResponseAction,
		object::{Object, ObjectKind},
	};

	#[test]
	fn fixed_tags_have_no_length_prefix() {
		let mut out = Vec::new();
		write_tag(
			&mut out,
			TagRegistry::objects(),
			TAG_COUNT_HINT,
			&3u32.to_le_bytes(),
		)
		.unwrap();
		assert_eq!(out, vec![0x01, 0x00, 0x03, 0x00, 0x00, 0x00]);
	}

	#[test]
	fn unknown_tags_are_length_prefixed() {
		let mut out = Vec::new();
		write_tag(&mut out, TagRegistry::objects(), 0x7777, b"abc").unwrap();
		assert_eq!(out, vec![0x77, 0x77, 0x03, 0x00, 0x00, 0x00, b'a', b'b', b'c']);
	}

	#[test]
	fn fixed_length_is_enforced_on_write() {
		let mut out = Vec::new();
		let err = write_tag(&mut out, TagRegistry::objects(), TAG_COUNT_HINT, &[1, 2]).unwrap_err();
		assert!(matches!(
			err,
			Error::TagLengthMismatch {
				kind: TAG_COUNT_HINT,
				expected: 4,
				actual: 2
			}
		));
		assert!(out.is_empty());
	}

	#[test]
	fn tag_values_survive_the_stream() {
		let registry = TagRegistry::objects();
		let values = [
			(TAG_COUNT_HINT, TagValue::CountHint(12)),
			(TAG_TARGETS, TagValue::Targets(vec![1, u64::MAX])),
			(
				TAG_RESPONSE,
				TagValue::Response(MessageResponse::new("tap", "menu", ResponseAction::Show)),
			),
			(0x0fff, TagValue::Raw(vec![9, 8, 7])),
		];

		let mut out = Vec::new();
		for (kind, value) in &values {
			write_tag(&mut out, registry, *kind, &value.to_payload().unwrap()).unwrap();
		}

		let read: Vec<Tag> = TagStream::whole(&out, registry)
			.collect::<Result<_>>()
			.unwrap();
		assert_eq!(read.len(), values.len());
		for (tag, (kind, value)) in read.iter().zip(&values) {
			assert_eq!(tag.kind, *kind);
			assert_eq!(&tag.value, value);
		}
	}

	#[test]
	fn object_payload_must_be_filled_exactly() {
		let mut payload = ObjectRecord::encode(&Object::new(ObjectKind::Image, "icon")).unwrap();
		payload.extend([0, 0]);
		let mut out = Vec::new();
		write_tag(&mut out, TagRegistry::objects(), TAG_OBJECT, &payload).unwrap();

		let mut stream = TagStream::whole(&out, TagRegistry::objects());
		assert!(matches!(stream.next_tag(), Err(Error::Malformed(_))));
		assert_eq!(stream.state(), StreamState::Exhausted);
	}
}
