use std::collections::HashMap;

use bstr::BString;
use once_cell::sync::Lazy;

use super::{TagKind, TagValue, TAG_COUNT_HINT, TAG_OBJECT, TAG_RESPONSE, TAG_TARGETS, TAG_TITLE};
use crate::{
	error::{Error, Result},
	message::{MessageResponse, MESSAGE_RESPONSE_SIZE},
	object::ObjectRecord,
	primitives::{decode, decode_exact},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagLength {
	/// The payload is always this many bytes and has no length prefix.
	Fixed(u32),

	/// The payload is preceded by a `u32` length.
	Prefixed,
}

/// How to frame and decode one tag kind.
#[derive(Clone, Copy)]
pub struct TagSpec {
	pub name: &'static str,
	pub length: TagLength,
	pub decode: fn(&[u8]) -> Result<TagValue>,
}

impl std::fmt::Debug for TagSpec {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TagSpec")
			.field("name", &self.name)
			.field("length", &self.length)
			.finish()
	}
}

/// Tag vocabulary of one chunk kind.
///
/// Built once and then only read, so one registry can serve any number of
/// streams.
#[derive(Debug, Default, Clone)]
pub struct TagRegistry {
	specs: HashMap<TagKind, TagSpec>,
}

static OBJECTS: Lazy<TagRegistry> = Lazy::new(|| {
	TagRegistry::new()
		.with(
			TAG_COUNT_HINT,
			TagSpec {
				name: "count-hint",
				length: TagLength::Fixed(4),
				decode: decode_count_hint,
			},
		)
		.with(
			TAG_TARGETS,
			TagSpec {
				name: "targets",
				length: TagLength::Prefixed,
				decode: decode_targets,
			},
		)
		.with(
			TAG_OBJECT,
			TagSpec {
				name: "object",
				length: TagLength::Prefixed,
				decode: decode_object,
			},
		)
		.with(
			TAG_RESPONSE,
			TagSpec {
				name: "response",
				length: TagLength::Fixed(MESSAGE_RESPONSE_SIZE as _),
				decode: decode_response,
			},
		)
});

static METADATA: Lazy<TagRegistry> = Lazy::new(|| {
	TagRegistry::new().with(
		TAG_TITLE,
		TagSpec {
			name: "title",
			length: TagLength::Prefixed,
			decode: decode_title,
		},
	)
});

impl TagRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Register a kind, replacing any earlier spec for it.
	pub fn with(mut self, kind: TagKind, spec: TagSpec) -> Self {
		self.specs.insert(kind, spec);
		self
	}

	pub fn get(&self, kind: TagKind) -> Option<&TagSpec> {
		self.specs.get(&kind)
	}

	pub fn contains(&self, kind: TagKind) -> bool {
		self.specs.contains_key(&kind)
	}

	/// Vocabulary of `OBJS` chunks.
	pub fn objects() -> &'static TagRegistry {
		&OBJECTS
	}

	/// Vocabulary of `META` chunks.
	pub fn metadata() -> &'static TagRegistry {
		&METADATA
	}
}

fn decode_count_hint(payload: &[u8]) -> Result<TagValue> {
	decode_exact(payload).map(TagValue::CountHint)
}

fn decode_targets(payload: &[u8]) -> Result<TagValue> {
	if payload.len() % 8 != 0 {
		return Err(Error::Malformed(format!(
			"target list of {} bytes is not a whole number of hashes",
			payload.len()
		)));
	}

	payload
		.chunks_exact(8)
		.map(decode::<u64>)
		.collect::<Result<_>>()
		.map(TagValue::Targets)
}

fn decode_object(payload: &[u8]) -> Result<TagValue> {
	ObjectRecord::from_bytes(payload).map(|record| TagValue::Object(Box::new(record)))
}

fn decode_response(payload: &[u8]) -> Result<TagValue> {
	decode_exact::<MessageResponse>(payload).map(TagValue::Response)
}

fn decode_title(payload: &[u8]) -> Result<TagValue> {
	Ok(TagValue::Title(BString::from(payload)))
}
