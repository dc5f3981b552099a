use std::iter::FusedIterator;

use super::{Tag, TagLength, TagRegistry, TagValue, TAG_KIND_SIZE, TAG_LENGTH_SIZE};
use crate::{
	error::{Error, Result},
	primitives::decode,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
	Scanning,

	/// The chunk is used up, or a tag failed to read.
	Exhausted,
}

/// Reads the tags of one chunk, in file order.
///
/// The stream is bounded by the chunk's declared range, not by the buffer:
/// a tag that would cross the chunk end fails with
/// [`Error::ChunkOverrun`] even if the buffer has more bytes after it.
///
/// After any error the stream is exhausted and the chunk should be dropped.
pub struct TagStream<'a> {
	buffer: &'a [u8],
	pos: usize,
	end: usize,
	registry: &'a TagRegistry,
	state: StreamState,
}

impl std::fmt::Debug for TagStream<'_> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("TagStream")
			.field("pos", &self.pos)
			.field("end", &self.end)
			.field("state", &self.state)
			.finish()
	}
}

impl<'a> TagStream<'a> {
	/// Stream the chunk occupying `size` bytes of `buffer` from `start`.
	pub fn new(buffer: &'a [u8], start: usize, size: usize, registry: &'a TagRegistry) -> Self {
		Self {
			buffer,
			pos: start,
			end: start.saturating_add(size),
			registry,
			state: StreamState::Scanning,
		}
	}

	/// Stream a buffer holding exactly one chunk's tags.
	pub fn whole(buffer: &'a [u8], registry: &'a TagRegistry) -> Self {
		Self::new(buffer, 0, buffer.len(), registry)
	}

	pub fn state(&self) -> StreamState {
		self.state
	}

	/// Offset of the next tag in the buffer.
	pub fn offset(&self) -> usize {
		self.pos
	}

	/// Bytes left before the chunk end.
	pub fn remaining(&self) -> usize {
		self.end.saturating_sub(self.pos)
	}

	/// Whether another tag can start before the chunk end.
	pub fn has_tag(&mut self) -> bool {
		if self.state == StreamState::Scanning {
			let remaining = self.remaining();
			if remaining >= TAG_KIND_SIZE {
				return true;
			}

			if remaining > 0 {
				tracing::trace!(remaining, "ignoring slack at end of chunk");
			}
			self.state = StreamState::Exhausted;
		}

		false
	}

	/// Read the next tag.
	pub fn next_tag(&mut self) -> Result<Tag> {
		let result = self.read_tag();
		if result.is_err() {
			self.state = StreamState::Exhausted;
		}
		result
	}

	#[tracing::instrument(level = "trace", skip(self), fields(offset = self.pos))]
	fn read_tag(&mut self) -> Result<Tag> {
		let offset = self.pos;
		if self.state == StreamState::Exhausted {
			return Err(Error::ChunkOverrun {
				offset,
				end: self.end,
			});
		}

		let kind = decode(self.take(offset, TAG_KIND_SIZE)?)?;
		let registry = self.registry;
		let spec = registry.get(kind);
		let length = match spec.map(|spec| spec.length) {
			Some(TagLength::Fixed(length)) => length,
			Some(TagLength::Prefixed) | None => decode(self.take(offset, TAG_LENGTH_SIZE)?)?,
		};
		tracing::trace!(
			kind,
			length,
			name = spec.map(|spec| spec.name),
			"read tag header"
		);

		let payload = self.take(offset, length as usize)?;
		let value = match spec {
			Some(spec) => (spec.decode)(payload)?,
			None => TagValue::Raw(payload.to_vec()),
		};

		Ok(Tag {
			kind,
			offset,
			length,
			value,
		})
	}

	fn take(&mut self, offset: usize, len: usize) -> Result<&'a [u8]> {
		let stop = self
			.pos
			.checked_add(len)
			.filter(|stop| *stop <= self.end)
			.ok_or(Error::ChunkOverrun {
				offset,
				end: self.end,
			})?;
		let buffer = self.buffer;
		let bytes = buffer
			.get(self.pos..stop)
			.ok_or(Error::UnexpectedEndOfData)?;
		self.pos = stop;
		Ok(bytes)
	}
}

impl Iterator for TagStream<'_> {
	type Item = Result<Tag>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.has_tag() {
			Some(self.next_tag())
		} else {
			None
		}
	}
}

impl FusedIterator for TagStream<'_> {}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::tag::{write_tag, TagSpec, TAG_COUNT_HINT, TAG_TARGETS};

	fn chunk(tags: &[(u16, &[u8])]) -> Vec<u8> {
		let mut out = Vec::new();
		for (kind, payload) in tags {
			write_tag(&mut out, TagRegistry::objects(), *kind, payload).unwrap();
		}
		out
	}

	#[test]
	fn has_tag_matches_tag_count() {
		let hashes: Vec<u8> = [5u64, 6].iter().flat_map(|h| h.to_le_bytes()).collect();
		let bytes = chunk(&[
			(TAG_COUNT_HINT, &2u32.to_le_bytes()),
			(TAG_TARGETS, &hashes),
			(0x0999, b"future"),
		]);

		let mut stream = TagStream::whole(&bytes, TagRegistry::objects());
		let mut count = 0;
		while stream.has_tag() {
			stream.next_tag().unwrap();
			count += 1;
		}
		assert_eq!(count, 3);
		assert_eq!(stream.state(), StreamState::Exhausted);
		assert_eq!(stream.remaining(), 0);
		assert!(!stream.has_tag());
	}

	#[test]
	fn offset_follows_each_tag() {
		let bytes = chunk(&[
			(TAG_COUNT_HINT, &1u32.to_le_bytes()),
			(0x0999, b"xy"),
		]);
		let stream = &mut TagStream::new(&bytes, 0, bytes.len(), TagRegistry::objects());
		assert_eq!(stream.offset(), 0);
		stream.next_tag().unwrap();
		assert_eq!(stream.offset(), 6);
		let tag = stream.next_tag().unwrap();
		assert_eq!(tag.offset, 6);
		assert_eq!(stream.offset(), bytes.len());
	}

	#[test]
	fn stays_inside_declared_range() {
		// two chunks back to back; only the first is streamed
		let first = chunk(&[(TAG_COUNT_HINT, &1u32.to_le_bytes())]);
		let mut buffer = first.clone();
		buffer.extend(chunk(&[(TAG_COUNT_HINT, &9u32.to_le_bytes())]));

		let tags: Vec<Tag> = TagStream::new(&buffer, 0, first.len(), TagRegistry::objects())
			.collect::<Result<_>>()
			.unwrap();
		assert_eq!(tags.len(), 1);
		assert_eq!(tags[0].value, TagValue::CountHint(1));
	}

	#[test]
	fn overrun_is_reported_not_read() {
		let mut bytes = chunk(&[(0x0999, b"abcdef")]);
		let declared = bytes.len() - 2;
		// adjacent data that the tag would spill into
		bytes.extend([0xaa; 16]);

		let mut stream = TagStream::new(&bytes, 0, declared, TagRegistry::objects());
		assert!(stream.has_tag());
		assert!(matches!(
			stream.next_tag(),
			Err(Error::ChunkOverrun { offset: 0, end }) if end == declared
		));
		assert_eq!(stream.state(), StreamState::Exhausted);
		assert!(!stream.has_tag());
		assert!(stream.next().is_none());
	}

	#[test]
	fn header_overrun_at_chunk_end() {
		// a prefixed kind with only half its length field inside the chunk
		let bytes = [0x02, 0x00, 0x08, 0x00];
		let mut stream = TagStream::whole(&bytes, TagRegistry::objects());
		assert!(matches!(
			stream.next_tag(),
			Err(Error::ChunkOverrun { .. })
		));
	}

	#[test]
	fn truncated_buffer_is_end_of_data() {
		let bytes = chunk(&[(0x0999, b"abcdef")]);
		// the declared chunk is larger than what was actually read
		let mut stream = TagStream::new(&bytes[..8], 0, bytes.len(), TagRegistry::objects());
		assert!(matches!(
			stream.next_tag(),
			Err(Error::UnexpectedEndOfData)
		));
	}

	#[test]
	fn slack_shorter_than_a_kind_is_ignored() {
		let mut bytes = chunk(&[(TAG_COUNT_HINT, &4u32.to_le_bytes())]);
		bytes.push(0);
		let tags: Vec<Tag> = TagStream::whole(&bytes, TagRegistry::objects())
			.collect::<Result<_>>()
			.unwrap();
		assert_eq!(tags.len(), 1);
	}

	#[test]
	fn registry_is_injectable() {
		fn decode_flag(payload: &[u8]) -> Result<TagValue> {
			Ok(TagValue::CountHint(payload[0].into()))
		}

		let registry = TagRegistry::new().with(
			0x0042,
			TagSpec {
				name: "flag",
				length: TagLength::Fixed(1),
				decode: decode_flag,
			},
		);
		let bytes = [0x42, 0x00, 0x07, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0xaa, 0xbb];

		let mut stream = TagStream::whole(&bytes, &registry);
		let first = stream.next_tag().unwrap();
		assert_eq!(first.value, TagValue::CountHint(7));
		assert_eq!(first.length, 1);

		// the standard count hint is unknown here, so it carries a prefix
		let second = stream.next_tag().unwrap();
		assert_eq!(second.kind, 0x0001);
		assert_eq!(second.length, 0);
		assert_eq!(second.value, TagValue::Raw(Vec::new()));
		assert_eq!(stream.remaining(), 2);
	}
}
