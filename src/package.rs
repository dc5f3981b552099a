//! The package container: a header followed by a run of chunks.
//!
//! ```plain
//! magic        b"UIPK"
//! version      u16
//! chunk_count  u16
//! chunks       chunk_count × (kind u32, size u32, size bytes of tags)
//! ```

use std::rc::Rc;

use bstr::BString;
use deku::prelude::*;
use uuid::Uuid;

use crate::{
	dispatch::{dispatch, DispatchStats, MessageResponseBuilder, MetadataCollector, PackageBuilder},
	error::{Error, Result},
	hash::name_hash,
	object::{Object, ObjectRecord},
	options::{ReadOptions, UnknownChunks, WriteOptions},
	primitives::{decode, encode},
	tag::{write_tag, TagRegistry, TagStream, TAG_COUNT_HINT, TAG_OBJECT, TAG_RESPONSE, TAG_TARGETS, TAG_TITLE},
};

pub const PACKAGE_MAGIC: &[u8; 4] = b"UIPK";
pub const PACKAGE_VERSION: u16 = 1;

pub const PACKAGE_HEADER_SIZE: usize = 8;
pub const CHUNK_HEADER_SIZE: usize = 8;

// magic 4 = 4
#[derive(Debug, Clone, PartialEq, Eq, DekuRead, DekuWrite)]
#[deku(
	magic = b"UIPK",
	endian = "endian",
	ctx = "endian: deku::ctx::Endian"
)]
pub struct PackageHeader {
	pub version: u16, // 2 = 6

	pub chunk_count: u16, // 2 = 8
}

impl PackageHeader {
	/// Read and check the header at the start of `bytes`.
	pub fn read(bytes: &[u8]) -> Result<Self> {
		if bytes.len() < PACKAGE_MAGIC.len() {
			return Err(Error::UnexpectedEndOfData);
		}
		if !bytes.starts_with(PACKAGE_MAGIC) {
			return Err(Error::BadMagic);
		}

		let header: Self = decode(bytes)?;
		if header.version != PACKAGE_VERSION {
			return Err(Error::UnsupportedVersion(header.version));
		}
		Ok(header)
	}
}

/// Chunk kinds, stored as little-endian four-character codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, DekuRead, DekuWrite)]
#[deku(id_type = "u32", endian = "endian", ctx = "endian: deku::ctx::Endian")]
pub enum ChunkKind {
	/// `OBJS`: objects, their responses, and message targets.
	#[deku(id = "0x534A424F")]
	Objects,

	/// `META`: package metadata.
	#[deku(id = "0x4154454D")]
	Metadata,

	/// Unknown chunks are skipped or rejected depending on the read options.
	#[deku(id_pat = "_")]
	Unknown(u32),
}

impl ChunkKind {
	/// The four-character code as it appears in the file.
	pub fn fourcc(self) -> [u8; 4] {
		match self {
			Self::Objects => *b"OBJS",
			Self::Metadata => *b"META",
			Self::Unknown(kind) => kind.to_le_bytes(),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, DekuRead, DekuWrite)]
#[deku(endian = "endian", ctx = "endian: deku::ctx::Endian")]
pub struct ChunkHeader {
	pub kind: ChunkKind, // 4 = 4

	/// Size of the chunk body in bytes, not counting this header.
	pub size: u32, // 4 = 8
}

/// A decoded package.
///
/// Objects are in file order and their parents are linked to the package's
/// own objects.
#[derive(Debug, Default, Clone)]
pub struct Package {
	pub title: Option<BString>,
	pub objects: Vec<Rc<Object>>,

	/// Name hashes of the objects that messages may be sent to.
	pub message_targets: Vec<u64>,
}

impl Package {
	pub fn new() -> Self {
		Self::default()
	}

	#[tracing::instrument(level = "debug", skip_all, fields(len = bytes.len()))]
	pub fn from_bytes(bytes: &[u8], options: &ReadOptions) -> Result<Self> {
		let header = PackageHeader::read(bytes)?;
		tracing::trace!(?header, "read package header");

		let mut builder = PackageBuilder::new();
		let mut responses = MessageResponseBuilder::new();
		let mut stats = DispatchStats::default();
		let mut pos = PACKAGE_HEADER_SIZE;

		for _ in 0..header.chunk_count {
			let rest = bytes.get(pos..).ok_or(Error::UnexpectedEndOfData)?;
			let chunk: ChunkHeader = decode(rest)?;
			pos += CHUNK_HEADER_SIZE;

			let size = chunk.size as usize;
			if bytes.len() - pos < size {
				return Err(Error::UnexpectedEndOfData);
			}
			tracing::trace!(kind = ?chunk.kind, offset = pos, size, "read chunk header");

			match chunk.kind {
				ChunkKind::Objects => {
					let mut stream = TagStream::new(bytes, pos, size, TagRegistry::objects());
					stats += dispatch(&mut stream, &mut builder, &mut responses, options)?;
				}
				ChunkKind::Metadata => {
					let mut stream = TagStream::new(bytes, pos, size, TagRegistry::metadata());
					stats += dispatch(&mut stream, &mut builder, &mut MetadataCollector, options)?;
				}
				ChunkKind::Unknown(kind) => match options.unknown_chunks {
					UnknownChunks::Skip => {
						tracing::debug!(kind = %hex_fourcc(kind), size, "skipping unknown chunk");
					}
					UnknownChunks::Reject => return Err(Error::UnknownChunk(kind)),
				},
			}

			pos += size;
		}

		if pos < bytes.len() {
			tracing::trace!(trailing = bytes.len() - pos, "ignoring bytes after last chunk");
		}
		tracing::debug!(?stats, responses = responses.attached(), "package read");

		builder.finish(options)
	}

	/// Encode the package.
	///
	/// Parents are written by GUID, so every parent should itself be one of
	/// the package's objects or the package will not read back.
	#[tracing::instrument(level = "debug", skip_all, fields(objects = self.objects.len()))]
	pub fn to_bytes(&self, options: &WriteOptions) -> Result<Vec<u8>> {
		let mut chunks = vec![(ChunkKind::Objects, self.objects_chunk(options)?)];
		if options.metadata {
			if let Some(title) = &self.title {
				let mut body = Vec::new();
				write_tag(&mut body, TagRegistry::metadata(), TAG_TITLE, title)?;
				chunks.push((ChunkKind::Metadata, body));
			}
		}

		let header = PackageHeader {
			version: PACKAGE_VERSION,
			chunk_count: chunks.len().try_into()?,
		};
		let mut out = encode(&header)?;
		for (kind, body) in chunks {
			let chunk = ChunkHeader {
				kind,
				size: body.len().try_into().map_err(|_| {
					Error::Malformed(format!("{kind:?} chunk of {} bytes is too large", body.len()))
				})?,
			};
			out.extend(encode(&chunk)?);
			out.extend(body);
		}

		Ok(out)
	}

	fn objects_chunk(&self, options: &WriteOptions) -> Result<Vec<u8>> {
		let registry = TagRegistry::objects();
		let mut body = Vec::new();

		if options.count_hint {
			let count: u32 = self.objects.len().try_into()?;
			write_tag(&mut body, registry, TAG_COUNT_HINT, &encode(&count)?)?;
		}

		if !self.message_targets.is_empty() {
			let targets: Vec<u8> = self
				.message_targets
				.iter()
				.flat_map(|target| target.to_le_bytes())
				.collect();
			write_tag(&mut body, registry, TAG_TARGETS, &targets)?;
		}

		for object in &self.objects {
			write_tag(&mut body, registry, TAG_OBJECT, &ObjectRecord::encode(object)?)?;
			for response in object.responses() {
				write_tag(&mut body, registry, TAG_RESPONSE, &encode(response)?)?;
			}
		}

		Ok(body)
	}

	pub fn find_by_guid(&self, guid: Uuid) -> Option<&Rc<Object>> {
		self.objects.iter().find(|object| object.guid() == guid)
	}

	/// The first object whose stored name hash is `hash`.
	pub fn find_by_name_hash(&self, hash: u64) -> Option<&Rc<Object>> {
		self.objects.iter().find(|object| object.name_hash() == hash)
	}

	pub fn find_by_name(&self, name: impl AsRef<[u8]>) -> Option<&Rc<Object>> {
		self.find_by_name_hash(name_hash(name))
	}

	/// Objects that messages may be sent to, in target-list order.
	pub fn targets(&self) -> impl Iterator<Item = &Rc<Object>> {
		self.message_targets
			.iter()
			.filter_map(|hash| self.find_by_name_hash(*hash))
	}
}

fn hex_fourcc(kind: u32) -> String {
	hex::encode(kind.to_le_bytes())
}
