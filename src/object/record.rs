use deku::{ctx::Endian, no_std_io, prelude::*};
use uuid::Uuid;

use super::{Object, ObjectFlag, ObjectKind, ObjectVariant};
use crate::{
	deku_helpers::{
		reader_bstring, reader_opt, reader_uuid, writer_bstring, writer_opt, writer_uuid,
	},
	error::Result,
	message::ResourceRequest,
	primitives::{decode_exact_with, encode_with},
};

/// An object as stored in a package, before its parent is linked.
///
/// Layout, all little-endian:
///
/// ```plain
/// kind       u8
/// flags      u32
/// name       u16 length + bytes
/// name_hash  u64
/// guid       u128
/// parent     u8 presence (+ u128 guid)
/// resource   u8 presence (+ resource request)
/// data       kind-specific data block
/// scripts    u16 count + kind-specific scripts
/// ```
///
/// Message responses are not part of the record; they follow it as separate
/// tags.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectRecord {
	pub object: Object,
	pub parent: Option<Uuid>,
}

impl ObjectRecord {
	/// Decode a record that fills `bytes` exactly.
	#[tracing::instrument(level = "trace", skip(bytes), fields(len = bytes.len()))]
	pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
		decode_exact_with(bytes, |reader| Self::read(reader))
	}

	/// Encode an object, referring to its parent by GUID.
	pub fn encode(object: &Object) -> Result<Vec<u8>> {
		let parent = object.parent.as_ref().map(|parent| parent.guid);
		encode_with(|writer| Self::write(object, parent.as_ref(), writer))
	}

	pub fn to_bytes(&self) -> Result<Vec<u8>> {
		encode_with(|writer| Self::write(&self.object, self.parent.as_ref(), writer))
	}

	pub(crate) fn read<R: no_std_io::Read + no_std_io::Seek>(
		reader: &mut Reader<R>,
	) -> Result<Self, DekuError> {
		let kind = ObjectKind::from_reader_with_ctx(reader, Endian::Little)?;
		let flags = ObjectFlag::deku_reader(reader)?;
		let name = reader_bstring(reader)?;
		let name_hash = u64::from_reader_with_ctx(reader, Endian::Little)?;
		let guid = reader_uuid(reader)?;
		let parent = reader_opt(reader, reader_uuid)?;
		let resource = reader_opt(reader, |reader| {
			ResourceRequest::from_reader_with_ctx(reader, Endian::Little)
		})?;
		tracing::trace!(?kind, ?guid, ?parent, "read object header");

		let variant = ObjectVariant::read(kind, reader)?;

		Ok(Self {
			object: Object {
				variant,
				flags,
				name,
				name_hash,
				guid,
				resource,
				parent: None,
				responses: Vec::new(),
			},
			parent,
		})
	}

	pub(crate) fn write<W: no_std_io::Write + no_std_io::Seek>(
		object: &Object,
		parent: Option<&Uuid>,
		writer: &mut Writer<W>,
	) -> Result<(), DekuError> {
		object.kind().to_writer(writer, Endian::Little)?;
		ObjectFlag::deku_writer(writer, &object.flags)?;
		writer_bstring(writer, &object.name)?;
		object.name_hash.to_writer(writer, Endian::Little)?;
		writer_uuid(writer, &object.guid)?;
		writer_opt(writer, parent, writer_uuid)?;
		writer_opt(writer, object.resource.as_ref(), |writer, resource| {
			resource.to_writer(writer, Endian::Little)
		})?;
		object.variant.write(writer)
	}
}

impl From<Object> for ObjectRecord {
	fn from(object: Object) -> Self {
		Self {
			parent: object.parent.as_ref().map(|parent| parent.guid),
			object,
		}
	}
}
