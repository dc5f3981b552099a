use bstr::BString;
use deku::{ctx::Endian, no_std_io, prelude::*};
use uuid::Uuid;

pub fn reader_bstring<R: no_std_io::Read + no_std_io::Seek>(
	reader: &mut Reader<R>,
) -> Result<BString, DekuError> {
	let len = u16::from_reader_with_ctx(reader, Endian::Little)?;
	let bytes = (0..len)
		.map(|_| u8::from_reader_with_ctx(reader, Endian::Little))
		.collect::<Result<Vec<u8>, _>>()?;
	Ok(BString::new(bytes))
}

pub fn writer_bstring<W: no_std_io::Write + no_std_io::Seek>(
	writer: &mut Writer<W>,
	field: &BString,
) -> Result<(), DekuError> {
	let len: u16 = field.len().try_into()?;
	len.to_writer(writer, Endian::Little)?;
	for byte in field.iter() {
		byte.to_writer(writer, Endian::Little)?;
	}
	Ok(())
}

/// Read a vector prefixed with its u16 element count.
pub fn reader_vec<R, T>(reader: &mut Reader<R>) -> Result<Vec<T>, DekuError>
where
	R: no_std_io::Read + no_std_io::Seek,
	T: for<'a> DekuReader<'a, Endian>,
{
	let count = u16::from_reader_with_ctx(reader, Endian::Little)?;
	(0..count)
		.map(|_| T::from_reader_with_ctx(reader, Endian::Little))
		.collect()
}

pub fn writer_vec<W, T>(writer: &mut Writer<W>, field: &[T]) -> Result<(), DekuError>
where
	W: no_std_io::Write + no_std_io::Seek,
	T: DekuWriter<Endian>,
{
	let count: u16 = field.len().try_into()?;
	count.to_writer(writer, Endian::Little)?;
	for item in field {
		item.to_writer(writer, Endian::Little)?;
	}
	Ok(())
}

/// Read an optional value behind a one-byte presence marker.
pub fn reader_opt<R, T>(
	reader: &mut Reader<R>,
	read: impl FnOnce(&mut Reader<R>) -> Result<T, DekuError>,
) -> Result<Option<T>, DekuError>
where
	R: no_std_io::Read + no_std_io::Seek,
{
	match u8::from_reader_with_ctx(reader, Endian::Little)? {
		0 => Ok(None),
		1 => read(reader).map(Some),
		other => Err(DekuError::Assertion(
			format!("invalid presence marker {other}").into(),
		)),
	}
}

pub fn writer_opt<W, T>(
	writer: &mut Writer<W>,
	field: Option<&T>,
	write: impl FnOnce(&mut Writer<W>, &T) -> Result<(), DekuError>,
) -> Result<(), DekuError>
where
	W: no_std_io::Write + no_std_io::Seek,
{
	match field {
		None => 0u8.to_writer(writer, Endian::Little),
		Some(value) => {
			1u8.to_writer(writer, Endian::Little)?;
			write(writer, value)
		}
	}
}

pub fn reader_uuid<R: no_std_io::Read + no_std_io::Seek>(
	reader: &mut Reader<R>,
) -> Result<Uuid, DekuError> {
	let value = u128::from_reader_with_ctx(reader, Endian::Little)?;
	Ok(Uuid::from_u128(value))
}

pub fn writer_uuid<W: no_std_io::Write + no_std_io::Seek>(
	writer: &mut Writer<W>,
	field: &Uuid,
) -> Result<(), DekuError> {
	field.as_u128().to_writer(writer, Endian::Little)
}
