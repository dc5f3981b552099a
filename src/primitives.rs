use std::io::Cursor;

use deku::{ctx::Endian, no_std_io, prelude::*};

use crate::error::{Error, Result};

/// Three-component vector, 12 bytes on the wire.
#[derive(Debug, Default, Copy, Clone, PartialEq, DekuRead, DekuWrite)]
#[deku(endian = "endian", ctx = "endian: deku::ctx::Endian")]
pub struct Vec3 {
	pub x: f32,
	pub y: f32,
	pub z: f32,
}

impl Vec3 {
	pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
	pub const ONE: Self = Self::new(1.0, 1.0, 1.0);

	pub const fn new(x: f32, y: f32, z: f32) -> Self {
		Self { x, y, z }
	}
}

impl std::ops::Add for Vec3 {
	type Output = Self;

	fn add(self, rhs: Self) -> Self {
		Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
	}
}

/// Rotation quaternion, stored `x y z w`, 16 bytes on the wire.
#[derive(Debug, Copy, Clone, PartialEq, DekuRead, DekuWrite)]
#[deku(endian = "endian", ctx = "endian: deku::ctx::Endian")]
pub struct Quat {
	pub x: f32,
	pub y: f32,
	pub z: f32,
	pub w: f32,
}

impl Quat {
	pub const IDENTITY: Self = Self::new(0.0, 0.0, 0.0, 1.0);

	pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
		Self { x, y, z, w }
	}
}

impl Default for Quat {
	fn default() -> Self {
		Self::IDENTITY
	}
}

/// RGBA colour with one byte per channel.
#[derive(Debug, Copy, Clone, PartialEq, Eq, DekuRead, DekuWrite)]
#[deku(endian = "endian", ctx = "endian: deku::ctx::Endian")]
pub struct Color {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	pub a: u8,
}

impl Color {
	pub const WHITE: Self = Self::rgba(255, 255, 255, 255);
	pub const TRANSPARENT: Self = Self::rgba(0, 0, 0, 0);

	pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
		Self { r, g, b, a }
	}
}

impl Default for Color {
	fn default() -> Self {
		Self::WHITE
	}
}

pub const VEC3_SIZE: usize = std::mem::size_of::<Vec3>();
const _: [(); VEC3_SIZE] = [(); 12];

pub const QUAT_SIZE: usize = std::mem::size_of::<Quat>();
const _: [(); QUAT_SIZE] = [(); 16];

pub const COLOR_SIZE: usize = std::mem::size_of::<Color>();
const _: [(); COLOR_SIZE] = [(); 4];

pub fn read_vec3<R: no_std_io::Read + no_std_io::Seek>(reader: &mut Reader<R>) -> Result<Vec3> {
	Ok(Vec3::from_reader_with_ctx(reader, Endian::Little)?)
}

pub fn read_quaternion<R: no_std_io::Read + no_std_io::Seek>(
	reader: &mut Reader<R>,
) -> Result<Quat> {
	Ok(Quat::from_reader_with_ctx(reader, Endian::Little)?)
}

pub fn read_color<R: no_std_io::Read + no_std_io::Seek>(reader: &mut Reader<R>) -> Result<Color> {
	Ok(Color::from_reader_with_ctx(reader, Endian::Little)?)
}

pub fn write_vec3<W: no_std_io::Write + no_std_io::Seek>(
	writer: &mut Writer<W>,
	value: &Vec3,
) -> Result<()> {
	Ok(value.to_writer(writer, Endian::Little)?)
}

pub fn write_quaternion<W: no_std_io::Write + no_std_io::Seek>(
	writer: &mut Writer<W>,
	value: &Quat,
) -> Result<()> {
	Ok(value.to_writer(writer, Endian::Little)?)
}

pub fn write_color<W: no_std_io::Write + no_std_io::Seek>(
	writer: &mut Writer<W>,
	value: &Color,
) -> Result<()> {
	Ok(value.to_writer(writer, Endian::Little)?)
}

/// Decode a little-endian value from the start of `bytes`.
///
/// Trailing bytes are left alone.
pub fn decode<T>(bytes: &[u8]) -> Result<T>
where
	T: for<'a> DekuReader<'a, Endian>,
{
	decode_with(bytes, |reader| T::from_reader_with_ctx(reader, Endian::Little))
}

/// Decode from the start of `bytes` with a hand-written reader function.
pub fn decode_with<'b, T>(
	bytes: &'b [u8],
	read: impl FnOnce(&mut Reader<Cursor<&'b [u8]>>) -> Result<T, DekuError>,
) -> Result<T> {
	let mut cursor = Cursor::new(bytes);
	let mut reader = Reader::new(&mut cursor);
	Ok(read(&mut reader)?)
}

/// Decode a value that must fill `bytes` exactly.
pub fn decode_exact<T>(bytes: &[u8]) -> Result<T>
where
	T: for<'a> DekuReader<'a, Endian>,
{
	decode_exact_with(bytes, |reader| T::from_reader_with_ctx(reader, Endian::Little))
}

/// Like [`decode_with`], but bytes left over after `read` are an error.
pub fn decode_exact_with<'b, T>(
	bytes: &'b [u8],
	read: impl FnOnce(&mut Reader<Cursor<&'b [u8]>>) -> Result<T, DekuError>,
) -> Result<T> {
	let mut cursor = Cursor::new(bytes);
	let mut reader = Reader::new(&mut cursor);
	let value = read(&mut reader)?;
	if reader.bits_read != bytes.len() * 8 {
		return Err(Error::Malformed(format!(
			"{} bytes left over after decoding {} byte payload",
			bytes.len() - reader.bits_read / 8,
			bytes.len()
		)));
	}
	Ok(value)
}

/// Encode a value as little-endian bytes.
pub fn encode<T: DekuWriter<Endian>>(value: &T) -> Result<Vec<u8>> {
	encode_with(|writer| value.to_writer(writer, Endian::Little))
}

/// Encode with a hand-written writer function.
pub fn encode_with(
	write: impl FnOnce(&mut Writer<&mut Cursor<Vec<u8>>>) -> Result<(), DekuError>,
) -> Result<Vec<u8>> {
	let mut cursor = Cursor::new(Vec::new());
	{
		let mut writer = Writer::new(&mut cursor);
		write(&mut writer)?;
		writer.finalize()?;
	}
	Ok(cursor.into_inner())
}
